// mumr: Find maximal unique matches with an enhanced suffix array
//
// Copyright 2025 mumr contributors.

// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.

// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
//! Converting anchors into the MUMmer-style output format.
//!
//! The output is line-oriented ASCII: one header per scanned query
//! direction, then one line per anchor with the 1-based reference
//! position, the 1-based query position and the match length as three
//! right-aligned, width 8 integers separated by two spaces.

use crate::anchor::Anchor;

/// Header line for one query direction.
pub fn header(name: &str, reverse: bool) -> String {
    if reverse {
        format!("> {} Reverse\n", name)
    } else {
        format!("> {}\n", name)
    }
}

/// One anchor formatted with 1-based coordinates.
///
/// # Examples
/// ```rust
/// use mumr::anchor::Anchor;
/// use mumr::format::anchor_line;
///
/// let anchor = Anchor { ref_pos: 4, query_pos: 0, length: 3 };
/// assert_eq!(anchor_line(&anchor), "       5         1         3\n");
/// ```
pub fn anchor_line(anchor: &Anchor) -> String {
    format!(
        "{:8}  {:8}  {:8}\n",
        anchor.ref_pos + 1,
        anchor.query_pos + 1,
        anchor.length
    )
}

/// The full output block for one query direction: the header followed by
/// the anchors in scan order.
pub fn query_block(name: &str, reverse: bool, anchors: &[Anchor]) -> String {
    let mut out = header(name, reverse);
    for anchor in anchors {
        out.push_str(&anchor_line(anchor));
    }
    out
}

////////////////////////////////////////////////////////////////////////////////
// Tests
//
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers() {
        assert_eq!(header("seq1", false), "> seq1\n");
        assert_eq!(header("seq1", true), "> seq1 Reverse\n");
    }

    #[test]
    fn anchor_lines_are_right_aligned() {
        let anchor = Anchor {
            ref_pos: 0,
            query_pos: 0,
            length: 16,
        };
        assert_eq!(anchor_line(&anchor), "       1         1        16\n");

        let anchor = Anchor {
            ref_pos: 12345677,
            query_pos: 98,
            length: 100,
        };
        assert_eq!(anchor_line(&anchor), "12345678        99       100\n");
    }

    #[test]
    fn block_concatenates_header_and_anchors() {
        let anchors = vec![
            Anchor {
                ref_pos: 4,
                query_pos: 0,
                length: 3,
            },
            Anchor {
                ref_pos: 9,
                query_pos: 6,
                length: 5,
            },
        ];
        let block = query_block("q", false, &anchors);
        assert_eq!(
            block,
            "> q\n       5         1         3\n      10         7         5\n"
        );
    }
}
