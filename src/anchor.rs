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
//! Scanning a query against the indexed reference for unique anchors.

use crate::esa::Esa;

/// A match that occurs exactly once in the reference and has passed the
/// length threshold. Positions are 0-based; the output format adds 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub ref_pos: usize,
    pub query_pos: usize,
    pub length: usize,
}

/// Finds the unique anchors of `query` against the reference index.
///
/// Walks the query left to right. At each position the match engine
/// returns the longest reference-matching prefix of the remaining query;
/// the match is then extended leftwards over the reference as far as the
/// preceding characters agree, which restores maximality on the
/// reference side. A match is reported when its suffix array interval is
/// a singleton and its extended length reaches `threshold`.
///
/// The scan resumes one character past the end of each match, whether it
/// was reported or not. Anchors that overlap a previous match in the
/// query are therefore never reported; this loses a small fraction of
/// the true MUMs and is the intended behavior.
pub fn anchors(esa: &Esa, query: &[u8], threshold: usize) -> Vec<Anchor> {
    let text = esa.text();
    let qlen = query.len();
    let mut found = Vec::new();

    let mut q = 0;
    while q < qlen {
        let inter = esa.get_match_cached(&query[q..]);

        let mut length = if inter.l <= 0 { 0 } else { inter.l as usize };
        let mut ref_pos = esa.suffix_position(inter.i);
        let mut query_pos = q;

        while query_pos > 0
            && ref_pos > 0
            && crate::sequence::bases_match(text[ref_pos - 1], query[query_pos - 1])
        {
            ref_pos -= 1;
            query_pos -= 1;
            length += 1;
        }

        if inter.is_singleton() && length >= threshold {
            found.push(Anchor {
                ref_pos,
                query_pos,
                length,
            });
        }

        // Skip one past the end of the match.
        q = query_pos + length + 1;
    }

    found
}
