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
//! Find maximal unique matches (MUMs) between a reference sequence and
//! one or more query sequences.
//!
//! The reference is indexed once with an enhanced suffix array (suffix
//! array, LCP array, child table and a short-prefix lookup table); every
//! query is then scanned position by position, asking the index for the
//! longest reference-matching prefix of the remaining query. Matches
//! that occur exactly once in the reference and pass a length threshold
//! derived from the shustring length distribution are reported as
//! anchors with their 1-based reference position, query position and
//! length.
//!
//! ```rust
//! use mumr::sequence::Sequence;
//! use mumr::RunConfig;
//!
//! let (reference, _) = Sequence::new("ref", b"AAAACGTAAAA");
//! let (query, _) = Sequence::new("query", b"CGTGG");
//!
//! let config = RunConfig { min_length: 3, ..RunConfig::default() };
//! let mut out: Vec<u8> = Vec::new();
//! mumr::run(&[reference, query], &config, &mut out).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "> query\n       5         1         3\n",
//! );
//! ```

use std::io::Write;
use std::sync::Mutex;

use log::{debug, info};
use rayon::iter::IndexedParallelIterator;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;

pub mod anchor;
pub mod error;
pub mod esa;
pub mod format;
pub mod sequence;
pub mod threshold;

pub use error::Error;

use esa::{BuildOpts, Esa};
use sequence::Sequence;

/// Options controlling one comparison run. Built once from the command
/// line and read-only afterwards.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Scan the queries as given.
    pub forward: bool,
    /// Scan the reverse complement of the queries.
    pub revcomp: bool,
    /// Explicit anchor length threshold; 0 derives it from `p_value`.
    pub min_length: usize,
    /// Probability with which an anchor is allowed to be random.
    pub p_value: f64,
}
// Defaults
impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            forward: true,
            revcomp: false,
            min_length: 0,
            p_value: 0.05,
        }
    }
}

/// Compares every query against the reference and writes the anchors.
///
/// The first element of `sequences` is the reference; every other
/// element is scanned as a query in the directions enabled in `config`.
/// Queries are processed in parallel on the rayon pool and the index is
/// shared read-only between the workers. Each query's block of output
/// (header plus anchors, for each enabled direction) is written in one
/// piece, so blocks from different queries never interleave even though
/// their order is unspecified.
///
/// Fails with [Error::IndexBuildFailed] when the reference cannot be
/// indexed and with [Error::Io] when writing to `out` fails.
pub fn run<W: Write + Send>(
    sequences: &[Sequence],
    config: &RunConfig,
    out: W,
) -> Result<(), Error> {
    let subject = sequences
        .first()
        .ok_or_else(|| Error::InvalidInput("no sequences given".to_string()))?;

    info!("Indexing {}...", subject.name);
    let esa = Esa::new(&subject.bytes, &BuildOpts::default()).map_err(|e| match e {
        Error::AllocationFailed => Error::AllocationFailed,
        _ => Error::IndexBuildFailed(subject.name.clone()),
    })?;

    let threshold = if config.min_length != 0 {
        config.min_length
    } else {
        threshold::min_anchor_length(config.p_value, subject.gc, subject.len())
    };
    info!("Minimum anchor length is {}", threshold);

    let writer = Mutex::new(out);
    sequences[1..]
        .par_iter()
        .enumerate()
        .try_for_each(|(idx, query)| {
            debug!("comparing {} and {}", 0, idx + 1);

            let mut block = String::new();
            if config.forward {
                let found = anchor::anchors(&esa, &query.bytes, threshold);
                block.push_str(&format::query_block(&query.name, false, &found));
            }
            if config.revcomp {
                let rc = sequence::revcomp(&query.bytes);
                let found = anchor::anchors(&esa, &rc, threshold);
                block.push_str(&format::query_block(&query.name, true, &found));
            }

            let mut out = writer.lock().unwrap();
            out.write_all(block.as_bytes()).map_err(Error::from)
        })
}
