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
//! Error kinds shared by the index builder and the driver.

use thiserror::Error;

/// Failures that abort a comparison run.
///
/// Invalid inputs and index build failures are fatal: the binary prints
/// the message to stderr and exits with a non-zero status. There are no
/// recoverable errors inside the match scan itself; an index invariant
/// violation there is a programming error and panics.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("out of memory")]
    AllocationFailed,

    #[error("failed to create index for {0}")]
    IndexBuildFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
