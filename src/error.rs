// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the mapping pipeline.
//!
//! Every failure is fatal to the current mapping run: nothing retries, and
//! errors propagate unchanged to the top-level driver, which reports a
//! single diagnostic line.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// Unreadable file, bad magic, bad header, missing or ill-formed body
    /// line, or an AIGER integrity-constraint violation.
    #[error("malformed input: {0}")]
    InputMalformed(String),

    /// A literal or index fell outside the known arrays.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// API misuse, e.g. requesting a best cut before enumeration ran, or
    /// configuring fewer than two LUT inputs.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A post-condition failed inside the engine.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
