//! Error taxonomy for the emission core.
//!
//! Every fatal condition in §7 of the spec maps to one variant here. Warnings
//! (unprocessed route-thrus) and silent skips are not errors and never reach
//! this type — they go through `log::warn!` or simply produce no line.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("failed to open FASM output {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write to FASM output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported cell type {orig_type} on bel {bel}")]
    UnsupportedCellType { orig_type: String, bel: String },

    #[error("unknown IOLOGIC kind {0}")]
    UnknownIologic(String),

    #[error("unknown DSP SEL_MASK value {0}")]
    UnknownDspSelMask(String),

    #[error("unsupported IOSTANDARD {iostandard} on {kind}")]
    UnsupportedIostandard { iostandard: String, kind: &'static str },

    #[error("{field} out of range: {value}")]
    RangeError { field: &'static str, value: i64 },

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, EmitError>;
