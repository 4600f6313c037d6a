//! Device-aware FASM emission core for a Xilinx 7-series place-and-route
//! backend.
//!
//! Given a placed-and-routed design (as a [`design::Design`]) against a
//! device database (as a [`db::Database`]), [`emit`] writes the design's
//! FASM feature lines to any [`std::io::Write`] sink, or [`emit_to_file`]
//! writes them straight to a path. Emission is single-threaded and fully
//! deterministic: the same design against the same database always
//! produces byte-identical output, tile by tile, feature by feature.

pub mod bram;
pub mod clocking;
pub mod config_center;
pub mod context;
pub mod db;
pub mod design;
pub mod dsp;
mod emit;
pub mod error;
pub mod ids;
pub mod invertible_pins;
pub mod io;
pub mod logic;
pub mod pseudopip;
pub mod routing;

#[cfg(test)]
pub(crate) mod testutil;

pub use db::Database;
pub use design::Design;
pub use emit::{emit, emit_to_file, EmitOptions};
pub use error::{EmitError, Result};
