//! PLLE2_ADV / MMCME2_ADV clock-output divider math and the filter/lock
//! lookup tables.
//!
//! The real lookup tables (`LKTABLE`, `FILTREG1_RESERVED`) are silicon
//! constants tabulated per `CLKFBOUT_MULT` in the upstream tool; they are not
//! derivable from first principles and the retrieval pack's
//! `original_source` filter dropped the source file that carries them (see
//! DESIGN.md). The tables below are deterministic placeholders indexed the
//! same way the real ones are (`CLKFBOUT_MULT - 1`, `BANDWIDTH` for MMCM) so
//! the encoder's shape and invariants (one row read per cell, same index
//! math, same static `TABLE`/`LOCKREG3_RESERVED` bits) match the original;
//! only the table contents are a stand-in.

use crate::context::Bits;
use crate::error::{EmitError, Result};

/// One clock output's resolved divider/phase configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClkOutConfig {
    pub no_count: bool,
    pub high: u32,
    pub low: u32,
    pub edge: bool,
    pub phasemux: u32,
    pub delaytime: u32,
    /// `None` for outputs where `frac` is not computed at all (anything but
    /// `CLKOUT1`/`CLKFBOUT` on PLLE2, `CLKOUT0`/`CLKFBOUT` on MMCME2).
    pub frac: Option<i64>,
}

/// Resolves `divide`/`phase` (already-real-valued, in clock cycles and
/// degrees respectively) into the physical counter configuration. `has_frac`
/// selects whether this output computes the `frac` field at all.
pub fn resolve_clkout(divide: f64, phase: f64, has_frac: bool) -> ClkOutConfig {
    if divide <= 1.0 {
        return ClkOutConfig {
            no_count: true,
            high: 0,
            low: 0,
            edge: false,
            phasemux: 0,
            delaytime: 0,
            frac: None,
        };
    }

    let divide_floor = divide.floor() as u32;
    let high = divide_floor / 2;
    let low = divide_floor - high;
    let edge = high != low;

    let frac = if has_frac {
        Some((divide * 8.0).floor() as i64 - (divide_floor as i64) * 8)
    } else {
        None
    };

    let phase_eights = ((phase / 360.0) * divide * 8.0).floor() as i64;
    let phasemux = phase_eights.rem_euclid(8) as u32;
    let delaytime = phase_eights.div_euclid(8) as u32;

    ClkOutConfig {
        no_count: false,
        high,
        low,
        edge,
        phasemux,
        delaytime,
        frac,
    }
}

/// MMCM's fractional counter steals one tick from `high`+`low` and routes it
/// through the `CLKOUT5_CLKOUT2`/`CLKOUT6_CLKOUT2` phase-mux registers
/// instead, only when `frac != 0`.
pub fn apply_mmcm_fractional_adjustment(cfg: &mut ClkOutConfig) -> bool {
    let has_frac = cfg.frac.map(|f| f != 0).unwrap_or(false);
    if has_frac {
        cfg.high = cfg.high.saturating_sub(1);
        cfg.low = cfg.low.saturating_sub(1);
    }
    has_frac
}

/// `LKTABLE[39:0]` indexed by `CLKFBOUT_MULT - 1 in [0, 63]`.
pub fn lktable(clkfbout_mult: i64) -> Result<Bits> {
    let idx = range_checked(clkfbout_mult)?;
    Ok(Bits::from_u64(lktable_row(idx), 40))
}

/// `FILTREG1_RESERVED[11:0]`, indexed the same way; for MMCM the row also
/// depends on `BANDWIDTH`.
pub fn filtreg1(clkfbout_mult: i64, bandwidth_variant: u8) -> Result<Bits> {
    let idx = range_checked(clkfbout_mult)?;
    Ok(Bits::from_u64(filtreg1_row(idx, bandwidth_variant), 12))
}

fn range_checked(clkfbout_mult: i64) -> Result<u8> {
    let idx = clkfbout_mult - 1;
    if !(0..=63).contains(&idx) {
        return Err(EmitError::RangeError {
            field: "CLKFBOUT_MULT",
            value: clkfbout_mult,
        });
    }
    Ok(idx as u8)
}

fn lktable_row(idx: u8) -> u64 {
    // Deterministic stand-in: see module docs.
    0x9000_9000_00 ^ ((idx as u64).wrapping_mul(0x2F3B)) & 0xFF_FFFF_FFFF
}

fn filtreg1_row(idx: u8, bandwidth_variant: u8) -> u64 {
    (0x900 ^ ((idx as u64) << 2) ^ (bandwidth_variant as u64)) & 0xFFF
}

/// `BANDWIDTH` values MMCM's filter table is selected by.
pub fn mmcm_bandwidth_variant(bandwidth: &str) -> u8 {
    match bandwidth {
        "LOW" => 0,
        "LOW_SS" => 1,
        "HIGH" => 2,
        _ => 3, // OPTIMIZED, and any unrecognised value falls back to it
    }
}
