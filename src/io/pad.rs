//! PAD electrical settings: `IOSTANDARD`/`PULLTYPE`/`SLEW`/`DRIVE`/
//! `IN_TERM`/`IOBDELAY`, the differential-vs-single-ended split, and the
//! `IOB33`/`RIOB18` bank-kind distinction.

use crate::db::Database;
use crate::design::CellInfo;
use crate::error::{EmitError, Result};
use crate::ids::BelId;
use crate::io::bank::BankConfig;

const SSTL_FAMILY: &[&str] = &["SSTL135", "SSTL15", "SSTL135_R", "SSTL15_R"];
const DIFF_FAMILY: &[&str] = &["DIFF_SSTL135", "DIFF_SSTL15", "LVDS", "LVDS_25", "TMDS_33"];

fn is_differential(iostandard: &str) -> bool {
    DIFF_FAMILY.contains(&iostandard) || iostandard.starts_with("DIFF_")
}

/// Whether `bel`'s site sits in a high-performance (`RIOB18`) bank rather
/// than a general-purpose (`IOB33`) one.
fn is_riob18(db: &dyn Database, bel: BelId) -> bool {
    db.bel_site(bel).starts_with("RIOB18")
}

/// Emits one PAD's own electrical-settings features (under the caller's
/// current prefix, expected to already be scoped to the PAD's bel name) and
/// returns the bank-level contribution this PAD makes to its HCLK's
/// aggregated configuration.
pub fn electrical_settings(ctx: &mut crate::context::EmissionContext, db: &dyn Database, bel: BelId, cell: &CellInfo) -> Result<BankConfig> {
    let iostandard = cell.attr_str("IOSTANDARD").unwrap_or("LVCMOS33");
    let riob18 = is_riob18(db, bel);

    if riob18 && (iostandard == "LVCMOS33" || iostandard == "LVTTL") {
        return Err(EmitError::UnsupportedIostandard {
            iostandard: iostandard.to_string(),
            kind: "RIOB18",
        });
    }
    if !riob18 && iostandard == "SSTL12" {
        return Err(EmitError::UnsupportedIostandard {
            iostandard: iostandard.to_string(),
            kind: "IOB33",
        });
    }

    let differential = is_differential(iostandard);
    ctx.write_bit("DIFF_IN_USE", differential)?;

    if let Some(pulltype) = cell.attr_str("PULLTYPE") {
        ctx.write_bit(&format!("PULLTYPE.{pulltype}"), pulltype != "NONE")?;
    }
    if let Some(slew) = cell.attr_str("SLEW") {
        ctx.write_bit(&format!("SLEW.{slew}"), true)?;
    }
    if let Some(drive) = cell.attr_str("DRIVE") {
        ctx.write_bit(&format!("DRIVE.I{drive}_"), true)?;
    }
    ctx.write_bit("IN_TERM_EN", cell.attr_str("IN_TERM").map(|t| t != "NONE").unwrap_or(false))?;
    ctx.write_bit("IOBDELAY.IFD", cell.attr_str("IOBDELAY") == Some("IFD"))?;
    ctx.write_bit("IOBDELAY.BOTH", cell.attr_str("IOBDELAY") == Some("BOTH"))?;

    Ok(BankConfig {
        stepdown: riob18,
        vref: SSTL_FAMILY.contains(&iostandard),
        tmds_33_in_use: iostandard == "TMDS_33",
        lvds_25_in_use: iostandard == "LVDS_25",
        only_diff_in_use: differential,
    })
}

/// For a "SING" (singly-instantiated, partner-less) IOB tile, which half
/// (`IOB_Y0`/`IOB_Y1`) the pad occupies, based on its position relative to
/// its own HCLK row.
pub fn sing_half(db: &dyn Database, bel: BelId) -> &'static str {
    let tile = bel.tile;
    if tile.0 < db.hclk_for_iob(bel).0 {
        "IOB_Y1"
    } else {
        "IOB_Y0"
    }
}
