//! The I/O encoder: PAD electrical settings, IOLOGIC cells, and bank-level
//! aggregation flushed to each HCLK tile.

pub mod bank;
pub mod iologic;
pub mod pad;

use crate::db::Database;
use crate::design::Design;
use crate::error::Result;
use crate::invertible_pins::InvertiblePins;

use bank::IoConfigByHclk;

const IOLOGIC_KINDS: &[&str] = &[
    "ILOGICE3_IFF",
    "OLOGICE2_OUTFF",
    "OLOGICE3_OUTFF",
    "OSERDESE2",
    "ISERDESE2",
    "IDELAYE2_IDELAYE2",
    "ODELAYE2_ODELAYE2",
];

/// Walks every placed cell once, in sorted `CellId` order: PAD cells emit
/// their own electrical settings and contribute to the bank accumulator;
/// IOLOGIC cells dispatch to their dedicated sub-encoder. The accumulator is
/// flushed to each HCLK tile's own prefix at the end.
pub fn emit(db: &dyn Database, design: &dyn Design, ctx: &mut crate::context::EmissionContext, invertible: &InvertiblePins) -> Result<()> {
    let mut banks = IoConfigByHclk::default();

    for cell in design.cells().values() {
        let Some(bel) = cell.bel else { continue };
        let tile = db.tile(bel.tile);

        if cell.orig_type() == "PAD" {
            let mut scope = ctx.scope(tile.inst_name.clone());
            let pad_bel = if tile.type_name.contains("_SING") {
                pad::sing_half(db, bel).to_string()
            } else {
                "IOB_Y0".to_string()
            };
            let mut pad_scope = scope.scope(pad_bel);
            let update = pad::electrical_settings(&mut pad_scope, db, bel, cell)?;
            drop(pad_scope);
            drop(scope);
            banks.accumulate(db.hclk_for_iob(bel), update);
        } else if IOLOGIC_KINDS.contains(&cell.orig_type()) {
            let mut scope = ctx.scope(tile.inst_name.clone());
            let logic_bel = if cell.orig_type().starts_with('I') { "ILOGIC_Y0" } else { "OLOGIC_Y0" };
            iologic::emit(&mut scope, design, invertible, logic_bel, cell)?;
        }
    }

    banks.flush(ctx, |hclk| db.tile(hclk).inst_name.clone())
}
