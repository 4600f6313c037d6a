//! The config-center encoder: `BSCAN`, `DCIRESET`, `ICAP`, `STARTUP` — the
//! fixed-function cells placed in `CFG_CENTER_*` tiles. Each has a small,
//! mostly-static feature set plus a couple of range-checked parameters.

use crate::context::EmissionContext;
use crate::design::{CellInfo, Design};
use crate::error::{EmitError, Result};

const JTAG_CHAIN_RANGE: std::ops::RangeInclusive<i64> = 1..=4;

fn check_jtag_chain(cell: &CellInfo) -> Result<i64> {
    let chain = cell.param_int("JTAG_CHAIN").unwrap_or(1);
    if !JTAG_CHAIN_RANGE.contains(&chain) {
        return Err(EmitError::RangeError {
            field: "JTAG_CHAIN",
            value: chain,
        });
    }
    Ok(chain)
}

fn check_icap_width(cell: &CellInfo) -> Result<&'static str> {
    match cell.attr_str("ICAP_WIDTH").unwrap_or("X32") {
        "X32" => Ok("X32"),
        "X16" => Ok("X16"),
        "X8" => Ok("X8"),
        other => Err(EmitError::RangeError {
            field: "ICAP_WIDTH",
            value: other.len() as i64,
        }),
    }
}

fn emit_bscan(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    let chain = check_jtag_chain(cell)?;
    let mut scope = ctx.scope("BSCAN".to_string());
    scope.write_bit("IN_USE", true)?;
    for n in JTAG_CHAIN_RANGE {
        scope.write_bit(&format!("JTAG_CHAIN_{n}"), n == chain)?;
    }
    scope.write_bit("DISABLE_JTAG.DISABLE_JTAG", cell.param_int("DISABLE_JTAG") == Some(1))?;
    Ok(())
}

fn emit_dcireset(ctx: &mut EmissionContext, _cell: &CellInfo) -> Result<()> {
    ctx.write_bit("DCIRESET.IN_USE", true)
}

fn emit_icap(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    let width = check_icap_width(cell)?;
    let mut scope = ctx.scope("ICAP".to_string());
    scope.write_bit("IN_USE", true)?;
    scope.write_bit(&format!("ICAP_WIDTH.{width}"), true)?;
    Ok(())
}

fn emit_startup(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    let mut scope = ctx.scope("STARTUP".to_string());
    scope.write_bit("IN_USE", true)?;
    scope.write_bit("GTS_SYNC.IN_USE", cell.ports.connected("GTS"))?;
    scope.write_bit("GSR_SYNC.IN_USE", cell.ports.connected("GSR"))?;
    scope.write_bit(
        "PROG_USR.TRUE",
        cell.attr_str("PROG_USR") == Some("TRUE"),
    )?;
    Ok(())
}

/// Emits every config-center cell in the design. Walks sorted `CellId` order
/// like every other cell-driven encoder; cells not placed in a `CFG_CENTER_*`
/// tile and not one of the four recognised kinds are left untouched (they
/// are handled by another encoder).
pub fn emit(db: &dyn crate::db::Database, design: &dyn Design, ctx: &mut EmissionContext) -> Result<()> {
    for cell in design.cells().values() {
        let Some(bel) = cell.bel else { continue };
        let tile = db.tile(bel.tile);
        if !tile.type_name.starts_with("CFG_CENTER") {
            continue;
        }

        let mut scope = ctx.scope(tile.inst_name.clone());
        match cell.orig_type() {
            "BSCAN" => emit_bscan(&mut scope, cell)?,
            "DCIRESET_DCIRESET" => emit_dcireset(&mut scope, cell)?,
            "ICAP_ICAP" => emit_icap(&mut scope, cell)?,
            "STARTUP_STARTUP" => emit_startup(&mut scope, cell)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn jtag_chain_out_of_range_is_rejected() {
        let mut design = TestDesign::new();
        let mut db = TestDb::new();
        let tile = db.add_tile("CFG_CENTER_MID", "CFG_CENTER_MID_X0Y0", 0, 0);
        let bel = db.add_bel(tile, "BSCAN", "BSCAN", (0, 0));
        design.add_cell(
            "bscan",
            Some(bel),
            vec![("X_ORIG_TYPE", "BSCAN")],
            vec![("JTAG_CHAIN", Value::Int(5))],
            vec![],
        );

        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        let err = emit(&db, &design, &mut ctx).unwrap_err();
        assert!(matches!(err, EmitError::RangeError { field: "JTAG_CHAIN", .. }));
    }

    #[test]
    fn startup_emits_in_use() {
        let mut db = TestDb::new();
        let tile = db.add_tile("CFG_CENTER_MID", "CFG_CENTER_MID_X0Y0", 0, 0);
        let bel = db.add_bel(tile, "STARTUP", "STARTUP", (0, 0));
        let mut design = TestDesign::new();
        design.add_cell("su", Some(bel), vec![("X_ORIG_TYPE", "STARTUP_STARTUP")], vec![], vec![]);

        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit(&db, &design, &mut ctx).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("CFG_CENTER_MID_X0Y0.STARTUP.IN_USE"));
    }
}
