//! IOLOGIC sub-encoders: `ILOGICE3_IFF`, `OLOGICE2`/`OLOGICE3_OUTFF`,
//! `OSERDESE2`, `ISERDESE2`, `IDELAYE2`, `ODELAYE2`.

use crate::context::EmissionContext;
use crate::design::{CellInfo, Design};
use crate::error::{EmitError, Result};
use crate::invertible_pins::InvertiblePins;

/// Emits the register-edge mode, `SRTYPE`, and per-pin `ZINV_*` inversions
/// shared by every IOLOGIC kind, then dispatches to the kind-specific body.
pub fn emit(ctx: &mut EmissionContext, design: &dyn Design, invertible: &InvertiblePins, bel_name: &str, cell: &CellInfo) -> Result<()> {
    let orig_type = cell.orig_type();
    let mut scope = ctx.scope(bel_name.to_string());

    for pin in invertible.pins(orig_type) {
        let inverted = cell.attr_str(&format!("IS_{pin}_INVERTED")) == Some("1");
        scope.write_bit(&format!("ZINV_{pin}"), !inverted)?;
    }

    match orig_type {
        "ILOGICE3_IFF" => emit_ilogic_iff(&mut scope, design, cell),
        "OLOGICE2_OUTFF" | "OLOGICE3_OUTFF" => emit_ologic_outff(&mut scope, cell),
        "OSERDESE2" => emit_oserdes(&mut scope, cell),
        "ISERDESE2" => emit_iserdes(&mut scope, cell),
        "IDELAYE2_IDELAYE2" => emit_idelay(&mut scope, cell),
        "ODELAYE2_ODELAYE2" => emit_odelay(&mut scope, cell),
        other => Err(EmitError::UnknownIologic(other.to_string())),
    }
}

fn emit_ilogic_iff(ctx: &mut EmissionContext, design: &dyn Design, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("IDDR.IN_USE", true)?;
    if let Some(edge) = cell.attr_str("DDR_CLK_EDGE") {
        ctx.write_bit(&format!("IFF.DDR_CLK_EDGE.{edge}"), true)?;
    }
    ctx.write_bit("IFF.SRTYPE.SYNC", cell.attr_str("SRTYPE") == Some("SYNC"))?;
    ctx.write_bit("ZINI", cell.param_int("INIT") != Some(1))?;

    // The IDELMUXE3.P0 feature routes the ILOGIC input through an inserted
    // IDELAYE2 rather than straight from the PAD, when the D-input net's
    // driver cell is an IDELAYE2.
    if let Some(net) = cell.ports.net("D") {
        if let Some((driver_cell, _)) = design.net(net).driver {
            if design.cell(driver_cell).orig_type() == "IDELAYE2_IDELAYE2" {
                ctx.write_bit("IDELMUXE3.P0", true)?;
            }
        }
    }
    Ok(())
}

fn emit_ologic_outff(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("OUTFF.IN_USE", true)?;
    ctx.write_bit("OUTFF.SRTYPE.SYNC", cell.attr_str("SRTYPE") == Some("SYNC"))?;
    ctx.write_bit("ZINI", cell.param_int("INIT") != Some(1))?;
    Ok(())
}

fn emit_oserdes(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("OSERDES.IN_USE", true)?;
    if let Some(width) = cell.param_str("DATA_WIDTH") {
        ctx.write_bit(&format!("OSERDES.DATA_WIDTH.W{width}"), true)?;
    }
    ctx.write_bit(
        "OSERDES.DATA_RATE_OQ.DDR",
        cell.attr_str("DATA_RATE_OQ") == Some("DDR"),
    )?;
    Ok(())
}

fn emit_iserdes(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("ISERDES.IN_USE", true)?;
    if let Some(width) = cell.param_str("DATA_WIDTH") {
        ctx.write_bit(&format!("ISERDES.DATA_WIDTH.W{width}"), true)?;
    }
    ctx.write_bit(
        "ISERDES.INTERFACE_TYPE.MEMORY",
        cell.attr_str("INTERFACE_TYPE") == Some("MEMORY"),
    )?;
    Ok(())
}

fn emit_idelay(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("IDELAYE2.IN_USE", true)?;
    if let Some(val) = cell.param_int("IDELAY_VALUE") {
        ctx.write_int_vector("IDELAYE2.IDELAY_VALUE[4:0]", val as u64, 5, false)?;
    }
    ctx.write_bit(
        "IDELAYE2.DELAY_SRC.IDATAIN",
        cell.attr_str("DELAY_SRC") == Some("IDATAIN"),
    )?;
    Ok(())
}

fn emit_odelay(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("ODELAYE2.IN_USE", true)?;
    if let Some(val) = cell.param_int("ODELAY_VALUE") {
        ctx.write_int_vector("ODELAYE2.ODELAY_VALUE[4:0]", val as u64, 5, false)?;
    }
    Ok(())
}
