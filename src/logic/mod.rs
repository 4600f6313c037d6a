//! The logic-tile encoder: LUTs, flip-flops, carry chains, and the handful
//! of SLICEM site-routing muxes, for every tile holding at least one bound
//! logic cell.

pub mod carry;
pub mod ff;
pub mod lut;
pub mod slot;

use crate::context::EmissionContext;
use crate::db::Database;
use crate::design::Design;
use crate::error::Result;
use crate::ids::TileIndex;

use ff::FfSlot;
use lut::HalfLut;
use slot::{carry4_slot, ff_slot, lut5_slot, lut6_slot, Letter, LETTERS};

/// Scans a named site-routing-mux output wire for a currently-bound uphill
/// PIP and reports the driving bel/pin pair, if any. Shared by the
/// `?DI1MUX`/`WEMUX`/`?CY0` site-mux scans below.
fn scan_uphill_feature(db: &dyn Database, design: &dyn Design, tile: TileIndex, wire_name: &str) -> Option<(String, String)> {
    let wire = db.wire_by_name_in_tile(tile, wire_name)?;
    let pip_id = db
        .pips_uphill(wire)
        .iter()
        .copied()
        .find(|&p| design.bound_pip_net(p).is_some())?;
    let pip = db.pip(pip_id);
    let src_name = db.wire_name(pip.src_wire);
    let pin = src_name.rsplit('_').next().unwrap_or(src_name).to_string();
    Some((wire_name.trim_end_matches("_OUT").to_string(), pin))
}

/// Emits every logic feature for `tile`, if it hosts at least one bound
/// logic cell. A no-op for tiles with no `TileStatus` or an empty
/// `logic_cells` map.
pub fn emit_tile(db: &dyn Database, design: &dyn Design, ctx: &mut EmissionContext, tile: TileIndex) -> Result<()> {
    let Some(status) = design.tile_status(tile) else {
        return Ok(());
    };
    if status.logic_cells.is_empty() {
        return Ok(());
    }

    let tile_data = db.tile(tile).clone();
    let mut tile_scope = ctx.scope(tile_data.inst_name.clone());

    for half in 0..2u8 {
        let site_kind = if tile_data.type_name.starts_with("CLBLM") && half == 0 {
            "SLICEM"
        } else {
            "SLICEL"
        };
        let site_name = format!("{site_kind}_X{half}");
        let mut half_scope = tile_scope.scope(site_name);

        let mut cy0_out = [false; 4];
        for (lane, letter) in LETTERS.into_iter().enumerate() {
            emit_lut(&mut half_scope, db, design, tile, status, half, letter)?;

            if let Some((mux, pin)) = scan_uphill_feature(db, design, tile, &format!("{}DI1MUX_OUT", letter.as_char())) {
                half_scope.write_bit(&format!("{mux}.{pin}"), true)?;
            }
            if let Some((mux, pin)) = scan_uphill_feature(db, design, tile, &format!("{}CY0_OUT", letter.as_char())) {
                if pin.ends_with('5') {
                    half_scope.write_bit(&mux, true)?;
                    cy0_out[lane] = true;
                }
            }
        }

        if let Some((mux, pin)) = scan_uphill_feature(db, design, tile, "WEMUX_OUT") {
            if pin != "WE" {
                half_scope.write_bit(&format!("{mux}.{pin}"), true)?;
            }
        }

        emit_ffs(&mut half_scope, db, design, tile, status, half)?;

        if let Some(&cell_id) = status.logic_cells.get(&carry4_slot(half)) {
            let cell = design.cell(cell_id);
            carry::emit(&mut half_scope, "CARRY4", cell, cy0_out)?;
        }
    }

    Ok(())
}

fn emit_lut(
    ctx: &mut EmissionContext,
    _db: &dyn Database,
    design: &dyn Design,
    _tile: TileIndex,
    status: &crate::design::TileStatus,
    half: u8,
    letter: Letter,
) -> Result<()> {
    let lut6_cell = status.logic_cells.get(&lut6_slot(half, letter)).map(|&id| design.cell(id));
    let lut5_cell = status.logic_cells.get(&lut5_slot(half, letter)).map(|&id| design.cell(id));
    let half_lut = HalfLut {
        lut6: lut6_cell,
        lut5: lut5_cell,
    };
    if !half_lut.is_used() {
        return Ok(());
    }

    let bel = format!("{}LUT", letter.as_char());
    let init = half_lut.combined_init();
    ctx.write_int_vector(&format!("{bel}.INIT[63:0]"), init, 64, false)?;
    ctx.write_bit(&format!("{bel}.SMALL"), half_lut.is_small())?;
    ctx.write_bit(&format!("{bel}.RAM"), half_lut.is_ram())?;
    ctx.write_bit(&format!("{bel}.SRL"), half_lut.is_srl())?;

    if let Some(c) = lut6_cell.or(lut5_cell) {
        ctx.write_bit(&format!("{bel}.WA7USED"), c.ports.connected("WA7"))?;
        ctx.write_bit(&format!("{bel}.WA8USED"), c.ports.connected("WA8"))?;
    }

    Ok(())
}

fn emit_ffs(
    ctx: &mut EmissionContext,
    db: &dyn Database,
    design: &dyn Design,
    tile: TileIndex,
    status: &crate::design::TileStatus,
    half: u8,
) -> Result<()> {
    let mut cells = Vec::new();
    let mut names: Vec<String> = Vec::new();
    for letter in LETTERS {
        for ff_index in [0u8, 1] {
            if let Some(&id) = status.logic_cells.get(&ff_slot(half, letter, ff_index)) {
                let suffix = if ff_index == 0 { "" } else { "2" };
                names.push(format!("{}FF{}", letter.as_char(), suffix));
                cells.push(design.cell(id));
            }
        }
    }
    if cells.is_empty() {
        return Ok(());
    }

    let slots: Vec<FfSlot> = names
        .iter()
        .zip(cells.iter())
        .map(|(name, cell)| FfSlot { bel_name: name, cell })
        .collect();

    // Per-FF D-input routing mux: each FF's D pin is fed through a named
    // site mux (`AFFMUX`, `BFFMUX`, ...) selecting between the half's LUT
    // output and the direct fabric input; resolved the same way as the
    // `?DI1MUX`/`WEMUX` site-PIP scans above.
    let d_mux = |bel_name: &str| scan_uphill_feature(db, design, tile, &format!("{bel_name}MUX_OUT")).map(|(mux, pin)| format!("{mux}.{pin}"));

    ff::emit_half(ctx, design, &slots, d_mux)
}
