//! The clocking encoder: `BUFGCTRL`, PLL/MMCM dispatch, then the three
//! tile-aggregation passes (`HCLK_{L,R}`/`CLK_HROW`/`HCLK_CMT`, then
//! `CLK_BUFG_REBUF`/`HCLK_CMT` second pass) over observed PIP activity.

pub mod pll;

use std::collections::{BTreeMap, BTreeSet};

use crate::context::EmissionContext;
use crate::db::Database;
use crate::design::{CellInfo, Design};
use crate::error::{EmitError, Result};
use crate::ids::TileIndex;
use crate::routing::PipsByTile;

fn emit_bufgctrl(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("IN_USE", true)?;
    ctx.write_bit("INIT_OUT", cell.param_int("INIT_OUT") == Some(1))?;
    for port in ["IS_IGNORE0_INVERTED", "IS_IGNORE1_INVERTED"] {
        ctx.write_bit(port, cell.attr_str(port) == Some("1"))?;
    }
    for pin in ["CE0", "CE1", "S0", "S1"] {
        let inverted = cell.attr_str(&format!("IS_{pin}_INVERTED")) == Some("1");
        ctx.write_bit(&format!("ZINV_{pin}"), !inverted)?;
    }
    Ok(())
}

struct CounterSpec {
    name: &'static str,
    divide_param: &'static str,
    phase_param: Option<&'static str>,
    output_port: Option<&'static str>,
    has_frac: bool,
}

fn pll_counters() -> Vec<CounterSpec> {
    vec![
        CounterSpec { name: "DIVCLK", divide_param: "DIVCLK_DIVIDE", phase_param: None, output_port: None, has_frac: false },
        CounterSpec { name: "CLKFBOUT", divide_param: "CLKFBOUT_MULT", phase_param: Some("CLKFBOUT_PHASE"), output_port: None, has_frac: true },
        CounterSpec { name: "CLKOUT0", divide_param: "CLKOUT0_DIVIDE", phase_param: Some("CLKOUT0_PHASE"), output_port: Some("CLKOUT0"), has_frac: false },
        CounterSpec { name: "CLKOUT1", divide_param: "CLKOUT1_DIVIDE", phase_param: Some("CLKOUT1_PHASE"), output_port: Some("CLKOUT1"), has_frac: true },
        CounterSpec { name: "CLKOUT2", divide_param: "CLKOUT2_DIVIDE", phase_param: Some("CLKOUT2_PHASE"), output_port: Some("CLKOUT2"), has_frac: false },
        CounterSpec { name: "CLKOUT3", divide_param: "CLKOUT3_DIVIDE", phase_param: Some("CLKOUT3_PHASE"), output_port: Some("CLKOUT3"), has_frac: false },
        CounterSpec { name: "CLKOUT4", divide_param: "CLKOUT4_DIVIDE", phase_param: Some("CLKOUT4_PHASE"), output_port: Some("CLKOUT4"), has_frac: false },
        CounterSpec { name: "CLKOUT5", divide_param: "CLKOUT5_DIVIDE", phase_param: Some("CLKOUT5_PHASE"), output_port: Some("CLKOUT5"), has_frac: false },
    ]
}

fn mmcm_counters() -> Vec<CounterSpec> {
    vec![
        CounterSpec { name: "DIVCLK", divide_param: "DIVCLK_DIVIDE", phase_param: None, output_port: None, has_frac: false },
        CounterSpec { name: "CLKFBOUT", divide_param: "CLKFBOUT_MULT", phase_param: Some("CLKFBOUT_PHASE"), output_port: None, has_frac: true },
        CounterSpec { name: "CLKOUT0", divide_param: "CLKOUT0_DIVIDE", phase_param: Some("CLKOUT0_PHASE"), output_port: Some("CLKOUT0"), has_frac: true },
        CounterSpec { name: "CLKOUT1", divide_param: "CLKOUT1_DIVIDE", phase_param: Some("CLKOUT1_PHASE"), output_port: Some("CLKOUT1"), has_frac: false },
        CounterSpec { name: "CLKOUT2", divide_param: "CLKOUT2_DIVIDE", phase_param: Some("CLKOUT2_PHASE"), output_port: Some("CLKOUT2"), has_frac: false },
        CounterSpec { name: "CLKOUT3", divide_param: "CLKOUT3_DIVIDE", phase_param: Some("CLKOUT3_PHASE"), output_port: Some("CLKOUT3"), has_frac: false },
        CounterSpec { name: "CLKOUT4", divide_param: "CLKOUT4_DIVIDE", phase_param: Some("CLKOUT4_PHASE"), output_port: Some("CLKOUT4"), has_frac: false },
        CounterSpec { name: "CLKOUT5", divide_param: "CLKOUT5_DIVIDE", phase_param: Some("CLKOUT5_PHASE"), output_port: Some("CLKOUT5"), has_frac: false },
        CounterSpec { name: "CLKOUT6", divide_param: "CLKOUT6_DIVIDE", phase_param: Some("CLKOUT6_PHASE"), output_port: Some("CLKOUT6"), has_frac: false },
    ]
}

fn param_f64(cell: &CellInfo, name: &str, default: f64) -> f64 {
    cell.param_str(name)
        .and_then(|s| s.parse().ok())
        .or_else(|| cell.param_int(name).map(|i| i as f64))
        .unwrap_or(default)
}

fn emit_counter(ctx: &mut EmissionContext, cell: &CellInfo, spec: &CounterSpec, is_mmcm: bool) -> Result<()> {
    let used = spec.output_port.map(|p| cell.ports.connected(p)).unwrap_or(true);
    if !used {
        return Ok(());
    }

    let divide = param_f64(cell, spec.divide_param, 1.0);
    let phase = spec.phase_param.map(|p| param_f64(cell, p, 0.0)).unwrap_or(0.0);
    let mut cfg = pll::resolve_clkout(divide, phase, spec.has_frac);

    let mut scope = ctx.scope(spec.name.to_string());
    scope.write_bit("NO_COUNT", cfg.no_count)?;
    if !cfg.no_count {
        if is_mmcm {
            if pll::apply_mmcm_fractional_adjustment(&mut cfg) {
                scope.write_bit("CLKOUT5_CLKOUT2_PHASEMUX.USED", true)?;
                scope.write_bit("CLKOUT6_CLKOUT2_PHASEMUX.USED", true)?;
            }
        }
        scope.write_int_vector("HIGH_TIME[5:0]", cfg.high as u64, 6, false)?;
        scope.write_int_vector("LOW_TIME[5:0]", cfg.low as u64, 6, false)?;
        scope.write_bit("EDGE", cfg.edge)?;
        scope.write_int_vector("PHASEMUX[2:0]", cfg.phasemux as u64, 3, false)?;
        scope.write_int_vector("DELAY_TIME[5:0]", cfg.delaytime as u64, 6, false)?;
    }
    Ok(())
}

fn check_compensation(cell: &CellInfo, is_mmcm: bool) -> Result<&'static str> {
    let mode = cell.attr_str("COMPENSATION").unwrap_or("INTERNAL");
    match (is_mmcm, mode) {
        (false, "INTERNAL") => Ok("Z_ZHOLD_OR_CLKIN_BUF"),
        (true, "INTERNAL") | (true, "ZHOLD") => Ok("Z_ZHOLD"),
        _ => Err(EmitError::Invariant(format!("unsupported COMPENSATION mode {mode}"))),
    }
}

fn emit_pll_or_mmcm(ctx: &mut EmissionContext, cell: &CellInfo, is_mmcm: bool) -> Result<()> {
    let counters = if is_mmcm { mmcm_counters() } else { pll_counters() };
    for spec in &counters {
        emit_counter(ctx, cell, spec, is_mmcm)?;
    }

    let clkfbout_mult = cell.param_int("CLKFBOUT_MULT").unwrap_or(1);
    let lktable = pll::lktable(clkfbout_mult)?;
    ctx.write_vector("LKTABLE[39:0]", &lktable, false)?;

    let bandwidth_variant = if is_mmcm {
        pll::mmcm_bandwidth_variant(cell.attr_str("BANDWIDTH").unwrap_or("OPTIMIZED"))
    } else {
        0
    };
    let filtreg1 = pll::filtreg1(clkfbout_mult, bandwidth_variant)?;
    ctx.write_vector("FILTREG1_RESERVED[11:0]", &filtreg1, false)?;

    let table_const = if is_mmcm { 0x3D4 } else { 0x3B4 };
    ctx.write_int_vector("TABLE[9:0]", table_const, 10, false)?;
    ctx.write_int_vector("LOCKREG3_RESERVED[0]", 1, 1, false)?;

    let compensation_feature = check_compensation(cell, is_mmcm)?;
    ctx.write_bit(compensation_feature, true)?;

    Ok(())
}

/// Pass 1: `BUFGCTRL`, `PLLE2_ADV`, `MMCME2_ADV` cells.
pub fn emit_cells(db: &dyn Database, design: &dyn Design, ctx: &mut EmissionContext) -> Result<()> {
    for cell in design.cells().values() {
        let Some(bel) = cell.bel else { continue };
        let tile = db.tile(bel.tile);
        match cell.orig_type() {
            "BUFGCTRL" => {
                let mut scope = ctx.scope(tile.inst_name.clone());
                let mut bufg_scope = scope.scope("BUFGCTRL".to_string());
                let mut site_scope = bufg_scope.scope(db.bel_site(bel).to_string());
                emit_bufgctrl(&mut site_scope, cell)?;
            }
            "PLLE2_ADV" => {
                let mut scope = ctx.scope(tile.inst_name.clone());
                let mut pll_scope = scope.scope("PLLE2_ADV".to_string());
                emit_pll_or_mmcm(&mut pll_scope, cell, false)?;
            }
            "MMCME2_ADV" => {
                let mut scope = ctx.scope(tile.inst_name.clone());
                let mut mmcm_scope = scope.scope("MMCME2_ADV".to_string());
                emit_pll_or_mmcm(&mut mmcm_scope, cell, true)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn pips_with_dst_prefix<'a>(db: &'a dyn Database, pips_by_tile: &'a PipsByTile, tile: TileIndex, prefix: &str) -> BTreeSet<&'a str> {
    pips_by_tile
        .get(&tile)
        .into_iter()
        .flatten()
        .map(|&p| db.wire_name(db.pip(p).dst_wire))
        .filter(|name| name.starts_with(prefix))
        .collect()
}

/// Pass 2: per-tile aggregation over observed PIP activity. Returns
/// `all_gclk`, the set of globally-active gclk names, consumed by pass 3's
/// `CLK_BUFG_REBUF` sweep.
pub fn emit_tile_pass2(
    db: &dyn Database,
    ctx: &mut EmissionContext,
    pips_by_tile: &PipsByTile,
) -> Result<BTreeSet<String>> {
    let mut all_gclk = BTreeSet::new();

    for (&tile, type_name) in db.tiles_and_types() {
        let mut scope = ctx.scope(db.tile(tile).inst_name.clone());

        if type_name.starts_with("HCLK_L") || type_name.starts_with("HCLK_R") {
            for wire in pips_with_dst_prefix(db, pips_by_tile, tile, "HCLK_CK_") {
                scope.write_bit(&format!("ENABLE_BUFFER.{wire}"), true)?;
            }
        } else if type_name.starts_with("CLK_HROW") {
            for wire in pips_with_dst_prefix(db, pips_by_tile, tile, "CLK_HROW_CK_GCLK") {
                scope.write_bit(&format!("{wire}_ACTIVE"), true)?;
                all_gclk.insert(wire.to_string());
            }
            for wire in pips_with_dst_prefix(db, pips_by_tile, tile, "CLK_HROW_CK_IN") {
                scope.write_bit(&format!("{wire}_ACTIVE"), true)?;
            }
        } else if type_name.starts_with("HCLK_CMT") {
            for wire in pips_with_dst_prefix(db, pips_by_tile, tile, "HCLK_CMT_CCIO") {
                scope.write_bit(&format!("{wire}_ACTIVE"), true)?;
            }
            for wire in pips_with_dst_prefix(db, pips_by_tile, tile, "HCLK_CMT_BUFHCLK") {
                scope.write_bit(&format!("{wire}_USED"), true)?;
            }
        }
    }

    Ok(all_gclk)
}

/// Pass 3: `CLK_BUFG_REBUF` propagation of the gclks pass 2 found active,
/// plus the `HCLK_CMT` per-bank-HCLK usage rollup.
pub fn emit_tile_pass3(
    db: &dyn Database,
    ctx: &mut EmissionContext,
    pips_by_tile: &PipsByTile,
    all_gclk: &BTreeSet<String>,
) -> Result<()> {
    let mut bank_hclk_by_cmt: BTreeMap<TileIndex, BTreeSet<String>> = BTreeMap::new();

    for (&tile, type_name) in db.tiles_and_types() {
        if type_name.starts_with("CLK_BUFG_REBUF") {
            let mut scope = ctx.scope(db.tile(tile).inst_name.clone());
            for gclk in all_gclk {
                scope.write_bit(&format!("{gclk}_ENABLE_ABOVE"), true)?;
                scope.write_bit(&format!("{gclk}_ENABLE_BELOW"), true)?;
            }
        } else if type_name.starts_with("HCLK_CMT") {
            let hclks = pips_with_dst_prefix(db, pips_by_tile, tile, "HCLK_CMT_CK_");
            bank_hclk_by_cmt
                .entry(tile)
                .or_default()
                .extend(hclks.into_iter().map(str::to_string));
        }
    }

    for (&tile, hclks) in &bank_hclk_by_cmt {
        let mut scope = ctx.scope(db.tile(tile).inst_name.clone());
        for hclk in hclks {
            scope.write_bit(&format!("HCLK_CMT_CK_{hclk}_USED"), true)?;
        }
    }

    Ok(())
}

/// Runs all three passes in order.
pub fn emit(db: &dyn Database, design: &dyn Design, ctx: &mut EmissionContext, pips_by_tile: &PipsByTile) -> Result<()> {
    emit_cells(db, design, ctx)?;
    let all_gclk = emit_tile_pass2(db, ctx, pips_by_tile)?;
    emit_tile_pass3(db, ctx, pips_by_tile, &all_gclk)?;
    Ok(())
}
