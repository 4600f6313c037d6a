//! The DSP48E1 encoder: register-enable polarity, pattern/mask vectors,
//! SIMD mode, operand cascade (A/B port and D-port use), and the tile-side
//! GND/VCC pin fixups.

use crate::context::{Bits, EmissionContext};
use crate::db::Database;
use crate::design::{CellInfo, Design};
use crate::error::{EmitError, Result};
use crate::invertible_pins::InvertiblePins;

/// `AREG`/`BREG` take values `0` or `2` (the DSP48E1 primitive has no single
/// pipeline stage on the A/B input path — either bypassed or both stages).
fn reg_count(cell: &CellInfo, param: &str) -> i64 {
    cell.param_int(param).unwrap_or(1)
}

fn emit_reg_counts(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    for (param, stem) in [("AREG", "AREG"), ("BREG", "BREG")] {
        let n = reg_count(cell, param);
        ctx.write_bit(&format!("{stem}_0"), n == 0)?;
        ctx.write_bit(&format!("{stem}_2"), n >= 2)?;
    }
    Ok(())
}

fn emit_operand_cascade(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    ctx.write_bit("A_INPUT[0]", cell.attr_str("A_INPUT") == Some("CASCADE"))?;
    ctx.write_bit("B_INPUT[0]", cell.attr_str("B_INPUT") == Some("CASCADE"))?;
    ctx.write_bit("USE_DPORT[0]", cell.attr_str("USE_DPORT") == Some("TRUE"))?;

    let use_simd = cell.attr_str("USE_SIMD").unwrap_or("ONE48");
    for mode in ["ONE48", "TWO24", "FOUR12"] {
        ctx.write_bit(&format!("USE_SIMD_{mode}"), use_simd == mode)?;
    }
    Ok(())
}

/// `PATTERN`/`MASK` are compared against `P`/`C` by the SEL_PATTERN/
/// SEL_MASK muxes. `MASK` is truncated to 46 bits even though the parameter
/// value can carry 48 (the top two bits of the comparator mask are unused on
/// this primitive).
fn emit_pattern_mask(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    if let Some(raw) = cell.param_bits("PATTERN") {
        let bits = Bits::parse_msb_first(raw);
        ctx.write_vector("PATTERN[47:0]", &bits, false)?;
    }
    if let Some(raw) = cell.param_bits("MASK") {
        let mut bits = Bits::parse_msb_first(raw);
        if bits.width() > 46 {
            let truncated: Vec<bool> = (0..46).map(|i| bits.get(i)).collect();
            bits = Bits::from_bools(truncated);
        }
        ctx.write_vector("MASK[45:0]", &bits, false)?;
    }

    let sel_mask = cell.attr_str("SEL_MASK").unwrap_or("MASK");
    match sel_mask {
        "MASK" => ctx.write_bit("SEL_MASK_MASK", true)?,
        "C" => ctx.write_bit("SEL_MASK_C", true)?,
        "ROUNDING_MODE1" => ctx.write_bit("SEL_MASK_ROUNDING_MODE1", true)?,
        "ROUNDING_MODE2" => ctx.write_bit("SEL_MASK_ROUNDING_MODE2", true)?,
        other => return Err(EmitError::UnknownDspSelMask(other.to_string())),
    }
    Ok(())
}

/// `Z*REG[0]` bits are asserted when the corresponding pipeline register is
/// *absent* (inverted-sense, like every other `Z`-prefixed feature).
fn emit_inverted_reg_enables(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    for param in ["CREG", "DREG", "MREG", "PREG", "ADREG", "ALUMODEREG", "CARRYINREG", "CARRYINSELREG", "OPMODEREG", "INMODEREG"] {
        let present = cell.param_int(param).unwrap_or(1) != 0;
        ctx.write_bit(&format!("Z{param}[0]"), !present)?;
    }
    Ok(())
}

/// `ZIS_{ALUMODE,INMODE,OPMODE}_INVERTED[i]` is asserted unless the bit is
/// inverted either through the cumulative `IS_..._INVERTED` bitmask
/// parameter or a per-bit `IS_..._INVERTED[i]` attribute (packers emit one
/// or the other depending on how the bit was folded).
fn emit_inmode_alumode_opmode_inversion(ctx: &mut EmissionContext, cell: &CellInfo) -> Result<()> {
    for (param, width) in [("ALUMODE", 4), ("INMODE", 5), ("OPMODE", 7)] {
        let mask = cell.param_int(&format!("IS_{param}_INVERTED")).unwrap_or(0);
        for i in 0..width {
            let from_mask = (mask >> i) & 1 != 0;
            let from_attr = cell.attr_str(&format!("IS_{param}[{i}]_INVERTED")) == Some("1");
            let inverted = from_mask || from_attr;
            ctx.write_bit(&format!("ZIS_{param}_INVERTED[{i}]"), !inverted)?;
        }
    }
    Ok(())
}

fn emit_clock_carry_inversion(ctx: &mut EmissionContext, cell: &CellInfo, invertible: &InvertiblePins) -> Result<()> {
    for pin in invertible.pins("DSP48E1") {
        let inverted = cell.attr_str(&format!("IS_{pin}_INVERTED")) == Some("1");
        ctx.write_bit(&format!("ZINV_{pin}"), !inverted)?;
    }
    Ok(())
}

/// `L`/`R` tile side, parsed out of the tile instance name's `DSP_<L|R>_`
/// prefix (e.g. `DSP_R_X10Y20` -> `R`).
fn tile_side(type_name: &str) -> &'static str {
    if type_name.starts_with("DSP_L") {
        "L"
    } else {
        "R"
    }
}

/// Emits `DSP_<n>_<PIN>.DSP_<net>_<side>` for every pin listed in the
/// `DSP_{GND,VCC}_PINS` attribute, flipping GND<->VCC when the pin's own
/// `IS_*_INVERTED` bit is asserted (an inverted tie-off swaps which rail
/// floats the pin to its effective default).
fn emit_gnd_vcc_pins(ctx: &mut EmissionContext, cell: &CellInfo, sub_site: u8, side: &str) -> Result<()> {
    for (attr, net) in [("DSP_GND_PINS", "GND"), ("DSP_VCC_PINS", "VCC")] {
        let Some(pins) = cell.attr_str(attr) else { continue };
        for pin in pins.split_whitespace() {
            let inverted = cell.attr_str(&format!("IS_{pin}_INVERTED")) == Some("1");
            let effective_net = if inverted {
                if net == "GND" {
                    "VCC"
                } else {
                    "GND"
                }
            } else {
                net
            };
            ctx.write_bit(&format!("DSP_{sub_site}_{pin}.DSP_{effective_net}_{side}"), true)?;
        }
    }
    Ok(())
}

/// Emits every `DSP48E1` cell in the design.
pub fn emit(db: &dyn Database, design: &dyn Design, ctx: &mut EmissionContext, invertible: &InvertiblePins) -> Result<()> {
    for cell in design.cells().values() {
        if cell.orig_type() != "DSP48E1" {
            continue;
        }
        let Some(bel) = cell.bel else { continue };
        let tile = db.tile(bel.tile);
        let (_x, y) = db.bel_site_loc_in_tile(bel);
        let sub_site = (y % 2) as u8;
        let side = tile_side(&tile.type_name);

        let mut scope = ctx.scope(tile.inst_name.clone());
        let mut dsp_scope = scope.scope(format!("DSP_{sub_site}"));

        emit_reg_counts(&mut dsp_scope, cell)?;
        emit_operand_cascade(&mut dsp_scope, cell)?;
        emit_pattern_mask(&mut dsp_scope, cell)?;
        emit_inverted_reg_enables(&mut dsp_scope, cell)?;
        emit_inmode_alumode_opmode_inversion(&mut dsp_scope, cell)?;
        emit_clock_carry_inversion(&mut dsp_scope, cell, invertible)?;
        drop(dsp_scope);

        emit_gnd_vcc_pins(&mut scope, cell, sub_site, side)?;
    }
    Ok(())
}
