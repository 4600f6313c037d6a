//! The routing emitter: walks every routed net, emits one feature (or a
//! pseudo-PIP's feature set) per used PIP, and builds `pips_by_tile` along
//! the way for the encoders that run after it.

use std::collections::BTreeMap;

use crate::context::EmissionContext;
use crate::db::{Database, PipData, PipFlags, TileData, WireIntent};
use crate::design::Design;
use crate::error::Result;
use crate::ids::{PipId, TileIndex};
use crate::pseudopip::PseudoPipTable;
use crate::EmitOptions;

pub type PipsByTile = BTreeMap<TileIndex, Vec<PipId>>;

pub fn emit_routing(
    db: &dyn Database,
    design: &dyn Design,
    ctx: &mut EmissionContext,
    table: &PseudoPipTable,
    opts: &EmitOptions,
) -> Result<PipsByTile> {
    let mut pips_by_tile: PipsByTile = BTreeMap::new();

    // BTreeMap iteration over `NetId`/`WireId` is already sorted; the sort
    // on `wires` just makes the per-net order explicit and independent of
    // how the design layer happened to push them onto the net.
    for (_net_id, net) in design.nets().iter() {
        let mut wires = net.wires.clone();
        wires.sort_by_key(|w| w.wire.0);

        for used in wires {
            let Some(pip_id) = used.driving_pip else {
                continue;
            };
            let pip = db.pip(pip_id).clone();

            pips_by_tile.entry(pip.tile).or_default().push(pip_id);

            let dst_intent = db.wire_intent(pip.dst_wire);
            if dst_intent == WireIntent::PseudoGnd || dst_intent == WireIntent::PseudoVcc {
                continue;
            }
            if !pip.flags.contains(PipFlags::TILE_ROUTING) {
                continue;
            }

            let tile = db.tile(pip.tile).clone();
            let dst_name = db.wire_name(pip.dst_wire).to_string();
            let src_name = db.wire_name(pip.src_wire).to_string();

            match table.lookup(&tile.type_name, &dst_name, &src_name) {
                Some(suffixes) => emit_pseudo_pip_hit(db, ctx, &pip, &tile, suffixes)?,
                None => emit_natural_pip(db, design, ctx, pip_id, &pip, &tile, &dst_name, &src_name, opts)?,
            }
        }
    }

    Ok(pips_by_tile)
}

fn is_sing_tile(type_name: &str) -> bool {
    type_name.starts_with("RIOI3_SING") || type_name.starts_with("LIOI3_SING") || type_name.starts_with("RIOI_SING")
}

fn top_half(db: &dyn Database, pip: &PipData) -> bool {
    pip.tile.0 < db.hclk_for_ioi(pip.tile).0
}

fn emit_pseudo_pip_hit(
    db: &dyn Database,
    ctx: &mut EmissionContext,
    pip: &PipData,
    tile: &TileData,
    suffixes: &[String],
) -> Result<()> {
    let rewrite = is_sing_tile(&tile.type_name) && top_half(db, pip);
    for suffix in suffixes {
        let suffix = if rewrite { suffix.replace("Y0", "Y1") } else { suffix.clone() };
        ctx.write_bit(&format!("{}.{}", tile.inst_name, suffix), true)?;
    }
    Ok(())
}

fn rewrite_top_half_ioi(s: &str) -> String {
    s.replace("_0", "_1").replace("OLOGIC0", "OLOGIC1")
}

/// Inserts `M` right after the `OCLK` token, e.g. `IOI_OCLK_0` ->
/// `IOI_OCLKM_0`.
fn insert_oclkm(dst: &str) -> String {
    dst.replacen("OCLK", "OCLKM", 1)
}

fn emit_natural_pip(
    db: &dyn Database,
    design: &dyn Design,
    ctx: &mut EmissionContext,
    pip_id: PipId,
    pip: &PipData,
    tile: &TileData,
    dst: &str,
    src: &str,
    opts: &EmitOptions,
) -> Result<()> {
    // DSP tile routing is unconditionally skipped pending a pseudo-PIP table
    // entry (spec.md 9: "intentional pending a PPIP table").
    if tile.type_name.starts_with("DSP_L") || tile.type_name.starts_with("DSP_R") {
        return Ok(());
    }

    let is_sing_ioi = tile.type_name.contains("IOI3_SING") || tile.type_name.contains("IOI_SING");

    let mut dst = dst.to_string();
    let mut src = src.to_string();

    if is_sing_ioi {
        src = src.replace("_SING_", "_");
        if top_half(db, pip) {
            dst = rewrite_top_half_ioi(&dst);
            if dst.contains("OLOGIC") || src.contains("OLOGIC") {
                src = rewrite_top_half_ioi(&src);
            }
        }
    }

    // Narrow IOI override: these pseudo-paths are known missing from the
    // pseudo-PIP table and must be silently dropped rather than emitted as
    // a bogus natural line (spec.md 9).
    if tile.type_name == "IOI" && src.starts_with("IOI_OCLKB") && dst.contains("IOI_OCLKM_") {
        return Ok(());
    }

    if pip.extra_data == 1 && opts.warn_on_routethru {
        log::warn!(
            "unprocessed route-thru pip {} in tile {} ({}.{}.{})",
            pip_id.0,
            tile.inst_name,
            tile.inst_name,
            dst,
            src
        );
    }

    ctx.write_bit(&format!("{}.{}.{}", tile.inst_name, dst, src), true)?;

    if tile.type_name.starts_with("IOI") && dst.starts_with("IOI_OCLK_") {
        let dst_m = insert_oclkm(&dst);
        let oclkm_unbound = match db.wire_by_name_in_tile(pip.tile, &dst_m) {
            Some(wire) => design.bound_wire_net(wire).is_none(),
            None => false,
        };
        if oclkm_unbound {
            ctx.write_bit(&format!("{}.{}.{}", tile.inst_name, dst_m, src), true)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn pseudo_pip_hit_emits_suffixes_not_natural_line() {
        let mut db = TestDb::new();
        let tile = db.add_tile("LIOI3", "LIOI3_X0Y100", 0, 100);
        let dst = db.add_wire(tile, "LIOI_OLOGIC0_OQ", WireIntent::Other);
        let src = db.add_wire(tile, "IOI_OLOGIC0_D1", WireIntent::Other);
        let pip = db.add_pip(tile, src, dst, PipFlags::TILE_ROUTING, 0, None);
        db.set_hclk_for_ioi(tile, TileIndex(1000)); // not a SING tile, irrelevant

        let mut design = TestDesign::new();
        let net = design.add_net("n", None, vec![(pip, dst)]);
        let _ = net;

        let table = crate::pseudopip::build_table();
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit_routing(&db, &design, &mut ctx, &table, &EmitOptions::default()).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "LIOI3_X0Y100.OLOGIC_Y0.OMUX.D1\nLIOI3_X0Y100.OLOGIC_Y0.OQUSED\nLIOI3_X0Y100.OLOGIC_Y0.OSERDES.DATA_RATE_TQ.BUF\n"
        );
    }

    #[test]
    fn pseudo_gnd_destination_is_skipped_but_recorded() {
        let mut db = TestDb::new();
        let tile = db.add_tile("CLBLL_L", "CLBLL_L_X0Y0", 0, 0);
        let dst = db.add_wire(tile, "GND_WIRE", WireIntent::PseudoGnd);
        let src = db.add_wire(tile, "SRC", WireIntent::Other);
        let pip = db.add_pip(tile, src, dst, PipFlags::TILE_ROUTING, 0, None);

        let mut design = TestDesign::new();
        design.add_net("n", None, vec![(pip, dst)]);

        let table = crate::pseudopip::build_table();
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        let pips_by_tile = emit_routing(&db, &design, &mut ctx, &table, &EmitOptions::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "");
        assert_eq!(pips_by_tile[&tile], vec![pip]);
    }

    #[test]
    fn dsp_tile_natural_pip_is_silently_skipped() {
        let mut db = TestDb::new();
        let tile = db.add_tile("DSP_L", "DSP_L_X0Y0", 0, 0);
        let dst = db.add_wire(tile, "DSP_IN", WireIntent::Other);
        let src = db.add_wire(tile, "DSP_OUT", WireIntent::Other);
        let pip = db.add_pip(tile, src, dst, PipFlags::TILE_ROUTING, 0, None);

        let mut design = TestDesign::new();
        design.add_net("n", None, vec![(pip, dst)]);

        let table = crate::pseudopip::build_table();
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit_routing(&db, &design, &mut ctx, &table, &EmitOptions::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "");
    }
}
