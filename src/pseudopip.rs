//! The pseudo-PIP table: `(tile-type, dst-wire, src-wire) -> [feature...]`.
//!
//! A pseudo-PIP is a PIP in the routing graph with no single configuration
//! bit behind it — using it instead flips a fixed, possibly empty, set of
//! feature lines. The table is immutable once built; tile-position fix-ups
//! (SING top/bottom halves) are applied by the caller, not baked into keys,
//! since the same key has to serve every instance of a tile type.

use std::collections::HashMap;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PseudoPipKey {
    pub tile_type: String,
    pub dst: String,
    pub src: String,
}

impl PseudoPipKey {
    pub fn new(tile_type: &str, dst: &str, src: &str) -> Self {
        PseudoPipKey {
            tile_type: tile_type.to_string(),
            dst: dst.to_string(),
            src: src.to_string(),
        }
    }
}

pub struct PseudoPipTable {
    entries: HashMap<PseudoPipKey, Vec<String>>,
}

impl PseudoPipTable {
    pub fn lookup(&self, tile_type: &str, dst: &str, src: &str) -> Option<&[String]> {
        self.entries
            .get(&PseudoPipKey::new(tile_type, dst, src))
            .map(Vec::as_slice)
    }

    fn insert(&mut self, tile_type: &str, dst: &str, src: &str, suffixes: Vec<String>) {
        self.entries.insert(PseudoPipKey::new(tile_type, dst, src), suffixes);
    }
}

fn ss(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Builds the table once per emission. Construction is pure and
/// side-effect-free; the same `PseudoPipTable` could be shared across runs.
pub fn build_table() -> PseudoPipTable {
    let mut t = PseudoPipTable {
        entries: HashMap::new(),
    };

    add_ioi3_entries(&mut t);
    add_rioi_entries(&mut t);
    add_iob_passthrough_entries(&mut t);
    add_clk_hrow_bufh_entries(&mut t);
    add_clk_bufg_bufgctrl_entries(&mut t);
    add_hclk_ioi_bufr_entries(&mut t);

    t
}

/// IOI3 (LIOI3/RIOI3) OLOGIC/ILOGIC data-path pseudo-PIPs: selecting the
/// OLOGIC/ILOGIC data mux also implies enabling the OQ/IQ output and, for
/// the buffered data-rate case, the OSERDES buffered-TQ mode.
fn add_ioi3_entries(t: &mut PseudoPipTable) {
    for tile_type in ["LIOI3", "RIOI3"] {
        for half in [0, 1] {
            let dst = format!("{}_OLOGIC{}_OQ", tile_type.trim_end_matches('3'), half);
            for d in 0..8 {
                let src = format!("IOI_OLOGIC{}_D{}", half, d);
                t.insert(
                    tile_type,
                    &dst,
                    &src,
                    ss(&[
                        &format!("OLOGIC_Y{half}.OMUX.D{d}"),
                        &format!("OLOGIC_Y{half}.OQUSED"),
                        &format!("OLOGIC_Y{half}.OSERDES.DATA_RATE_TQ.BUF"),
                    ]),
                );
            }

            let dst_iff = format!("{}_ILOGIC{}_D", tile_type.trim_end_matches('3'), half);
            let src_iff = format!("IOI_ILOGIC{}_I", half);
            t.insert(
                tile_type,
                &dst_iff,
                &src_iff,
                ss(&[&format!("ILOGIC_Y{half}.ZINV_D"), &format!("ILOGIC_Y{half}.IFFDELMUXE3.P0")]),
            );
        }
    }
}

/// RIOI (non-3, HR-bank) variants: same shape as IOI3, without the buffered
/// data-rate feature (those tiles lack fabric-side OSERDES buffering).
fn add_rioi_entries(t: &mut PseudoPipTable) {
    for half in [0, 1] {
        let dst = format!("RIOI_OLOGIC{}_OQ", half);
        for d in 0..8 {
            let src = format!("IOI_OLOGIC{}_D{}", half, d);
            t.insert(
                "RIOI",
                &dst,
                &src,
                ss(&[&format!("OLOGIC_Y{half}.OMUX.D{d}"), &format!("OLOGIC_Y{half}.OQUSED")]),
            );
        }
    }
}

/// IOB33/RIOB18 bidirectional pad/differential pseudo-paths. These are
/// legal routes through the pad itself (true differential or SelectIO
/// input/output sharing a pin) with no associated configuration of their
/// own — the feature set that matters is emitted by the I/O encoder reading
/// cell attributes, not by the router.
fn add_iob_passthrough_entries(t: &mut PseudoPipTable) {
    for (tile_type, pad_wire, o_wire, i_wire) in [
        ("IOB33", "IOB_PAD", "IOB_O", "IOB_I"),
        ("IOB33S", "IOB_PAD", "IOB_O", "IOB_I"),
        ("IOB33M", "IOB_PAD", "IOB_O", "IOB_I"),
        ("RIOB18", "IOB_PAD", "IOB_O", "IOB_I"),
    ] {
        t.insert(tile_type, pad_wire, o_wire, Vec::new());
        t.insert(tile_type, i_wire, pad_wire, Vec::new());
        t.insert(tile_type, "IOB_DIFFI_IN", pad_wire, Vec::new());
        t.insert(tile_type, "IOB_PADOUT", pad_wire, Vec::new());
    }
}

/// CLK_HROW BUFH mux activations: choosing one of 12 HROW-side BUFH inputs
/// for a given clock region half/side asserts a single enable feature.
fn add_clk_hrow_bufh_entries(t: &mut PseudoPipTable) {
    for tb in ["TOP", "BOT"] {
        for lr in ["L", "R"] {
            for idx in 0..12 {
                let dst = format!("CLK_HROW_CK_BUFHROW_{tb}{lr}{idx}");
                for gclk in 0..32 {
                    let src = format!("CLK_HROW_CK_GCLK{gclk}");
                    t.insert(
                        "CLK_HROW_TOP_R",
                        &dst,
                        &src,
                        ss(&[&format!("BUFH_{tb}{lr}{idx}.IN_USE")]),
                    );
                }
            }
        }
    }
}

/// CLK_BUFG BUFGCTRL I0/I1 mux activations: selecting input N on either mux
/// port of one of the 16 BUFGCTRLs also forces the opposite input's ZINV bit,
/// since an unused input floats to its inverted-sense default.
fn add_clk_bufg_bufgctrl_entries(t: &mut PseudoPipTable) {
    for idx in 0..16 {
        for port in ["I0", "I1"] {
            let opposite = if port == "I0" { "I1" } else { "I0" };
            for gclk in 0..16 {
                let dst = format!("CLK_BUFG_BUFGCTRL{idx}_{port}");
                let src = format!("CLK_BUFG_CK_GCLK_B{gclk}");
                t.insert(
                    "CLK_BUFG_TOP_R",
                    &dst,
                    &src,
                    ss(&[
                        &format!("BUFGCTRL.BUFGCTRL_X0Y{idx}.{port}MUX.GCLK_B{gclk}"),
                        &format!("BUFGCTRL.BUFGCTRL_X0Y{idx}.ZINV_{opposite}"),
                    ]),
                );
            }
        }
    }
}

/// HCLK_IOI BUFR bypass: routing straight through a BUFR slot without using
/// the buffer still requires naming a feature so the unused buffer's inputs
/// don't float.
fn add_hclk_ioi_bufr_entries(t: &mut PseudoPipTable) {
    for idx in 0..4 {
        t.insert(
            "HCLK_IOI",
            &format!("HCLK_IOI_BUFR{idx}_O"),
            &format!("HCLK_IOI_BUFR{idx}_I"),
            ss(&[&format!("BUFR.BUFR_X0Y{idx}.BYPASS")]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ioi3_ologic_hit_matches_worked_example() {
        let t = build_table();
        let hit = t
            .lookup("LIOI3", "LIOI_OLOGIC0_OQ", "IOI_OLOGIC0_D1")
            .expect("pseudo-pip entry must exist");
        assert_eq!(
            hit,
            &[
                "OLOGIC_Y0.OMUX.D1".to_string(),
                "OLOGIC_Y0.OQUSED".to_string(),
                "OLOGIC_Y0.OSERDES.DATA_RATE_TQ.BUF".to_string(),
            ]
        );
    }

    #[test]
    fn iob_passthrough_entries_are_empty_but_present() {
        let t = build_table();
        let hit = t.lookup("IOB33", "IOB_PAD", "IOB_O").unwrap();
        assert!(hit.is_empty());
    }

    #[test]
    fn miss_returns_none() {
        let t = build_table();
        assert!(t.lookup("CLBLL_L", "NOPE", "NOPE").is_none());
    }
}
