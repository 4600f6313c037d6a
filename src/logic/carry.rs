//! `CARRY4` encoding: one carry-chain primitive per half, sharing the half's
//! four LUT/FF lanes.

use crate::context::EmissionContext;
use crate::design::CellInfo;
use crate::error::Result;

/// Emits the `CARRY4` bound at `bel_name` (e.g. `CARRY4`). `cin_connected`
/// is whether the `CIN` port has a net bound to it at all — a `CARRY4` at
/// the bottom of a column leaves it floating and falls back to the
/// `PRECYINIT` mux's other sources.
///
/// `cy0_out` reports, per lane `0..4`, whether that lane's `?CY0_OUT` mux
/// should be asserted (the carry-lane's XOR output is fed to the lane's own
/// `O` site wire rather than routed elsewhere).
pub fn emit(ctx: &mut EmissionContext, bel_name: &str, cell: &CellInfo, cy0_out: [bool; 4]) -> Result<()> {
    let cin_connected = cell.ports.connected("CIN");

    ctx.write_bit(&format!("{bel_name}.PRECYINIT.OUT"), true)?;
    ctx.write_bit(&format!("{bel_name}.PRECYINIT.CIN"), cin_connected)?;

    for (lane, used) in cy0_out.iter().enumerate() {
        ctx.write_bit(&format!("{bel_name}.CY0_OUT{lane}"), *used)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use std::collections::BTreeMap;

    fn carry_cell(cin: Option<NetId>) -> CellInfo {
        let mut attrs = BTreeMap::new();
        attrs.insert("X_ORIG_TYPE".to_string(), Value::Str("CARRY4".to_string()));
        let mut ports = BTreeMap::new();
        ports.insert("CIN".to_string(), cin);
        CellInfo {
            name: "carry".into(),
            bel: None,
            params: BTreeMap::new(),
            attrs,
            ports: Ports(ports),
        }
    }

    #[test]
    fn floating_cin_falls_back_to_precyinit_out_only() {
        let cell = carry_cell(None);
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit(&mut ctx, "CARRY4", &cell, [true, false, false, true]).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("CARRY4.PRECYINIT.OUT\n"));
        assert!(!out.contains("PRECYINIT.CIN"));
        assert!(out.contains("CARRY4.CY0_OUT0\n"));
        assert!(!out.contains("CY0_OUT1\n"));
        assert!(out.contains("CARRY4.CY0_OUT3\n"));
    }

    #[test]
    fn connected_cin_emits_precyinit_cin() {
        let cell = carry_cell(Some(NetId(3)));
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit(&mut ctx, "CARRY4", &cell, [false, false, false, false]).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("PRECYINIT.CIN\n"));
    }
}
