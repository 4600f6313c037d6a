//! Flip-flop decode for one fracturable half of a SLICE: `FDRE`/`FDSE`/
//! `FDCE`/`FDPE`, each optionally suffixed `_1` for the negedge variant.
//!
//! All eight FF sub-bels in a half must agree on latch-mode, sync-mode,
//! clock-inversion, set/reset-used and CE-used — real silicon has one shared
//! clock/SR/CE network per half, so disagreement between placed cells is a
//! packer bug, not a legal configuration.

use crate::context::EmissionContext;
use crate::design::{CellInfo, Design};
use crate::error::{EmitError, Result};
use crate::ids::NetId;

/// The shared-network configuration every FF in a half must agree on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FfConfig {
    pub sync: bool,
    /// True for the reset/clear variants (`FDRE`, `FDCE`); these clear their
    /// output to zero rather than set it to one.
    pub zrst: bool,
    pub negedge: bool,
}

/// Splits an `X_ORIG_TYPE` like `FDRE_1` into its base kind and the negedge
/// suffix, then resolves the shared-network configuration. Returns `None`
/// for anything that isn't a recognised FF kind.
pub fn decode(orig_type: &str) -> Option<FfConfig> {
    let (base, negedge) = match orig_type.strip_suffix("_1") {
        Some(b) => (b, true),
        None => (orig_type, false),
    };
    let (sync, zrst) = match base {
        "FDRE" => (true, true),
        "FDSE" => (true, false),
        "FDCE" => (false, true),
        "FDPE" => (false, false),
        _ => return None,
    };
    Some(FfConfig { sync, zrst, negedge })
}

/// True iff `pin` is connected to a net other than the packer's constant net
/// `constant`. Used for both `SR` (against `gnd_net`) and `CE` (against
/// `vcc_net`): a pin tied to the relevant constant is "unused" even though a
/// net is technically bound to it.
fn pin_is_used(cell: &CellInfo, pin: &str, constant: Option<NetId>) -> bool {
    match cell.ports.net(pin) {
        Some(n) => Some(n) != constant,
        None => false,
    }
}

/// One placed FF bel within a half, keyed by its bel-letter name (`AFF`,
/// `AFF2`, `BFF`, ...).
pub struct FfSlot<'a> {
    pub bel_name: &'a str,
    pub cell: &'a CellInfo,
}

/// Emits every FF in one half, after checking that they all agree on the
/// shared-network configuration. `d_mux` resolves the per-FF D-input routing
/// bel feature, if any (looked up by the caller via the site-PIP scan shared
/// with the LUT `?DI1MUX`/`WEMUX` scan).
pub fn emit_half(
    ctx: &mut EmissionContext,
    design: &dyn Design,
    slots: &[FfSlot],
    d_mux: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if slots.is_empty() {
        return Ok(());
    }

    let mut config: Option<FfConfig> = None;
    let mut sr_used = false;
    let mut ce_used = false;

    for slot in slots {
        let cfg = decode(slot.cell.orig_type()).ok_or_else(|| EmitError::UnsupportedCellType {
            orig_type: slot.cell.orig_type().to_string(),
            bel: slot.bel_name.to_string(),
        })?;
        match config {
            None => config = Some(cfg),
            Some(existing) if existing == cfg => {}
            Some(_) => {
                return Err(EmitError::Invariant(format!(
                    "FF sub-bels in one half disagree on shared configuration at {}",
                    slot.bel_name
                )))
            }
        }
        sr_used |= pin_is_used(slot.cell, "SR", design.gnd_net());
        ce_used |= pin_is_used(slot.cell, "CE", design.vcc_net());
    }
    let config = config.unwrap();

    for slot in slots {
        let init_is_one = slot.cell.param_int("INIT") == Some(1);

        ctx.write_bit(&format!("{}.ZINI", slot.bel_name), !init_is_one)?;
        ctx.write_bit(&format!("{}.ZRST", slot.bel_name), config.zrst)?;
        ctx.write_bit(&format!("{}.FFSYNC", slot.bel_name), config.sync)?;
        ctx.write_bit(&format!("{}.CLKINV", slot.bel_name), config.negedge)?;
        ctx.write_bit(&format!("{}.SRUSEDMUX", slot.bel_name), sr_used)?;
        ctx.write_bit(&format!("{}.CEUSEDMUX", slot.bel_name), ce_used)?;

        if let Some(feature) = d_mux(slot.bel_name) {
            ctx.write_bit(&feature, true)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use std::collections::BTreeMap;

    fn ff_cell(orig_type: &str, init: i64, sr: Option<NetId>, ce: Option<NetId>) -> CellInfo {
        let mut attrs = BTreeMap::new();
        attrs.insert("X_ORIG_TYPE".to_string(), Value::Str(orig_type.to_string()));
        let mut params = BTreeMap::new();
        params.insert("INIT".to_string(), Value::Int(init));
        let mut ports = BTreeMap::new();
        ports.insert("SR".to_string(), sr);
        ports.insert("CE".to_string(), ce);
        CellInfo {
            name: "ff".into(),
            bel: None,
            params,
            attrs,
            ports: Ports(ports),
        }
    }

    #[test]
    fn fdre_with_vcc_tied_ce_suppresses_ceusedmux() {
        let vcc = NetId(1);
        let rst = NetId(2);
        let cell = ff_cell("FDRE", 0, Some(rst), Some(vcc));
        let mut design = TestDesign::new();
        design.set_vcc(vcc);

        let slots = [FfSlot { bel_name: "AFF", cell: &cell }];
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        emit_half(&mut ctx, &design, &slots, |_| None).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert!(out.contains("AFF.ZINI\n"));
        assert!(out.contains("AFF.ZRST\n"));
        assert!(out.contains("AFF.FFSYNC\n"));
        assert!(out.contains("AFF.SRUSEDMUX\n"));
        assert!(!out.contains("CEUSEDMUX"));
        assert!(!out.contains("CLKINV"));
    }

    #[test]
    fn disagreeing_half_is_an_invariant_error() {
        let a = ff_cell("FDRE", 0, None, None);
        let b = ff_cell("FDPE", 0, None, None);
        let slots = [
            FfSlot { bel_name: "AFF", cell: &a },
            FfSlot { bel_name: "BFF", cell: &b },
        ];
        let design = TestDesign::new();
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        let err = emit_half(&mut ctx, &design, &slots, |_| None).unwrap_err();
        assert!(matches!(err, EmitError::Invariant(_)));
    }

    #[test]
    fn negedge_suffix_forces_clkinv() {
        let cell = ff_cell("FDCE_1", 1, None, None);
        let cfg = decode(cell.orig_type()).unwrap();
        assert!(cfg.negedge);
        assert!(!cfg.sync);
        assert!(cfg.zrst);
    }
}
