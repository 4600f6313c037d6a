//! Per-bank accumulator: settings derived from the cumulative set of PADs
//! seen in one I/O bank, flushed once at the end of I/O emission.
//!
//! This is the accumulator pattern called out in the design notes: a plain
//! mapping updated imperatively during the PAD pass, read only during flush.

use std::collections::BTreeMap;

use crate::context::EmissionContext;
use crate::error::Result;
use crate::ids::TileIndex;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct BankConfig {
    pub stepdown: bool,
    pub vref: bool,
    pub tmds_33_in_use: bool,
    pub lvds_25_in_use: bool,
    pub only_diff_in_use: bool,
}

impl BankConfig {
    fn merge(&mut self, other: BankConfig) {
        self.stepdown |= other.stepdown;
        self.vref |= other.vref;
        self.tmds_33_in_use |= other.tmds_33_in_use;
        self.lvds_25_in_use |= other.lvds_25_in_use;
        self.only_diff_in_use |= other.only_diff_in_use;
    }
}

#[derive(Default)]
pub struct IoConfigByHclk {
    banks: BTreeMap<TileIndex, BankConfig>,
}

impl IoConfigByHclk {
    pub fn accumulate(&mut self, hclk: TileIndex, update: BankConfig) {
        self.banks.entry(hclk).or_default().merge(update);
    }

    /// Writes the `VREF.V_675_MV`, `STEPDOWN`, and `*_IN_USE` bank features
    /// at each HCLK tile's own prefix. Iteration is over the sorted
    /// `TileIndex` key, matching the deterministic-iteration rule.
    pub fn flush(&self, ctx: &mut EmissionContext, hclk_names: impl Fn(TileIndex) -> String) -> Result<()> {
        for (&hclk, cfg) in self.banks.iter() {
            let mut scope = ctx.scope(hclk_names(hclk));
            scope.write_bit("STEPDOWN", cfg.stepdown)?;
            scope.write_bit("VREF.V_675_MV", cfg.vref)?;
            scope.write_bit("ONLY_DIFF_IN_USE", cfg.only_diff_in_use)?;
            scope.write_bit("TMDS_33_IN_USE", cfg.tmds_33_in_use)?;
            scope.write_bit("LVDS_25_IN_USE", cfg.lvds_25_in_use)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sstl_pad_emits_vref_once_per_bank() {
        let mut banks = IoConfigByHclk::default();
        banks.accumulate(TileIndex(1), BankConfig { vref: true, ..Default::default() });
        banks.accumulate(TileIndex(1), BankConfig { vref: true, ..Default::default() });
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        banks.flush(&mut ctx, |t| format!("HCLK_{}", t.0)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches("VREF.V_675_MV").count(), 1);
    }
}
