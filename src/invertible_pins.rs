//! Which pins of a given logical cell kind carry an `IS_*_INVERTED`
//! parameter. Obtained once per emission and consulted by the logic, I/O,
//! BRAM and DSP encoders whenever they need to know whether a pin's
//! `ZINV_*` feature applies to this cell kind at all.

use std::collections::{BTreeMap, BTreeSet};

pub struct InvertiblePins {
    by_orig_type: BTreeMap<&'static str, BTreeSet<&'static str>>,
}

impl InvertiblePins {
    pub fn pins(&self, orig_type: &str) -> &BTreeSet<&'static str> {
        static EMPTY: BTreeSet<&'static str> = BTreeSet::new();
        self.by_orig_type.get(orig_type).unwrap_or(&EMPTY)
    }

    pub fn has(&self, orig_type: &str, pin: &str) -> bool {
        self.pins(orig_type).contains(pin)
    }
}

/// Builds the table once per emission, matching the set of `IS_*_INVERTED`
/// parameters the packer attaches per cell kind.
pub fn build() -> InvertiblePins {
    let mut by_orig_type: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();

    by_orig_type.insert("FDRE", ["C", "R"].into_iter().collect());
    by_orig_type.insert("FDSE", ["C", "S"].into_iter().collect());
    by_orig_type.insert("FDCE", ["C", "CLR"].into_iter().collect());
    by_orig_type.insert("FDPE", ["C", "PRE"].into_iter().collect());

    by_orig_type.insert(
        "RAMB36E1",
        ["CLKARDCLK", "CLKBWRCLK", "ENARDEN", "ENBWREN", "REGCEAREGCE", "REGCEB", "RSTRAMARSTRAM", "RSTRAMB", "RSTREGARSTREG", "RSTREGB"]
            .into_iter()
            .collect(),
    );
    by_orig_type.insert("RAMB18E1", by_orig_type["RAMB36E1"].clone());

    by_orig_type.insert(
        "DSP48E1",
        ["CLK", "RSTA", "RSTALLCARRYIN", "RSTALUMODE", "RSTB", "RSTC", "RSTCTRL", "RSTD", "RSTINMODE", "RSTM", "RSTP"]
            .into_iter()
            .collect(),
    );

    by_orig_type.insert("ILOGICE3_IFF", ["C", "D"].into_iter().collect());
    by_orig_type.insert("OLOGICE2_OUTFF", ["CLK", "CLKDIV"].into_iter().collect());
    by_orig_type.insert("OLOGICE3_OUTFF", ["CLK", "CLKDIV"].into_iter().collect());
    by_orig_type.insert("OSERDESE2", ["CLK", "CLKDIV"].into_iter().collect());
    by_orig_type.insert("ISERDESE2", ["CLK", "CLKB", "CLKDIV"].into_iter().collect());
    by_orig_type.insert("IDELAYE2_IDELAYE2", ["C"].into_iter().collect());
    by_orig_type.insert("ODELAYE2_ODELAYE2", ["C"].into_iter().collect());

    InvertiblePins { by_orig_type }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ff_clock_is_invertible() {
        let t = build();
        assert!(t.has("FDRE", "C"));
        assert!(!t.has("FDRE", "CE"));
    }

    #[test]
    fn unknown_type_has_no_invertible_pins() {
        let t = build();
        assert!(t.pins("LUT6").is_empty());
    }
}
