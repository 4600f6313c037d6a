//! LUT INIT permutation — the algorithmic heart of the logic-tile encoder.
//!
//! A fracturable 6-LUT site can hold either one LUT6 (or a RAM/SRL cell
//! shaped like one) occupying the whole 64-entry physical truth table, or
//! two independent smaller cells sharing the physical A1..A6 address pins,
//! each owning one 32-entry half. Either way the cell's logical INIT has to
//! be re-addressed through the physical-to-logical pin mapping before it can
//! be written out as the physical `INIT[63:0]` vector.

use crate::design::CellInfo;

/// Logical input pin names, in truth-table bit order, for every cell kind
/// that can occupy a LUT6/LUT5 sub-bel.
pub fn logical_inputs(orig_type: &str) -> &'static [&'static str] {
    match orig_type {
        "LUT1" => &["I0"],
        "LUT2" => &["I0", "I1"],
        "LUT3" => &["I0", "I1", "I2"],
        "LUT4" => &["I0", "I1", "I2", "I3"],
        "LUT5" => &["I0", "I1", "I2", "I3", "I4"],
        "LUT6" => &["I0", "I1", "I2", "I3", "I4", "I5"],
        "RAMD64E" => &["RADR0", "RADR1", "RADR2", "RADR3", "RADR4", "RADR5"],
        "RAMD32" => &["RADR0", "RADR1", "RADR2", "RADR3", "RADR4"],
        "SRL16E" => &["A0", "A1", "A2", "A3"],
        "SRLC32E" => &["A0", "A1", "A2", "A3", "A4"],
        _ => &[],
    }
}

/// Parses the `X_ORIG_PORT_A1..A6` attributes into a physical-pin (A1..A6,
/// index 0..6) to logical-bit-position mapping. A physical pin can feed more
/// than one logical pin when a smaller LUT occupies the 5-LUT slot of a
/// fractured 6-LUT and its physical address pins are shared with the other
/// half.
pub fn phys_to_log(cell: &CellInfo) -> [Vec<u8>; 6] {
    let pins = logical_inputs(cell.orig_type());
    let mut table: [Vec<u8>; 6] = Default::default();
    for (i, slot) in table.iter_mut().enumerate() {
        let key = format!("X_ORIG_PORT_A{}", i + 1);
        if let Some(list) = cell.attr_str(&key) {
            for name in list.split_whitespace() {
                if let Some(bit) = pins.iter().position(|p| *p == name) {
                    slot.push(bit as u8);
                }
            }
        }
    }
    table
}

/// Computes the 64-entry physical truth table for one sub-LUT. Bit `j` of
/// the physical address space maps to logical address `OR_{i: bit i of j
/// set} OR_{b in phys_to_log[i]} (1 << b)`.
pub fn permute_lut_init(phys_to_log: &[Vec<u8>; 6], logical_init: u64) -> [bool; 64] {
    let mut out = [false; 64];
    for (j, out_bit) in out.iter_mut().enumerate() {
        let mut log_addr: u32 = 0;
        for (i, logical_bits) in phys_to_log.iter().enumerate() {
            if (j >> i) & 1 != 0 {
                for &b in logical_bits {
                    log_addr |= 1 << b;
                }
            }
        }
        *out_bit = (logical_init >> log_addr) & 1 != 0;
    }
    out
}

/// Parses a Verilog-style `W'bBBBB...`/`W'hHHHH...` or bare binary-digit
/// `INIT` parameter value into a `u64`, MSB-first as it appears in source
/// text.
pub fn parse_init_u64(raw: &str) -> u64 {
    match raw.find('\'') {
        Some(pos) => {
            let rest = &raw[pos + 1..];
            let mut chars = rest.chars();
            match chars.next() {
                Some('b') | Some('B') => u64::from_str_radix(chars.as_str(), 2).unwrap_or(0),
                Some('h') | Some('H') => u64::from_str_radix(chars.as_str(), 16).unwrap_or(0),
                Some('o') | Some('O') => u64::from_str_radix(chars.as_str(), 8).unwrap_or(0),
                Some('d') | Some('D') => chars.as_str().parse().unwrap_or(0),
                _ => 0,
            }
        }
        None => u64::from_str_radix(raw, 2).unwrap_or_else(|_| raw.parse().unwrap_or(0)),
    }
}

/// Two sub-LUT cells sharing one fracturable 6-LUT slot. Either may be
/// absent; both absent means the slot is unused.
pub struct HalfLut<'a> {
    pub lut6: Option<&'a CellInfo>,
    pub lut5: Option<&'a CellInfo>,
}

impl<'a> HalfLut<'a> {
    pub fn is_used(&self) -> bool {
        self.lut6.is_some() || self.lut5.is_some()
    }

    fn is_fractured(&self) -> bool {
        self.lut6.is_some() && self.lut5.is_some()
    }

    /// The combined 64-bit physical `INIT` vector for this fracturable slot.
    pub fn combined_init(&self) -> u64 {
        let mut init = 0u64;
        let fractured = self.is_fractured();

        if let Some(c6) = self.lut6 {
            let map = phys_to_log(c6);
            let logical_init = parse_init_u64(c6.param_bits("INIT").or_else(|| c6.param_str("INIT")).unwrap_or("0"));
            let full = permute_lut_init(&map, logical_init);
            let range = if fractured { 32..64 } else { 0..64 };
            for j in range {
                if full[j] {
                    init |= 1 << j;
                }
            }
        }

        if let Some(c5) = self.lut5 {
            let map = phys_to_log(c5);
            let logical_init = parse_init_u64(c5.param_bits("INIT").or_else(|| c5.param_str("INIT")).unwrap_or("0"));
            let full = permute_lut_init(&map, logical_init);
            for j in 0..32 {
                if full[j] {
                    init |= 1 << j;
                }
            }
        }

        init
    }

    pub fn is_ram(&self) -> bool {
        self.any_orig_type_is(&["RAMD64E", "RAMD32"])
    }

    pub fn is_srl(&self) -> bool {
        self.any_orig_type_is(&["SRL16E", "SRLC32E"])
    }

    pub fn is_small(&self) -> bool {
        self.lut6.is_none() && self.lut5.is_some()
    }

    fn any_orig_type_is(&self, kinds: &[&str]) -> bool {
        [self.lut6, self.lut5]
            .into_iter()
            .flatten()
            .any(|c| kinds.contains(&c.orig_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Value;
    use std::collections::BTreeMap;

    fn lut_cell(orig_type: &str, ports: &[(&str, &str)], init: &str) -> CellInfo {
        let mut attrs = BTreeMap::new();
        attrs.insert("X_ORIG_TYPE".to_string(), Value::Str(orig_type.to_string()));
        for (port, logical) in ports {
            attrs.insert(format!("X_ORIG_PORT_{port}"), Value::Str(logical.to_string()));
        }
        let mut params = BTreeMap::new();
        params.insert("INIT".to_string(), Value::Str(init.to_string()));
        CellInfo {
            name: "cell".into(),
            bel: None,
            params,
            attrs,
            ports: crate::design::Ports::default(),
        }
    }

    #[test]
    fn lut2_unused_address_bits_are_replicated() {
        // LUT2 INIT=4'b1000 (only I0=I1=1 is asserted), I0 -> A1, I1 -> A2.
        // A3..A6 are unconnected, so the physical bit is 1 exactly on the
        // quarter of addresses where bit0 and bit1 are both set, regardless
        // of the other four address bits.
        let cell = lut_cell("LUT2", &[("A1", "I0"), ("A2", "I1")], "4'b1000");
        let half = HalfLut {
            lut6: Some(&cell),
            lut5: None,
        };
        let init = half.combined_init();
        for j in 0..64u32 {
            let expect = (j & 0b11) == 0b11;
            assert_eq!((init >> j) & 1 != 0, expect, "mismatch at address {j}");
        }
    }

    #[test]
    fn fractured_halves_are_independent() {
        let lut6 = lut_cell("LUT6", &[("A1", "I0"), ("A2", "I1"), ("A3", "I2"), ("A4", "I3"), ("A5", "I4"), ("A6", "I5")], "64'hFFFFFFFF00000000");
        let lut5 = lut_cell("LUT5", &[("A1", "I0"), ("A2", "I1"), ("A3", "I2"), ("A4", "I3"), ("A5", "I4")], "32'h00000001");
        let half = HalfLut {
            lut6: Some(&lut6),
            lut5: Some(&lut5),
        };
        let init = half.combined_init();
        assert_eq!(init & 0xFFFF_FFFF, 1);
        assert_eq!(init >> 32, 0xFFFF_FFFF);
    }

    #[test]
    fn parses_hex_init_literal() {
        assert_eq!(parse_init_u64("64'hFF"), 0xFF);
        assert_eq!(parse_init_u64("1010"), 0b1010);
    }
}
