//! The emission context: the hierarchical dotted-prefix stack and the
//! handful of primitives every encoder writes lines through.
//!
//! Every feature line is either a bare flag (`tile.path.to.feature`) or a
//! sized binary literal (`tile.path.to.feature[W-1:0] = W'bBBBB...`). Both
//! forms, plus the blank-line separator, funnel through this module so the
//! "no two consecutive blank lines" and "prefix stack returns to empty"
//! invariants only need to be maintained in one place.

use std::io::Write;

use crate::error::Result;

/// A fixed-width bit vector, bit 0 is the least-significant bit. This is the
/// value type behind every `write_vector`/`write_int_vector` call; INIT/INITP
/// contents, PATTERN/MASK, and the small per-feature constants all go
/// through it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bits {
    bits: Vec<bool>,
}

impl Bits {
    pub fn zeros(width: usize) -> Self {
        Bits { bits: vec![false; width] }
    }

    pub fn from_u64(value: u64, width: usize) -> Self {
        let mut bits = vec![false; width];
        for (i, b) in bits.iter_mut().enumerate() {
            *b = (value >> i) & 1 != 0;
        }
        Bits { bits }
    }

    pub fn from_bools(bits: Vec<bool>) -> Self {
        Bits { bits }
    }

    /// Parse a Verilog-style `W'bBBBB...` binary literal's digit run (MSB
    /// first, as it appears in source text) into a `Bits` (bit 0 = LSB).
    pub fn parse_msb_first(digits: &str) -> Self {
        let mut bits = vec![false; digits.len()];
        for (pos, ch) in digits.chars().enumerate() {
            let bit_index = digits.len() - 1 - pos;
            bits[bit_index] = ch == '1';
        }
        Bits { bits }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    pub fn set(&mut self, i: usize, v: bool) {
        self.bits[i] = v;
    }

    pub fn invert(&self) -> Bits {
        Bits {
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    pub fn any(&self) -> bool {
        self.bits.iter().any(|b| *b)
    }

    /// Digits MSB-first, as they appear after `W'b` in the output text.
    pub fn to_msb_first_string(&self) -> String {
        self.bits.iter().rev().map(|b| if *b { '1' } else { '0' }).collect()
    }
}

/// Drains the pushed prefix frames when dropped, so a `?` early-return out
/// of an encoder can never leave the stack unbalanced.
pub struct PrefixGuard<'ctx, 'w> {
    ctx: &'ctx mut EmissionContext<'w>,
    depth: usize,
}

impl<'ctx, 'w> Drop for PrefixGuard<'ctx, 'w> {
    fn drop(&mut self) {
        self.ctx.pop(self.depth);
    }
}

impl<'ctx, 'w> std::ops::Deref for PrefixGuard<'ctx, 'w> {
    type Target = EmissionContext<'w>;
    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'ctx, 'w> std::ops::DerefMut for PrefixGuard<'ctx, 'w> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

pub struct EmissionContext<'w> {
    out: &'w mut dyn Write,
    prefix: Vec<String>,
    last_was_blank: bool,
}

impl<'w> EmissionContext<'w> {
    pub fn new(out: &'w mut dyn Write) -> Self {
        EmissionContext {
            out,
            prefix: Vec::new(),
            last_was_blank: true, // no leading blank line needed at start of file
        }
    }

    pub fn push(&mut self, s: impl Into<String>) {
        self.prefix.push(s.into());
    }

    pub fn pop(&mut self, n: usize) {
        let new_len = self.prefix.len().saturating_sub(n);
        self.prefix.truncate(new_len);
    }

    pub fn pop1(&mut self) {
        self.pop(1);
    }

    /// Push one frame for the duration of `f`; the frame is popped even if
    /// `f` returns an error.
    pub fn scope(&mut self, name: impl Into<String>) -> PrefixGuard<'_, 'w> {
        self.push(name);
        PrefixGuard { ctx: self, depth: 1 }
    }

    fn joined(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix.join("."), name)
        }
    }

    /// Emits `<prefix>.<name>\n` iff `cond` is true.
    pub fn write_bit(&mut self, name: &str, cond: bool) -> Result<()> {
        if cond {
            writeln!(self.out, "{}", self.joined(name))?;
            self.last_was_blank = false;
        }
        Ok(())
    }

    /// Emits `<prefix>.<name> = W'bBBBB...\n` unconditionally; callers guard
    /// vector emission on their own "is this feature's owner enabled" check
    /// before calling, per the invariant in the spec.
    pub fn write_vector(&mut self, name: &str, bits: &Bits, invert: bool) -> Result<()> {
        let bits = if invert { bits.invert() } else { bits.clone() };
        writeln!(
            self.out,
            "{} = {}'b{}",
            self.joined(name),
            bits.width(),
            bits.to_msb_first_string()
        )?;
        self.last_was_blank = false;
        Ok(())
    }

    pub fn write_int_vector(&mut self, name: &str, value: u64, width: usize, invert: bool) -> Result<()> {
        let bits = Bits::from_u64(value, width);
        self.write_vector(name, &bits, invert)
    }

    /// Emits a single blank-line separator. Idempotent: calling it twice in a
    /// row (or calling it right after the last emitted line was already a
    /// blank) only ever produces one blank line.
    pub fn blank(&mut self) -> Result<()> {
        if !self.last_was_blank {
            writeln!(self.out)?;
            self.last_was_blank = true;
        }
        Ok(())
    }

    pub fn prefix_depth(&self) -> usize {
        self.prefix.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut EmissionContext) -> Result<()>) -> String {
        let mut buf = Vec::new();
        {
            let mut ctx = EmissionContext::new(&mut buf);
            f(&mut ctx).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn prefix_joins_with_dots() {
        let out = render(|ctx| {
            ctx.push("TILE");
            ctx.push("SLICE_X0");
            ctx.write_bit("FEATURE", true)?;
            ctx.pop(2);
            Ok(())
        });
        assert_eq!(out, "TILE.SLICE_X0.FEATURE\n");
    }

    #[test]
    fn scope_pops_even_on_early_return() {
        let mut buf = Vec::new();
        let mut ctx = EmissionContext::new(&mut buf);
        let result: Result<()> = (|| {
            let mut s = ctx.scope("A");
            s.write_bit("X", true)?;
            Err(crate::error::EmitError::Invariant("boom".into()))
        })();
        assert!(result.is_err());
        assert_eq!(ctx.prefix_depth(), 0);
    }

    #[test]
    fn false_cond_emits_nothing() {
        let out = render(|ctx| ctx.write_bit("FEATURE", false));
        assert_eq!(out, "");
    }

    #[test]
    fn blank_collapses() {
        let out = render(|ctx| {
            ctx.write_bit("A", true)?;
            ctx.blank()?;
            ctx.blank()?;
            ctx.write_bit("B", true)?;
            Ok(())
        });
        assert_eq!(out, "A\n\nB\n");
    }

    #[test]
    fn leading_blank_is_suppressed() {
        let out = render(|ctx| ctx.blank());
        assert_eq!(out, "");
    }

    #[test]
    fn vector_bit_order_round_trips() {
        let bits = Bits::from_u64(0b1010_1100, 8);
        let out = render(|ctx| ctx.write_vector("X", &bits, false));
        assert_eq!(out.trim(), "X = 8'b10101100");
        let parsed = Bits::parse_msb_first("10101100");
        assert_eq!(parsed, bits);
    }

    #[test]
    fn vector_invert_flips_every_bit() {
        let bits = Bits::from_u64(0b10, 2);
        let out = render(|ctx| ctx.write_vector("X", &bits, true));
        assert_eq!(out.trim(), "X = 2'b01");
    }
}
