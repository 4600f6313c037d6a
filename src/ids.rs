//! Flat integer identifiers for the handful of PNR object kinds the emission
//! core touches. The real database indexes everything by dense integers;
//! wrapping them keeps tile/wire/pip/bel/cell/net ids from being accidentally
//! swapped at call sites.

use std::fmt;

macro_rules! flat_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(pub i32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(v: i32) -> Self {
                $name(v)
            }
        }
    };
}

flat_id!(TileIndex);
flat_id!(WireId);
flat_id!(PipId);
flat_id!(CellId);
flat_id!(NetId);

/// A bel is addressed by the tile it lives in plus an index local to that
/// tile's type, matching how sites are enumerated in the tile-type catalogue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BelId {
    pub tile: TileIndex,
    pub index: i32,
}

impl fmt::Display for BelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tile.0, self.index)
    }
}
