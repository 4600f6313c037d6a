//! The read-only PNR device database: tile/wire/pip/bel catalogue.
//!
//! This is consumed, never built, by the emission core. The driver supplies
//! a concrete `Database` backed by whatever on-disk device format it loads;
//! the core only ever asks it questions. [`crate::testutil`] provides a
//! small in-memory implementation used by the unit tests.

use crate::ids::{BelId, PipId, TileIndex, WireId};

/// Sentinel and ordinary wire intents. Only the two sentinels the emitter
/// branches on are named; everything else collapses to `Other`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WireIntent {
    PseudoGnd,
    PseudoVcc,
    Other,
}

bitflags::bitflags! {
    /// PIP flags. Only `TILE_ROUTING` is load-bearing for the router;
    /// anything else is a site PIP and is handled by the per-cell encoders
    /// instead of the routing emitter.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct PipFlags: u32 {
        const TILE_ROUTING = 1 << 0;
    }
}

/// Data carried by a single PIP.
#[derive(Clone, Debug)]
pub struct PipData {
    pub tile: TileIndex,
    pub src_wire: WireId,
    pub dst_wire: WireId,
    pub flags: PipFlags,
    /// Route-thru marker (`1`) or bel-pin id for site PIPs; `0` otherwise.
    pub extra_data: i32,
    /// Site-PIP provenance: the bel this PIP belongs to, if it is a site PIP.
    pub bel: Option<BelId>,
}

/// Data carried by a single tile instance.
#[derive(Clone, Debug)]
pub struct TileData {
    pub type_name: String,
    pub inst_name: String,
    pub x: i32,
    pub y: i32,
    pub wires: Vec<WireId>,
    pub bels: Vec<BelId>,
    pub pips: Vec<PipId>,
}

pub trait Database {
    fn tile(&self, idx: TileIndex) -> &TileData;
    fn tile_type(&self, idx: TileIndex) -> &str {
        &self.tile(idx).type_name
    }

    fn wire_name(&self, wire: WireId) -> &str;
    fn wire_intent(&self, wire: WireId) -> WireIntent;
    /// The tile a wire belongs to.
    fn wire_tile(&self, wire: WireId) -> TileIndex;

    fn pip(&self, pip: PipId) -> &PipData;
    fn pips_uphill(&self, wire: WireId) -> &[PipId];

    fn bel_site(&self, bel: BelId) -> &str;
    fn bel_site_loc_in_tile(&self, bel: BelId) -> (u32, u32);
    fn bel_by_name(&self, name: &str) -> Option<BelId>;
    fn is_logic_tile(&self, bel: BelId) -> bool;

    /// HCLK tile index that owns the I/O or BUFH logic for `tile`.
    fn hclk_for_ioi(&self, tile: TileIndex) -> TileIndex;
    /// HCLK tile index that owns the I/O bank containing `bel`.
    fn hclk_for_iob(&self, bel: BelId) -> TileIndex;

    fn tiles_and_types(&self) -> &[(TileIndex, String)];

    /// Finds a wire named `name` within `tile`, if the tile's type has one.
    /// Used by the OCLK/OCLKM unification rule in the routing emitter, which
    /// needs to ask "is the partner wire currently bound to anything" by
    /// name rather than by index.
    fn wire_by_name_in_tile(&self, tile: TileIndex, name: &str) -> Option<WireId> {
        self.tile(tile)
            .wires
            .iter()
            .copied()
            .find(|&w| self.wire_name(w) == name)
    }
}
