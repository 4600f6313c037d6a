//! The bound physical design: placed cells, routed nets, and the per-tile
//! slot bookkeeping the logic/BRAM encoders key off. Read-only from the
//! emitter's point of view — placement and routing have already run.

use std::collections::BTreeMap;

use crate::ids::{BelId, CellId, NetId, PipId, TileIndex, WireId};

/// A cell parameter or attribute value. Most are strings; numeric and
/// bitstring forms are kept distinct so callers don't have to re-parse a
/// decimal string every time they want an integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    /// A Verilog-style bitstring, MSB first, as found in e.g. `INIT`.
    Bits(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Str(s) => s.parse().ok(),
            Value::Bits(b) => i64::from_str_radix(b, 2).ok(),
        }
    }

    pub fn as_bits(&self) -> Option<&str> {
        match self {
            Value::Bits(b) => Some(b),
            _ => None,
        }
    }
}

/// A cell port: the net (if any) bound to a named pin.
#[derive(Clone, Debug, Default)]
pub struct Ports(pub BTreeMap<String, Option<NetId>>);

impl Ports {
    pub fn net(&self, pin: &str) -> Option<NetId> {
        self.0.get(pin).copied().flatten()
    }

    pub fn connected(&self, pin: &str) -> bool {
        self.net(pin).is_some()
    }
}

/// A placed cell.
#[derive(Clone, Debug)]
pub struct CellInfo {
    pub name: String,
    pub bel: Option<BelId>,
    pub params: BTreeMap<String, Value>,
    pub attrs: BTreeMap<String, Value>,
    pub ports: Ports,
}

impl CellInfo {
    /// The `X_ORIG_TYPE` attribute: the logical cell kind before technology
    /// mapping folded it onto a physical bel (e.g. `LUT6`, `FDRE`, `RAMB36E1`).
    pub fn orig_type(&self) -> &str {
        self.attrs
            .get("X_ORIG_TYPE")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn param_int(&self, name: &str) -> Option<i64> {
        self.params.get(name).and_then(Value::as_int)
    }

    pub fn param_bits(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_bits)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }
}

/// A single wire used by a net, with the PIP (if any) that drove it.
#[derive(Clone, Copy, Debug)]
pub struct UsedWire {
    pub wire: WireId,
    pub driving_pip: Option<PipId>,
}

/// A net: one driver, many sinks, the set of wires it occupies once routed.
#[derive(Clone, Debug, Default)]
pub struct NetInfo {
    pub name: String,
    pub driver: Option<(CellId, String)>,
    pub users: Vec<(CellId, String)>,
    pub wires: Vec<UsedWire>,
}

/// Packed `(half<<6) | (beletter<<4) | subkind` slot index, as used to index
/// `TileStatus::lts_cells`/`bts_cells`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SlotIndex(pub u16);

impl SlotIndex {
    pub fn new(half: u8, beletter: u8, subkind: u8) -> Self {
        SlotIndex(((half as u16) << 6) | ((beletter as u16) << 4) | subkind as u16)
    }
}

/// Per-tile logic/BRAM sub-slot occupancy, mirroring `lts->cells[]` /
/// `bts->cells[]` in the PNR layer.
#[derive(Clone, Debug, Default)]
pub struct TileStatus {
    pub logic_cells: BTreeMap<SlotIndex, CellId>,
    pub bram_cells: BTreeMap<SlotIndex, CellId>,
}

pub trait Design {
    fn cells(&self) -> &BTreeMap<CellId, CellInfo>;
    fn nets(&self) -> &BTreeMap<NetId, NetInfo>;

    fn cell(&self, id: CellId) -> &CellInfo {
        &self.cells()[&id]
    }

    fn net(&self, id: NetId) -> &NetInfo {
        &self.nets()[&id]
    }

    fn bound_pip_net(&self, pip: PipId) -> Option<NetId>;
    fn bound_wire_net(&self, wire: WireId) -> Option<NetId>;

    fn tile_status(&self, tile: TileIndex) -> Option<&TileStatus>;

    /// The packer's constant-0/constant-1 nets, used by several "is this
    /// actually connected, or just tied to a packer constant" checks (CE/SR
    /// usedness, GND/VCC pin flipping).
    fn gnd_net(&self) -> Option<NetId>;
    fn vcc_net(&self) -> Option<NetId>;
}
