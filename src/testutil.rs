//! In-memory `Database`/`Design` implementations used only by unit tests.
//! Mirrors the shape a real driver would populate from its device files,
//! just built up imperatively instead of loaded from disk.

#![cfg(test)]

use std::collections::{BTreeMap, HashMap, HashSet};

pub use crate::context::{Bits, EmissionContext};
pub use crate::db::{Database, PipData, PipFlags, TileData, WireIntent};
pub use crate::design::{CellInfo, Design, NetInfo, Ports, TileStatus, UsedWire, Value};
pub use crate::error::{EmitError, Result};
pub use crate::ids::{BelId, CellId, NetId, PipId, TileIndex, WireId};

struct WireRec {
    name: String,
    intent: WireIntent,
    tile: TileIndex,
}

struct BelRec {
    site: String,
    loc: (u32, u32),
}

#[derive(Default)]
pub struct TestDb {
    tiles: Vec<TileData>,
    wires: Vec<WireRec>,
    pips: Vec<PipData>,
    bels: HashMap<BelId, BelRec>,
    bel_names: HashMap<String, BelId>,
    uphill: HashMap<WireId, Vec<PipId>>,
    hclk_for_ioi: HashMap<TileIndex, TileIndex>,
    hclk_for_iob: HashMap<BelId, TileIndex>,
    logic_bels: HashSet<BelId>,
    tiles_and_types: Vec<(TileIndex, String)>,
}

impl TestDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, type_name: &str, inst_name: &str, x: i32, y: i32) -> TileIndex {
        let idx = TileIndex(self.tiles.len() as i32);
        self.tiles.push(TileData {
            type_name: type_name.to_string(),
            inst_name: inst_name.to_string(),
            x,
            y,
            wires: Vec::new(),
            bels: Vec::new(),
            pips: Vec::new(),
        });
        self.tiles_and_types.push((idx, type_name.to_string()));
        idx
    }

    pub fn add_wire(&mut self, tile: TileIndex, name: &str, intent: WireIntent) -> WireId {
        let idx = WireId(self.wires.len() as i32);
        self.wires.push(WireRec {
            name: name.to_string(),
            intent,
            tile,
        });
        self.tiles[tile.0 as usize].wires.push(idx);
        idx
    }

    pub fn add_pip(
        &mut self,
        tile: TileIndex,
        src: WireId,
        dst: WireId,
        flags: PipFlags,
        extra_data: i32,
        bel: Option<BelId>,
    ) -> PipId {
        let idx = PipId(self.pips.len() as i32);
        self.pips.push(PipData {
            tile,
            src_wire: src,
            dst_wire: dst,
            flags,
            extra_data,
            bel,
        });
        self.tiles[tile.0 as usize].pips.push(idx);
        self.uphill.entry(dst).or_default().push(idx);
        idx
    }

    pub fn add_bel(&mut self, tile: TileIndex, name: &str, site: &str, loc: (u32, u32)) -> BelId {
        let index = self.tiles[tile.0 as usize].bels.len() as i32;
        let id = BelId { tile, index };
        self.tiles[tile.0 as usize].bels.push(id);
        self.bels.insert(
            id,
            BelRec {
                site: site.to_string(),
                loc,
            },
        );
        self.bel_names.insert(name.to_string(), id);
        id
    }

    pub fn mark_logic_tile(&mut self, bel: BelId) {
        self.logic_bels.insert(bel);
    }

    pub fn set_hclk_for_ioi(&mut self, tile: TileIndex, hclk: TileIndex) {
        self.hclk_for_ioi.insert(tile, hclk);
    }

    pub fn set_hclk_for_iob(&mut self, bel: BelId, hclk: TileIndex) {
        self.hclk_for_iob.insert(bel, hclk);
    }
}

impl Database for TestDb {
    fn tile(&self, idx: TileIndex) -> &TileData {
        &self.tiles[idx.0 as usize]
    }

    fn wire_name(&self, wire: WireId) -> &str {
        &self.wires[wire.0 as usize].name
    }

    fn wire_intent(&self, wire: WireId) -> WireIntent {
        self.wires[wire.0 as usize].intent
    }

    fn wire_tile(&self, wire: WireId) -> TileIndex {
        self.wires[wire.0 as usize].tile
    }

    fn pip(&self, pip: PipId) -> &PipData {
        &self.pips[pip.0 as usize]
    }

    fn pips_uphill(&self, wire: WireId) -> &[PipId] {
        self.uphill.get(&wire).map(Vec::as_slice).unwrap_or(&[])
    }

    fn bel_site(&self, bel: BelId) -> &str {
        &self.bels[&bel].site
    }

    fn bel_site_loc_in_tile(&self, bel: BelId) -> (u32, u32) {
        self.bels[&bel].loc
    }

    fn bel_by_name(&self, name: &str) -> Option<BelId> {
        self.bel_names.get(name).copied()
    }

    fn is_logic_tile(&self, bel: BelId) -> bool {
        self.logic_bels.contains(&bel)
    }

    fn hclk_for_ioi(&self, tile: TileIndex) -> TileIndex {
        self.hclk_for_ioi.get(&tile).copied().unwrap_or(TileIndex(i32::MAX))
    }

    fn hclk_for_iob(&self, bel: BelId) -> TileIndex {
        self.hclk_for_iob.get(&bel).copied().unwrap_or(TileIndex(i32::MAX))
    }

    fn tiles_and_types(&self) -> &[(TileIndex, String)] {
        &self.tiles_and_types
    }
}

#[derive(Default)]
pub struct TestDesign {
    pub(crate) cells: BTreeMap<CellId, CellInfo>,
    nets: BTreeMap<NetId, NetInfo>,
    bound_pip_net: HashMap<PipId, NetId>,
    bound_wire_net: HashMap<WireId, NetId>,
    tile_status: HashMap<TileIndex, TileStatus>,
    gnd: Option<NetId>,
    vcc: Option<NetId>,
}

impl TestDesign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_net(&mut self, name: &str, driver: Option<(CellId, String)>, wires: Vec<(PipId, WireId)>) -> NetId {
        let id = NetId(self.nets.len() as i32);
        let used: Vec<UsedWire> = wires
            .iter()
            .map(|&(p, w)| UsedWire {
                wire: w,
                driving_pip: Some(p),
            })
            .collect();
        for &(p, w) in &wires {
            self.bound_pip_net.insert(p, id);
            self.bound_wire_net.insert(w, id);
        }
        self.nets.insert(
            id,
            NetInfo {
                name: name.to_string(),
                driver,
                users: Vec::new(),
                wires: used,
            },
        );
        id
    }

    pub fn add_cell(
        &mut self,
        name: &str,
        bel: Option<BelId>,
        attrs: Vec<(&str, &str)>,
        params: Vec<(&str, Value)>,
        ports: Vec<(&str, Option<NetId>)>,
    ) -> CellId {
        let id = CellId(self.cells.len() as i32);
        let attrs = attrs.into_iter().map(|(k, v)| (k.to_string(), Value::Str(v.to_string()))).collect();
        let params = params.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let ports = Ports(ports.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        self.cells.insert(
            id,
            CellInfo {
                name: name.to_string(),
                bel,
                params,
                attrs,
                ports,
            },
        );
        id
    }

    pub fn set_gnd(&mut self, n: NetId) {
        self.gnd = Some(n);
    }

    pub fn set_vcc(&mut self, n: NetId) {
        self.vcc = Some(n);
    }

    pub fn set_tile_status(&mut self, tile: TileIndex, ts: TileStatus) {
        self.tile_status.insert(tile, ts);
    }
}

impl Design for TestDesign {
    fn cells(&self) -> &BTreeMap<CellId, CellInfo> {
        &self.cells
    }

    fn nets(&self) -> &BTreeMap<NetId, NetInfo> {
        &self.nets
    }

    fn bound_pip_net(&self, pip: PipId) -> Option<NetId> {
        self.bound_pip_net.get(&pip).copied()
    }

    fn bound_wire_net(&self, wire: WireId) -> Option<NetId> {
        self.bound_wire_net.get(&wire).copied()
    }

    fn tile_status(&self, tile: TileIndex) -> Option<&TileStatus> {
        self.tile_status.get(&tile)
    }

    fn gnd_net(&self) -> Option<NetId> {
        self.gnd
    }

    fn vcc_net(&self) -> Option<NetId> {
        self.vcc
    }
}
