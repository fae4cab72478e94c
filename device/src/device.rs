use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use bincode::{Decode, Encode};
use unnamed_entity::{EntityVec, entity_id};

use crate::intent::IntentCode;
use crate::range::{RangeError, RangeKind, TileRange};
use crate::Fabric;

entity_id! {
    pub id TileId u32;
    pub id NodeId u32;
    pub id SiteId u32;
}

entity_id_bincode!(TileId, NodeId, SiteId);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Encode, Decode)]
pub struct ClockRegion {
    pub x: u16,
    pub y: u16,
}

impl std::fmt::Display for ClockRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CLOCKREGION_X{x}Y{y}", x = self.x, y = self.y)
    }
}

/// A tile-local programmable interconnect point.  Either end may be missing
/// (dangling wires at the die edge, unbonded pads).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Encode, Decode)]
pub struct Pip {
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Tile {
    pub name: String,
    pub x: u16,
    pub y: u16,
    pub clock_region: Option<ClockRegion>,
    pub pips: Vec<Pip>,
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Node {
    pub wire: String,
    pub intent: IntentCode,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Encode, Decode)]
pub enum SiteType {
    SliceL,
    SliceM,
    Dsp48E2,
    RambFifo36,
    Ramb181,
    RambFifo18,
    Uram288,
    Other(String),
}

impl SiteType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SLICEL" => SiteType::SliceL,
            "SLICEM" => SiteType::SliceM,
            "DSP48E2" => SiteType::Dsp48E2,
            "RAMBFIFO36" => SiteType::RambFifo36,
            "RAMB181" => SiteType::Ramb181,
            "RAMBFIFO18" => SiteType::RambFifo18,
            "URAM288" => SiteType::Uram288,
            _ => SiteType::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SiteType::SliceL => "SLICEL",
            SiteType::SliceM => "SLICEM",
            SiteType::Dsp48E2 => "DSP48E2",
            SiteType::RambFifo36 => "RAMBFIFO36",
            SiteType::Ramb181 => "RAMB181",
            SiteType::RambFifo18 => "RAMBFIFO18",
            SiteType::Uram288 => "URAM288",
            SiteType::Other(name) => name,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Site {
    pub name: String,
    pub prefix: String,
    pub x: u32,
    pub y: u32,
    pub kind: SiteType,
    pub tile: TileId,
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Device {
    pub name: String,
    pub cr_cols: u16,
    pub cr_rows: u16,
    pub tiles: EntityVec<TileId, Tile>,
    pub nodes: EntityVec<NodeId, Node>,
    pub sites: EntityVec<SiteId, Site>,
    pub site_index: HashMap<String, SiteId>,
}

impl Device {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let f = File::open(path)?;
        let mut cf = zstd::stream::Decoder::new(f)?;
        let config = bincode::config::standard();
        Ok(bincode::decode_from_std_read(&mut cf, config)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let f = File::create(path)?;
        let mut cf = zstd::stream::Encoder::new(f, 9)?;
        let config = bincode::config::standard();
        bincode::encode_into_std_write(self, &mut cf, config)?;
        cf.finish()?;
        Ok(())
    }

    pub fn site_by_name(&self, name: &str) -> Option<SiteId> {
        self.site_index.get(name).copied()
    }

    pub fn tiles_in_clock_regions(&self, lo: ClockRegion, hi: ClockRegion) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|(_, tile)| {
                tile.clock_region
                    .is_some_and(|cr| cr.x >= lo.x && cr.x <= hi.x && cr.y >= lo.y && cr.y <= hi.y)
            })
            .map(|(id, _)| id)
            .collect()
    }

    fn site_range_tiles(&self, range: &TileRange) -> Result<Vec<TileId>, RangeError> {
        let (lo, hi) = range.corner_names();
        let lo = self.site_by_name(&lo).ok_or(RangeError::UnknownSite(lo))?;
        let hi = self.site_by_name(&hi).ok_or(RangeError::UnknownSite(hi))?;
        let tlo = &self.tiles[self.sites[lo].tile];
        let thi = &self.tiles[self.sites[hi].tile];
        let (x0, x1) = (tlo.x.min(thi.x), tlo.x.max(thi.x));
        let (y0, y1) = (tlo.y.min(thi.y), tlo.y.max(thi.y));
        Ok(self
            .tiles
            .iter()
            .filter(|(_, t)| t.x >= x0 && t.x <= x1 && t.y >= y0 && t.y <= y1)
            .map(|(id, _)| id)
            .collect())
    }
}

impl Fabric for Device {
    fn clock_region_shape(&self) -> (usize, usize) {
        (self.cr_cols.into(), self.cr_rows.into())
    }

    fn range_tiles(&self, range: &TileRange) -> Result<Vec<TileId>, RangeError> {
        match range.kind {
            RangeKind::ClockRegion => {
                if range.hi.0 >= u32::from(self.cr_cols) || range.hi.1 >= u32::from(self.cr_rows) {
                    return Err(RangeError::UnknownClockRegion(range.to_string()));
                }
                let lo = ClockRegion {
                    x: range.lo.0 as u16,
                    y: range.lo.1 as u16,
                };
                let hi = ClockRegion {
                    x: range.hi.0 as u16,
                    y: range.hi.1 as u16,
                };
                Ok(self.tiles_in_clock_regions(lo, hi))
            }
            RangeKind::Site(_) => self.site_range_tiles(range),
        }
    }

    fn pip_endpoints(
        &self,
        tile: TileId,
    ) -> impl Iterator<Item = (Option<NodeId>, Option<NodeId>)> + '_ {
        self.tiles[tile].pips.iter().map(|pip| (pip.start, pip.end))
    }

    fn wire_name(&self, node: NodeId) -> &str {
        &self.nodes[node].wire
    }

    fn intent(&self, node: NodeId) -> IntentCode {
        self.nodes[node].intent
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{name} ({cols}x{rows} clock regions, {tiles} tiles, {nodes} nodes)",
            name = self.name,
            cols = self.cr_cols,
            rows = self.cr_rows,
            tiles = self.tiles.len(),
            nodes = self.nodes.len(),
        )
    }
}
