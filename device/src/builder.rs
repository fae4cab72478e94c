use std::collections::HashMap;

use unnamed_entity::EntityVec;

use crate::device::{ClockRegion, Device, NodeId, Pip, Site, SiteId, SiteType, Tile, TileId};
use crate::intent::IntentCode;
use crate::range::{RangeError, split_xy};

pub struct DeviceBuilder {
    device: Device,
    tile_coords: HashMap<(u16, u16), TileId>,
}

impl DeviceBuilder {
    pub fn new(name: &str, cr_cols: u16, cr_rows: u16) -> Self {
        Self {
            device: Device {
                name: name.to_string(),
                cr_cols,
                cr_rows,
                tiles: EntityVec::new(),
                nodes: EntityVec::new(),
                sites: EntityVec::new(),
                site_index: HashMap::new(),
            },
            tile_coords: HashMap::new(),
        }
    }

    /// A device where every clock region is a `cr_width` by `cr_height`
    /// block of `INT_X<x>Y<y>` tiles, with no routing and no sites yet.
    pub fn clock_region_grid(
        name: &str,
        cr_cols: u16,
        cr_rows: u16,
        cr_width: u16,
        cr_height: u16,
    ) -> Self {
        let mut res = Self::new(name, cr_cols, cr_rows);
        for x in 0..cr_cols * cr_width {
            for y in 0..cr_rows * cr_height {
                let cr = ClockRegion {
                    x: x / cr_width,
                    y: y / cr_height,
                };
                res.add_tile(&format!("INT_X{x}Y{y}"), x, y, Some(cr));
            }
        }
        res
    }

    pub fn add_tile(
        &mut self,
        name: &str,
        x: u16,
        y: u16,
        clock_region: Option<ClockRegion>,
    ) -> TileId {
        let id = self.device.tiles.push(Tile {
            name: name.to_string(),
            x,
            y,
            clock_region,
            pips: vec![],
        });
        self.tile_coords.insert((x, y), id);
        id
    }

    pub fn tile_at(&self, x: u16, y: u16) -> Option<TileId> {
        self.tile_coords.get(&(x, y)).copied()
    }

    pub fn add_node(&mut self, wire: &str, intent: IntentCode) -> NodeId {
        self.device.nodes.push(crate::device::Node {
            wire: wire.to_string(),
            intent,
        })
    }

    pub fn add_pip(&mut self, tile: TileId, start: Option<NodeId>, end: Option<NodeId>) {
        self.device.tiles[tile].pips.push(Pip { start, end });
    }

    /// Registers a site; its name must be of the `PREFIX_X<x>Y<y>` form.
    pub fn add_site(
        &mut self,
        tile: TileId,
        name: &str,
        kind: SiteType,
    ) -> Result<SiteId, RangeError> {
        let (prefix, x, y) = split_xy(name).ok_or_else(|| RangeError::Malformed(name.to_string()))?;
        if prefix.is_empty() {
            return Err(RangeError::Malformed(name.to_string()));
        }
        let id = self.device.sites.push(Site {
            name: name.to_string(),
            prefix: prefix.to_string(),
            x,
            y,
            kind,
            tile,
        });
        self.device.site_index.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn finish(self) -> Device {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::DeviceBuilder;
    use crate::device::SiteType;
    use crate::range::{RangeError, TileRange};
    use crate::Fabric;

    #[test]
    fn test_clock_region_ranges() {
        let dev = DeviceBuilder::clock_region_grid("xctest", 2, 3, 4, 5).finish();
        assert_eq!(dev.tiles.len(), 2 * 4 * 3 * 5);
        assert_eq!(dev.clock_region_shape(), (2, 3));
        let r = TileRange::parse("CLOCKREGION_X1Y0:CLOCKREGION_X1Y1").unwrap();
        let tiles = dev.range_tiles(&r).unwrap();
        assert_eq!(tiles.len(), 4 * 5 * 2);
        for t in tiles {
            let cr = dev.tiles[t].clock_region.unwrap();
            assert_eq!(cr.x, 1);
            assert!(cr.y <= 1);
        }
        let r = TileRange::parse("X0Y0:X2Y0").unwrap();
        assert_matches!(dev.range_tiles(&r), Err(RangeError::UnknownClockRegion(_)));
    }

    #[test]
    fn test_site_ranges() {
        let mut b = DeviceBuilder::clock_region_grid("xctest", 1, 1, 4, 4);
        for x in 0..4 {
            for y in 0..4 {
                let t = b.tile_at(x, y).unwrap();
                b.add_site(t, &format!("SLICE_X{x}Y{y}"), SiteType::SliceL)
                    .unwrap();
            }
        }
        assert_matches!(
            b.add_site(b.tile_at(0, 0).unwrap(), "X0Y0", SiteType::SliceL),
            Err(RangeError::Malformed(_))
        );
        let dev = b.finish();
        let r = TileRange::parse("SLICE_X1Y1:SLICE_X2Y3").unwrap();
        assert_eq!(dev.range_tiles(&r).unwrap().len(), 2 * 3);
        let r = TileRange::parse("SLICE_X1Y1:SLICE_X7Y3").unwrap();
        assert_eq!(
            dev.range_tiles(&r),
            Err(RangeError::UnknownSite("SLICE_X7Y3".to_string()))
        );
    }
}
