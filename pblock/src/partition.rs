use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};

use floorstat_device::{Fabric, RangeError, TileId, TileRange};
use itertools::Itertools;
use tracing::debug;

use crate::error::PblockError;

/// A named floorplan region: a union of rectangular ranges.
#[derive(Clone, Debug)]
pub struct Partition {
    pub name: String,
    ranges: Vec<(TileRange, Vec<TileId>)>,
    tiles: OnceCell<HashSet<TileId>>,
}

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Partition {
            name: name.into(),
            ranges: vec![],
            tiles: OnceCell::new(),
        }
    }

    /// A partition made of a single, already resolved range.
    pub fn from_range(
        fabric: &impl Fabric,
        name: impl Into<String>,
        range: TileRange,
    ) -> Result<Self, RangeError> {
        let mut res = Partition::new(name);
        res.add_range(fabric, range)?;
        Ok(res)
    }

    pub fn add_range(&mut self, fabric: &impl Fabric, range: TileRange) -> Result<(), RangeError> {
        let tiles = fabric.range_tiles(&range)?;
        self.ranges.push((range, tiles));
        self.tiles.take();
        Ok(())
    }

    pub fn remove_range(&mut self, range: &TileRange) -> Result<(), PblockError> {
        Err(PblockError::UnsupportedOperation(format!(
            "removing {range} from {name}",
            name = self.name
        )))
    }

    pub fn ranges(&self) -> impl Iterator<Item = &TileRange> {
        self.ranges.iter().map(|(r, _)| r)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The union of the tiles of all ranges, computed on first use.
    pub fn tiles(&self) -> &HashSet<TileId> {
        self.tiles.get_or_init(|| {
            self.ranges
                .iter()
                .flat_map(|(_, tiles)| tiles.iter().copied())
                .collect()
        })
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.ranges().join(" "))
    }
}

/// Which geometry a reconstruction is for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Drop block RAM, DSP and UltraRAM ranges.  Those only pin cascade
    /// columns and would distort the routing boundary between pblocks.
    pub skip_cascade_ranges: bool,
}

impl ReconstructOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry used for boundary crossing counts.
    pub fn crossing() -> Self {
        Self {
            skip_cascade_ranges: true,
        }
    }

    /// Geometry used for resource utilization.
    pub fn utilization() -> Self {
        Self {
            skip_cascade_ranges: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    Added,
    Skipped,
}

/// The name to partition table of one reconstruction pass.
pub struct PartitionMap<'a, F: Fabric> {
    fabric: &'a F,
    options: ReconstructOptions,
    parts: BTreeMap<String, Partition>,
}

impl<'a, F: Fabric> PartitionMap<'a, F> {
    pub fn new(fabric: &'a F, options: ReconstructOptions) -> Self {
        PartitionMap {
            fabric,
            options,
            parts: BTreeMap::new(),
        }
    }

    pub fn fabric(&self) -> &'a F {
        self.fabric
    }

    pub fn options(&self) -> ReconstructOptions {
        self.options
    }

    pub fn create(&mut self, name: &str) -> Result<(), PblockError> {
        if self.parts.contains_key(name) {
            return Err(PblockError::DuplicatePartition(name.to_string()));
        }
        self.parts.insert(name.to_string(), Partition::new(name));
        Ok(())
    }

    pub fn add_range(&mut self, name: &str, range: &str) -> Result<RangeOutcome, PblockError> {
        let part = self
            .parts
            .get_mut(name)
            .ok_or_else(|| PblockError::UnknownPartition(name.to_string()))?;
        let range = TileRange::parse(range)?;
        if self.options.skip_cascade_ranges && range.is_cascade_column() {
            debug!("{name}: skipping cascade range {range}");
            return Ok(RangeOutcome::Skipped);
        }
        part.add_range(self.fabric, range)?;
        Ok(RangeOutcome::Added)
    }

    pub fn remove_range(&mut self, name: &str, range: &str) -> Result<(), PblockError> {
        let part = self
            .parts
            .get_mut(name)
            .ok_or_else(|| PblockError::UnknownPartition(name.to_string()))?;
        let range = TileRange::parse(range)?;
        part.remove_range(&range)
    }

    pub fn get(&self, name: &str) -> Option<&Partition> {
        self.parts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Partition)> {
        self.parts.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use floorstat_device::TileRange;
    use floorstat_device::builder::DeviceBuilder;

    use super::*;

    #[test]
    fn test_tiles_memo() {
        let dev = DeviceBuilder::clock_region_grid("xctest", 2, 2, 3, 3).finish();
        let mut part = Partition::new("p");
        part.add_range(&dev, TileRange::parse("X0Y0:X0Y0").unwrap())
            .unwrap();
        let first: *const _ = part.tiles();
        assert_eq!(part.tiles().len(), 9);
        assert!(std::ptr::eq(first, part.tiles()));
        part.add_range(&dev, TileRange::parse("X1Y1:X1Y1").unwrap())
            .unwrap();
        assert_eq!(part.tiles().len(), 18);
        // overlapping ranges union, not add up
        part.add_range(&dev, TileRange::parse("X0Y0:X1Y0").unwrap())
            .unwrap();
        assert_eq!(part.tiles().len(), 27);
        assert_eq!(
            part.to_string(),
            "p=CLOCKREGION_X0Y0:CLOCKREGION_X0Y0 CLOCKREGION_X1Y1:CLOCKREGION_X1Y1 CLOCKREGION_X0Y0:CLOCKREGION_X1Y0"
        );
    }

    #[test]
    fn test_map() {
        let dev = DeviceBuilder::clock_region_grid("xctest", 2, 2, 3, 3).finish();
        let mut map = PartitionMap::new(&dev, ReconstructOptions::crossing());
        map.create("a").unwrap();
        assert_matches!(map.create("a"), Err(PblockError::DuplicatePartition(n)) if n == "a");
        assert_matches!(
            map.add_range("b", "X0Y0:X0Y0"),
            Err(PblockError::UnknownPartition(_))
        );
        assert_eq!(map.add_range("a", "X0Y0:X0Y1"), Ok(RangeOutcome::Added));
        assert_eq!(
            map.add_range("a", "RAMB36_X0Y0:RAMB36_X0Y5"),
            Ok(RangeOutcome::Skipped)
        );
        assert_matches!(
            map.remove_range("a", "X0Y0:X0Y0"),
            Err(PblockError::UnsupportedOperation(_))
        );
        assert_eq!(map.get("a").unwrap().tiles().len(), 18);

        let mut map = PartitionMap::new(&dev, ReconstructOptions::utilization());
        map.create("a").unwrap();
        assert_matches!(
            map.add_range("a", "RAMB36_X0Y0:RAMB36_X0Y5"),
            Err(PblockError::Range(_))
        );
    }
}
