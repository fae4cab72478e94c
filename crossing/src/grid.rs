use std::cell::OnceCell;
use std::collections::HashSet;

use floorstat_device::{Fabric, RangeKind, TileId, TileRange};
use floorstat_pblock::{Partition, PartitionMap};

use crate::CrossingError;

/// A rectangular arrangement of partitions, addressed by column and row.
pub trait PartitionGrid {
    type Fabric: Fabric;

    fn fabric(&self) -> &Self::Fabric;

    /// Number of columns and rows.
    fn dims(&self) -> (usize, usize);

    fn name(&self, col: usize, row: usize) -> String;

    fn tiles(&self, col: usize, row: usize) -> Result<&HashSet<TileId>, CrossingError>;
}

/// One partition per clock region.
pub struct ClockRegionGrid<'a, F: Fabric> {
    fabric: &'a F,
    cols: usize,
    rows: usize,
    parts: Vec<OnceCell<Partition>>,
}

impl<'a, F: Fabric> ClockRegionGrid<'a, F> {
    pub fn new(fabric: &'a F) -> Self {
        let (cols, rows) = fabric.clock_region_shape();
        ClockRegionGrid {
            fabric,
            cols,
            rows,
            parts: (0..cols * rows).map(|_| OnceCell::new()).collect(),
        }
    }
}

impl<F: Fabric> PartitionGrid for ClockRegionGrid<'_, F> {
    type Fabric = F;

    fn fabric(&self) -> &F {
        self.fabric
    }

    fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn name(&self, col: usize, row: usize) -> String {
        format!("X{col}Y{row}")
    }

    fn tiles(&self, col: usize, row: usize) -> Result<&HashSet<TileId>, CrossingError> {
        if col >= self.cols || row >= self.rows {
            return Err(CrossingError::InvalidCoordinate { col, row });
        }
        let cell = &self.parts[col * self.rows + row];
        if let Some(part) = cell.get() {
            return Ok(part.tiles());
        }
        let xy = (col as u32, row as u32);
        let range = TileRange {
            kind: RangeKind::ClockRegion,
            lo: xy,
            hi: xy,
        };
        let part = Partition::from_range(self.fabric, self.name(col, row), range)?;
        Ok(cell.get_or_init(|| part).tiles())
    }
}

/// A grid over pblocks reconstructed from constraints, each covering a
/// `w` by `h` block of clock regions and named after its corner regions.
pub struct PblockGrid<'a, F: Fabric> {
    map: PartitionMap<'a, F>,
    total_col: usize,
    total_row: usize,
    w: usize,
    h: usize,
}

impl<'a, F: Fabric> PblockGrid<'a, F> {
    pub fn new(
        map: PartitionMap<'a, F>,
        total_col: usize,
        total_row: usize,
    ) -> Result<Self, CrossingError> {
        let (cr_cols, cr_rows) = map.fabric().clock_region_shape();
        if !(1..=cr_cols).contains(&total_col) || !(1..=cr_rows).contains(&total_row) {
            return Err(CrossingError::InvalidGridShape {
                cols: total_col,
                rows: total_row,
                cr_cols,
                cr_rows,
            });
        }
        Ok(PblockGrid {
            w: cr_cols / total_col,
            h: cr_rows / total_row,
            map,
            total_col,
            total_row,
        })
    }

    pub fn partitions(&self) -> &PartitionMap<'a, F> {
        &self.map
    }
}

impl<F: Fabric> PartitionGrid for PblockGrid<'_, F> {
    type Fabric = F;

    fn fabric(&self) -> &F {
        self.map.fabric()
    }

    fn dims(&self) -> (usize, usize) {
        (self.total_col, self.total_row)
    }

    fn name(&self, col: usize, row: usize) -> String {
        let (w, h) = (self.w, self.h);
        format!(
            "X{x0}Y{y0}X{x1}Y{y1}",
            x0 = col * w,
            y0 = row * h,
            x1 = (col + 1) * w - 1,
            y1 = (row + 1) * h - 1
        )
    }

    fn tiles(&self, col: usize, row: usize) -> Result<&HashSet<TileId>, CrossingError> {
        if col >= self.total_col || row >= self.total_row {
            return Err(CrossingError::InvalidCoordinate { col, row });
        }
        let name = self.name(col, row);
        match self.map.get(&name) {
            Some(part) => Ok(part.tiles()),
            None => Err(CrossingError::UnknownPartition(name)),
        }
    }
}
