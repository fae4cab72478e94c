use std::collections::HashSet;

use floorstat_device::{Fabric, NodeId, TileId};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::classify::{NodeClass, classify};
use crate::grid::PartitionGrid;
use crate::{Crossing, CrossingError, CrossingTable, Dir};

/// Every node some PIP of the given tiles starts or ends at.
pub fn nodes_in_tiles(fabric: &impl Fabric, tiles: &HashSet<TileId>) -> HashSet<NodeId> {
    let mut res = HashSet::new();
    for &tile in tiles {
        for (start, end) in fabric.pip_endpoints(tile) {
            res.extend(start);
            res.extend(end);
        }
    }
    res
}

/// Number of countable nodes reachable from both tile sets.
pub fn count_between(
    fabric: &impl Fabric,
    a: &HashSet<TileId>,
    b: &HashSet<TileId>,
) -> Result<u32, CrossingError> {
    let na = nodes_in_tiles(fabric, a);
    let nb = nodes_in_tiles(fabric, b);
    let mut shared: Vec<_> = na.intersection(&nb).copied().collect();
    shared.sort();
    let mut res = 0;
    for node in shared {
        if classify(fabric, node)? == NodeClass::Countable {
            res += 1;
        }
    }
    Ok(res)
}

/// Fills a [`CrossingTable`] for a whole grid.  Partitions are visited
/// column by column, rows ascending, so that the south and west counts can
/// be taken from neighbours that were already done.
pub struct CrossingCounter<'g, G: PartitionGrid> {
    grid: &'g G,
    table: CrossingTable,
    bar: ProgressBar,
}

impl<'g, G: PartitionGrid> CrossingCounter<'g, G> {
    pub fn new(grid: &'g G) -> Self {
        CrossingCounter {
            grid,
            table: CrossingTable::default(),
            bar: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        let (cols, rows) = self.grid.dims();
        bar.set_length((cols * rows) as u64);
        self.bar = bar;
        self
    }

    pub fn neighbor(&self, col: usize, row: usize, dir: Dir) -> Option<(usize, usize)> {
        let (cols, rows) = self.grid.dims();
        match dir {
            Dir::W => col.checked_sub(1).map(|c| (c, row)),
            Dir::E => (col + 1 < cols).then_some((col + 1, row)),
            Dir::S => row.checked_sub(1).map(|r| (col, r)),
            Dir::N => (row + 1 < rows).then_some((col, row + 1)),
        }
    }

    /// Counts one boundary from scratch, ignoring the table.
    pub fn direct(&self, col: usize, row: usize, dir: Dir) -> Result<Option<u32>, CrossingError> {
        let (cols, rows) = self.grid.dims();
        if col >= cols || row >= rows {
            return Err(CrossingError::InvalidCoordinate { col, row });
        }
        let Some((ncol, nrow)) = self.neighbor(col, row, dir) else {
            return Ok(None);
        };
        let a = self.grid.tiles(col, row)?;
        let b = self.grid.tiles(ncol, nrow)?;
        Ok(Some(count_between(self.grid.fabric(), a, b)?))
    }

    /// All four boundaries of a partition counted from scratch.
    pub fn direct_all(&self, col: usize, row: usize) -> Result<Crossing, CrossingError> {
        let mut res = Crossing::default();
        for dir in Dir::DIRS {
            res.0[dir] = self.direct(col, row, dir)?;
        }
        Ok(res)
    }

    fn reused(&self, col: usize, row: usize, dir: Dir) -> Option<u32> {
        let (ncol, nrow) = self.neighbor(col, row, dir)?;
        self.table.get(ncol, nrow)?.get(!dir)
    }

    /// Counts the boundaries of one partition and records them.
    pub fn count(&mut self, col: usize, row: usize) -> Result<&Crossing, CrossingError> {
        let mut res = Crossing::default();
        for dir in Dir::DIRS {
            if self.neighbor(col, row, dir).is_none() {
                continue;
            }
            let count = match dir {
                Dir::S | Dir::W => match self.reused(col, row, dir) {
                    Some(count) => Some(count),
                    None => {
                        warn!(
                            "{name}: no {opp} count recorded for the {dir} neighbour, counting directly",
                            name = self.grid.name(col, row),
                            opp = !dir
                        );
                        self.direct(col, row, dir)?
                    }
                },
                Dir::E | Dir::N => self.direct(col, row, dir)?,
            };
            res.0[dir] = count;
        }
        info!("{name}: {res}", name = self.grid.name(col, row));
        Ok(self.table.insert(col, row, res))
    }

    pub fn run(mut self) -> Result<CrossingTable, CrossingError> {
        let (cols, rows) = self.grid.dims();
        for col in 0..cols {
            for row in 0..rows {
                self.count(col, row)?;
                self.bar.inc(1);
            }
        }
        self.bar.finish();
        Ok(self.table)
    }

    pub fn table(&self) -> &CrossingTable {
        &self.table
    }
}
