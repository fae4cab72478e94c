//! Boundary crossing counts between adjacent partitions of a floorplan.
//!
//! Two partitions are adjacent when they are neighbours in a [`PartitionGrid`]:
//! either the device's own clock region grid or a grid of pblocks rebuilt
//! from the design's constraints.  The count for a boundary is the number of
//! distinct general routing nodes that PIPs on both sides touch.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use enum_map::{Enum, EnumMap};
use floorstat_device::{Fabric, PlacedDesign, RangeError};
use floorstat_pblock::{ReconstructOptions, ScriptError, reconstruct};
use serde_json::{Map, Value};

pub mod classify;
pub mod count;
pub mod grid;

pub use classify::{IntentViolation, NodeClass, UnexpectedIntentCode, classify};
pub use count::CrossingCounter;
pub use grid::{ClockRegionGrid, PartitionGrid, PblockGrid};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Enum)]
pub enum Dir {
    W,
    E,
    S,
    N,
}

impl Dir {
    pub const DIRS: [Dir; 4] = [Dir::W, Dir::E, Dir::S, Dir::N];
}

impl core::ops::Not for Dir {
    type Output = Dir;
    fn not(self) -> Dir {
        match self {
            Dir::W => Dir::E,
            Dir::E => Dir::W,
            Dir::S => Dir::N,
            Dir::N => Dir::S,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Dir::W => "W",
                Dir::E => "E",
                Dir::S => "S",
                Dir::N => "N",
            }
        )
    }
}

/// Per-direction counts of one partition; `None` where the partition sits
/// on the grid edge.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Crossing(pub EnumMap<Dir, Option<u32>>);

impl Crossing {
    pub fn get(&self, dir: Dir) -> Option<u32> {
        self.0[dir]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dir, u32)> + '_ {
        self.0.iter().filter_map(|(dir, &count)| Some((dir, count?)))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(dir, count)| (dir.to_string(), Value::from(count)))
                .collect(),
        )
    }
}

impl Display for Crossing {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, (dir, count)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{dir}={count}")?;
        }
        Ok(())
    }
}

/// Crossing counts of a whole grid, keyed by `(col, row)`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CrossingTable(BTreeMap<(usize, usize), Crossing>);

impl CrossingTable {
    pub fn get(&self, col: usize, row: usize) -> Option<&Crossing> {
        self.0.get(&(col, row))
    }

    pub fn insert(&mut self, col: usize, row: usize, crossing: Crossing) -> &Crossing {
        let slot = self.0.entry((col, row)).or_default();
        *slot = crossing;
        slot
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Crossing)> {
        self.0.iter().map(|(&k, v)| (k, v))
    }

    /// `{col: {row: {dir: count}}}`.
    pub fn to_json(&self) -> Value {
        let mut res = Map::new();
        for ((col, row), crossing) in self.iter() {
            let col = res
                .entry(col.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(col) = col {
                col.insert(row.to_string(), crossing.to_json());
            }
        }
        Value::Object(res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossingError {
    UnexpectedIntentCode(UnexpectedIntentCode),
    InvalidCoordinate {
        col: usize,
        row: usize,
    },
    InvalidGridShape {
        cols: usize,
        rows: usize,
        cr_cols: usize,
        cr_rows: usize,
    },
    UnknownPartition(String),
    Range(RangeError),
    Script(ScriptError),
}

impl From<UnexpectedIntentCode> for CrossingError {
    fn from(value: UnexpectedIntentCode) -> Self {
        Self::UnexpectedIntentCode(value)
    }
}

impl From<RangeError> for CrossingError {
    fn from(value: RangeError) -> Self {
        Self::Range(value)
    }
}

impl From<ScriptError> for CrossingError {
    fn from(value: ScriptError) -> Self {
        Self::Script(value)
    }
}

impl Display for CrossingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CrossingError::UnexpectedIntentCode(e) => write!(f, "{e}"),
            CrossingError::InvalidCoordinate { col, row } => {
                write!(f, "no partition at column {col}, row {row}")
            }
            CrossingError::InvalidGridShape {
                cols,
                rows,
                cr_cols,
                cr_rows,
            } => write!(
                f,
                "cannot lay a {cols}x{rows} grid over {cr_cols}x{cr_rows} clock regions"
            ),
            CrossingError::UnknownPartition(name) => {
                write!(f, "no pblock named {name} in the constraints")
            }
            CrossingError::Range(e) => write!(f, "{e}"),
            CrossingError::Script(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CrossingError {}

/// Counts of a single clock region against its neighbours, all computed
/// from scratch.
pub fn uniform_grid_crossing(
    fabric: &impl Fabric,
    col: usize,
    row: usize,
) -> Result<Crossing, CrossingError> {
    let grid = ClockRegionGrid::new(fabric);
    CrossingCounter::new(&grid).direct_all(col, row)
}

/// Counts of every clock region of the device.
pub fn all_uniform_grid_crossing(fabric: &impl Fabric) -> Result<CrossingTable, CrossingError> {
    let grid = ClockRegionGrid::new(fabric);
    CrossingCounter::new(&grid).run()
}

/// Counts of a `total_col` by `total_row` grid of pblocks rebuilt from the
/// design's constraints.
pub fn script_grid_crossing(
    design: &impl PlacedDesign,
    total_col: usize,
    total_row: usize,
) -> Result<CrossingTable, CrossingError> {
    let map = reconstruct(
        design.fabric(),
        design.constraint_lines(),
        ReconstructOptions::crossing(),
    )?;
    let grid = PblockGrid::new(map, total_col, total_row)?;
    CrossingCounter::new(&grid).run()
}
