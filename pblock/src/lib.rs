//! Pblocks, and rebuilding them from the XDC constraints stored in a design.

use std::sync::LazyLock;

use floorstat_device::Fabric;
use regex::Regex;
use tracing::debug;

pub mod error;
pub mod partition;
pub mod script;

pub use error::{PblockError, ScriptError};
pub use partition::{Partition, PartitionMap, RangeOutcome, ReconstructOptions};

use script::{Command, RangeEdit};

static CORNERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*X(\d+)Y(\d+).*X(\d+)Y(\d+).*$").unwrap());

/// Reduces a pblock name to the `X<a>Y<b>X<c>Y<d>` corner quadruple embedded
/// in it, so that `CR_X0Y0_To_CR_X3Y3` and `pblock_X0Y0_X3Y3` name the same
/// partition.  Names without two corners are kept as they are.
pub fn canonical_name(name: &str) -> String {
    match CORNERS.captures(name) {
        Some(cap) => format!(
            "X{a}Y{b}X{c}Y{d}",
            a = &cap[1],
            b = &cap[2],
            c = &cap[3],
            d = &cap[4]
        ),
        None => name.to_string(),
    }
}

/// Rebuilds every pblock defined by `create_pblock` and shaped by
/// `resize_pblock` in a constraint script.  Commands must appear in causal
/// order; a resize of a pblock that was not created yet is an error.
pub fn reconstruct<'a, 'l, F: Fabric>(
    fabric: &'a F,
    lines: impl IntoIterator<Item = &'l str>,
    options: ReconstructOptions,
) -> Result<PartitionMap<'a, F>, ScriptError> {
    let mut map = PartitionMap::new(fabric, options);
    for (idx, line) in lines.into_iter().enumerate() {
        let err = |kind: PblockError| ScriptError {
            kind,
            line: idx + 1,
            text: line.to_string(),
        };
        for cmd in script::parse_line(line) {
            match cmd.map_err(|e| err(e.into()))? {
                Command::DefinePartition { name } => {
                    map.create(&canonical_name(&name)).map_err(err)?;
                }
                Command::ResizePartition { name, edits } => {
                    let name = canonical_name(&name);
                    if !map.contains(&name) {
                        return Err(err(PblockError::UnknownPartition(name)));
                    }
                    for edit in edits {
                        match edit {
                            RangeEdit::Add(range) => {
                                map.add_range(&name, &range).map_err(err)?;
                            }
                            RangeEdit::Remove(range) => {
                                map.remove_range(&name, &range).map_err(err)?;
                            }
                        }
                    }
                    if map.get(&name).is_some_and(|p| p.is_empty()) {
                        return Err(err(PblockError::EmptyPartition(name)));
                    }
                }
                Command::MovePartition { name } => {
                    return Err(err(PblockError::UnsupportedOperation(format!(
                        "moving sites of {name}"
                    ))));
                }
                Command::Other => {
                    debug!("ignoring constraint: {line}");
                }
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use floorstat_device::builder::DeviceBuilder;
    use floorstat_device::{Device, SiteType};

    use super::*;

    fn device() -> Device {
        let mut b = DeviceBuilder::clock_region_grid("xctest", 4, 4, 2, 2);
        for x in 0..8 {
            for y in 0..8 {
                let t = b.tile_at(x, y).unwrap();
                b.add_site(t, &format!("SLICE_X{x}Y{y}"), SiteType::SliceL)
                    .unwrap();
                if x == 3 {
                    b.add_site(t, &format!("RAMB36_X0Y{y}"), SiteType::RambFifo36)
                        .unwrap();
                }
            }
        }
        b.finish()
    }

    const SCRIPT: &[&str] = &[
        "create_pblock CR_X0Y0_To_CR_X1Y1",
        "resize_pblock [get_pblocks CR_X0Y0_To_CR_X1Y1] -add {CLOCKREGION_X0Y0:CLOCKREGION_X1Y1}",
        "set_property IS_SOFT FALSE [get_pblocks CR_X0Y0_To_CR_X1Y1]",
        "create_pblock pblock_X2Y0_X3Y1",
        "resize_pblock [get_pblocks pblock_X2Y0_X3Y1] -add {SLICE_X4Y0:SLICE_X7Y3 RAMB36_X0Y0:RAMB36_X0Y3}",
        "resize_pblock [get_pblocks pblock_X2Y0_X3Y1] -add {X2Y1:X3Y1}",
    ];

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("CR_X0Y12_To_CR_X3Y15"), "X0Y12X3Y15");
        assert_eq!(canonical_name("pblock_X10Y2_X11Y3"), "X10Y2X11Y3");
        // the last two corners win
        assert_eq!(canonical_name("X9Y9_X0Y0_X1Y1"), "X0Y0X1Y1");
        assert_eq!(canonical_name("P"), "P");
        assert_eq!(canonical_name("SLR0_X1Y1"), "SLR0_X1Y1");
    }

    #[test]
    fn test_reconstruct() {
        let dev = device();
        let map = reconstruct(&dev, SCRIPT.iter().copied(), ReconstructOptions::crossing()).unwrap();
        assert_eq!(map.len(), 2);
        let a = map.get("X0Y0X1Y1").unwrap();
        assert_eq!(a.tiles().len(), 16);
        let b = map.get("X2Y0X3Y1").unwrap();
        assert_eq!(b.ranges().count(), 2);
        assert_eq!(b.tiles().len(), 16);

        let map = reconstruct(
            &dev,
            SCRIPT.iter().copied(),
            ReconstructOptions::utilization(),
        )
        .unwrap();
        let b = map.get("X2Y0X3Y1").unwrap();
        assert_eq!(b.ranges().count(), 3);
        // the RAMB36 column sits at tile x 3, next to the slice range
        assert_eq!(b.tiles().len(), 20);
    }

    #[test]
    fn test_idempotent() {
        let dev = device();
        let m1 = reconstruct(&dev, SCRIPT.iter().copied(), ReconstructOptions::crossing()).unwrap();
        let m2 = reconstruct(&dev, SCRIPT.iter().copied(), ReconstructOptions::crossing()).unwrap();
        for ((n1, p1), (n2, p2)) in m1.iter().zip(m2.iter()) {
            assert_eq!(n1, n2);
            assert_eq!(p1.tiles(), p2.tiles());
        }
    }

    #[test]
    fn test_remove_unsupported() {
        let dev = device();
        for options in [ReconstructOptions::crossing(), ReconstructOptions::utilization()] {
            let script = [
                "create_pblock P; resize_pblock P -add {X0Y0:X1Y1}",
                "resize_pblock P -remove {X0Y0:X0Y0}",
            ];
            let err = reconstruct(&dev, script, options).err().unwrap();
            assert_eq!(err.line, 2);
            assert_matches!(err.kind, PblockError::UnsupportedOperation(_));
        }
    }

    #[test]
    fn test_script_errors() {
        let dev = device();
        let opts = ReconstructOptions::crossing();
        let err = reconstruct(&dev, ["resize_pblock [get_pblocks pb_X0Y0_X0Y0] -add X0Y0"], opts)
            .err()
            .unwrap();
        assert_eq!(err.line, 1);
        assert_eq!(err.kind, PblockError::UnknownPartition("X0Y0X0Y0".to_string()));

        let err = reconstruct(&dev, ["create_pblock a_X0Y0_X1Y1", "create_pblock b_X0Y0_X1Y1"], opts)
            .err()
            .unwrap();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, PblockError::DuplicatePartition("X0Y0X1Y1".to_string()));

        let err = reconstruct(
            &dev,
            ["create_pblock p", "resize_pblock p -add RAMB36_X0Y0:RAMB36_X0Y1"],
            opts,
        )
        .err()
        .unwrap();
        assert_eq!(err.kind, PblockError::EmptyPartition("p".to_string()));

        let err = reconstruct(&dev, ["create_pblock p", "resize_pblock p -add {SLICE_X0Y0:SLICE_X99Y0}"], opts)
            .err()
            .unwrap();
        assert_matches!(err.kind, PblockError::Range(_));

        let err = reconstruct(&dev, ["create_pblock p", "resize_pblock p -from SLICE_X0Y0 -to SLICE_X0Y1"], opts)
            .err()
            .unwrap();
        assert_matches!(err.kind, PblockError::UnsupportedOperation(_));
    }
}
