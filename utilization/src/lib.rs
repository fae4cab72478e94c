//! Resource utilization of the placed design inside a pblock, in the
//! categories of Vivado's utilization report.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use enum_map::{Enum, EnumMap};
use floorstat_device::{PlacedDesign, SiteInst, SiteType};
use floorstat_pblock::{Partition, ReconstructOptions, ScriptError, canonical_name, reconstruct};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Enum)]
pub enum UtilizationType {
    ClbLuts,
    LutsAsLogic,
    LutsAsMemory,
    ClbRegs,
    RegsAsFfs,
    RegsAsLatches,
    Carry8s,
    Clbs,
    ClbLs,
    ClbMs,
    Ramb36sFifos,
    Ramb18s,
    Urams,
    Dsps,
}

impl UtilizationType {
    pub const ALL: [UtilizationType; 14] = [
        UtilizationType::ClbLuts,
        UtilizationType::LutsAsLogic,
        UtilizationType::LutsAsMemory,
        UtilizationType::ClbRegs,
        UtilizationType::RegsAsFfs,
        UtilizationType::RegsAsLatches,
        UtilizationType::Carry8s,
        UtilizationType::Clbs,
        UtilizationType::ClbLs,
        UtilizationType::ClbMs,
        UtilizationType::Ramb36sFifos,
        UtilizationType::Ramb18s,
        UtilizationType::Urams,
        UtilizationType::Dsps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UtilizationType::ClbLuts => "CLB LUTs",
            UtilizationType::LutsAsLogic => "LUTs as Logic",
            UtilizationType::LutsAsMemory => "LUTs as Memory",
            UtilizationType::ClbRegs => "CLB Regs",
            UtilizationType::RegsAsFfs => "Regs as FF",
            UtilizationType::RegsAsLatches => "Regs as Latch",
            UtilizationType::Carry8s => "CARRY8s",
            UtilizationType::Clbs => "CLBs",
            UtilizationType::ClbLs => "CLBLs",
            UtilizationType::ClbMs => "CLBMs",
            UtilizationType::Ramb36sFifos => "RAMB36s/FIFOs",
            UtilizationType::Ramb18s => "RAMB18s",
            UtilizationType::Urams => "URAMs",
            UtilizationType::Dsps => "DSPs",
        }
    }
}

impl Display for UtilizationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Counts per category; every category is present, zero when unused.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Utilization(pub EnumMap<UtilizationType, u32>);

impl Utilization {
    pub fn get(&self, kind: UtilizationType) -> u32 {
        self.0[kind]
    }

    fn bump(&mut self, kinds: &[UtilizationType]) {
        for &kind in kinds {
            self.0[kind] += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UtilizationType, u32)> + '_ {
        self.0.iter().map(|(kind, &count)| (kind, count))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(kind, count)| (kind.label().to_string(), Value::from(count)))
                .collect(),
        )
    }
}

impl Display for Utilization {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (kind, count) in self.iter() {
            writeln!(f, "{kind:<16}{count:>8}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilizationError {
    UnknownPartition(String),
    Script(ScriptError),
}

impl From<ScriptError> for UtilizationError {
    fn from(value: ScriptError) -> Self {
        Self::Script(value)
    }
}

impl Display for UtilizationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UtilizationError::UnknownPartition(name) => {
                write!(f, "no pblock named {name} in the constraints")
            }
            UtilizationError::Script(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UtilizationError {}

const LUT_LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

fn is_ff_bel(bel: &str) -> bool {
    let mut chars = bel.chars();
    matches!(chars.next(), Some('A'..='H')) && matches!(chars.as_str(), "FF" | "FF2")
}

fn tally_site_inst(res: &mut Utilization, kind: &SiteType, si: &SiteInst) {
    use crate::UtilizationType as U;
    match kind {
        SiteType::SliceL => res.bump(&[U::Clbs, U::ClbLs]),
        SiteType::SliceM => res.bump(&[U::Clbs, U::ClbMs]),
        SiteType::Dsp48E2 => res.bump(&[U::Dsps]),
        SiteType::RambFifo36 => res.bump(&[U::Ramb36sFifos]),
        SiteType::Ramb181 | SiteType::RambFifo18 => res.bump(&[U::Ramb18s]),
        SiteType::Uram288 => res.bump(&[U::Urams]),
        SiteType::Other(_) => (),
    }

    for cell in &si.cells {
        let Some(bel) = &cell.bel else {
            continue;
        };
        if is_ff_bel(bel) {
            res.bump(&[U::ClbRegs, U::RegsAsFfs]);
        } else if bel.contains("CARRY") {
            res.bump(&[U::Carry8s]);
        }
    }

    // A 5LUT/6LUT pair shares one physical LUT.
    for letter in LUT_LETTERS {
        let luts: Vec<_> = ["5LUT", "6LUT"]
            .into_iter()
            .filter_map(|suffix| si.cell_at(&format!("{letter}{suffix}")))
            .filter(|cell| !cell.routethru)
            .collect();
        if luts.is_empty() {
            continue;
        }
        if luts
            .iter()
            .any(|cell| cell.kind.contains("SRL") || cell.kind.contains("RAM"))
        {
            res.bump(&[U::ClbLuts, U::LutsAsMemory]);
        } else {
            res.bump(&[U::ClbLuts, U::LutsAsLogic]);
        }
    }
}

/// Tallies every placed site instance whose tile lies in the partition.
pub fn tally(design: &impl PlacedDesign, partition: &Partition) -> Utilization {
    let tiles = partition.tiles();
    let mut res = Utilization::default();
    for si in design.site_insts() {
        let site = design.site(si.site);
        if !tiles.contains(&site.tile) {
            continue;
        }
        if si.cells.is_empty() {
            debug!("{part}: site {site} has no cells", part = partition.name, site = site.name);
        }
        tally_site_inst(&mut res, &site.kind, si);
    }
    res
}

/// Utilization of one pblock of the design, looked up by any name that
/// reduces to the same corner quadruple.
pub fn compute_utilization(
    design: &impl PlacedDesign,
    name: &str,
) -> Result<Utilization, UtilizationError> {
    let map = reconstruct(
        design.fabric(),
        design.constraint_lines(),
        ReconstructOptions::utilization(),
    )?;
    let name = canonical_name(name);
    let part = map
        .get(&name)
        .ok_or_else(|| UtilizationError::UnknownPartition(name.clone()))?;
    Ok(tally(design, part))
}

/// Utilization of every pblock of the design.
pub fn compute_all_utilization(
    design: &impl PlacedDesign,
) -> Result<BTreeMap<String, Utilization>, UtilizationError> {
    let map = reconstruct(
        design.fabric(),
        design.constraint_lines(),
        ReconstructOptions::utilization(),
    )?;
    Ok(map
        .iter()
        .map(|(name, part)| (name.to_string(), tally(design, part)))
        .collect())
}

/// `{pblock: {category: count}}`.
pub fn utilization_json(report: &BTreeMap<String, Utilization>) -> Value {
    let res: Map<String, Value> = report
        .iter()
        .map(|(name, util)| (name.clone(), util.to_json()))
        .collect();
    Value::Object(res)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use floorstat_device::builder::DeviceBuilder;
    use floorstat_device::{Design, SiteId};
    use floorstat_pblock::PblockError;

    use super::*;
    use crate::UtilizationType as U;

    /// One clock region column of 4x2 tiles: a SLICEL and a SLICEM column,
    /// then a RAMB/DSP column that only site ranges can reach.
    fn design() -> (Design, Vec<SiteId>) {
        let mut b = DeviceBuilder::clock_region_grid("xcvu3p", 2, 1, 2, 2);
        let mut sites = vec![];
        for y in 0..2 {
            let t = b.tile_at(0, y).unwrap();
            sites.push(b.add_site(t, &format!("SLICE_X0Y{y}"), SiteType::SliceL).unwrap());
            let t = b.tile_at(1, y).unwrap();
            sites.push(b.add_site(t, &format!("SLICE_X1Y{y}"), SiteType::SliceM).unwrap());
        }
        let t = b.tile_at(2, 0).unwrap();
        sites.push(b.add_site(t, "RAMB36_X0Y0", SiteType::RambFifo36).unwrap());
        sites.push(b.add_site(t, "RAMB18_X0Y0", SiteType::Ramb181).unwrap());
        let t = b.tile_at(3, 0).unwrap();
        sites.push(b.add_site(t, "DSP48E2_X0Y0", SiteType::Dsp48E2).unwrap());
        let mut design = Design::new("top", b.finish());
        design.constraints = [
            "create_pblock pblock_X0Y0_X0Y0",
            "resize_pblock pblock_X0Y0_X0Y0 -add {CLOCKREGION_X0Y0:CLOCKREGION_X0Y0}",
            "create_pblock pblock_X1Y0_X1Y0",
            "resize_pblock pblock_X1Y0_X1Y0 -add {RAMB36_X0Y0:RAMB36_X0Y0 DSP48E2_X0Y0}",
        ]
        .map(String::from)
        .to_vec();
        (design, sites)
    }

    #[test]
    fn test_slices() {
        let (mut design, sites) = design();
        // SLICE_X0Y0: two logic LUTs sharing A, an SRL on B, a routethru on
        // C, two flops, a carry and a cell without a BEL.
        design.site_insts.push(
            SiteInst::new(sites[0])
                .with_cell("a5", "LUT2", Some("A5LUT"))
                .with_cell("a6", "LUT6", Some("A6LUT"))
                .with_cell("b6", "SRL16E", Some("B6LUT"))
                .with_routethru("c6", "LUT1", "C6LUT")
                .with_cell("q0", "FDRE", Some("AFF"))
                .with_cell("q1", "FDCE", Some("AFF2"))
                .with_cell("cy", "CARRY8", Some("CARRY8"))
                .with_cell("floating", "LUT1", None),
        );
        // SLICE_X1Y0: a LUTRAM next to a logic LUT on the same letter
        design.site_insts.push(
            SiteInst::new(sites[1])
                .with_cell("d5", "LUT3", Some("D5LUT"))
                .with_cell("d6", "RAMS64E", Some("D6LUT")),
        );
        // SLICE_X0Y1: placed but empty
        design.site_insts.push(SiteInst::new(sites[2]));

        let util = compute_utilization(&design, "X0Y0X0Y0").unwrap();
        let expected = [
            (U::ClbLuts, 3),
            (U::LutsAsLogic, 1),
            (U::LutsAsMemory, 2),
            (U::ClbRegs, 2),
            (U::RegsAsFfs, 2),
            (U::Carry8s, 1),
            (U::Clbs, 3),
            (U::ClbLs, 2),
            (U::ClbMs, 1),
        ];
        for kind in UtilizationType::ALL {
            let count = expected
                .iter()
                .find(|&&(k, _)| k == kind)
                .map_or(0, |&(_, c)| c);
            assert_eq!(util.get(kind), count, "{kind}");
        }
        assert_eq!(util.get(U::Clbs), util.get(U::ClbLs) + util.get(U::ClbMs));
        assert_eq!(
            util.get(U::ClbLuts),
            util.get(U::LutsAsLogic) + util.get(U::LutsAsMemory)
        );
        assert_eq!(util.get(U::RegsAsLatches), 0);
    }

    #[test]
    fn test_block_sites() {
        let (mut design, sites) = design();
        for &site in &sites[4..] {
            design.site_insts.push(SiteInst::new(site));
        }
        // the first slice column does not belong to the second pblock
        design.site_insts.push(SiteInst::new(sites[0]));
        let util = compute_utilization(&design, "pblock_X1Y0_X1Y0").unwrap();
        // RAMB36 and RAMB18 share a tile
        assert_eq!(util.get(U::Ramb36sFifos), 1);
        assert_eq!(util.get(U::Ramb18s), 1);
        assert_eq!(util.get(U::Dsps), 1);
        assert_eq!(util.get(U::Clbs), 0);
        assert_eq!(util.to_json().as_object().unwrap().len(), 14);
        assert_eq!(util.to_json()["RAMB36s/FIFOs"], 1);
    }

    #[test]
    fn test_all() {
        let (mut design, sites) = design();
        design.site_insts.push(SiteInst::new(sites[1]));
        design.site_insts.push(SiteInst::new(sites[6]));
        let report = compute_all_utilization(&design).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report["X0Y0X0Y0"].get(U::ClbMs), 1);
        assert_eq!(report["X1Y0X1Y0"].get(U::Dsps), 1);
        let json = utilization_json(&report);
        assert_eq!(json["X1Y0X1Y0"]["DSPs"], 1);
        assert_eq!(json["X0Y0X0Y0"]["CLBs"], 1);
    }

    #[test]
    fn test_errors() {
        let (mut design, _) = design();
        assert_matches!(
            compute_utilization(&design, "pblock_X5Y5_X5Y5"),
            Err(UtilizationError::UnknownPartition(n)) if n == "X5Y5X5Y5"
        );
        design
            .constraints
            .push("resize_pblock pblock_X0Y0_X0Y0 -remove SLICE_X0Y0".to_string());
        assert_matches!(
            compute_utilization(&design, "X0Y0X0Y0"),
            Err(UtilizationError::Script(ScriptError {
                kind: PblockError::UnsupportedOperation(_),
                line: 5,
                ..
            }))
        );
    }

    #[test]
    fn test_ff_bels() {
        assert!(is_ff_bel("AFF"));
        assert!(is_ff_bel("HFF2"));
        assert!(!is_ff_bel("IFF"));
        assert!(!is_ff_bel("AFF3"));
        assert!(!is_ff_bel("A6LUT"));
    }
}
