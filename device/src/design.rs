use std::error::Error;
use std::fs::File;
use std::path::Path;

use bincode::{Decode, Encode};
use unnamed_entity::{EntityVec, entity_id};

use crate::device::{Device, Site, SiteId};
use crate::PlacedDesign;

entity_id! {
    pub id SiteInstId u32;
}

entity_id_bincode!(SiteInstId);

/// A placed netlist cell.  `bel` is `None` for cells that are locked to a
/// site but never got a BEL assigned.
#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Cell {
    pub name: String,
    pub kind: String,
    pub bel: Option<String>,
    pub routethru: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct SiteInst {
    pub site: SiteId,
    pub cells: Vec<Cell>,
}

impl SiteInst {
    pub fn new(site: SiteId) -> Self {
        SiteInst {
            site,
            cells: vec![],
        }
    }

    pub fn with_cell(mut self, name: &str, kind: &str, bel: Option<&str>) -> Self {
        self.cells.push(Cell {
            name: name.to_string(),
            kind: kind.to_string(),
            bel: bel.map(|b| b.to_string()),
            routethru: false,
        });
        self
    }

    pub fn with_routethru(mut self, name: &str, kind: &str, bel: &str) -> Self {
        self.cells.push(Cell {
            name: name.to_string(),
            kind: kind.to_string(),
            bel: Some(bel.to_string()),
            routethru: true,
        });
        self
    }

    pub fn cell_at(&self, bel: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.bel.as_deref() == Some(bel))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode)]
pub struct Design {
    pub name: String,
    pub device: Device,
    /// Constraint script lines, in the order the checkpoint applies them.
    pub constraints: Vec<String>,
    pub site_insts: EntityVec<SiteInstId, SiteInst>,
}

impl Design {
    pub fn new(name: impl Into<String>, device: Device) -> Self {
        Design {
            name: name.into(),
            device,
            constraints: vec![],
            site_insts: EntityVec::new(),
        }
    }

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
}

impl PlacedDesign for Design {
    type Fabric = Device;

    fn fabric(&self) -> &Device {
        &self.device
    }

    fn constraint_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.constraints.iter().map(|l| l.as_str())
    }

    fn site_insts(&self) -> impl Iterator<Item = &SiteInst> + '_ {
        self.site_insts.values()
    }

    fn site(&self, site: SiteId) -> &Site {
        &self.device.sites[site]
    }
}
