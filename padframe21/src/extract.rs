//!
//! # Design Instance Extraction
//!
//! Partitions a design's instances into pads, corners, and everything else.
//!

// Crates.io
use log::{debug, info};
use serde::{Deserialize, Serialize};

// Local Imports
use crate::db::LayoutDb;
use crate::error::{PadResult, PadframeError};
use crate::library::{CellRegistry, PadPrefixes};

/// # (Instance, Cell) Pair
///
/// Identity of a pad or corner, as both the design and padframe configs refer to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct PadInstance {
    /// Instance Name
    pub name: String,
    /// Cell (Master) Name
    pub cell: String,
}
impl PadInstance {
    pub fn new(name: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: cell.into(),
        }
    }
}

///
/// # Extracted Design Instances
///
/// Pads and corners keep the design's instance order, which the config generator relies on.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedInstances {
    /// Pad instances
    pub pads: Vec<PadInstance>,
    /// Corner instances. Always four of them.
    pub corners: Vec<PadInstance>,
    /// Names of all other instances
    pub others: Vec<String>,
}
impl ExtractedInstances {
    ///
    /// Extract from the design in `db`.
    ///
    /// Pad and corner flags come from each instance's master.
    /// Pads and corners must be registered in `registry` and satisfy `prefixes`;
    /// everything else must *not* satisfy `prefixes`.
    /// The design must include exactly four corners and at least one pad.
    ///
    pub fn extract(
        db: &LayoutDb,
        registry: &CellRegistry,
        prefixes: &PadPrefixes,
    ) -> PadResult<Self> {
        let mut this = Self::default();
        for inst in db.block.insts.iter() {
            let master = db.master_of(inst)?;
            if master.is_pad() {
                prefixes.check(&master.name)?;
                registry.kind(&master.name)?;
                debug!("Found pad instance {} of type {}", inst.name, master.name);
                this.pads.push(PadInstance::new(&inst.name, &master.name));
            } else if master.is_endcap() {
                prefixes.check(&master.name)?;
                registry.kind(&master.name)?;
                debug!("Found corner instance {} of type {}", inst.name, master.name);
                this.corners.push(PadInstance::new(&inst.name, &master.name));
            } else {
                if prefixes.matches(&master.name) {
                    return Err(PadframeError::InconsistentClassification {
                        inst: inst.name.clone(),
                        master: master.name.clone(),
                    });
                }
                this.others.push(inst.name.clone());
            }
        }
        if this.corners.len() != 4 {
            return Err(PadframeError::WrongCornerCount(this.corners));
        }
        if this.pads.is_empty() {
            return Err(PadframeError::NoPadsFound);
        }
        info!(
            "The design contains {} pads, {} corners, and {} other instances",
            this.pads.len(),
            this.corners.len(),
            this.others.len()
        );
        Ok(this)
    }
    /// Iterate over pads, then corners
    pub fn pads_and_corners(&self) -> impl Iterator<Item = &PadInstance> {
        self.pads.iter().chain(self.corners.iter())
    }
    /// Boolean indication of whether `(name, cell)` is one of our pads or corners
    pub fn contains(&self, name: &str, cell: &str) -> bool {
        self.pads_and_corners()
            .any(|p| p.name == name && p.cell == cell)
    }
}
