//!
//! # Padframe Configuration
//!
//! In-memory model of the placement engine's text configuration:
//! die area, one corner cell per die corner, and an ordered list of pads along each side.
//! A side's pads may be separated by `SPACE` gaps, which belong to the side of the preceding pad.
//!
//! ```text
//! AREA 3000 3000 ;
//!
//! CORNER corner_sw SW sky130_ef_io__corner_pad ;
//! CORNER corner_nw NW sky130_ef_io__corner_pad ;
//! CORNER corner_ne NE sky130_ef_io__corner_pad ;
//! CORNER corner_se SE sky130_ef_io__corner_pad ;
//!
//! PAD gpio0 N sky130_ef_io__gpiov2_pad ;
//! SPACE 40 ;
//! PAD gpio1 N sky130_ef_io__gpiov2_pad ;
//! ...
//! ```
//!
//! A [PadConfig] arrives either by [PadConfig::generate] from a design's extracted instances,
//! or by [PadConfig::parse] from a (generally user-edited) file, after which it must pass
//! [PadConfig::validate] against the design.
//!

// Std-Lib
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// Crates.io
use log::{debug, info};

// Local Imports
use crate::db::Int;
use crate::error::{ConfigDiff, PadResult, PadframeError};
use crate::extract::{ExtractedInstances, PadInstance};
use crate::library::CellRegistry;
use crate::utils::{enumstr, EnumStr};

pub mod chunk;
pub use chunk::chunk;
pub mod read;
pub mod write;

enumstr!(
    /// # Config Statement Keywords
    ConfigKey {
        Area: "AREA",
        Corner: "CORNER",
        Pad: "PAD",
        Grid: "GRID",
        Filler: "FILLER",
        Space: "SPACE",
    }
);
enumstr!(
    /// # Die Corners
    /// In the order corner instances are assigned to them.
    CornerPos {
        Sw: "SW",
        Nw: "NW",
        Ne: "NE",
        Se: "SE",
    }
);
enumstr!(
    /// # Die Sides
    /// In the order the chunker fills them, and the writer emits them.
    Side {
        N: "N",
        E: "E",
        S: "S",
        W: "W",
    }
);
impl Side {
    /// Index into a four-element, side-ordered array
    fn idx(&self) -> usize {
        *self as usize
    }
}

/// # Die Area, in microns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub width: Int,
    pub height: Int,
}
impl Area {
    pub fn new(width: Int, height: Int) -> Self {
        Self { width, height }
    }
}

/// # Corner Assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerEntry {
    pub pos: CornerPos,
    pub pad: PadInstance,
}

/// # Side Entry
/// Either a pad, or a fixed gap before the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEntry {
    Pad(PadInstance),
    /// Gap, in microns
    Space(Int),
}
impl SideEntry {
    pub fn pad(&self) -> Option<&PadInstance> {
        match self {
            Self::Pad(pad) => Some(pad),
            Self::Space(_) => None,
        }
    }
    pub fn into_pad(self) -> Option<PadInstance> {
        match self {
            Self::Pad(pad) => Some(pad),
            Self::Space(_) => None,
        }
    }
}
impl From<PadInstance> for SideEntry {
    fn from(pad: PadInstance) -> Self {
        Self::Pad(pad)
    }
}

/// # Entries along each of the four [Side]s, in placement order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sides([Vec<SideEntry>; 4]);
impl Sides {
    pub fn get(&self, side: Side) -> &[SideEntry] {
        &self.0[side.idx()]
    }
    pub fn get_mut(&mut self, side: Side) -> &mut Vec<SideEntry> {
        &mut self.0[side.idx()]
    }
    /// Iterate over the pads of `side`, skipping spaces
    pub fn pads(&self, side: Side) -> impl Iterator<Item = &PadInstance> {
        self.get(side).iter().filter_map(SideEntry::pad)
    }
    /// Iterate over (side, entries) pairs, in [Side] order
    pub fn iter(&self) -> impl Iterator<Item = (Side, &[SideEntry])> {
        Side::variants().iter().map(move |s| (*s, self.get(*s)))
    }
    /// Total number of pads on all sides
    pub fn len(&self) -> usize {
        Side::variants().iter().map(|s| self.pads(*s).count()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl From<[Vec<PadInstance>; 4]> for Sides {
    fn from(sides: [Vec<PadInstance>; 4]) -> Self {
        Self(sides.map(|pads| pads.into_iter().map(SideEntry::from).collect()))
    }
}

///
/// # Padframe Configuration
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadConfig {
    /// Die area. Required before placement, but may be supplied outside the config text.
    pub area: Option<Area>,
    /// Placement grid, passed through to the engine
    pub grid: Option<Int>,
    /// Filler-cell name prefixes, passed through to the engine
    pub fillers: Vec<String>,
    /// Corner assignments, one per [CornerPos], in statement order
    pub corners: Vec<CornerEntry>,
    /// Pad assignments per side
    pub sides: Sides,
}
impl PadConfig {
    ///
    /// Generate a config for the pads and corners of `extracted`.
    ///
    /// Corners are assigned SW, NW, NE, SE in their extraction order.
    /// Pads are distributed across sides by [chunk].
    ///
    pub fn generate(extracted: &ExtractedInstances, area: Area) -> PadResult<Self> {
        if extracted.corners.len() != CornerPos::variants().len() {
            return Err(PadframeError::WrongCornerCount(extracted.corners.clone()));
        }
        let corners = CornerPos::variants()
            .iter()
            .zip(extracted.corners.iter())
            .map(|(pos, pad)| CornerEntry {
                pos: *pos,
                pad: pad.clone(),
            })
            .collect();
        let sides = Sides::from(chunk(&extracted.pads));
        for side in Side::variants() {
            debug!("Side {}: {} pads", side, sides.pads(*side).count());
        }
        Ok(Self {
            area: Some(area),
            grid: None,
            fillers: Vec::new(),
            corners,
            sides,
        })
    }
    /// Parse config text `src`. See [read::ConfigParser].
    pub fn parse(src: &str) -> PadResult<Self> {
        read::parse_str(src)
    }
    /// Parse the config file at `path`
    pub fn open(path: impl AsRef<Path>) -> PadResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PadframeError::MissingFile(path.to_path_buf()));
        }
        read::parse_file(path)
    }
    /// Write to file `path`
    pub fn save(&self, path: impl AsRef<Path>) -> PadResult<()> {
        write::save(self, path)
    }
    /// Write to a config-format [String]
    pub fn to_string(&self) -> PadResult<String> {
        write::to_string(self)
    }
    /// Iterate over all corner, then side, pads. Spaces are skipped.
    pub fn entries(&self) -> impl Iterator<Item = &PadInstance> {
        self.corners.iter().map(|c| &c.pad).chain(
            self.sides
                .0
                .iter()
                .flat_map(|s| s.iter().filter_map(SideEntry::pad)),
        )
    }
    /// Check that each [CornerPos] is assigned exactly once
    pub fn check_corners(&self) -> PadResult<()> {
        for pos in CornerPos::variants() {
            let count = self.corners.iter().filter(|c| c.pos == *pos).count();
            if count != 1 {
                return Err(PadframeError::invalid_config(format!(
                    "corner {} is assigned {} times, expected exactly once",
                    pos, count
                )));
            }
        }
        Ok(())
    }
    /// Collect the entries with counterparts in the design, i.e. all but fillers.
    /// Fails if any entry names a cell unknown to `registry`.
    pub fn design_pads(&self, registry: &CellRegistry) -> PadResult<Vec<PadInstance>> {
        let mut pads = Vec::new();
        for pad in self.entries() {
            if registry.is_filler(&pad.cell)? {
                debug!("Skipping filler {} ({})", pad.name, pad.cell);
                continue;
            }
            pads.push(pad.clone());
        }
        Ok(pads)
    }
    ///
    /// Validate against the design's `extracted` instances.
    ///
    /// The non-filler (instance, cell) pairs listed here must equal the design's pads and corners,
    /// each listed exactly once. Failures report the [ConfigDiff].
    ///
    pub fn validate(&self, registry: &CellRegistry, extracted: &ExtractedInstances) -> PadResult<()> {
        let diff = diff(self.design_pads(registry)?, extracted.pads_and_corners().cloned());
        if !diff.is_empty() {
            return Err(PadframeError::ConfigMismatch(diff));
        }
        info!("Padframe config verified");
        Ok(())
    }
}

/// Compare the `config` multiset of pairs to the `design` set
fn diff(config: Vec<PadInstance>, design: impl Iterator<Item = PadInstance>) -> ConfigDiff {
    let mut counts: BTreeMap<PadInstance, usize> = BTreeMap::new();
    for pad in config {
        *counts.entry(pad).or_insert(0) += 1;
    }
    let mut rv = ConfigDiff::default();
    let mut design_set = BTreeSet::new();
    for pad in design {
        if !counts.contains_key(&pad) {
            rv.only_in_design.push(pad.clone());
        }
        design_set.insert(pad);
    }
    for (pad, count) in counts {
        if count > 1 {
            rv.duplicated.push(pad.clone());
        }
        if !design_set.contains(&pad) {
            rv.only_in_config.push(pad);
        }
    }
    rv
}
