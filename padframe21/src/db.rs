//!
//! # Layout Database
//!
//! In-memory store for the two layouts the padframe flow touches:
//! the user's design and the placement engine's padframe.
//!
//! Each [LayoutDb] pairs a set of [MasterLibrary]s (cell definitions, generally imported from LEF)
//! with a single flat [Block] of [Instance]s and [Net]s.
//! Blocks persist as DEF, or through serde in any [SerializationFormat](crate::utils::SerializationFormat),
//! chosen by file extension.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::def;
use crate::error::{PadResult, PadframeError};
use crate::utils::{enumstr, SerdeFile};

/// Internal integer type for all database-unit distances
pub type Int = i64;

/// Database units per micron, unless a block or library says otherwise
pub const DEFAULT_DBU_PER_MICRON: u32 = 1000;

/// # Point in database units
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
}
/// # Width-by-height extent, in database units
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Size {
    pub width: Int,
    pub height: Int,
}
/// # Axis-aligned rectangle, from lower-left `p0` to upper-right `p1`
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}

enumstr!(
    /// # Pad Sub-Types
    ///
    /// The library's annotation of a pad master, as in LEF `CLASS PAD <subtype>`.
    /// `GENERIC` stands for a pad with no declared subtype.
    PadClass {
        Generic: "GENERIC",
        Input: "INPUT",
        Output: "OUTPUT",
        Inout: "INOUT",
        Power: "POWER",
        Spacer: "SPACER",
        AreaIo: "AREAIO",
    }
);
enumstr!(
    /// # Instance Placement Status
    PlacementStatus {
        Unplaced: "UNPLACED",
        Placed: "PLACED",
        Firm: "FIRM",
        Fixed: "FIXED",
    }
);
impl PlacementStatus {
    /// Placed by something, firmly or provisionally
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed | Self::Firm)
    }
    /// Permanently fixed
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed)
    }
}
impl Default for PlacementStatus {
    fn default() -> Self {
        Self::Unplaced
    }
}
enumstr!(
    /// # Instance Orientations
    /// North (unrotated), its rotations, and their flipped counterparts.
    Orient {
        N: "N",
        S: "S",
        E: "E",
        W: "W",
        Fn: "FN",
        Fs: "FS",
        Fe: "FE",
        Fw: "FW",
    }
);

/// # Master (Cell) Definition
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Master {
    /// Master Name
    pub name: String,
    /// Pad flag and sub-type, if the library marks this master as a pad
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad: Option<PadClass>,
    /// Corner (end-cap) flag
    #[serde(default)]
    pub endcap: bool,
    /// Outline size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}
impl Master {
    /// Create a new, unflagged [Master] named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Create a pad [Master] of sub-type `class`
    pub fn pad(name: impl Into<String>, class: PadClass) -> Self {
        Self {
            pad: Some(class),
            ..Self::new(name)
        }
    }
    /// Create a corner (end-cap) [Master]
    pub fn corner(name: impl Into<String>) -> Self {
        Self {
            endcap: true,
            ..Self::new(name)
        }
    }
    /// Set our size
    pub fn sized(mut self, width: Int, height: Int) -> Self {
        self.size = Some(Size { width, height });
        self
    }
    pub fn is_pad(&self) -> bool {
        self.pad.is_some()
    }
    pub fn is_endcap(&self) -> bool {
        self.endcap
    }
}
/// # Named collection of [Master]s
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct MasterLibrary {
    pub name: String,
    pub masters: Vec<Master>,
}

/// # Instance of a [Master]
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Instance {
    /// Instance Name, unique within its [Block]
    pub name: String,
    /// Master Name
    pub master: String,
    /// Orientation, once placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orient: Option<Orient>,
    #[serde(default)]
    pub status: PlacementStatus,
    /// Location, once placed. Listed last, as TOML requires tables after plain values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Point>,
}
impl Instance {
    /// Create a new, unplaced [Instance]
    pub fn new(name: impl Into<String>, master: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            master: master.into(),
            ..Default::default()
        }
    }
    /// Set our location, orientation, and status in one go
    pub fn place(&mut self, loc: Point, orient: Option<Orient>, status: PlacementStatus) {
        self.loc = Some(loc);
        self.orient = orient;
        self.status = status;
    }
}
/// # Connection of a [Net] to an [Instance] pin
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ITerm {
    pub inst: String,
    pub pin: String,
    #[serde(default)]
    pub special: bool,
}
/// # Net
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Net {
    pub name: String,
    #[serde(default)]
    pub special: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterms: Vec<ITerm>,
}
impl Net {
    /// Flag this net, and every terminal attached to it, as special
    pub fn set_special(&mut self) {
        self.special = true;
        for iterm in self.iterms.iter_mut() {
            iterm.special = true;
        }
    }
}

///
/// # Block
///
/// A flat design: the persisted half of a [LayoutDb].
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Block {
    /// Design Name
    pub name: String,
    /// Database units per micron
    #[serde(default = "default_dbu")]
    pub dbu_per_micron: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub die_area: Option<Rect>,
    #[serde(default)]
    pub insts: Vec<Instance>,
    #[serde(default)]
    pub nets: Vec<Net>,
}
fn default_dbu() -> u32 {
    DEFAULT_DBU_PER_MICRON
}
impl Block {
    /// Create a new and empty [Block]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dbu_per_micron: DEFAULT_DBU_PER_MICRON,
            die_area: None,
            insts: Vec::new(),
            nets: Vec::new(),
        }
    }
    pub fn find_inst(&self, name: &str) -> Option<&Instance> {
        self.insts.iter().find(|i| i.name == name)
    }
    pub fn find_inst_mut(&mut self, name: &str) -> Option<&mut Instance> {
        self.insts.iter_mut().find(|i| i.name == name)
    }
}
impl SerdeFile for Block {}

///
/// # Layout Database
///
/// A [Block] plus the [MasterLibrary]s its instances refer to.
/// Pad-ness and corner-ness of instances are properties of their masters,
/// and hence only answerable here, not by the [Block] alone.
///
#[derive(Debug, Clone)]
pub struct LayoutDb {
    pub libs: Vec<MasterLibrary>,
    pub block: Block,
}
impl LayoutDb {
    /// Create a [LayoutDb] from its parts
    pub fn new(libs: Vec<MasterLibrary>, block: Block) -> Self {
        Self { libs, block }
    }
    /// Read the [Block] at `path` (format by extension), pairing it with `libs`
    pub fn open(libs: Vec<MasterLibrary>, path: impl AsRef<Path>) -> PadResult<Self> {
        let path = path.as_ref();
        let block = if def::is_def(path) {
            def::parse_file(path)?
        } else {
            Block::open_path(path)?
        };
        Ok(Self::new(libs, block))
    }
    /// Write our [Block] to `path` (format by extension)
    pub fn save(&self, path: impl AsRef<Path>) -> PadResult<()> {
        let path = path.as_ref();
        if def::is_def(path) {
            def::save(&self.block, path)
        } else {
            self.block.save_path(path)?;
            Ok(())
        }
    }
    /// Iterate over all [Master]s in all libraries
    pub fn masters(&self) -> impl Iterator<Item = &Master> {
        self.libs.iter().flat_map(|lib| lib.masters.iter())
    }
    /// Find a [Master] by name. The first library defining `name` wins.
    pub fn find_master(&self, name: &str) -> Option<&Master> {
        self.masters().find(|m| m.name == name)
    }
    /// Get the [Master] of `inst`, failing if it is not defined
    pub fn master_of(&self, inst: &Instance) -> PadResult<&Master> {
        self.find_master(&inst.master)
            .ok_or_else(|| PadframeError::UnknownMaster(inst.master.clone()))
    }
    /// Create a new, unplaced [Instance] of master `master` named `name`
    pub fn create_inst(&mut self, master: &str, name: &str) -> PadResult<&mut Instance> {
        if self.find_master(master).is_none() {
            return Err(PadframeError::UnknownMaster(master.to_string()));
        }
        if self.block.find_inst(name).is_some() {
            return Err(PadframeError::DuplicateInstance(name.to_string()));
        }
        self.block.insts.push(Instance::new(name, master));
        let idx = self.block.insts.len() - 1;
        Ok(&mut self.block.insts[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> MasterLibrary {
        MasterLibrary {
            name: "io".into(),
            masters: vec![
                Master::pad("sky130_ef_io__gpiov2_pad", PadClass::Inout).sized(80_000, 197_965),
                Master::corner("sky130_ef_io__corner_pad").sized(200_000, 204_000),
                Master::new("user_macro").sized(500_000, 300_000),
            ],
        }
    }

    #[test]
    fn finds_masters_and_flags() -> PadResult<()> {
        let mut block = Block::new("top");
        block.insts.push(Instance::new("gpio0", "sky130_ef_io__gpiov2_pad"));
        let db = LayoutDb::new(vec![lib()], block);
        let inst = db.block.find_inst("gpio0").unwrap();
        let master = db.master_of(inst)?;
        assert!(master.is_pad());
        assert!(!master.is_endcap());
        assert!(db.find_master("sky130_ef_io__corner_pad").unwrap().is_endcap());
        assert!(db.find_master("nope").is_none());
        Ok(())
    }

    #[test]
    fn creates_instances() -> PadResult<()> {
        let mut db = LayoutDb::new(vec![lib()], Block::new("top"));
        db.create_inst("user_macro", "u0")?;
        assert_eq!(db.block.insts.len(), 1);
        assert_eq!(db.block.insts[0].status, PlacementStatus::Unplaced);
        assert!(matches!(
            db.create_inst("user_macro", "u0"),
            Err(PadframeError::DuplicateInstance(n)) if n == "u0"
        ));
        assert!(matches!(
            db.create_inst("missing", "u1"),
            Err(PadframeError::UnknownMaster(m)) if m == "missing"
        ));
        Ok(())
    }

    #[test]
    fn marks_special_nets() {
        let mut net = Net {
            name: "vccd".into(),
            special: false,
            iterms: vec![
                ITerm {
                    inst: "pwr0".into(),
                    pin: "VCCD".into(),
                    special: false,
                },
                ITerm {
                    inst: "core".into(),
                    pin: "vccd1".into(),
                    special: false,
                },
            ],
        };
        net.set_special();
        assert!(net.special);
        assert!(net.iterms.iter().all(|t| t.special));
    }

    #[test]
    fn block_yaml_defaults() -> PadResult<()> {
        use crate::utils::SerializationFormat::Yaml;
        let block: Block = Yaml.from_str(
            r#"
            name: top
            insts:
              - name: gpio0
                master: sky130_ef_io__gpiov2_pad
              - name: core
                master: user_macro
                loc: {x: 10, y: 20}
                orient: FS
                status: FIXED
            "#,
        )?;
        assert_eq!(block.dbu_per_micron, DEFAULT_DBU_PER_MICRON);
        assert_eq!(block.insts[0].status, PlacementStatus::Unplaced);
        let core = block.find_inst("core").unwrap();
        assert_eq!(core.orient, Some(Orient::Fs));
        assert_eq!(core.loc, Some(Point::new(10, 20)));
        assert!(core.status.is_fixed());
        Ok(())
    }

    #[test]
    fn opens_and_saves_by_extension() -> PadResult<()> {
        let dir = tempfile::tempdir()?;
        let mut block = Block::new("top");
        let mut inst = Instance::new("gpio0", "sky130_ef_io__gpiov2_pad");
        inst.place(Point::new(5, 10), Some(Orient::W), PlacementStatus::Fixed);
        block.insts.push(inst);
        let db = LayoutDb::new(vec![lib()], block);
        for fname in ["top.def", "top.yaml", "top.json"] {
            let path = dir.path().join(fname);
            db.save(&path)?;
            let read = LayoutDb::open(vec![lib()], &path)?;
            assert_eq!(read.block, db.block, "{}", fname);
        }
        let txt = std::fs::read_to_string(dir.path().join("top.def"))?;
        assert!(txt.contains("- gpio0 sky130_ef_io__gpiov2_pad + FIXED ( 5 10 ) W ;"));
        Ok(())
    }
}
