//!
//! # Padframe Flow
//!
//! The end-to-end, strictly sequential pipeline:
//!
//! 1. Import libraries, and read or link the design
//! 2. Classify library cells, and extract the design's pads and corners
//! 3. Generate a padframe config, or validate the operator's
//! 4. Stop here in init-only mode. Otherwise complete the config's die area, and invoke the placement engine
//! 5. Merge its result into the design, and save.
//!
//! Both external tools exchange layouts as DEF, through files in the working directory.
//!

// Std-Lib
use std::path::{Path, PathBuf};

// Crates.io
use derive_builder::Builder;
use log::{info, warn};

// Local Imports
use crate::config::{Area, PadConfig};
use crate::db::{Int, LayoutDb, MasterLibrary};
use crate::def;
use crate::engine::{LinkRequest, NetlistLinker, PlaceRequest, PlacementEngine};
use crate::error::{PadResult, PadframeError};
use crate::extract::ExtractedInstances;
use crate::lef::LefImporter;
use crate::library::{CellRegistry, PadPrefixes};
use crate::merge::{merge, MergeReport};
use crate::utils::SerializationFormat;

/// Block name the placement engine gives its padframe
pub const PADFRAME_DESIGN_NAME: &str = "PADRING";

///
/// # Padframe Flow Options
///
/// Exactly one of `netlist` and `layout` must be set. `netlist` also requires `design`.
/// Die `width` and `height` are in microns.
///
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct FlowOptions {
    /// Library (LEF) files
    pub lefs: Vec<PathBuf>,
    /// Structural netlist, to be linked
    #[builder(default, setter(strip_option))]
    pub netlist: Option<PathBuf>,
    /// Pre-built layout
    #[builder(default, setter(strip_option))]
    pub layout: Option<PathBuf>,
    /// Top-level design name
    #[builder(default, setter(strip_option))]
    pub design: Option<String>,
    #[builder(default, setter(strip_option))]
    pub width: Option<Int>,
    #[builder(default, setter(strip_option))]
    pub height: Option<Int>,
    /// Operator-edited padframe config. Generated if not provided.
    #[builder(default, setter(strip_option))]
    pub padframe_config: Option<PathBuf>,
    /// Destination of the placed design
    pub output: PathBuf,
    /// Home of intermediate files
    #[builder(default = "PathBuf::from(\".\")")]
    pub working_dir: PathBuf,
    /// Names of nets to mark special
    #[builder(default)]
    pub special_nets: Vec<String>,
    #[builder(default)]
    pub prefixes: PadPrefixes,
    /// Stop once the config is written
    #[builder(default)]
    pub init_only: bool,
}
impl FlowOptions {
    /// Die area supplied by the operator, if both dimensions are
    fn area(&self) -> Option<Area> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Area::new(w, h)),
            _ => None,
        }
    }
    /// Working-directory path for design `name` with suffix `suffix`
    fn working_path(&self, name: &str, suffix: &str) -> PathBuf {
        self.working_dir.join(format!("{}.{}", name, suffix))
    }
}

/// # Flow Results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Init-only runs stop after writing the config, at this path
    ConfigGenerated(PathBuf),
    /// Full runs produce a placed design
    Placed { output: PathBuf, report: MergeReport },
}

///
/// Run the padframe flow per `opts`, with external tools `engine` and `linker`.
///
pub fn run(
    opts: &FlowOptions,
    engine: &dyn PlacementEngine,
    linker: &dyn NetlistLinker,
) -> PadResult<FlowOutcome> {
    check_layout_format(&opts.output)?;
    let libs = import_libs(&opts.lefs)?;
    std::fs::create_dir_all(&opts.working_dir)?;
    let mut design = read_design(opts, libs.clone(), linker)?;
    let name = match &opts.design {
        Some(name) => name.clone(),
        None => design.block.name.clone(),
    };
    info!("Top-level design name: {}", design.block.name);

    let registry = CellRegistry::classify(design.masters(), &opts.prefixes)?;
    let extracted = ExtractedInstances::extract(&design, &registry, &opts.prefixes)?;

    let cfg_path = opts.working_path(&name, "pf.cfg");
    let (mut cfg, mut placed_cfg_path) = match &opts.padframe_config {
        Some(user_path) => {
            let cfg = PadConfig::open(user_path)?;
            cfg.check_corners()?;
            cfg.validate(&registry, &extracted)?;
            (cfg, user_path.clone())
        }
        None => {
            let area = opts.area().ok_or(PadframeError::MissingArea)?;
            let cfg = PadConfig::generate(&extracted, area)?;
            cfg.save(&cfg_path)?;
            (cfg, cfg_path.clone())
        }
    };

    if opts.init_only {
        info!(
            "Padframe config ready at {}. Modify it and re-run with `--padframe-config {}`",
            placed_cfg_path.display(),
            placed_cfg_path.display()
        );
        return Ok(FlowOutcome::ConfigGenerated(placed_cfg_path));
    }

    // The engine requires an AREA statement. A config's own takes precedence over the options.
    let area = match cfg.area {
        Some(area) => area,
        None => {
            let area = opts.area().ok_or(PadframeError::MissingArea)?;
            cfg.area = Some(area);
            cfg.save(&cfg_path)?;
            placed_cfg_path = cfg_path;
            area
        }
    };

    let padframe = engine.place(&PlaceRequest {
        lefs: &opts.lefs,
        config: &placed_cfg_path,
        output: &opts.working_path(&name, "pf.padring.def"),
    })?;
    if padframe.name != PADFRAME_DESIGN_NAME {
        return Err(PadframeError::UnexpectedDesignName {
            expected: PADFRAME_DESIGN_NAME.to_string(),
            found: padframe.name,
        });
    }
    let padframe = LayoutDb::new(libs, padframe);

    info!("Applying pad placements to the design");
    let report = merge(&mut design, &padframe, &extracted, &opts.special_nets, area)?;
    design.save(&opts.output)?;
    info!("Wrote {}", opts.output.display());
    Ok(FlowOutcome::Placed {
        output: opts.output.clone(),
        report,
    })
}

/// Import each LEF file in `lefs`
fn import_libs(lefs: &[PathBuf]) -> PadResult<Vec<MasterLibrary>> {
    if lefs.is_empty() {
        return Err(PadframeError::usage("at least one LEF file is required"));
    }
    lefs.iter().map(|lef| LefImporter::open(lef)).collect()
}

/// Read the design layout, linking it first in netlist mode
fn read_design(
    opts: &FlowOptions,
    libs: Vec<MasterLibrary>,
    linker: &dyn NetlistLinker,
) -> PadResult<LayoutDb> {
    match (&opts.netlist, &opts.layout) {
        (Some(netlist), None) => {
            let top = opts
                .design
                .as_ref()
                .ok_or_else(|| PadframeError::usage("a netlist requires a design name"))?;
            require_file(netlist)?;
            let block = linker.link(&LinkRequest {
                lefs: &opts.lefs,
                netlist,
                top,
                output: &opts.working_path(top, "pf.def"),
            })?;
            Ok(LayoutDb::new(libs, block))
        }
        (None, Some(layout)) => {
            require_file(layout)?;
            check_layout_format(layout)?;
            if opts.design.is_some() {
                warn!("Design name is only used for naming working files in layout mode");
            }
            LayoutDb::open(libs, layout)
        }
        (Some(_), Some(_)) => Err(PadframeError::usage(
            "provide only one of a netlist and a layout",
        )),
        (None, None) => Err(PadframeError::usage(
            "either a netlist or a layout is required",
        )),
    }
}

/// Fail with [PadframeError::MissingFile] unless `path` exists
fn require_file(path: &Path) -> PadResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PadframeError::MissingFile(path.to_path_buf()))
    }
}

/// Fail unless the extension of layout file `path` names DEF or a [SerializationFormat]
fn check_layout_format(path: &Path) -> PadResult<()> {
    if def::is_def(path) || SerializationFormat::from_path(path).is_some() {
        return Ok(());
    }
    Err(PadframeError::usage(format!(
        "cannot infer a layout format for {:?}, expected .def, .json, .yaml, .yml, or .toml",
        path
    )))
}
