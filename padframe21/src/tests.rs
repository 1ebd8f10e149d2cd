//!
//! # Padframe Flow Tests
//!
//! End-to-end runs of [flow::run] over the `resources` library and design,
//! with the external tools stood in for by in-process mocks.
//!

// Std-Lib
use std::cell::Cell;
use std::path::{Path, PathBuf};

// Local Imports
use crate::db::{Block, Instance, Orient, PlacementStatus, Point};
use crate::engine::{LinkRequest, NetlistLinker, PlaceRequest, PlacementEngine};
use crate::utils::{EnumStr, SerdeFile};
use crate::*;

/// Get the path of resource-file `rname`
fn resource(rname: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname))
}

/// Placement engine which lines up every config entry along the bottom edge,
/// and adds a filler after each side's pads.
/// Its result makes the same DEF round trip as a real engine's.
struct MockEngine {
    block_name: String,
    calls: Cell<usize>,
}
impl Default for MockEngine {
    fn default() -> Self {
        Self {
            block_name: "PADRING".into(),
            calls: Cell::new(0),
        }
    }
}
impl PlacementEngine for MockEngine {
    fn place(&self, req: &PlaceRequest) -> PadResult<Block> {
        self.calls.set(self.calls.get() + 1);
        let cfg = PadConfig::open(req.config)?;
        assert!(cfg.area.is_some(), "engine configs must have an AREA");
        let mut block = Block::new(&self.block_name);
        let mut x = 0;
        let mut add = |name: &str, cell: &str| {
            let mut inst = Instance::new(name, cell);
            inst.place(Point::new(x, 0), Some(Orient::N), PlacementStatus::Fixed);
            block.insts.push(inst);
            x += 100_000;
        };
        for corner in cfg.corners.iter() {
            add(&corner.pad.name, &corner.pad.cell);
        }
        for side in Side::variants() {
            for pad in cfg.sides.pads(*side) {
                add(&pad.name, &pad.cell);
            }
            add(&format!("fill_{}", side), "sky130_ef_io__com_bus_slice_20um");
        }
        def::save(&block, req.output)?;
        def::parse_file(req.output)
    }
}

/// Linker which "links" by converting the resource design to DEF
#[derive(Default)]
struct MockLinker {
    calls: Cell<usize>,
}
impl NetlistLinker for MockLinker {
    fn link(&self, req: &LinkRequest) -> PadResult<Block> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(req.top, "top");
        let block = Block::open_path(resource("top.yaml"))?;
        def::save(&block, req.output)?;
        def::parse_file(req.output)
    }
}

/// Options for a layout-mode run writing into `dir`
fn options(dir: &Path) -> FlowOptionsBuilder {
    FlowOptionsBuilder::default()
        .lefs(vec![resource("io.lef")])
        .layout(resource("top.yaml"))
        .output(dir.join("top.placed.json"))
        .working_dir(dir.join("work"))
}

#[test]
fn imports_resource_library() -> PadResult<()> {
    let lib = LefImporter::open(resource("io.lef"))?;
    assert_eq!(lib.masters.len(), 6);
    let registry = CellRegistry::classify(&lib.masters, &PadPrefixes::default())?;
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.kind("sky130_ef_io__corner_pad")?, CellKind::Corner);
    assert_eq!(registry.kind("sky130_ef_io__vccd_hvc_pad")?, CellKind::PowerPad);
    assert_eq!(
        registry.kind("sky130_ef_io__connect_vcchib_vccd_and_vswitch_vddio_slice_20um")?,
        CellKind::AreaIo
    );
    let gpio = lib
        .masters
        .iter()
        .find(|m| m.name == "sky130_ef_io__gpiov2_pad")
        .unwrap();
    assert_eq!(gpio.size.map(|s| (s.width, s.height)), Some((80_000, 197_965)));
    Ok(())
}

#[test]
fn init_only_writes_config() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let opts = options(dir.path())
        .width(3000)
        .height(3500)
        .init_only(true)
        .build()
        .unwrap();
    let engine = MockEngine::default();
    let outcome = flow::run(&opts, &engine, &MockLinker::default())?;
    let cfg_path = dir.path().join("work").join("top.pf.cfg");
    assert_eq!(outcome, FlowOutcome::ConfigGenerated(cfg_path.clone()));
    assert_eq!(engine.calls.get(), 0);
    assert!(!opts.output.exists());

    let txt = std::fs::read_to_string(&cfg_path)?;
    assert!(txt.starts_with("AREA 3000 3500 ;\n\nCORNER corner_sw SW sky130_ef_io__corner_pad ;\n"));
    let cfg = PadConfig::parse(&txt)?;
    assert_eq!(cfg.corners[3].pad.name, "corner_se");
    assert_eq!(cfg.corners[3].pos, CornerPos::Se);
    let side_sizes: Vec<_> = cfg.sides.iter().map(|(_, pads)| pads.len()).collect();
    assert_eq!(side_sizes, vec![2, 2, 1, 1]);
    Ok(())
}

#[test]
fn places_and_merges() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let opts = options(dir.path())
        .width(3000)
        .height(3500)
        .special_nets(vec!["vccd".to_string()])
        .build()
        .unwrap();
    let engine = MockEngine::default();
    let outcome = flow::run(&opts, &engine, &MockLinker::default())?;
    assert_eq!(engine.calls.get(), 1);
    let report = match outcome {
        FlowOutcome::Placed { output, report } => {
            assert_eq!(output, opts.output);
            report
        }
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(report.promoted, 10);
    assert_eq!(report.created, vec!["fill_N", "fill_E", "fill_S", "fill_W"]);
    assert_eq!(report.centered, vec!["mprj"]);
    assert_eq!(report.special_nets, vec!["vccd"]);
    assert!(dir.path().join("work").join("top.pf.padring.def").exists());

    // Read back the saved design
    let placed = Block::open_path(&opts.output)?;
    assert_eq!(placed.name, "top");
    assert_eq!(placed.insts.len(), 15);
    for inst in placed.insts.iter() {
        match inst.name.as_str() {
            "mprj" => {
                assert_eq!(inst.status, PlacementStatus::Placed);
                assert_eq!(inst.loc, Some(Point::new(40_000, -10_000)));
            }
            _ => {
                assert_eq!(inst.status, PlacementStatus::Firm);
                assert_eq!(inst.orient, Some(Orient::N));
                assert!(inst.loc.is_some());
            }
        }
    }
    let vccd = placed.nets.iter().find(|n| n.name == "vccd").unwrap();
    assert!(vccd.special && vccd.iterms.iter().all(|t| t.special));
    let gpio_in0 = placed.nets.iter().find(|n| n.name == "gpio_in0").unwrap();
    assert!(!gpio_in0.special);
    Ok(())
}

#[test]
fn edited_configs_are_validated() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let init = options(dir.path())
        .width(3000)
        .height(3500)
        .init_only(true)
        .build()
        .unwrap();
    let cfg_path = match flow::run(&init, &MockEngine::default(), &MockLinker::default())? {
        FlowOutcome::ConfigGenerated(p) => p,
        other => panic!("unexpected {:?}", other),
    };

    // Move a pad between sides, and add a spaced-out filler. Still valid.
    let mut cfg = PadConfig::open(&cfg_path)?;
    let moved = cfg.sides.get_mut(Side::N).remove(0);
    cfg.sides.get_mut(Side::W).push(moved);
    let south = cfg.sides.get_mut(Side::S);
    south.push(SideEntry::Space(50));
    south.push(
        PadInstance::new(
            "bus0",
            "sky130_ef_io__connect_vcchib_vccd_and_vswitch_vddio_slice_20um",
        )
        .into(),
    );
    let edited = dir.path().join("edited.cfg");
    cfg.save(&edited)?;
    let opts = options(dir.path())
        .padframe_config(edited.clone())
        .build()
        .unwrap();
    let engine = MockEngine::default();
    flow::run(&opts, &engine, &MockLinker::default())?;
    assert_eq!(engine.calls.get(), 1);

    // Drop a pad. Invalid.
    let dropped = cfg.sides.get_mut(Side::E).pop().unwrap().into_pad().unwrap();
    cfg.save(&edited)?;
    let engine = MockEngine::default();
    match flow::run(&opts, &engine, &MockLinker::default()) {
        Err(PadframeError::ConfigMismatch(diff)) => {
            assert_eq!(diff.only_in_design, vec![dropped]);
            assert!(diff.only_in_config.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(engine.calls.get(), 0);
    Ok(())
}

#[test]
fn user_configs_take_area_from_options() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let init = options(dir.path())
        .width(1)
        .height(1)
        .init_only(true)
        .build()
        .unwrap();
    flow::run(&init, &MockEngine::default(), &MockLinker::default())?;
    let working = dir.path().join("work").join("top.pf.cfg");
    let mut cfg = PadConfig::open(&working)?;
    cfg.area = None;
    let user = dir.path().join("no_area.cfg");
    cfg.save(&user)?;

    // Checking a config needs no area
    let opts = options(dir.path())
        .padframe_config(user.clone())
        .init_only(true)
        .build()
        .unwrap();
    let outcome = flow::run(&opts, &MockEngine::default(), &MockLinker::default())?;
    assert_eq!(outcome, FlowOutcome::ConfigGenerated(user.clone()));

    // Placing it does
    let opts = options(dir.path()).padframe_config(user.clone()).build().unwrap();
    let engine = MockEngine::default();
    assert!(matches!(
        flow::run(&opts, &engine, &MockLinker::default()),
        Err(PadframeError::MissingArea)
    ));
    assert_eq!(engine.calls.get(), 0);

    // Area from the options, completed into the working config
    let opts = options(dir.path())
        .padframe_config(user.clone())
        .width(2000)
        .height(2500)
        .build()
        .unwrap();
    flow::run(&opts, &MockEngine::default(), &MockLinker::default())?;
    assert_eq!(PadConfig::open(&working)?.area, Some(Area::new(2000, 2500)));
    assert_eq!(PadConfig::open(&user)?.area, None);
    let placed = Block::open_path(&opts.output)?;
    let mprj = placed.insts.iter().find(|i| i.name == "mprj").unwrap();
    assert_eq!(mprj.loc, Some(Point::new(-460_000, -510_000)));
    Ok(())
}

#[test]
fn config_area_overrides_options() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let init = options(dir.path())
        .width(3000)
        .height(3500)
        .init_only(true)
        .build()
        .unwrap();
    flow::run(&init, &MockEngine::default(), &MockLinker::default())?;
    let mut cfg = PadConfig::open(dir.path().join("work").join("top.pf.cfg"))?;
    cfg.area = Some(Area::new(4000, 4000));
    let user = dir.path().join("big.cfg");
    cfg.save(&user)?;

    let opts = options(dir.path())
        .padframe_config(user)
        .width(3000)
        .height(3500)
        .build()
        .unwrap();
    flow::run(&opts, &MockEngine::default(), &MockLinker::default())?;
    // Centered in the config's 4000 x 4000 die, not the options' 3000 x 3500
    let placed = Block::open_path(&opts.output)?;
    let mprj = placed.insts.iter().find(|i| i.name == "mprj").unwrap();
    assert_eq!(mprj.loc, Some(Point::new(540_000, 240_000)));
    Ok(())
}

#[test]
fn links_netlists() -> PadResult<()> {
    let dir = tempfile::tempdir()?;
    let netlist = dir.path().join("top.v");
    std::fs::write(&netlist, "module top(); endmodule\n")?;
    let opts = FlowOptionsBuilder::default()
        .lefs(vec![resource("io.lef")])
        .netlist(netlist.clone())
        .design("top")
        .output(dir.path().join("top.placed.yaml"))
        .working_dir(dir.path().to_path_buf())
        .width(3000)
        .height(3500)
        .build()
        .unwrap();
    let linker = MockLinker::default();
    flow::run(&opts, &MockEngine::default(), &linker)?;
    assert_eq!(linker.calls.get(), 1);
    assert!(dir.path().join("top.pf.def").exists());
    assert!(dir.path().join("top.pf.padring.def").exists());
    assert!(opts.output.exists());

    // Netlists need a design name
    let mut unnamed = opts.clone();
    unnamed.design = None;
    assert!(matches!(
        flow::run(&unnamed, &MockEngine::default(), &linker),
        Err(PadframeError::Usage(_))
    ));
    // And exclude layouts
    let mut both = opts.clone();
    both.layout = Some(resource("top.yaml"));
    assert!(matches!(
        flow::run(&both, &MockEngine::default(), &linker),
        Err(PadframeError::Usage(_))
    ));
    // Which must exist
    let mut missing = opts;
    missing.netlist = Some(dir.path().join("nope.v"));
    assert!(matches!(
        flow::run(&missing, &MockEngine::default(), &linker),
        Err(PadframeError::MissingFile(_))
    ));
    assert_eq!(linker.calls.get(), 1);
    Ok(())
}

#[test]
fn flow_failures() -> PadResult<()> {
    let dir = tempfile::tempdir()?;

    // No area for generation
    let opts = options(dir.path()).width(3000).build().unwrap();
    assert!(matches!(
        flow::run(&opts, &MockEngine::default(), &MockLinker::default()),
        Err(PadframeError::MissingArea)
    ));

    // Engine produces something other than a padframe
    let opts = options(dir.path()).width(3000).height(3000).build().unwrap();
    let engine = MockEngine {
        block_name: "top".into(),
        ..Default::default()
    };
    assert!(matches!(
        flow::run(&opts, &engine, &MockLinker::default()),
        Err(PadframeError::UnexpectedDesignName { found, .. }) if found == "top"
    ));

    // Unsupported output format
    let opts = options(dir.path())
        .output(dir.path().join("top.gds"))
        .width(3000)
        .height(3000)
        .build()
        .unwrap();
    assert!(matches!(
        flow::run(&opts, &MockEngine::default(), &MockLinker::default()),
        Err(PadframeError::Usage(_))
    ));

    // Missing libraries
    let opts = options(dir.path())
        .lefs(vec![dir.path().join("missing.lef")])
        .width(3000)
        .height(3000)
        .build()
        .unwrap();
    assert!(matches!(
        flow::run(&opts, &MockEngine::default(), &MockLinker::default()),
        Err(PadframeError::MissingFile(_))
    ));

    // Pads outside the accepted prefixes
    let opts = options(dir.path())
        .prefixes(PadPrefixes::new(["acme_io"]))
        .width(3000)
        .height(3000)
        .build()
        .unwrap();
    assert!(matches!(
        flow::run(&opts, &MockEngine::default(), &MockLinker::default()),
        Err(PadframeError::NamingViolation { .. })
    ));
    Ok(())
}

/// Stand-in for `padring`: reads the config named by its last argument,
/// and writes a DEF placing each corner and pad along the bottom edge, plus one filler
#[cfg(unix)]
const PADRING_SCRIPT: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --def) out="$2"; shift ;;
    -L) shift ;;
    *) cfg="$1" ;;
  esac
  shift
done
comps="$out.components"
: > "$comps"
x=0
while read -r key name pos cell rest; do
  case "$key" in
    CORNER|PAD)
      echo "- $name $cell + FIXED ( $x 0 ) N ;" >> "$comps"
      x=$((x + 100000)) ;;
  esac
done < "$cfg"
echo "- fill_0 sky130_ef_io__com_bus_slice_20um + FIXED ( $x 0 ) N ;" >> "$comps"
{
  echo "VERSION 5.8 ;"
  echo "DESIGN PADRING ;"
  echo "UNITS DISTANCE MICRONS 1000 ;"
  echo "COMPONENTS $(wc -l < "$comps") ;"
  cat "$comps"
  echo "END COMPONENTS"
  echo "END DESIGN"
} > "$out"
"#;

#[cfg(unix)]
#[test]
fn places_with_padring_writing_def() -> PadResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir()?;
    let program = dir.path().join("padring");
    std::fs::write(&program, PADRING_SCRIPT)?;
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;
    let engine = Padring {
        program: program.display().to_string(),
    };

    let opts = options(dir.path())
        .output(dir.path().join("top.placed.def"))
        .width(3000)
        .height(3500)
        .build()
        .unwrap();
    let report = match flow::run(&opts, &engine, &MockLinker::default())? {
        FlowOutcome::Placed { report, .. } => report,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(report.promoted, 10);
    assert_eq!(report.created, vec!["fill_0"]);
    assert_eq!(report.centered, vec!["mprj"]);

    // The placed design is written as DEF too, firm placements as FIXED
    let placed = def::parse_file(&opts.output)?;
    assert_eq!(placed.name, "top");
    assert_eq!(placed.insts.len(), 12);
    let corner_nw = placed.insts.iter().find(|i| i.name == "corner_nw").unwrap();
    assert_eq!(corner_nw.loc, Some(Point::new(100_000, 0)));
    assert_eq!(corner_nw.status, PlacementStatus::Fixed);
    let mprj = placed.insts.iter().find(|i| i.name == "mprj").unwrap();
    assert_eq!(mprj.status, PlacementStatus::Placed);
    assert_eq!(mprj.loc, Some(Point::new(40_000, -10_000)));
    assert_eq!(placed.nets.len(), 2);
    Ok(())
}
