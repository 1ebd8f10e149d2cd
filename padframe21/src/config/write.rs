//!
//! # Padframe Config Writing
//!

// Std-Lib
use std::io::Write;
use std::path::Path;

// Local Imports
use super::{ConfigKey, PadConfig, SideEntry};
use crate::error::PadResult;

/// Write [PadConfig] `cfg` to file `fname`
pub fn save(cfg: &PadConfig, fname: impl AsRef<Path>) -> PadResult<()> {
    let f = std::fs::File::create(fname)?;
    ConfigWriter::new(f).write_config(cfg)
}
/// Write [PadConfig] `cfg` to a config-format [String]
pub fn to_string(cfg: &PadConfig) -> PadResult<String> {
    let mut buf = Vec::new();
    ConfigWriter::new(&mut buf).write_config(cfg)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// # Config Writing Helper
///
/// Writes statements in the order AREA (plus any GRID and FILLER), corners, then each side N, E, S, W.
/// Groups are separated by blank lines. Spaces stay in place among their side's pads.
///
pub struct ConfigWriter<'wr> {
    dest: Box<dyn Write + 'wr>,
}
impl<'wr> ConfigWriter<'wr> {
    fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
        }
    }
    fn write_config(&mut self, cfg: &PadConfig) -> PadResult<()> {
        use ConfigKey::{Area, Corner, Filler, Grid, Pad, Space};
        if let Some(area) = &cfg.area {
            self.write_line(format_args!("{} {} {} ;", Area, area.width, area.height))?;
        }
        if let Some(grid) = &cfg.grid {
            self.write_line(format_args!("{} {} ;", Grid, grid))?;
        }
        for filler in cfg.fillers.iter() {
            self.write_line(format_args!("{} {} ;", Filler, filler))?;
        }
        self.write_line(format_args!(""))?;
        for corner in cfg.corners.iter() {
            let (name, pos, cell) = (&corner.pad.name, corner.pos, &corner.pad.cell);
            self.write_line(format_args!("{} {} {} {} ;", Corner, name, pos, cell))?;
        }
        for (side, entries) in cfg.sides.iter() {
            self.write_line(format_args!(""))?;
            for entry in entries {
                match entry {
                    SideEntry::Pad(pad) => self.write_line(format_args!(
                        "{} {} {} {} ;",
                        Pad, pad.name, side, pad.cell
                    ))?,
                    SideEntry::Space(gap) => self.write_line(format_args!("{} {} ;", Space, gap))?,
                }
            }
        }
        self.dest.flush()?;
        Ok(())
    }
    fn write_line(&mut self, args: std::fmt::Arguments) -> PadResult<()> {
        writeln!(self.dest, "{}", args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{extracted, registry};
    use super::super::{Area, Side};
    use super::*;
    use crate::extract::PadInstance;

    #[test]
    fn writes_generated_layout() -> PadResult<()> {
        let ex = extracted(6);
        let cfg = PadConfig::generate(&ex, Area::new(3000, 2000))?;
        let txt = to_string(&cfg)?;
        let expected = textwrap::dedent(
            r#"
            AREA 3000 2000 ;

            CORNER corner0 SW sky130_ef_io__corner_pad ;
            CORNER corner1 NW sky130_ef_io__corner_pad ;
            CORNER corner2 NE sky130_ef_io__corner_pad ;
            CORNER corner3 SE sky130_ef_io__corner_pad ;

            PAD pad0 N sky130_ef_io__gpiov2_pad ;
            PAD pad4 N sky130_ef_io__gpiov2_pad ;

            PAD pad1 E sky130_ef_io__vccd_hvc_pad ;
            PAD pad5 E sky130_ef_io__vccd_hvc_pad ;

            PAD pad2 S sky130_ef_io__gpiov2_pad ;

            PAD pad3 W sky130_ef_io__vccd_hvc_pad ;
            "#,
        );
        assert_eq!(txt, expected.trim_start());
        Ok(())
    }

    #[test]
    fn generated_configs_parse_back() -> PadResult<()> {
        let ex = extracted(12);
        let cfg = PadConfig::generate(&ex, Area::new(3000, 3000))?;
        let txt = cfg.to_string()?;
        assert_eq!(txt.matches("CORNER ").count(), 4);
        assert_eq!(txt.matches("PAD ").count(), 12);

        let parsed = PadConfig::parse(&txt)?;
        assert_eq!(parsed, cfg);
        parsed.check_corners()?;
        parsed.validate(&registry(), &ex)?;
        Ok(())
    }

    #[test]
    fn keeps_grid_and_fillers() -> PadResult<()> {
        let mut cfg = PadConfig::generate(&extracted(4), Area::new(100, 100))?;
        cfg.grid = Some(5);
        cfg.fillers.push("sky130_ef_io__com_bus_slice".into());
        let east = cfg.sides.get_mut(Side::E);
        east.push(SideEntry::Space(25));
        east.push(PadInstance::new("fill9", "sky130_ef_io__com_bus_slice_20um").into());
        let txt = cfg.to_string()?;
        assert!(txt.starts_with("AREA 100 100 ;\nGRID 5 ;\nFILLER sky130_ef_io__com_bus_slice ;\n\n"));
        assert!(txt.contains(
            "PAD pad1 E sky130_ef_io__vccd_hvc_pad ;\nSPACE 25 ;\nPAD fill9 E sky130_ef_io__com_bus_slice_20um ;\n"
        ));
        assert_eq!(PadConfig::parse(&txt)?, cfg);
        Ok(())
    }

    #[test]
    fn saves_and_opens_files() -> PadResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("top.pf.cfg");
        let cfg = PadConfig::generate(&extracted(5), Area::new(800, 900))?;
        cfg.save(&path)?;
        assert_eq!(PadConfig::open(&path)?, cfg);
        Ok(())
    }
}
