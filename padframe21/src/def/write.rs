//!
//! # DEF Writing
//!

// Std-Lib
use std::io::Write;
use std::path::Path;

// Local Imports
use super::DefKey;
use crate::db::{Block, Instance, Net, Orient};
use crate::error::PadResult;

/// Write [Block] `block` to DEF file `fname`
pub fn save(block: &Block, fname: impl AsRef<Path>) -> PadResult<()> {
    let f = std::fs::File::create(fname)?;
    DefWriter::new(f).write_design(block)
}
/// Write [Block] `block` to a DEF-format [String]
pub fn to_string(block: &Block) -> PadResult<String> {
    let mut buf = Vec::new();
    DefWriter::new(&mut buf).write_design(block)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// # DEF Writing Helper
///
/// Special nets are written to SPECIALNETS, all others to NETS.
/// Firm placements are written as FIXED.
///
pub struct DefWriter<'wr> {
    dest: Box<dyn Write + 'wr>,
}
impl<'wr> DefWriter<'wr> {
    fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
        }
    }
    fn write_design(&mut self, block: &Block) -> PadResult<()> {
        use DefKey::{
            BusBitChars, Components, Design, DieArea, Distance, DividerChar, End, Microns, Nets,
            SpecialNets, Units, Version,
        };
        self.write_line(format_args!("{} 5.8 ;", Version))?;
        self.write_line(format_args!("{} \"/\" ;", DividerChar))?;
        self.write_line(format_args!("{} \"[]\" ;", BusBitChars))?;
        self.write_line(format_args!("{} {} ;", Design, block.name))?;
        self.write_line(format_args!(
            "{} {} {} {} ;",
            Units, Distance, Microns, block.dbu_per_micron
        ))?;
        if let Some(r) = &block.die_area {
            self.write_line(format_args!(
                "{} ( {} {} ) ( {} {} ) ;",
                DieArea, r.p0.x, r.p0.y, r.p1.x, r.p1.y
            ))?;
        }
        self.write_line(format_args!(""))?;

        self.write_line(format_args!("{} {} ;", Components, block.insts.len()))?;
        for inst in block.insts.iter() {
            self.write_component(inst)?;
        }
        self.write_line(format_args!("{} {}", End, Components))?;

        let (special, regular): (Vec<&Net>, Vec<&Net>) = block.nets.iter().partition(|n| n.special);
        for (key, nets) in [(SpecialNets, special), (Nets, regular)] {
            if nets.is_empty() {
                continue;
            }
            self.write_line(format_args!(""))?;
            self.write_line(format_args!("{} {} ;", key, nets.len()))?;
            for net in nets {
                self.write_net(net)?;
            }
            self.write_line(format_args!("{} {}", End, key))?;
        }

        self.write_line(format_args!(""))?;
        self.write_line(format_args!("{} {}", End, Design))?;
        self.dest.flush()?;
        Ok(())
    }
    fn write_component(&mut self, inst: &Instance) -> PadResult<()> {
        match DefKey::of_status(inst.status) {
            None => self.write_line(format_args!("- {} {} ;", inst.name, inst.master)),
            Some(key) => {
                let loc = inst.loc.unwrap_or_default();
                let orient = inst.orient.unwrap_or(Orient::N);
                self.write_line(format_args!(
                    "- {} {} + {} ( {} {} ) {} ;",
                    inst.name, inst.master, key, loc.x, loc.y, orient
                ))
            }
        }
    }
    fn write_net(&mut self, net: &Net) -> PadResult<()> {
        let conns: Vec<String> = net
            .iterms
            .iter()
            .map(|t| format!("( {} {} )", t.inst, t.pin))
            .collect();
        if conns.is_empty() {
            self.write_line(format_args!("- {} ;", net.name))
        } else {
            self.write_line(format_args!("- {} {} ;", net.name, conns.join(" ")))
        }
    }
    fn write_line(&mut self, args: std::fmt::Arguments) -> PadResult<()> {
        writeln!(self.dest, "{}", args)?;
        Ok(())
    }
}
