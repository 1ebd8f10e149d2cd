//!
//! # LEF Master Import
//!
//! Converts [lef21] libraries into [MasterLibrary]s.
//! Only what the padframe flow needs survives the trip:
//! master names, pad and end-cap class annotations, and outline sizes.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use log::debug;
use rust_decimal::prelude::*;

// Local imports
use crate::db::{Int, Master, MasterLibrary, PadClass, Size, DEFAULT_DBU_PER_MICRON};
use crate::error::{PadResult, PadframeError};
use crate::utils::{ErrorContext, ErrorHelper, Unwrapper};

/// # Lef Importer
#[derive(Debug, Default)]
pub struct LefImporter {
    ctx: Vec<ErrorContext>,
    dbu_per_micron: u32,
}
impl LefImporter {
    /// Read and import the LEF file at `path`. The library is named after the file.
    pub fn open(path: impl AsRef<Path>) -> PadResult<MasterLibrary> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PadframeError::MissingFile(path.to_path_buf()));
        }
        let leflib = lef21::LefLibrary::open(path)?;
        Self::import(&leflib, path.display().to_string())
    }
    /// Import [lef21::LefLibrary] `leflib` as a [MasterLibrary] named `name`
    pub fn import(leflib: &lef21::LefLibrary, name: impl Into<String>) -> PadResult<MasterLibrary> {
        let mut importer = Self {
            ctx: Vec::new(),
            dbu_per_micron: DEFAULT_DBU_PER_MICRON,
        };
        importer.import_lib(leflib, name.into())
    }
    /// Internal implementation method. Convert the top-level library.
    fn import_lib(&mut self, leflib: &lef21::LefLibrary, name: String) -> PadResult<MasterLibrary> {
        self.ctx.push(ErrorContext::Library(name.clone()));
        self.dbu_per_micron = self.import_units(&leflib.units)?;
        let mut masters = Vec::with_capacity(leflib.macros.len());
        for lefmacro in &leflib.macros {
            masters.push(self.import_master(lefmacro)?);
        }
        debug!("Imported {} masters from {}", masters.len(), name);
        self.ctx.pop();
        Ok(MasterLibrary { name, masters })
    }
    /// Sort out the DBU-per-micron scale. LEF sizes are always in microns.
    fn import_units(&mut self, units: &Option<lef21::LefUnits>) -> PadResult<u32> {
        self.ctx.push(ErrorContext::Units);
        let dbu = match units.as_ref().and_then(|u| u.database_microns.as_ref()) {
            Some(dbu) => dbu.value(),
            None => DEFAULT_DBU_PER_MICRON,
        };
        self.assert(dbu > 0, "DATABASE MICRONS must be positive")?;
        self.ctx.pop();
        Ok(dbu)
    }
    /// Import a [Master]
    fn import_master(&mut self, lefmacro: &lef21::LefMacro) -> PadResult<Master> {
        self.ctx.push(ErrorContext::Master(lefmacro.name.clone()));
        let mut master = Master::new(&lefmacro.name);
        match &lefmacro.class {
            Some(lef21::LefMacroClass::Pad { tp }) => {
                master.pad = Some(self.import_pad_class(tp));
            }
            Some(lef21::LefMacroClass::EndCap { .. }) => master.endcap = true,
            _ => (),
        }
        if let Some((w, h)) = &lefmacro.size {
            master.size = Some(Size {
                width: self.import_dist(w)?,
                height: self.import_dist(h)?,
            });
        }
        self.ctx.pop();
        Ok(master)
    }
    /// Map a LEF `CLASS PAD` sub-type
    fn import_pad_class(&self, tp: &Option<lef21::LefPadClassType>) -> PadClass {
        use lef21::LefPadClassType::*;
        match tp {
            None => PadClass::Generic,
            Some(Input) => PadClass::Input,
            Some(Output) => PadClass::Output,
            Some(Inout) => PadClass::Inout,
            Some(Power) => PadClass::Power,
            Some(Spacer) => PadClass::Spacer,
            Some(AreaIo) => PadClass::AreaIo,
        }
    }
    /// Convert a micron-valued LEF distance to database units, rounding to the nearest unit
    fn import_dist(&mut self, microns: &lef21::LefDecimal) -> PadResult<Int> {
        self.ctx.push(ErrorContext::Size);
        let scaled = (*microns * Decimal::from(self.dbu_per_micron)).round();
        let dist: Int = scaled
            .to_i64()
            .unwrapper(self, format!("LEF size {} out of range", microns))?;
        self.ctx.pop();
        Ok(dist)
    }
}
impl ErrorHelper for LefImporter {
    fn err(&self, msg: impl Into<String>) -> PadframeError {
        PadframeError::Import {
            message: msg.into(),
            stack: self.ctx.clone(),
        }
    }
}
