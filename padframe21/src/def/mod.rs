//!
//! # DEF Interchange
//!
//! The external placement engine and netlist linker both speak DEF.
//! This module reads and writes the subset of it a padframe [Block] models:
//! the design name, distance units, die area, components with their placements,
//! and net connectivity. Other sections (rows, tracks, pins, vias, routing) are skipped on reading.
//!
//! ```text
//! DESIGN PADRING ;
//! UNITS DISTANCE MICRONS 1000 ;
//! COMPONENTS 1 ;
//! - gpio0 sky130_ef_io__gpiov2_pad + FIXED ( 0 0 ) N ;
//! END COMPONENTS
//! END DESIGN
//! ```
//!

// Std-Lib
use std::path::Path;

// Local Imports
use crate::db::PlacementStatus;
use crate::utils::enumstr;

pub mod read;
pub use read::{parse_file, parse_str};
pub mod write;
pub use write::{save, to_string};

enumstr!(
    /// # DEF Keywords
    DefKey {
        Version: "VERSION",
        DividerChar: "DIVIDERCHAR",
        BusBitChars: "BUSBITCHARS",
        Design: "DESIGN",
        Units: "UNITS",
        Distance: "DISTANCE",
        Microns: "MICRONS",
        DieArea: "DIEAREA",
        Components: "COMPONENTS",
        SpecialNets: "SPECIALNETS",
        Nets: "NETS",
        Placed: "PLACED",
        Fixed: "FIXED",
        Cover: "COVER",
        Unplaced: "UNPLACED",
        Pin: "PIN",
        End: "END",
    }
);
impl DefKey {
    /// Keyword for placement `status`. DEF has no firm placements; they are written as fixed.
    pub fn of_status(status: PlacementStatus) -> Option<Self> {
        match status {
            PlacementStatus::Unplaced => None,
            PlacementStatus::Placed => Some(Self::Placed),
            PlacementStatus::Firm | PlacementStatus::Fixed => Some(Self::Fixed),
        }
    }
}

/// Boolean indication of whether `path` names a DEF file, by extension
pub fn is_def(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("def"))
}
