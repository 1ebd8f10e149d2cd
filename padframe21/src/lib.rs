//!
//! # Padframe21
//!
//! I/O padframe generation for chip designs.
//!
//! Given a design containing pad and corner instances, and the libraries defining their cells,
//! padframe21 assigns every pad to a die side (or checks an operator's assignment),
//! hands the result to an external placement engine,
//! and merges the placed padframe back into the design.
//!
//! The pipeline runs through [flow::run]. Its stages are usable on their own:
//!
//! * [CellRegistry::classify] sorts library cells into [CellKind]s
//! * [ExtractedInstances::extract] partitions a design's instances
//! * [PadConfig] generates, parses, writes, and validates padframe configs
//! * [merge()] reconciles a placed padframe with the design
//!

// Internal modules & re-exports
pub mod utils;

pub mod error;
pub use error::{ConfigDiff, InvocationError, PadResult, PadframeError};

pub mod db;
pub use db::{Block, Instance, LayoutDb, Master, MasterLibrary, Net, PlacementStatus};

pub mod lef;
pub use lef::LefImporter;

pub mod def;

pub mod library;
pub use library::{CellKind, CellRegistry, PadPrefixes};

pub mod extract;
pub use extract::{ExtractedInstances, PadInstance};

pub mod config;
pub use config::{Area, CornerPos, PadConfig, Side, SideEntry};

pub mod merge;
pub use merge::{merge, MergeReport};

pub mod engine;
pub use engine::{NetlistLinker, OpenRoad, Padring, PlacementEngine};

pub mod flow;
pub use flow::{FlowOptions, FlowOptionsBuilder, FlowOutcome};

#[cfg(test)]
mod tests;
