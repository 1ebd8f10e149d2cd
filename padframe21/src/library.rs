//!
//! # Pad Library Classification
//!
//! Scans library masters and sorts every pad and corner cell into a [CellKind],
//! producing the [CellRegistry] consulted by the rest of the flow.
//!

// Std-Lib
use std::collections::BTreeMap;

// Crates.io
use log::{debug, info};

// Local Imports
use crate::db::{Master, PadClass};
use crate::error::{PadResult, PadframeError};
use crate::utils::enumstr;

/// Pad-name prefixes accepted when none are specified
pub const DEFAULT_PAD_PREFIXES: &[&str] = &["sky130_fd_io", "sky130_ef_io"];

///
/// # Accepted Pad-Name Prefixes
///
/// Every pad and corner cell name must start with one of these,
/// and no other cell name may.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadPrefixes(Vec<String>);
impl PadPrefixes {
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(prefixes.into_iter().map(Into::into).collect())
    }
    /// Boolean indication of whether `name` starts with any accepted prefix
    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|p| name.starts_with(p.as_str()))
    }
    /// Fail with [PadframeError::NamingViolation] unless `name` matches
    pub fn check(&self, name: &str) -> PadResult<()> {
        if self.matches(name) {
            Ok(())
        } else {
            Err(PadframeError::NamingViolation {
                name: name.to_string(),
                prefixes: self.0.clone(),
            })
        }
    }
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
impl Default for PadPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_PAD_PREFIXES.iter().copied())
    }
}

enumstr!(
    /// # Pad-Library Cell Kinds
    CellKind {
        Corner: "CORNER",
        PowerPad: "POWER",
        IoPad: "IO",
        Spacer: "SPACER",
        AreaIo: "AREAIO",
    }
);
impl CellKind {
    /// Classify a pad's sub-type
    fn of_pad(class: PadClass) -> Self {
        match class {
            PadClass::Spacer => Self::Spacer,
            PadClass::AreaIo => Self::AreaIo,
            PadClass::Power => Self::PowerPad,
            PadClass::Generic | PadClass::Input | PadClass::Output | PadClass::Inout => Self::IoPad,
        }
    }
    /// Engine-managed filler kinds, with no counterpart in the design netlist
    pub fn is_filler(&self) -> bool {
        matches!(self, Self::Spacer | Self::AreaIo)
    }
}

///
/// # Cell Registry
///
/// Typed map from cell name to [CellKind], covering every pad and corner cell of the libraries.
/// Lookups of unregistered names fail rather than defaulting.
///
#[derive(Debug, Clone, Default)]
pub struct CellRegistry {
    cells: BTreeMap<String, CellKind>,
}
impl CellRegistry {
    ///
    /// Classify each of `masters`.
    ///
    /// Pads and corners must satisfy `prefixes`. A master flagged as both pad and corner is rejected,
    /// as is a set of masters with no pads or corners at all.
    /// Masters flagged as neither are skipped.
    ///
    pub fn classify<'m>(
        masters: impl IntoIterator<Item = &'m Master>,
        prefixes: &PadPrefixes,
    ) -> PadResult<Self> {
        let mut cells = BTreeMap::new();
        for m in masters {
            if let Some(class) = m.pad {
                prefixes.check(&m.name)?;
                let kind = CellKind::of_pad(class);
                debug!("Found pad cell {} ({})", m.name, kind);
                cells.insert(m.name.clone(), kind);
            }
            if m.is_endcap() {
                prefixes.check(&m.name)?;
                if m.is_pad() {
                    return Err(PadframeError::AmbiguousClassification(m.name.clone()));
                }
                debug!("Found corner cell {}", m.name);
                cells.insert(m.name.clone(), CellKind::Corner);
            }
        }
        if cells.is_empty() {
            return Err(PadframeError::EmptyLibrary);
        }
        info!("The I/O libraries contain {} pad and corner cells", cells.len());
        Ok(Self { cells })
    }
    /// Get the [CellKind] of `name`, failing if it is not registered
    pub fn kind(&self, name: &str) -> PadResult<CellKind> {
        self.cells
            .get(name)
            .copied()
            .ok_or_else(|| PadframeError::UnknownCell(name.to_string()))
    }
    /// Boolean indication of whether `name` is a registered filler cell
    pub fn is_filler(&self, name: &str) -> PadResult<bool> {
        Ok(self.kind(name)?.is_filler())
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    /// Iterate over (name, kind) pairs, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, CellKind)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
