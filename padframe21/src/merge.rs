//!
//! # Placement Merging
//!
//! Copies the placement engine's padframe back into the original design.
//! Pads and corners the design already has are promoted to firm placements,
//! engine-inserted fillers are created, declared special nets are flagged,
//! and whatever remains unplaced lands at the die center.
//!

// Crates.io
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

// Local Imports
use crate::config::Area;
use crate::db::{Instance, Int, LayoutDb, PlacementStatus, Point, Size};
use crate::error::{PadResult, PadframeError};
use crate::extract::ExtractedInstances;

/// # Summary of a [merge]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MergeReport {
    /// Number of existing design instances given firm placements
    pub promoted: usize,
    /// Names of newly created filler instances
    pub created: Vec<String>,
    /// Names of instances placed at the die center
    pub centered: Vec<String>,
    /// Names of nets marked special
    pub special_nets: Vec<String>,
}

///
/// Merge the placed `padframe` into `design`.
///
/// Every `padframe` instance must be a pad or corner. Those listed in `extracted` must exist in
/// `design` and be unplaced there; they take the padframe's location and orientation, with status
/// [PlacementStatus::Firm]. All others are created in `design`, likewise firmly placed.
///
/// Nets named in `special_nets` are then flagged, and every instance neither placed nor fixed
/// is centered in `area`.
///
pub fn merge(
    design: &mut LayoutDb,
    padframe: &LayoutDb,
    extracted: &ExtractedInstances,
    special_nets: &[String],
    area: Area,
) -> PadResult<MergeReport> {
    let mut report = MergeReport::default();
    for placed in padframe.block.insts.iter() {
        let master = padframe.master_of(placed)?;
        if !master.is_pad() && !master.is_endcap() {
            return Err(PadframeError::UnexpectedInstanceKind {
                inst: placed.name.clone(),
                master: master.name.clone(),
            });
        }
        if extracted.contains(&placed.name, &placed.master) {
            promote(design, placed)?;
            report.promoted += 1;
        } else {
            debug!("Creating filler {} ({})", placed.name, placed.master);
            let inst = design.create_inst(&placed.master, &placed.name)?;
            copy_placement(inst, placed);
            report.created.push(placed.name.clone());
        }
    }
    report.special_nets = mark_special_nets(design, special_nets);
    report.centered = place_at_center(design, area);
    info!(
        "Placed {} design pads, created {} fillers, centered {} other instances",
        report.promoted,
        report.created.len(),
        report.centered.len()
    );
    Ok(report)
}

/// Give the design's counterpart of `placed` its placement
fn promote(design: &mut LayoutDb, placed: &Instance) -> PadResult<()> {
    let inst = design
        .block
        .find_inst_mut(&placed.name)
        .ok_or_else(|| PadframeError::InstanceNotFound(placed.name.clone()))?;
    if inst.status != PlacementStatus::Unplaced {
        return Err(PadframeError::AlreadyPlaced {
            inst: inst.name.clone(),
            status: inst.status,
        });
    }
    copy_placement(inst, placed);
    Ok(())
}

/// Copy the location and orientation of `from` into `to`, and mark it firm
fn copy_placement(to: &mut Instance, from: &Instance) {
    let loc = match from.loc {
        Some(loc) => loc,
        None => {
            warn!("Padframe instance {} has no location, using the origin", from.name);
            Point::default()
        }
    };
    to.place(loc, from.orient, PlacementStatus::Firm);
}

/// Flag every net named in `names`, returning the names of those found
fn mark_special_nets(design: &mut LayoutDb, names: &[String]) -> Vec<String> {
    let mut marked = Vec::new();
    for net in design.block.nets.iter_mut() {
        if names.contains(&net.name) {
            info!("Marking {} as a special net", net.name);
            net.set_special();
            marked.push(net.name.clone());
        }
    }
    for name in names {
        if !marked.contains(name) {
            warn!("Special net {} not found in the design", name);
        }
    }
    marked
}

/// Place every instance neither placed nor fixed at the center of `area`
fn place_at_center(design: &mut LayoutDb, area: Area) -> Vec<String> {
    let dbu = Int::from(design.block.dbu_per_micron);
    // Sizes first, while the libraries are borrowable
    let sizes: Vec<Size> = design
        .block
        .insts
        .iter()
        .map(|inst| match design.find_master(&inst.master).and_then(|m| m.size) {
            Some(size) => size,
            None => {
                warn!("No size for master {} of {}, centering its origin", inst.master, inst.name);
                Size::default()
            }
        })
        .collect();
    let mut centered = Vec::new();
    for (inst, size) in design.block.insts.iter_mut().zip(sizes) {
        if inst.status.is_placed() || inst.status.is_fixed() {
            continue;
        }
        let loc = Point::new(
            area.width * dbu / 2 - size.width / 2,
            area.height * dbu / 2 - size.height / 2,
        );
        info!("Placing {} at the die center {:?}", inst.name, loc);
        inst.loc = Some(loc);
        inst.status = PlacementStatus::Placed;
        centered.push(inst.name.clone());
    }
    centered
}
