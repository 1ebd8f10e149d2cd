//!
//! # Side Assignment
//!

use crate::extract::PadInstance;

/// Number of die sides
const NSIDES: usize = 4;

///
/// Distribute `pads` across the four sides.
///
/// Bucket `i` receives the pads at positions `i, i+4, i+8, ...`, and each bucket is then
/// (stably) sorted by cell name. Bucket sizes differ by at most one.
/// No attempt is made to balance physical width per side.
///
pub fn chunk(pads: &[PadInstance]) -> [Vec<PadInstance>; NSIDES] {
    let mut buckets: [Vec<PadInstance>; NSIDES] = Default::default();
    for (idx, pad) in pads.iter().enumerate() {
        buckets[idx % NSIDES].push(pad.clone());
    }
    for bucket in buckets.iter_mut() {
        bucket.sort_by(|a, b| a.cell.cmp(&b.cell));
    }
    buckets
}
