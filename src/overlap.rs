// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Overlap of SV calls with a region set.
//!
//! Breakend-style calls (BND, CTX, or calls joining two contigs) are scored by
//! whether both breakends fall into the region set. Calls spanning a
//! reference range are scored by the fraction of the span covered.

use std::cmp;

use crate::calls::SvCall;
use crate::regions::RegionIndex;

/// Fraction of the call overlapping the region set, in `[0, 1]`.
///
/// # Arguments
/// * `call` - the SV call
/// * `index` - index of the region set
/// * `require_breakend_overlap` - score 0 unless both breakends overlap the region set
pub fn interval_overlap<C: SvCall + ?Sized>(
    call: &C,
    index: &RegionIndex,
    require_breakend_overlap: bool,
) -> f64 {
    if index.contig_len(call.contig_a()) == 0 || index.contig_len(call.contig_b()) == 0 {
        return 0.0;
    }

    let overlaps_a = index.has_overlap(call.contig_a(), call.position_a());
    let overlaps_b = index.has_overlap(call.contig_b(), call.position_b());
    if require_breakend_overlap && !(overlaps_a && overlaps_b) {
        return 0.0;
    }

    if call.svtype().is_paired_breakend() || !call.is_intrachromosomal() {
        return if overlaps_a && overlaps_b { 1.0 } else { 0.0 };
    }

    match call.length() {
        Some(length) if length > 0 => {
            let start = call.position_a();
            let end = start + length - 1;
            let overlap = total_overlap(index, call.contig_a(), start, end);
            (overlap as f64 / length as f64).min(1.0)
        }
        _ => 0.0,
    }
}

/// Number of bases of the closed range `[start, end]` on `contig` covered by
/// the region set.
pub fn total_overlap(index: &RegionIndex, contig: &str, start: u64, end: u64) -> u64 {
    index
        .overlapping_intervals(contig, start, end)
        .map(|interval| intersection_length(start, end, interval.start(), interval.end()))
        .sum()
}

/// Number of bases shared by the closed ranges `[start1, end1]` and `[start2, end2]`.
pub fn intersection_length(start1: u64, end1: u64, start2: u64, end2: u64) -> u64 {
    (cmp::min(end1, end2) + 1).saturating_sub(cmp::max(start1, start2))
}
