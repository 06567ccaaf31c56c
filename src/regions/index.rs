// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;

use anyhow::Result;
use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use bio_types::genome::AbstractInterval;
use itertools::Itertools;

use crate::errors::Error;
use crate::regions::GenomicInterval;

/// Intervals of a single contig. The tree stores the 0-based, half-open
/// ranges of the closed intervals.
struct ContigIntervals {
    tree: ArrayBackedIntervalTree<u64, ()>,
    len: usize,
}

/// Per-contig index over the normalized, non-overlapping intervals of one
/// named region set. Immutable once built.
pub struct RegionIndex {
    name: String,
    contigs: HashMap<String, ContigIntervals>,
    len: usize,
}

impl RegionIndex {
    /// Build the index of region set `name`.
    ///
    /// # Errors
    /// * `EmptyRegionSet` if no intervals are given
    /// * `MalformedRegionSet` if two intervals on one contig overlap
    pub fn build<I>(name: &str, intervals: I) -> Result<Self>
    where
        I: IntoIterator<Item = GenomicInterval>,
    {
        let mut per_contig: HashMap<String, Vec<GenomicInterval>> = HashMap::new();
        for interval in intervals {
            per_contig
                .entry(interval.contig().to_owned())
                .or_insert_with(Vec::new)
                .push(interval);
        }

        let mut contigs = HashMap::new();
        let mut len = 0;
        for (contig, mut intervals) in per_contig {
            intervals.sort_by_key(|interval| (interval.start(), interval.end()));
            if let Some((first, second)) = intervals
                .iter()
                .tuple_windows()
                .find(|(first, second)| first.overlaps(second))
            {
                return Err(Error::MalformedRegionSet {
                    name: name.to_owned(),
                    contig,
                    first_start: first.start(),
                    first_end: first.end(),
                    second_start: second.start(),
                    second_end: second.end(),
                }
                .into());
            }

            len += intervals.len();
            let contig_intervals = ContigIntervals {
                len: intervals.len(),
                tree: intervals
                    .iter()
                    .map(|interval| (interval.range(), ()))
                    .collect(),
            };
            contigs.insert(contig, contig_intervals);
        }

        if len == 0 {
            return Err(Error::EmptyRegionSet {
                name: name.to_owned(),
            }
            .into());
        }

        Ok(RegionIndex {
            name: name.to_owned(),
            contigs,
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of indexed intervals.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of intervals indexed for `contig` (zero for unknown contigs).
    pub fn contig_len(&self, contig: &str) -> usize {
        self.contigs.get(contig).map_or(0, |intervals| intervals.len)
    }

    /// Number of contigs having at least one interval.
    pub fn n_contigs(&self) -> usize {
        self.contigs.len()
    }

    /// Whether an indexed interval covers the single base `pos` (1-based).
    pub fn has_overlap(&self, contig: &str, pos: u64) -> bool {
        self.contigs
            .get(contig)
            .map_or(false, |intervals| {
                !intervals.tree.find(pos.saturating_sub(1)..pos).is_empty()
            })
    }

    /// All indexed intervals on `contig` intersecting the closed range
    /// `[start, end]`, in arbitrary order.
    pub fn overlapping_intervals<'a>(
        &'a self,
        contig: &'a str,
        start: u64,
        end: u64,
    ) -> impl Iterator<Item = GenomicInterval> + 'a {
        self.contigs
            .get(contig)
            .filter(|_| start <= end)
            .map(|intervals| intervals.tree.find(start.saturating_sub(1)..end))
            .unwrap_or_default()
            .into_iter()
            .map(move |entry| {
                let range = entry.interval();
                GenomicInterval::new(contig.to_owned(), range.start + 1, range.end)
            })
    }
}
