//! normalize.rs
//!
//! Turns raw interval sources into a sorted collection of non-overlapping
//! intervals: sources are combined by the set rule, padded, sorted by
//! dictionary order and merged by the merging rule.

use std::cmp;

use anyhow::Result;
use itertools::Itertools;
use strum_macros::{Display, EnumString, VariantNames};

use crate::regions::io::read_intervals;
use crate::regions::{GenomicInterval, SequenceDictionary};

/// How intervals of several sources are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames, Display)]
#[strum(ascii_case_insensitive)]
pub enum IntervalSetRule {
    #[strum(serialize = "UNION")]
    Union,
    #[strum(serialize = "INTERSECTION")]
    Intersection,
}

impl Default for IntervalSetRule {
    fn default() -> Self {
        IntervalSetRule::Union
    }
}

/// Which neighbouring intervals are merged into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames, Display)]
#[strum(ascii_case_insensitive)]
pub enum IntervalMergingRule {
    /// Merge overlapping and abutting intervals.
    #[strum(serialize = "ALL")]
    All,
    /// Merge only intervals sharing at least one base.
    #[strum(serialize = "OVERLAPPING_ONLY")]
    OverlappingOnly,
}

impl Default for IntervalMergingRule {
    fn default() -> Self {
        IntervalMergingRule::OverlappingOnly
    }
}

impl IntervalMergingRule {
    fn mergeable(self, current: &GenomicInterval, next: &GenomicInterval) -> bool {
        match self {
            IntervalMergingRule::All => current.overlaps(next) || current.abuts(next),
            IntervalMergingRule::OverlappingOnly => current.overlaps(next),
        }
    }
}

#[derive(new, CopyGetters, Debug, Clone, Copy, Default)]
pub struct Normalization {
    #[getset(get_copy = "pub")]
    set_rule: IntervalSetRule,
    #[getset(get_copy = "pub")]
    merging_rule: IntervalMergingRule,
    #[getset(get_copy = "pub")]
    padding: u64,
}

impl Normalization {
    /// Normalize intervals of the given sources (one inner vector per source).
    pub fn normalize(
        &self,
        sources: Vec<Vec<GenomicInterval>>,
        dict: &SequenceDictionary,
    ) -> Vec<GenomicInterval> {
        let combined = match self.set_rule {
            IntervalSetRule::Union => sources.into_iter().flatten().collect_vec(),
            IntervalSetRule::Intersection => {
                let mut sources = sources.into_iter().map(|intervals| {
                    sort_and_merge(intervals, IntervalMergingRule::OverlappingOnly, dict)
                });
                match sources.next() {
                    Some(first) => sources.fold(first, |acc, other| intersect(&acc, &other, dict)),
                    None => Vec::new(),
                }
            }
        };

        let padded = combined
            .into_iter()
            .map(|interval| pad(interval, self.padding, dict))
            .collect_vec();

        sort_and_merge(padded, self.merging_rule, dict)
    }
}

/// Read and normalize the given interval sources.
///
/// # Arguments
/// * `specs` - interval files or literal loci
/// * `normalization` - set rule, merging rule and padding
/// * `dict` - sequence dictionary defining contigs, their order and lengths
pub fn load_intervals<S: AsRef<str>>(
    specs: &[S],
    normalization: &Normalization,
    dict: &SequenceDictionary,
) -> Result<Vec<GenomicInterval>> {
    let sources = specs
        .iter()
        .map(|spec| read_intervals(spec.as_ref(), dict))
        .collect::<Result<Vec<_>>>()?;
    Ok(normalization.normalize(sources, dict))
}

fn pad(interval: GenomicInterval, padding: u64, dict: &SequenceDictionary) -> GenomicInterval {
    if padding == 0 {
        return interval;
    }
    let start = cmp::max(1, interval.start().saturating_sub(padding));
    let mut end = interval.end() + padding;
    if let Some(len) = dict.contig_len(interval.contig()) {
        end = cmp::min(end, len);
    }
    GenomicInterval::new(interval.contig().to_owned(), start, end)
}

fn sort_key(interval: &GenomicInterval, dict: &SequenceDictionary) -> (usize, u64, u64) {
    (
        dict.rank(interval.contig()).unwrap_or(usize::MAX),
        interval.start(),
        interval.end(),
    )
}

pub(crate) fn sort_and_merge(
    mut intervals: Vec<GenomicInterval>,
    merging_rule: IntervalMergingRule,
    dict: &SequenceDictionary,
) -> Vec<GenomicInterval> {
    intervals.sort_by_cached_key(|interval| sort_key(interval, dict));
    intervals
        .into_iter()
        .coalesce(|current, next| {
            if merging_rule.mergeable(&current, &next) {
                let end = cmp::max(current.end(), next.end());
                Ok(GenomicInterval::new(
                    current.contig().to_owned(),
                    current.start(),
                    end,
                ))
            } else {
                Err((current, next))
            }
        })
        .collect()
}

/// Intersect two sorted lists of non-overlapping intervals.
fn intersect(
    left: &[GenomicInterval],
    right: &[GenomicInterval],
    dict: &SequenceDictionary,
) -> Vec<GenomicInterval> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let (a, b) = (&left[i], &right[j]);
        if a.overlaps(b) {
            result.push(GenomicInterval::new(
                a.contig().to_owned(),
                cmp::max(a.start(), b.start()),
                cmp::min(a.end(), b.end()),
            ));
        }
        // advance whichever interval ends first
        let key_a = (sort_key(a, dict).0, a.end());
        let key_b = (sort_key(b, dict).0, b.end());
        if key_a <= key_b {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::regions::tests::dict;

    fn iv(contig: &str, start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new(contig.to_owned(), start, end)
    }

    #[test]
    fn test_rules_from_str() {
        assert_eq!(
            IntervalSetRule::from_str("intersection").unwrap(),
            IntervalSetRule::Intersection
        );
        assert_eq!(
            IntervalMergingRule::from_str("OVERLAPPING_ONLY").unwrap(),
            IntervalMergingRule::OverlappingOnly
        );
        assert!(IntervalMergingRule::from_str("NONE").is_err());
        assert_eq!(IntervalSetRule::default().to_string(), "UNION");
    }

    #[test]
    fn test_merge_overlapping_only() {
        let merged = sort_and_merge(
            vec![iv("chr1", 30, 40), iv("chr1", 10, 20), iv("chr1", 21, 25), iv("chr1", 15, 22)],
            IntervalMergingRule::OverlappingOnly,
            &dict(),
        );
        assert_eq!(merged, vec![iv("chr1", 10, 25), iv("chr1", 30, 40)]);
    }

    #[test]
    fn test_merge_all_joins_abutting() {
        let intervals = vec![iv("chr1", 10, 20), iv("chr1", 21, 30), iv("chr1", 32, 40)];
        assert_eq!(
            sort_and_merge(intervals.clone(), IntervalMergingRule::All, &dict()),
            vec![iv("chr1", 10, 30), iv("chr1", 32, 40)]
        );
        assert_eq!(
            sort_and_merge(intervals.clone(), IntervalMergingRule::OverlappingOnly, &dict()),
            intervals
        );
    }

    #[test]
    fn test_sort_by_dictionary_order() {
        let merged = sort_and_merge(
            vec![iv("chrUn", 1, 5), iv("chr2", 1, 5), iv("chr1", 100, 200)],
            IntervalMergingRule::OverlappingOnly,
            &dict(),
        );
        assert_eq!(
            merged,
            vec![iv("chr1", 100, 200), iv("chr2", 1, 5), iv("chrUn", 1, 5)]
        );
    }

    #[test]
    fn test_padding_is_clamped() {
        let normalization =
            Normalization::new(IntervalSetRule::Union, IntervalMergingRule::OverlappingOnly, 10);
        let normalized = normalization.normalize(
            vec![vec![iv("chr1", 5, 20), iv("chr2", 480, 495), iv("chrUn", 100, 200)]],
            &dict(),
        );
        assert_eq!(
            normalized,
            vec![iv("chr1", 1, 30), iv("chr2", 470, 500), iv("chrUn", 90, 210)]
        );
    }

    #[test]
    fn test_padding_merges_neighbours() {
        let normalization =
            Normalization::new(IntervalSetRule::Union, IntervalMergingRule::OverlappingOnly, 5);
        let normalized =
            normalization.normalize(vec![vec![iv("chr1", 10, 20), iv("chr1", 30, 40)]], &dict());
        assert_eq!(normalized, vec![iv("chr1", 5, 45)]);
    }

    #[test]
    fn test_union_of_sources() {
        let normalization = Normalization::default();
        let normalized = normalization.normalize(
            vec![vec![iv("chr1", 10, 20)], vec![iv("chr1", 15, 30), iv("chr2", 1, 2)]],
            &dict(),
        );
        assert_eq!(normalized, vec![iv("chr1", 10, 30), iv("chr2", 1, 2)]);
    }

    #[test]
    fn test_intersection_of_sources() {
        let normalization = Normalization::new(
            IntervalSetRule::Intersection,
            IntervalMergingRule::OverlappingOnly,
            0,
        );
        let normalized = normalization.normalize(
            vec![
                vec![iv("chr1", 10, 50), iv("chr1", 100, 200), iv("chr2", 1, 100)],
                vec![iv("chr1", 40, 120), iv("chr1", 150, 160), iv("chr2", 200, 300)],
            ],
            &dict(),
        );
        assert_eq!(
            normalized,
            vec![iv("chr1", 40, 50), iv("chr1", 100, 120), iv("chr1", 150, 160)]
        );
    }

    #[test]
    fn test_normalized_is_non_overlapping() {
        let normalization = Normalization::default();
        let normalized = normalization.normalize(
            vec![vec![
                iv("chr1", 1, 100),
                iv("chr1", 50, 60),
                iv("chr1", 99, 150),
                iv("chr1", 151, 160),
            ]],
            &dict(),
        );
        for (a, b) in normalized.iter().tuple_windows() {
            assert!(!a.overlaps(b));
        }
        assert_eq!(normalized, vec![iv("chr1", 1, 150), iv("chr1", 151, 160)]);
    }
}
