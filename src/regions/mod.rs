// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Named region sets: intervals, the sequence dictionary they are validated
//! against, loading and normalization of interval files, and the per-contig
//! index the overlap scorer queries.

pub mod index;
pub mod io;
pub mod normalize;

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use anyhow::Result;
use bio_types::genome::{AbstractInterval, Position};
use rust_htslib::bcf::{self, header::HeaderView};

use crate::errors::Error;

pub use index::RegionIndex;
pub use normalize::{load_intervals, IntervalMergingRule, IntervalSetRule, Normalization};

/// A genomic interval in the closed, 1-based convention: both `start` and
/// `end` are covered bases.
#[derive(new, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicInterval {
    #[getset(get = "pub")]
    contig: String,
    #[getset(get_copy = "pub")]
    start: u64,
    #[getset(get_copy = "pub")]
    end: u64,
}

impl GenomicInterval {
    /// Number of covered bases.
    pub fn width(&self) -> u64 {
        self.end + 1 - self.start
    }

    /// Whether the two intervals share at least one base.
    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.start <= other.end && other.start <= self.end
    }

    /// Whether `other` starts right after this interval ends.
    pub fn abuts(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.end + 1 == other.start
    }
}

impl AbstractInterval for GenomicInterval {
    fn contig(&self) -> &str {
        &self.contig
    }

    /// The 0-based, half-open range of the interval.
    fn range(&self) -> Range<Position> {
        self.start - 1..self.end
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}

/// Contig names and lengths in header order, as declared by the `##contig`
/// lines of a VCF/BCF header.
#[derive(Debug, Clone, Default)]
pub struct SequenceDictionary {
    contigs: Vec<(String, Option<u64>)>,
    ranks: HashMap<String, usize>,
}

impl SequenceDictionary {
    pub fn from_header(header: &HeaderView) -> Result<Self> {
        let mut dict = SequenceDictionary::default();
        for rec in header.header_records() {
            if let bcf::header::HeaderRecord::Contig { values, .. } = rec {
                if let Some(name) = values.get("ID") {
                    let len = values.get("length").and_then(|len| len.parse().ok());
                    dict.push(name.to_owned(), len);
                }
            }
        }

        if dict.is_empty() {
            return Err(Error::MissingSequenceDictionary.into());
        }
        Ok(dict)
    }

    pub fn push(&mut self, name: String, len: Option<u64>) {
        if !self.ranks.contains_key(&name) {
            self.ranks.insert(name.clone(), self.contigs.len());
            self.contigs.push((name, len));
        }
    }

    pub fn contains(&self, contig: &str) -> bool {
        self.ranks.contains_key(contig)
    }

    /// Position of the contig in header order.
    pub fn rank(&self, contig: &str) -> Option<usize> {
        self.ranks.get(contig).copied()
    }

    /// Length of the contig, if the header declares one.
    pub fn contig_len(&self, contig: &str) -> Option<u64> {
        self.rank(contig).and_then(|rank| self.contigs[rank].1)
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}
