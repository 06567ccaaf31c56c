//! mod.rs
//!
//! Annotation of SV calls with their overlap against named region sets.
//!
//! This module provides:
//! 1. Annotation configuration and validation
//! 2. Main pipeline orchestration
//!     - Loading and indexing of region sets (regions module),
//!     - Streaming annotation of records (annotator module)

mod annotator;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};
use regex::Regex;
use rust_htslib::bcf::Read;

use crate::errors::Error;
use crate::regions::{
    load_intervals, GenomicInterval, IntervalMergingRule, IntervalSetRule, Normalization,
    RegionIndex, SequenceDictionary,
};
use crate::utils::{self, bcf_utils};

pub use annotator::{AnnotationHeader, Annotator, AnnotatorBuilder};

lazy_static! {
    static ref INFO_KEY_RE: Regex = Regex::new(r"^[A-Za-z_][0-9A-Za-z_.]*$").unwrap();
}

/* ======== CLI CONFIGURATION ===================== */

/// Configuration for the region annotation pipeline.
#[derive(Debug, Clone, Default)]
pub struct RegionAnnotationConfig {
    /// VCF/BCF file with SV calls (None = STDIN).
    pub variants: Option<PathBuf>,
    /// Output VCF/BCF file (None = STDOUT).
    pub output: Option<PathBuf>,
    /// Region files, paired positionally with `region_names`.
    pub region_files: Vec<String>,
    pub region_names: Vec<String>,
    pub set_rule: IntervalSetRule,
    pub merging_rule: IntervalMergingRule,
    /// Padding applied to each region interval (bp).
    pub padding: u64,
    /// Score 0 unless both breakends of a call lie inside the region set.
    pub require_breakend_overlap: bool,
    /// Global interval restriction, not supported together with region files.
    pub intervals: Vec<String>,
    pub exclude_intervals: Vec<String>,
}

impl RegionAnnotationConfig {
    /// Validate the configuration.
    ///
    /// # Returns
    /// The formatted (upper-case) region names, in configuration order.
    pub fn validate(&self) -> Result<Vec<String>> {
        if !self.intervals.is_empty() || !self.exclude_intervals.is_empty() {
            return Err(Error::ConflictingIntervalSource.into());
        }

        if self.region_files.len() != self.region_names.len() {
            return Err(Error::ConfigurationMismatch {
                files: self.region_files.len(),
                names: self.region_names.len(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(self.region_names.len());
        for name in &self.region_names {
            if !INFO_KEY_RE.is_match(name) {
                return Err(Error::InvalidRegionName { name: name.clone() }.into());
            }
            let formatted = name.to_uppercase();
            if !seen.insert(formatted.clone()) {
                return Err(Error::DuplicateRegionName { name: name.clone() }.into());
            }
            names.push(formatted);
        }

        Ok(names)
    }

    fn normalization(&self) -> Normalization {
        Normalization::new(self.set_rule, self.merging_rule, self.padding)
    }
}

/* ================================================ */

/* ============ PIPELINE ========================== */

/// Annotate every SV call of the input with its overlap against each
/// configured region set.
pub fn annotate_overlapping_regions(config: &RegionAnnotationConfig) -> Result<()> {
    info!("----------------------------------------------");
    info!("Step 1: Config Stats");
    info!("----------------------------------------------");
    let names = config.validate()?;
    info!("Variants: {}", display_path(&config.variants, "STDIN"));
    info!("Output: {}", display_path(&config.output, "STDOUT"));
    for (name, file) in names.iter().zip(&config.region_files) {
        info!("Region {}: {}", name, file);
    }
    info!(
        "Set rule: {}, merging rule: {}, padding: {}",
        config.set_rule, config.merging_rule, config.padding
    );
    info!("Require breakend overlap: {}", config.require_breakend_overlap);

    info!("----------------------------------------------");
    info!("Step 2: Reading variants header");
    info!("----------------------------------------------");
    let reader = bcf_utils::open_reader(config.variants.as_ref())?;
    if !utils::is_sv_bcf(&reader) {
        warn!("No SVTYPE INFO field declared in variants header, input is probably not an SV VCF.");
    }
    let dict = SequenceDictionary::from_header(reader.header())?;
    info!("Sequence dictionary: {} contigs", dict.len());
    for name in &names {
        if bcf_utils::info_field_exists(reader.header(), name) {
            return Err(Error::RegionNameConflict { name: name.clone() }.into());
        }
    }

    info!("----------------------------------------------");
    info!("Step 3: Loading regions");
    info!("----------------------------------------------");
    let normalization = config.normalization();
    let mut regions = Vec::with_capacity(names.len());
    for (name, file) in names.iter().zip(&config.region_files) {
        let intervals = load_intervals(&[file], &normalization, &dict)?;
        let bases: u64 = intervals.iter().map(GenomicInterval::width).sum();
        let index = RegionIndex::build(name, intervals)?;
        info!(
            "Region {}: {} intervals covering {} bp on {} contigs",
            name,
            index.len(),
            bases,
            index.n_contigs()
        );
        regions.push(index);
    }

    info!("----------------------------------------------");
    info!("Step 4(Final): Annotating records");
    info!("----------------------------------------------");
    let annotation_header = AnnotationHeader::new(names);
    let mut annotator = AnnotatorBuilder::default()
        .regions(regions)
        .require_breakend_overlap(config.require_breakend_overlap)
        .bcfs(reader, config.output.as_ref(), &annotation_header)?
        .build()?;
    annotator.annotate()?;
    info!("Annotation finished successfully.");

    Ok(())
}

fn display_path(path: &Option<PathBuf>, fallback: &str) -> String {
    path.as_ref()
        .map_or_else(|| fallback.to_owned(), |path| path.display().to_string())
}

/* ================================================ */
