//! io.rs
//!
//! Reading of interval sources.
//!
//! An interval source is either a file or a literal locus:
//! 1. `*.bed`: BED, 0-based half-open (read with `bio::io::bed`)
//! 2. `*.interval_list`: Picard interval list, `@` header lines, 1-based closed
//! 3. any other file: one locus per line (`#` comments allowed)
//! 4. no such file: the string itself is parsed as a locus
//!
//! Loci are written `contig`, `contig:pos`, `contig:start-end` or
//! `contig:start+`. All intervals are returned in the closed, 1-based
//! convention and are validated against the sequence dictionary.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use bio::io::bed;
use regex::Regex;

use crate::errors::Error;
use crate::regions::{GenomicInterval, SequenceDictionary};

lazy_static! {
    static ref LOCUS_RE: Regex =
        Regex::new(r"^(?P<contig>.+?):(?P<start>[\d,]+)((?P<plus>\+)|-(?P<end>[\d,]+))?$")
            .unwrap();
}

/// Read all intervals of the given source.
///
/// # Arguments
/// * `spec` - path to an interval file, or a literal locus
/// * `dict` - sequence dictionary to validate contigs and bounds against
pub fn read_intervals(spec: &str, dict: &SequenceDictionary) -> Result<Vec<GenomicInterval>> {
    let path = Path::new(spec);
    if !path.is_file() {
        let interval = parse_locus(spec, spec, dict).with_context(|| {
            format!(
                "No interval file {} found, and it is not a valid locus either",
                spec
            )
        })?;
        return Ok(vec![interval]);
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if file_name.ends_with(".bed") {
        read_bed(path, dict)
    } else if file_name.ends_with(".interval_list") {
        read_interval_list(path, dict)
    } else {
        read_locus_list(path, dict)
    }
}

fn read_bed(path: &Path, dict: &SequenceDictionary) -> Result<Vec<GenomicInterval>> {
    let mut reader = bed::Reader::from_file(path)
        .with_context(|| format!("Failed to open BED file {}", path.display()))?;

    let mut intervals = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read BED record from {}", path.display()))?;
        if record.end() <= record.start() {
            return Err(Error::InvalidInterval {
                contig: record.chrom().to_owned(),
                start: record.start() + 1,
                end: record.end(),
            }
            .into());
        }
        intervals.push(checked_interval(
            record.chrom(),
            record.start() + 1,
            record.end(),
            dict,
        )?);
    }
    Ok(intervals)
}

fn read_interval_list(path: &Path, dict: &SequenceDictionary) -> Result<Vec<GenomicInterval>> {
    let reader = BufReader::new(
        File::open(path)
            .with_context(|| format!("Failed to open interval list {}", path.display()))?,
    );

    let mut intervals = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('@') || line.trim().is_empty() {
            continue;
        }
        let invalid = || Error::InvalidIntervalSpec {
            spec: line.clone(),
            source_name: format!("{}, line {}", path.display(), i + 1),
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(invalid().into());
        }
        let start = parse_coordinate(fields[1]).ok_or_else(invalid)?;
        let end = parse_coordinate(fields[2]).ok_or_else(invalid)?;
        intervals.push(checked_interval(fields[0], start, end, dict)?);
    }
    Ok(intervals)
}

fn read_locus_list(path: &Path, dict: &SequenceDictionary) -> Result<Vec<GenomicInterval>> {
    let reader = BufReader::new(
        File::open(path)
            .with_context(|| format!("Failed to open interval file {}", path.display()))?,
    );

    let mut intervals = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        intervals.push(parse_locus(
            line,
            &format!("{}, line {}", path.display(), i + 1),
            dict,
        )?);
    }
    Ok(intervals)
}

/// Parse a single locus.
///
/// # Example
/// "chr1:1,000-2,000" covers bases 1000 to 2000 of chr1.
pub(crate) fn parse_locus(
    spec: &str,
    source_name: &str,
    dict: &SequenceDictionary,
) -> Result<GenomicInterval> {
    let whole_contig = |contig: &str| -> Result<GenomicInterval> {
        let len = dict.contig_len(contig).ok_or_else(|| Error::InvalidIntervalSpec {
            spec: spec.to_owned(),
            source_name: format!("{}: contig length unknown", source_name),
        })?;
        checked_interval(contig, 1, len, dict)
    };

    // contig names may themselves contain ':'
    if dict.contains(spec) {
        return whole_contig(spec);
    }

    let invalid = || Error::InvalidIntervalSpec {
        spec: spec.to_owned(),
        source_name: source_name.to_owned(),
    };

    match LOCUS_RE.captures(spec) {
        Some(caps) => {
            let contig = &caps["contig"];
            let start = parse_coordinate(&caps["start"]).ok_or_else(invalid)?;
            let end = if let Some(end) = caps.name("end") {
                parse_coordinate(end.as_str()).ok_or_else(invalid)?
            } else if caps.name("plus").is_some() {
                dict.contig_len(contig).ok_or_else(invalid)?
            } else {
                start
            };
            checked_interval(contig, start, end, dict)
        }
        None if !spec.contains(':') => Err(Error::UnknownContig {
            contig: spec.to_owned(),
            interval: spec.to_owned(),
        }
        .into()),
        None => Err(invalid().into()),
    }
}

fn parse_coordinate(value: &str) -> Option<u64> {
    value.trim().replace(',', "").parse().ok()
}

/// Build an interval after validating it against the sequence dictionary.
pub(crate) fn checked_interval(
    contig: &str,
    start: u64,
    end: u64,
    dict: &SequenceDictionary,
) -> Result<GenomicInterval> {
    if !dict.contains(contig) {
        return Err(Error::UnknownContig {
            contig: contig.to_owned(),
            interval: format!("{}:{}-{}", contig, start, end),
        }
        .into());
    }
    if start < 1 || end < start {
        return Err(Error::InvalidInterval {
            contig: contig.to_owned(),
            start,
            end,
        }
        .into());
    }
    if let Some(len) = dict.contig_len(contig) {
        if end > len {
            return Err(Error::IntervalOutOfBounds {
                contig: contig.to_owned(),
                start,
                end,
                len,
            }
            .into());
        }
    }
    Ok(GenomicInterval::new(contig.to_owned(), start, end))
}
