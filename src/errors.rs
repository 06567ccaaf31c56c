// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("number of --region-name ({names}) and --region-file ({files}) arguments must be equal")]
    ConfigurationMismatch { files: usize, names: usize },
    #[error("found duplicate region name {name} (region names are not case-sensitive)")]
    DuplicateRegionName { name: String },
    #[error("arguments -L and --exclude-intervals are not supported, use --region-file instead")]
    ConflictingIntervalSource,
    #[error("resulting intervals of region {name} are empty")]
    EmptyRegionSet { name: String },
    #[error("overlapping intervals in region {name} on contig {contig}: {first_start}-{first_end} and {second_start}-{second_end}")]
    MalformedRegionSet {
        name: String,
        contig: String,
        first_start: u64,
        first_end: u64,
        second_start: u64,
        second_end: u64,
    },
    #[error("sequence dictionary not found in variants header (no ##contig lines)")]
    MissingSequenceDictionary,
    #[error("invalid region name {name}: must be a valid INFO key ([A-Za-z_][0-9A-Za-z_.]*)")]
    InvalidRegionName { name: String },
    #[error("region name {name} clashes with an INFO field already defined in the variants header")]
    RegionNameConflict { name: String },
    #[error("interval {interval} refers to contig {contig}, which is not in the sequence dictionary")]
    UnknownContig { contig: String, interval: String },
    #[error("invalid interval {contig}:{start}-{end}: start must be at least 1 and not greater than end")]
    InvalidInterval { contig: String, start: u64, end: u64 },
    #[error("interval {contig}:{start}-{end} exceeds the length of contig {contig} ({len})")]
    IntervalOutOfBounds {
        contig: String,
        start: u64,
        end: u64,
        len: u64,
    },
    #[error("unable to parse interval specification '{spec}' ({source_name})")]
    InvalidIntervalSpec { spec: String, source_name: String },
    #[error("expected tag {name} missing from BCF record")]
    MissingBCFTag { name: String },
    #[error("invalid BND record: ALT {spec} does not follow BND spec")]
    InvalidBNDRecordAlt { spec: String },
    #[error("invalid BCF record at {chrom}:{pos}: {msg}")]
    InvalidBCFRecord {
        chrom: String,
        pos: i64,
        msg: String,
    },
}

pub(crate) fn invalid_bcf_record(chrom: &str, pos: i64, msg: &str) -> Error {
    Error::InvalidBCFRecord {
        chrom: chrom.to_owned(),
        pos,
        msg: msg.to_owned(),
    }
}
