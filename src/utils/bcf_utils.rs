//! bcf_utils.rs
//!
//! Utilities for VCF/BCF file handling.
//!
//! This module provides:
//! 1. Record field extraction (chromosome)
//! 2. Header inspection (declared INFO fields)
//! 3. Opening readers and writers on paths or STDIN/STDOUT

use std::path::Path;

use anyhow::{Context, Result};
use rust_htslib::bcf::{self, header::HeaderView};

use crate::errors;

/* ========= BCF Extraction Functions ============= */

/// Get chromosome name from a VCF record
///
/// # Arguments
/// * `record` - VCF record
/// * `header` - VCF header (for resolving RID to name)
///
/// # Errors
/// Returns error if the record has no RID or the RID is not in the header.
///
/// # Example
/// assert_eq!(get_chrom(&record, &header).unwrap(), "chr1");
pub(crate) fn get_chrom(record: &bcf::Record, header: &HeaderView) -> Result<String> {
    let rid = record
        .rid()
        .ok_or_else(|| errors::invalid_bcf_record("unknown", record.pos(), "missing CHROM"))?;

    let chrom_bytes = header.rid2name(rid).map_err(|_| {
        errors::invalid_bcf_record(
            "unknown",
            record.pos(),
            &format!("contig with RID {} not in header", rid),
        )
    })?;

    Ok(String::from_utf8_lossy(chrom_bytes).to_string())
}

/* ================================================ */

/* ========= BCF Header Functions ================= */

/// Check whether the header declares the INFO field `id`.
///
/// # Example
/// assert!(info_field_exists(reader.header(), "SVTYPE"));
pub(crate) fn info_field_exists(header: &HeaderView, id: &str) -> bool {
    header.header_records().iter().any(|rec| match rec {
        bcf::header::HeaderRecord::Info { values, .. } => {
            values.get("ID").map_or(false, |value| value == id)
        }
        _ => false,
    })
}

/* ================================================ */

/* ========= BCF Reader/Writer Functions ========== */

/// Open a VCF/BCF reader on the given path, or on STDIN.
pub(crate) fn open_reader<P: AsRef<Path>>(path: Option<P>) -> Result<bcf::Reader> {
    Ok(if let Some(path) = path {
        let path = path.as_ref();
        bcf::Reader::from_path(path)
            .with_context(|| format!("Unable to read variants from {}.", path.display()))?
    } else {
        bcf::Reader::from_stdin().context("Unable to read variants from STDIN.")?
    })
}

/// Output format for the given path: `.vcf` and `.vcf.gz` are written as
/// VCF (the latter compressed), everything else as BCF.
///
/// # Returns
/// Tuple (uncompressed, format)
pub(crate) fn output_format(path: &Path) -> (bool, bcf::Format) {
    let name = path.to_string_lossy();
    if name.ends_with(".vcf") {
        (true, bcf::Format::Vcf)
    } else if name.ends_with(".vcf.gz") {
        (false, bcf::Format::Vcf)
    } else {
        (false, bcf::Format::Bcf)
    }
}

/// Open a writer on the given path, or BCF on STDOUT.
pub(crate) fn open_writer<P: AsRef<Path>>(
    path: Option<P>,
    header: &bcf::Header,
) -> Result<bcf::Writer> {
    Ok(if let Some(path) = path {
        let path = path.as_ref();
        let (uncompressed, format) = output_format(path);
        bcf::Writer::from_path(path, header, uncompressed, format)
            .with_context(|| format!("Unable to write BCF to {}.", path.display()))?
    } else {
        bcf::Writer::from_stdout(header, false, bcf::Format::Bcf)
            .context("Unable to write BCF to STDOUT.")?
    })
}

/* ================================================ */
