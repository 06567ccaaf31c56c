// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use derive_builder::Builder;
use progress_logger::ProgressLogger;
use rust_htslib::bcf::{self, Read};

use crate::calls::{SvCall, SvCallRecord};
use crate::overlap::interval_overlap;
use crate::regions::RegionIndex;
use crate::utils::bcf_utils::{self, get_chrom};

/// INFO header lines describing the region overlap annotations, one per
/// formatted region name.
#[derive(new, Debug, Clone, PartialEq)]
pub struct AnnotationHeader {
    names: Vec<String>,
}

impl AnnotationHeader {
    pub fn info_lines(&self) -> Vec<String> {
        self.names
            .iter()
            .map(|name| {
                format!(
                    "##INFO=<ID={},Number=1,Type=Float,\
                     Description=\"Fraction overlap of region {}\">",
                    name, name
                )
            })
            .collect()
    }

    /// Register the annotation INFO fields in the given header.
    pub fn apply(&self, header: &mut bcf::Header) {
        for line in self.info_lines() {
            header.push_record(line.as_bytes());
        }
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Annotator {
    /// Region indexes in configuration order.
    regions: Vec<RegionIndex>,
    #[builder(default)]
    require_breakend_overlap: bool,
    #[builder(private)]
    bcf_reader: bcf::Reader,
    #[builder(private)]
    bcf_writer: bcf::Writer,
}

impl AnnotatorBuilder {
    /// Use the given reader and write to the given path (STDOUT if omitted),
    /// with the input header extended by the annotation fields.
    pub fn bcfs<P: AsRef<Path>>(
        self,
        reader: bcf::Reader,
        out_path: Option<P>,
        annotation_header: &AnnotationHeader,
    ) -> Result<Self> {
        let mut header = bcf::Header::from_template(reader.header());
        annotation_header.apply(&mut header);
        let writer = bcf_utils::open_writer(out_path, &header)?;

        Ok(self.bcf_reader(reader).bcf_writer(writer))
    }
}

impl Annotator {
    /// Annotate all records, one at a time, in input order.
    pub fn annotate(&mut self) -> Result<()> {
        let mut record = self.bcf_reader.empty_record();
        let mut progress_logger = ProgressLogger::builder()
            .with_items_name("records")
            .with_frequency(Duration::from_secs(20))
            .start();

        loop {
            match self.bcf_reader.read(&mut record) {
                None => break,
                Some(res) => res.context("Unable to read variant record.")?,
            }

            let call = SvCallRecord::from_record(&record).with_context(|| {
                format!(
                    "Unable to derive SV call from record at {}:{}",
                    get_chrom(&record, record.header()).unwrap_or_default(),
                    record.pos() + 1
                )
            })?;

            self.bcf_writer.translate(&mut record);
            for index in &self.regions {
                let overlap = interval_overlap(&call, index, self.require_breakend_overlap);
                debug!(
                    "{} {}:{} {}={}",
                    call.svtype(),
                    call.contig_a(),
                    call.position_a(),
                    index.name(),
                    overlap
                );
                record.push_info_float(index.name().as_bytes(), &[overlap as f32])?;
            }
            self.bcf_writer.write(&record)?;
            progress_logger.update(1u64);
        }

        progress_logger.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lines() {
        let header = AnnotationHeader::new(vec!["CODING".to_owned(), "SEGDUP".to_owned()]);
        assert_eq!(
            header.info_lines(),
            vec![
                "##INFO=<ID=CODING,Number=1,Type=Float,Description=\"Fraction overlap of region CODING\">"
                    .to_owned(),
                "##INFO=<ID=SEGDUP,Number=1,Type=Float,Description=\"Fraction overlap of region SEGDUP\">"
                    .to_owned(),
            ]
        );
    }
}
