// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::str;
use std::str::FromStr;

use anyhow::Result;
use regex::Regex;
use rust_htslib::bcf;
use strum_macros::EnumString;

use crate::errors::Error;
use crate::utils;
use crate::utils::bcf_utils::get_chrom;

/// Structural variant type as given by the SVTYPE INFO tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum SvType {
    #[strum(serialize = "BND")]
    Breakend,
    #[strum(serialize = "DEL")]
    Deletion,
    #[strum(serialize = "DUP")]
    Duplication,
    #[strum(serialize = "INV")]
    Inversion,
    #[strum(serialize = "INS")]
    Insertion,
    #[strum(serialize = "CNV")]
    Cnv,
    #[strum(serialize = "CPX")]
    Complex,
    #[strum(serialize = "CTX")]
    Translocation,
    #[strum(disabled)]
    Other(String),
}

impl SvType {
    fn parse(value: &str) -> Self {
        SvType::from_str(value).unwrap_or_else(|_| SvType::Other(value.to_owned()))
    }

    pub fn name(&self) -> &str {
        match self {
            SvType::Breakend => "BND",
            SvType::Deletion => "DEL",
            SvType::Duplication => "DUP",
            SvType::Inversion => "INV",
            SvType::Insertion => "INS",
            SvType::Cnv => "CNV",
            SvType::Complex => "CPX",
            SvType::Translocation => "CTX",
            SvType::Other(name) => name,
        }
    }

    /// Whether the type joins two loci instead of spanning a reference range.
    pub fn is_paired_breakend(&self) -> bool {
        matches!(self, SvType::Breakend | SvType::Translocation)
    }
}

impl fmt::Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accessors the overlap scorer needs from a structural variant call.
/// Positions are 1-based.
pub trait SvCall {
    fn contig_a(&self) -> &str;

    fn position_a(&self) -> u64;

    fn contig_b(&self) -> &str;

    fn position_b(&self) -> u64;

    fn svtype(&self) -> &SvType;

    /// Reference span of the call, `None` for breakends.
    fn length(&self) -> Option<u64>;

    /// Both breakends lie on the same contig and the call is not a BND.
    fn is_intrachromosomal(&self) -> bool {
        self.contig_a() == self.contig_b() && *self.svtype() != SvType::Breakend
    }
}

/// SV call derived from a VCF/BCF record.
#[derive(new, Debug, Clone, PartialEq)]
pub struct SvCallRecord {
    contig_a: String,
    position_a: u64,
    contig_b: String,
    position_b: u64,
    svtype: SvType,
    length: Option<u64>,
}

impl SvCall for SvCallRecord {
    fn contig_a(&self) -> &str {
        &self.contig_a
    }

    fn position_a(&self) -> u64 {
        self.position_a
    }

    fn contig_b(&self) -> &str {
        &self.contig_b
    }

    fn position_b(&self) -> u64 {
        self.position_b
    }

    fn svtype(&self) -> &SvType {
        &self.svtype
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}

impl SvCallRecord {
    /// Derive the SV call of the given record.
    ///
    /// # Errors
    /// * `MissingBCFTag` if no SV type can be determined, or a span call
    ///   has neither END nor SVLEN
    /// * `InvalidBNDRecordAlt` if a breakend has no mate information
    pub fn from_record(record: &bcf::Record) -> Result<Self> {
        let contig_a = get_chrom(record, record.header())?;
        let position_a = record.pos() as u64 + 1;
        let alleles = record.alleles();
        let alt_allele: &[u8] = alleles.get(1).copied().unwrap_or(b"");

        let svtype = match utils::info_tag_svtype(record)? {
            Some(svtype) => SvType::parse(&String::from_utf8_lossy(&svtype)),
            None => svtype_from_alt(alt_allele).ok_or_else(|| Error::MissingBCFTag {
                name: "SVTYPE".to_owned(),
            })?,
        };

        let chr2 = utils::info_tag_string(record, b"CHR2")?;
        let end = utils::info_tag_integer(record, b"END")?.map(|end| end as u64);
        let end2 = if svtype.is_paired_breakend() {
            utils::info_tag_integer(record, b"END2")?.map(|end| end as u64)
        } else {
            None
        };

        // mate locus from the ALT allele, unless explicitly given
        let mate = if svtype == SvType::Breakend && end2.is_none() {
            let mate = parse_bnd_mate(alt_allele)?;
            if mate.is_none() {
                return Err(Error::InvalidBNDRecordAlt {
                    spec: String::from_utf8_lossy(alt_allele).into_owned(),
                }
                .into());
            }
            mate
        } else {
            None
        };

        let contig_b = match (chr2, &mate) {
            (Some(chr2), _) => chr2,
            (None, Some((mate_contig, _))) => mate_contig.clone(),
            (None, None) => contig_a.clone(),
        };

        let position_b = match (end2, &mate, end) {
            (Some(end2), _, _) => end2,
            (None, Some((_, mate_pos)), _) => *mate_pos,
            (None, None, Some(end)) => end,
            (None, None, None) => position_a,
        };

        let svlen = utils::info_tag_integer(record, b"SVLEN")?
            .map(|svlen| u64::from(svlen.unsigned_abs()));
        let length = match svtype {
            SvType::Breakend | SvType::Translocation => None,
            SvType::Insertion => {
                let inserted = alleles
                    .get(0)
                    .filter(|ref_allele| {
                        alt_allele.len() > ref_allele.len() && alt_allele[0] != b'<'
                    })
                    .map(|ref_allele| (alt_allele.len() - ref_allele.len()) as u64);
                Some(svlen.or(inserted).ok_or_else(|| Error::MissingBCFTag {
                    name: "SVLEN".to_owned(),
                })?)
            }
            _ => {
                let span = end.filter(|end| *end >= position_a).map(|end| end - position_a + 1);
                Some(span.or(svlen).ok_or_else(|| Error::MissingBCFTag {
                    name: "SVLEN or END".to_owned(),
                })?)
            }
        };

        Ok(SvCallRecord {
            contig_a,
            position_a,
            contig_b,
            position_b,
            svtype,
            length,
        })
    }
}

/// SV type of a symbolic (`<DEL>`, `<DUP:TANDEM>`, ...) or breakend ALT allele.
fn svtype_from_alt(alt_allele: &[u8]) -> Option<SvType> {
    let alt = str::from_utf8(alt_allele).ok()?;
    if alt.starts_with('<') && alt.ends_with('>') {
        let name = alt[1..alt.len() - 1].split(':').next().unwrap_or_default();
        Some(SvType::parse(name))
    } else if alt.contains('[') || alt.contains(']') {
        Some(SvType::Breakend)
    } else {
        None
    }
}

/// Mate locus (contig, 1-based position) of a BND ALT allele, e.g. `G]17:198982]`.
/// Single breakends (`G.`, `.G`) have no mate.
fn parse_bnd_mate(alt_allele: &[u8]) -> Result<Option<(String, u64)>> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"(?P<bracket1>[\]\[])(?P<contig>[^\]\[:]+|<[^>]+>):(?P<pos>\d+)(?P<bracket2>[\]\[])").unwrap();
    }

    let spec = String::from_utf8_lossy(alt_allele).into_owned();
    if spec.starts_with('.') || spec.ends_with('.') {
        return Ok(None);
    }

    match RE.captures(&spec) {
        Some(caps) if caps["bracket1"] == caps["bracket2"] => {
            let pos = caps["pos"].parse()?;
            Ok(Some((caps["contig"].to_owned(), pos)))
        }
        _ => Err(Error::InvalidBNDRecordAlt { spec }.into()),
    }
}
