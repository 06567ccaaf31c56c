// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::PathBuf;

use anyhow::Result;
use structopt::StructOpt;
use strum::VariantNames;

use crate::annotation::{annotate_overlapping_regions, RegionAnnotationConfig};
use crate::regions::{IntervalMergingRule, IntervalSetRule};

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "svregions",
    about = "Annotation of structural variant calls with their overlap against named region sets.",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
pub struct Svregions {
    #[structopt(long, global = true, help = "Print debug information.")]
    pub verbose: bool,
    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt, Clone)]
pub enum Command {
    #[structopt(
        name = "annotate-overlapping-regions",
        about = "Annotate each SV call with the fraction of it overlapping each given region set. \
                 BND and interchromosomal calls are annotated with 1 if both breakends lie inside \
                 the region set, and 0 otherwise.",
        setting = structopt::clap::AppSettings::ColoredHelp
    )]
    AnnotateOverlappingRegions {
        #[structopt(
            long,
            parse(from_os_str),
            help = "VCF/BCF file with SV calls (if omitted, read from STDIN)."
        )]
        variants: Option<PathBuf>,
        #[structopt(
            long,
            parse(from_os_str),
            help = "VCF/BCF file that shall contain the results (if omitted, write BCF to STDOUT). \
                    Paths ending with .vcf or .vcf.gz are written as VCF."
        )]
        output: Option<PathBuf>,
        #[structopt(
            long = "region-file",
            required = true,
            number_of_values = 1,
            help = "Region file (BED, interval list, or one locus per line). May be given \
                    multiple times, paired with --region-name in order."
        )]
        region_files: Vec<String>,
        #[structopt(
            long = "region-name",
            required = true,
            number_of_values = 1,
            help = "Name of the region set, used as INFO key (upper-cased). May be given \
                    multiple times, paired with --region-file in order."
        )]
        region_names: Vec<String>,
        #[structopt(
            long = "region-set-rule",
            default_value = "UNION",
            possible_values = IntervalSetRule::VARIANTS,
            case_insensitive = true,
            help = "How intervals of a region file are combined."
        )]
        region_set_rule: IntervalSetRule,
        #[structopt(
            long = "region-merging-rule",
            default_value = "OVERLAPPING_ONLY",
            possible_values = IntervalMergingRule::VARIANTS,
            case_insensitive = true,
            help = "Which intervals of a region file are merged: ALL also merges abutting intervals."
        )]
        region_merging_rule: IntervalMergingRule,
        #[structopt(
            long = "region-padding",
            default_value = "0",
            help = "Padding (bp) added to both sides of each region interval."
        )]
        region_padding: u64,
        #[structopt(
            long = "require-breakend-overlap",
            help = "Annotate 0 unless both breakends of a call lie inside the region set."
        )]
        require_breakend_overlap: bool,
        #[structopt(
            short = "L",
            long = "intervals",
            number_of_values = 1,
            help = "Global interval restriction. Not supported, use --region-file instead."
        )]
        intervals: Vec<String>,
        #[structopt(
            long = "exclude-intervals",
            number_of_values = 1,
            help = "Global interval exclusion. Not supported, use --region-file instead."
        )]
        exclude_intervals: Vec<String>,
    },
}

pub fn run(opt: Svregions) -> Result<()> {
    match opt.command {
        Command::AnnotateOverlappingRegions {
            variants,
            output,
            region_files,
            region_names,
            region_set_rule,
            region_merging_rule,
            region_padding,
            require_breakend_overlap,
            intervals,
            exclude_intervals,
        } => {
            let config = RegionAnnotationConfig {
                variants,
                output,
                region_files,
                region_names,
                set_rule: region_set_rule,
                merging_rule: region_merging_rule,
                padding: region_padding,
                require_breakend_overlap,
                intervals,
                exclude_intervals,
            };
            annotate_overlapping_regions(&config)
        }
    }
}
