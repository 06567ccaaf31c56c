use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use rust_htslib::bcf;
use rust_htslib::bcf::Read as BCFRead;
use structopt::StructOpt;
use tempfile::TempDir;

use svregions::cli::{run, Svregions};
use svregions::errors::Error;

fn header(with_contigs: bool) -> bcf::Header {
    let mut header = bcf::Header::new();
    if with_contigs {
        header.push_record(br#"##contig=<ID=chr1,length=10000>"#);
        header.push_record(br#"##contig=<ID=chr2,length=5000>"#);
    }
    header.push_record(br#"##INFO=<ID=SVTYPE,Number=1,Type=String,Description="Type of structural variant">"#);
    header.push_record(br#"##INFO=<ID=END,Number=1,Type=Integer,Description="End position">"#);
    header.push_record(br#"##INFO=<ID=SVLEN,Number=1,Type=Integer,Description="Length of structural variant">"#);
    header.push_record(br#"##INFO=<ID=CHR2,Number=1,Type=String,Description="Contig of second breakend">"#);
    header.push_record(br#"##INFO=<ID=END2,Number=1,Type=Integer,Description="Position of second breakend">"#);
    header
}

/// Write three calls: DEL chr1:100-149, DUP chr1:1000-1099, BND chr1:500 -> chr2:200.
fn write_variants(path: &Path) {
    let mut writer = bcf::Writer::from_path(path, &header(true), true, bcf::Format::Vcf).unwrap();
    let chr1 = writer.header().name2rid(b"chr1").unwrap();

    let mut record = writer.empty_record();
    record.set_rid(Some(chr1));
    record.set_pos(99);
    record.set_alleles(&[b"N", b"<DEL>"]).unwrap();
    record.push_info_string(b"SVTYPE", &[b"DEL"]).unwrap();
    record.push_info_integer(b"END", &[149]).unwrap();
    record.push_info_integer(b"SVLEN", &[-50]).unwrap();
    writer.write(&record).unwrap();

    let mut record = writer.empty_record();
    record.set_rid(Some(chr1));
    record.set_pos(499);
    record.set_alleles(&[b"N", b"N[chr2:200["]).unwrap();
    record.push_info_string(b"SVTYPE", &[b"BND"]).unwrap();
    writer.write(&record).unwrap();

    let mut record = writer.empty_record();
    record.set_rid(Some(chr1));
    record.set_pos(999);
    record.set_alleles(&[b"N", b"<DUP>"]).unwrap();
    record.push_info_string(b"SVTYPE", &[b"DUP"]).unwrap();
    record.push_info_integer(b"END", &[1099]).unwrap();
    record.push_info_integer(b"SVLEN", &[100]).unwrap();
    writer.write(&record).unwrap();
}

struct Setup {
    dir: TempDir,
    variants: PathBuf,
    output: PathBuf,
}

impl Setup {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let variants = dir.path().join("calls.vcf");
        let output = dir.path().join("annotated.vcf");
        write_variants(&variants);
        Setup {
            dir,
            variants,
            output,
        }
    }

    fn region_file(&self, name: &str, content: &str) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_owned()
    }

    fn run(&self, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec![
            "svregions".to_owned(),
            "annotate-overlapping-regions".to_owned(),
            "--variants".to_owned(),
            self.variants.to_str().unwrap().to_owned(),
            "--output".to_owned(),
            self.output.to_str().unwrap().to_owned(),
        ];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        run(Svregions::from_iter(argv))
    }

    /// Annotation values of the given INFO field, in record order.
    fn annotations(&self, name: &[u8]) -> Vec<f32> {
        let mut reader = bcf::Reader::from_path(&self.output).unwrap();
        let mut values = Vec::new();
        for record in reader.records() {
            let record = record.unwrap();
            let value = record.info(name).float().unwrap().unwrap()[0];
            values.push(value);
        }
        values
    }
}

fn error_of(result: anyhow::Result<()>) -> Error {
    let err = result.unwrap_err();
    err.downcast_ref::<Error>()
        .cloned()
        .unwrap_or_else(|| panic!("unexpected error: {:?}", err))
}

#[test]
fn test_annotate_overlapping_regions() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    let segdup = setup.region_file("segdup.list", "chr1:1050-1149\nchr1:500-510\nchr2:150-250\n");
    setup
        .run(&[
            "--region-file",
            &coding,
            "--region-name",
            "Coding",
            "--region-file",
            &segdup,
            "--region-name",
            "segdup",
        ])
        .unwrap();

    let coding = setup.annotations(b"CODING");
    assert_eq!(coding.len(), 3);
    assert_relative_eq!(coding[0], 1.0);
    // explicit zeros
    assert_relative_eq!(coding[1], 0.0);
    assert_relative_eq!(coding[2], 0.0);

    let segdup = setup.annotations(b"SEGDUP");
    assert_relative_eq!(segdup[0], 0.0);
    // both breakends inside
    assert_relative_eq!(segdup[1], 1.0);
    assert_relative_eq!(segdup[2], 0.5);
}

#[test]
fn test_annotation_header() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    setup
        .run(&["--region-file", &coding, "--region-name", "coding"])
        .unwrap();

    let reader = bcf::Reader::from_path(&setup.output).unwrap();
    let info = reader
        .header()
        .header_records()
        .into_iter()
        .find_map(|rec| match rec {
            bcf::header::HeaderRecord::Info { values, .. }
                if values.get("ID").map_or(false, |id| id == "CODING") =>
            {
                Some(values)
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(info.get("Number").unwrap(), "1");
    assert_eq!(info.get("Type").unwrap(), "Float");
    assert_eq!(
        info.get("Description").unwrap().trim_matches('"'),
        "Fraction overlap of region CODING"
    );
    // input header is kept
    assert_eq!(reader.header().contig_count(), 2);
}

#[test]
fn test_require_breakend_overlap() {
    let setup = Setup::new();
    let region = setup.region_file("region.list", "chr1:100-140\n");

    setup
        .run(&["--region-file", &region, "--region-name", "REGION"])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 41.0 / 50.0, epsilon = 1e-6);

    setup
        .run(&[
            "--region-file",
            &region,
            "--region-name",
            "REGION",
            "--require-breakend-overlap",
        ])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 0.0);
}

#[test]
fn test_require_breakend_overlap_start_outside() {
    let setup = Setup::new();
    let region = setup.region_file("region.list", "chr1:110-200\n");

    setup
        .run(&["--region-file", &region, "--region-name", "REGION"])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 40.0 / 50.0, epsilon = 1e-6);

    setup
        .run(&[
            "--region-file",
            &region,
            "--region-name",
            "REGION",
            "--require-breakend-overlap",
        ])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 0.0);
}

#[test]
fn test_region_padding() {
    let setup = Setup::new();
    let region = setup.region_file("region.bed", "chr1\t59\t89\n");

    setup
        .run(&["--region-file", &region, "--region-name", "REGION"])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 0.0);

    setup
        .run(&[
            "--region-file",
            &region,
            "--region-name",
            "REGION",
            "--region-padding",
            "20",
        ])
        .unwrap();
    assert_relative_eq!(setup.annotations(b"REGION")[0], 10.0 / 50.0, epsilon = 1e-6);
}

#[test]
fn test_duplicate_region_names() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    assert_eq!(
        error_of(setup.run(&[
            "--region-file",
            &coding,
            "--region-name",
            "Coding",
            "--region-file",
            &coding,
            "--region-name",
            "CODING",
        ])),
        Error::DuplicateRegionName {
            name: "CODING".to_owned()
        }
    );
    assert!(!setup.output.exists());
}

#[test]
fn test_configuration_mismatch() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    assert_eq!(
        error_of(setup.run(&[
            "--region-file",
            &coding,
            "--region-file",
            &coding,
            "--region-name",
            "CODING",
        ])),
        Error::ConfigurationMismatch { files: 2, names: 1 }
    );
}

#[test]
fn test_conflicting_interval_source() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    assert_eq!(
        error_of(setup.run(&[
            "--region-file",
            &coding,
            "--region-name",
            "CODING",
            "-L",
            "chr1:1-1000",
        ])),
        Error::ConflictingIntervalSource
    );
}

#[test]
fn test_empty_region_set() {
    let setup = Setup::new();
    let empty = setup.region_file("empty.bed", "");
    assert_eq!(
        error_of(setup.run(&["--region-file", &empty, "--region-name", "empty"])),
        Error::EmptyRegionSet {
            name: "EMPTY".to_owned()
        }
    );
}

#[test]
fn test_region_name_conflict() {
    let setup = Setup::new();
    let coding = setup.region_file("coding.bed", "chr1\t89\t200\n");
    assert_eq!(
        error_of(setup.run(&["--region-file", &coding, "--region-name", "svlen"])),
        Error::RegionNameConflict {
            name: "SVLEN".to_owned()
        }
    );
}

#[test]
fn test_missing_sequence_dictionary() {
    let setup = Setup::new();
    {
        // header only, no ##contig lines
        bcf::Writer::from_path(&setup.variants, &header(false), true, bcf::Format::Vcf).unwrap();
    }
    let coding = setup.region_file("coding.list", "chr1:90-200\n");
    assert_eq!(
        error_of(setup.run(&["--region-file", &coding, "--region-name", "CODING"])),
        Error::MissingSequenceDictionary
    );
}
