/// End-to-end runs of all stages on small generated inputs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use seq_io::fastq::Record;
use tempfile::TempDir;

use pairtcr::anchor::pattern::*;
use pairtcr::anchor::revcomp::try_revcomp;
use pairtcr::anchor::{AnchorPattern, Chain};
use pairtcr::command::{Pipeline, UmiPairs};
use pairtcr::fileformat::open_fastq;
use pairtcr::runtime::config::OutputLayout;
use pairtcr::runtime::Error;

fn tra_anchor(umi1: &str, umi2: &str) -> String {
    format!("{}{}{}{}{}A", PRE_UMI1_TRA, umi1, LINKER_FWD_TRA, umi2, FLANK_TRA_SEQ)
}

fn trb_anchor(umi1: &str, umi2: &str) -> String {
    format!("{}{}{}{}{}T", PRE_UMI1_TRB, umi1, LINKER_REV_TRB, umi2, FLANK_TRB_SEQ)
}

/// Write records as gzipped FASTQ
fn write_fastq_gz(path: &Path, records: &[(&str, String)]) {
    let mut gz = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    for (head, seq) in records {
        write!(gz, "@{}\n{}\n+\n{}\n", head, seq, "I".repeat(seq.len())).unwrap();
    }
    gz.finish().unwrap();
}

/// Raw reads of one sample:
/// t1 TRA forward, t2 TRB with the matching UMI, t3 TRA reverse complemented with an unmatched UMI,
/// t4 without anchor, t5 TRB with an unmatched UMI
fn create_sample(dir: &TempDir) -> (PathBuf, PathBuf) {
    let path_r1 = dir.path().join("S9_1.fq.gz");
    let path_r2 = dir.path().join("S9_2.fq.gz");

    let t3 = try_revcomp(format!("{}GATTACA", tra_anchor("ACACACA", "GTGTGTG")).as_bytes()).unwrap();
    write_fastq_gz(
        &path_r1,
        &[
            ("t1/1", format!("{}CAGCAGCAG", tra_anchor("AAAAAAA", "CCCCCCC"))),
            ("t2/1", "TTTTGGGGCCCC".to_string()),
            ("t3/1", String::from_utf8(t3).unwrap()),
            ("t4/1", "ACGTACGTACGT".to_string()),
            ("t5/1", "GGGGCCCCAAAA".to_string()),
        ],
    );
    write_fastq_gz(
        &path_r2,
        &[
            ("t1/2", "TGCTGCTGC".to_string()),
            ("t2/2", format!("{}CTGCTG", trb_anchor("GGGGGGG", "TTTTTTT"))),
            ("t3/2", "AAAACCCC".to_string()),
            ("t4/2", "ACGTACGTACGT".to_string()),
            ("t5/2", format!("{}CTGCTG", trb_anchor("CCCCCCC", "CCCCCCC"))),
        ],
    );
    (path_r1, path_r2)
}

fn heads(path: &Path) -> Vec<String> {
    let mut reader = open_fastq(path).unwrap();
    let mut out = Vec::new();
    while let Some(rec) = reader.next() {
        out.push(String::from_utf8(rec.unwrap().head().to_vec()).unwrap());
    }
    out.sort();
    out
}

#[test]
fn test_pipeline_without_gene_calls() {
    let dir = TempDir::new().unwrap();
    let (path_r1, path_r2) = create_sample(&dir);
    let layout = OutputLayout::new(dir.path().join("results"), "S9");

    let pipeline = Pipeline {
        path_forward: path_r1,
        path_reverse: path_r2,
        layout: layout.clone(),
        read_limit: None,
        tra_pattern: AnchorPattern::tra(),
        trb_pattern: AnchorPattern::trb(),
        gene_calls: None,
        threads_work: 2,
    };
    let summary = pipeline.run().unwrap();
    assert_eq!(summary.pairs_processed, 5);
    assert_eq!(summary.tra_pairs, 2);
    assert_eq!(summary.trb_pairs, 2);
    assert_eq!(summary.unclassified, 1);
    assert_eq!(summary.pairs_written, 1);

    assert_eq!(
        heads(&layout.trimmed_fastq(Chain::Tra, 1)),
        vec![
            "t1/1 TAG:TRA:AAAAAAA_CCCCCCC".to_string(),
            "t3/1 TAG:TRA:ACACACA_GTGTGTG:RC".to_string(),
        ]
    );

    let pairs = fs::read_to_string(layout.umi_pairs_table()).unwrap();
    assert_eq!(
        pairs,
        "TRA_UMI\tTRB_UMI\tTRA_Read_ID_Base\tTRB_Read_ID_Base\n\
AAAAAAA_CCCCCCC\tGGGGGGG_TTTTTTT\tt1\tt2\n"
    );

    assert_eq!(
        heads(&layout.matched_fastq(Chain::Tra, 2)),
        vec!["t1/2 TAG:TRA:AAAAAAA_CCCCCCC".to_string()]
    );
    assert_eq!(
        heads(&layout.matched_fastq(Chain::Trb, 1)),
        vec!["t2/1 TAG:TRB:GGGGGGG_TTTTTTT".to_string()]
    );
    assert!(!layout.paired_clones_table().exists());
}

#[test]
fn test_pipeline_with_gene_calls() {
    let dir = TempDir::new().unwrap();
    let (path_r1, path_r2) = create_sample(&dir);
    let layout = OutputLayout::new(dir.path().join("results"), "S9");

    let header = "bestVGene\tbestJGene\tnSeqCDR3\taaSeqCDR3\tdescrsR1\n";
    let path_tra_export = dir.path().join("tra_export.tsv");
    fs::write(
        &path_tra_export,
        format!(
            "{}TRAV1-2\tTRAJ33\tTGTGCTGTG\tCAV\tt1/1 TAG:TRA:AAAAAAA_CCCCCCC\n\
TRAV8\tTRAJ9\tTGTGCC\tCA\tt1/2 TAG:TRA:AAAAAAA_CCCCCCC\n",
            header
        ),
    )
    .unwrap();
    let path_trb_export = dir.path().join("trb_export.tsv");
    fs::write(
        &path_trb_export,
        format!(
            "{}TRBV20-1\tTRBJ2-7\tTGCAGTGCT\tCSA\tt2/1 TAG:TRB:GGGGGGG_TTTTTTT\n",
            header
        ),
    )
    .unwrap();

    let pipeline = Pipeline {
        path_forward: path_r1,
        path_reverse: path_r2,
        layout: layout.clone(),
        read_limit: None,
        tra_pattern: AnchorPattern::tra(),
        trb_pattern: AnchorPattern::trb(),
        gene_calls: Some((path_tra_export, path_trb_export)),
        threads_work: 1,
    };
    let summary = pipeline.run().unwrap();
    assert_eq!(summary.clones_written, 1);
    assert_eq!(summary.rows_duplicate, 1);

    let clones = fs::read_to_string(layout.paired_clones_table()).unwrap();
    let lines: Vec<&str> = clones.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("TRA_Read_ID_Base\tTRB_Read_ID_Base\tTRA_VGene"));
    assert_eq!(
        lines[1],
        "t1\tt2\tTRAV1-2\tTRAJ33\tTGTGCTGTG\tCAV\tTRBV20-1\tTRBJ2-7\tTGCAGTGCT\tCSA\t\
t1/1 TAG:TRA:AAAAAAA_CCCCCCC\tt2/1 TAG:TRB:GGGGGGG_TTTTTTT"
    );
}

#[test]
fn test_read_limit() {
    let dir = TempDir::new().unwrap();
    let (path_r1, path_r2) = create_sample(&dir);
    let layout = OutputLayout::new(dir.path().join("results"), "S9");

    let pipeline = Pipeline {
        path_forward: path_r1,
        path_reverse: path_r2,
        layout: layout.clone(),
        read_limit: Some(1),
        tra_pattern: AnchorPattern::tra(),
        trb_pattern: AnchorPattern::trb(),
        gene_calls: None,
        threads_work: 1,
    };
    let summary = pipeline.run().unwrap();
    assert_eq!(summary.pairs_processed, 1);
    assert_eq!(summary.tra_pairs, 1);
    assert_eq!(summary.pairs_written, 0);
    assert!(summary.empty_results > 0);

    //The pairing table still has its header
    let pairs = fs::read_to_string(layout.umi_pairs_table()).unwrap();
    assert_eq!(pairs, "TRA_UMI\tTRB_UMI\tTRA_Read_ID_Base\tTRB_Read_ID_Base\n");
}

#[test]
fn test_pipeline_custom_umi_lengths() {
    let dir = TempDir::new().unwrap();
    let path_r1 = dir.path().join("S6_1.fq.gz");
    let path_r2 = dir.path().join("S6_2.fq.gz");
    write_fastq_gz(
        &path_r1,
        &[
            ("u1/1", format!("{}CAGCAG", tra_anchor("AAAAAA", "CCCCCC"))),
            ("u2/1", "TTTTGGGGCCCC".to_string()),
        ],
    );
    write_fastq_gz(
        &path_r2,
        &[
            ("u1/2", "TGCTGCTGC".to_string()),
            ("u2/2", format!("{}CTGCTG", trb_anchor("GGGGGG", "TTTTTT"))),
        ],
    );

    let run = |umi_len: usize, name: &str| {
        let layout = OutputLayout::new(dir.path().join(name), "S6");
        let pipeline = Pipeline {
            path_forward: path_r1.clone(),
            path_reverse: path_r2.clone(),
            layout,
            read_limit: None,
            tra_pattern: AnchorPattern::tra().with_umi_lengths(umi_len, umi_len),
            trb_pattern: AnchorPattern::trb().with_umi_lengths(umi_len, umi_len),
            gene_calls: None,
            threads_work: 1,
        };
        pipeline.run().unwrap()
    };

    let summary = run(6, "six");
    assert_eq!(summary.tra_pairs, 1);
    assert_eq!(summary.trb_pairs, 1);
    assert_eq!(summary.pairs_written, 1);

    //Six-base UMIs do not fit the default structure
    let summary = run(UMI1_LEN, "default");
    assert_eq!(summary.tra_pairs, 0);
    assert_eq!(summary.unclassified, 2);
}

#[test]
fn test_missing_input_fails_stage() {
    let dir = TempDir::new().unwrap();
    let umi_pairs = UmiPairs {
        path_tra: dir.path().join("none_TRA_1.fq.gz"),
        path_trb: dir.path().join("none_TRB_1.fq.gz"),
        path_output: dir.path().join("pairs.tsv"),
    };
    let err = umi_pairs.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InputNotFound { .. })
    ));
    assert!(!dir.path().join("pairs.tsv").exists());
}
