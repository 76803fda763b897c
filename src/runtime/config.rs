use std::path::{Path, PathBuf};

use crate::anchor::Chain;

pub const DEFAULT_OUTPUT_ROOT: &str = "PairTCR_results";
pub const DEFAULT_PREFIX: &str = "TCR_TSO_18";

pub const DIR_PREPROCESS: &str = "1_preprocess_and_trim_output";
pub const DIR_UMI_PAIRS: &str = "2_create_umi_pairs_output";
pub const DIR_MATCHED_FASTQ: &str = "2.5_matched_fastq_output";
pub const DIR_PAIR_CLONES: &str = "4_pair_and_filter_clones_output";

pub const FILE_UMI_PAIRS: &str = "umi_pairs.tsv";
pub const FILE_PAIRED_CLONES: &str = "final_paired_clones_filtered.tsv";

//Defaults for running single stages; these match the layout of a default pipeline run
pub const DEFAULT_PREPROCESS_DIR: &str = "PairTCR_results/1_preprocess_and_trim_output";
pub const DEFAULT_UMI_PAIRS_FILE: &str = "PairTCR_results/2_create_umi_pairs_output/umi_pairs.tsv";
pub const DEFAULT_MATCHED_FASTQ_DIR: &str = "PairTCR_results/2.5_matched_fastq_output";
pub const DEFAULT_PAIRED_CLONES_FILE: &str =
    "PairTCR_results/4_pair_and_filter_clones_output/final_paired_clones_filtered.tsv";

///////////////////////////////
/// Where each stage of a run puts its files. All stages of one run share a root and a prefix
#[derive(Clone, Debug)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub prefix: String,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(root: P, prefix: &str) -> OutputLayout {
        OutputLayout {
            root: root.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    pub fn preprocess_dir(&self) -> PathBuf {
        self.root.join(DIR_PREPROCESS)
    }

    pub fn umi_pairs_dir(&self) -> PathBuf {
        self.root.join(DIR_UMI_PAIRS)
    }

    pub fn matched_fastq_dir(&self) -> PathBuf {
        self.root.join(DIR_MATCHED_FASTQ)
    }

    pub fn pair_clones_dir(&self) -> PathBuf {
        self.root.join(DIR_PAIR_CLONES)
    }

    /// Trimmed reads of one chain, mate 1 or 2
    pub fn trimmed_fastq(&self, chain: Chain, mate: u8) -> PathBuf {
        trimmed_fastq_in(&self.preprocess_dir(), &self.prefix, chain, mate)
    }

    pub fn matched_fastq(&self, chain: Chain, mate: u8) -> PathBuf {
        matched_fastq_in(&self.matched_fastq_dir(), &self.prefix, chain, mate)
    }

    pub fn umi_pairs_table(&self) -> PathBuf {
        self.umi_pairs_dir().join(FILE_UMI_PAIRS)
    }

    pub fn paired_clones_table(&self) -> PathBuf {
        self.pair_clones_dir().join(FILE_PAIRED_CLONES)
    }
}

///////////////////////////////
/// Name of a trimmed FASTQ written by preprocessing into a given directory
pub fn trimmed_fastq_in(dir: &Path, prefix: &str, chain: Chain, mate: u8) -> PathBuf {
    dir.join(format!("{}_{}_{}.fq.gz", prefix, chain.name(), mate))
}

///////////////////////////////
/// Name of a FASTQ holding only reads that were paired by UMI
pub fn matched_fastq_in(dir: &Path, prefix: &str, chain: Chain, mate: u8) -> PathBuf {
    dir.join(format!(
        "{}_matched_{}_matched_{}.fq.gz",
        prefix,
        chain.name(),
        mate
    ))
}
