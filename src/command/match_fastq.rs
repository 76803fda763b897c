use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::{info, warn};

use crate::anchor::Chain;
use crate::clone::{load_identity_pairs, PairedReadSet};
use crate::fileformat::fastq::{create_fastq_gz, finish_fastq_gz};
use crate::fileformat::open_fastq;
use crate::runtime::config::{
    matched_fastq_in, trimmed_fastq_in, DEFAULT_MATCHED_FASTQ_DIR, DEFAULT_PREFIX,
    DEFAULT_PREPROCESS_DIR, DEFAULT_UMI_PAIRS_FILE,
};
use crate::runtime::{require_input, RunSummary};

#[derive(Args)]
pub struct MatchFastqCMD {
    // Table of UMI pairs
    #[arg(long = "pairs", value_parser, default_value = DEFAULT_UMI_PAIRS_FILE)]
    pub path_pairs: PathBuf,

    // Directory with the trimmed reads from preprocessing
    #[arg(short = 'i', long = "input-dir", value_parser, default_value = DEFAULT_PREPROCESS_DIR)]
    pub path_input_dir: PathBuf,

    // Prefix of the trimmed read files
    #[arg(short = 'p', long = "prefix", value_parser, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    // Output directory for the matched reads
    #[arg(short = 'o', long = "output-dir", value_parser, default_value = DEFAULT_MATCHED_FASTQ_DIR)]
    pub path_output: PathBuf,
}
impl MatchFastqCMD {
    /// Run the commandline option.
    /// This one keeps only the trimmed reads that were paired by UMI, as input for gene calling
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        let params = MatchFastq {
            path_pairs: self.path_pairs.clone(),
            path_input_dir: self.path_input_dir.clone(),
            path_output: self.path_output.clone(),
            prefix: self.prefix.clone(),
        };
        let _ = params.run()?;

        info!("Matched FASTQ extraction has finished successfully");
        Ok(())
    }
}

///////////////////////////////
/// Stage 2.5: filter the trimmed reads of each chain down to paired templates
#[derive(Debug, Clone)]
pub struct MatchFastq {
    pub path_pairs: PathBuf,
    pub path_input_dir: PathBuf,
    pub path_output: PathBuf,
    pub prefix: String,
}

impl MatchFastq {
    pub fn output_fastq(&self, chain: Chain, mate: u8) -> PathBuf {
        matched_fastq_in(&self.path_output, &self.prefix, chain, mate)
    }

    pub fn run(&self) -> anyhow::Result<RunSummary> {
        info!("Running command: match-fastq");
        let mut summary = RunSummary::new();

        let pairs = load_identity_pairs(&self.path_pairs, &mut summary)?;
        fs::create_dir_all(&self.path_output)?;

        for chain in Chain::ALL {
            let read_set = PairedReadSet::from_pairs(chain, &pairs);
            info!("Found {} unique {} read IDs", read_set.len(), chain);

            for mate in [1, 2] {
                let path_in = trimmed_fastq_in(&self.path_input_dir, &self.prefix, chain, mate);
                let path_out = self.output_fastq(chain, mate);
                require_input(&path_in)?;
                info!("Filtering {} -> {}", path_in.display(), path_out.display());

                let mut reader = open_fastq(&path_in)?;
                let mut writer = create_fastq_gz(&path_out)?;
                read_set.filter_fastq(
                    &mut reader,
                    &mut writer,
                    &format!("{} R{}", chain, mate),
                    &mut summary,
                )?;
                finish_fastq_gz(writer)?;
            }
        }

        if summary.reads_matched == 0 {
            warn!("No reads matched the UMI pairs");
            summary.empty_results += 1;
        }
        summary.log_summary("Matched FASTQ extraction");
        Ok(summary)
    }
}
