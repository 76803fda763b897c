use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::{info, warn};

use crate::anchor::Chain;
use crate::fileformat::{create_tsv, open_fastq};
use crate::runtime::config::{trimmed_fastq_in, DEFAULT_PREFIX, DEFAULT_PREPROCESS_DIR, DEFAULT_UMI_PAIRS_FILE};
use crate::runtime::{require_input, RunSummary};
use crate::umi::reconcile::PAIRS_HEADER;
use crate::umi::{IdentifierIndexer, ReverseComplementReconciler};

#[derive(Args)]
pub struct UmiPairsCMD {
    // Directory with the trimmed reads from preprocessing
    #[arg(short = 'i', long = "input-dir", value_parser, default_value = DEFAULT_PREPROCESS_DIR)]
    pub path_input_dir: PathBuf,

    // Prefix of the trimmed read files
    #[arg(short = 'p', long = "prefix", value_parser, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    // Output table of UMI pairs
    #[arg(short = 'o', long = "output-file", value_parser, default_value = DEFAULT_UMI_PAIRS_FILE)]
    pub path_output: PathBuf,
}
impl UmiPairsCMD {
    /// Run the commandline option.
    /// This one pairs TRA and TRB reads whose UMIs are reverse complements of each other
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        let params = UmiPairs {
            path_tra: trimmed_fastq_in(&self.path_input_dir, &self.prefix, Chain::Tra, 1),
            path_trb: trimmed_fastq_in(&self.path_input_dir, &self.prefix, Chain::Trb, 1),
            path_output: self.path_output.clone(),
        };
        let _ = params.run()?;

        info!("UMI pairing has finished successfully");
        Ok(())
    }
}

///////////////////////////////
/// Stage 2: index the TRA UMIs, then look up every TRB read
#[derive(Debug, Clone)]
pub struct UmiPairs {
    pub path_tra: PathBuf,
    pub path_trb: PathBuf,
    pub path_output: PathBuf,
}

impl UmiPairs {
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        info!("Running command: umi-pairs");
        require_input(&self.path_tra)?;
        require_input(&self.path_trb)?;
        if let Some(parent) = self.path_output.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut summary = RunSummary::new();

        //The TRA index must be complete before any TRB read is looked up
        info!("Reading TRA UMIs from {}", self.path_tra.display());
        let mut tra_reader = open_fastq(&self.path_tra)?;
        let tra_index = IdentifierIndexer::index_reader(Chain::Tra, &mut tra_reader, &mut summary);
        let reconciler = ReverseComplementReconciler::new(tra_index, &mut summary);

        info!("Reading TRB UMIs from {} and finding pairs", self.path_trb.display());
        let mut trb_reader = open_fastq(&self.path_trb)?;
        let mut writer = create_tsv(&self.path_output, &PAIRS_HEADER)?;
        reconciler.reconcile_reader(&mut trb_reader, &mut writer, &mut summary)?;

        if summary.pairs_written == 0 {
            warn!("No TRB UMI matched a reverse-complemented TRA UMI");
            summary.empty_results += 1;
        }
        info!("Output written to {}", self.path_output.display());
        summary.log_summary("UMI pairing");
        Ok(summary)
    }
}
