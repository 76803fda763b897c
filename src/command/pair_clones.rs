use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::anchor::Chain;
use crate::clone::{load_identity_pairs, CloneJoiner, GeneCallTable};
use crate::runtime::config::{DEFAULT_PAIRED_CLONES_FILE, DEFAULT_UMI_PAIRS_FILE};
use crate::runtime::{require_input, RunSummary};

#[derive(Args)]
pub struct PairClonesCMD {
    // Table of UMI pairs
    #[arg(long = "pairs", value_parser, default_value = DEFAULT_UMI_PAIRS_FILE)]
    pub path_pairs: PathBuf,

    // Gene calls of the TRA reads
    #[arg(long = "tra-export", value_parser)]
    pub path_tra_export: PathBuf,

    // Gene calls of the TRB reads
    #[arg(long = "trb-export", value_parser)]
    pub path_trb_export: PathBuf,

    // Output table of paired clones
    #[arg(short = 'o', long = "output-file", value_parser, default_value = DEFAULT_PAIRED_CLONES_FILE)]
    pub path_output: PathBuf,
}
impl PairClonesCMD {
    /// Run the commandline option.
    /// This one joins UMI-paired reads with the gene calls of both chains
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        let params = PairClones {
            path_pairs: self.path_pairs.clone(),
            path_tra_export: self.path_tra_export.clone(),
            path_trb_export: self.path_trb_export.clone(),
            path_output: self.path_output.clone(),
        };
        let _ = params.run()?;

        info!("Clone pairing has finished successfully");
        Ok(())
    }
}

///////////////////////////////
/// Stage 3: join identity pairs with the gene-call tables of both chains
#[derive(Debug, Clone)]
pub struct PairClones {
    pub path_pairs: PathBuf,
    pub path_tra_export: PathBuf,
    pub path_trb_export: PathBuf,
    pub path_output: PathBuf,
}

impl PairClones {
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        info!("Running command: pair-clones");
        require_input(&self.path_pairs)?;
        require_input(&self.path_tra_export)?;
        require_input(&self.path_trb_export)?;
        if let Some(parent) = self.path_output.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut summary = RunSummary::new();
        let tra = GeneCallTable::load(&self.path_tra_export, Chain::Tra, &mut summary)?;
        let trb = GeneCallTable::load(&self.path_trb_export, Chain::Trb, &mut summary)?;
        let pairs = load_identity_pairs(&self.path_pairs, &mut summary)?;

        let joiner = CloneJoiner::new(tra, trb);
        let clones = joiner.join(&pairs);
        CloneJoiner::write_clones_to_file(&self.path_output, &clones, &mut summary)?;

        summary.log_summary("Clone pairing");
        Ok(summary)
    }
}
