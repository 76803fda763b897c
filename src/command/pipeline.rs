use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use log::{info, warn};

use super::preprocess::resolve_input_pair;
use super::{determine_thread_counts_1, MatchFastq, PairClones, Preprocess, UmiPairs};
use crate::anchor::pattern::{UMI1_LEN, UMI2_LEN};
use crate::anchor::{AnchorPattern, Chain};
use crate::runtime::config::{OutputLayout, DEFAULT_OUTPUT_ROOT, DEFAULT_PREFIX};
use crate::runtime::RunSummary;

#[derive(Args)]
pub struct PipelineCMD {
    // FASTQ for r1
    #[arg(long = "r1", value_parser)]
    pub path_forward: Option<PathBuf>,

    // FASTQ for r2
    #[arg(long = "r2", value_parser)]
    pub path_reverse: Option<PathBuf>,

    // Directory to look for <sample>_1.fq.gz and <sample>_2.fq.gz, if --r1/--r2 not given
    #[arg(short = 'i', long = "input-dir", value_parser)]
    pub path_input_dir: Option<PathBuf>,

    // Root directory for the output of all stages
    #[arg(short = 'o', long = "output-root", value_parser, default_value = DEFAULT_OUTPUT_ROOT)]
    pub path_output_root: PathBuf,

    // Prefix of output files. Defaults to the sample name if found with -i
    #[arg(short = 'p', long = "prefix", value_parser)]
    pub prefix: Option<String>,

    // Optional: stop after this many read pairs
    #[arg(short = 'n', long = "read-limit", value_parser = clap::value_parser!(u64))]
    pub read_limit: Option<u64>,

    #[arg(long = "umi1-len", value_parser = clap::value_parser!(usize), default_value_t = UMI1_LEN)]
    pub umi1_len: usize,

    #[arg(long = "umi2-len", value_parser = clap::value_parser!(usize), default_value_t = UMI2_LEN)]
    pub umi2_len: usize,

    // Optional: gene calls of the matched TRA reads. Clones are only paired if both tables are given
    #[arg(long = "tra-export", value_parser)]
    pub path_tra_export: Option<PathBuf>,

    // Optional: gene calls of the matched TRB reads
    #[arg(long = "trb-export", value_parser)]
    pub path_trb_export: Option<PathBuf>,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    pub num_threads_total: Option<usize>,
}
impl PipelineCMD {
    /// Run the commandline option.
    /// This one runs all stages in order, each on the output of the one before
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        let (path_forward, path_reverse, sample) = resolve_input_pair(
            &self.path_forward,
            &self.path_reverse,
            &self.path_input_dir,
        )?;
        let prefix = self
            .prefix
            .clone()
            .or(sample)
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let gene_calls = match (&self.path_tra_export, &self.path_trb_export) {
            (Some(tra), Some(trb)) => Some((tra.clone(), trb.clone())),
            (None, None) => None,
            _ => anyhow::bail!("Give gene calls for both chains, or for none"),
        };

        let params = Pipeline {
            path_forward,
            path_reverse,
            layout: OutputLayout::new(&self.path_output_root, &prefix),
            read_limit: self.read_limit,
            tra_pattern: AnchorPattern::tra().with_umi_lengths(self.umi1_len, self.umi2_len),
            trb_pattern: AnchorPattern::trb().with_umi_lengths(self.umi1_len, self.umi2_len),
            gene_calls,
            threads_work: determine_thread_counts_1(self.num_threads_total)?,
        };
        let summary = params.run()?;
        summary.log_summary("Pipeline");
        if summary.num_warnings() > 0 {
            warn!("Pipeline finished with {} warnings, see above", summary.num_warnings());
        }

        info!("Pipeline has finished successfully");
        Ok(())
    }
}

///////////////////////////////
/// All stages of a run. A failed stage stops the run; later stages are not attempted
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub path_forward: PathBuf,
    pub path_reverse: PathBuf,
    pub layout: OutputLayout,
    pub read_limit: Option<u64>,
    pub tra_pattern: AnchorPattern,
    pub trb_pattern: AnchorPattern,
    pub gene_calls: Option<(PathBuf, PathBuf)>,
    pub threads_work: usize,
}

impl Pipeline {
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        let layout = &self.layout;
        info!("Output root: {}", layout.root.display());
        info!("File prefix: {}", layout.prefix);
        let mut summary = RunSummary::new();

        info!("Step 1: preprocess and trim");
        let preprocess = Preprocess {
            path_forward: self.path_forward.clone(),
            path_reverse: self.path_reverse.clone(),
            path_output: layout.preprocess_dir(),
            prefix: layout.prefix.clone(),
            read_limit: self.read_limit,
            tra_pattern: self.tra_pattern.clone(),
            trb_pattern: self.trb_pattern.clone(),
            threads_work: self.threads_work,
        };
        let one = Preprocess::run(Arc::new(preprocess)).context("Step 1 (preprocess) failed")?;
        summary.add_summary(&one);

        info!("Step 2: create UMI pairs");
        let umi_pairs = UmiPairs {
            path_tra: layout.trimmed_fastq(Chain::Tra, 1),
            path_trb: layout.trimmed_fastq(Chain::Trb, 1),
            path_output: layout.umi_pairs_table(),
        };
        let one = umi_pairs.run().context("Step 2 (umi-pairs) failed")?;
        summary.add_summary(&one);

        info!("Step 2.5: create matched FASTQ files");
        let match_fastq = MatchFastq {
            path_pairs: layout.umi_pairs_table(),
            path_input_dir: layout.preprocess_dir(),
            path_output: layout.matched_fastq_dir(),
            prefix: layout.prefix.clone(),
        };
        let one = match_fastq.run().context("Step 2.5 (match-fastq) failed")?;
        summary.add_summary(&one);

        //Gene calling happens outside; pairing clones needs its result
        if let Some((path_tra_export, path_trb_export)) = &self.gene_calls {
            info!("Step 4: pair and filter clones");
            let pair_clones = PairClones {
                path_pairs: layout.umi_pairs_table(),
                path_tra_export: path_tra_export.clone(),
                path_trb_export: path_trb_export.clone(),
                path_output: layout.paired_clones_table(),
            };
            let one = pair_clones.run().context("Step 4 (pair-clones) failed")?;
            summary.add_summary(&one);
        } else {
            info!(
                "No gene calls given. Call genes on the reads in {}, then run pair-clones",
                layout.matched_fastq_dir().display()
            );
        }

        Ok(summary)
    }
}
