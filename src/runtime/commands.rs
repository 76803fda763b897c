use std::fmt;

use clap::Subcommand;

use crate::command;

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// Find TRA/TRB anchors in raw read pairs, trim them and tag the reads with their UMIs
    Preprocess(command::PreprocessCMD),
    /// Pair TRA and TRB reads whose UMIs are reverse complements of each other
    UmiPairs(command::UmiPairsCMD),
    /// Keep only the trimmed reads that were paired by UMI
    MatchFastq(command::MatchFastqCMD),
    /// Join UMI-paired reads with the gene calls of both chains
    PairClones(command::PairClonesCMD),
    /// Run all stages in order
    Pipeline(command::PipelineCMD),
}

impl Commands {
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        match self {
            Commands::Preprocess(cmd) => cmd.try_execute(),
            Commands::UmiPairs(cmd) => cmd.try_execute(),
            Commands::MatchFastq(cmd) => cmd.try_execute(),
            Commands::PairClones(cmd) => cmd.try_execute(),
            Commands::Pipeline(cmd) => cmd.try_execute(),
        }
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::Preprocess(_) => "Preprocess",
            Commands::UmiPairs(_) => "UmiPairs",
            Commands::MatchFastq(_) => "MatchFastq",
            Commands::PairClones(_) => "PairClones",
            Commands::Pipeline(_) => "Pipeline",
        };
        write!(f, "{}", cmd)
    }
}
