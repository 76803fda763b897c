pub mod match_fastq;
pub mod pair_clones;
pub mod pipeline;
pub mod preprocess;
pub mod threadcount;
pub mod umi_pairs;

pub use match_fastq::{MatchFastq, MatchFastqCMD};
pub use pair_clones::{PairClones, PairClonesCMD};
pub use pipeline::{Pipeline, PipelineCMD};
pub use preprocess::{Preprocess, PreprocessCMD};
pub use threadcount::determine_thread_counts_1;
pub use umi_pairs::{UmiPairs, UmiPairsCMD};
