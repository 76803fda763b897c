pub mod classifier;
pub mod pattern;
pub mod revcomp;
pub mod scanner;
pub mod trimmer;

pub use classifier::Classification;
pub use classifier::PairClassifier;

pub use pattern::AnchorPattern;
pub use pattern::Chain;

pub use scanner::AnchorScanner;
pub use scanner::Orientation;
pub use scanner::ScanResult;

pub use trimmer::OwnedTaggedReadPair;
pub use trimmer::ReadTrimmer;
pub use trimmer::TaggedReadPair;
