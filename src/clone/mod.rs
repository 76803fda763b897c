pub mod genecall;
pub mod joiner;
pub mod select;

pub use genecall::GeneCallRecord;
pub use genecall::GeneCallTable;

pub use joiner::load_identity_pairs;
pub use joiner::CloneJoiner;
pub use joiner::IdentityPair;
pub use joiner::PairedClone;

pub use select::PairedReadSet;
