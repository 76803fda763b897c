pub mod discover;
pub mod fastq;
pub mod tsv;

pub use discover::discover_input_pair;
pub use discover::InputPair;

pub use fastq::open_fastq;
pub use fastq::skip_malformed_record;
pub use fastq::write_fastq_read;
pub use fastq::PairedFastqWriter;

pub use tsv::column_index;
pub use tsv::create_tsv;
pub use tsv::open_tsv;
