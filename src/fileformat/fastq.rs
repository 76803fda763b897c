use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};
use seq_io::fastq::Error as FastqError;
use seq_io::fastq::Reader as FastqReader;

use crate::anchor::OwnedTaggedReadPair;
use crate::runtime::{require_input, Error, RunSummary};

pub type FastqGzWriter = BufWriter<GzEncoder<File>>;

///////////////////////////////
/// Open a FASTQ file, plain or compressed
pub fn open_fastq<P: AsRef<Path>>(path: P) -> anyhow::Result<FastqReader<Box<dyn Read>>> {
    let path = path.as_ref();
    require_input(path)?;

    let opened_handle = File::open(path).map_err(|e| Error::io(path, e))?;
    let (reader, compression) = match niffler::get_reader(Box::new(opened_handle)) {
        Ok(opened) => opened,
        Err(niffler::Error::FileTooShort) => {
            //Too short to hold even one record
            warn!("Input file {} is empty", path.display());
            let empty: Box<dyn Read> = Box::new(std::io::empty());
            return Ok(FastqReader::new(empty));
        }
        Err(e) => return Err(Error::input_not_valid(path, Some(e.to_string())).into()),
    };

    debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        compression
    );
    Ok(FastqReader::new(reader))
}

///////////////////////////////
/// Count a record that could not be parsed. Returns true if reading can go on.
/// A malformed 4-line unit is skipped, and the reader moves past it on the next call.
/// A truncated file, an I/O error or an oversized record ends the stream
pub fn skip_malformed_record(
    e: &FastqError,
    file_desc: &str,
    num_read: u64,
    summary: &mut RunSummary,
) -> bool {
    summary.unparsable_records += 1;
    match e {
        FastqError::InvalidStart { .. }
        | FastqError::InvalidSep { .. }
        | FastqError::UnequalLengths { .. } => {
            debug!("Skipping malformed FASTQ record in {} after {} records: {}", file_desc, num_read, e);
            true
        }
        _ => {
            warn!("Cannot read {} after {} records, stopping: {}", file_desc, num_read, e);
            false
        }
    }
}

///////////////////////////////
/// Create a gzip-compressed FASTQ for writing
pub fn create_fastq_gz<P: AsRef<Path>>(path: P) -> anyhow::Result<FastqGzWriter> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    Ok(BufWriter::new(GzEncoder::new(file, Compression::default())))
}

///////////////////////////////
/// Flush and write the gzip trailer. Dropping the writer instead may lose the tail of the file
pub fn finish_fastq_gz(writer: FastqGzWriter) -> anyhow::Result<()> {
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?;
    Ok(())
}

////////// Write one FASTQ read
pub fn write_fastq_read<W: Write>(
    writer: &mut W,
    head: &[u8],
    seq: &[u8],
    qual: &[u8],
) -> std::io::Result<()> {
    writer.write_all(b"@")?;
    writer.write_all(head)?;
    writer.write_all(b"\n")?;
    writer.write_all(seq)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(qual)?;
    writer.write_all(b"\n")?;
    Ok(())
}

///////////////////////////////
/// Writer for the two mate files of one chain
pub struct PairedFastqWriter {
    pub path_r1: PathBuf,
    pub writer_r1: FastqGzWriter,
    pub writer_r2: FastqGzWriter,
    pub num_written: u64,
}

impl PairedFastqWriter {
    pub fn new(path_r1: &Path, path_r2: &Path) -> anyhow::Result<PairedFastqWriter> {
        debug!("Starting writer for paired FASTQ {:?}", path_r1);
        Ok(PairedFastqWriter {
            path_r1: path_r1.to_path_buf(),
            writer_r1: create_fastq_gz(path_r1)?,
            writer_r2: create_fastq_gz(path_r2)?,
            num_written: 0,
        })
    }

    pub fn write_tagged_pair(&mut self, pair: &OwnedTaggedReadPair) -> std::io::Result<()> {
        write_fastq_read(&mut self.writer_r1, &pair.head1, &pair.r1, &pair.q1)?;
        write_fastq_read(&mut self.writer_r2, &pair.head2, &pair.r2, &pair.q2)?;
        self.num_written += 1;
        Ok(())
    }

    pub fn finish(self) -> anyhow::Result<u64> {
        finish_fastq_gz(self.writer_r1)?;
        finish_fastq_gz(self.writer_r2)?;
        Ok(self.num_written)
    }
}
