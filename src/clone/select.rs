use std::io::{Read, Write};

use log::info;
use rustc_hash::FxHashSet;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecord;

use super::IdentityPair;
use crate::anchor::Chain;
use crate::fileformat::{skip_malformed_record, write_fastq_read};
use crate::runtime::RunSummary;
use crate::umi::{template_identity, TemplateIdentity};

///////////////////////////////
/// Templates of one chain that took part in at least one UMI pairing
#[derive(Debug, Clone)]
pub struct PairedReadSet {
    pub chain: Chain,
    ids: FxHashSet<TemplateIdentity>,
}

impl PairedReadSet {
    pub fn from_pairs(chain: Chain, pairs: &[IdentityPair]) -> PairedReadSet {
        let ids = pairs
            .iter()
            .map(|pair| match chain {
                Chain::Tra => pair.tra.clone(),
                Chain::Trb => pair.trb.clone(),
            })
            .collect::<FxHashSet<_>>();
        PairedReadSet { chain, ids }
    }

    pub fn contains(&self, id: &TemplateIdentity) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    ///////////////////////////////
    /// Copy the reads of paired templates from one FASTQ to another. Returns the number written
    pub fn filter_fastq<R: Read, W: Write>(
        &self,
        reader: &mut FastqReader<R>,
        writer: &mut W,
        file_desc: &str,
        summary: &mut RunSummary,
    ) -> anyhow::Result<u64> {
        let mut num_read: u64 = 0;
        let mut num_matched: u64 = 0;
        while let Some(record) = reader.next() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    if skip_malformed_record(&e, file_desc, num_read, summary) {
                        continue;
                    }
                    break;
                }
            };
            num_read += 1;

            let id = std::str::from_utf8(record.head())
                .ok()
                .and_then(template_identity);
            if id.is_some_and(|id| self.contains(&id)) {
                write_fastq_read(writer, record.head(), record.seq(), record.qual())?;
                num_matched += 1;
            }
        }

        info!("{}: {}/{} reads matched and written", file_desc, num_matched, num_read);
        summary.reads_scanned += num_read;
        summary.reads_matched += num_matched;
        Ok(num_matched)
    }
}
