use std::io::Read;

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecord;

use super::header::{parse_header_tag, template_identity};
use super::{MolecularTag, TemplateIdentity};
use crate::anchor::Chain;
use crate::fileformat::skip_malformed_record;
use crate::runtime::RunSummary;

///////////////////////////////
/// UMI tag -> templates seen with it, for one chain. Filled once, then only read
#[derive(Debug, Clone)]
pub struct TagIndex {
    pub chain: Chain,
    map: FxHashMap<MolecularTag, FxHashSet<TemplateIdentity>>,
}

impl TagIndex {
    pub fn new(chain: Chain) -> TagIndex {
        TagIndex {
            chain,
            map: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, tag: MolecularTag, template: TemplateIdentity) {
        self.map.entry(tag).or_default().insert(template);
    }

    pub fn get(&self, tag: &MolecularTag) -> Option<&FxHashSet<TemplateIdentity>> {
        self.map.get(tag)
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl IntoIterator for TagIndex {
    type Item = (MolecularTag, FxHashSet<TemplateIdentity>);
    type IntoIter = std::collections::hash_map::IntoIter<MolecularTag, FxHashSet<TemplateIdentity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

///////////////////////////////
/// Tag and template of one preprocessed read, from its header.
/// None unless the read was tagged for the given chain
pub fn tag_and_template(header: &[u8], chain: Chain) -> Option<(MolecularTag, TemplateIdentity)> {
    let header = std::str::from_utf8(header).ok()?;
    let tag = parse_header_tag(header)?;
    if tag.chain != chain {
        return None;
    }
    let template = template_identity(header)?;
    Some((tag.tag, template))
}

///////////////////////////////
/// Builds the TagIndex of one chain from its trimmed mate-1 reads
pub struct IdentifierIndexer {}
impl IdentifierIndexer {
    pub fn index_reader<R: Read>(
        chain: Chain,
        reader: &mut FastqReader<R>,
        summary: &mut RunSummary,
    ) -> TagIndex {
        let mut index = TagIndex::new(chain);
        let mut num_read: u64 = 0;
        let file_desc = format!("{} reads", chain);

        while let Some(record) = reader.next() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    if skip_malformed_record(&e, &file_desc, num_read, summary) {
                        continue;
                    }
                    break;
                }
            };
            num_read += 1;

            match tag_and_template(record.head(), chain) {
                Some((tag, template)) => {
                    index.insert(tag, template);
                }
                None => {
                    debug!(
                        "Could not get {} UMI or read ID from {}",
                        chain,
                        String::from_utf8_lossy(record.head())
                    );
                    summary.unparsable_records += 1;
                }
            }

            if num_read % 100000 == 0 {
                info!("Indexed {} {} records", num_read, chain);
            }
        }

        match chain {
            Chain::Tra => {
                summary.tra_records += num_read;
                summary.tra_unique_umis += index.len() as u64;
            }
            Chain::Trb => summary.trb_records += num_read,
        }
        info!(
            "Processed {} {} records, {} unique UMIs",
            num_read,
            chain,
            index.len()
        );
        index
    }
}
