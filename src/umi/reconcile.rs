use std::collections::BTreeMap;
use std::io::{Read, Write};

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecord;
use serde::{Deserialize, Serialize};

use super::index::{tag_and_template, TagIndex};
use super::{MolecularTag, TemplateIdentity, UMI_SEPARATOR};
use crate::anchor::revcomp::try_revcomp;
use crate::anchor::Chain;
use crate::fileformat::skip_malformed_record;
use crate::runtime::RunSummary;

pub const PAIRS_HEADER: [&str; 4] = ["TRA_UMI", "TRB_UMI", "TRA_Read_ID_Base", "TRB_Read_ID_Base"];

///////////////////////////////
/// One TRA read and one TRB read sharing a UMI, up to reverse complement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledPair {
    #[serde(rename = "TRA_UMI")]
    pub tra_umi: MolecularTag,
    #[serde(rename = "TRB_UMI")]
    pub trb_umi: MolecularTag,
    #[serde(rename = "TRA_Read_ID_Base")]
    pub tra_read_id: TemplateIdentity,
    #[serde(rename = "TRB_Read_ID_Base")]
    pub trb_read_id: TemplateIdentity,
}

///////////////////////////////
/// Map a TRA tag into TRB tag space: reverse complement both halves and swap them.
/// None if the tag does not have two halves, or holds anything but ATCGN
pub fn transform_tag(tag: &MolecularTag) -> Option<MolecularTag> {
    let (umi1, umi2) = tag.halves()?;
    let rc1 = try_revcomp(umi1.as_bytes())?;
    let rc2 = try_revcomp(umi2.as_bytes())?;

    let mut out = String::with_capacity(tag.as_str().len());
    out.push_str(std::str::from_utf8(&rc2).ok()?);
    out.push(UMI_SEPARATOR);
    out.push_str(std::str::from_utf8(&rc1).ok()?);
    Some(MolecularTag::new(out))
}

///////////////////////////////
/// Looks up TRB tags among the transformed TRA tags.
///
/// Each transformed tag maps to the union of the TRA templates of all TRA tags that
/// transform into it. Every template remembers the TRA tag it was seen with; if a template
/// was seen with several colliding tags, the smallest tag is kept
#[derive(Debug)]
pub struct ReverseComplementReconciler {
    map: FxHashMap<MolecularTag, BTreeMap<TemplateIdentity, MolecularTag>>,
}

impl ReverseComplementReconciler {
    ///////////////////////////////
    /// Build from a complete TRA index. The index is consumed
    pub fn new(tra_index: TagIndex, summary: &mut RunSummary) -> ReverseComplementReconciler {
        let mut map: FxHashMap<MolecularTag, BTreeMap<TemplateIdentity, MolecularTag>> =
            FxHashMap::default();

        for (tra_tag, templates) in tra_index {
            let Some(transformed) = transform_tag(&tra_tag) else {
                debug!("Could not reverse complement UMI {}", tra_tag);
                summary.rc_failures += 1;
                continue;
            };

            let merged = map.entry(transformed).or_default();
            if merged.values().any(|t| *t != tra_tag) {
                summary.tag_collisions += 1;
            }
            for template in templates {
                merged
                    .entry(template)
                    .and_modify(|t| {
                        if tra_tag < *t {
                            *t = tra_tag.clone();
                        }
                    })
                    .or_insert_with(|| tra_tag.clone());
            }
        }

        if summary.rc_failures > 0 {
            warn!(
                "Failed to reverse complement {} unique TRA UMIs",
                summary.rc_failures
            );
        }
        info!(
            "Generated reverse complements for {} unique TRA UMI patterns",
            map.len()
        );
        ReverseComplementReconciler { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    ///////////////////////////////
    /// All pairs formed by one TRB read. Empty if its tag has no TRA counterpart
    pub fn pairs_for(
        &self,
        trb_tag: &MolecularTag,
        trb_template: &TemplateIdentity,
    ) -> Vec<ReconciledPair> {
        match self.map.get(trb_tag) {
            Some(tra_templates) => tra_templates
                .iter()
                .map(|(tra_template, tra_tag)| ReconciledPair {
                    tra_umi: tra_tag.clone(),
                    trb_umi: trb_tag.clone(),
                    tra_read_id: tra_template.clone(),
                    trb_read_id: trb_template.clone(),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    ///////////////////////////////
    /// Stream the trimmed TRB mate-1 reads and write every pair found
    pub fn reconcile_reader<R: Read, W: Write>(
        &self,
        trb_reader: &mut FastqReader<R>,
        writer: &mut csv::Writer<W>,
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        let mut num_read: u64 = 0;
        while let Some(record) = trb_reader.next() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    if skip_malformed_record(&e, "TRB reads", num_read, summary) {
                        continue;
                    }
                    break;
                }
            };
            num_read += 1;

            let Some((trb_tag, trb_template)) = tag_and_template(record.head(), Chain::Trb) else {
                summary.unparsable_records += 1;
                continue;
            };

            let pairs = self.pairs_for(&trb_tag, &trb_template);
            if !pairs.is_empty() {
                summary.trb_records_matched += 1;
            }
            for pair in pairs {
                writer.serialize(&pair)?;
                summary.pairs_written += 1;
            }

            if num_read % 100000 == 0 {
                info!("Scanned {} TRB records", num_read);
            }
        }
        summary.trb_records += num_read;
        writer.flush()?;
        Ok(())
    }
}
