use std::io::{Read, Write};
use std::path::Path;

use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;

use super::{GeneCallRecord, GeneCallTable};
use crate::fileformat::{column_index, create_tsv, open_tsv};
use crate::runtime::RunSummary;
use crate::umi::TemplateIdentity;

pub const COL_TRA_READ_ID: &str = "TRA_Read_ID_Base";
pub const COL_TRB_READ_ID: &str = "TRB_Read_ID_Base";

pub const PAIRED_CLONES_HEADER: [&str; 12] = [
    "TRA_Read_ID_Base",
    "TRB_Read_ID_Base",
    "TRA_VGene",
    "TRA_JGene",
    "TRA_nCDR3",
    "TRA_aCDR3",
    "TRB_VGene",
    "TRB_JGene",
    "TRB_nCDR3",
    "TRB_aCDR3",
    "TRA_Header",
    "TRB_Header",
];

///////////////////////////////
/// A TRA template and a TRB template sharing a UMI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityPair {
    pub tra: TemplateIdentity,
    pub trb: TemplateIdentity,
}

///////////////////////////////
/// Final output row: an identity pair with the gene calls of both its templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedClone {
    #[serde(rename = "TRA_Read_ID_Base")]
    pub tra_read_id: TemplateIdentity,
    #[serde(rename = "TRB_Read_ID_Base")]
    pub trb_read_id: TemplateIdentity,
    #[serde(rename = "TRA_VGene")]
    pub tra_v_gene: String,
    #[serde(rename = "TRA_JGene")]
    pub tra_j_gene: String,
    #[serde(rename = "TRA_nCDR3")]
    pub tra_n_cdr3: String,
    #[serde(rename = "TRA_aCDR3")]
    pub tra_aa_cdr3: String,
    #[serde(rename = "TRB_VGene")]
    pub trb_v_gene: String,
    #[serde(rename = "TRB_JGene")]
    pub trb_j_gene: String,
    #[serde(rename = "TRB_nCDR3")]
    pub trb_n_cdr3: String,
    #[serde(rename = "TRB_aCDR3")]
    pub trb_aa_cdr3: String,
    #[serde(rename = "TRA_Header")]
    pub tra_header: String,
    #[serde(rename = "TRB_Header")]
    pub trb_header: String,
}

impl PairedClone {
    pub fn new(tra: &GeneCallRecord, trb: &GeneCallRecord) -> PairedClone {
        PairedClone {
            tra_read_id: tra.read_id.clone(),
            trb_read_id: trb.read_id.clone(),
            tra_v_gene: tra.v_gene.clone(),
            tra_j_gene: tra.j_gene.clone(),
            tra_n_cdr3: tra.n_cdr3.clone(),
            tra_aa_cdr3: tra.aa_cdr3.clone(),
            trb_v_gene: trb.v_gene.clone(),
            trb_j_gene: trb.j_gene.clone(),
            trb_n_cdr3: trb.n_cdr3.clone(),
            trb_aa_cdr3: trb.aa_cdr3.clone(),
            tra_header: tra.header.clone(),
            trb_header: trb.header.clone(),
        }
    }
}

///////////////////////////////
/// Read the identity columns of a UMI pairing table. Pairs are returned in file order,
/// each distinct pair once
pub fn load_identity_pairs(path: &Path, summary: &mut RunSummary) -> anyhow::Result<Vec<IdentityPair>> {
    let mut reader = open_tsv(path)?;
    read_identity_pairs(&mut reader, path, summary)
}

pub fn read_identity_pairs<R: Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    summary: &mut RunSummary,
) -> anyhow::Result<Vec<IdentityPair>> {
    let headers = reader.headers()?.clone();
    let i_tra = column_index(&headers, COL_TRA_READ_ID, path)?;
    let i_trb = column_index(&headers, COL_TRB_READ_ID, path)?;

    let mut pairs = Vec::new();
    for row in reader.records() {
        let row = row?;
        match (row.get(i_tra), row.get(i_trb)) {
            (Some(tra), Some(trb)) if !tra.is_empty() && !trb.is_empty() => {
                pairs.push(IdentityPair {
                    tra: TemplateIdentity::new(tra),
                    trb: TemplateIdentity::new(trb),
                });
            }
            _ => summary.unparsable_records += 1,
        }
    }

    let num_lines = pairs.len();
    let pairs: Vec<IdentityPair> = pairs.into_iter().unique().collect();
    info!(
        "Read {} UMI pairing lines, {} distinct read ID pairs",
        num_lines,
        pairs.len()
    );
    Ok(pairs)
}

///////////////////////////////
/// Inner join of identity pairs with the gene calls of each chain
#[derive(Debug)]
pub struct CloneJoiner {
    pub tra: GeneCallTable,
    pub trb: GeneCallTable,
}

impl CloneJoiner {
    pub fn new(tra: GeneCallTable, trb: GeneCallTable) -> CloneJoiner {
        CloneJoiner { tra, trb }
    }

    ///////////////////////////////
    /// One clone per pair for which both templates have a gene call on their own locus.
    /// Input order is kept
    pub fn join(&self, pairs: &[IdentityPair]) -> Vec<PairedClone> {
        let with_tra = pairs
            .iter()
            .filter_map(|pair| self.tra.get(&pair.tra).map(|tra| (pair, tra)))
            .collect::<Vec<_>>();
        info!("{} read ID pairs have a TRA gene call", with_tra.len());

        with_tra
            .into_iter()
            .filter_map(|(pair, tra)| self.trb.get(&pair.trb).map(|trb| PairedClone::new(tra, trb)))
            .collect()
    }

    ///////////////////////////////
    /// Write the clone table. The header is written even if there are no clones
    pub fn write_clones<W: Write>(
        writer: &mut csv::Writer<W>,
        clones: &[PairedClone],
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        for clone in clones {
            writer.serialize(clone)?;
            summary.clones_written += 1;
        }
        writer.flush()?;

        if clones.is_empty() {
            warn!("No paired clones found; writing a table with only the header");
            summary.empty_results += 1;
        }
        Ok(())
    }

    pub fn write_clones_to_file(
        path: &Path,
        clones: &[PairedClone],
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        let mut writer = create_tsv(path, &PAIRED_CLONES_HEADER)?;
        CloneJoiner::write_clones(&mut writer, clones, summary)?;
        info!("Wrote {} paired clones to {}", clones.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Chain;

    fn table(chain: Chain, content: &str) -> GeneCallTable {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut summary = RunSummary::new();
        GeneCallTable::from_reader(&mut reader, Path::new("x.tsv"), chain, &mut summary).unwrap()
    }

    fn pair(tra: &str, trb: &str) -> IdentityPair {
        IdentityPair {
            tra: TemplateIdentity::new(tra),
            trb: TemplateIdentity::new(trb),
        }
    }

    const HEADER: &str = "bestVGene\tbestJGene\tnSeqCDR3\taaSeqCDR3\tdescrsR1\n";

    #[test]
    fn test_join() {
        let tra = table(
            Chain::Tra,
            &format!("{}TRAV1\tTRAJ1\tTGTGCC\tCA\ta1/1 TAG:TRA:X_Y\n", HEADER),
        );
        let trb = table(
            Chain::Trb,
            &format!(
                "{}TRBV2\tTRBJ2\tTGTAGC\tCS\tb1/1 TAG:TRB:Y_X\n\
TRAV9\tTRAJ9\tTGT\tC\tb2/1 TAG:TRB:Y_X\n",
                HEADER
            ),
        );
        let joiner = CloneJoiner::new(tra, trb);

        let clones = joiner.join(&[pair("a1", "b1"), pair("a1", "b2"), pair("a2", "b1")]);
        assert_eq!(clones.len(), 1);
        assert_eq!(clones[0].tra_read_id.as_str(), "a1");
        assert_eq!(clones[0].trb_v_gene, "TRBV2");
        assert_eq!(clones[0].tra_header, "a1/1 TAG:TRA:X_Y");
    }

    #[test]
    fn test_identity_pairs_deduplicated() {
        let content = "TRA_UMI\tTRB_UMI\tTRA_Read_ID_Base\tTRB_Read_ID_Base\n\
A_C\tG_T\ta1\tb1\n\
A_C\tG_T\ta1\tb2\n\
A_G\tC_T\ta1\tb1\n\
A_G\tC_T\ta1\n";
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut summary = RunSummary::new();
        let pairs = read_identity_pairs(&mut reader, Path::new("p.tsv"), &mut summary).unwrap();
        assert_eq!(pairs, vec![pair("a1", "b1"), pair("a1", "b2")]);
        assert_eq!(summary.unparsable_records, 1);
    }

    #[test]
    fn test_empty_output_has_header() {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(vec![]);
        writer.write_record(PAIRED_CLONES_HEADER).unwrap();
        let mut summary = RunSummary::new();
        CloneJoiner::write_clones(&mut writer, &[], &mut summary).unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, format!("{}\n", PAIRED_CLONES_HEADER.join("\t")));
        assert_eq!(summary.empty_results, 1);
    }
}
