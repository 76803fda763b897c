use std::io::Read;
use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::anchor::Chain;
use crate::fileformat::{column_index, open_tsv};
use crate::runtime::RunSummary;
use crate::umi::{template_identity, TemplateIdentity};

pub const COL_V_GENE: &str = "bestVGene";
pub const COL_J_GENE: &str = "bestJGene";
pub const COL_N_CDR3: &str = "nSeqCDR3";
pub const COL_AA_CDR3: &str = "aaSeqCDR3";
pub const COL_HEADER: &str = "descrsR1";

///////////////////////////////
/// One row of a gene-call export table, reduced to the columns used for pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneCallRecord {
    pub read_id: TemplateIdentity,
    pub v_gene: String,
    pub j_gene: String,
    pub n_cdr3: String,
    pub aa_cdr3: String,
    pub header: String,
}

/// A call belongs to a chain if either its V or its J gene is from that locus
pub fn is_on_locus(chain: Chain, v_gene: &str, j_gene: &str) -> bool {
    let prefix = chain.locus_prefix();
    v_gene.starts_with(prefix) || j_gene.starts_with(prefix)
}

///////////////////////////////
/// Gene calls of one chain, at most one per template
#[derive(Debug, Clone)]
pub struct GeneCallTable {
    pub chain: Chain,
    records: FxHashMap<TemplateIdentity, GeneCallRecord>,
}

impl GeneCallTable {
    pub fn new(chain: Chain) -> GeneCallTable {
        GeneCallTable {
            chain,
            records: FxHashMap::default(),
        }
    }

    ///////////////////////////////
    /// Load a gene-call export table from file
    pub fn load(path: &Path, chain: Chain, summary: &mut RunSummary) -> anyhow::Result<GeneCallTable> {
        info!("Loading {} gene calls from {}", chain, path.display());
        let mut reader = open_tsv(path)?;
        let table = GeneCallTable::from_reader(&mut reader, path, chain, summary)?;
        info!("Kept {} {} gene calls", table.len(), chain);
        Ok(table)
    }

    ///////////////////////////////
    /// Read rows, keeping those on the chain's locus with a derivable template identity.
    /// For repeated identities the first row wins
    pub fn from_reader<R: Read>(
        reader: &mut csv::Reader<R>,
        path: &Path,
        chain: Chain,
        summary: &mut RunSummary,
    ) -> anyhow::Result<GeneCallTable> {
        let headers = reader.headers()?.clone();
        let i_v = column_index(&headers, COL_V_GENE, path)?;
        let i_j = column_index(&headers, COL_J_GENE, path)?;
        let i_n = column_index(&headers, COL_N_CDR3, path)?;
        let i_aa = column_index(&headers, COL_AA_CDR3, path)?;
        let i_head = column_index(&headers, COL_HEADER, path)?;

        let mut table = GeneCallTable::new(chain);
        for row in reader.records() {
            let row = row?;
            summary.table_rows += 1;

            //Short rows are read as if the missing cells were empty
            let cell = |i: usize| row.get(i).unwrap_or("");

            if !is_on_locus(chain, cell(i_v), cell(i_j)) {
                summary.rows_off_locus += 1;
                continue;
            }

            let Some(read_id) = template_identity(cell(i_head)) else {
                debug!("No read ID in gene call row {:?}", row.position());
                summary.unparsable_records += 1;
                continue;
            };

            if table.records.contains_key(&read_id) {
                summary.rows_duplicate += 1;
                continue;
            }

            table.records.insert(
                read_id.clone(),
                GeneCallRecord {
                    read_id,
                    v_gene: cell(i_v).to_string(),
                    j_gene: cell(i_j).to_string(),
                    n_cdr3: cell(i_n).to_string(),
                    aa_cdr3: cell(i_aa).to_string(),
                    header: cell(i_head).to_string(),
                },
            );
        }
        Ok(table)
    }

    pub fn get(&self, read_id: &TemplateIdentity) -> Option<&GeneCallRecord> {
        self.records.get(read_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Error;

    const HEADER: &str = "cloneId\tbestVGene\tbestJGene\tnSeqCDR3\taaSeqCDR3\tdescrsR1\n";

    fn read_table(content: &str, chain: Chain, summary: &mut RunSummary) -> anyhow::Result<GeneCallTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(content.as_bytes());
        GeneCallTable::from_reader(&mut reader, Path::new("calls.tsv"), chain, summary)
    }

    #[test]
    fn test_locus_filter() {
        let content = format!(
            "{}1\tTRAV1-2\tTRAJ33\tTGT\tC\tr1/1 TAG:TRA:A_C\n\
2\tTRBV20-1\tTRBJ2-7\tTGT\tC\tr2/1 TAG:TRA:A_C\n\
3\tIGHV3\tTRAJ12\tTGT\tC\tr3/1 TAG:TRA:A_C\n",
            HEADER
        );
        let mut summary = RunSummary::new();
        let table = read_table(&content, Chain::Tra, &mut summary).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get(&TemplateIdentity::new("r1")).is_some());
        assert!(table.get(&TemplateIdentity::new("r2")).is_none());
        assert_eq!(table.get(&TemplateIdentity::new("r3")).unwrap().j_gene, "TRAJ12");
        assert_eq!(summary.rows_off_locus, 1);
        assert_eq!(summary.table_rows, 3);
    }

    #[test]
    fn test_locus_prefix_is_case_sensitive() {
        assert!(is_on_locus(Chain::Trb, "TRBV5", ""));
        assert!(!is_on_locus(Chain::Trb, "trbv5", "trbj1"));
        assert!(!is_on_locus(Chain::Trb, "", ""));
    }

    #[test]
    fn test_first_row_per_read_wins() {
        let content = format!(
            "{}1\tTRAV1\tTRAJ1\tAAA\tK\t@r1/1 x\n\
2\tTRAV2\tTRAJ2\tCCC\tP\tr1/2 y\n\
3\tTRAV3\tTRAJ3\tGGG\tG\t\n",
            HEADER
        );
        let mut summary = RunSummary::new();
        let table = read_table(&content, Chain::Tra, &mut summary).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&TemplateIdentity::new("r1")).unwrap().v_gene, "TRAV1");
        assert_eq!(summary.rows_duplicate, 1);
        assert_eq!(summary.unparsable_records, 1);
    }

    #[test]
    fn test_short_row() {
        let content = format!("{}1\tTRAV1\tTRAJ1\n", HEADER);
        let mut summary = RunSummary::new();
        let table = read_table(&content, Chain::Tra, &mut summary).unwrap();
        assert!(table.is_empty());
        assert_eq!(summary.unparsable_records, 1);
    }

    #[test]
    fn test_missing_column() {
        let content = "bestVGene\tbestJGene\tnSeqCDR3\taaSeqCDR3\n";
        let mut summary = RunSummary::new();
        let err = read_table(content, Chain::Tra, &mut summary).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::SchemaMismatch { column, .. }) => assert_eq!(column, "descrsR1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_tiny_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tra.tsv");
        std::fs::write(&path, "x\n").unwrap();

        let mut summary = RunSummary::new();
        let err = GeneCallTable::load(&path, Chain::Tra, &mut summary).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::SchemaMismatch { column, .. }) => assert_eq!(column, "bestVGene"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
