use seq_io::fastq::Record as FastqRecord;

use super::{AnchorPattern, AnchorScanner, Chain, ReadTrimmer, ScanResult, TaggedReadPair};
use crate::runtime::RunSummary;

///////////////////////////////
/// Outcome of classifying one template
#[derive(Debug)]
pub enum Classification<'a> {
    /// Anchor found and both mates kept sequence after trimming
    Classified(Chain, TaggedReadPair<'a>),
    /// Anchor found, but one of the mates is empty after trimming
    EmptyAfterTrim(Chain),
    /// No anchor for either chain
    Unclassified,
}

///////////////////////////////
/// Decides which chain a read pair belongs to, and trims it accordingly.
///
/// TRA is looked for in mate 1 first. Only if there is no TRA structure is TRB looked for
/// in mate 2. A pair carrying both structures is therefore always TRA
#[derive(Clone, Debug)]
pub struct PairClassifier {
    tra: AnchorScanner,
    trb: AnchorScanner,
}

impl PairClassifier {
    pub fn new(tra: AnchorPattern, trb: AnchorPattern) -> anyhow::Result<PairClassifier> {
        Ok(PairClassifier {
            tra: AnchorScanner::new(tra)?,
            trb: AnchorScanner::new(trb)?,
        })
    }

    pub fn with_default_patterns() -> anyhow::Result<PairClassifier> {
        Self::new(AnchorPattern::tra(), AnchorPattern::trb())
    }

    pub fn scanner(&self, chain: Chain) -> &AnchorScanner {
        match chain {
            Chain::Tra => &self.tra,
            Chain::Trb => &self.trb,
        }
    }

    ///////////////////////////////
    /// Find the chain and its anchor, TRA taking precedence
    pub fn detect_chain(
        &self,
        r1_seq: &[u8],
        r2_seq: &[u8],
        unknown_bases: &mut u64,
    ) -> Option<(Chain, ScanResult)> {
        if let Some(scan) = self.tra.scan(r1_seq, unknown_bases) {
            return Some((Chain::Tra, scan));
        }
        self.trb
            .scan(r2_seq, unknown_bases)
            .map(|scan| (Chain::Trb, scan))
    }

    ///////////////////////////////
    /// Classify and trim one template; tally the outcome in `summary`
    pub fn classify<'a, R: FastqRecord>(
        &self,
        mate1: &'a R,
        mate2: &'a R,
        summary: &mut RunSummary,
    ) -> Classification<'a> {
        summary.pairs_processed += 1;

        let Some((chain, scan)) =
            self.detect_chain(mate1.seq(), mate2.seq(), &mut summary.unknown_bases)
        else {
            summary.unclassified += 1;
            return Classification::Unclassified;
        };

        let pair = ReadTrimmer::trim_pair(
            chain,
            &scan,
            (mate1.head(), mate1.seq(), mate1.qual()),
            (mate2.head(), mate2.seq(), mate2.qual()),
        );

        if pair.is_complete() {
            match chain {
                Chain::Tra => summary.tra_pairs += 1,
                Chain::Trb => summary.trb_pairs += 1,
            }
            Classification::Classified(chain, pair)
        } else {
            summary.empty_after_trim += 1;
            Classification::EmptyAfterTrim(chain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::pattern::*;
    use crate::anchor::revcomp::try_revcomp;
    use seq_io::fastq::OwnedRecord;

    fn record(head: &str, seq: &[u8]) -> OwnedRecord {
        OwnedRecord {
            head: head.as_bytes().to_vec(),
            seq: seq.to_vec(),
            qual: vec![b'I'; seq.len()],
        }
    }

    fn scenario_a_seq() -> Vec<u8> {
        format!(
            "{}AAAAAAA{}CCCCCCC{}A{}",
            PRE_UMI1_TRA, LINKER_FWD_TRA, FLANK_TRA_SEQ, "GGTT"
        )
        .into_bytes()
    }

    fn trb_seq(tail: &str) -> Vec<u8> {
        format!(
            "{}GGGGGGG{}TTTTTTT{}T{}",
            PRE_UMI1_TRB, LINKER_REV_TRB, FLANK_TRB_SEQ, tail
        )
        .into_bytes()
    }

    #[test]
    fn test_forward_tra() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let m1 = record("read1/1", &scenario_a_seq());
        let m2 = record("read1/2", b"ACGTACGT");
        let mut summary = RunSummary::new();

        match classifier.classify(&m1, &m2, &mut summary) {
            Classification::Classified(chain, pair) => {
                assert_eq!(chain, Chain::Tra);
                assert_eq!(pair.r1, b"GGTT");
                assert_eq!(pair.q1, b"IIII");
                assert_eq!(pair.r2, b"ACGTACGT");
                assert_eq!(pair.head1, b"read1/1 TAG:TRA:AAAAAAA_CCCCCCC".to_vec());
                assert_eq!(pair.head2, b"read1/2 TAG:TRA:AAAAAAA_CCCCCCC".to_vec());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(summary.tra_pairs, 1);
    }

    #[test]
    fn test_reverse_complement_tra() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let m1 = record("read2/1", &try_revcomp(&scenario_a_seq()).unwrap());
        let m2 = record("read2/2", b"ACGTACGT");
        let mut summary = RunSummary::new();

        match classifier.classify(&m1, &m2, &mut summary) {
            Classification::Classified(chain, pair) => {
                assert_eq!(chain, Chain::Tra);
                assert_eq!(pair.r1.to_vec(), try_revcomp(b"GGTT").unwrap());
                assert!(pair.head1.ends_with(b"TAG:TRA:AAAAAAA_CCCCCCC:RC"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_after_trim_discarded() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let mut seq = scenario_a_seq();
        seq.truncate(seq.len() - 4);
        let m1 = record("read3/1", &seq);
        let m2 = record("read3/2", b"ACGTACGT");
        let mut summary = RunSummary::new();

        assert!(matches!(
            classifier.classify(&m1, &m2, &mut summary),
            Classification::EmptyAfterTrim(Chain::Tra)
        ));
        assert_eq!(summary.empty_after_trim, 1);
        assert_eq!(summary.tra_pairs, 0);
    }

    #[test]
    fn test_trb_in_mate2() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let m1 = record("read4/1", b"ACGTACGT");
        let m2 = record("read4/2", &trb_seq("CAGT"));
        let mut summary = RunSummary::new();

        match classifier.classify(&m1, &m2, &mut summary) {
            Classification::Classified(chain, pair) => {
                assert_eq!(chain, Chain::Trb);
                assert_eq!(pair.r1, b"ACGTACGT");
                assert_eq!(pair.r2, b"CAGT");
                assert!(pair.head1.ends_with(b"TAG:TRB:GGGGGGG_TTTTTTT"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(summary.trb_pairs, 1);
    }

    #[test]
    fn test_both_structures_is_tra() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let m1 = record("read5/1", &scenario_a_seq());
        let m2 = record("read5/2", &trb_seq("CAGT"));
        let mut summary = RunSummary::new();

        match classifier.classify(&m1, &m2, &mut summary) {
            Classification::Classified(chain, pair) => {
                assert_eq!(chain, Chain::Tra);
                assert_eq!(pair.r2, trb_seq("CAGT").as_slice());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_structure() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let m1 = record("read6/1", b"ACGTACGT");
        let m2 = record("read6/2", b"TTTTGGGG");
        let mut summary = RunSummary::new();

        assert!(matches!(
            classifier.classify(&m1, &m2, &mut summary),
            Classification::Unclassified
        ));
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.pairs_processed, 1);
    }

    #[test]
    fn test_trimmed_tail_does_not_rematch() {
        let classifier = PairClassifier::with_default_patterns().unwrap();
        let mut unknown = 0;
        let tail = b"GGTTACGTACGTACGT";
        let mut seq = scenario_a_seq();
        seq.truncate(seq.len() - 4);
        seq.extend_from_slice(tail);

        let (_, scan) = classifier.detect_chain(&seq, b"ACGT", &mut unknown).unwrap();
        let (trimmed, _) = ReadTrimmer::trim(&seq, &seq, &scan);
        assert_eq!(trimmed, tail);
        assert!(classifier
            .scanner(Chain::Tra)
            .scan(trimmed, &mut unknown)
            .is_none());
    }
}
