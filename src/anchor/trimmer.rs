use super::{Chain, ScanResult};

///////////////////////////////
/// One read pair after trimming. Sequences borrow from the input records;
/// headers are new since they carry the UMI tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedReadPair<'a> {
    pub head1: Vec<u8>,
    pub r1: &'a [u8],
    pub q1: &'a [u8],
    pub head2: Vec<u8>,
    pub r2: &'a [u8],
    pub q2: &'a [u8],
}

impl<'a> TaggedReadPair<'a> {
    /// Both mates must keep some sequence to be worth writing
    pub fn is_complete(&self) -> bool {
        !self.r1.is_empty() && !self.r2.is_empty()
    }

    pub fn to_owned_pair(&self) -> OwnedTaggedReadPair {
        OwnedTaggedReadPair {
            head1: self.head1.clone(),
            r1: self.r1.to_vec(),
            q1: self.q1.to_vec(),
            head2: self.head2.clone(),
            r2: self.r2.to_vec(),
            q2: self.q2.to_vec(),
        }
    }
}

/// Owned version, to be sent between threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTaggedReadPair {
    pub head1: Vec<u8>,
    pub r1: Vec<u8>,
    pub q1: Vec<u8>,
    pub head2: Vec<u8>,
    pub r2: Vec<u8>,
    pub q2: Vec<u8>,
}

///////////////////////////////
/// Cuts away the anchor structure and everything upstream of it
pub struct ReadTrimmer {}
impl ReadTrimmer {
    ///////////////////////////////
    /// Keep what lies downstream of the anchor. For a match on the reverse complement,
    /// downstream is the start of the original read
    pub fn trim<'a>(seq: &'a [u8], qual: &'a [u8], scan: &ScanResult) -> (&'a [u8], &'a [u8]) {
        if scan.is_reverse_complement() {
            let keep_to = seq.len().saturating_sub(scan.match_end);
            (&seq[..keep_to], &qual[..keep_to])
        } else {
            let keep_from = scan.match_end.min(seq.len());
            (&seq[keep_from..], &qual[keep_from..])
        }
    }

    ///////////////////////////////
    /// Header with the UMI tag appended: `<header> TAG:<chain>:<umi1>_<umi2>[:RC]`
    pub fn tag_header(head: &[u8], chain: Chain, scan: &ScanResult) -> Vec<u8> {
        let mut out = Vec::with_capacity(head.len() + 32);
        out.extend_from_slice(head);
        out.extend_from_slice(b" TAG:");
        out.extend_from_slice(chain.name().as_bytes());
        out.push(b':');
        out.extend_from_slice(&scan.umi1);
        out.push(b'_');
        out.extend_from_slice(&scan.umi2);
        if scan.is_reverse_complement() {
            out.extend_from_slice(b":RC");
        }
        out
    }

    ///////////////////////////////
    /// Trim the mate holding the anchor, pass the other through, tag both headers
    pub fn trim_pair<'a>(
        chain: Chain,
        scan: &ScanResult,
        mate1: (&'a [u8], &'a [u8], &'a [u8]),
        mate2: (&'a [u8], &'a [u8], &'a [u8]),
    ) -> TaggedReadPair<'a> {
        let (head1, r1, q1) = mate1;
        let (head2, r2, q2) = mate2;

        let ((r1, q1), (r2, q2)) = match chain.anchor_mate() {
            1 => (Self::trim(r1, q1, scan), (r2, q2)),
            _ => ((r1, q1), Self::trim(r2, q2, scan)),
        };

        TaggedReadPair {
            head1: Self::tag_header(head1, chain, scan),
            r1,
            q1,
            head2: Self::tag_header(head2, chain, scan),
            r2,
            q2,
        }
    }
}
