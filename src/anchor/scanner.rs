use log::debug;
use regex::bytes::Regex;

use super::revcomp::revcomp_lenient;
use super::AnchorPattern;
use crate::runtime::Error;
use crate::umi::MolecularTag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    ReverseComplement,
}

///////////////////////////////
/// Where an anchor structure was found, and the UMIs inside it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    pub orientation: Orientation,
    /// Exclusive end of the match, counted in the orientation that matched
    pub match_end: usize,
    pub umi1: Vec<u8>,
    pub umi2: Vec<u8>,
}

impl ScanResult {
    pub fn is_reverse_complement(&self) -> bool {
        self.orientation == Orientation::ReverseComplement
    }

    pub fn molecular_tag(&self) -> MolecularTag {
        MolecularTag::from_umis(&self.umi1, &self.umi2)
    }
}

///////////////////////////////
/// Exact search for one chain's anchor structure. Only the leftmost match is considered
#[derive(Clone, Debug)]
pub struct AnchorScanner {
    pattern: AnchorPattern,
    regex: Regex,
}

impl AnchorScanner {
    pub fn new(pattern: AnchorPattern) -> anyhow::Result<AnchorScanner> {
        let regex = Regex::new(&pattern.to_regex_string())
            .map_err(|e| Error::parse_error(format!("anchor pattern of {}", pattern.chain), Some(e.to_string())))?;
        Ok(AnchorScanner { pattern, regex })
    }

    ///////////////////////////////
    /// Search the sequence as given. Returns the end of the match and both UMIs
    pub fn find(&self, seq: &[u8]) -> Option<(usize, Vec<u8>, Vec<u8>)> {
        let caps = self.regex.captures(seq)?;
        let whole = caps.get(0)?;
        let umi1 = caps.get(1)?.as_bytes().to_vec();
        let umi2 = caps.get(2)?.as_bytes().to_vec();
        Some((whole.end(), umi1, umi2))
    }

    ///////////////////////////////
    /// Search the read, then its reverse complement if the read itself has no match.
    /// Bases that cannot be complemented are added to `unknown_bases`
    pub fn scan(&self, seq: &[u8], unknown_bases: &mut u64) -> Option<ScanResult> {
        if seq.len() < self.pattern.match_len() {
            return None;
        }
        if let Some((match_end, umi1, umi2)) = self.find(seq) {
            return Some(ScanResult {
                orientation: Orientation::Forward,
                match_end,
                umi1,
                umi2,
            });
        }

        let (seq_rc, num_unknown) = revcomp_lenient(seq);
        if num_unknown > 0 {
            debug!(
                "Unknown base(s) found in sequence, kept as-is in reverse complement: {}",
                String::from_utf8_lossy(seq)
            );
            *unknown_bases += num_unknown as u64;
        }

        self.find(&seq_rc).map(|(match_end, umi1, umi2)| ScanResult {
            orientation: Orientation::ReverseComplement,
            match_end,
            umi1,
            umi2,
        })
    }
}
