///////////////////////////////
/// Complement of one ATCGN base; None for anything else
#[inline(always)]
pub fn complement(c: u8) -> Option<u8> {
    match c {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'C' => Some(b'G'),
        b'G' => Some(b'C'),
        b'N' => Some(b'N'),
        _ => None,
    }
}

///////////////////////////////
/// Reverse complement of a read. Bases other than ATCGN are kept as they are;
/// the number of such bases is returned alongside
pub fn revcomp_lenient(seq: &[u8]) -> (Vec<u8>, usize) {
    let mut num_unknown = 0;
    let rc = seq
        .iter()
        .rev()
        .map(|&c| match complement(c) {
            Some(comp) => comp,
            None => {
                num_unknown += 1;
                c
            }
        })
        .collect();
    (rc, num_unknown)
}

///////////////////////////////
/// Reverse complement, failing on anything but ATCGN
pub fn try_revcomp(seq: &[u8]) -> Option<Vec<u8>> {
    seq.iter().rev().map(|&c| complement(c)).collect()
}
