use std::fmt;

pub const UMI1_LEN: usize = 7;
pub const UMI2_LEN: usize = 7;

//TRA structure, found in R1:  PRE_UMI1 [UMI1] LINKER [UMI2] FLANK [AT]
pub const PRE_UMI1_TRA: &str = "GACTCTGATGACGACGCACA";
pub const LINKER_FWD_TRA: &str = "GTACACGCTGGATCCGACTTGTAGA";
pub const FLANK_TRA_SEQ: &str = "TACTCTGCTGATACCGATGC";

//TRB structure, found in R2
pub const PRE_UMI1_TRB: &str = "GCATCGGTATCAGCAGAGTA";
pub const LINKER_REV_TRB: &str = "TCTACAAGTCGGATCCAGCGTGTAC";
pub const FLANK_TRB_SEQ: &str = "TGTGCGTCGTCATCAGAGTC";

pub const TERMINAL_BASES: [u8; 2] = [b'A', b'T'];

///////////////////////////////
/// The two mutually exclusive chain classes a read pair can be assigned to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    Tra,
    Trb,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Tra, Chain::Trb];

    /// Name used in read headers and file names
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Tra => "TRA",
            Chain::Trb => "TRB",
        }
    }

    /// Gene names of this chain all start with this prefix, e.g. TRAV12-2
    pub fn locus_prefix(&self) -> &'static str {
        self.name()
    }

    /// The mate carrying the anchor structure
    pub fn anchor_mate(&self) -> u8 {
        match self {
            Chain::Tra => 1,
            Chain::Trb => 2,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRA" => Ok(Chain::Tra),
            "TRB" => Ok(Chain::Trb),
            _ => Err(format!("Unknown chain: {}", s)),
        }
    }
}

///////////////////////////////
/// Fixed segments and UMI slots making up the anchor structure of one chain.
/// The structure ends in a single base taken from `terminal`
#[derive(Clone, Debug)]
pub struct AnchorPattern {
    pub chain: Chain,
    pub prefix: String,
    pub umi1_len: usize,
    pub linker: String,
    pub umi2_len: usize,
    pub flank: String,
    pub terminal: [u8; 2],
}

impl AnchorPattern {
    pub fn tra() -> AnchorPattern {
        AnchorPattern {
            chain: Chain::Tra,
            prefix: PRE_UMI1_TRA.to_string(),
            umi1_len: UMI1_LEN,
            linker: LINKER_FWD_TRA.to_string(),
            umi2_len: UMI2_LEN,
            flank: FLANK_TRA_SEQ.to_string(),
            terminal: TERMINAL_BASES,
        }
    }

    pub fn trb() -> AnchorPattern {
        AnchorPattern {
            chain: Chain::Trb,
            prefix: PRE_UMI1_TRB.to_string(),
            umi1_len: UMI1_LEN,
            linker: LINKER_REV_TRB.to_string(),
            umi2_len: UMI2_LEN,
            flank: FLANK_TRB_SEQ.to_string(),
            terminal: TERMINAL_BASES,
        }
    }

    pub fn with_umi_lengths(mut self, umi1_len: usize, umi2_len: usize) -> AnchorPattern {
        self.umi1_len = umi1_len;
        self.umi2_len = umi2_len;
        self
    }

    /// Total length of a match
    pub fn match_len(&self) -> usize {
        self.prefix.len() + self.umi1_len + self.linker.len() + self.umi2_len + self.flank.len() + 1
    }

    ///////////////////////////////
    /// Regular expression for the whole structure. Group 1 and 2 are the UMIs
    pub fn to_regex_string(&self) -> String {
        format!(
            "(?-u){}(.{{{}}}){}(.{{{}}}){}[{}{}]",
            regex::escape(&self.prefix),
            self.umi1_len,
            regex::escape(&self.linker),
            self.umi2_len,
            regex::escape(&self.flank),
            self.terminal[0] as char,
            self.terminal[1] as char,
        )
    }
}

impl fmt::Display for AnchorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}...UMI({})...{}...UMI({})...{}[{}{}]",
            self.chain,
            self.prefix,
            self.umi1_len,
            self.linker,
            self.umi2_len,
            self.flank,
            self.terminal[0] as char,
            self.terminal[1] as char
        )
    }
}
