use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::anchor::Chain;

pub const UMI_SEPARATOR: char = '_';

///////////////////////////////
/// The two UMIs of a read pair, joined by `_`. Compared by exact string equality
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MolecularTag(String);

impl MolecularTag {
    pub fn new<S: Into<String>>(tag: S) -> MolecularTag {
        MolecularTag(tag.into())
    }

    pub fn from_umis(umi1: &[u8], umi2: &[u8]) -> MolecularTag {
        MolecularTag(format!(
            "{}{}{}",
            String::from_utf8_lossy(umi1),
            UMI_SEPARATOR,
            String::from_utf8_lossy(umi2)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two halves, if the tag has exactly one separator
    pub fn halves(&self) -> Option<(&str, &str)> {
        let mut parts = self.0.split(UMI_SEPARATOR);
        let umi1 = parts.next()?;
        let umi2 = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((umi1, umi2))
    }
}

impl fmt::Display for MolecularTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///////////////////////////////
/// Name of the template a read comes from; the same for both mates
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateIdentity(String);

impl TemplateIdentity {
    pub fn new<S: Into<String>>(id: S) -> TemplateIdentity {
        TemplateIdentity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///////////////////////////////
/// Template identity of a read header: first word, without mate suffix /1 or /2, without leading @
pub fn template_identity(header: &str) -> Option<TemplateIdentity> {
    let first = header.split_whitespace().next()?;
    let first = first
        .strip_suffix("/1")
        .or_else(|| first.strip_suffix("/2"))
        .unwrap_or(first);
    let first = first.strip_prefix('@').unwrap_or(first);
    if first.is_empty() {
        None
    } else {
        Some(TemplateIdentity::new(first))
    }
}

///////////////////////////////
/// The UMI tag added to read headers during preprocessing, and the chain it was found for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderTag {
    pub chain: Chain,
    pub tag: MolecularTag,
}

fn header_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"TAG:(TRA|TRB):([A-Za-z0-9_]+)(?::RC)?").expect("header tag regex is valid")
    })
}

///////////////////////////////
/// Find the UMI tag in a read header
pub fn parse_header_tag(header: &str) -> Option<HeaderTag> {
    let caps = header_tag_regex().captures(header)?;
    let chain = caps.get(1)?.as_str().parse::<Chain>().ok()?;
    let tag = MolecularTag::new(caps.get(2)?.as_str());
    Some(HeaderTag { chain, tag })
}
