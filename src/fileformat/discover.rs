use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;
use walkdir::WalkDir;

use crate::runtime::{require_input, Error};

pub const SUFFIX_R1: &str = "_1.fq.gz";
pub const SUFFIX_R2: &str = "_2.fq.gz";

///////////////////////////////
/// A pair of mate files, and the sample name they share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPair {
    pub path_r1: PathBuf,
    pub path_r2: PathBuf,
    pub sample: String,
}

///////////////////////////////
/// Given the name of mate 1, get the name of mate 2 in the same directory
pub fn get_fq_filename_r2_from_r1(path_r1: &Path) -> Option<PathBuf> {
    let name = path_r1.file_name()?.to_str()?;
    let sample = name.strip_suffix(SUFFIX_R1)?;
    Some(path_r1.with_file_name(format!("{}{}", sample, SUFFIX_R2)))
}

///////////////////////////////
/// Pick the first mate-1 file in a directory, in name order, along with its mate-2 file.
/// Subdirectories are not searched
pub fn discover_input_pair(dir: &Path) -> anyhow::Result<InputPair> {
    if !dir.is_dir() {
        return Err(Error::input_not_found(dir).into());
    }

    let candidates = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SUFFIX_R1))
        })
        .sorted()
        .collect::<Vec<_>>();

    let Some(path_r1) = candidates.into_iter().next() else {
        return Err(Error::input_not_found(dir.join(format!("*{}", SUFFIX_R1))).into());
    };
    let path_r2 = get_fq_filename_r2_from_r1(&path_r1)
        .ok_or_else(|| Error::input_not_valid(&path_r1, Some("not a mate 1 file name")))?;
    require_input(&path_r2)?;

    let sample = path_r1
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(SUFFIX_R1))
        .unwrap_or_default()
        .to_string();

    info!("Found input files {} and {}", path_r1.display(), path_r2.display());
    Ok(InputPair {
        path_r1,
        path_r2,
        sample,
    })
}
