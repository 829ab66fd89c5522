//! Kinds of files produced by [`crate::save_frame`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Files written by a save, keyed by kind.
pub type Artifacts = BTreeMap<ArtifactKind, PathBuf>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The primary, always-written delimited copy.
    Csv,
    /// The best-effort columnar copy.
    Parquet,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Csv => "csv",
            ArtifactKind::Parquet => "parquet",
        }
    }
}

/// Formats the kind as its file extension.
///
/// # Examples
///
/// ```
/// use openmeteo_daily::ArtifactKind;
///
/// assert_eq!(ArtifactKind::Csv.to_string(), "csv");
/// assert_eq!(format!("{}", ArtifactKind::Parquet), "parquet");
/// ```
impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
