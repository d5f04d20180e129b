//! API descriptions: the archives making up one side of a comparison.

use serde::{Deserialize, Serialize};

/// Opaque named container from which an analyzer extracts elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Archive {
    /// Archive name, typically a file name or coordinates
    pub name: String,
    /// Optional version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Archive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// The archives under comparison for one side.
///
/// Primary archives are the ones checked; supplementary archives only help
/// analyzers resolve types referenced from the primary ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    #[serde(default)]
    pub archives: Vec<Archive>,
    #[serde(default)]
    pub supplementary_archives: Vec<Archive>,
}

impl Api {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_archive(mut self, archive: Archive) -> Self {
        self.archives.push(archive);
        self
    }

    #[must_use]
    pub fn with_supplementary_archive(mut self, archive: Archive) -> Self {
        self.supplementary_archives.push(archive);
        self
    }

    /// Primary archives followed by supplementary ones
    pub fn all_archives(&self) -> impl Iterator<Item = &Archive> {
        self.archives.iter().chain(&self.supplementary_archives)
    }
}
