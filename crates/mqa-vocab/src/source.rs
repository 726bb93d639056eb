use std::fmt;

use serde::{Deserialize, Serialize};

/// Vocabulary CSV files known to the indicator table.
///
/// Every file is headerless; column 0 holds the URI and column 1 the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularySource {
    AccessRight,
    FileTypes,
    MediaTypes,
    Licenses,
    NonProprietary,
    MachineReadable,
}

impl VocabularySource {
    pub const ALL: [VocabularySource; 6] = [
        VocabularySource::AccessRight,
        VocabularySource::FileTypes,
        VocabularySource::MediaTypes,
        VocabularySource::Licenses,
        VocabularySource::NonProprietary,
        VocabularySource::MachineReadable,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            VocabularySource::AccessRight => "access-right.csv",
            VocabularySource::FileTypes => "file-types.csv",
            VocabularySource::MediaTypes => "media-types.csv",
            VocabularySource::Licenses => "licenses.csv",
            VocabularySource::NonProprietary => "non-proprietary.csv",
            VocabularySource::MachineReadable => "machine-readable.csv",
        }
    }
}

impl fmt::Display for VocabularySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
