use serde::{Deserialize, Serialize};

pub const META_FILE_NAME: &str = "negotiation_meta.json";
pub const TRANSCRIPT_FILE_NAME: &str = "bid_transcript.json";
pub const VALUE_ANALYSIS_FILE_NAME: &str = "value_analysis.json";

/// One negotiation's serialized documents, ready for an archiver.
///
/// The folder follows `negotiations/<timestamp>_<short id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionFiles {
    pub folder: String,
    pub negotiation_meta: String,
    pub bid_transcript: String,
    pub value_analysis: String,
}

impl SessionFiles {
    /// `(relative path, contents)` pairs in a stable order.
    pub fn entries(&self) -> [(String, &str); 3] {
        [
            (
                format!("{}/{META_FILE_NAME}", self.folder),
                self.negotiation_meta.as_str(),
            ),
            (
                format!("{}/{TRANSCRIPT_FILE_NAME}", self.folder),
                self.bid_transcript.as_str(),
            ),
            (
                format!("{}/{VALUE_ANALYSIS_FILE_NAME}", self.folder),
                self.value_analysis.as_str(),
            ),
        ]
    }
}
