use serde::{Deserialize, Serialize};

/// One recognized word with timing and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    #[serde(rename = "word")]
    pub text: String,

    /// Start offset in milliseconds from recording start
    #[serde(rename = "start")]
    pub start_ms: u64,

    /// End offset in milliseconds from recording start
    #[serde(rename = "end")]
    pub end_ms: u64,

    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

/// Transcript snapshot pushed on every recognition update and bundled
/// into the stop result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    pub full_text: String,
    pub words: Vec<TranscriptWord>,
}

/// Accumulated transcript for one recording session.
///
/// Each recognition update replaces the full word list with the
/// recognizer's latest best hypothesis; nothing is appended
/// incrementally. Reset at session start.
#[derive(Debug, Default)]
pub struct Transcript {
    full_text: String,
    words: Vec<TranscriptWord>,
}

impl Transcript {
    pub fn reset(&mut self) {
        self.full_text.clear();
        self.words.clear();
    }

    pub fn replace(&mut self, full_text: String, words: Vec<TranscriptWord>) {
        self.full_text = full_text;
        self.words = words;
    }

    pub fn snapshot(&self) -> TranscriptUpdate {
        TranscriptUpdate {
            full_text: self.full_text.clone(),
            words: self.words.clone(),
        }
    }
}
