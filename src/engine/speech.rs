use anyhow::Result;
use tokio::sync::mpsc;

use super::capture::AudioFrame;
use crate::recorder::TranscriptWord;

/// One recognition hypothesis from the speech engine
///
/// Each update carries the engine's latest full best hypothesis; the
/// consumer replaces its whole word list, it never appends.
#[derive(Debug, Clone)]
pub struct RecognitionUpdate {
    pub text: String,
    pub words: Vec<TranscriptWord>,
    /// Final updates end the stream; recording continues regardless
    pub is_final: bool,
}

/// A live transcription sub-stream
///
/// The feed side is bounded and fed with `try_send`: a slow or stalled
/// recognizer drops buffers and degrades transcript completeness, it
/// never backpressures the encoder sink. Dropping the feed finalizes the
/// stream and closes the results side.
pub struct SpeechStream {
    pub feed: mpsc::Sender<AudioFrame>,
    pub results: mpsc::UnboundedReceiver<RecognitionUpdate>,
}

/// On-device speech recognition engine
#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Open a recognition stream fed by raw capture buffers
    async fn start_stream(&self) -> Result<SpeechStream>;

    /// Whether speech recognition authorization is granted
    fn is_authorized(&self) -> bool {
        true
    }

    /// Engine name for logging
    fn name(&self) -> &str;
}
