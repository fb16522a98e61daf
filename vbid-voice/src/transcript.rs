use tokio::sync::mpsc;
use vbid_core::ports::{CaptureEvent, CaptureSession, CaptureUnsupported, SpeechCapture, SpokenInput};

/// The passthrough capture backend.
///
/// Accepts utterances the client already transcribed (the browser's own
/// speech recognition, for instance) and replays them through the standard
/// event sequence. Audio input is refused: this is the deployment with no
/// STT service configured, and the refusal is exactly the capability guard
/// the session expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptCapture;

impl TranscriptCapture {
    /// A new passthrough backend.
    pub fn new() -> Self {
        Self
    }
}

impl SpeechCapture for TranscriptCapture {
    fn start(&self, input: SpokenInput) -> Result<CaptureSession, CaptureUnsupported> {
        let text = match input {
            SpokenInput::Transcript(text) => text,
            SpokenInput::Audio(_) => return Err(CaptureUnsupported),
        };

        // Buffered large enough to hold the whole single-shot sequence, so
        // no task is needed to produce it.
        let (tx, rx) = mpsc::channel(3);
        let _ = tx.try_send(CaptureEvent::Started);
        let _ = tx.try_send(CaptureEvent::Transcript(text));
        let _ = tx.try_send(CaptureEvent::Ended);
        Ok(CaptureSession::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_the_full_event_sequence() {
        let capture = TranscriptCapture::new();
        let mut feed = capture
            .start(SpokenInput::Transcript("my bid is 150".into()))
            .unwrap();

        assert_eq!(feed.next_event().await, CaptureEvent::Started);
        assert_eq!(
            feed.next_event().await,
            CaptureEvent::Transcript("my bid is 150".into())
        );
        assert_eq!(feed.next_event().await, CaptureEvent::Ended);
    }

    #[test]
    fn audio_is_refused_synchronously() {
        let capture = TranscriptCapture::new();
        assert!(capture.start(SpokenInput::Audio(vec![1, 2, 3])).is_err());
    }
}
