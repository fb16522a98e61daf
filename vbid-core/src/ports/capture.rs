use tokio::sync::mpsc;

/// The spoken input handed to a capture backend.
///
/// Clients that transcribe locally submit the text; clients that record
/// submit single-shot WAV audio for server-side transcription.
#[derive(Debug, Clone)]
pub enum SpokenInput {
    /// An already-transcribed utterance
    Transcript(String),
    /// Raw WAV bytes of a single utterance
    Audio(Vec<u8>),
}

/// An observable event in the life of one capture attempt.
///
/// Per [`SpeechCapture::start`], the sequence is always `Started`, then
/// exactly one of `Transcript` or `Failed`, then `Ended`. `Ended` fires
/// exactly once regardless of outcome, so callers can reset their
/// "listening" indicator unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The backend accepted the input and is working on it
    Started,
    /// The final transcript; no interim results are ever surfaced
    Transcript(String),
    /// The capture failed; the reason is human-oriented, not machine-parsed
    Failed(String),
    /// The attempt is over, successful or not
    Ended,
}

/// The capability-detection guard: the configured backend cannot handle
/// this kind of input at all.
///
/// This is a synchronous refusal, not a capture failure: no events are
/// emitted, and the caller should fall back to the manual bid form.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("speech capture is not available for this input")]
pub struct CaptureUnsupported;

/// A single capture attempt's event feed.
///
/// Wraps the backend's channel and enforces the termination contract: if
/// the producer goes away without saying goodbye (a panicked task, a
/// dropped sender), the session synthesizes the missing `Ended` so the
/// consumer's event loop always terminates.
pub struct CaptureSession {
    rx: mpsc::Receiver<CaptureEvent>,
    ended: bool,
}

impl CaptureSession {
    /// Wrap a backend channel. Backends create the channel, spawn their
    /// work, and hand the receiving half here.
    pub fn new(rx: mpsc::Receiver<CaptureEvent>) -> Self {
        Self { rx, ended: false }
    }

    /// Wait for the next event. After `Ended` has been delivered, keeps
    /// returning `Ended`.
    pub async fn next_event(&mut self) -> CaptureEvent {
        if self.ended {
            return CaptureEvent::Ended;
        }
        match self.rx.recv().await {
            Some(CaptureEvent::Ended) | None => {
                self.ended = true;
                CaptureEvent::Ended
            }
            Some(event) => event,
        }
    }
}

/// The speech-recognition port.
///
/// A backend is single-shot: one `start` produces one terminal transcript
/// or failure. Backends that cannot handle the given input (no STT service
/// configured, for example) refuse synchronously with
/// [`CaptureUnsupported`] before any work begins.
pub trait SpeechCapture: Send + Sync {
    /// Begin a single-shot capture of the given input.
    fn start(&self, input: SpokenInput) -> Result<CaptureSession, CaptureUnsupported>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_synthesizes_ended_when_producer_vanishes() {
        let (tx, rx) = mpsc::channel(4);
        let mut session = CaptureSession::new(rx);

        tx.send(CaptureEvent::Started).await.unwrap();
        drop(tx);

        assert_eq!(session.next_event().await, CaptureEvent::Started);
        assert_eq!(session.next_event().await, CaptureEvent::Ended);
        // and it stays ended
        assert_eq!(session.next_event().await, CaptureEvent::Ended);
    }
}
