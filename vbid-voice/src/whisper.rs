//! Whisper-backed speech capture.
//!
//! Transcribes single-shot WAV audio through the OpenAI transcription API
//! and also passes client-side transcripts straight through, so a deployment
//! with an API key accepts both input kinds.

use std::time::Duration;

use tokio::sync::mpsc;
use vbid_core::ports::{
    CaptureEvent, CaptureSession, CaptureUnsupported, SpeechCapture, SpokenInput,
};

/// Response from the OpenAI Whisper transcription API.
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Configuration for the Whisper backend.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// OpenAI API key
    pub api_key: String,
    /// Model name, e.g. `whisper-1`
    pub model: String,
    /// Bound on the transcription call; the capture's `Ended` event is
    /// guaranteed to arrive within roughly this long
    pub request_timeout: Duration,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "whisper-1".to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Speech capture backed by the OpenAI Whisper API.
#[derive(Clone)]
pub struct WhisperCapture {
    client: reqwest::Client,
    config: WhisperConfig,
}

impl WhisperCapture {
    /// Create a Whisper backend.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureUnsupported`] when no API key is configured; the
    /// deployment should fall back to [`TranscriptCapture`](crate::TranscriptCapture).
    pub fn new(config: WhisperConfig) -> Result<Self, CaptureUnsupported> {
        if config.api_key.is_empty() {
            return Err(CaptureUnsupported);
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|_| CaptureUnsupported)?;
        Ok(Self { client, config })
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| e.to_string())?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("transcription API returned {}", response.status()));
        }

        let body: WhisperResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.text)
    }
}

impl SpeechCapture for WhisperCapture {
    fn start(&self, input: SpokenInput) -> Result<CaptureSession, CaptureUnsupported> {
        let (tx, rx) = mpsc::channel(3);

        match input {
            SpokenInput::Transcript(text) => {
                let _ = tx.try_send(CaptureEvent::Started);
                let _ = tx.try_send(CaptureEvent::Transcript(text));
                let _ = tx.try_send(CaptureEvent::Ended);
            }
            SpokenInput::Audio(audio) => {
                let this = self.clone();
                tokio::spawn(async move {
                    let _ = tx.send(CaptureEvent::Started).await;
                    match this.transcribe(audio).await {
                        Ok(text) => {
                            let _ = tx.send(CaptureEvent::Transcript(text)).await;
                        }
                        Err(reason) => {
                            tracing::warn!(%reason, "Whisper transcription failed");
                            let _ = tx.send(CaptureEvent::Failed(reason)).await;
                        }
                    }
                    let _ = tx.send(CaptureEvent::Ended).await;
                });
            }
        }

        Ok(CaptureSession::new(rx))
    }
}
