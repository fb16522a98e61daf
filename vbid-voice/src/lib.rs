#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod extract;
pub use extract::extract_bid_amount;

mod session;
pub use session::{Confirmation, Recognition, SessionState, StartOutcome, VoiceBidSession};

mod gateway;
pub use gateway::{BidGateway, Rejection, validate_amount};

mod driver;
pub use driver::{ConfirmOutcome, ListenOutcome, confirm, listen};

mod transcript;
pub use transcript::TranscriptCapture;

#[cfg(feature = "whisper")]
mod whisper;
#[cfg(feature = "whisper")]
pub use whisper::{WhisperCapture, WhisperConfig};
