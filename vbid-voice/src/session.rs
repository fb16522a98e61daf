use crate::extract::extract_bid_amount;
use vbid_core::ports::CaptureEvent;

/// The observable state of one voice-bidding session.
///
/// A session belongs to a single bidder on a single auction and carries no
/// identity beyond the current attempt; it is created when the bidding
/// panel opens and discarded on success or cancel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing in progress
    Idle,
    /// A capture attempt is running
    Listening,
    /// A transcript produced an amount awaiting the bidder's confirmation
    Recognized {
        /// What the bidder said
        transcript: String,
        /// The extracted whole-dollar amount
        amount: f64,
    },
    /// The recognized amount is on its way to the store
    Submitting {
        /// Retained so a failed submission can be retried without
        /// re-speaking
        transcript: String,
        /// The amount being submitted
        amount: f64,
    },
}

/// Result of asking the session to start listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session moved to `Listening`
    Listening,
    /// A capture or submission is already in progress; nothing changed
    Busy,
}

/// What a final transcript (or capture failure) produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// An amount was extracted; the session is awaiting confirmation
    Recognized {
        /// What the bidder said
        transcript: String,
        /// The extracted whole-dollar amount
        amount: f64,
    },
    /// No amount could be extracted, or the capture failed; the session is
    /// back to `Idle` and the bidder may retry
    NotRecognized {
        /// The transcript, when capture succeeded but parsing did not
        transcript: Option<String>,
    },
}

/// Result of asking the session to confirm the recognized amount.
///
/// Only the `Submit` variant permits invoking the gateway; every other
/// variant means no submission may be attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The guard passed: the session is now `Submitting` and the caller
    /// must invoke the gateway exactly once, then call
    /// [`VoiceBidSession::settle`]
    Submit {
        /// The amount to submit
        amount: f64,
    },
    /// The recognized amount does not exceed the baseline; no transition,
    /// no submission
    TooLow {
        /// The amount that was recognized
        amount: f64,
        /// The baseline it failed to exceed
        baseline: f64,
    },
    /// A submission is already in flight; this call is a no-op
    InFlight,
    /// There is nothing recognized to confirm
    NothingRecognized,
}

/// The voice-bid session state machine.
///
/// Pure state: all I/O (capture, submission) happens outside and is folded
/// in through [`observe`](Self::observe) and [`settle`](Self::settle). The
/// `driver` module composes the machine with a capture backend and a
/// gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceBidSession {
    state: SessionState,
}

impl Default for VoiceBidSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceBidSession {
    /// A fresh session in `Idle`.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Move from `Idle` to `Listening`.
    ///
    /// A second start while listening or submitting is a no-op; a start
    /// from `Recognized` discards the pending amount and listens again
    /// (re-speaking replaces the previous attempt).
    pub fn begin_listening(&mut self) -> StartOutcome {
        match self.state {
            SessionState::Idle | SessionState::Recognized { .. } => {
                self.state = SessionState::Listening;
                StartOutcome::Listening
            }
            SessionState::Listening | SessionState::Submitting { .. } => StartOutcome::Busy,
        }
    }

    /// Fold a capture event into the session.
    ///
    /// Returns the recognition outcome when the event is terminal for the
    /// attempt; `Started` and a well-behaved trailing `Ended` return
    /// `None`. Events arriving outside `Listening` are ignored.
    pub fn observe(&mut self, event: CaptureEvent) -> Option<Recognition> {
        if !matches!(self.state, SessionState::Listening) {
            return None;
        }
        match event {
            CaptureEvent::Started => None,
            CaptureEvent::Transcript(text) => match extract_bid_amount(&text) {
                Some(amount) => {
                    self.state = SessionState::Recognized {
                        transcript: text.clone(),
                        amount,
                    };
                    Some(Recognition::Recognized {
                        transcript: text,
                        amount,
                    })
                }
                None => {
                    self.state = SessionState::Idle;
                    Some(Recognition::NotRecognized {
                        transcript: Some(text),
                    })
                }
            },
            CaptureEvent::Failed(reason) => {
                tracing::debug!(%reason, "speech capture failed");
                self.state = SessionState::Idle;
                Some(Recognition::NotRecognized { transcript: None })
            }
            // A stray Ended without a terminal event means the capture
            // went away; treat it like a failure.
            CaptureEvent::Ended => {
                self.state = SessionState::Idle;
                Some(Recognition::NotRecognized { transcript: None })
            }
        }
    }

    /// Ask to confirm the recognized amount against the baseline.
    ///
    /// The guard lives here: unless the recognized amount strictly exceeds
    /// `baseline`, the session does not transition and the gateway must not
    /// be invoked.
    pub fn confirm(&mut self, baseline: f64) -> Confirmation {
        match &self.state {
            SessionState::Recognized { transcript, amount } => {
                let amount = *amount;
                if amount > baseline {
                    self.state = SessionState::Submitting {
                        transcript: transcript.clone(),
                        amount,
                    };
                    Confirmation::Submit { amount }
                } else {
                    Confirmation::TooLow { amount, baseline }
                }
            }
            SessionState::Submitting { .. } => Confirmation::InFlight,
            SessionState::Idle | SessionState::Listening => Confirmation::NothingRecognized,
        }
    }

    /// Fold the gateway result back in.
    ///
    /// Success clears the session; failure returns to `Recognized` with the
    /// amount retained so the bidder can retry without re-speaking. Outside
    /// `Submitting` this is a no-op.
    pub fn settle(&mut self, success: bool) {
        if let SessionState::Submitting { transcript, amount } = &self.state {
            self.state = if success {
                SessionState::Idle
            } else {
                SessionState::Recognized {
                    transcript: transcript.clone(),
                    amount: *amount,
                }
            };
        }
    }

    /// Explicitly reset to `Idle`, clearing any transcript and amount.
    ///
    /// Idempotent from `Idle`; a no-op while a submission is in flight
    /// (returns `false` in that case).
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SessionState::Submitting { .. } => false,
            _ => {
                self.state = SessionState::Idle;
                true
            }
        }
    }
}
