//! Composes the session machine with a capture backend and a gateway.
//!
//! The machine itself is pure; these functions own the awaits. Callers hold
//! whatever lock guards the session across the call, which is what makes
//! the machine's busy-states effective against concurrent requests.

use crate::{
    gateway::{BidGateway, Rejection},
    session::{Confirmation, Recognition, StartOutcome, VoiceBidSession},
};
use vbid_core::ports::{CaptureEvent, SpeechCapture, SpokenInput};

/// The outcome of one listen attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenOutcome {
    /// An amount was recognized and awaits confirmation
    Recognized {
        /// What the bidder said
        transcript: String,
        /// The extracted whole-dollar amount
        amount: f64,
    },
    /// Capture completed but no amount could be extracted, or capture
    /// failed; the bidder may retry
    NotRecognized {
        /// The transcript, when capture succeeded but parsing did not
        transcript: Option<String>,
    },
    /// The configured backend cannot handle this input; the bidder should
    /// use the manual form
    Unsupported,
    /// A capture or submission is already in progress
    Busy,
}

/// Run one single-shot capture attempt through the session.
///
/// The capability guard comes first: an unsupported input leaves the
/// session untouched in `Idle`. Otherwise the session listens, the
/// backend's events are folded in until the attempt terminates, and the
/// recognition outcome is returned.
pub async fn listen<C: SpeechCapture>(
    session: &mut VoiceBidSession,
    capture: &C,
    input: SpokenInput,
) -> ListenOutcome {
    // Refuse before starting any backend work if the session is occupied.
    if matches!(
        session.state(),
        crate::session::SessionState::Listening | crate::session::SessionState::Submitting { .. }
    ) {
        return ListenOutcome::Busy;
    }

    // Capability guard: an unsupported input leaves the session in Idle.
    let mut feed = match capture.start(input) {
        Ok(feed) => feed,
        Err(_) => return ListenOutcome::Unsupported,
    };

    let started = session.begin_listening();
    debug_assert_eq!(started, StartOutcome::Listening);

    loop {
        let event = feed.next_event().await;
        let terminal = matches!(event, CaptureEvent::Ended);
        if let Some(recognition) = session.observe(event) {
            return match recognition {
                Recognition::Recognized { transcript, amount } => {
                    ListenOutcome::Recognized { transcript, amount }
                }
                Recognition::NotRecognized { transcript } => {
                    ListenOutcome::NotRecognized { transcript }
                }
            };
        }
        if terminal {
            // observe() ignored a stray Ended (session already out of
            // Listening); nothing more will arrive
            return ListenOutcome::NotRecognized { transcript: None };
        }
    }
}

/// The outcome of one confirm attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome<Receipt> {
    /// The bid landed; the session has been cleared
    Placed(Receipt),
    /// The local guard refused: the recognized amount does not exceed the
    /// baseline. The gateway was not invoked.
    TooLow {
        /// The recognized amount
        amount: f64,
        /// The baseline it failed to exceed
        baseline: f64,
    },
    /// The gateway refused; the amount is retained for retry
    Rejected(Rejection),
    /// A submission is already in flight
    InFlight,
    /// There is nothing recognized to confirm
    NothingRecognized,
}

/// Confirm the recognized amount and, if the guard passes, submit it
/// through the gateway.
///
/// The gateway is invoked at most once per call and only from the
/// `Submit` confirmation. An infrastructure error settles the session back
/// to `Recognized` (amount retained) before propagating.
pub async fn confirm<G: BidGateway>(
    session: &mut VoiceBidSession,
    baseline: f64,
    gateway: &G,
) -> Result<ConfirmOutcome<G::Receipt>, G::Error> {
    match session.confirm(baseline) {
        Confirmation::Submit { amount } => match gateway.submit(amount).await {
            Ok(Ok(receipt)) => {
                session.settle(true);
                Ok(ConfirmOutcome::Placed(receipt))
            }
            Ok(Err(rejection)) => {
                session.settle(false);
                Ok(ConfirmOutcome::Rejected(rejection))
            }
            Err(error) => {
                session.settle(false);
                Err(error)
            }
        },
        Confirmation::TooLow { amount, baseline } => {
            Ok(ConfirmOutcome::TooLow { amount, baseline })
        }
        Confirmation::InFlight => Ok(ConfirmOutcome::InFlight),
        Confirmation::NothingRecognized => Ok(ConfirmOutcome::NothingRecognized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranscriptCapture;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts submissions; refuses or fails on demand.
    struct MockGateway {
        calls: AtomicUsize,
        response: fn(f64) -> Result<Result<f64, Rejection>, Infallible>,
    }

    impl MockGateway {
        fn accepting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: |amount| Ok(Ok(amount)),
            }
        }

        fn rejecting_too_low() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: |_| Ok(Err(Rejection::TooLow { baseline: 175.0 })),
            }
        }
    }

    impl BidGateway for MockGateway {
        type Receipt = f64;
        type Error = Infallible;

        async fn submit(&self, amount: f64) -> Result<Result<f64, Rejection>, Infallible> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)(amount)
        }
    }

    #[tokio::test]
    async fn end_to_end_recognize_confirm_place() {
        let capture = TranscriptCapture::new();
        let gateway = MockGateway::accepting();
        let mut session = VoiceBidSession::new();

        let outcome = listen(
            &mut session,
            &capture,
            SpokenInput::Transcript("my bid is 150".into()),
        )
        .await;
        assert_eq!(
            outcome,
            ListenOutcome::Recognized {
                transcript: "my bid is 150".into(),
                amount: 150.0
            }
        );

        let outcome = confirm(&mut session, 100.0, &gateway).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Placed(150.0));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), &crate::SessionState::Idle);
    }

    #[tokio::test]
    async fn guard_never_invokes_the_gateway_on_too_low() {
        let capture = TranscriptCapture::new();
        let gateway = MockGateway::accepting();
        let mut session = VoiceBidSession::new();

        listen(
            &mut session,
            &capture,
            SpokenInput::Transcript("100".into()),
        )
        .await;

        let outcome = confirm(&mut session, 100.0, &gateway).await.unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::TooLow {
                amount: 100.0,
                baseline: 100.0
            }
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gateway_race_rejection_retains_the_amount() {
        let capture = TranscriptCapture::new();
        let gateway = MockGateway::rejecting_too_low();
        let mut session = VoiceBidSession::new();

        listen(
            &mut session,
            &capture,
            SpokenInput::Transcript("150".into()),
        )
        .await;

        let outcome = confirm(&mut session, 100.0, &gateway).await.unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::Rejected(Rejection::TooLow { baseline: 175.0 })
        );
        // the local guard passed, so the gateway was consulted once
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        // and the amount is retained for a retry against the new baseline
        assert!(matches!(
            session.state(),
            crate::SessionState::Recognized { amount, .. } if *amount == 150.0
        ));
    }

    #[tokio::test]
    async fn audio_without_a_backend_is_unsupported() {
        let capture = TranscriptCapture::new();
        let mut session = VoiceBidSession::new();

        let outcome = listen(&mut session, &capture, SpokenInput::Audio(vec![0; 16])).await;
        assert_eq!(outcome, ListenOutcome::Unsupported);
        assert_eq!(session.state(), &crate::SessionState::Idle);
    }

    #[tokio::test]
    async fn confirm_with_nothing_recognized() {
        let gateway = MockGateway::accepting();
        let mut session = VoiceBidSession::new();
        let outcome = confirm(&mut session, 100.0, &gateway).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::NothingRecognized);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }
}
