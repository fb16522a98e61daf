/// The ways a submission may be refused without an infrastructure failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The caller has no authenticated identity
    NotAuthenticated,
    /// The amount is not a positive, finite number
    Invalid,
    /// The amount no longer exceeds the baseline; `baseline` is the fresh
    /// value it lost against
    TooLow {
        /// The current highest bid, or base price if no bids exist
        baseline: f64,
    },
    /// The auction is closed or past its deadline
    AuctionClosed,
    /// The auction does not exist
    AuctionNotFound,
}

/// The bid submission gateway contract.
///
/// An implementation is scoped to one auction and one (already
/// authenticated) bidder; `submit` persists exactly one bid record on
/// success. Infrastructure failures travel in the outer `Result` and are
/// never retried automatically; retry is always a fresh user action.
pub trait BidGateway: Send + Sync {
    /// What a successful submission hands back (typically the bid record)
    type Receipt: Send;

    /// Infrastructure error type
    type Error: std::error::Error + Send + Sync;

    /// Persist a bid of `amount` dollars.
    ///
    /// Implementations re-validate the amount defensively (see
    /// [`validate_amount`]) even though the session machine guards the
    /// confirm path.
    fn submit(
        &self,
        amount: f64,
    ) -> impl Future<Output = Result<Result<Self::Receipt, Rejection>, Self::Error>> + Send;
}

/// The defensive validation every gateway applies before touching the
/// store: the amount must be a positive, finite number.
pub fn validate_amount(amount: f64) -> Result<(), Rejection> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Rejection::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite_amounts() {
        assert_eq!(validate_amount(0.0), Err(Rejection::Invalid));
        assert_eq!(validate_amount(-5.0), Err(Rejection::Invalid));
        assert_eq!(validate_amount(f64::NAN), Err(Rejection::Invalid));
        assert_eq!(validate_amount(f64::INFINITY), Err(Rejection::Invalid));
        assert_eq!(validate_amount(150.0), Ok(()));
    }
}
