use super::Repository;
use crate::models::ProfileRecord;

/// The ways profile creation may be refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileFailure {
    /// The bidder already has a profile
    AlreadyExists,
    /// Another bidder holds this username
    UsernameTaken,
}

/// Repository trait for bidder profiles.
pub trait ProfileRepository: Repository {
    /// Create the bidder's profile. Usernames are unique across bidders.
    fn create_profile(
        &self,
        bidder_id: Self::BidderId,
        username: String,
        as_of: Self::DateTime,
    ) -> impl Future<
        Output = Result<
            Result<ProfileRecord<Self::DateTime, Self::BidderId>, ProfileFailure>,
            Self::Error,
        >,
    > + Send;

    /// Retrieve the bidder's profile, returning `None` if they have not
    /// created one.
    fn get_profile(
        &self,
        bidder_id: Self::BidderId,
    ) -> impl Future<
        Output = Result<Option<ProfileRecord<Self::DateTime, Self::BidderId>>, Self::Error>,
    > + Send;
}
