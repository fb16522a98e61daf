use serde::{Deserialize, Serialize};

/// A bidder's public profile.
///
/// One profile per bidder; the username becomes the `bidder_name` recorded
/// on every bid the bidder places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ProfileRecord<DateTime, BidderId> {
    /// The bidder this profile belongs to
    pub bidder_id: BidderId,
    /// Unique display name
    pub username: String,
    /// When the profile was created
    pub created_at: DateTime,
}
