use serde::{Deserialize, Serialize};

/// A query type for dealing with datetime ranges.
///
/// Both bounds are optional; `before` is exclusive and `after` is inclusive,
/// matching the pagination idiom used by the adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(bound(deserialize = "DateTime: Deserialize<'de>"))]
pub struct DateTimeRangeQuery<DateTime> {
    /// Only include results strictly before this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<DateTime>,
    /// Only include results at or after this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime>,
}

impl<DateTime> Default for DateTimeRangeQuery<DateTime> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

/// The paginated response to a datetime query.
///
/// If more results exist than the requested page size, `more` contains the
/// query to retrieve the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(bound(deserialize = "T: Deserialize<'de>, DateTime: Deserialize<'de>"))]
pub struct DateTimeRangeResponse<T, DateTime> {
    /// The page of results
    pub results: Vec<T>,
    /// The query for the next page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more: Option<DateTimeRangeQuery<DateTime>>,
}
