use regex::Regex;
use std::sync::OnceLock;

// Filler phrases people wrap around the number. Stripped before scanning
// so "bid 50 dollars" and "50" read the same.
fn filler() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"my bid is|i bid|bid|dollars?|\$").unwrap())
}

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Extract a whole-dollar bid amount from a spoken transcript.
///
/// The transcript is lowercased, a fixed set of filler phrases is stripped,
/// and the first run of digits is parsed as an integer dollar amount.
/// Returns `None` when the transcript contains no digits (number words
/// like "a hundred" are not recognized) or when the digit run does not
/// fit in a `u64`.
///
/// When a transcript contains several numbers, the first one wins.
///
/// ```
/// use vbid_voice::extract_bid_amount;
///
/// assert_eq!(extract_bid_amount("My bid is 150 dollars"), Some(150.0));
/// assert_eq!(extract_bid_amount("I bid $75"), Some(75.0));
/// assert_eq!(extract_bid_amount("hello there"), None);
/// ```
pub fn extract_bid_amount(transcript: &str) -> Option<f64> {
    let lowered = transcript.to_lowercase();
    let cleaned = filler().replace_all(&lowered, "");
    let run = digits().find(&cleaned)?;
    run.as_str().parse::<u64>().ok().map(|dollars| dollars as f64)
}
