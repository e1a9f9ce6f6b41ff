//! Resilient JSON recovery from free-form model replies.
//!
//! ## Why not just `serde_json::from_str`?
//!
//! Language models frequently wrap valid JSON in prose or code fences
//! ("Sure! Here is the data: …"). A strict parse-only policy would discard
//! most real replies. Recovery therefore runs an explicit prioritized chain
//! of strategies — strict parse first, then brace slicing, then bracket
//! slicing — and reports *which* strategy succeeded so diagnostics and tests
//! can tell a clean reply from a salvaged one.
//!
//! The bracket-slicing fallbacks knowingly accept the risk of extracting a
//! malformed or unintended substring when the reply contains several
//! brace-delimited regions. That is a deliberate precision/recall trade-off:
//! one bad slice fails to parse and the chunk is counted as a miss, while a
//! stricter policy would miss nearly every fenced reply.

use serde_json::Value;

/// Which recovery strategy produced the value.
///
/// Ordered by priority; `recover` tries them top to bottom and the first
/// success wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecoveryStrategy {
    /// The entire reply parsed as JSON.
    StrictJson,
    /// The slice from the first `{` to the last `}` parsed as JSON.
    BraceSlice,
    /// The slice from the first `[` to the last `]` parsed as JSON.
    BracketSlice,
}

type Attempt = fn(&str) -> Option<Value>;

/// The prioritized chain. First success wins; a later strategy is only tried
/// when every earlier one failed.
const STRATEGIES: &[(RecoveryStrategy, Attempt)] = &[
    (RecoveryStrategy::StrictJson, parse_whole),
    (RecoveryStrategy::BraceSlice, parse_brace_slice),
    (RecoveryStrategy::BracketSlice, parse_bracket_slice),
];

/// Recover a JSON value from a raw model reply.
///
/// Returns the parsed value and the strategy that produced it, or `None`
/// when no strategy yields syntactically complete JSON. Recovery never
/// returns a partially-valid value.
pub fn recover(raw: &str) -> Option<(Value, RecoveryStrategy)> {
    for (strategy, attempt) in STRATEGIES {
        if let Some(value) = attempt(raw) {
            tracing::debug!(?strategy, "recovered JSON value");
            return Some((value, *strategy));
        }
    }
    None
}

fn parse_whole(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

fn parse_brace_slice(raw: &str) -> Option<Value> {
    parse_delimited(raw, '{', '}')
}

fn parse_bracket_slice(raw: &str) -> Option<Value> {
    parse_delimited(raw, '[', ']')
}

/// Parse the inclusive slice from the first `open` to the last `close`.
///
/// Both delimiters are ASCII, so the byte indices from `find`/`rfind` are
/// valid slice boundaries.
fn parse_delimited(raw: &str, open: char, close: char) -> Option<Value> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}
