//! Simulation guard - truncates fabricated tool results out of model turns.
//!
//! Models sometimes keep generating past a tool-call boundary, inventing
//! the observation they should be waiting for. The guard scans each raw
//! model turn for stop markers and truncates at the earliest one, so
//! fabricated data never reaches the loop as if it were real.

/// Markers matched case-insensitively against raw model output.
///
/// The closing tool-call delimiter is a hard stop even in legitimate
/// output: the call itself is preserved, everything after it is dropped.
/// All other markers indicate fabricated continuation and are dropped
/// together with everything that follows them.
pub const STOP_MARKERS: [&str; 7] = [
    TOOL_CALL_CLOSE,
    "(assume",
    "assume",
    "in a real implementation",
    "fake data",
    "example.com",
    "placeholder",
];

/// Stop sequences forwarded to providers that accept them natively.
/// Providers cap how many can be sent, so only the strongest four go.
pub const API_STOP_SEQUENCES: [&str; 4] =
    ["</tool_call>", "(Assume", "assume", "In a real implementation"];

const TOOL_CALL_CLOSE: &str = "</tool_call>";

/// Remove fabricated continuation from a raw model turn.
///
/// Finds the earliest stop-marker occurrence. The closing tool-call
/// delimiter truncates *after* itself; any other marker truncates *before*
/// itself with trailing whitespace trimmed. Idempotent: sanitizing already
/// sanitized text changes nothing.
pub fn sanitize(raw_text: &str) -> String {
    // ASCII lowercasing preserves byte offsets, so marker positions in the
    // lowered copy are valid indices into the original.
    let lowered = raw_text.to_ascii_lowercase();

    let mut earliest: Option<(usize, &str)> = None;
    for marker in STOP_MARKERS {
        if let Some(at) = lowered.find(marker) {
            if earliest.map_or(true, |(best, _)| at < best) {
                earliest = Some((at, marker));
            }
        }
    }

    match earliest {
        None => raw_text.to_string(),
        Some((at, TOOL_CALL_CLOSE)) => raw_text[..at + TOOL_CALL_CLOSE.len()].to_string(),
        Some((at, _)) => raw_text[..at].trim_end().to_string(),
    }
}
