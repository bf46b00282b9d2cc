//! Input sanitizer for prompt-injection patterns.
//!
//! Raw interviewee text is scanned for instruction-override phrases and
//! fence markers before it reaches any external model. Sanitization never
//! blocks the turn; it neutralizes the pattern and reports the detection so
//! the engine can log a security event.

use once_cell::sync::Lazy;

/// Replacement inserted where an injection pattern was found.
const NEUTRALIZED: &str = "[filtered]";

/// Phrases that attempt to override the interviewer's instructions.
/// Matched case-insensitively.
static OVERRIDE_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "ignore previous instructions",
        "ignore all previous instructions",
        "ignore prior instructions",
        "disregard previous instructions",
        "disregard all prior",
        "forget your instructions",
        "you are now",
        "new system prompt",
        "system prompt:",
        "act as if",
        "override your",
    ]
});

/// Markers that attempt to break out of quoting. Matched literally.
static FENCE_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["```", "<|", "|>"]);

/// Role headers that attempt to inject a different speaker.
/// Matched case-insensitively.
static ROLE_HEADERS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["[system]", "[assistant]", "system:", "assistant:"]);

/// Result of sanitizing one piece of raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedInput {
    /// Text safe to forward to external capabilities.
    pub text: String,
    /// Patterns that were detected and neutralized.
    pub detected_patterns: Vec<String>,
}

impl SanitizedInput {
    /// Returns true if any injection pattern was found.
    pub fn was_modified(&self) -> bool {
        !self.detected_patterns.is_empty()
    }
}

/// Neutralizes prompt-injection patterns in raw interviewee text.
///
/// Matching is case-insensitive for override phrases and role headers, and
/// literal for fence markers. The output always contains the full remaining
/// text; nothing is dropped beyond the matched pattern itself.
pub fn sanitize_response(raw: &str) -> SanitizedInput {
    let mut text = raw.to_string();
    let mut detected = Vec::new();

    for phrase in OVERRIDE_PHRASES.iter().chain(ROLE_HEADERS.iter()) {
        text = replace_case_insensitive(&text, phrase, NEUTRALIZED, &mut detected);
    }

    for marker in FENCE_MARKERS.iter() {
        if text.contains(marker) {
            text = text.replace(marker, NEUTRALIZED);
            detected.push((*marker).to_string());
        }
    }

    SanitizedInput {
        text,
        detected_patterns: detected,
    }
}

/// Replaces every case-insensitive occurrence of `pattern`, recording a
/// detection when at least one was found.
fn replace_case_insensitive(
    text: &str,
    pattern: &str,
    replacement: &str,
    detected: &mut Vec<String>,
) -> String {
    // ASCII-insensitive matching keeps byte offsets aligned with the
    // original text; all known patterns are ASCII.
    let lower_text = text.to_ascii_lowercase();
    let lower_pattern = pattern.to_ascii_lowercase();

    if !lower_text.contains(&lower_pattern) {
        return text.to_string();
    }
    detected.push(pattern.to_string());

    let mut result = String::with_capacity(text.len());
    let mut search_from = 0;
    while let Some(rel_pos) = lower_text[search_from..].find(&lower_pattern) {
        let pos = search_from + rel_pos;
        result.push_str(&text[search_from..pos]);
        result.push_str(replacement);
        search_from = pos + lower_pattern.len();
    }
    result.push_str(&text[search_from..]);
    result
}
