//! Post-processing: deterministic cleanup of the model's reply before JSON
//! decoding.
//!
//! The system prompt asks for a bare JSON array, and most replies are
//! exactly that. A few models still wrap the array in a ```` ```json ````
//! fence or prepend a byte-order mark. These rules undo only that wrapping;
//! the array itself is never repaired or validated here.
//!
//! ## Rule Order
//!
//! Invisible characters go first so a leading BOM cannot hide the opening
//! fence, then line endings are normalised so the fence regex only has to
//! match `\n`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw assistant content.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode (BOM, zero-width spaces)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip one outer code fence, with or without a `json` language tag
/// 4. Trim surrounding whitespace
pub fn clean_json_reply(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = normalise_line_endings(&s);
    let s = strip_code_fences(&s);
    s.trim().to_string()
}

// ── Rule 1: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'], "")
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[ \t]*(?:json|JSON)?[ \t]*\n(.*?)\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}
