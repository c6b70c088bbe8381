//! Recovery of structured analyses from free-form model output.
//!
//! Models regularly wrap JSON in Markdown fences, put prose around it, or
//! embed raw newlines inside string values. The repair pass makes the text
//! decodable, then tries the fenced block before the whole text. Output that
//! still does not fit degrades to [`AnalysisOutcome::Degraded`]; this module
//! never returns an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::ai::record::{AnalysisOutcome, AnalysisRecord};

static RE_FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Decodes UTF-8, dropping invalid byte sequences instead of substituting them.
pub fn normalize_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                // valid_up_to guarantees this prefix decodes
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => rest = &after[len..],
                    // Truncated sequence at the end of input
                    None => return out,
                }
            }
        }
    }
}

/// Escapes raw control characters (U+0000..U+001F) that appear inside JSON
/// string literals. Everything outside strings passes through untouched.
///
/// A backslash always consumes the next character, and every unescaped quote
/// toggles the in-string state.
pub fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => {
                out.push(ch);
                escaped = true;
            }
            '"' => {
                in_string = !in_string;
                out.push(ch);
            }
            c if in_string && (c as u32) <= 0x1F => match c {
                '\u{08}' => out.push_str("\\b"),
                '\u{0C}' => out.push_str("\\f"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                other => out.push_str(&format!("\\u{:04X}", other as u32)),
            },
            c => out.push(c),
        }
    }

    out
}

/// Contents of the first triple-backtick block, with or without a `json` tag.
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    RE_FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Full repair pipeline for one raw model response.
pub fn repair_analysis_response(raw: &[u8]) -> AnalysisOutcome {
    let sanitized = escape_control_chars(&normalize_utf8(raw));

    let fenced = extract_fenced_block(&sanitized);
    let candidates = fenced.into_iter().chain(std::iter::once(sanitized.as_str()));

    for (attempt, candidate) in candidates.enumerate() {
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(value) => match AnalysisRecord::from_value(&value) {
                Some(record) => return AnalysisOutcome::Parsed(record),
                None => tracing::debug!(attempt, "JSON payload does not match the analysis shape"),
            },
            Err(e) => tracing::debug!(attempt, error = %e, "Candidate payload is not JSON"),
        }
    }

    tracing::warn!("Model output could not be parsed, degrading analysis");
    AnalysisOutcome::degraded(sanitized)
}
