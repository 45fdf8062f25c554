//! # Action Extraction
//!
//! Scans assistant replies for embedded JSON action objects. The model is
//! instructed to answer with bare JSON, but real replies wrap the objects in
//! prose, so we scan for brace-delimited candidates instead of trusting the
//! whole reply to parse.

use serde_json::Value;

/// Extracts every top-level JSON object embedded in `text`, in document order.
///
/// Each hit is returned together with its byte span so the caller can strip
/// the object out of the surrounding prose later. The scanner tracks brace
/// depth and string state, so braces inside JSON string values (for example
/// generated source code in a `content` field) do not terminate the candidate
/// early. Candidates that fail to parse are skipped wholesale; nested objects
/// inside a broken group are not revisited.
pub fn extract_json_objects(text: &str) -> Vec<(Value, usize, usize)> {
    let bytes = text.as_bytes();
    let mut objects = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            let start = i;
            let mut depth = 0usize;
            let mut in_string = false;
            let mut escape_next = false;

            while i < bytes.len() {
                let c = bytes[i];
                if escape_next {
                    escape_next = false;
                } else if c == b'\\' {
                    escape_next = true;
                } else if c == b'"' {
                    in_string = !in_string;
                } else if !in_string {
                    if c == b'{' {
                        depth += 1;
                    } else if c == b'}' {
                        depth -= 1;
                        if depth == 0 {
                            let end = i + 1;
                            match serde_json::from_str::<Value>(&text[start..end]) {
                                Ok(value) => objects.push((value, start, end)),
                                Err(e) => {
                                    tracing::debug!("skipping unparsable candidate at byte {start}: {e}");
                                }
                            }
                            break;
                        }
                    }
                }
                i += 1;
            }
            // An unterminated candidate runs to the end of the text and
            // extracts nothing.
        }
        i += 1;
    }

    objects
}

/// Removes the given byte spans from `text` and trims the remainder.
///
/// Spans must be non-overlapping and sorted by start offset, which is what
/// [`extract_json_objects`] produces.
pub fn strip_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in spans {
        cleaned.push_str(&text[cursor..start]);
        cursor = end;
    }
    cleaned.push_str(&text[cursor..]);
    cleaned.trim().to_string()
}
