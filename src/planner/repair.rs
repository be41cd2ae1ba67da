//! Best-effort recovery of JSON from model output.
//!
//! Models wrap replies in markdown fences, add chatter around the payload,
//! leave trailing commas, use single quotes, or get cut off mid-array. The
//! scanner here fixes those cases and nothing more.

use serde_json::Value;

/// Recover the first JSON array or object in `raw`, or `None` if there is
/// none. A bare string counts only when it is the whole reply.
pub fn repair_json(raw: &str) -> Option<Value> {
    let text = extract_json(raw);
    let start = if text.starts_with('"') {
        0
    } else {
        text.find(['[', '{'])?
    };
    let candidate = &text[start..];

    if let Some(Ok(value)) = serde_json::Deserializer::from_str(candidate)
        .into_iter::<Value>()
        .next()
    {
        return Some(value);
    }

    serde_json::from_str(&close_json(candidate)).ok()
}

/// Strip markdown code fences, if the reply is wrapped in them.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(after) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening fence line.
    let body = match after.find('\n') {
        Some(newline) => &after[newline + 1..],
        None => after.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Rewrite a truncated or sloppy JSON fragment into something parseable.
fn close_json(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in fragment.chars() {
        if let Some(q) = quote {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                out.push(c);
                escaped = true;
            } else if c == q {
                out.push('"');
                quote = None;
                if stack.is_empty() {
                    break;
                }
            } else if c == '"' {
                out.push_str("\\\"");
            } else if c == '\n' {
                out.push_str("\\n");
            } else {
                out.push(c);
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push('"');
            }
            '[' | '{' => {
                stack.push(c);
                out.push(c);
            }
            ']' | '}' => {
                let opener = if c == ']' { '[' } else { '{' };
                if stack.last() != Some(&opener) {
                    continue;
                }
                stack.pop();
                trim_trailing_comma(&mut out);
                out.push(c);
                if stack.is_empty() {
                    break;
                }
            }
            _ => out.push(c),
        }
    }

    if quote.is_some() {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    trim_trailing_comma(&mut out);
    if out.trim_end().ends_with(':') {
        out.push_str("null");
    }
    while let Some(opener) = stack.pop() {
        trim_trailing_comma(&mut out);
        out.push(if opener == '[' { ']' } else { '}' });
    }
    out
}

fn trim_trailing_comma(out: &mut String) {
    let kept = out.trim_end().len();
    if out[..kept].ends_with(',') {
        out.truncate(kept - 1);
    } else {
        out.truncate(kept);
    }
}

/// Interpret a repaired reply as an ordered list of queries.
///
/// Arrays keep their string elements (numbers and booleans are stringified,
/// blanks and nested values dropped). A bare string is a single query. An
/// object contributes its first array-valued field.
pub fn queries_from_value(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .filter(|q| !q.is_empty())
                .collect(),
        ),
        Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
        Value::Object(map) => map
            .into_iter()
            .find(|(_, v)| v.is_array())
            .and_then(|(_, v)| queries_from_value(v)),
        _ => None,
    }
}
