//! Ingestion of script cues produced by a text model.
//!
//! Model output is loosely formed JSON: it may arrive inside a markdown fence,
//! carry stray tokens, or have dangling commas. [`parse_cues`] cleans that up
//! and keeps only well-formed entries.

use crate::error::{CoreError, Result};
use crate::types::*;
use serde_json::Value;
use uuid::Uuid;

/// Parse a cue list, clamping every cue into `[0, total_duration]` and
/// returning them sorted by time.
pub fn parse_cues(raw: &str, total_duration: TimeUs) -> Result<Vec<ScriptCue>> {
    let cleaned = clean_response(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    let Value::Array(entries) = value else {
        return Err(CoreError::CueFormat("response is not a JSON array".into()));
    };

    let mut cues: Vec<ScriptCue> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let cue = cue_from_value(entry, total_duration);
            if cue.is_none() {
                tracing::warn!(index, "skipping malformed cue");
            }
            cue
        })
        .collect();
    cues.sort_by_key(|c| c.time);

    tracing::debug!(kept = cues.len(), received = entries.len(), "cues parsed");
    Ok(cues)
}

fn cue_from_value(entry: &Value, total_duration: TimeUs) -> Option<ScriptCue> {
    let time = entry.get("time")?.as_f64()?;
    let text = entry.get("text")?.as_str()?;

    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .and_then(CueCategory::parse)
        .unwrap_or(CueCategory::Visual);
    let color = entry
        .get("color")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .unwrap_or(category.default_color());
    let speaker = entry
        .get("speaker")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ScriptCue {
        id: Uuid::new_v4(),
        time: TimeUs::from_seconds(time).clamp(TimeUs::ZERO, total_duration.max(TimeUs::ZERO)),
        text: text.to_string(),
        speaker,
        category,
        color: color.to_string(),
    })
}

/// Strip a code fence, scrub junk outside string literals, and cut the text
/// down to its outermost array.
fn clean_response(raw: &str) -> String {
    let unfenced = strip_fence(raw.trim());
    let scrubbed = drop_commas(&drop_word(unfenced, "Handler"));
    match (scrubbed.find('['), scrubbed.rfind(']')) {
        (Some(start), Some(end)) if end > start => scrubbed[start..=end].to_string(),
        _ => scrubbed.trim().to_string(),
    }
}

fn strip_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let Some(body) = rest.trim_end().strip_suffix("```") else {
        return s;
    };
    // drop the info string (`json`) on the opening line
    match body.find('\n') {
        Some(nl) if body[..nl].chars().all(|c| c.is_ascii_alphanumeric()) => body[nl + 1..].trim(),
        _ => body.trim(),
    }
}

/// Walk `s` outside of string literals, handing each character to `emit`
/// together with the output built so far. Characters inside strings are
/// copied verbatim.
fn scan_outside_strings(s: &str, mut emit: impl FnMut(&mut String, &[char], usize) -> usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
        } else if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
        } else {
            i += emit(&mut out, &chars, i).max(1);
        }
    }
    out
}

fn drop_word(s: &str, word: &str) -> String {
    let word: Vec<char> = word.chars().collect();
    scan_outside_strings(s, |out, chars, i| {
        if chars[i..].starts_with(&word) {
            word.len()
        } else {
            out.push(chars[i]);
            1
        }
    })
}

fn drop_commas(s: &str) -> String {
    scan_outside_strings(s, |out, chars, i| {
        if chars[i] != ',' {
            out.push(chars[i]);
            return 1;
        }
        let prev = out.trim_end().chars().last();
        let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
        let dangling = matches!(prev, None | Some('[') | Some('{') | Some(','))
            || matches!(next, None | Some(']') | Some('}') | Some(','));
        if !dangling {
            out.push(',');
        }
        1
    })
}
