//! Post-LLM output cleanup.
//!
//! Strips reasoning blocks and stray model tokens, then isolates the JSON
//! object the model was asked to return.

use std::sync::LazyLock;

use regex::Regex;

static REASONING_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(think|thinking|reasoning)>.*?</(?:think|thinking|reasoning)>")
        .expect("valid regex")
});

static UNUSED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<unused\d+>").expect("valid regex"));

/// Strip model-specific artifacts from raw LLM output.
///
/// Handles:
/// 1. Closed `<think>` / `<reasoning>` blocks anywhere in the text
/// 2. A leading reasoning block that was never closed (everything up to the first `{`)
/// 3. Gemma-style `<unusedN>thought` prefixes and stray `<unusedN>` tokens
pub fn sanitize_llm_output(raw: &str) -> String {
    let mut text = REASONING_BLOCK_RE.replace_all(raw, "").into_owned();

    let trimmed = text.trim_start();
    let lowered = trimmed.to_lowercase();
    if ["<think>", "<thinking>", "<reasoning>"]
        .iter()
        .any(|tag| lowered.starts_with(tag))
    {
        text = match trimmed.find('{') {
            Some(idx) => trimmed[idx..].to_string(),
            None => String::new(),
        };
    }

    if let Some(idx) = text.find("<unused") {
        if let Some(thought_offset) = text[idx..].find("thought\n") {
            text = text[idx + thought_offset + 8..].to_string();
        }
    }

    UNUSED_TOKEN_RE.replace_all(&text, "").trim().to_string()
}

/// Extract a JSON object block from LLM response text.
/// Handles responses that include prose before/after the JSON.
pub fn extract_json_block(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Some(after_fence[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Some(&trimmed[start..=end]);
        }
    }

    None
}
