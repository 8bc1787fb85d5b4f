//! Alias → canonical text substitution.
//!
//! Matching runs on a folded (lowercase, accent-free) copy of the text, but
//! replacement happens on the original so untouched spans keep their casing
//! and accents. A hit only counts when it covers whole words: the match is
//! widened to the surrounding run of letters/digits and must still equal the
//! alias, so "25k" never fires inside "125k".

use crate::vocabulary::TermMapping;

use super::normalize::{collapse_whitespace, fold, fold_char};

#[derive(Debug, Clone)]
struct PreparedMapping {
    folded_alias: String,
    canonical: String,
}

/// Accepted match in original-text byte offsets.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    mapping: usize,
}

/// Ordered alias dictionary ready for matching.
///
/// Entry order is the tie-break: when two aliases claim overlapping text,
/// the one listed first wins.
#[derive(Debug, Clone)]
pub struct TermCanonicalizer {
    mappings: Vec<PreparedMapping>,
}

impl TermCanonicalizer {
    pub fn new(mappings: &[TermMapping]) -> Self {
        let mappings = mappings
            .iter()
            .map(|m| PreparedMapping {
                folded_alias: fold(m.alias.trim()),
                canonical: m.canonical.clone(),
            })
            .filter(|m| !m.folded_alias.is_empty())
            .collect();
        Self { mappings }
    }

    /// Replace every whole-word alias occurrence with its canonical form.
    pub fn canonicalize(&self, text: &str) -> String {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return text;
        }

        let folded = FoldedText::new(&text);
        let mut accepted: Vec<Span> = Vec::new();

        for (index, mapping) in self.mappings.iter().enumerate() {
            let alias = mapping.folded_alias.as_str();
            for (pos, _) in folded.text.match_indices(alias) {
                let Some((start, end)) = folded.original_span(pos, pos + alias.len()) else {
                    continue;
                };
                let (start, end) = expand_to_word(&text, start, end);
                if fold(&text[start..end]) != alias {
                    continue;
                }
                if accepted.iter().any(|s| s.start < end && start < s.end) {
                    continue;
                }
                accepted.push(Span {
                    start,
                    end,
                    mapping: index,
                });
            }
        }

        if accepted.is_empty() {
            return text;
        }

        // Right-to-left keeps earlier offsets valid while lengths change.
        accepted.sort_by(|a, b| b.start.cmp(&a.start));

        let mut output = text;
        for span in &accepted {
            let canonical = &self.mappings[span.mapping].canonical;
            tracing::trace!(
                alias = %self.mappings[span.mapping].folded_alias,
                canonical = %canonical,
                "Alias replaced"
            );
            output.replace_range(span.start..span.end, canonical);
        }
        output
    }
}

/// Folded copy of a text with a map back to original byte offsets.
struct FoldedText {
    text: String,
    /// One segment per original char: (folded start, folded len, original start, original end).
    segments: Vec<(usize, usize, usize, usize)>,
}

impl FoldedText {
    fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut segments = Vec::with_capacity(original.len());
        for (offset, c) in original.char_indices() {
            let folded = fold_char(c);
            segments.push((text.len(), folded.len(), offset, offset + c.len_utf8()));
            text.push_str(&folded);
        }
        Self { text, segments }
    }

    /// Original byte range covering folded bytes `[start, end)`.
    fn original_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end {
            return None;
        }
        let first = self.segment_at(start)?;
        let last = self.segment_at(end - 1)?;
        Some((first.2, last.3))
    }

    fn segment_at(&self, folded_pos: usize) -> Option<(usize, usize, usize, usize)> {
        let idx = self
            .segments
            .partition_point(|&(folded_start, _, _, _)| folded_start <= folded_pos);
        let segment = *self.segments.get(idx.checked_sub(1)?)?;
        (folded_pos < segment.0 + segment.1).then_some(segment)
    }
}

/// Widen `[start, end)` to the enclosing run of letters/digits.
/// Edges that are already punctuation or whitespace stay put.
fn expand_to_word(text: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    if text[start..].chars().next().is_some_and(char::is_alphanumeric) {
        while let Some(prev) = text[..start].chars().next_back() {
            if !prev.is_alphanumeric() {
                break;
            }
            start -= prev.len_utf8();
        }
    }
    if text[..end].chars().next_back().is_some_and(char::is_alphanumeric) {
        while let Some(next) = text[end..].chars().next() {
            if !next.is_alphanumeric() {
                break;
            }
            end += next.len_utf8();
        }
    }
    (start, end)
}
