//! Text corrections: edit lists staged against the original buffer.
//!
//! A rule never mutates the syntax tree. It describes a [`Correction`] as a
//! list of `(span, replacement)` edits over the source it inspected, and the
//! edits of every accepted correction are applied in one pass, sorted by
//! position, by [`apply_corrections`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Byte offsets into a source buffer, half-open `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Span {
            start,
            end: end.max(start),
        }
    }

    /// Zero-width span at `pos`
    pub fn at(pos: usize) -> Self {
        Span { start: pos, end: pos }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Adjacent spans do not overlap; an insertion point strictly inside a span does
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_empty() && other.is_empty() {
            return false;
        }
        if self.is_empty() {
            return other.start < self.start && self.start < other.end;
        }
        if other.is_empty() {
            return self.start < other.start && other.start < self.end;
        }
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One replacement of `span` by `text`; insertions use an empty span, removals empty text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

/// The edits that fix one offense
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    edits: Vec<Edit>,
}

impl Correction {
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn overlaps(&self, other: &[Edit]) -> bool {
        self.edits
            .iter()
            .any(|a| other.iter().any(|b| a.span.overlaps(&b.span)))
    }
}

/// Builder for a [`Correction`]
#[derive(Debug, Default)]
pub struct Corrector {
    edits: Vec<Edit>,
}

impl Corrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) -> &mut Self {
        self.push(span, text.into())
    }

    pub fn remove(&mut self, span: Span) -> &mut Self {
        self.push(span, String::new())
    }

    pub fn insert_before(&mut self, span: Span, text: impl Into<String>) -> &mut Self {
        self.push(Span::at(span.start), text.into())
    }

    pub fn insert_after(&mut self, span: Span, text: impl Into<String>) -> &mut Self {
        self.push(Span::at(span.end), text.into())
    }

    /// Remove every line `span` touches, including the final newline
    pub fn remove_whole_lines(&mut self, source: &str, span: Span) -> &mut Self {
        let lines = whole_lines(source, span);
        self.remove(lines)
    }

    fn push(&mut self, span: Span, text: String) -> &mut Self {
        debug_assert!(
            !self.edits.iter().any(|e| e.span.overlaps(&span)),
            "overlapping edits within one correction at {span}"
        );
        self.edits.push(Edit { span, text });
        self
    }

    pub fn finish(self) -> Correction {
        Correction { edits: self.edits }
    }
}

/// Expand `span` to the full lines it covers, including the trailing newline
pub fn whole_lines(source: &str, span: Span) -> Span {
    let start = source[..span.start.min(source.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let tail_from = span.end.min(source.len());
    let end = source[tail_from..]
        .find('\n')
        .map(|i| tail_from + i + 1)
        .unwrap_or(source.len());
    Span::new(start, end)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("edit span {span} is out of bounds for a buffer of {len} bytes")]
    OutOfBounds { span: Span, len: usize },

    #[error("edit span {span} does not fall on UTF-8 character boundaries")]
    NotCharBoundary { span: Span },
}

/// Two corrections that target overlapping text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    OverlappingSpans {
        /// Index of the rejected correction in the input order
        correction: usize,
        accepted_span: Span,
        rejected_span: Span,
    },
}

/// Result of applying a batch of corrections to one buffer
#[derive(Debug, Clone)]
pub struct Applied {
    pub output: String,
    /// Indexes (input order) of the corrections that were applied
    pub applied: Vec<usize>,
    pub conflicts: Vec<Conflict>,
}

/// Apply corrections to `source` in one pass.
///
/// Corrections are considered in input order; one whose edits overlap an
/// already accepted edit is skipped as a whole and reported as a conflict.
pub fn apply_corrections(source: &str, corrections: &[Correction]) -> Result<Applied, CorrectionError> {
    let mut accepted: Vec<Edit> = Vec::new();
    let mut applied = Vec::new();
    let mut conflicts = Vec::new();

    for (idx, correction) in corrections.iter().enumerate() {
        for edit in correction.edits() {
            validate(source, edit.span)?;
        }
        if correction.overlaps(&accepted) {
            if let Some((a, r)) = first_overlap(&accepted, correction.edits()) {
                tracing::warn!(correction = idx, accepted = %a, rejected = %r, "skipping overlapping correction");
                conflicts.push(Conflict::OverlappingSpans {
                    correction: idx,
                    accepted_span: a,
                    rejected_span: r,
                });
            }
            continue;
        }
        accepted.extend(correction.edits().iter().cloned());
        applied.push(idx);
    }

    // Stable sort keeps insertion order for edits sharing a position
    accepted.sort_by_key(|e| (e.span.start, e.span.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &accepted {
        if edit.span.start > cursor {
            output.push_str(&source[cursor..edit.span.start]);
        }
        output.push_str(&edit.text);
        cursor = cursor.max(edit.span.end);
    }
    output.push_str(&source[cursor..]);

    Ok(Applied {
        output,
        applied,
        conflicts,
    })
}

fn first_overlap(accepted: &[Edit], edits: &[Edit]) -> Option<(Span, Span)> {
    edits.iter().find_map(|r| {
        accepted
            .iter()
            .find(|a| a.span.overlaps(&r.span))
            .map(|a| (a.span, r.span))
    })
}

fn validate(source: &str, span: Span) -> Result<(), CorrectionError> {
    if span.end > source.len() || span.start > span.end {
        return Err(CorrectionError::OutOfBounds {
            span,
            len: source.len(),
        });
    }
    if !source.is_char_boundary(span.start) || !source.is_char_boundary(span.end) {
        return Err(CorrectionError::NotCharBoundary { span });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correction(edits: &[(usize, usize, &str)]) -> Correction {
        let mut c = Corrector::new();
        for (s, e, t) in edits {
            c.replace(Span::new(*s, *e), *t);
        }
        c.finish()
    }

    #[test]
    fn span_overlap_rules() {
        assert!(Span::new(0, 5).overlaps(&Span::new(4, 6)));
        assert!(!Span::new(0, 5).overlaps(&Span::new(5, 6)));
        assert!(!Span::at(5).overlaps(&Span::new(0, 5)));
        assert!(Span::at(3).overlaps(&Span::new(0, 5)));
        assert!(!Span::at(3).overlaps(&Span::at(3)));
    }

    #[test]
    fn applies_edits_sorted_by_position() {
        let src = "create :user, 3";
        let a = correction(&[(0, 6, "build")]);
        let b = correction(&[(14, 15, "4")]);
        let res = apply_corrections(src, &[b, a]).unwrap();
        assert_eq!(res.output, "build :user, 4");
        assert_eq!(res.applied, vec![0, 1]);
        assert!(res.conflicts.is_empty());
    }

    #[test]
    fn skips_overlapping_correction() {
        let src = "association :user, factory: :user";
        let whole = correction(&[(0, src.len(), "user")]);
        let pair = correction(&[(17, src.len(), "")]);
        let res = apply_corrections(src, &[whole, pair]).unwrap();
        assert_eq!(res.output, "user");
        assert_eq!(res.applied, vec![0]);
        assert_eq!(res.conflicts.len(), 1);
    }

    #[test]
    fn insertions_at_same_point_keep_order() {
        let src = "create :user";
        let mut c = Corrector::new();
        c.replace(Span::new(6, 7), "(");
        c.insert_after(Span::new(7, 12), ")");
        let res = apply_corrections(src, &[c.finish()]).unwrap();
        assert_eq!(res.output, "create(:user)");
    }

    #[test]
    fn whole_lines_include_trailing_newline() {
        let src = "a\n  sequence :id\nb\n";
        let start = src.find("sequence").unwrap();
        let lines = whole_lines(src, Span::new(start, start + 12));
        assert_eq!(&src[lines.start..lines.end], "  sequence :id\n");
    }

    #[test]
    fn out_of_bounds_edit_is_an_error() {
        let err = apply_corrections("abc", &[correction(&[(2, 9, "")])]).unwrap_err();
        assert_eq!(
            err,
            CorrectionError::OutOfBounds {
                span: Span::new(2, 9),
                len: 3
            }
        );
    }
}
