//! Reports fences that a markdown reader would show as code but that the cell
//! parser keeps as prose.

pub mod warning;

pub use warning::LintWarning;

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser as CmarkParser, Tag};
use tracing::debug;

use crate::parser::scanner::{Scanner, SegmentKind, is_tag_byte};

/// A fenced code block as CommonMark sees it.
struct CmarkFence {
    /// Offset of the first fence character.
    start: usize,
    range: Range<usize>,
    info: String,
}

/// Lint markdown source. Warnings are ordered by position.
pub fn lint(source: &str) -> Vec<LintWarning> {
    let mut scanner = Scanner::new(source);
    let cell_starts: Vec<usize> = scanner
        .by_ref()
        .filter(|s| matches!(s.kind, SegmentKind::Fence { .. }))
        .map(|s| s.span.start)
        .collect();
    let unterminated = scanner.unterminated();
    let fences = cmark_fences(source);

    let mut warnings = Vec::new();

    if let Some(open) = &unterminated {
        // A closing fence of a block that never became a cell reads as an
        // opening here; that block is reported on its own below.
        let closes_block = fences
            .iter()
            .any(|f| f.start < open.start && open.start <= f.range.end);
        if !closes_block {
            warnings.push(
                LintWarning::new("unterminated code fence", open.clone())
                    .with_note("no closing ``` follows; the rest of the document stays prose"),
            );
        }
    }

    for fence in &fences {
        if cell_starts.contains(&fence.start) {
            continue;
        }
        let note = match &unterminated {
            Some(open) if open.start == fence.start => continue,
            Some(open) if fence.start > open.start => {
                "it follows an opening fence that never closes".to_string()
            }
            _ => unrecognised_reason(source, fence),
        };

        let line_end = line_end(source, fence.start);
        warnings.push(
            LintWarning::new("fenced block is not a code cell", fence.start..line_end)
                .with_note(note),
        );
    }

    warnings.sort_by_key(|w| w.span.start);
    debug!(warnings = warnings.len(), "linted document");
    warnings
}

fn cmark_fences(source: &str) -> Vec<CmarkFence> {
    CmarkParser::new_ext(source, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let indent = source[range.clone()]
                    .bytes()
                    .take_while(|&b| b == b' ')
                    .count();
                Some(CmarkFence {
                    start: range.start + indent,
                    range,
                    info: info.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

fn line_end(source: &str, from: usize) -> usize {
    source[from..].find('\n').map_or(source.len(), |i| from + i)
}

fn unrecognised_reason(source: &str, fence: &CmarkFence) -> String {
    let line = &source[fence.start..line_end(source, fence.start)];
    let backticks = line.bytes().take_while(|&b| b == b'`').count();

    if line.starts_with('~') {
        "only backtick fences become code cells".to_string()
    } else if backticks > 3 {
        format!("fence uses {} backticks; code cells need exactly three", backticks)
    } else if !fence.info.is_empty() && !fence.info.bytes().all(is_tag_byte) {
        format!(
            "language tag `{}` may only contain letters, digits, `_` and `-`",
            fence.info
        )
    } else if line.ends_with('\r') {
        "opening fence ends with CRLF; code cells need a plain newline".to_string()
    } else {
        "the fence was consumed by a neighbouring code cell".to_string()
    }
}
