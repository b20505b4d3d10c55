use std::ops::Range;

const FENCE: &str = "```";

/// Bytes allowed in a language tag directly after an opening fence.
pub fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// A contiguous region of the source, either plain text or a complete fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind<'a>,
    /// Byte span in the source. For fences this covers both delimiters.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind<'a> {
    Text,
    Fence {
        tag: Option<&'a str>,
        /// Everything between the opening line's newline and the closing backticks.
        body: &'a str,
    },
}

enum State {
    /// Looking for an opening fence at or after `cursor`.
    Outside,
    /// An opening fence was accepted; looking for the closing backticks.
    InFence {
        open: usize,
        tag: Range<usize>,
        body_start: usize,
    },
}

/// Single-pass fence lexer.
///
/// An opening fence is three backticks, an optional tag of `[A-Za-z0-9_-]`,
/// then a newline. The fence closes at the first three backticks after that
/// newline, wherever they occur. An opening with no close anywhere after it is
/// left as text, and so is everything after it.
pub struct Scanner<'a> {
    source: &'a str,
    /// Start of text not yet emitted.
    text_start: usize,
    /// Where the next opening-fence search begins.
    cursor: usize,
    pending: Option<Segment<'a>>,
    unterminated: Option<Range<usize>>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            text_start: 0,
            cursor: 0,
            pending: None,
            unterminated: None,
        }
    }

    /// The opening line of the first fence that never closed, once scanning
    /// has reached it.
    pub fn unterminated(&self) -> Option<Range<usize>> {
        self.unterminated.clone()
    }

    fn next_fence(&mut self) -> Option<Segment<'a>> {
        let bytes = self.source.as_bytes();
        let mut state = State::Outside;

        loop {
            match state {
                State::Outside => {
                    let open = self.cursor + self.source.get(self.cursor..)?.find(FENCE)?;
                    let tag_start = open + FENCE.len();
                    let tag_end = tag_start
                        + bytes[tag_start..]
                            .iter()
                            .take_while(|b| is_tag_byte(**b))
                            .count();

                    if bytes.get(tag_end) == Some(&b'\n') {
                        state = State::InFence {
                            open,
                            tag: tag_start..tag_end,
                            body_start: tag_end + 1,
                        };
                    } else {
                        self.cursor = open + 1;
                    }
                }
                State::InFence {
                    open,
                    tag,
                    body_start,
                } => {
                    let Some(offset) = self.source[body_start..].find(FENCE) else {
                        // Any later opening would search a suffix of this one.
                        self.unterminated = Some(open..body_start);
                        self.cursor = self.source.len();
                        return None;
                    };
                    let close = body_start + offset;
                    let end = close + FENCE.len();
                    self.cursor = end;

                    let tag = (!tag.is_empty()).then(|| &self.source[tag]);
                    return Some(Segment {
                        kind: SegmentKind::Fence {
                            tag,
                            body: &self.source[body_start..close],
                        },
                        span: open..end,
                    });
                }
            }
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }

        match self.next_fence() {
            Some(fence) => {
                let text = self.text_start..fence.span.start;
                self.text_start = fence.span.end;
                if text.is_empty() {
                    Some(fence)
                } else {
                    self.pending = Some(fence);
                    Some(Segment {
                        kind: SegmentKind::Text,
                        span: text,
                    })
                }
            }
            None if self.text_start < self.source.len() => {
                let text = self.text_start..self.source.len();
                self.text_start = self.source.len();
                Some(Segment {
                    kind: SegmentKind::Text,
                    span: text,
                })
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(SegmentKind<'_>, Range<usize>)> {
        Scanner::new(source).map(|s| (s.kind, s.span)).collect()
    }

    #[test]
    fn text_only() {
        assert_eq!(kinds("hello"), vec![(SegmentKind::Text, 0..5)]);
        assert!(kinds("").is_empty());
    }

    #[test]
    fn fence_spans_cover_delimiters() {
        let src = "a\n```js\nx\n```b";
        assert_eq!(
            kinds(src),
            vec![
                (SegmentKind::Text, 0..2),
                (
                    SegmentKind::Fence {
                        tag: Some("js"),
                        body: "x\n"
                    },
                    2..13
                ),
                (SegmentKind::Text, 13..14),
            ]
        );
    }

    #[test]
    fn fourth_backtick_is_text() {
        let src = "````\nx\n```";
        assert_eq!(
            kinds(src),
            vec![
                (SegmentKind::Text, 0..1),
                (
                    SegmentKind::Fence {
                        tag: None,
                        body: "x\n"
                    },
                    1..10
                ),
            ]
        );
    }

    #[test]
    fn close_may_sit_mid_line() {
        let src = "```\nabc```";
        assert_eq!(
            kinds(src),
            vec![(
                SegmentKind::Fence {
                    tag: None,
                    body: "abc"
                },
                0..10
            )]
        );
    }

    #[test]
    fn unterminated_is_recorded() {
        let src = "intro\n```py\nprint(1)\n";
        let mut scanner = Scanner::new(src);
        let segments: Vec<_> = scanner.by_ref().collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].span, 0..src.len());
        assert_eq!(scanner.unterminated(), Some(6..12));
    }

    #[test]
    fn bad_tag_does_not_open() {
        let src = "```c++\nx\n";
        let mut scanner = Scanner::new(src);
        assert_eq!(scanner.by_ref().count(), 1);
        assert_eq!(scanner.unterminated(), None);
    }
}
