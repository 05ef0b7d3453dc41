//! Turns a race into highlighted text segments.
//!
//! The passage is split in up to four zones: the words already typed, the
//! characters of the current input matching the current word, the stretch of
//! text covered by the mismatching input, and everything still pending.

use crate::race::Race;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Zone {
    Typed,
    Matched,
    Mismatched,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub zone: Zone,
    pub text: String,
}

impl Segment {
    pub fn new(zone: Zone, text: impl Into<String>) -> Self {
        Self {
            zone,
            text: text.into(),
        }
    }
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

pub fn typed_words_text(race: &Race) -> String {
    race.current_player().typed_words().concat()
}

/// The matched prefix and the part of the remaining text hidden by the mismatching input.
pub fn typing_chars_text(race: &Race) -> (String, String) {
    let (matched, unmatched) = race.matched_typing_chars();
    let matched_len = matched.chars().count();
    let unmatched_len = unmatched.chars().count();

    // caps at the end of the remaining text, may run into the next words
    let mismatched = char_slice(
        &race.remaining_text(),
        matched_len,
        matched_len + unmatched_len,
    );

    (matched, mismatched)
}

pub fn to_type_text(race: &Race) -> String {
    let typed = race.current_player().typing_text().chars().count();
    race.remaining_text().chars().skip(typed).collect()
}

/// Builds the display segments of a race in order, leaving out empty zones.
pub fn segments(race: &Race) -> Vec<Segment> {
    let (matched, mismatched) = typing_chars_text(race);

    [
        Segment::new(Zone::Typed, typed_words_text(race)),
        Segment::new(Zone::Matched, matched),
        Segment::new(Zone::Mismatched, mismatched),
        Segment::new(Zone::Pending, to_type_text(race)),
    ]
    .into_iter()
    .filter(|s| !s.text.is_empty())
    .collect()
}

/// Renders display segments into some output format
pub trait SegmentRenderer {
    type Output;

    fn render(&self, segments: &[Segment]) -> Self::Output;
}

/// Renders segments as HTML spans for a web page.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn class(zone: Zone) -> Option<&'static str> {
        match zone {
            Zone::Typed => Some("typed-words"),
            Zone::Matched => Some("typing-text matched"),
            Zone::Mismatched => Some("typing-text non-matched"),
            Zone::Pending => None,
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl SegmentRenderer for HtmlRenderer {
    type Output = String;

    fn render(&self, segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|segment| {
                let text = escape_html(&segment.text);
                match Self::class(segment.zone) {
                    Some(class) => format!("<span class=\"{class}\">{text}</span>"),
                    None => text,
                }
            })
            .collect()
    }
}

/// Renders segments back into plain text, dropping the highlighting.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl SegmentRenderer for PlainRenderer {
    type Output = String;

    fn render(&self, segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }
}
