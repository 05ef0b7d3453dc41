use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use typeracer::display::{Segment, Zone};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn zone_style(zone: Zone) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    match zone {
        Zone::Typed => Style::default().patch(bold_style).fg(Color::Green),
        Zone::Matched => Style::default()
            .patch(bold_style)
            .fg(Color::Green)
            .add_modifier(Modifier::UNDERLINED),
        Zone::Mismatched => Style::default()
            .patch(bold_style)
            .fg(Color::White)
            .bg(Color::Red),
        Zone::Pending => Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM),
    }
}

pub fn segment_spans(segments: &[Segment]) -> Vec<Span<'_>> {
    segments
        .iter()
        .map(|s| Span::styled(s.text.as_str(), zone_style(s.zone)))
        .collect()
}

/// Lines the passage needs once wrapped into `width` columns.
fn passage_lines(segments: &[Segment], width: u16) -> u16 {
    let text_width = segments.iter().map(|s| s.text.width()).sum::<usize>();
    let width = width.max(1) as usize;

    if text_width <= width {
        1
    } else {
        // wrapping on words can spill onto one more line
        (text_width.div_ceil(width) + 1) as u16
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.controller.view();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
        let prompt_occupied_lines = passage_lines(&view.segments, max_chars_per_line);
        let padding = area.height.saturating_sub(prompt_occupied_lines.saturating_add(4)) / 2;

        let alignment = if prompt_occupied_lines == 1 {
            // a passage that fits on one line looks best centered
            Alignment::Center
        } else {
            Alignment::Left
        };

        let passage = Paragraph::new(Line::from(segment_spans(&view.segments)))
            .alignment(alignment)
            .wrap(Wrap { trim: true });

        match self.state() {
            state @ (AppState::Waiting | AppState::Racing) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(padding),
                        Constraint::Length(2),
                        Constraint::Length(prompt_occupied_lines),
                        Constraint::Length(2),
                        Constraint::Min(0),
                    ])
                    .split(area);

                let header = match (state, self.controller.seconds_remaining()) {
                    (AppState::Racing, Some(secs)) => format!("{secs:.1}"),
                    _ => String::from("press enter to start"),
                };
                Paragraph::new(Span::styled(header, dim_bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);

                passage.render(chunks[2], buf);

                let footer = if state == AppState::Racing {
                    Line::from(vec![
                        Span::styled("> ", dim_bold_style),
                        Span::styled(view.input.text(), bold_style),
                        Span::styled("_", dim_bold_style.add_modifier(Modifier::SLOW_BLINK)),
                    ])
                } else {
                    Line::from(Span::styled("(enter) start / (esc)ape", italic_style))
                };
                Paragraph::new(footer)
                    .alignment(Alignment::Center)
                    .render(chunks[3], buf);
            }
            AppState::Over => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(prompt_occupied_lines),
                        Constraint::Length(1), // reason
                        Constraint::Length(1), // stats
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                passage.render(chunks[0], buf);

                let reason = self
                    .controller
                    .race()
                    .and_then(|r| r.over_reason())
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                Paragraph::new(Span::styled(
                    reason,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);

                if let Some(summary) = self.controller.summary() {
                    let stats = Paragraph::new(Span::styled(
                        format!(
                            "{} wpm   {}/{} words   {}% done   {:.1}s",
                            summary.wpm,
                            summary.words_typed,
                            summary.total_words,
                            summary.progress,
                            summary.elapsed_secs
                        ),
                        bold_style,
                    ))
                    .alignment(Alignment::Center);

                    stats.render(chunks[2], buf);
                }

                Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", italic_style))
                    .render(chunks[4], buf);
            }
        }
    }
}
