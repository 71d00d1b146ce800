use photorush::{util::format_clock, words::WordSet};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const INSTRUCTIONS: [&str; 3] = [
    "A random word pops up. Dig through your photo album for a picture of it: \
     if the word is 'bicycle', go find a bike. When the classifier's guess for \
     your photo contains the word, you score 20 points. Score as much as you \
     can before the clock runs out.",
    "Stuck on something like 'croquet ball'? Press n for a new word.",
    "The classifier gets things wrong sometimes. Try another photo.",
];

/// Cuts `text` to at most `max` display columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn hint(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // tagline
                Constraint::Length(1), // padding
                Constraint::Min(1),    // screen body
                Constraint::Length(1), // key hints
            ])
            .split(area);

        Paragraph::new(Span::styled("PhotoRush", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        Paragraph::new("The photo album game")
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        match self.state() {
            AppState::Home => {
                self.render_home(chunks[3], buf);
                hint("enter start · i instructions · d word set · esc quit").render(chunks[4], buf);
            }
            AppState::Playing => {
                self.render_playing(chunks[3], buf);
                hint("p select photo · n new word · esc quit").render(chunks[4], buf);
            }
            AppState::Picking => {
                self.render_picker(chunks[3], buf);
                hint("↑/↓ choose · enter pick · esc cancel").render(chunks[4], buf);
            }
            AppState::GameOver => {
                self.render_game_over(chunks[3], buf);
                hint("r play again · esc quit").render(chunks[4], buf);
            }
        }
    }
}

impl App {
    fn render_home(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();

        if self.show_instructions {
            for paragraph in INSTRUCTIONS {
                lines.push(Line::from(paragraph));
                lines.push(Line::from(""));
            }
        } else {
            lines.push(Line::from("New here? Press i to read how to play."));
            lines.push(Line::from(""));
        }

        let mode = match self.config.word_set {
            WordSet::Demo => "Demo words: a short list suited to a stock photo album",
            WordSet::General => "All words: several hundred things to hunt for",
        };
        lines.push(Line::from(Span::styled(mode, Style::default().fg(Color::Cyan))));
        lines.push(Line::from(format!(
            "Photos from {}",
            self.library.root().display()
        )));
        lines.push(Line::from(format!(
            "You have {} to score",
            format_clock(self.session.remaining_secs())
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_playing(&self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let label_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // word and prediction
                Constraint::Length(1), // picked photo
                Constraint::Length(1), // padding
                Constraint::Length(1), // points and clock
            ])
            .split(area);

        let lines = vec![
            Line::from(Span::styled("YOUR WORD", label_style)),
            Line::from(Span::styled(session.target_word().to_string(), bold_style)),
            Line::from(""),
            Line::from(Span::styled("CPU PREDICTION", label_style)),
            Line::from(Span::styled(
                session.last_prediction().to_string(),
                bold_style,
            )),
        ];

        let mut card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        if session.is_matched() {
            card = card.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            );
        }
        card.render(chunks[0], buf);

        let photo_line = if self.loading {
            "loading photo…".to_string()
        } else {
            self.last_photo.clone().unwrap_or_default()
        };
        Paragraph::new(Span::styled(
            truncate_to_width(&photo_line, chunks[1].width as usize),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Span::styled(
            format!("{} PTS    {}", session.score(), session.clock()),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    fn render_picker(&self, area: Rect, buf: &mut Buffer) {
        let Some(browser) = &self.browser else {
            return;
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.library.root().display()));
        let inner = block.inner(area);
        block.render(area, buf);

        if browser.is_empty() {
            Paragraph::new("No photos here (jpg, jpeg or png)")
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        // keep the selection inside the visible window
        let visible = inner.height.max(1) as usize;
        let first = browser.selected.saturating_sub(visible - 1);
        let width = inner.width.saturating_sub(2) as usize;

        let lines: Vec<Line> = browser
            .entries
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(idx, path)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let name = truncate_to_width(&name, width);
                if idx == browser.selected {
                    Line::from(Span::styled(
                        format!("> {name}"),
                        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(format!("  {name}"))
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_game_over(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("{} PTS", self.session.score()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }
}
