pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    clock::Clock,
    glyph,
    score::Score,
    session::{Phase, LOADING},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const PAUSED_MESSAGE: &str = "paused";
const PAUSED_SUBTEXT: &str = "press any key or focus this window to start typing";

/// Lay characters out as lines, drawing whitespace with its glyph and
/// breaking after each line end
struct LineBuilder<'a> {
    lines: Vec<Line<'a>>,
    spans: Vec<Span<'a>>,
}

impl<'a> LineBuilder<'a> {
    fn new() -> Self {
        Self {
            lines: vec![],
            spans: vec![],
        }
    }

    fn push(&mut self, c: char, style: Style) {
        match c {
            '\n' => {
                self.spans
                    .push(Span::styled(glyph::LINE_END_MARK.to_string(), style));
                self.lines.push(Line::from(std::mem::take(&mut self.spans)));
            }
            ' ' => self.spans.push(Span::styled(glyph::SPACE.to_string(), style)),
            c => self.spans.push(Span::styled(c.to_string(), style)),
        }
    }

    fn finish(mut self) -> Vec<Line<'a>> {
        self.lines.push(Line::from(self.spans));
        self.lines
    }
}

/// Width in columns of the widest excerpt line once glyphs are applied
fn excerpt_width(text: &str) -> u16 {
    glyph::substitute_str(text)
        .lines()
        .map(|l| l.width())
        .max()
        .unwrap_or(0) as u16
}

/// Rows taken by `lines` once wrapped to `cols` columns
fn wrapped_height(lines: &[Line], cols: u16) -> u16 {
    let cols = usize::from(cols.max(1));
    let rows: usize = lines.iter().map(|l| l.width().max(1).div_ceil(cols)).sum();
    rows.min(usize::from(u16::MAX)) as u16
}

/// Rect of `width` x `height` centered in `area`, clamped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn score_line(score: Option<&Score>, style: Style) -> Line<'static> {
    let mut spans = vec![];
    for (i, (label, value)) in Score::labelled(score).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(value, style));
        spans.push(Span::raw(format!(" {label}")));
    }
    Line::from(spans)
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let magenta_style = Style::default().fg(Color::Magenta);

        match self.state {
            AppState::Typing => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1), // excerpt name
                        Constraint::Min(1),    // excerpt
                        Constraint::Length(1), // score
                    ])
                    .split(area);

                let title = Paragraph::new(Span::styled(self.excerpt.name.clone(), italic_style))
                    .alignment(Alignment::Center);
                title.render(chunks[0], buf);

                if self.show_live_score {
                    Paragraph::new(score_line(session.score().as_ref(), bold_style))
                        .alignment(Alignment::Center)
                        .render(chunks[2], buf);
                }

                if session.phase() == Phase::Loading {
                    Paragraph::new(Span::styled(LOADING, dim_bold_style))
                        .alignment(Alignment::Center)
                        .render(chunks[1], buf);
                    return;
                }

                let mut builder = LineBuilder::new();
                for entry in session.typed() {
                    let style = if entry.correct {
                        green_bold_style
                    } else {
                        red_bold_style
                    };
                    builder.push(entry.key, style);
                }
                if let Some(current) = session.current() {
                    builder.push(current, underlined_dim_bold_style);
                }
                if let Some(remaining) = session.remaining_text() {
                    for c in remaining.chars() {
                        builder.push(c, dim_bold_style);
                    }
                }
                let lines = builder.finish();

                let width = excerpt_width(&self.excerpt.text)
                    .max(1)
                    .min(chunks[1].width);
                let text_area = centered(chunks[1], width, wrapped_height(&lines, width));
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(text_area, buf);

                if !session.is_focused() {
                    // bottom of the text area, so short excerpts stay visible
                    let band = Rect {
                        y: chunks[1].y + chunks[1].height.saturating_sub(4),
                        height: chunks[1].height.min(4),
                        ..chunks[1]
                    };
                    let popup_area = centered(band, PAUSED_SUBTEXT.width() as u16 + 4, 4);
                    Clear.render(popup_area, buf);
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            PAUSED_MESSAGE,
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(PAUSED_SUBTEXT, italic_style)),
                    ])
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: true })
                    .render(popup_area, buf);
                }
            }
            AppState::Results => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(1),    // chart
                        Constraint::Length(1), // summary
                        Constraint::Length(1), // score fields
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let elapsed_secs = session.elapsed().as_secs_f64();
                let (overall_duration, highest_wpm) =
                    charting::compute_chart_params(self.series.points(), elapsed_secs);

                let tuples: Vec<(f64, f64)> =
                    self.series.points().iter().copied().map(Into::into).collect();
                let datasets = vec![Dataset::default()
                    .marker(Marker::Braille)
                    .style(magenta_style)
                    .graph_type(GraphType::Line)
                    .data(&tuples)];

                let chart = Chart::new(datasets)
                    .x_axis(
                        Axis::default()
                            .title("seconds")
                            .bounds([1.0, overall_duration])
                            .labels(vec![
                                Span::styled("1", bold_style),
                                Span::styled(charting::format_label(overall_duration), bold_style),
                            ]),
                    )
                    .y_axis(
                        Axis::default()
                            .title("wpm")
                            .bounds([0.0, highest_wpm])
                            .labels(vec![
                                Span::styled("0", bold_style),
                                Span::styled(charting::format_label(highest_wpm), bold_style),
                            ]),
                    );

                chart.render(chunks[0], buf);

                if let Some(score) = session.score() {
                    Paragraph::new(Span::styled(
                        format!("{}   {:.1}s", score, elapsed_secs),
                        bold_style,
                    ))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);
                }

                Paragraph::new(score_line(session.score().as_ref(), dim_bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    "(r)etry / (n)ew / (backspace) fix / (esc)ape",
                    italic_style,
                ))
                .render(chunks[4], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::App, clock::ManualClock, config::Config, excerpt::ExcerptSource,
        runtime::AppEvent,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn create_test_app(prompt: &str) -> App<ManualClock> {
        App::with_clock(
            ExcerptSource::Prompt(prompt.to_string()),
            &Config::default(),
            ManualClock::new(),
        )
        .unwrap()
    }

    fn type_str(app: &mut App<ManualClock>, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            app.on_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        }
    }

    fn rendered(app: &App<ManualClock>, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_line_builder_breaks_on_newline() {
        let mut builder = LineBuilder::new();
        for c in "a b\nc".chars() {
            builder.push(c, Style::default());
        }
        let lines = builder.finish();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "a˽b⏎");
        assert_eq!(lines[1].to_string(), "c");
    }

    #[test]
    fn test_excerpt_width() {
        assert_eq!(excerpt_width("ab\nabcd\n"), 5);
        assert_eq!(excerpt_width(""), 0);
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("x".repeat(25)), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 10), 5);
        assert_eq!(wrapped_height(&lines, 25), 3);
    }

    #[test]
    fn test_long_line_wraps_into_view() {
        let mut app = create_test_app(&format!("{}END", "x".repeat(150)));
        app.on_event(AppEvent::FocusGained);

        let out = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(out.contains("END"));
        assert_eq!(out.matches('x').count(), 150);
    }

    #[test]
    fn test_centered_clamps() {
        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(centered(area, 4, 2), Rect::new(3, 1, 4, 2));
        assert_eq!(centered(area, 40, 20), area);
    }

    #[test]
    fn test_typing_view_shows_excerpt_with_glyphs() {
        let app = create_test_app("let x = 1;");
        let out = rendered(&app, Rect::new(0, 0, 80, 24));

        assert!(out.contains("let˽x˽=˽1;"));
        assert!(out.contains(PAUSED_MESSAGE));
    }

    #[test]
    fn test_typing_view_focused_has_no_popup() {
        let mut app = create_test_app("fn main() {}");
        app.on_event(AppEvent::FocusGained);
        type_str(&mut app, "fn");

        let out = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(!out.contains(PAUSED_MESSAGE));
        assert!(out.contains("fn˽main()"));
        assert!(out.contains("correct"));
    }

    #[test]
    fn test_results_view() {
        let mut app = create_test_app("ok");
        app.on_event(AppEvent::FocusGained);
        type_str(&mut app, "ok");

        let out = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(out.contains("(r)etry"));
        assert!(out.contains("100% acc"));
    }

    #[test]
    fn test_loading_view() {
        let mut app = create_test_app("abc");
        app.session.reset();

        let out = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(out.contains(LOADING));
        assert!(out.contains("-- correct"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = create_test_app("hello\nworld");
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);

        assert!(*buffer.area() == area);
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 2);
    }
}
