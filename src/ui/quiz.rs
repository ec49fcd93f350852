use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use super::option_label;
use crate::app::App;
use crate::models::Question;
use crate::session::{CheckResult, QuizSession};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let question = session.current_question();
    let outcome = app.current_outcome();

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_progress(frame, chunks[0], session);
    render_question_text(frame, chunks[1], &question.text);
    render_options(frame, chunks[2], question, app.highlighted_option(), outcome);
    render_feedback(frame, chunks[3], question, outcome, app.banner());
    render_controls(frame, chunks[4], session, outcome.is_some());
}

fn render_progress(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let markers: Vec<Span> = (0..session.total_questions())
        .map(|i| {
            let symbol = if i == session.current_index() { "●" } else { "○" };
            let color = match session.outcome(i) {
                Some(o) if o.is_correct => Color::Green,
                Some(_) => Color::Red,
                None => Color::DarkGray,
            };
            Span::styled(symbol, Style::default().fg(color))
        })
        .collect();

    let progress = format!(
        "  {}/{}",
        session.current_index() + 1,
        session.total_questions()
    );

    let mut spans = markers;
    spans.push(Span::styled(progress, Style::default().fg(Color::DarkGray)));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        area,
    );
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    highlighted: Option<usize>,
    outcome: Option<&CheckResult>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let (marker, style) = match outcome {
            Some(o) if index == o.correct_option_index => {
                ("✓", Style::default().fg(Color::Green).bold())
            }
            Some(o) if index == o.selected_option_index => {
                ("✗", Style::default().fg(Color::Red).bold())
            }
            Some(_) => (" ", Style::default().fg(Color::DarkGray)),
            None if highlighted == Some(index) => (">", Style::default().fg(Color::Cyan).bold()),
            None => (" ", Style::default().fg(Color::Gray)),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_feedback(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    outcome: Option<&CheckResult>,
    banner: Option<&str>,
) {
    let line = if let Some(text) = banner {
        Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Yellow)))
    } else if let Some(o) = outcome {
        if o.is_correct {
            Line::from(Span::styled(
                format!("Correct  ({:.1}s)", o.elapsed_seconds),
                Style::default().fg(Color::Green).bold(),
            ))
        } else {
            Line::from(Span::styled(
                format!(
                    "Incorrect, answer was {}. {}  ({:.1}s)",
                    option_label(o.correct_option_index),
                    question.correct_option().unwrap_or_default(),
                    o.elapsed_seconds
                ),
                Style::default().fg(Color::Red).bold(),
            ))
        }
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &QuizSession, checked: bool) {
    let confirm = if checked && session.is_last() {
        "enter finish"
    } else {
        "enter check"
    };
    let text = format!("j/k choose  ·  {}  ·  h/l move  ·  f finish  ·  q quit", confirm);
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
