use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use super::option_label;
use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let index = app.review_index();
    let Some(question) = session.questions().get(index) else {
        return;
    };
    let outcome = session.outcome(index);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    let header = format!("REVIEW  {}/{}", index + 1, session.total_questions());
    frame.render_widget(
        Paragraph::new(header)
            .alignment(Alignment::Right)
            .fg(Color::DarkGray),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(question.text.as_str())
            .wrap(Wrap { trim: true })
            .fg(Color::White)
            .bold(),
        chunks[1],
    );

    let mut lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let chosen = outcome.is_some_and(|o| o.selected_option_index == i);
            let style = if i == question.correct_answer {
                Style::default().fg(Color::Green).bold()
            } else if chosen {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if chosen { "you" } else { "   " };
            Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(format!("{}. ", option_label(i)), style),
                Span::styled(option.as_str(), style),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(match outcome {
        Some(o) => Line::from(
            format!("answered in {:.1}s", o.elapsed_seconds).fg(Color::DarkGray),
        ),
        None => Line::from("not answered".fg(Color::DarkGray)),
    });

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        ),
        chunks[2],
    );

    frame.render_widget(
        Paragraph::new("h/l move  ·  esc results  ·  q quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray),
        chunks[3],
    );
}
