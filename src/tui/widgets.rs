use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Single or multi line text input with a label and required marker.
pub fn text_input<'a>(label: &'a str, value: &'a str, required: bool, focused: bool) -> Paragraph<'a> {
    let mut title = vec![Span::raw(format!(" {label}"))];
    if required {
        title.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    title.push(Span::raw(" "));

    let cursor = if focused { "_" } else { "" };
    let mut lines: Vec<Line> = value.split('\n').map(|l| Line::from(l.to_string())).collect();
    if let Some(last) = lines.last_mut() {
        last.spans.push(Span::styled(cursor, Style::default().fg(Color::LightBlue)));
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(Line::from(title))
                .borders(Borders::ALL)
                .border_style(border_style(focused)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
}

pub fn checkbox(label: &str, checked: bool, focused: bool) -> Paragraph<'static> {
    let mark = if checked { "[x]" } else { "[ ]" };
    let style = if focused {
        Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!(" {mark} "), style),
        Span::styled(label.to_string(), style),
    ]))
}

pub fn button(label: &str, color: Color, disabled: bool, focused: bool) -> Paragraph<'static> {
    let style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
    };
    let style = if focused {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    };
    Paragraph::new(format!("  {label}  "))
        .style(style)
        .alignment(ratatui::layout::Alignment::Center)
}
