use std::sync::OnceLock;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use regex::Regex;

use crate::app::{App, Popup, Screen, View};
use crate::editor::{Editor, Field};
use crate::models::{Article, FlashKind};

use super::widgets::{button, checkbox, text_input};

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::List => render_list_screen(frame, app),
        Screen::Detail => render_detail_screen(frame, app),
        Screen::Editor => match &app.editor {
            Some(editor) => render_editor(frame, app, editor),
            None => render_list_screen(frame, app),
        },
    }

    match &app.popup {
        Popup::None => {}
        Popup::Help => render_help(frame),
        Popup::TagFilter(input) => render_tag_prompt(frame, input),
        Popup::ConfirmDelete(uid) => render_confirm_delete(frame, app, uid),
    }

    render_flash_messages(frame, app);
}

fn render_list_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Article list
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_article_list(frame, app, chunks[1]);
    render_list_status(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mode = if app.is_admin { " [admin]" } else { "" };
    let title = format!(" Blog [{}]{mode} ", app.view.label());
    let stats = format!(" {} Articles", app.articles.articles.len());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_article_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .articles
        .articles
        .iter()
        .map(|article| {
            let heart = if app.is_liked(&article.uid) { "♥" } else { "♡" };
            let slide = if article.is_add_slide_show { "▣ " } else { "  " };
            let tags = if article.tag_ids.is_empty() {
                String::new()
            } else {
                format!(" #{}", article.tag_ids.join(" #"))
            };

            let line = Line::from(vec![
                Span::styled(slide, Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{} ", article.date.format("%Y-%m-%d")),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled(article.title.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!(" {heart} {}", article.good_count),
                    Style::default().fg(Color::Red),
                ),
                Span::styled(tags, Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let empty = app.articles.articles.is_empty() && !app.is_busy();
    let block = Block::default().borders(Borders::ALL);
    if empty {
        let paragraph = Paragraph::new(" No articles here yet.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_list_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_busy() {
        format!("{} Loading...", app.spinner())
    } else {
        let more = if app.view == View::Latest && app.articles.has_more {
            "  n:more"
        } else {
            ""
        };
        let admin = if app.is_admin { "  c:new  e:edit  d:delete  4:all" } else { "" };
        format!("j/k:nav  Enter:open  1:latest  2:popular  3:slides  t:tag  g:like{more}{admin}  ?:help  q:quit")
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_detail_screen(frame: &mut Frame, app: &App) {
    let Some(article) = app.articles.current.as_ref() else {
        let text = format!(" {} Loading article...", app.spinner());
        frame.render_widget(Paragraph::new(text), frame.area());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + subtitle
            Constraint::Length(1), // Meta line
            Constraint::Min(0),    // Content
            Constraint::Length(2), // Prev / next
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    let block = Block::default()
        .title(" Article ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let heading = Paragraph::new(vec![
        Line::styled(article.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::styled(article.sub_title.clone(), Style::default().fg(Color::Gray)),
    ])
    .block(block)
    .wrap(Wrap { trim: true });
    frame.render_widget(heading, chunks[0]);

    render_meta(frame, app, article, chunks[1]);

    let content_block = Block::default().borders(Borders::ALL);
    let width = content_block.inner(chunks[2]).width.max(10) as usize;
    let content = Paragraph::new(render_markdown(&article.content, width)).block(content_block);
    frame.render_widget(content, chunks[2]);

    let title_of = |a: Option<&Article>| {
        a.map(|a| a.title.clone())
            .unwrap_or_else(|| "—".to_string())
    };
    let nav = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" [ older: ", Style::default().fg(Color::DarkGray)),
            Span::raw(title_of(app.articles.prev.as_ref())),
        ]),
        Line::from(vec![
            Span::styled(" ] newer: ", Style::default().fg(Color::DarkGray)),
            Span::raw(title_of(app.articles.next.as_ref())),
        ]),
    ]);
    frame.render_widget(nav, chunks[3]);

    let status = if app.is_busy() {
        format!("{} Loading...", app.spinner())
    } else {
        "Esc:back  [/]:older/newer  g:like  o:thumbnail  t:tag  e:edit  d:delete".to_string()
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn render_meta(frame: &mut Frame, app: &App, article: &Article, area: Rect) {
    let heart = if app.is_liked(&article.uid) { "♥" } else { "♡" };
    let mut spans = vec![
        Span::styled(
            format!(" {} ", article.date.format("%Y-%m-%d")),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(
            format!(" {heart} {} ", article.good_count),
            Style::default().fg(Color::Red),
        ),
    ];
    for tag in &article.tag_ids {
        spans.push(Span::styled(format!(" #{tag}"), Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(
        format!("  {}", article.thumbnail_image_path),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid heading regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid bullet regex"))
}

/// Wraps markdown content to `width`, styling headings and list items.
pub fn render_markdown(content: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for raw in content.lines() {
        if let Some(caps) = heading_re().captures(raw) {
            let style = if caps[1].len() == 1 {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            for part in textwrap::wrap(&caps[2], width) {
                lines.push(Line::styled(part.into_owned(), style));
            }
        } else if let Some(caps) = bullet_re().captures(raw) {
            let wrapped = textwrap::wrap(&caps[1], width.saturating_sub(2).max(1));
            for (i, part) in wrapped.into_iter().enumerate() {
                let marker = if i == 0 { "• " } else { "  " };
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::raw(part.into_owned()),
                ]));
            }
        } else if raw.trim().is_empty() {
            lines.push(Line::default());
        } else {
            for part in textwrap::wrap(raw, width) {
                lines.push(Line::raw(part.into_owned()));
            }
        }
    }
    lines
}

fn render_editor(frame: &mut Frame, app: &App, editor: &Editor) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Heading
            Constraint::Length(3), // Tags
            Constraint::Length(3), // Title
            Constraint::Length(3), // Subtitle
            Constraint::Length(3), // Date
            Constraint::Length(3), // Thumbnail
            Constraint::Length(1), // Slideshow
            Constraint::Min(5),    // Content
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    let heading = if editor.is_create() {
        " Write an article"
    } else {
        " Edit article"
    };
    frame.render_widget(
        Paragraph::new(heading).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let focused = |field: Field| editor.focus == field;
    frame.render_widget(
        text_input("Tags (comma separated, up to 5)", &editor.tags_input, true, focused(Field::Tags)),
        chunks[1],
    );
    frame.render_widget(text_input("Title", &editor.title, true, focused(Field::Title)), chunks[2]);
    frame.render_widget(
        text_input("Subtitle", &editor.sub_title, true, focused(Field::SubTitle)),
        chunks[3],
    );
    frame.render_widget(
        text_input("Date (YYYY-MM-DD)", &editor.date_input, true, focused(Field::Date)),
        chunks[4],
    );
    frame.render_widget(
        text_input(
            "Thumbnail image path",
            &editor.thumbnail_image_path,
            true,
            focused(Field::Thumbnail),
        ),
        chunks[5],
    );
    frame.render_widget(
        checkbox(
            "Show in the slideshow (wide images work best)",
            editor.is_add_slide_show,
            focused(Field::SlideShow),
        ),
        chunks[6],
    );
    frame.render_widget(
        text_input("Content (markdown)", &editor.content, true, focused(Field::Content)),
        chunks[7],
    );

    let disabled = editor.is_disabled();
    let submit_label = if editor.is_create() { "Create" } else { "Update" };
    if editor.is_create() {
        frame.render_widget(
            button(submit_label, Color::LightBlue, disabled, focused(Field::Submit)),
            chunks[8],
        );
    } else {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(chunks[8]);
        frame.render_widget(
            button(submit_label, Color::LightBlue, disabled, focused(Field::Submit)),
            halves[0],
        );
        frame.render_widget(
            button("Delete", Color::Red, false, focused(Field::Delete)),
            halves[1],
        );
    }

    let status = if app.is_busy() {
        format!("{} Saving...", app.spinner())
    } else {
        "Tab/Shift-Tab:move  Enter:newline/toggle/press  Space:toggle  Ctrl-S:submit  Esc:close".to_string()
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        chunks[9],
    );
}

fn render_flash_messages(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = area.width.min(50);
    let x = area.x + area.width.saturating_sub(width);

    for (i, message) in app.flash.messages.iter().enumerate() {
        let y = area.y + 1 + i as u16 * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let color = match message.kind {
            FlashKind::Success => Color::Green,
            FlashKind::Info => Color::Yellow,
            FlashKind::Error => Color::Red,
        };
        let rect = Rect::new(x, y, width, 3);
        let paragraph = Paragraph::new(message.message.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .style(Style::default().fg(Color::White));
        frame.render_widget(Clear, rect);
        frame.render_widget(paragraph, rect);
    }
}

fn render_tag_prompt(frame: &mut Frame, input: &str) {
    let area = centered_rect(50, 20, frame.area());

    let block = Block::default()
        .title(" Filter by tag (empty for latest) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    // Clear the area first
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let input_text = format!("> {input}_");
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_confirm_delete(frame: &mut Frame, app: &App, uid: &str) {
    let area = centered_rect(50, 20, frame.area());
    let title = app
        .articles
        .articles
        .iter()
        .chain(app.articles.current.iter())
        .find(|a| a.uid == uid)
        .map(|a| a.title.as_str())
        .unwrap_or("this article");

    let block = Block::default()
        .title(" Delete article ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(format!("Delete \"{title}\"? This cannot be undone.\n\n y: delete   n: keep"))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Lists:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   Enter    Open article",
        "   1 2 3    Latest / popular / slideshow",
        "   t        Filter by tag",
        "   n        Load older articles",
        "   g        Like / unlike",
        "   o        Open thumbnail",
        "",
        " Article:",
        "   [ / ]    Older / newer article",
        "   Esc      Back to the list",
        "",
        " Admin (--admin):",
        "   c        New article",
        "   e        Edit article",
        "   d        Delete article",
        "   4        All articles",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
