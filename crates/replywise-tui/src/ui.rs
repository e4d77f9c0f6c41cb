use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use replywise_core::{Entity, MessageKind, QUICK_REFINEMENTS};

use crate::app::{App, FocusPane, InputMode, NoticeKind};
use crate::form::{FieldKind, Form};
use crate::icons;

/// Keep the selected item of a list visible. `item_height` is the number
/// of rows each item takes.
fn ensure_selected_visible(state: &mut ListState, visible_height: usize, item_height: usize) {
    let visible_items = (visible_height / item_height.max(1)).max(1);

    if let Some(selected) = state.selected() {
        let min_offset = selected.saturating_sub(visible_items - 1);
        let new_offset = state.offset().clamp(min_offset, selected);
        if new_offset != state.offset() {
            *state.offset_mut() = new_offset;
        }
    }
}

/// Word-wrap text to a width, keeping explicit line breaks
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len == 0 {
                current_line = word.to_string();
                current_len = word_len;
            } else if current_len + 1 + word_len <= width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
                current_len = word_len;
            }
        }
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn key_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

fn label_style() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}

fn hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(format!(" {} ", key), key_style()),
        Span::styled(format!(" {} ", label), label_style()),
    ]
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_height = if app.conversation.is_refinement_open() { 8 } else { 7 };

    // Main layout: header, panes, input, status, footer
    let [header_area, body_area, input_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let [roles_area, chat_area, goals_area] = Layout::horizontal([
        Constraint::Percentage(25),
        Constraint::Percentage(50),
        Constraint::Percentage(25),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_roles(app, frame, roles_area);
    render_conversation(app, frame, chat_area);
    render_goals(app, frame, goals_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
    render_footer(app, frame, footer_area);

    if let Some(form) = &app.form {
        render_form(form, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" ReplyWise ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
    ];

    let role = app.conversation.selected_role();
    let goal = app.conversation.selected_goal();
    if role.is_none() && goal.is_none() {
        spans.push(Span::styled(
            "Select a role and goal to start",
            Style::default().fg(Color::Gray),
        ));
    } else {
        let chip = Style::default().bg(Color::Blue).fg(Color::White);
        let missing = Style::default().fg(Color::Gray).italic();
        match role {
            Some(r) => spans.push(Span::styled(format!(" {} {} ", icons::glyph(&r.icon), r.name), chip)),
            None => spans.push(Span::styled("no role", missing)),
        }
        spans.push(Span::raw(" "));
        match goal {
            Some(g) => spans.push(Span::styled(format!(" {} {} ", icons::glyph(&g.icon), g.label), chip)),
            None => spans.push(Span::styled("no goal", missing)),
        }
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("[{}]", app.generator_label),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn star(is_favorite: bool) -> &'static str {
    if is_favorite {
        " ★"
    } else {
        ""
    }
}

fn render_roles(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Roles;
    let active = app.conversation.selected_role().map(|r| r.id.clone());

    let items: Vec<ListItem> = app
        .sorted_roles()
        .into_iter()
        .map(|role| {
            let is_active = active.as_deref() == Some(role.id.as_str());
            let name_style = if is_active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::raw(format!("{} ", icons::glyph(&role.icon))),
                    Span::styled(role.name.clone(), name_style),
                    Span::styled(star(role.is_favorite()), Style::default().fg(Color::Yellow)),
                ]),
                Line::from(Span::styled(
                    format!("   {} · {}", role.tone.display_name(), role.message_length.display_name()),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused)))
                .title(" Roles "),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let visible_height = area.height.saturating_sub(2) as usize;
    ensure_selected_visible(&mut app.role_state, visible_height, 2);
    frame.render_stateful_widget(list, area, &mut app.role_state);
}

fn render_goals(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Goals;
    let active = app.conversation.selected_goal().map(|g| g.id.clone());
    let desc_width = area.width.saturating_sub(7) as usize;

    let items: Vec<ListItem> = app
        .sorted_goals()
        .into_iter()
        .map(|goal| {
            let is_active = active.as_deref() == Some(goal.id.as_str());
            let label_style = if is_active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let description: String = goal.description.chars().take(desc_width).collect();
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::raw(format!("{} ", icons::glyph(&goal.icon))),
                    Span::styled(goal.label.clone(), label_style),
                    Span::styled(star(goal.is_favorite()), Style::default().fg(Color::Yellow)),
                ]),
                Line::from(Span::styled(
                    format!("   {}", description),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused)))
                .title(" Goals "),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let visible_height = area.height.saturating_sub(2) as usize;
    ensure_selected_visible(&mut app.goal_state, visible_height, 2);
    frame.render_stateful_widget(list, area, &mut app.goal_state);
}

fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Conversation;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(" Conversation ");

    let messages = app.conversation.messages();
    if messages.is_empty() && !app.conversation.is_generating() {
        let hint = if app.conversation.selected_role().is_none()
            || app.conversation.selected_goal().is_none()
        {
            "Select a role and goal to start"
        } else {
            "Paste the message you received below"
        };
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled("No conversation yet", Style::default().bold())).centered(),
            Line::default(),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))).centered(),
            Line::from(Span::styled(
                "then press Enter to get a suggested reply",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let selected = app.selected_message_idx();
    let latest = app.conversation.latest_suggestion_index();

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_start = 0;

    for (i, msg) in messages.iter().enumerate() {
        let is_selected = selected == Some(i);
        if is_selected {
            selected_start = lines.len();
        }

        let time = msg
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string();
        let (label, color) = match msg.kind {
            MessageKind::Received => ("Them", Color::Cyan),
            MessageKind::Suggested if latest == Some(i) => ("Suggested reply", Color::Green),
            MessageKind::Suggested => ("Earlier suggestion", Color::Yellow),
        };
        let marker = if is_selected && focused { "> " } else { "  " };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
        ]));

        let body_style = if msg.kind == MessageKind::Suggested && latest == Some(i) {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        for text in wrap_text_to_width(&msg.content, width) {
            lines.push(Line::from(Span::styled(format!("  {}", text), body_style)));
        }
        lines.push(Line::default());
    }

    if app.conversation.is_generating() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("  Drafting{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Follow the bottom unless a message was picked with j/k
    let total = lines.len();
    let scroll = if app.message_idx.is_none() {
        total.saturating_sub(height)
    } else {
        let current = app.chat_scroll as usize;
        if selected_start < current {
            selected_start
        } else if selected_start >= current + height {
            selected_start + 1 - height.max(1)
        } else {
            current
        }
    };
    app.chat_scroll = scroll.min(u16::MAX as usize) as u16;

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let refining = app.conversation.is_refinement_open();
    let editing = app.input_mode == InputMode::Editing;
    let color = if editing {
        Color::Yellow
    } else {
        border_color(app.focus == FocusPane::Input)
    };

    let title = if refining {
        " How should I improve it? "
    } else if app.conversation.messages().is_empty() {
        " Paste the message you received "
    } else {
        " Paste their next message "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_area = if refining {
        let [picks_area, text_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

        let mut picks = Vec::new();
        for (i, instruction) in QUICK_REFINEMENTS.iter().enumerate() {
            picks.push(Span::styled(format!(" {} ", i + 1), key_style()));
            picks.push(Span::styled(format!(" {} ", instruction), Style::default().fg(Color::Gray)));
        }
        frame.render_widget(Paragraph::new(Line::from(picks)), picks_area);
        text_area
    } else {
        inner
    };

    if app.input.is_empty() && !editing {
        let placeholder = if refining {
            "Type an instruction or pick one above"
        } else {
            "Press i to type, or paste with your terminal"
        };
        frame.render_widget(
            Paragraph::new(placeholder).style(Style::default().fg(Color::DarkGray)),
            text_area,
        );
        return;
    }

    // Cursor row and column within the unwrapped input
    let before: String = app.input.chars().take(app.input_cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);

    let height = (text_area.height as usize).max(1);
    let width = (text_area.width as usize).max(1);
    let v_scroll = row.saturating_sub(height - 1);
    let h_scroll = col.saturating_sub(width - 1);

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .scroll((v_scroll as u16, h_scroll as u16));
    frame.render_widget(input, text_area);

    if editing && app.form.is_none() {
        frame.set_cursor_position((
            text_area.x + (col - h_scroll) as u16,
            text_area.y + (row - v_scroll) as u16,
        ));
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => Color::Gray,
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Line::from(Span::styled(format!(" {}", notice.text), Style::default().fg(color)))
        }
        None if app.is_busy() => Line::from(Span::styled(
            " Drafting a reply...",
            Style::default().fg(Color::DarkGray).italic(),
        )),
        None => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.form.is_some() {
        (" DIALOG ", Style::default().bg(Color::Magenta).fg(Color::White))
    } else {
        match app.input_mode {
            InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
            InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        }
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.form.is_some() {
        hints.extend(hint("Tab", "next field"));
        hints.extend(hint("←/→", "change"));
        hints.extend(hint("Enter", "save"));
        hints.extend(hint("Esc", "cancel"));
    } else if app.input_mode == InputMode::Editing {
        hints.extend(hint("Enter", "send"));
        hints.extend(hint("Alt+Enter", "newline"));
        if app.conversation.is_refinement_open() && app.input.is_empty() {
            hints.extend(hint("1-5", "quick pick"));
        }
        hints.extend(hint("Esc", "done"));
    } else {
        match app.focus {
            FocusPane::Roles | FocusPane::Goals => {
                hints.extend(hint("j/k", "nav"));
                hints.extend(hint("Enter", "select"));
                hints.extend(hint("f", "favorite"));
                hints.extend(hint("n", "new"));
                hints.extend(hint("e", "edit"));
                hints.extend(hint("d", "delete"));
            }
            FocusPane::Conversation => {
                hints.extend(hint("j/k", "message"));
                hints.extend(hint("c", "copy"));
                hints.extend(hint("r", "improve"));
                hints.extend(hint("x", "clear"));
            }
            FocusPane::Input => {
                hints.extend(hint("Enter", "type"));
                if app.conversation.is_refinement_open() {
                    hints.extend(hint("1-5", "quick pick"));
                    hints.extend(hint("Esc", "cancel"));
                }
            }
        }
        hints.extend(hint("Tab", "focus"));
        hints.extend(hint("i", "type"));
        hints.extend(hint("q", "quit"));
    }

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style())]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_form(form: &Form, frame: &mut Frame, area: Rect) {
    let rows = form.rows();

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = (rows.len() as u16 * 2 + 4).min(area.height.saturating_sub(2));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(form.title());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let value_width = inner.width.saturating_sub(16) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor = None;

    for (i, (label, value)) in rows.iter().enumerate() {
        let active = i == form.field();
        let label_style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if active { "> " } else { "  " };

        let shown = if form.kind_at(i) == FieldKind::Choice {
            format!("◀ {} ▶", value)
        } else {
            // keep the tail in view while typing
            let count = value.chars().count();
            value.chars().skip(count.saturating_sub(value_width)).collect()
        };

        if active && form.field_kind() == FieldKind::Text {
            let x = inner.x + 14 + shown.chars().count() as u16;
            cursor = Some((x.min(inner.x + inner.width.saturating_sub(1)), inner.y + lines.len() as u16));
        }

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<12}", label), label_style),
            Span::styled(shown, Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Line::default());
    }

    match form.error() {
        Some(error) => lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from(Span::styled(
            "  Enter to save, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use replywise_core::Library;

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrap_text_keeps_line_breaks() {
        let lines = wrap_text_to_width("one two three\n\nfour", 7);
        assert_eq!(lines, vec!["one two", "three", "", "four"]);
    }

    #[test]
    fn test_ensure_selected_visible_with_tall_items() {
        let mut state = ListState::default();
        state.select(Some(5));
        ensure_selected_visible(&mut state, 6, 2);
        assert_eq!(state.offset(), 3);
    }

    #[test]
    fn test_empty_state_prompts_for_role_and_goal() {
        let mut app = App::with_generator(Library::new(), None, "Gateway: test".to_string());
        let screen = draw(&mut app);
        assert!(screen.contains("Select a role and goal to start"));
        assert!(screen.contains("Roles"));
        assert!(screen.contains("Goals"));
    }

    #[test]
    fn test_refinement_shows_quick_picks() {
        let mut app = App::with_generator(Library::new(), None, "Gateway: test".to_string());
        app.conversation.request_regeneration();
        let screen = draw(&mut app);
        assert!(screen.contains("How should I improve it?"));
        assert!(screen.contains("Make it shorter"));
    }

    #[test]
    fn test_form_popup_renders() {
        let mut app = App::with_generator(Library::new(), None, "Gateway: test".to_string());
        app.form = Some(Form::new_goal());
        let screen = draw(&mut app);
        assert!(screen.contains("Create Goal"));
        assert!(screen.contains("Label"));
    }
}
