use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FocusPane, InputMode};
use crate::form::FieldKind;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.form.is_some() {
        handle_form(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if let Some(form) = &mut app.form {
        // dialog fields are single line
        for c in text.chars().filter(|c| !c.is_control()) {
            form.push_char(c);
        }
        return;
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
    app.input.insert_str(byte_pos, &text);
    app.input_cursor += text.chars().count();
    app.focus = FocusPane::Input;
    app.input_mode = InputMode::Editing;
}

fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.form = None;
            return;
        }
        KeyCode::Enter => {
            app.submit_form();
            return;
        }
        _ => {}
    }

    let Some(form) = &mut app.form else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(' ') if form.field_kind() == FieldKind::Choice => form.cycle_choice(true),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Roles | FocusPane::Goals => handle_list_normal(app, key),
        FocusPane::Conversation => handle_conversation_normal(app, key),
        FocusPane::Input => handle_input_normal(app, key),
    }
}

fn handle_list_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.list_nav(true),
        KeyCode::Char('k') | KeyCode::Up => app.list_nav(false),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_highlighted(),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('d') => app.delete_highlighted(),
        _ => {}
    }
}

fn handle_conversation_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.message_nav(true),
        KeyCode::Char('k') | KeyCode::Up => app.message_nav(false),
        KeyCode::Char('c') | KeyCode::Char('y') => app.copy_selected_message(),
        KeyCode::Char('r') => app.open_refinement(),
        KeyCode::Char('x') => app.clear_conversation(),
        KeyCode::Char('G') | KeyCode::End => app.message_idx = None,
        _ => {}
    }
}

fn handle_input_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Esc if app.conversation.is_refinement_open() => app.cancel_refinement(),
        KeyCode::Char(c) if app.conversation.is_refinement_open() && app.input.is_empty() => {
            quick_pick(app, c)
        }
        _ => {}
    }
}

/// Digits 1-5 pick a canned refinement instruction
fn quick_pick(app: &mut App, c: char) {
    if let Some(n) = c.to_digit(10) {
        if (1..=5).contains(&n) {
            app.quick_refinement(n as usize - 1);
        }
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.conversation.is_refinement_open() && app.input.is_empty() {
                app.cancel_refinement();
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, '\n');
            app.input_cursor += 1;
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c)
            if app.conversation.is_refinement_open()
                && app.input.is_empty()
                && ('1'..='5').contains(&c) =>
        {
            quick_pick(app, c)
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = app.focus.next();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}
