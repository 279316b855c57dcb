use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use velo_core::{SubmitOutcome, WizardOutcome};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Quick action index for the keys 1-9.
fn digit_index(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    app.status = None;

    if app.show_consent {
        handle_consent(app, key);
    } else if app.presenter().wizard.is_some() {
        handle_wizard(app, key);
    } else {
        match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, key),
            InputMode::Editing => handle_editing_mode(app, key),
        }
    }
}

fn handle_consent(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('j') | KeyCode::Enter => {
            app.controller.grant_consent();
            app.show_consent = false;
            app.status = Some("Zustimmung gespeichert. Du kannst jetzt schreiben.".to_string());
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.show_consent = false;
        }
        _ => {}
    }
}

fn report(app: &mut App, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Dispatched => app.scroll_to_bottom(),
        SubmitOutcome::ConsentRequired => app.show_consent = true,
        SubmitOutcome::Busy => {
            app.status = Some("Bitte warte, bis die Antwort da ist.".to_string());
        }
        SubmitOutcome::Empty => {}
    }
}

fn handle_wizard(app: &mut App, key: KeyEvent) {
    let choice = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(view) = app.controller.presenter_mut().wizard.as_mut() {
                view.select_next();
            }
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(view) = app.controller.presenter_mut().wizard.as_mut() {
                view.select_prev();
            }
            None
        }
        KeyCode::Enter => app.presenter().wizard.as_ref().map(|view| view.selected),
        code @ KeyCode::Char('1'..='9') => digit_index(code),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            app.controller.wizard_back();
            None
        }
        KeyCode::Esc => {
            app.controller.close_wizard();
            None
        }
        _ => None,
    };

    let Some(index) = choice else {
        return;
    };

    match app.controller.wizard_select_index(index) {
        Ok(WizardOutcome::Submitted(outcome)) => report(app, outcome),
        Ok(WizardOutcome::Blocked(outcome)) => report(app, outcome),
        Ok(WizardOutcome::Advanced) | Ok(WizardOutcome::NotOpen) => {}
        Err(e) => tracing::debug!(error = %e, "ignored wizard key"),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('w') => app.controller.open_wizard(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('G') => app.scroll_to_bottom(),
        code => {
            if let Some(index) = digit_index(code) {
                if let Some(outcome) = app.controller.quick_action(index) {
                    report(app, outcome);
                }
            }
        }
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let outcome = app.controller.submit(&app.input);
            // The text stays in the box when it could not be sent.
            if matches!(outcome, SubmitOutcome::Dispatched | SubmitOutcome::Empty) {
                app.take_input();
            }
            report(app, outcome);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}
