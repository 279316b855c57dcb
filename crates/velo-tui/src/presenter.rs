use ratatui::text::Line;
use velo_core::decision_tree::DecisionNode;
use velo_core::{Presenter, Progress};

use crate::markup;

#[derive(Debug, Clone)]
pub enum Turn {
    User(String),
    Assistant(Vec<Line<'static>>),
}

/// What the wizard popup shows for the current question.
#[derive(Debug, Clone)]
pub struct WizardView {
    pub title: String,
    pub options: Vec<String>,
    pub progress: Progress,
    pub selected: usize,
}

impl WizardView {
    pub fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }
}

/// Screen state the controller writes into and `ui::render` reads from.
#[derive(Debug, Default)]
pub struct TuiPresenter {
    pub turns: Vec<Turn>,
    pub loading: bool,
    pub error: Option<String>,
    pub wizard: Option<WizardView>,
}

impl Presenter for TuiPresenter {
    fn render_user_turn(&mut self, text: &str) {
        self.turns.push(Turn::User(text.to_string()));
    }

    fn render_assistant_turn(&mut self, html: &str) {
        self.turns.push(Turn::Assistant(markup::to_lines(html)));
    }

    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn show_wizard(&mut self, node: &DecisionNode, progress: Progress) {
        self.wizard = Some(WizardView {
            title: node.title.clone(),
            options: node.options.iter().map(|o| o.label.clone()).collect(),
            progress,
            selected: 0,
        });
    }

    fn close_wizard(&mut self) {
        self.wizard = None;
    }
}
