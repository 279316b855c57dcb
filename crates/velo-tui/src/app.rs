use std::sync::Arc;

use tokio::task::JoinHandle;
use velo_core::{ChatApiClient, ChatController, Config, StoredConsent};

use crate::presenter::{TuiPresenter, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: ChatController<TuiPresenter>,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript, for scroll calculations
    pub chat_width: u16,  // inner width of the transcript, for wrap calculations

    // Popups and status
    pub show_consent: bool,
    pub status: Option<String>,

    // Backend
    pub endpoint: String,
    pub backend_healthy: Option<bool>,
    pub health_task: Option<JoinHandle<bool>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let endpoint = config.endpoint();
        let client = ChatApiClient::new(&endpoint);
        let tree = config.decision_tree()?;
        let quick_actions = config.quick_actions();

        let health_client = client.clone();
        let health_task = tokio::spawn(async move { health_client.health().await });

        let controller = ChatController::new(Arc::new(client), tree, TuiPresenter::default())
            .with_quick_actions(quick_actions)
            .with_consent_gate(Box::new(StoredConsent::new(config)));

        tracing::info!(%endpoint, "chat client ready");

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            controller,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            show_consent: false,
            status: None,
            endpoint,
            backend_healthy: None,
            health_task: Some(health_task),
            animation_frame: 0,
        })
    }

    /// Build an app around a tree that is already loaded; used by tests.
    #[cfg(test)]
    pub fn with_tree(tree: velo_core::DecisionTree, endpoint: &str) -> Self {
        let client = ChatApiClient::new(endpoint);
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            controller: ChatController::new(Arc::new(client), tree, TuiPresenter::default()),
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            show_consent: false,
            status: None,
            endpoint: endpoint.to_string(),
            backend_healthy: None,
            health_task: None,
            animation_frame: 0,
        }
    }

    pub fn presenter(&self) -> &TuiPresenter {
        self.controller.presenter()
    }

    /// Apply a finished completion and a finished health check, if any.
    pub async fn poll(&mut self) {
        if self.controller.poll().await {
            self.scroll_to_bottom();
        }

        if self.health_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.health_task.take() {
                let healthy = task.await.unwrap_or(false);
                tracing::info!(healthy, "backend health checked");
                self.backend_healthy = Some(healthy);
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.presenter().loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn take_input(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    /// Scroll the transcript so the last turn (or "Denke nach...") is visible.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let wrapped = |chars: usize| -> u16 {
            if chars == 0 {
                1
            } else {
                u16::try_from(chars / wrap_width + 1).unwrap_or(u16::MAX)
            }
        };

        // Saturates; a transcript taller than u16::MAX lines just pins to the end.
        let mut total_lines: u16 = 0;
        for turn in &self.presenter().turns {
            total_lines = total_lines.saturating_add(1); // Role line
            match turn {
                Turn::User(text) => {
                    for line in text.lines() {
                        total_lines = total_lines.saturating_add(wrapped(line.chars().count()));
                    }
                }
                Turn::Assistant(lines) => {
                    for line in lines {
                        total_lines = total_lines.saturating_add(wrapped(line.width()));
                    }
                }
            }
            total_lines = total_lines.saturating_add(1); // Blank line after each turn
        }

        if self.presenter().loading {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use velo_core::DecisionTree;

    #[test]
    fn test_scroll_to_bottom_saturates_on_huge_transcripts() {
        let mut app = App::with_tree(DecisionTree::builtin().unwrap(), "http://127.0.0.1:9");
        app.chat_width = 10;
        app.chat_height = 20;

        let long = "x".repeat(5_000);
        let turns = &mut app.controller.presenter_mut().turns;
        for _ in 0..200 {
            turns.push(Turn::User(long.clone()));
        }
        app.controller.presenter_mut().loading = true;

        app.scroll_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX - 20);
    }

    #[test]
    fn test_scroll_to_bottom_stays_at_top_when_everything_fits() {
        let mut app = App::with_tree(DecisionTree::builtin().unwrap(), "http://127.0.0.1:9");
        app.chat_width = 40;
        app.chat_height = 20;
        app.controller
            .presenter_mut()
            .turns
            .push(Turn::User("Hallo".into()));

        app.scroll_to_bottom();
        assert_eq!(app.chat_scroll, 0);
    }
}
