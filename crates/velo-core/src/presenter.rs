//! What the chat pipeline needs from whatever draws it.

use crate::decision_tree::{DecisionNode, Progress};

/// Display surface driven by the controller.
///
/// Calls arrive in event order. `show_loading` always precedes the network
/// call it announces, and `hide_loading` comes only after that call settles.
pub trait Presenter {
    fn render_user_turn(&mut self, text: &str);
    /// `html` is the output of [`crate::markdown::render`].
    fn render_assistant_turn(&mut self, html: &str);
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn show_error(&mut self, message: &str);
    fn hide_error(&mut self);
    fn show_wizard(&mut self, node: &DecisionNode, progress: Progress);
    fn close_wizard(&mut self);
}
