//! Single owner of every piece of session state.
//!
//! Event handlers get `&mut ChatController` and nothing else: the chat
//! pipeline (orchestrator and its conversation), the live wizard, the
//! consent gate and the presenter all hang off it.

use std::sync::Arc;

use crate::ai::CompletionBackend;
use crate::consent::ConsentGate;
use crate::conversation::ConversationStore;
use crate::decision_tree::{DecisionTree, Step, Wizard};
use crate::error::WizardError;
use crate::orchestrator::{RequestOrchestrator, RequestState, SubmitOutcome};
use crate::presenter::Presenter;
use crate::quick_actions::QuickAction;
use crate::state::Citation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    /// No wizard is open.
    NotOpen,
    /// Moved on to the next question.
    Advanced,
    /// The composed prompt was handed to submit; the wizard is gone.
    Submitted(SubmitOutcome),
    /// The final answer could not be submitted yet. The wizard stays on its
    /// last question with that answer undone.
    Blocked(SubmitOutcome),
}

pub struct ChatController<P: Presenter> {
    orchestrator: RequestOrchestrator,
    tree: Arc<DecisionTree>,
    wizard: Option<Wizard>,
    consent: Option<Box<dyn ConsentGate + Send>>,
    quick_actions: Vec<QuickAction>,
    presenter: P,
}

impl<P: Presenter> ChatController<P> {
    pub fn new(backend: Arc<dyn CompletionBackend>, tree: DecisionTree, presenter: P) -> Self {
        Self {
            orchestrator: RequestOrchestrator::new(backend),
            tree: Arc::new(tree),
            wizard: None,
            consent: None,
            quick_actions: QuickAction::builtin(),
            presenter,
        }
    }

    pub fn with_consent_gate(mut self, gate: Box<dyn ConsentGate + Send>) -> Self {
        self.consent = Some(gate);
        self
    }

    pub fn with_quick_actions(mut self, quick_actions: Vec<QuickAction>) -> Self {
        self.quick_actions = quick_actions;
        self
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn state(&self) -> RequestState {
        self.orchestrator.state()
    }

    pub fn conversation(&self) -> &ConversationStore {
        self.orchestrator.conversation()
    }

    pub fn last_citations(&self) -> &[Citation] {
        self.orchestrator.last_citations()
    }

    pub fn quick_actions(&self) -> &[QuickAction] {
        &self.quick_actions
    }

    pub fn wizard(&self) -> Option<&Wizard> {
        self.wizard.as_ref()
    }

    pub fn consent_granted(&self) -> bool {
        self.consent.as_ref().map_or(true, |gate| gate.is_granted())
    }

    pub fn grant_consent(&mut self) {
        if let Some(gate) = self.consent.as_mut() {
            gate.grant();
            tracing::info!("consent granted");
        }
    }

    /// Submit a typed message.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if let Some(refused) = self.refusal() {
            return refused;
        }
        self.orchestrator.submit(text, &mut self.presenter)
    }

    /// Submit the quick action at `index`. `None` if there is no such action.
    pub fn quick_action(&mut self, index: usize) -> Option<SubmitOutcome> {
        let prompt = self.quick_actions.get(index)?.prompt.clone();
        Some(self.submit(&prompt))
    }

    /// Open the wizard at the start node, or re-show the one already open.
    pub fn open_wizard(&mut self) {
        let wizard = self
            .wizard
            .get_or_insert_with(|| Wizard::new(Arc::clone(&self.tree)));
        self.presenter
            .show_wizard(wizard.current_node(), wizard.progress());
    }

    pub fn wizard_select(&mut self, value: &str) -> Result<WizardOutcome, WizardError> {
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(WizardOutcome::NotOpen);
        };

        match wizard.select(value)? {
            Step::Advanced(_) => {
                self.presenter
                    .show_wizard(wizard.current_node(), wizard.progress());
                Ok(WizardOutcome::Advanced)
            }
            Step::Completed(completion) => {
                if let Some(refused) = self.refusal() {
                    return Ok(WizardOutcome::Blocked(refused));
                }
                self.wizard = None;
                self.presenter.close_wizard();
                let outcome = self.orchestrator.submit(&completion.prompt, &mut self.presenter);
                Ok(WizardOutcome::Submitted(outcome))
            }
        }
    }

    pub fn wizard_select_index(&mut self, index: usize) -> Result<WizardOutcome, WizardError> {
        let value = match self.wizard.as_ref() {
            None => return Ok(WizardOutcome::NotOpen),
            Some(wizard) => match wizard.current_node().options.get(index) {
                Some(option) => option.value.clone(),
                None => {
                    return Err(WizardError::UnknownOption {
                        node: wizard.current_node().key.clone(),
                        value: format!("#{}", index),
                    })
                }
            },
        };
        self.wizard_select(&value)
    }

    /// Step back one question. False when there is nothing to undo.
    pub fn wizard_back(&mut self) -> bool {
        let Some(wizard) = self.wizard.as_mut() else {
            return false;
        };
        let moved = wizard.back();
        if moved {
            self.presenter
                .show_wizard(wizard.current_node(), wizard.progress());
        }
        moved
    }

    /// Abandon the wizard. Nothing is submitted.
    pub fn close_wizard(&mut self) {
        if self.wizard.take().is_some() {
            tracing::debug!("wizard closed without submitting");
        }
        self.presenter.close_wizard();
    }

    /// Apply the in-flight completion if it has finished.
    pub async fn poll(&mut self) -> bool {
        self.orchestrator.poll(&mut self.presenter).await
    }

    /// Wait for the in-flight completion.
    pub async fn settle(&mut self) -> bool {
        self.orchestrator.settle(&mut self.presenter).await
    }

    /// Why a submit would be refused right now, if it would.
    fn refusal(&mut self) -> Option<SubmitOutcome> {
        if let Some(gate) = self.consent.as_mut() {
            if !gate.is_granted() {
                tracing::warn!("submit refused until consent is given");
                gate.request_consent();
                return Some(SubmitOutcome::ConsentRequired);
            }
        }
        if self.orchestrator.is_loading() {
            return Some(SubmitOutcome::Busy);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_tree::{DecisionNode, Progress};
    use crate::error::ChatError;
    use crate::state::{CompletionReply, CompletionRequest};
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, ChatError> {
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(CompletionReply {
                response: format!("echo: {}", last),
                citations: Vec::new(),
            })
        }
    }

    #[derive(Default)]
    struct Screen {
        turns: Vec<String>,
        wizard_titles: Vec<String>,
        wizard_open: bool,
    }

    impl Presenter for Screen {
        fn render_user_turn(&mut self, text: &str) {
            self.turns.push(text.to_string());
        }
        fn render_assistant_turn(&mut self, html: &str) {
            self.turns.push(html.to_string());
        }
        fn show_loading(&mut self) {}
        fn hide_loading(&mut self) {}
        fn show_error(&mut self, _message: &str) {}
        fn hide_error(&mut self) {}
        fn show_wizard(&mut self, node: &DecisionNode, _progress: Progress) {
            self.wizard_open = true;
            self.wizard_titles.push(node.title.clone());
        }
        fn close_wizard(&mut self) {
            self.wizard_open = false;
        }
    }

    struct Denied {
        asked: bool,
    }

    impl ConsentGate for Denied {
        fn is_granted(&self) -> bool {
            false
        }
        fn request_consent(&mut self) {
            self.asked = true;
        }
        fn grant(&mut self) {}
    }

    const TREE: &str = r#"{
        "start": "a",
        "nodes": [
            {"id": "a", "title": "Wofür?", "options": [{"value": "x", "label": "Stadt", "next": "b"}]},
            {"id": "b", "title": "Budget?", "options": [{"value": "y", "label": "bis 1000 €", "terminal": true}]}
        ]
    }"#;

    fn controller() -> ChatController<Screen> {
        let tree = DecisionTree::from_json(TREE).unwrap();
        ChatController::new(Arc::new(Echo), tree, Screen::default())
    }

    #[tokio::test]
    async fn test_quick_action_submits_its_prompt() {
        let mut controller = controller().with_quick_actions(vec![QuickAction::new("Test", "Hallo Rad")]);

        assert_eq!(controller.quick_action(0), Some(SubmitOutcome::Dispatched));
        assert!(controller.settle().await);
        assert_eq!(controller.presenter().turns, vec!["Hallo Rad", "echo: Hallo Rad"]);
        assert_eq!(controller.quick_action(1), None);
    }

    #[test]
    fn test_wizard_calls_without_wizard_are_no_ops() {
        let mut controller = controller();
        assert_eq!(controller.wizard_select("x").unwrap(), WizardOutcome::NotOpen);
        assert_eq!(controller.wizard_select_index(0).unwrap(), WizardOutcome::NotOpen);
        assert!(!controller.wizard_back());
    }

    #[test]
    fn test_open_wizard_is_idempotent() {
        let mut controller = controller();
        controller.open_wizard();
        controller.wizard_select("x").unwrap();
        controller.open_wizard();

        assert_eq!(controller.wizard().map(|w| w.selections().len()), Some(1));
        assert_eq!(controller.presenter().wizard_titles, vec!["Wofür?", "Budget?", "Budget?"]);
    }

    #[test]
    fn test_unknown_wizard_option_is_rejected() {
        let mut controller = controller();
        controller.open_wizard();
        assert!(controller.wizard_select("nope").is_err());
        assert!(controller.wizard_select_index(5).is_err());
        assert_eq!(controller.wizard().map(|w| w.selections().len()), Some(0));
    }

    #[tokio::test]
    async fn test_wizard_completion_submits_prompt_and_closes() {
        let mut controller = controller();
        controller.open_wizard();
        controller.wizard_select("x").unwrap();
        let outcome = controller.wizard_select("y").unwrap();

        assert_eq!(outcome, WizardOutcome::Submitted(SubmitOutcome::Dispatched));
        assert!(controller.wizard().is_none());
        assert!(!controller.presenter().wizard_open);

        controller.settle().await;
        let first = &controller.conversation().all()[0];
        assert!(first.content.contains("Wofür?: Stadt\n"));
        assert!(first.content.contains("Budget?: bis 1000 €\n"));
    }

    #[test]
    fn test_denied_consent_blocks_submit_and_asks() {
        let mut controller = controller().with_consent_gate(Box::new(Denied { asked: false }));

        assert!(!controller.consent_granted());
        assert_eq!(controller.submit("Hallo"), SubmitOutcome::ConsentRequired);
        assert!(controller.conversation().is_empty());
        assert!(controller.presenter().turns.is_empty());
    }

    #[test]
    fn test_close_wizard_discards_answers() {
        let mut controller = controller();
        controller.open_wizard();
        controller.wizard_select("x").unwrap();
        controller.close_wizard();

        assert!(controller.wizard().is_none());
        assert!(controller.conversation().is_empty());
        controller.open_wizard();
        assert_eq!(controller.wizard().map(|w| w.selections().len()), Some(0));
    }
}
