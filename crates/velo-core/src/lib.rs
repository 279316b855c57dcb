pub mod ai;
pub mod config;
pub mod consent;
pub mod controller;
pub mod conversation;
pub mod decision_tree;
pub mod error;
pub mod markdown;
pub mod orchestrator;
pub mod presenter;
pub mod quick_actions;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatApiClient, CompletionBackend};
pub use config::Config;
pub use consent::{ConsentGate, StoredConsent};
pub use controller::{ChatController, WizardOutcome};
pub use conversation::ConversationStore;
pub use decision_tree::{DecisionTree, Progress, Wizard};
pub use error::{ChatError, ConfigError, ConfigurationError, WizardError, USER_FACING_ERROR};
pub use orchestrator::{RequestOrchestrator, RequestState, SubmitOutcome};
pub use presenter::Presenter;
pub use quick_actions::QuickAction;
pub use state::{ChatMessage, ChatRole, Citation, CompletionReply, CompletionRequest};
