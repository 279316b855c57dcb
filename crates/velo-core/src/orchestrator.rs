//! Lifecycle of the single outstanding completion request.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::ai::CompletionBackend;
use crate::conversation::ConversationStore;
use crate::error::ChatError;
use crate::markdown;
use crate::presenter::Presenter;
use crate::state::{ChatMessage, Citation, CompletionReply, CompletionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request is now in flight.
    Dispatched,
    /// A request was already in flight; nothing happened.
    Busy,
    /// The consent gate refused; the host should ask for consent.
    ConsentRequired,
    /// Nothing but whitespace was submitted.
    Empty,
}

type PendingCompletion = JoinHandle<Result<CompletionReply, ChatError>>;

/// Owns the conversation and at most one in-flight completion.
///
/// The `Loading` check in [`submit`](Self::submit) is the only backpressure:
/// a request is never cancelled and has no timeout, it holds its task until
/// the backend answers or the transport fails.
pub struct RequestOrchestrator {
    backend: Arc<dyn CompletionBackend>,
    conversation: ConversationStore,
    state: RequestState,
    pending: Option<PendingCompletion>,
    last_citations: Vec<Citation>,
}

impl RequestOrchestrator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            conversation: ConversationStore::new(),
            state: RequestState::Idle,
            pending: None,
            last_citations: Vec::new(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == RequestState::Loading
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Citations of the latest successful reply, cleared on the next dispatch.
    pub fn last_citations(&self) -> &[Citation] {
        &self.last_citations
    }

    /// Append `text` as a user turn and dispatch the whole conversation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<P: Presenter + ?Sized>(&mut self, text: &str, presenter: &mut P) -> SubmitOutcome {
        if self.state == RequestState::Loading {
            tracing::warn!("submit ignored, a completion is already in flight");
            return SubmitOutcome::Busy;
        }

        if text.trim().is_empty() {
            return SubmitOutcome::Empty;
        }

        if self.state == RequestState::Error {
            presenter.hide_error();
        }

        self.conversation.append(ChatMessage::user(text));
        presenter.render_user_turn(text);

        self.state = RequestState::Loading;
        self.last_citations.clear();
        presenter.show_loading();

        let request = CompletionRequest {
            messages: self.conversation.snapshot(),
        };
        tracing::info!(messages = request.messages.len(), "dispatching completion request");

        let backend = Arc::clone(&self.backend);
        self.pending = Some(tokio::spawn(async move { backend.complete(request).await }));

        SubmitOutcome::Dispatched
    }

    /// Settle the in-flight request if it has finished. Returns true if it did.
    pub async fn poll<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> bool {
        let finished = self
            .pending
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);

        if finished {
            self.settle(presenter).await
        } else {
            false
        }
    }

    /// Wait for the in-flight request and apply its result.
    /// Returns false if nothing was in flight.
    pub async fn settle<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> bool {
        let Some(task) = self.pending.take() else {
            return false;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(ChatError::Network(format!("completion task failed: {}", e))),
        };

        self.apply(result, presenter);
        true
    }

    fn apply<P: Presenter + ?Sized>(
        &mut self,
        result: Result<CompletionReply, ChatError>,
        presenter: &mut P,
    ) {
        match result {
            Ok(reply) => {
                tracing::info!(
                    chars = reply.response.len(),
                    citations = reply.citations.len(),
                    "completion settled"
                );
                let html = markdown::render(&reply.response);
                self.conversation.append(ChatMessage::assistant(reply.response));
                self.last_citations = reply.citations;
                self.state = RequestState::Idle;
                presenter.hide_loading();
                presenter.render_assistant_turn(&html);
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                self.state = RequestState::Error;
                presenter.hide_loading();
                presenter.show_error(e.user_message());
            }
        }
    }
}
