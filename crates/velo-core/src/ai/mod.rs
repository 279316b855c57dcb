pub mod chat_api;

pub use chat_api::ChatApiClient;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::state::{CompletionReply, CompletionRequest};

/// Anything that can answer one completion round-trip.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, ChatError>;
}
