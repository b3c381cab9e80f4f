//! Shared helper for the four LLM-backed variants.

use std::collections::HashMap;

use crate::capabilities::CompletionBackend;
use crate::error::{WebFluxError, WebFluxResult};

pub(super) async fn complete_or_unavailable(
    completion: Option<&(dyn CompletionBackend)>,
    prompt: String,
    params: &HashMap<String, String>,
) -> WebFluxResult<String> {
    match completion {
        Some(backend) => backend.complete(&prompt, params).await,
        None => Err(WebFluxError::CapabilityUnavailable("reconstruct variant requires a text-completion backend".to_string())),
    }
}
