//! Operation invokers.
//!
//! The dispatcher and chat loop only see the [`Invoker`] trait. The built-in
//! `mock` provider returns fixed, operation-shaped responses; another provider
//! plugs in by implementing the trait and registering a name in
//! [`build_invoker`].

mod mock;

use crate::config::AiSettings;
use crate::error::{ConfigError, ProviderError};
use crate::types::{OperationRequest, OperationResult};
use async_trait::async_trait;
use std::sync::Arc;

pub use mock::MockInvoker;

/// Executes one operation and returns its result.
///
/// Implementations must return the result variant matching the request
/// variant; callers rely on that pairing.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, request: &OperationRequest) -> Result<OperationResult, ProviderError>;
}

/// Invoke an operation given by name with a free-form parameter bag.
///
/// Unknown names fail with [`ProviderError::UnknownOperation`] before the
/// invoker is reached.
pub async fn invoke_named(
    invoker: &dyn Invoker,
    name: &str,
    params: serde_json::Value,
) -> Result<OperationResult, ProviderError> {
    let request = OperationRequest::from_parts(name, params)?;
    invoker.invoke(&request).await
}

/// Provider names accepted by `ai.provider`.
pub const PROVIDERS: &[&str] = &["mock"];

/// Build the invoker selected by configuration.
pub fn build_invoker(settings: &AiSettings) -> Result<Arc<dyn Invoker>, ConfigError> {
    match settings.provider.as_str() {
        "mock" => Ok(Arc::new(MockInvoker::from_settings(settings))),
        other => Err(ConfigError::Invalid(format!(
            "unknown ai.provider `{other}` (available: {})",
            PROVIDERS.join(", ")
        ))),
    }
}
