//! Registered code-action handlers.
//!
//! The source system resolved code actions by dynamic import at call time.
//! Here the wiring is closed: handlers register under a
//! `(module_reference, entry_point)` key at startup, and dispatch resolves
//! against the table.

use async_trait::async_trait;
use journalflow_core::{ActionContext, HandlerKey};
use journalflow_error::JournalflowResult;
use journalflow_interface::CodeActionHandler;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Table of registered code-action handlers.
///
/// # Examples
///
/// ```
/// use journalflow_core::HandlerKey;
/// use journalflow_pipeline::{CodeActionRegistry, FnHandler};
///
/// let mut registry = CodeActionRegistry::new();
/// registry.register(
///     "enrichment",
///     "tag_speaker",
///     FnHandler::new(|mut context, _args| {
///         context.insert("speaker".to_string(), serde_json::json!("unknown"));
///         Ok(context)
///     }),
/// );
///
/// let key = HandlerKey::new("enrichment".to_string(), "tag_speaker".to_string());
/// assert!(registry.resolve(&key).is_some());
/// ```
#[derive(Default)]
pub struct CodeActionRegistry {
    handlers: HashMap<HandlerKey, Arc<dyn CodeActionHandler>>,
}

impl CodeActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `(module_reference, entry_point)`.
    ///
    /// A later registration under the same key replaces the earlier one.
    pub fn register(
        &mut self,
        module_reference: impl Into<String>,
        entry_point: impl Into<String>,
        handler: impl CodeActionHandler + 'static,
    ) {
        let key = HandlerKey::new(module_reference.into(), entry_point.into());
        tracing::debug!(handler = %key, "Registered code action handler");
        self.handlers.insert(key, Arc::new(handler));
    }

    /// Resolve a handler by key.
    pub fn resolve(&self, key: &HandlerKey) -> Option<Arc<dyn CodeActionHandler>> {
        self.handlers.get(key).cloned()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Adapter turning a plain closure into a [`CodeActionHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(ActionContext, &BTreeMap<String, JsonValue>) -> JournalflowResult<ActionContext>
        + Send
        + Sync,
{
    /// Wrap a closure as a handler.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> CodeActionHandler for FnHandler<F>
where
    F: Fn(ActionContext, &BTreeMap<String, JsonValue>) -> JournalflowResult<ActionContext>
        + Send
        + Sync,
{
    async fn call(
        &self,
        context: ActionContext,
        arguments: &BTreeMap<String, JsonValue>,
    ) -> JournalflowResult<ActionContext> {
        (self.0)(context, arguments)
    }
}
