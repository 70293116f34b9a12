//! Action dispatch: resolving and executing configured actions.

use crate::{CodeActionRegistry, OutputApplicator, PromptRenderer};
use journalflow_core::{
    ActionContext, ActionDefinition, AiLlmAction, ChatSession, CodeAction, PromptTemplate, Role,
    UsageRecord, UsageStatus,
};
use journalflow_error::{
    JournalflowResult, ModelsError, ModelsErrorKind, PipelineError, PipelineErrorKind,
};
use journalflow_interface::{ChatDriver, ConfigStore, DispatchOutcome, EntityStore, UsageLedger};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Fixed system role every chat session is seeded with.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Resolves an action label to its configured definition and executes it.
///
/// Resolution probes the config store for an ai_llm definition first, then
/// a code definition; a label configured as both resolves to ai_llm.
///
/// For ai_llm actions the dispatcher renders the prompt, invokes the
/// provider driver registered under the action's `ai_provider` key, records
/// the invocation in the usage ledger (success or failure, each in its own
/// transaction), and applies the parsed response through the output
/// applicator. Code actions invoke a registered handler and leave no
/// ledger entry.
///
/// The dispatcher never advances entity status; that is the driver's job.
pub struct ActionDispatcher<C, E, L> {
    config: Arc<C>,
    ledger: Arc<L>,
    output: OutputApplicator<C, E>,
    drivers: HashMap<String, Arc<dyn ChatDriver>>,
    registry: Arc<CodeActionRegistry>,
    renderer: PromptRenderer,
}

impl<C, E, L> ActionDispatcher<C, E, L>
where
    C: ConfigStore,
    E: EntityStore,
    L: UsageLedger,
{
    /// Create a dispatcher over the given stores and handler registry.
    pub fn new(
        config: Arc<C>,
        entities: Arc<E>,
        ledger: Arc<L>,
        registry: Arc<CodeActionRegistry>,
    ) -> Self {
        Self {
            output: OutputApplicator::new(config.clone(), entities),
            config,
            ledger,
            drivers: HashMap::new(),
            registry,
            renderer: PromptRenderer,
        }
    }

    /// Register a provider driver under its `ai_provider` key.
    pub fn with_driver(mut self, provider: impl Into<String>, driver: Arc<dyn ChatDriver>) -> Self {
        self.drivers.insert(provider.into(), driver);
        self
    }

    /// Resolve `action_label` into its configured definition.
    ///
    /// A label configured as both ai_llm and code resolves to ai_llm.
    pub async fn resolve(&self, action_label: &str) -> JournalflowResult<Option<ActionDefinition>> {
        if let Some(action) = self.config.ai_action(action_label).await? {
            return Ok(Some(ActionDefinition::AiLlm(action)));
        }
        if let Some(action) = self.config.code_action(action_label).await? {
            return Ok(Some(ActionDefinition::Code(action)));
        }
        Ok(None)
    }

    /// Execute the action configured under `action_label`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAction` when no definition exists for the label, and
    /// propagates rendering, provider, parsing, output-application, and
    /// handler failures to the caller. The caller decides whether to
    /// advance entity status.
    #[tracing::instrument(skip(self, context))]
    pub async fn execute(
        &self,
        action_label: &str,
        context: ActionContext,
        entity_type: &str,
    ) -> JournalflowResult<DispatchOutcome> {
        match self.resolve(action_label).await? {
            Some(ActionDefinition::AiLlm(action)) => {
                self.run_ai_action(&action, context, entity_type).await
            }
            Some(ActionDefinition::Code(action)) => self.run_code_action(&action, context).await,
            None => Err(PipelineError::new(PipelineErrorKind::UnknownAction(
                action_label.to_string(),
            ))
            .into()),
        }
    }

    async fn run_ai_action(
        &self,
        action: &AiLlmAction,
        context: ActionContext,
        entity_type: &str,
    ) -> JournalflowResult<DispatchOutcome> {
        let template = self
            .config
            .prompt_template(action.prompt_label())
            .await?
            .ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::UnknownPrompt(action.prompt_label().clone()))
            })?;
        let parameters = self.config.prompt_parameters(action.prompt_label()).await?;

        let entity_id = context
            .get("entity_id")
            .and_then(JsonValue::as_i64)
            .unwrap_or(0);

        let rendered = match self.renderer.render(&template, &parameters, &context) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.record_failure(
                    action,
                    &template,
                    entity_type,
                    entity_id,
                    template.template(),
                    0,
                    &e.to_string(),
                )
                .await?;
                return Err(e.into());
            }
        };

        let Some(driver) = self.drivers.get(action.ai_provider()).cloned() else {
            let e = ModelsError::new(ModelsErrorKind::UnsupportedProvider(
                action.ai_provider().clone(),
            ));
            self.record_failure(
                action,
                &template,
                entity_type,
                entity_id,
                &rendered,
                0,
                &e.to_string(),
            )
            .await?;
            return Err(e.into());
        };

        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.push(Role::User, rendered.clone());

        let started = Instant::now();
        let response = match driver
            .chat(&mut session, action.model_name(), *template.temperature())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let duration_ms = started.elapsed().as_millis() as i64;
                self.record_failure(
                    action,
                    &template,
                    entity_type,
                    entity_id,
                    &rendered,
                    duration_ms,
                    &e.to_string(),
                )
                .await?;
                return Err(e);
            }
        };
        let duration_ms = started.elapsed().as_millis() as i64;

        let parsed: JsonValue = match serde_json::from_str(response.text.trim()) {
            Ok(parsed) => parsed,
            Err(parse_err) => {
                let e = PipelineError::new(PipelineErrorKind::MalformedResponse(
                    parse_err.to_string(),
                ));
                // The call itself succeeded and was billed; keep its token
                // accounting and raw response in the error record.
                let record = self
                    .record_builder(action, &template, entity_type, entity_id, &rendered)
                    .response_text(Some(response.text.clone()))
                    .prompt_token_count(response.prompt_token_count)
                    .response_token_count(response.response_token_count)
                    .response_duration_ms(duration_ms)
                    .status(UsageStatus::Error)
                    .error_message(e.to_string())
                    .build()
                    .map_err(|b| {
                        PipelineError::new(PipelineErrorKind::LedgerWrite(b.to_string()))
                    })?;
                self.ledger.insert(&record).await?;
                return Err(e.into());
            }
        };

        let record = self
            .record_builder(action, &template, entity_type, entity_id, &rendered)
            .response_text(Some(response.text.clone()))
            .prompt_token_count(response.prompt_token_count)
            .response_token_count(response.response_token_count)
            .response_duration_ms(duration_ms)
            .status(UsageStatus::Success)
            .build()
            .map_err(|b| PipelineError::new(PipelineErrorKind::LedgerWrite(b.to_string())))?;
        self.ledger.insert(&record).await?;

        if let Err(e) = self
            .output
            .apply(action.prompt_label(), entity_id, entity_type, &parsed)
            .await
        {
            self.record_failure(
                action,
                &template,
                entity_type,
                entity_id,
                &rendered,
                duration_ms,
                &format!("Output application failed: {e}"),
            )
            .await?;
            return Err(e);
        }

        tracing::info!(
            action_label = %action.action_label(),
            model = %action.model_name(),
            duration_ms,
            "AI action executed"
        );

        Ok(DispatchOutcome {
            context,
            response: Some(parsed),
        })
    }

    async fn run_code_action(
        &self,
        action: &CodeAction,
        context: ActionContext,
    ) -> JournalflowResult<DispatchOutcome> {
        let handler = self.registry.resolve(action.handler()).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::UnregisteredHandler {
                module: action.handler().module_reference.clone(),
                entry: action.handler().entry_point.clone(),
            })
        })?;

        // Handler failures propagate unrecorded: code actions are not LLM
        // calls and leave no usage ledger entry.
        let context = handler.call(context, action.arguments()).await?;

        tracing::info!(
            action_label = %action.action_label(),
            handler = %action.handler(),
            "Code action executed"
        );

        Ok(DispatchOutcome {
            context,
            response: None,
        })
    }

    fn record_builder(
        &self,
        action: &AiLlmAction,
        template: &PromptTemplate,
        entity_type: &str,
        entity_id: i64,
        prompt_text: &str,
    ) -> journalflow_core::UsageRecordBuilder {
        let mut builder = UsageRecord::builder();
        builder
            .entity_type(entity_type)
            .entity_id(entity_id)
            .model_name(action.model_name())
            .prompt_label(action.prompt_label())
            .prompt_text(prompt_text)
            .temperature(*template.temperature());
        builder
    }

    /// Write a failure record in its own transaction: token counts zeroed,
    /// response null, error message truncated. A ledger failure here
    /// propagates instead of the original error.
    async fn record_failure(
        &self,
        action: &AiLlmAction,
        template: &PromptTemplate,
        entity_type: &str,
        entity_id: i64,
        prompt_text: &str,
        duration_ms: i64,
        error: &str,
    ) -> JournalflowResult<()> {
        let record = self
            .record_builder(action, template, entity_type, entity_id, prompt_text)
            .response_duration_ms(duration_ms)
            .status(UsageStatus::Error)
            .error_message(error)
            .build()
            .map_err(|b| PipelineError::new(PipelineErrorKind::LedgerWrite(b.to_string())))?;

        tracing::error!(
            action_label = %action.action_label(),
            entity_id,
            error,
            "AI action failed, recording error usage"
        );

        self.ledger.insert(&record).await
    }
}
