//! End-to-end tests of dispatch and the pipeline driver over the in-memory
//! stores, with scripted provider and transcriber doubles.

use async_trait::async_trait;
use journalflow_core::{
    ActionContext, ActionDefinition, AiLlmAction, AudioMessage, ChatResponse, ChatSession,
    CodeAction, ColumnType,
    HandlerKey, OutputMapping, ProcessStep, PromptParameter, PromptTemplate, Role, UsageStatus,
    WriteMode, WriteTarget, STATUS_COMPLETE, STATUS_TRANSCRIBED,
};
use journalflow_error::{
    JournalflowErrorKind, JournalflowResult, ModelsError, ModelsErrorKind, PipelineErrorKind,
};
use journalflow_interface::{ChatDriver, Transcriber};
use journalflow_pipeline::{
    ActionDispatcher, CodeActionRegistry, FnHandler, InMemoryConfigStore, InMemoryEntityStore,
    InMemoryUsageLedger, PipelineDriver,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const ENTITY_TYPE: &str = "audio_message";

/// Provider double: replies with a fixed body, or fails when scripted to.
#[derive(Debug)]
struct ScriptedDriver {
    reply: Option<String>,
}

impl ScriptedDriver {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl ChatDriver for ScriptedDriver {
    async fn chat(
        &self,
        session: &mut ChatSession,
        _model: &str,
        _temperature: f32,
    ) -> JournalflowResult<ChatResponse> {
        match &self.reply {
            Some(text) => {
                session.push(Role::Assistant, text.clone());
                Ok(ChatResponse {
                    text: text.clone(),
                    prompt_token_count: 42,
                    response_token_count: 7,
                })
            }
            None => Err(ModelsError::new(ModelsErrorKind::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            })
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Transcriber double returning fixed text for every file.
#[derive(Debug)]
struct FixedTranscriber(&'static str);

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _path: &Path) -> JournalflowResult<String> {
        Ok(self.0.to_string())
    }
}

fn data_target() -> WriteTarget {
    WriteTarget::new(
        "data".to_string(),
        "audio_message".to_string(),
        "id".to_string(),
    )
}

fn classify_action() -> AiLlmAction {
    AiLlmAction::new(
        "classify".to_string(),
        "classify_message".to_string(),
        "gpt-4.1".to_string(),
        "openai".to_string(),
    )
}

fn classify_template() -> PromptTemplate {
    PromptTemplate::new(
        "classify_message".to_string(),
        "Classify this message: {transcription}".to_string(),
        0.0,
    )
}

fn classify_parameter() -> PromptParameter {
    PromptParameter::new(
        "classify_message".to_string(),
        "transcription".to_string(),
        true,
        None,
        None,
    )
}

fn message_type_mapping() -> OutputMapping {
    OutputMapping::new(
        "classify_message".to_string(),
        "message_type".to_string(),
        data_target(),
        "message_type".to_string(),
        ColumnType::Plain,
        None,
        WriteMode::Replace,
    )
}

fn classify_config() -> InMemoryConfigStore {
    InMemoryConfigStore::new()
        .with_ai_action(classify_action())
        .with_template(classify_template())
        .with_parameter(classify_parameter())
        .with_mapping(message_type_mapping())
        .with_step(ProcessStep::new(
            ENTITY_TYPE.to_string(),
            STATUS_TRANSCRIBED.to_string(),
            1,
            "classify".to_string(),
            STATUS_COMPLETE.to_string(),
        ))
}

fn dispatcher(
    config: Arc<InMemoryConfigStore>,
    entities: Arc<InMemoryEntityStore>,
    ledger: Arc<InMemoryUsageLedger>,
    registry: CodeActionRegistry,
    driver: Arc<dyn ChatDriver>,
) -> ActionDispatcher<InMemoryConfigStore, InMemoryEntityStore, InMemoryUsageLedger> {
    ActionDispatcher::new(config, entities, ledger, Arc::new(registry)).with_driver("openai", driver)
}

fn transcribed_message(id: i64) -> AudioMessage {
    AudioMessage {
        transcription: Some("hello there".to_string()),
        transcription_word_count: Some(2),
        status: STATUS_TRANSCRIBED.to_string(),
        ..AudioMessage::ingested(id, "msg.ogg")
    }
}

fn base_context(id: i64) -> ActionContext {
    let mut context = ActionContext::new();
    context.insert("entity_id".to_string(), json!(id));
    context.insert("transcription".to_string(), json!("hello there"));
    context
}

#[tokio::test]
async fn ai_action_applies_output_and_records_success() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let dispatcher = dispatcher(
        config,
        entities.clone(),
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying(r#"{"message_type":"greeting"}"#),
    );

    let outcome = dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();
    assert_eq!(outcome.response, Some(json!({"message_type": "greeting"})));

    let message = entities.get(1).await.unwrap();
    assert_eq!(message.message_type.as_deref(), Some("greeting"));

    let records = ledger.records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, UsageStatus::Success);
    assert_eq!(record.prompt_token_count, 42);
    assert_eq!(record.response_token_count, 7);
    assert_eq!(record.prompt_text, "Classify this message: hello there");
    assert_eq!(
        record.response_text.as_deref(),
        Some(r#"{"message_type":"greeting"}"#)
    );
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn ai_definition_wins_when_label_configured_as_both() {
    let handler_key = HandlerKey::new("enrichment".to_string(), "noop".to_string());
    let config = Arc::new(classify_config().with_code_action(CodeAction::new(
        "classify".to_string(),
        handler_key.clone(),
        BTreeMap::new(),
    )));
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let mut registry = CodeActionRegistry::new();
    registry.register("enrichment", "noop", FnHandler::new(|context, _| Ok(context)));

    let dispatcher = dispatcher(
        config,
        entities,
        ledger.clone(),
        registry,
        ScriptedDriver::replying(r#"{"message_type":"note"}"#),
    );

    let outcome = dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();

    // The ai_llm path ran: a parsed response and a ledger entry exist.
    assert!(outcome.response.is_some());
    assert_eq!(ledger.records().await.len(), 1);
}

#[tokio::test]
async fn resolution_yields_one_definition_per_label() {
    let handler_key = HandlerKey::new("enrichment".to_string(), "noop".to_string());
    let config = Arc::new(
        classify_config()
            .with_code_action(CodeAction::new(
                "classify".to_string(),
                handler_key.clone(),
                BTreeMap::new(),
            ))
            .with_code_action(CodeAction::new(
                "tag".to_string(),
                handler_key,
                BTreeMap::new(),
            )),
    );
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());

    let dispatcher = dispatcher(
        config,
        entities,
        ledger,
        CodeActionRegistry::new(),
        ScriptedDriver::replying("{}"),
    );

    let both = dispatcher.resolve("classify").await.unwrap();
    match both {
        Some(ActionDefinition::AiLlm(action)) => assert_eq!(action.action_label(), "classify"),
        other => panic!("expected ai_llm definition, got {other:?}"),
    }

    let code_only = dispatcher.resolve("tag").await.unwrap();
    assert!(matches!(code_only, Some(ActionDefinition::Code(_))));

    assert!(dispatcher.resolve("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn code_action_runs_handler_without_ledger_entry() {
    let handler_key = HandlerKey::new("enrichment".to_string(), "tag_length".to_string());
    let mut arguments = BTreeMap::new();
    arguments.insert("label".to_string(), json!("short"));
    let config = Arc::new(InMemoryConfigStore::new().with_code_action(CodeAction::new(
        "tag".to_string(),
        handler_key,
        arguments,
    )));
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());

    let mut registry = CodeActionRegistry::new();
    registry.register(
        "enrichment",
        "tag_length",
        FnHandler::new(|mut context, args| {
            let label = args.get("label").cloned().unwrap_or(json!(null));
            context.insert("length_label".to_string(), label);
            Ok(context)
        }),
    );

    let dispatcher = dispatcher(
        config,
        entities,
        ledger.clone(),
        registry,
        ScriptedDriver::replying("{}"),
    );

    let outcome = dispatcher
        .execute("tag", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();

    assert_eq!(outcome.response, None);
    assert_eq!(outcome.context.get("length_label"), Some(&json!("short")));
    assert!(ledger.records().await.is_empty());
}

#[tokio::test]
async fn unknown_action_label_is_an_error() {
    let config = Arc::new(InMemoryConfigStore::new());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());

    let dispatcher = dispatcher(
        config,
        entities,
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying("{}"),
    );

    let err = dispatcher
        .execute("missing", base_context(1), ENTITY_TYPE)
        .await
        .unwrap_err();

    match err.kind() {
        JournalflowErrorKind::Pipeline(e) => {
            assert_eq!(e.kind, PipelineErrorKind::UnknownAction("missing".to_string()));
        }
        other => panic!("unexpected error kind: {other}"),
    }
    assert!(ledger.records().await.is_empty());
}

#[tokio::test]
async fn provider_failure_records_error_with_zeroed_tokens() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let dispatcher = dispatcher(
        config,
        entities.clone(),
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::failing(),
    );

    let result = dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await;
    assert!(result.is_err());

    let records = ledger.records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, UsageStatus::Error);
    assert_eq!(record.response_text, None);
    assert_eq!(record.prompt_token_count, 0);
    assert_eq!(record.response_token_count, 0);
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .contains("upstream unavailable"));

    // The entity was not touched.
    let message = entities.get(1).await.unwrap();
    assert_eq!(message.message_type, None);
}

#[tokio::test]
async fn malformed_response_keeps_token_accounting() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let dispatcher = dispatcher(
        config,
        entities,
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying("Sure! The category is greeting."),
    );

    let err = dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap_err();
    match err.kind() {
        JournalflowErrorKind::Pipeline(e) => {
            assert!(matches!(e.kind, PipelineErrorKind::MalformedResponse(_)));
        }
        other => panic!("unexpected error kind: {other}"),
    }

    // The call itself was billed: tokens and the raw body survive on the
    // error record.
    let records = ledger.records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, UsageStatus::Error);
    assert_eq!(record.prompt_token_count, 42);
    assert_eq!(record.response_token_count, 7);
    assert_eq!(
        record.response_text.as_deref(),
        Some("Sure! The category is greeting.")
    );
}

#[tokio::test]
async fn missing_required_parameter_fails_before_the_provider_call() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());

    let dispatcher = dispatcher(
        config,
        entities,
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying("{}"),
    );

    // No transcription in the context, and the parameter has no default.
    let mut context = ActionContext::new();
    context.insert("entity_id".to_string(), json!(1));

    let err = dispatcher
        .execute("classify", context, ENTITY_TYPE)
        .await
        .unwrap_err();
    match err.kind() {
        JournalflowErrorKind::Pipeline(e) => {
            assert_eq!(
                e.kind,
                PipelineErrorKind::MissingParameters(vec!["transcription".to_string()])
            );
        }
        other => panic!("unexpected error kind: {other}"),
    }

    // The failure is ledgered with the raw template as prompt text.
    let records = ledger.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, UsageStatus::Error);
    assert_eq!(records[0].prompt_text, "Classify this message: {transcription}");
}

#[tokio::test]
async fn versioned_mapping_appends_and_replaces_by_mode() {
    let add_mapping = OutputMapping::new(
        "classify_message".to_string(),
        "observation".to_string(),
        data_target(),
        "enrichment".to_string(),
        ColumnType::VersionedJson,
        Some("observation".to_string()),
        WriteMode::Add,
    );
    let config = Arc::new(
        InMemoryConfigStore::new()
            .with_ai_action(classify_action())
            .with_template(classify_template())
            .with_parameter(classify_parameter())
            .with_mapping(add_mapping),
    );
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let dispatcher = dispatcher(
        config,
        entities.clone(),
        ledger,
        CodeActionRegistry::new(),
        ScriptedDriver::replying(r#"{"observation":"friendly tone"}"#),
    );

    dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();
    dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();

    let message = entities.get(1).await.unwrap();
    let history = message.enrichment.history("observation");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 1);
    assert_eq!(history[1].version, 2);
    assert_eq!(
        message.enrichment.current("observation").unwrap().value,
        json!("friendly tone")
    );
    assert_eq!(message.enrichment.current("observation").unwrap().producer, "llm");
}

#[tokio::test]
async fn absent_output_key_is_skipped_without_failing() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;

    let dispatcher = dispatcher(
        config,
        entities.clone(),
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying(r#"{"unrelated":"value"}"#),
    );

    let outcome = dispatcher
        .execute("classify", base_context(1), ENTITY_TYPE)
        .await
        .unwrap();
    assert!(outcome.response.is_some());

    let message = entities.get(1).await.unwrap();
    assert_eq!(message.message_type, None);
    assert_eq!(ledger.records().await[0].status, UsageStatus::Success);
}

#[tokio::test]
async fn cycle_transcribes_new_entities() {
    let config = Arc::new(InMemoryConfigStore::new());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(AudioMessage::ingested(1, "first.ogg")).await;
    entities.seed(AudioMessage::ingested(2, "second.ogg")).await;

    let dispatcher = dispatcher(
        config.clone(),
        entities.clone(),
        ledger,
        CodeActionRegistry::new(),
        ScriptedDriver::replying("{}"),
    );
    let driver = PipelineDriver::new(
        config,
        entities.clone(),
        Arc::new(FixedTranscriber("hello world")),
        dispatcher,
        ENTITY_TYPE,
    );

    let report = driver.run_cycle().await.unwrap();
    assert_eq!(*report.transcribed(), 2);
    assert_eq!(*report.failed(), 0);

    let message = entities.get(1).await.unwrap();
    assert_eq!(message.status, STATUS_TRANSCRIBED);
    assert_eq!(message.transcription.as_deref(), Some("hello world"));
    assert_eq!(message.transcription_word_count, Some(2));
}

#[tokio::test]
async fn cycle_advances_through_configured_steps() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(AudioMessage::ingested(1, "msg.ogg")).await;

    let dispatcher = dispatcher(
        config.clone(),
        entities.clone(),
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::replying(r#"{"message_type":"greeting"}"#),
    );
    let driver = PipelineDriver::new(
        config,
        entities.clone(),
        Arc::new(FixedTranscriber("hi there friend")),
        dispatcher,
        ENTITY_TYPE,
    );

    // One cycle transcribes and then classifies the now-transcribed entity.
    let report = driver.run_cycle().await.unwrap();
    assert_eq!(*report.transcribed(), 1);
    assert_eq!(*report.advanced(), 1);

    let message = entities.get(1).await.unwrap();
    assert_eq!(message.status, STATUS_COMPLETE);
    assert_eq!(message.message_type.as_deref(), Some("greeting"));
    assert_eq!(message.transcription_word_count, Some(3));
    assert_eq!(ledger.records().await.len(), 1);
}

#[tokio::test]
async fn failed_dispatch_leaves_status_unchanged_and_keeps_batch_going() {
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    entities.seed(transcribed_message(1)).await;
    entities.seed(transcribed_message(2)).await;

    let dispatcher = dispatcher(
        config.clone(),
        entities.clone(),
        ledger.clone(),
        CodeActionRegistry::new(),
        ScriptedDriver::failing(),
    );
    let driver = PipelineDriver::new(
        config,
        entities.clone(),
        Arc::new(FixedTranscriber("unused")),
        dispatcher,
        ENTITY_TYPE,
    );

    let report = driver.run_cycle().await.unwrap();
    assert_eq!(*report.advanced(), 0);
    assert_eq!(*report.failed(), 2);

    // Both entities stayed where they were for the next cycle to retry,
    // and each failure was ledgered.
    for id in [1, 2] {
        let message = entities.get(id).await.unwrap();
        assert_eq!(message.status, STATUS_TRANSCRIBED);
    }
    let records = ledger.records().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == UsageStatus::Error));
}

#[tokio::test]
async fn status_without_steps_is_terminal() {
    // Steps exist for transcribed but the entity sits in a status with none.
    let config = Arc::new(classify_config());
    let entities = Arc::new(InMemoryEntityStore::new());
    let ledger = Arc::new(InMemoryUsageLedger::new());
    let parked = AudioMessage {
        status: "archived".to_string(),
        ..transcribed_message(1)
    };
    entities.seed(parked).await;

    let dispatcher = dispatcher(
        config.clone(),
        entities.clone(),
        ledger,
        CodeActionRegistry::new(),
        ScriptedDriver::replying("{}"),
    );
    let driver = PipelineDriver::new(
        config,
        entities.clone(),
        Arc::new(FixedTranscriber("unused")),
        dispatcher,
        ENTITY_TYPE,
    );

    let report = driver.run_cycle().await.unwrap();
    assert_eq!(*report.advanced(), 0);
    assert_eq!(*report.failed(), 0);
    assert_eq!(entities.get(1).await.unwrap().status, "archived");
}
