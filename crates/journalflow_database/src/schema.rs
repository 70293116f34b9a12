//! Diesel table definitions.
//!
//! Configuration tables live in the `config` schema and are externally
//! administered; entity and ledger tables live in the `data` schema.

diesel::table! {
    config.action_ai_llm (action_label) {
        action_label -> Text,
        prompt_label -> Text,
        model_name -> Text,
        ai_provider -> Text,
    }
}

diesel::table! {
    config.action_code (action_label) {
        action_label -> Text,
        module_reference -> Text,
        entry_point -> Text,
        arguments -> Jsonb,
    }
}

diesel::table! {
    config.prompt (prompt_label) {
        prompt_label -> Text,
        template -> Text,
        temperature -> Float4,
    }
}

diesel::table! {
    config.prompt_parameter (id) {
        id -> Int8,
        prompt_label -> Text,
        name -> Text,
        is_required -> Bool,
        default_value -> Nullable<Text>,
        max_length -> Nullable<Int4>,
    }
}

diesel::table! {
    config.process_step (id) {
        id -> Int8,
        entity_type -> Text,
        current_status -> Text,
        step_order -> Int4,
        action_label -> Text,
        next_status -> Text,
    }
}

diesel::table! {
    config.prompt_output (id) {
        id -> Int8,
        prompt_label -> Text,
        output_key -> Text,
        target_schema -> Text,
        target_table -> Text,
        id_column -> Text,
        column_name -> Text,
        column_type -> Text,
        json_key -> Nullable<Text>,
        mode -> Text,
    }
}

diesel::table! {
    data.audio_message (id) {
        id -> Int8,
        filename -> Text,
        status -> Text,
        duration_seconds -> Nullable<Int8>,
        transcription -> Nullable<Text>,
        transcription_word_count -> Nullable<Int8>,
        message_type -> Nullable<Text>,
        metadata -> Jsonb,
        enrichment -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    data.llm_usage (id) {
        id -> Int8,
        entity_type -> Text,
        entity_id -> Int8,
        model_name -> Text,
        prompt_label -> Text,
        prompt_text -> Text,
        response_text -> Nullable<Text>,
        prompt_token_count -> Int8,
        response_token_count -> Int8,
        response_duration_ms -> Int8,
        temperature -> Float4,
        status -> Text,
        error_message -> Nullable<Text>,
        recorded_at -> Timestamptz,
    }
}
