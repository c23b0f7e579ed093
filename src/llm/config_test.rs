use super::*;
use crate::ENV_LOCK;

/// # Safety
/// Callers hold `ENV_LOCK` so no other test touches the environment.
unsafe fn clear_llm_env() {
    unsafe {
        std::env::remove_var("LLM_PROVIDER");
        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_API_KEY_ENV");
        std::env::remove_var("LLM_OPENAI_MODE");
        std::env::remove_var("LLM_OPENAI_BASE_URL");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("TEXTUML_TEST_KEY");
    }
}

#[test]
fn from_env_defaults_to_anthropic() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEXTUML_TEST_KEY");
        std::env::set_var("TEXTUML_TEST_KEY", "secret");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::ChatCompletions);
    assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(cfg.timeouts, LlmTimeouts::default());
    assert_eq!(cfg.timeouts.request_secs, 30);
    assert_eq!(cfg.api_key, "secret");

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_parses_openai_overrides() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_PROVIDER", "openai");
        std::env::set_var("LLM_API_KEY_ENV", "TEXTUML_TEST_KEY");
        std::env::set_var("TEXTUML_TEST_KEY", "sk-test");
        std::env::set_var("LLM_OPENAI_MODE", "responses");
        std::env::set_var("LLM_OPENAI_BASE_URL", "https://example.test/v1/");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-4o-mini");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::Responses);
    assert_eq!(cfg.openai_base_url, "https://example.test/v1");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_missing_key_indirection_errors() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_llm_env() };

    let err = LlmConfig::from_env().unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "LLM_API_KEY_ENV"));
}

#[test]
fn from_env_blank_key_errors() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEXTUML_TEST_KEY");
        std::env::set_var("TEXTUML_TEST_KEY", "  ");
    }

    let err = LlmConfig::from_env().unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "TEXTUML_TEST_KEY"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_unknown_provider_errors() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_PROVIDER", "bad");
        std::env::set_var("LLM_API_KEY_ENV", "TEXTUML_TEST_KEY");
        std::env::set_var("TEXTUML_TEST_KEY", "secret");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_unknown_openai_mode_errors() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEXTUML_TEST_KEY");
        std::env::set_var("TEXTUML_TEST_KEY", "secret");
        std::env::set_var("LLM_OPENAI_MODE", "bad_mode");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unsupported openai_api mode"));

    unsafe { clear_llm_env() };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "soon") };
    assert_eq!(env_parse("LLM_CONNECT_TIMEOUT_SECS", 10_u64), 10);
    unsafe { std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", " 3 ") };
    assert_eq!(env_parse("LLM_CONNECT_TIMEOUT_SECS", 10_u64), 3);
    unsafe { std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS") };
}
