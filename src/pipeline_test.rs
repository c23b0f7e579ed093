use super::*;
use crate::ENV_LOCK;
use crate::llm::mock::{MockLlm, Reply};
use crate::model::{ClassDef, ClassModel, RelationshipKind};

fn invoice_seed() -> Model {
    let mut model = ClassModel::default();
    model.classes.push(ClassDef::named("Invoice"));
    Model::Class(model)
}

fn fast_config() -> PipelineConfig {
    PipelineConfig { timeout: Duration::from_millis(50), ..PipelineConfig::default() }
}

async fn run(llm: Option<&dyn LlmChat>, text: &str, diagram_type: DiagramType, existing: Option<&Model>) -> Outcome {
    generate(llm, &fast_config(), GenerateRequest { text, diagram_type, existing }).await
}

// =============================================================================
// ACCEPTED CANDIDATE
// =============================================================================

#[tokio::test]
async fn fenced_candidate_with_trailing_commas_is_accepted() {
    let llm = MockLlm::text(
        "Here you go:\n```json\n{\"classes\": [{\"name\": \"Customer\",}, {\"name\": \"Order\"},], \
         \"relationships\": [{\"from\": \"Customer\", \"to\": \"Order\", \"type\": \"one-to-many\", \"label\": \"places\"},],}\n```",
    );
    let outcome = run(Some(&llm), "Customers place orders.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Candidate);
    assert!(outcome.fallback.is_none());
    assert_eq!(outcome.diagram_type, DiagramType::Class);
    assert!(outcome.plantuml.contains("Customer \"1\" --> \"*\" Order : places"));
    assert!(outcome.explanation.contains("<strong>Customer</strong>"));
}

#[tokio::test]
async fn request_uses_configured_sampling() {
    let llm = MockLlm::text("{\"classes\": [], \"relationships\": []}");
    let config = PipelineConfig { timeout: Duration::from_secs(1), temperature: 0.7, max_tokens: 99 };
    let request = GenerateRequest { text: "A Shop sells Items.", diagram_type: DiagramType::Class, existing: None };
    generate(Some(&llm), &config, request).await;

    let sent = llm.requests();
    assert_eq!(sent.len(), 1);
    assert!((sent[0].temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(sent[0].max_tokens, 99);
    assert!(sent[0].prompt.starts_with("Create"));
    assert!(sent[0].prompt.contains("\"name\": \"Shop\""));
}

#[tokio::test]
async fn edit_mode_prompt_embeds_the_seed() {
    let llm = MockLlm::text("{\"classes\": [{\"name\": \"Invoice\"}, {\"name\": \"Payment\"}], \"relationships\": []}");
    let seed = invoice_seed();
    let outcome = run(Some(&llm), "Add a Payment class.", DiagramType::Class, Some(&seed)).await;

    assert_eq!(outcome.source, ModelSource::Candidate);
    assert_eq!(outcome.model.entity_count(), 2);
    let prompt = &llm.requests()[0].prompt;
    assert!(prompt.starts_with("Edit"));
    assert!(prompt.contains("\"name\": \"Invoice\""));
}

// =============================================================================
// FALLBACKS
// =============================================================================

#[tokio::test]
async fn edit_mode_incompatible_payload_returns_seed_unchanged() {
    let llm = MockLlm::text("{\"foo\": []}");
    let seed = invoice_seed();
    let outcome = run(Some(&llm), "Add a Payment class.", DiagramType::Class, Some(&seed)).await;

    assert_eq!(outcome.source, ModelSource::Seed);
    assert_eq!(outcome.model, seed);
    assert!(matches!(outcome.fallback, Some(FallbackReason::Incompatible { diagram_type: DiagramType::Class })));
    assert_eq!(outcome.fallback.as_ref().unwrap().error_code(), "E_INCOMPATIBLE_MODEL");
}

#[tokio::test]
async fn create_mode_incompatible_payload_returns_draft() {
    let llm = MockLlm::text("{\"actors\": [], \"use_cases\": []}");
    let outcome = run(Some(&llm), "A Library contains Books.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    let Model::Class(model) = &outcome.model else { panic!("expected class model") };
    assert_eq!(model.relationships[0].kind, RelationshipKind::Composition);
}

#[tokio::test]
async fn timeout_returns_seed_in_edit_mode() {
    let llm = MockLlm::stalled(Duration::from_secs(5));
    let seed = invoice_seed();
    let outcome = run(Some(&llm), "Add a Payment class.", DiagramType::Class, Some(&seed)).await;

    assert_eq!(outcome.source, ModelSource::Seed);
    assert_eq!(outcome.model, seed);
    assert!(matches!(outcome.fallback, Some(FallbackReason::Completion(LlmError::Timeout { .. }))));
}

#[tokio::test]
async fn timeout_returns_draft_in_create_mode() {
    let llm = MockLlm::stalled(Duration::from_secs(5));
    let outcome = run(Some(&llm), "A Library contains Books.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    assert!(outcome.plantuml.contains("Library *-- Books"));
    assert_eq!(outcome.fallback.as_ref().unwrap().error_code(), "E_COMPLETION_TIMEOUT");
}

#[tokio::test]
async fn provider_error_falls_back() {
    let llm = MockLlm::failing(LlmError::ApiResponse { status: 500, body: "boom".into() });
    let outcome = run(Some(&llm), "A Library contains Books.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    let reason = outcome.fallback.unwrap();
    assert_eq!(reason.error_code(), "E_API_RESPONSE");
    assert!(reason.retryable());
}

#[tokio::test]
async fn prose_without_json_falls_back() {
    let llm = MockLlm::new(vec![Reply::Text("Sorry, I can't draw that.".into())]);
    let outcome = run(Some(&llm), "A Library contains Books.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    assert!(matches!(outcome.fallback, Some(FallbackReason::Interpretation(InterpretError::NoCandidate))));
}

#[tokio::test]
async fn missing_completion_service_uses_draft() {
    let outcome = run(None, "A Library contains Books.", DiagramType::Class, None).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    assert_eq!(outcome.fallback.as_ref().unwrap().error_code(), "E_LLM_UNAVAILABLE");
    assert!(outcome.plantuml.starts_with("@startuml"));
    assert!(outcome.plantuml.ends_with("@enduml"));
}

#[tokio::test]
async fn non_class_draft_is_empty() {
    let outcome = run(None, "Customers browse the catalog.", DiagramType::UseCase, None).await;

    assert_eq!(outcome.model, Model::empty(DiagramType::UseCase));
    assert_eq!(outcome.explanation, "<p>No actors or use cases were identified in the model.</p>");
}

#[tokio::test]
async fn seed_of_another_type_is_ignored() {
    let llm = MockLlm::text("not json");
    let seed = invoice_seed();
    let outcome = run(Some(&llm), "Users log in.", DiagramType::Sequence, Some(&seed)).await;

    assert_eq!(outcome.source, ModelSource::Draft);
    assert_eq!(outcome.diagram_type, DiagramType::Sequence);
    assert!(llm.requests()[0].prompt.starts_with("Create"));
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn config_from_env_reads_overrides_and_defaults() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "12");
        std::env::set_var("LLM_TEMPERATURE", "0.5");
        std::env::set_var("LLM_MAX_TOKENS", "not a number");
    }

    let config = PipelineConfig::from_env();
    assert_eq!(config.timeout, Duration::from_secs(12));
    assert!((config.temperature - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.max_tokens, DEFAULT_LLM_MAX_TOKENS);

    unsafe {
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_TEMPERATURE");
        std::env::remove_var("LLM_MAX_TOKENS");
    }
    assert_eq!(PipelineConfig::from_env(), PipelineConfig::default());
}
