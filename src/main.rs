use std::fs;
use std::io::{self, BufRead, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use textuml::llm::{LlmChat, LlmClient};
use textuml::model::{DiagramType, Model};
use textuml::pipeline::{self, GenerateRequest, Outcome, PipelineConfig};
use textuml::session::Session;
use textuml::store::MemoryStore;
use textuml::{ErrorCode, extract, render};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("unknown diagram type `{0}` (expected class, usecase or sequence)")]
    UnknownDiagramType(String),
    #[error("no input text; pass TEXT, --input FILE or pipe it on stdin")]
    MissingInput,
    #[error("read {path} failed: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("stdio failed: {0}")]
    Stdio(#[from] io::Error),
    #[error("invalid model JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownDiagramType(_) => "E_UNKNOWN_DIAGRAM_TYPE",
            Self::MissingInput => "E_MISSING_INPUT",
            Self::ReadFile { .. } => "E_READ_FILE",
            Self::Stdio(_) => "E_STDIO",
            Self::InvalidJson(_) => "E_INVALID_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "textuml", about = "Turn plain-language system descriptions into PlantUML diagrams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a model with the completion service and print its diagram.
    Generate(GenerateArgs),
    /// Print the heuristic class-model draft as JSON.
    Extract(InputArgs),
    /// Render a stored model JSON file.
    Render(RenderArgs),
    /// Edit one diagram interactively, one request per stdin line.
    Chat(ChatArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Description text; stdin is read when neither TEXT nor --input is given.
    text: Vec<String>,

    #[arg(long, conflicts_with = "text")]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long = "type", env = "TEXTUML_DIAGRAM_TYPE", default_value = "class")]
    diagram_type: String,

    /// Current model (bare or as printed by --json) to edit instead of creating.
    #[arg(long)]
    existing: Option<PathBuf>,

    /// Skip the completion service and use the heuristic draft.
    #[arg(long)]
    offline: bool,

    /// Print model, diagram and explanation as one JSON document.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long = "type", env = "TEXTUML_DIAGRAM_TYPE", default_value = "class")]
    diagram_type: String,

    file: PathBuf,
}

#[derive(Args, Debug)]
struct ChatArgs {
    #[arg(long = "type", env = "TEXTUML_DIAGRAM_TYPE", default_value = "class")]
    diagram_type: String,

    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Extract(args) => run_extract(&args),
        Command::Render(args) => run_render(&args),
        Command::Chat(args) => run_chat(args).await,
    };
    if let Err(e) = &result {
        warn!(code = e.error_code(), error = %e, "cli: command failed");
    }
    result
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let diagram_type = parse_type(&args.diagram_type)?;
    let text = read_input(&args.input)?;
    let existing = args
        .existing
        .as_deref()
        .map(|path| load_model(path, diagram_type))
        .transpose()?;

    let llm = connect_llm(args.offline);
    let config = PipelineConfig::from_env();
    let request = GenerateRequest { text: &text, diagram_type, existing: existing.as_ref() };
    let outcome = pipeline::generate(llm.as_deref(), &config, request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        println!("{}", outcome.plantuml);
    }
    Ok(())
}

fn run_extract(args: &InputArgs) -> Result<(), CliError> {
    let text = read_input(args)?;
    let model = extract::extract(&text);
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}

fn run_render(args: &RenderArgs) -> Result<(), CliError> {
    let diagram_type = parse_type(&args.diagram_type)?;
    let model = load_model(&args.file, diagram_type)?;
    println!("{}", render::render_model(&model));
    Ok(())
}

async fn run_chat(args: ChatArgs) -> Result<(), CliError> {
    let diagram_type = parse_type(&args.diagram_type)?;
    let session = Session::new(Arc::new(MemoryStore::new()), connect_llm(args.offline), PipelineConfig::from_env());
    let id = Uuid::new_v4().to_string();
    info!(session = %id, %diagram_type, "cli: chat started");

    eprintln!("Describe the system; each line edits the diagram. /reset starts over, /quit exits.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset(&id).await;
                eprintln!("(history cleared)");
            }
            text => {
                let outcome = session.submit(&id, text, diagram_type).await;
                println!("{}", outcome.plantuml);
                if let Some(reason) = &outcome.fallback {
                    eprintln!("({} model kept: {reason})", outcome.source.as_str());
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_type(raw: &str) -> Result<DiagramType, CliError> {
    DiagramType::parse(raw).ok_or_else(|| CliError::UnknownDiagramType(raw.to_owned()))
}

fn read_input(args: &InputArgs) -> Result<String, CliError> {
    let text = if let Some(path) = &args.input {
        read_file(path)?
    } else if !args.text.is_empty() {
        args.text.join(" ")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };
    if text.trim().is_empty() {
        return Err(CliError::MissingInput);
    }
    Ok(text)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })
}

/// Accepts a bare model or a `generate --json` document.
fn load_model(path: &Path, diagram_type: DiagramType) -> Result<Model, CliError> {
    let mut value: Value = serde_json::from_str(&read_file(path)?)?;
    if let Some(inner) = value.get_mut("model").filter(|m| m.is_object()) {
        value = inner.take();
    }
    Ok(Model::from_value(diagram_type, value)?)
}

fn connect_llm(offline: bool) -> Option<Arc<dyn LlmChat>> {
    if offline {
        info!("cli: offline, using heuristic drafts");
        return None;
    }
    match LlmClient::from_env() {
        Ok(client) => {
            info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(code = e.error_code(), error = %e, "LLM client not configured, running offline");
            None
        }
    }
}

fn outcome_json(outcome: &Outcome) -> Value {
    json!({
        "diagram_type": outcome.diagram_type,
        "model": outcome.model,
        "plantuml": outcome.plantuml,
        "explanation": outcome.explanation,
        "source": outcome.source,
        "fallback": outcome.fallback.as_ref().map(|reason| json!({
            "code": reason.error_code(),
            "message": reason.to_string(),
        })),
    })
}
