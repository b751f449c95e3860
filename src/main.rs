//! # Deep Research Assistant
//!
//! An interactive command-line research assistant on top of the OpenAI
//! Responses API and its provider-side `web_search` tool.
//!
//! A session walks through:
//! - clarifying questions about the topic
//! - a research goal plus web search queries
//! - one web search per query
//! - a coverage check, with at most one round of extra searches
//! - a final report with inline `[n]` citations
//!
//! ## Quick Start
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run -- "electric vehicle adoption trends"
//! ```

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deep_research::credentials::{DEFAULT_ENV_FILE, DEFAULT_SECRETS_FILE};
use deep_research::{
    render_markdown, Config, CredentialResolver, OpenAiGateway, ResearchObserver, ResearchPipeline,
    ResearchPlan, ResearchSession, SearchResult,
};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
/// # Rust Concept: Derive Macros with Clap
///
/// Every flag that has an `env = ...` can also be set from the environment;
/// an explicit flag wins over the variable.
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "A guided deep-research assistant: clarify, plan, search, evaluate and report",
    long_about = r#"
Deep Research - guided web research with cited reports.

The assistant will:
  1. Ask clarifying questions about your topic
  2. Derive a research goal and web search queries
  3. Run one web search per query
  4. Check coverage and, if needed, search once more
  5. Write a complete report with inline citations

CREDENTIALS (first match wins):
  1. openai_api_key in the secrets file (default: secrets.toml)
  2. OPENAI_API_KEY in the environment
  3. OPENAI_API_KEY=... in the .env file

EXAMPLES:
  # Interactive session
  deep-research "electric vehicle adoption trends"

  # Non-interactive, one --answer per clarifying question
  deep-research "EV adoption" --answer Global --answer 2020-2024 \
      --answer "policy makers" --answer "sales and charging" --answer "a report"

  # Save the Q&A summary and report as markdown
  deep-research "EV adoption" --output report.md
"#
)]
struct Args {
    /// The research topic (prompted for when omitted)
    #[arg(value_name = "TOPIC")]
    topic: Option<String>,

    /// Main model (overrides RESEARCH_MODEL)
    #[arg(short = 'm', long = "model", env = "RESEARCH_MODEL")]
    model: Option<String>,

    /// Model for clarifying questions (overrides RESEARCH_MINI_MODEL)
    #[arg(long = "mini-model", env = "RESEARCH_MINI_MODEL")]
    mini_model: Option<String>,

    /// TOML file holding `openai_api_key`
    #[arg(long = "secrets-file", value_name = "PATH", default_value = DEFAULT_SECRETS_FILE)]
    secrets_file: PathBuf,

    /// Dotenv file holding `OPENAI_API_KEY` and other settings
    #[arg(long = "env-file", value_name = "PATH", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Answer to the next clarifying question; repeat once per question
    #[arg(short = 'a', long = "answer", value_name = "TEXT")]
    answer: Vec<String>,

    /// Write the Q&A summary and the report to this markdown file
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

// =============================================================================
// PROGRESS OUTPUT
// =============================================================================
/// Prints session progress to stdout.
struct ConsoleObserver;

impl ResearchObserver for ConsoleObserver {
    fn plan_ready(&self, plan: &ResearchPlan) {
        println!("\nResearch Goal: {}", plan.goal);
        println!("Web Search Queries:");
        for query in &plan.queries {
            println!("- {}", query);
        }
    }

    fn search_started(&self, _index: usize, _total: usize, query: &str) {
        println!("Collecting data for query: {}", query);
    }

    fn search_finished(&self, index: usize, total: usize, result: &SearchResult) {
        if result.is_error() {
            println!("  (no usable search answer for: {})", result.query);
        }
        println!("Completed {} of {} searches", index, total);
    }

    fn coverage_evaluated(&self, sufficient: bool) {
        if !sufficient {
            println!("\nNot enough information. Generating more queries...");
        }
    }

    fn expansion_ready(&self, queries: &[String]) {
        for query in queries {
            println!("- {}", query);
        }
    }
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Deep research assistant starting up...");

    // The credential comes first: without it nothing reaches the provider.
    let credential = match CredentialResolver::standard(&args.secrets_file, &args.env_file).resolve() {
        Ok(credential) => credential,
        Err(e) => {
            error!(error = %e, "No API credential");
            eprintln!("\n❌ {}", e);
            eprintln!("\n💡 Tip: set it in the secrets file, as an environment variable, or in a .env file:");
            eprintln!("   export OPENAI_API_KEY=sk-...");
            return Err(e.into());
        }
    };

    let mut config = Config::from_env_file(&args.env_file)?;

    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }

    if let Some(mini_model) = args.mini_model {
        config.mini_model = mini_model;
    }

    config.validate()?;

    info!(
        model = %config.model,
        mini_model = %config.mini_model,
        base_url = %config.api_base_url,
        "Configuration loaded"
    );

    let gateway = OpenAiGateway::shared(&credential, &config.api_base_url);
    let pipeline = ResearchPipeline::from_config(gateway, &config).with_observer(ConsoleObserver);
    let mut session = ResearchSession::new();

    if let Err(e) = run_session(&pipeline, &mut session, args.topic, args.answer).await {
        error!(error = %e, phase = ?session.phase(), "Research failed");
        eprintln!("\n❌ Research failed: {:#}", e);
        return Err(e);
    }

    let document = render_markdown(&session);
    println!("\n{}", "=".repeat(60));
    println!("{}", document);
    println!("{}", "=".repeat(60));

    if let Some(path) = args.output {
        std::fs::write(&path, &document)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    info!("Research completed successfully");
    Ok(())
}

/// Topic → questions → answers → plan → research, prompting where needed.
async fn run_session<G>(
    pipeline: &ResearchPipeline<G>,
    session: &mut ResearchSession,
    topic: Option<String>,
    answers: Vec<String>,
) -> Result<()>
where
    G: deep_research::ResponsesApi,
{
    let topic = match topic {
        Some(topic) => topic,
        None => Input::<String>::new()
            .with_prompt("Enter the research topic")
            .validate_with(|input: &String| non_blank(input))
            .interact_text()?,
    };

    println!("\nResearch Topic: {}", topic.trim());
    println!("Generating clarifying questions...");
    pipeline
        .clarify(session, &topic)
        .await
        .context("Failed to generate clarifying questions")?;

    let answers = if answers.is_empty() {
        ask_answers(session.questions())?
    } else {
        answers
    };

    println!("\nGenerating research goal and queries...");
    pipeline
        .plan(session, answers)
        .await
        .context("Failed to generate the research plan")?;

    println!("\nRunning web searches...");
    pipeline
        .research(session)
        .await
        .context("Research run failed")?;

    Ok(())
}

/// Prompt for one non-empty answer per question.
fn ask_answers(questions: &[String]) -> Result<Vec<String>> {
    println!("\nPlease answer the following clarifying questions:");
    let mut answers = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        let answer: String = Input::new()
            .with_prompt(format!("Q{}: {}", i + 1, question))
            .validate_with(|input: &String| non_blank(input))
            .interact_text()?;
        answers.push(answer);
    }
    Ok(answers)
}

/// Prompt validator: whitespace-only input is asked for again.
fn non_blank(input: &str) -> std::result::Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Input cannot be blank")
    } else {
        Ok(())
    }
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
/// Logs go to stderr so stdout carries only the session itself.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
