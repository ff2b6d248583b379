//! Command-line front end for the deep research client.
//!
//! Streams the report live by default; `--no-stream` switches to the
//! polling controller for environments where a long-lived connection is
//! impractical.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use deepresearch::protocol::{AgentConfig, DEFAULT_AGENT, FileSearchStore};
use deepresearch::report::ReportWriter;
use deepresearch::view::StatusLine;
use deepresearch::{Error, ResearchClient, ResearchRequest, Result};
use tracing_subscriber::EnvFilter;

const KNOWN_ISSUE_TIP: &str = "Tip: this is a known intermittent issue with the deep research \
                               preview model. Please try running the command again.";

/// Run deep research from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "deepresearch",
    version,
    about,
    group(ArgGroup::new("prompt_source").required(true)),
    after_help = "Examples:
  deepresearch \"Research the history of quantum computing\"
  deepresearch \"Research AI trends\" --output report.md
  deepresearch --prompt-file prompt.md --no-stream
  deepresearch \"Summarize in 3 bullets\" --previous-interaction-id <id> --model gemini-2.5-pro
  deepresearch \"Analyze our Q1 report\" --file-search fileSearchStores/my-store"
)]
struct Cli {
    /// The research prompt to execute.
    #[arg(group = "prompt_source")]
    prompt: Option<String>,

    /// Path to a file containing the research prompt (e.g. prompt.md).
    #[arg(long, value_name = "PATH", group = "prompt_source")]
    prompt_file: Option<PathBuf>,

    /// Name of the agent to use.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_AGENT)]
    agent_name: String,

    /// Path to save the research report.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Continue from a completed interaction (for follow-up questions).
    #[arg(long, value_name = "ID")]
    previous_interaction_id: Option<String>,

    /// Use a model instead of an agent for follow-ups (e.g. gemini-2.5-pro).
    #[arg(long, value_name = "NAME", requires = "previous_interaction_id")]
    model: Option<String>,

    /// File search store to expose to the agent (repeatable).
    #[arg(long = "file-search", value_name = "STORE", value_parser = FileSearchStore::parse)]
    file_search: Vec<FileSearchStore>,

    /// Agent config as inline JSON or a path to a JSON file.
    #[arg(long, value_name = "JSON")]
    agent_config: Option<String>,

    /// Use polling mode instead of streaming.
    #[arg(long)]
    no_stream: bool,

    /// Enable debug logging for this crate.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("An error occurred: {err}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\nResearch cancelled by user.");
            ExitCode::SUCCESS
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let prompt = read_prompt(&cli)?;
    let request = build_request(&cli, prompt)?;

    // Open the output file before any network work so a bad path fails fast.
    let mut writer = match &cli.output {
        Some(path) => ReportWriter::to_file(path)?,
        None => ReportWriter::in_memory(),
    };

    let client = ResearchClient::new()?;
    let status = StatusLine::new();
    let outcome = if cli.no_stream {
        run_polling(&client, request, &mut writer, &status).await
    } else {
        run_streaming(&client, request, &mut writer, &status).await
    };
    status.done();
    outcome?;

    match writer.path() {
        Some(path) => println!("Report saved to {}", path.display()),
        None => println!("{}", writer.text()),
    }
    Ok(())
}

/// Drive the streaming mode: consume the resilient event stream, mirror
/// text deltas into the report, and surface thought summaries on the
/// status line.
async fn run_streaming(
    client: &ResearchClient,
    request: ResearchRequest,
    writer: &mut ReportWriter,
    status: &StatusLine,
) -> Result<()> {
    status.update("Connecting...");
    let mut stream = client.stream_research(request).await?;

    while let Some(event) = stream.next_event().await {
        let event = event?;
        if let Some(id) = event.interaction_id() {
            tracing::debug!(interaction = %id, "research started");
            status.update("Research started...");
        }
        if let Some(text) = event.text_delta() {
            writer.push(text)?;
        }
        if let Some(thought) = event.thought_summary() {
            status.thought(thought);
        }
        if let Some(error) = event.as_error() {
            let message = error.to_string();
            if message.contains("Function call is empty") {
                status.println(KNOWN_ISSUE_TIP);
            }
            return Err(Error::ResearchFailed { message });
        }
    }

    // A run that completes without text finalizes quietly; only the
    // polling mode treats an empty report as a failure.
    Ok(())
}

/// Drive the polling mode: run the interaction in the background and
/// report each status check on the status line.
async fn run_polling(
    client: &ResearchClient,
    request: ResearchRequest,
    writer: &mut ReportWriter,
    status: &StatusLine,
) -> Result<()> {
    status.update("Starting background research...");

    let mut polls: u32 = 0;
    let report = client
        .poll_research(request, |snapshot| {
            if polls == 0 {
                tracing::debug!(interaction = %snapshot.id, "research started");
            }
            status.update(format!("Status: {} (poll {polls})", snapshot.status));
            polls += 1;
        })
        .await?;

    writer.push(&report.text)?;
    Ok(())
}

fn read_prompt(cli: &Cli) -> Result<String> {
    match (&cli.prompt, &cli.prompt_file) {
        (Some(prompt), _) => Ok(prompt.clone()),
        (None, Some(path)) => {
            std::fs::read_to_string(path).map_err(|e| Error::read_failed(path, e))
        }
        // Unreachable behind the arg group, kept total anyway.
        (None, None) => Err(Error::invalid_config("a prompt or --prompt-file is required")),
    }
}

fn build_request(cli: &Cli, prompt: String) -> Result<ResearchRequest> {
    let mut builder = ResearchRequest::builder(prompt).agent_name(cli.agent_name.as_str());
    if let Some(raw) = &cli.agent_config {
        builder = builder.agent_config(AgentConfig::from_arg(raw)?);
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(id) = &cli.previous_interaction_id {
        builder = builder.previous_interaction_id(id.as_str());
    }
    builder
        .file_search_stores(cli.file_search.iter().cloned())
        .build()
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "deepresearch=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
