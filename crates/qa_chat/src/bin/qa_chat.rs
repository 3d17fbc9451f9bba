//! qa-chat: terminal front-end for the question-answering service.
//! Asks a single question given on the command line, or runs a conversation
//! over stdin lines, printing each answer to stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use qa_chat::config::{self, Config};
use qa_chat::view::{render_message, PROCESSING_LABEL};
use qa_chat::{HttpClient, Rejection, SessionController, Submission, UploadForm};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "qa-chat", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: ~/.qa-chat/config.yaml)
    #[arg(short, long, global = true, env = "QA_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Answer service base URL (overrides config and QA_CHAT_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Seconds to wait for an answer; 0 waits indefinitely
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ask this question and exit instead of reading stdin
    question: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV file to the service
    Upload {
        /// File to upload
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "qa_chat=debug" } else { "qa_chat=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match config::default_config_path() {
            Some(path) => config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    cfg.apply_env();
    if let Some(url) = &cli.base_url {
        cfg.service.base_url = Some(url.clone());
    }
    if let Some(secs) = cli.timeout {
        cfg.service.timeout_secs = Some(secs);
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cfg = load_config(&cli)?;
    let client = HttpClient::new(cfg.base_url()).context("failed to build HTTP client")?;

    if let Some(Command::Upload { file }) = cli.command {
        let mut form = UploadForm::new();
        form.select(file);
        let status = form.submit(&client).await.to_string();
        if form.uploaded() {
            println!("{}", status);
            return Ok(ExitCode::SUCCESS);
        }
        eprintln!("Error: {}", status);
        return Ok(ExitCode::FAILURE);
    }

    let controller = SessionController::new(Arc::new(client), cfg.session_options());

    if !cli.question.is_empty() {
        return Ok(ask_once(&controller, &cli.question.join(" ")).await);
    }
    converse(controller).await?;
    Ok(ExitCode::SUCCESS)
}

async fn ask_once(controller: &SessionController, question: &str) -> ExitCode {
    match controller.submit(question).await {
        Submission::Answered(reply) => {
            println!("{}", reply.text);
            ExitCode::SUCCESS
        }
        Submission::Failed { reply, .. } => {
            eprintln!("Error: {}", reply.text);
            ExitCode::FAILURE
        }
        Submission::Rejected(_) => {
            eprintln!("Error: no question provided");
            ExitCode::FAILURE
        }
    }
}

async fn converse(controller: SessionController) -> anyhow::Result<()> {
    for message in controller.transcript() {
        println!("{}", render_message(&message));
    }

    let mut status = controller.subscribe();
    let indicator = tokio::spawn(async move {
        let mut was_pending = false;
        while status.changed().await.is_ok() {
            let pending = status.borrow_and_update().pending;
            if pending && !was_pending {
                eprintln!("{}", PROCESSING_LABEL);
            }
            was_pending = pending;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match controller.submit(&line).await {
            Submission::Rejected(Rejection::Empty) => continue,
            Submission::Rejected(Rejection::Busy) => {
                eprintln!("A question is already being answered");
            }
            submission => {
                if let Some(reply) = submission.reply() {
                    println!("{}", render_message(reply));
                }
            }
        }
    }

    drop(controller);
    let _ = tokio::time::timeout(Duration::from_secs(1), indicator).await;
    Ok(())
}
