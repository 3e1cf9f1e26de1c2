//! vero command-line demo
//!
//! Asks a tool-using agent one question against an OpenAI-compatible
//! endpoint configured from the environment (or a `.env` file).
//!
//! ```text
//! vero --agent function "What is 17% of 2,340?"
//! vero --agent simple --max-turns 3 "What day is it today?"
//! vero --agent react "What is sqrt(2) to the power of 4?"
//! vero --stream "Tell me a short joke."
//! ```

mod tools;

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vero_core::{AgentBuilder, LlmClient, Message};
use vero_runtime::OpenAiClient;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentKind {
    /// `TOOL_CALL:` text directives, for models without function calling
    Simple,
    /// Native function calling
    Function,
    /// Thought / Action / Action Input steps with a scratchpad
    React,
}

#[derive(Debug, Parser)]
#[command(name = "vero", version, about = "Ask a tool-using LLM agent a question")]
struct Cli {
    /// The question to ask
    #[arg(required = true)]
    question: Vec<String>,

    #[arg(long, value_enum, default_value_t = AgentKind::Function)]
    agent: AgentKind,

    /// Model calls allowed before giving up (default depends on the agent)
    #[arg(long)]
    max_turns: Option<usize>,

    /// Stream a plain chat reply instead of running the agent
    #[arg(long)]
    stream: bool,

    /// Replace the agent's default system prompt
    #[arg(long)]
    system_prompt: Option<String>,

    /// Run the tool calls of one turn concurrently
    #[arg(long)]
    concurrent: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let question = cli.question.join(" ");

    let client = Arc::new(OpenAiClient::from_env().context("failed to configure the LLM client")?);

    if cli.stream {
        return stream_reply(client.as_ref(), &question).await;
    }

    let mut builder = AgentBuilder::new()
        .name("vero-cli")
        .client(client)
        .tools(tools::builtin_tools()?)
        .concurrent_tool_calls(cli.concurrent);
    if let Some(max) = cli.max_turns {
        builder = builder.max_turns(max);
    }
    if let Some(prompt) = cli.system_prompt {
        builder = builder.system_prompt(prompt);
    }

    let started = Instant::now();
    let result = match cli.agent {
        AgentKind::Simple => builder.build_simple()?.run(&question).await,
        AgentKind::Function => builder.build_function_calling()?.run(&question).await,
        AgentKind::React => builder.build_react()?.run(&question).await,
    };
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(answer) => {
            tracing::info!(agent = ?cli.agent, elapsed_ms, "Agent finished");
            println!("{answer}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}

/// Print a streamed reply fragment by fragment
async fn stream_reply(client: &dyn LlmClient, question: &str) -> anyhow::Result<()> {
    let mut stream = client.generate_stream(&[Message::user(question)]).await?;
    let mut stdout = std::io::stdout();

    while let Some(fragment) = stream.next().await {
        write!(stdout, "{}", fragment?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}
