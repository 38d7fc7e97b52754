//! Investment assistant CLI
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY=...            # or LLM_BACKEND=gemini + GEMINI_API_KEY
//! export TAVILY_API_KEY=...          # optional, enables Tavily web search
//!
//! invest-assist serve                # web UI on 127.0.0.1:8000
//! invest-assist chat                 # chat in the terminal
//! invest-assist report "AAPL, TSLA, TCS.NS"
//! ```

use agent_llm::providers::Backend;
use agent_utils::{LogFormat, env_or, init_tracing_with, load_dotenv, logging::DEFAULT_FILTER};
use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use invest_assist::{AssistConfig, ChatSession, ReportOutcome, Services, parse_symbols, web};
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "invest-assist")]
#[command(about = "Stock investment reports and finance chat", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines (also LOG_FORMAT=json)
    #[arg(long, global = true)]
    log_json: bool,

    /// Model backend: groq, gemini, openai or custom
    #[arg(long, global = true, env = "LLM_BACKEND")]
    backend: Option<String>,

    /// Model identifier (defaults to the backend's preset)
    #[arg(long, global = true, env = "LLM_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI and API
    Serve {
        /// Bind address
        #[arg(long, env = "INVEST_ASSIST_ADDR")]
        addr: Option<String>,
    },
    /// Chat with the finance + web assistant
    Chat,
    /// Generate an investment report for comma-separated symbols
    Report {
        /// e.g. "AAPL, TSLA, TCS.NS"
        symbols: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AssistConfig> {
    let mut builder = AssistConfig::builder();
    if let Some(name) = &cli.backend {
        let Some(backend) = Backend::from_name(name) else {
            bail!("unknown backend '{name}' (expected groq, gemini, openai or custom)");
        };
        builder = builder.backend(backend);
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    if let Command::Serve { addr: Some(addr) } = &cli.command {
        builder = builder.bind_addr(addr.clone());
    }
    Ok(builder.with_env()?.build()?)
}

async fn run_chat(services: &Services) -> anyhow::Result<()> {
    println!("📊 Finance + Web Assistant");
    println!("Ticker format: TCS.NS / INFY.NS (NSE), TCS.BO (BSE), NVDA / AAPL (US)");
    println!("Type /exit to quit.\n");

    let mut session = ChatSession::new("cli");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/exit" {
            break;
        }

        let result = services
            .chat
            .respond(&mut session, input, |chunk, _| {
                print!("{chunk}");
                let _ = io::stdout().flush();
            })
            .await;

        match result {
            Ok(_) => println!("\n"),
            Err(e) => eprintln!("\nError: {e}\n"),
        }
    }

    Ok(())
}

async fn run_report(services: &Services, symbols: &str) -> anyhow::Result<()> {
    let symbols = match parse_symbols(symbols) {
        Ok(symbols) => symbols,
        Err(e) => bail!("{e}"),
    };

    eprintln!("Generating investment report for {}...", symbols.join(", "));
    let outcome = services
        .pipeline
        .final_report(&symbols)
        .await
        .context("report failed")?;

    match outcome {
        ReportOutcome::NoData { message } => println!("{message}"),
        ReportOutcome::Report(report) => {
            println!("## Performance\n\n{}\n", report.performance);
            println!("{}", report.report);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::from_name(&env_or("LOG_FORMAT", "pretty"))
    };
    init_tracing_with(format, DEFAULT_FILTER);

    let config = load_config(&cli)?;
    let services = Services::from_config(config)?;

    match &cli.command {
        Command::Serve { .. } => {
            let state = services.app_state()?;
            println!("Serving on http://{}", services.config.bind_addr);
            web::serve(state, &services.config.bind_addr).await?;
        }
        Command::Chat => run_chat(&services).await?,
        Command::Report { symbols } => run_report(&services, symbols).await?,
    }

    Ok(())
}
