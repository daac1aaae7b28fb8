use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use newslens::environment::{timeout_from_secs, Config};
use newslens::map::{extract_outlet_analysis, plot_markers, render_map};
use newslens::session::{self, NO_OUTLET_ANALYSIS};
use newslens::{logging, Analyzer};
use prettytable::{format, row, Table};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Compare how news outlets cover a topic using a local LLM", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Command-line overrides for values otherwise read from the environment.
#[derive(Args)]
struct Overrides {
    /// Ollama host [env: OLLAMA_HOST]
    #[arg(long, global = true)]
    ollama_host: Option<String>,

    /// Ollama port [env: OLLAMA_PORT]
    #[arg(long, global = true)]
    ollama_port: Option<u16>,

    /// Model used for the analysis [env: OLLAMA_MODEL]
    #[arg(long, global = true)]
    model: Option<String>,

    /// Maximum matching articles kept per outlet [env: MAX_ARTICLES]
    #[arg(long, global = true)]
    max_articles: Option<usize>,

    /// Feed request timeout in seconds, 0 for none [env: FEED_TIMEOUT_SECS]
    #[arg(long, global = true)]
    feed_timeout: Option<u64>,

    /// JSON file replacing the built-in outlet list [env: OUTLETS_PATH]
    #[arg(long, global = true)]
    outlets: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.ollama_host {
            config.ollama_host = host;
        }
        if let Some(port) = self.ollama_port {
            config.ollama_port = port;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(max_articles) = self.max_articles {
            config.max_articles = max_articles;
        }
        if let Some(secs) = self.feed_timeout {
            config.feed_timeout = timeout_from_secs(secs);
        }
        if let Some(path) = self.outlets {
            config.outlets_path = Some(path);
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Enter topics interactively (the default)
    Interactive,

    /// Analyze a single topic and print the prompt and model response
    Analyze {
        /// Topic to look for in every outlet's feed
        topic: String,

        /// Also print the bias map extracted from the response
        #[arg(long)]
        map: bool,

        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the configured outlets
    Outlets,

    /// Check that the Ollama endpoint is reachable and list its models
    CheckOllama,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.overrides.apply(&mut config);
    info!(
        "Using model {} at {}:{}",
        config.model, config.ollama_host, config.ollama_port
    );

    let analyzer = Analyzer::from_config(&config)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            session::run(Arc::new(analyzer), stdin, &mut stdout).await?;
        }

        Commands::Analyze { topic, map, json } => {
            let topic = topic.trim();
            if topic.is_empty() {
                println!("No topic entered. Exiting.");
                return Ok(());
            }

            let result = match analyzer.analyze(topic).await {
                Ok(result) => result,
                Err(e) => {
                    println!("{}", e);
                    return Ok(());
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", "=== Prompt for LLM ===".bright_blue());
                println!("{}", result.prompt);
                println!("\n{}", "=== LLM Response ===".bright_blue());
                println!("{}", result.response);
            }

            if map {
                let analysis = extract_outlet_analysis(&result.response);
                if analysis.is_empty() {
                    println!("{}", NO_OUTLET_ANALYSIS);
                } else {
                    print!("{}", render_map(&plot_markers(&analysis)));
                }
            }
        }

        Commands::Outlets => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            table.set_titles(row!["Outlet", "Country", "Feed"]);
            for outlet in analyzer.outlets() {
                table.add_row(row![outlet.name, outlet.country, outlet.feed_url]);
            }
            table.printstd();
        }

        Commands::CheckOllama => {
            let llm = analyzer.llm();
            println!("Checking Ollama endpoint {}", llm.endpoint().bright_yellow());
            match llm.list_models().await {
                Ok(models) => {
                    println!("{}", "UP".bright_green());
                    for name in &models {
                        let marker = if name == llm.model() { "*".bright_green() } else { " ".normal() };
                        println!(" {} {}", marker, name);
                    }
                    if !models.iter().any(|m| m == llm.model()) {
                        warn!("Configured model {} is not installed", llm.model());
                    }
                }
                Err(e) => {
                    println!("{} {}", "DOWN".bright_red(), e);
                }
            }
        }
    }

    Ok(())
}
