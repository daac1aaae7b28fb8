use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use newslens::environment::{timeout_from_secs, Config};
use newslens::logging;
use newslens::outlet::default_outlets;
use newslens::rss::{FeedEntry, FeedFetcher, RssFeedStatus};
use std::process;

/// Diagnose a single feed, or every built-in outlet with --all.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Feed URL to test
    #[arg(required_unless_present = "all")]
    url: Option<String>,

    /// Test every built-in outlet's feed
    #[arg(long)]
    all: bool,

    /// Show which entries match this topic
    #[arg(short, long)]
    topic: Option<String>,

    /// Maximum matching entries to keep
    #[arg(short, long)]
    max_articles: Option<usize>,

    /// Request timeout in seconds, 0 for none
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();
    let config = Config::from_env();
    let timeout = cli.timeout.map(timeout_from_secs).unwrap_or(config.feed_timeout);
    let max_articles = cli.max_articles.unwrap_or(config.max_articles);
    let fetcher = FeedFetcher::new(timeout)?;

    if cli.all {
        let mut failures = 0;
        for outlet in default_outlets() {
            let result = fetcher
                .test_rss_feed(&outlet.feed_url, cli.topic.as_deref(), max_articles)
                .await;
            let status = match result.status {
                RssFeedStatus::Success => format!("{:?}", result.status).bright_green(),
                _ => {
                    failures += 1;
                    format!("{:?}", result.status).bright_red()
                }
            };
            let matching = match cli.topic {
                Some(_) => format!(", {} matching", result.matching.len()),
                None => String::new(),
            };
            println!(
                "{:<22} {:<15} {:>4} entries{}  {}",
                outlet.name.bright_white(),
                status,
                result.entries_found,
                matching,
                outlet.feed_url.dimmed()
            );
            for error in &result.errors {
                println!("    {}", error.bright_red());
            }
        }
        process::exit(if failures == 0 { 0 } else { 1 });
    }

    let url = cli.url.unwrap_or_default();
    println!("Testing RSS feed: {}", url);
    let result = fetcher.test_rss_feed(&url, cli.topic.as_deref(), max_articles).await;

    println!("\n{}", "═".repeat(100).bright_blue());
    println!("{}  {}", "FEED DIAGNOSTICS".bright_blue(), url.bright_yellow());
    println!("{}", "═".repeat(100).bright_blue());

    let status_str = format!("{:?}", result.status);
    let colored_status = match result.status {
        RssFeedStatus::Success => status_str.bright_green(),
        RssFeedStatus::RequestFailed | RssFeedStatus::InvalidUrl => status_str.bright_red(),
        _ => status_str.bright_yellow(),
    };
    println!("{}: {}", "Status".bright_blue(), colored_status);

    match result.http_status {
        Some(code) => println!("{}: {}", "HTTP Status".bright_blue(), code),
        None => println!("{}: {}", "HTTP Status".bright_blue(), "None".dimmed()),
    }
    match result.content_type {
        Some(ref content_type) => println!("{}: {}", "Content-Type".bright_blue(), content_type),
        None => println!("{}: {}", "Content-Type".bright_blue(), "None".dimmed()),
    }
    println!("{}: {}", "Entries Found".bright_blue(), result.entries_found);

    if !result.warnings.is_empty() {
        println!("\n{}", "Warnings".bright_yellow());
        println!("{}", "─".repeat(80).dimmed());
        for (i, warning) in result.warnings.iter().enumerate() {
            println!("{}. {}", i + 1, warning);
        }
    }

    if !result.errors.is_empty() {
        println!("\n{}", "Errors".bright_red());
        println!("{}", "─".repeat(80).dimmed());
        for (i, error) in result.errors.iter().enumerate() {
            println!("{}. {}", i + 1, error.bright_red());
        }
    }

    if !result.entries.is_empty() {
        println!("\n{}", "Feed Entries".bright_green());
        println!("{}", "─".repeat(80).dimmed());
        print_entries(&result.entries, 5);
    }

    if let Some(ref topic) = cli.topic {
        println!("\n{} {}", "Entries matching".bright_green(), topic.bright_yellow());
        println!("{}", "─".repeat(80).dimmed());
        if result.matching.is_empty() {
            println!("{}", "None".dimmed());
        } else {
            print_entries(&result.matching, max_articles);
        }
    }

    println!("\n{}", "═".repeat(100).bright_blue());

    match result.status {
        RssFeedStatus::Success => {
            println!("Feed test completed successfully with {} entries found", result.entries_found);
            process::exit(0);
        }
        _ => {
            eprintln!("Feed test completed with errors: {:?}", result.status);
            process::exit(1);
        }
    }
}

fn print_entries(entries: &[FeedEntry], limit: usize) {
    for (i, entry) in entries.iter().take(limit).enumerate() {
        let title = if entry.title.is_empty() { "[No Title]" } else { &entry.title };
        let link = if entry.link.is_empty() { "[No URL]" } else { &entry.link };
        let pub_date = entry
            .published
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "[No Date]".to_string());

        println!(
            "{}. {} ({})\n   {}",
            i + 1,
            title.bright_white(),
            pub_date.dimmed(),
            link.bright_cyan()
        );
    }

    if entries.len() > limit {
        println!("... and {} more entries", entries.len() - limit);
    }
}
