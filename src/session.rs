//! Interactive terminal session.
//!
//! The session reads topics from its input, runs one analysis at a time on a
//! background task and reports the outcome back to the loop over a channel.
//! Only the loop touches [`SessionState`], so no locking is involved.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::map::{extract_outlet_analysis, plot_markers, render_map, MapMarker};

pub const EMPTY_TOPIC: &str = "Please enter a topic.";
pub const ALREADY_RUNNING: &str = "An analysis is already running, please wait for it to finish.";
pub const ANALYZING: &str = "Analyzing, please wait...";
pub const NO_RESPONSE: &str = "Please analyze a topic first.";
pub const NO_OUTLET_ANALYSIS: &str = "No outlet_analysis found in LLM response.";
pub const INVALID_INPUT: &str = "Input line was not valid UTF-8 and was ignored.";

const HELP: &str = "Enter a topic to analyze its coverage across outlets.
Commands:
  :map    show the bias map for the last response
  :help   show this help
  :quit   leave the session";

/// A line of user input, interpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Analyze(String),
    ShowMap,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "" => Command::Empty,
        ":map" | ":m" => Command::ShowMap,
        ":help" | ":h" | "?" => Command::Help,
        ":quit" | ":q" | ":exit" => Command::Quit,
        topic => Command::Analyze(topic.to_string()),
    }
}

/// What the map command has to show.
#[derive(Debug, PartialEq)]
pub enum MapView {
    /// No analysis has produced a response yet.
    NoResponse,
    /// The last response held nothing that could be placed on the map.
    NoData,
    Markers(Vec<MapMarker>),
}

/// Mutable state of the session: the busy flag and the single-slot holder
/// for the last model response.
#[derive(Debug, Default)]
pub struct SessionState {
    busy: bool,
    last_response: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Accepts `topic` for analysis and marks the session busy, or explains
    /// why it cannot start.
    pub fn begin(&mut self, topic: &str) -> Result<String, &'static str> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(EMPTY_TOPIC);
        }
        if self.busy {
            return Err(ALREADY_RUNNING);
        }
        self.busy = true;
        Ok(topic.to_string())
    }

    /// Records the outcome of a run and returns the text to display.
    pub fn finish(&mut self, outcome: Result<AnalysisResult, String>) -> String {
        self.busy = false;
        match outcome {
            Ok(result) => {
                let text = format!(
                    "=== Prompt for LLM ===\n{}\n\n=== LLM Response ===\n{}",
                    result.prompt, result.response
                );
                self.last_response = Some(result.response);
                text
            }
            Err(error) => {
                self.last_response = None;
                error
            }
        }
    }

    pub fn map_view(&self) -> MapView {
        let response = match self.last_response.as_deref() {
            Some(response) if !response.is_empty() => response,
            _ => return MapView::NoResponse,
        };

        let analysis = extract_outlet_analysis(response);
        if analysis.is_empty() {
            return MapView::NoData;
        }
        MapView::Markers(plot_markers(&analysis))
    }
}

/// Runs the session until `:quit` or end of input. At end of input a running
/// analysis is allowed to finish and its outcome is printed.
pub async fn run<R, W>(analyzer: Arc<Analyzer>, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel::<Result<AnalysisResult, String>>(1);
    let mut state = SessionState::new();
    let mut lines = input.split(b'\n');
    let mut input_open = true;

    writeln!(out, "Media Coverage Perspective Analyzer")?;
    writeln!(out, "Enter topic to analyze (:help for commands):")?;
    out.flush()?;

    loop {
        if !input_open && !state.is_busy() {
            break;
        }

        tokio::select! {
            segment = lines.next_segment(), if input_open => {
                let Some(segment) = segment? else {
                    debug!("Input closed");
                    input_open = false;
                    continue;
                };
                let Some(line) = decode_line(segment) else {
                    warn!("Ignoring input line that is not valid UTF-8");
                    writeln!(out, "{}", INVALID_INPUT)?;
                    out.flush()?;
                    continue;
                };

                match parse_command(&line) {
                    Command::Empty => writeln!(out, "{}", EMPTY_TOPIC)?,
                    Command::Help => writeln!(out, "{}", HELP)?,
                    Command::Quit => break,
                    Command::ShowMap => match state.map_view() {
                        MapView::NoResponse => writeln!(out, "{}", NO_RESPONSE)?,
                        MapView::NoData => writeln!(out, "{}", NO_OUTLET_ANALYSIS)?,
                        MapView::Markers(markers) => write!(out, "{}", render_map(&markers))?,
                    },
                    Command::Analyze(topic) => match state.begin(&topic) {
                        Ok(topic) => {
                            writeln!(out, "{}", ANALYZING)?;
                            info!("Starting analysis for topic '{}'", topic);
                            let analyzer = Arc::clone(&analyzer);
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let outcome = analyzer.analyze(&topic).await.map_err(|e| e.to_string());
                                let _ = tx.send(outcome).await;
                            });
                        }
                        Err(notice) => writeln!(out, "{}", notice)?,
                    },
                }
                out.flush()?;
            }
            Some(outcome) = rx.recv() => {
                let text = state.finish(outcome);
                writeln!(out, "{}", text)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}

/// Decodes one newline-delimited input segment, dropping a trailing `\r`.
fn decode_line(mut segment: Vec<u8>) -> Option<String> {
    if segment.last() == Some(&b'\r') {
        segment.pop();
    }
    String::from_utf8(segment).ok()
}
