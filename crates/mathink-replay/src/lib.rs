//! MathInk replay harness.
//!
//! Drives a [`CanvasSession`] from a recorded JSON script of input events and
//! toolbar commands, then writes the export snapshot.
//!
//! ```bash
//! mathink-replay --script events.json --out snapshot.png --payload request.json
//! ```
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "type": "set_width", "width": 4.0 },
//!   { "type": "input", "contact_id": 1, "device": "stylus", "phase": "start",
//!     "screen_x": 10.0, "screen_y": 10.0, "timestamp_ms": 0 },
//!   { "type": "undo" }
//! ]
//! ```

use clap::Parser;
use mathink_core::{CanvasSession, EngineConfig, InkColor, InkError, InputEvent, SessionNotice, ToolKind};
use mathink_render::{ExportOptions, OcrRequest, RenderError, export_png};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Command-line arguments for mathink-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "mathink-replay")]
#[command(about = "Replay a recorded MathInk session and export the snapshot")]
#[command(version)]
pub struct CliArgs {
    /// JSON script of replay steps
    #[arg(long)]
    pub script: PathBuf,

    /// Engine configuration JSON (defaults when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(long)]
    pub out: PathBuf,

    /// Export width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Export height in pixels
    #[arg(long, default_value = "400")]
    pub height: u32,

    /// Also write the recognition request body to this path
    #[arg(long)]
    pub payload: Option<PathBuf>,
}

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid engine config: {0}")]
    Config(#[from] InkError),
    #[error("Export failed: {0}")]
    Render(#[from] RenderError),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayStep {
    Input(InputEvent),
    SetTool { tool: ToolKind },
    SetColor { color: InkColor },
    SetWidth { width: f64 },
    Undo,
    Redo,
    Clear,
    Interrupt,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplaySummary {
    pub steps: usize,
    /// Steps that changed the session.
    pub changed: usize,
    pub strokes: usize,
    pub notices: Vec<SessionNotice>,
}

/// Apply steps to a session in order.
pub fn replay(session: &mut CanvasSession, steps: &[ReplayStep]) -> ReplaySummary {
    let mut summary = ReplaySummary {
        steps: steps.len(),
        ..Default::default()
    };
    for step in steps {
        let changed = match step {
            ReplayStep::Input(event) => session.handle_input(event),
            ReplayStep::SetTool { tool } => {
                session.set_tool(*tool);
                true
            }
            ReplayStep::SetColor { color } => {
                session.set_color(*color);
                true
            }
            ReplayStep::SetWidth { width } => session.set_width(*width),
            ReplayStep::Undo => session.undo(),
            ReplayStep::Redo => session.redo(),
            ReplayStep::Clear => session.clear(),
            ReplayStep::Interrupt => session.interrupt(),
        };
        if changed {
            summary.changed += 1;
        }
        summary.notices.extend(session.take_notices());
    }
    summary.strokes = session.strokes().len();
    summary
}

fn read(path: &Path) -> ReplayResult<String> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> ReplayResult<()> {
    std::fs::write(path, contents).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate an engine config file.
pub fn load_config(path: &Path) -> ReplayResult<EngineConfig> {
    Ok(EngineConfig::from_json(&read(path)?)?)
}

/// Load a replay script.
pub fn load_script(path: &Path) -> ReplayResult<Vec<ReplayStep>> {
    Ok(serde_json::from_str(&read(path)?)?)
}

/// Run a full replay as described by the command line.
pub fn run(args: &CliArgs) -> ReplayResult<ReplaySummary> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut session = CanvasSession::with_config(config)?;
    let steps = load_script(&args.script)?;
    log::info!("replaying {} steps from {}", steps.len(), args.script.display());

    let summary = replay(&mut session, &steps);
    for notice in &summary.notices {
        log::warn!("session notice: {:?}", notice);
    }

    let options = ExportOptions {
        width: args.width,
        height: args.height,
        ..Default::default()
    };
    let png = export_png(&session.snapshot_for_export(), &options)?;
    write(&args.out, &png)?;
    log::info!("wrote {} ({} bytes)", args.out.display(), png.len());

    if let Some(path) = &args.payload {
        let request = OcrRequest::from_png(&png);
        write(path, serde_json::to_string_pretty(&request)?.as_bytes())?;
        log::info!("wrote request payload {}", path.display());
    }
    Ok(summary)
}
