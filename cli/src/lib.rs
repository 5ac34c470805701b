use image::{imageops, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shapes::{blend, Annotator, ClassificationReport, Pipeline, ShapeError, StrokeCanvas};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Weight of the background frame when overlaying the canvas
pub const FRAME_WEIGHT: f32 = 0.7;
/// Weight of the stroke canvas when overlaying it on the frame
pub const CANVAS_WEIGHT: f32 = 0.3;
/// Every save overwrites this file in the output directory
pub const SAVED_FRAME_NAME: &str = "annotated_frame.jpg";

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    ShapeError(#[from] ShapeError),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Keyboard commands understood by a drawing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum KeyCommand {
    ToggleMode,
    Save,
    Clear,
    Quit,
}

impl KeyCommand {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'm' => Some(KeyCommand::ToggleMode),
            's' => Some(KeyCommand::Save),
            'c' => Some(KeyCommand::Clear),
            'q' => Some(KeyCommand::Quit),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            KeyCommand::ToggleMode => 'm',
            KeyCommand::Save => 's',
            KeyCommand::Clear => 'c',
            KeyCommand::Quit => 'q',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            KeyCommand::ToggleMode => "Toggle between draw and erase modes",
            KeyCommand::Save => "Save the annotated frame and detect shapes",
            KeyCommand::Clear => "Clear the canvas",
            KeyCommand::Quit => "Quit the session",
        }
    }
}

/// One recorded user action
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Mouse down at the first point, drag through the rest, release at the last
    Stroke { points: Vec<[i32; 2]> },
    Key { key: char },
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("frames")
}

/// Scripted drawing session
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionScript {
    /// Frame the strokes are drawn over; black when absent
    pub background: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl SessionScript {
    /// Load a session script from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a session script from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a session script from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a session script from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the script.
    /// A relative background path is taken relative to the script's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let mut script = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref)?,
            Some("json") => Self::from_json_file(path_ref)?,
            _ => return Err(SessionError::UnsupportedFileFormat),
        };
        if let (Some(background), Some(base)) = (script.background.as_mut(), path_ref.parent()) {
            if background.is_relative() {
                *background = base.join(&*background);
            }
        }
        Ok(script)
    }
}

/// What the caller should do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Saved(SavedFrame),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedFrame {
    pub path: PathBuf,
    /// `None` when detection failed and the frame was written unlabelled
    pub report: Option<ClassificationReport>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub events_processed: usize,
    pub saves: Vec<SavedFrame>,
    pub quit: bool,
}

/// Drawing session: a background frame, a stroke canvas and a detector.
pub struct Session {
    canvas: StrokeCanvas,
    background: RgbImage,
    pipeline: Pipeline,
    annotator: Annotator,
    output_dir: PathBuf,
}

impl Session {
    pub fn new(background: RgbImage, output_dir: impl Into<PathBuf>, pipeline: Pipeline) -> Result<Self> {
        let canvas = StrokeCanvas::new(background.width(), background.height())?;
        Ok(Self {
            canvas,
            background,
            pipeline,
            annotator: Annotator::default(),
            output_dir: output_dir.into(),
        })
    }

    /// Set up the frame described by a script. An explicit size resizes the background.
    pub fn from_script(script: &SessionScript, pipeline: Pipeline) -> Result<Self> {
        let background = match &script.background {
            Some(path) => {
                let image = image::open(path)?.to_rgb8();
                match (script.width, script.height) {
                    (Some(width), Some(height)) if (width, height) != image.dimensions() => {
                        debug!(width, height, "resizing background");
                        imageops::resize(&image, width, height, imageops::FilterType::Triangle)
                    }
                    _ => image,
                }
            }
            None => RgbImage::new(
                script.width.unwrap_or(DEFAULT_WIDTH),
                script.height.unwrap_or(DEFAULT_HEIGHT),
            ),
        };
        Self::new(background, &script.output_dir, pipeline)
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    /// Replay events in order until they run out or a quit key arrives
    pub fn run(&mut self, events: &[SessionEvent]) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        for event in events {
            summary.events_processed += 1;
            match self.apply(event)? {
                Flow::Continue => {}
                Flow::Saved(frame) => summary.saves.push(frame),
                Flow::Quit => {
                    summary.quit = true;
                    break;
                }
            }
        }
        info!(
            events = summary.events_processed,
            saves = summary.saves.len(),
            quit = summary.quit,
            "session finished"
        );
        Ok(summary)
    }

    pub fn apply(&mut self, event: &SessionEvent) -> Result<Flow> {
        match event {
            SessionEvent::Stroke { points } => {
                self.canvas.stroke(points);
                Ok(Flow::Continue)
            }
            SessionEvent::Key { key } => match KeyCommand::from_key(*key) {
                Some(command) => self.handle_key(command),
                None => {
                    debug!(%key, "ignoring unbound key");
                    Ok(Flow::Continue)
                }
            },
        }
    }

    pub fn handle_key(&mut self, command: KeyCommand) -> Result<Flow> {
        match command {
            KeyCommand::ToggleMode => {
                let mode = self.canvas.toggle_mode();
                info!(%mode, "switched stroke mode");
                Ok(Flow::Continue)
            }
            KeyCommand::Save => Ok(Flow::Saved(self.save()?)),
            KeyCommand::Clear => {
                self.canvas.clear();
                Ok(Flow::Continue)
            }
            KeyCommand::Quit => Ok(Flow::Quit),
        }
    }

    /// Blend the canvas over the frame, label what was drawn and write the result
    pub fn save(&self) -> Result<SavedFrame> {
        let mut frame = blend(&self.background, self.canvas.image(), FRAME_WEIGHT, CANVAS_WEIGHT)?;

        let report = match self.pipeline.process(&self.canvas.snapshot()) {
            Ok(report) => {
                self.annotator.annotate(&mut frame, &report);
                Some(report)
            }
            Err(err) => {
                warn!(%err, "shape detection failed, saving frame without labels");
                None
            }
        };

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(SAVED_FRAME_NAME);
        frame.save(&path)?;
        info!("Saved: {}", path.display());

        if let Some(report) = &report {
            match report.largest() {
                Some(shape) => info!(total = report.shapes.len(), "Detected shape: {}", shape.label),
                None => info!("Detected shape: none"),
            }
        }

        Ok(SavedFrame { path, report })
    }
}
