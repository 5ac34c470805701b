use clap::{Parser, Subcommand};
use cli::{Session, SessionScript};
use color_eyre::eyre::Result;
use shapes::{Annotator, DetectorConfig, Pipeline, PipelineBuilder};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Detector configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Pixels per font cell for shape labels
    #[arg(long, global = true, default_value_t = 2)]
    label_scale: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the shapes drawn in a mask image (bright strokes on a dark background)
    Classify {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the annotated image
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the classification report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a scripted drawing session
    Replay {
        /// Path to the session script (.toml or .json)
        #[arg(short, long)]
        script: PathBuf,
    },
    /// Print a JSON schema
    Schema {
        /// Describe session scripts instead of the detector config
        #[arg(long)]
        session: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();
    let annotator = Annotator { scale: cli.label_scale, ..Default::default() };

    match &cli.command {
        Commands::Classify { input, output, json } => {
            let pipeline = load_pipeline(cli.config.as_deref())?;
            classify(&pipeline, &annotator, input, output.as_deref(), *json)?;
        }
        Commands::Replay { script } => {
            let pipeline = load_pipeline(cli.config.as_deref())?;
            replay(pipeline, annotator, script)?;
        }
        Commands::Schema { session } => {
            let schema = if *session {
                serde_json::to_string_pretty(&schemars::schema_for!(SessionScript))?
            } else {
                serde_json::to_string_pretty(&DetectorConfig::schema())?
            };
            println!("{schema}");
        }
    }

    Ok(())
}

fn load_pipeline(config_path: Option<&Path>) -> Result<Pipeline> {
    let config = match config_path {
        Some(path) => {
            info!("Loading detector config from {:?}", path);
            DetectorConfig::from_file(path)?
        }
        None => DetectorConfig::default(),
    };
    let pipeline = PipelineBuilder::from_config(&config).build();
    info!("{}", pipeline.info());
    Ok(pipeline)
}

fn classify(
    pipeline: &Pipeline,
    annotator: &Annotator,
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let image = image::open(input)?;
    let report = pipeline.process_image(&image.to_luma8())?;

    for shape in &report.shapes {
        info!(
            vertices = shape.vertex_count,
            "{} at ({:.1}, {:.1})",
            shape.label,
            shape.centroid[0],
            shape.centroid[1]
        );
    }
    if let Some(shape) = report.largest() {
        info!("Detected shape: {}", shape.label);
    }

    if let Some(output) = output {
        let mut frame = image.to_rgb8();
        annotator.annotate(&mut frame, &report);
        frame.save(output)?;
        info!("Saved: {:?}", output);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn replay(pipeline: Pipeline, annotator: Annotator, script_path: &Path) -> Result<()> {
    let script = SessionScript::from_file(script_path)?;
    info!(events = script.events.len(), "Replaying session {:?}", script_path);

    let mut session = Session::from_script(&script, pipeline)?.with_annotator(annotator);
    let summary = session.run(&script.events)?;

    for saved in &summary.saves {
        let shapes = saved.report.as_ref().map_or(0, |report| report.shapes.len());
        info!(shapes, "Frame written to {:?}", saved.path);
    }
    Ok(())
}
