use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use handstream_core::capture::infrastructure::image_sequence_source::{read_frame, ImageSequenceSource};
use handstream_core::capture::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use handstream_core::capture::infrastructure::json_landmark_source::JsonLandmarkSource;
use handstream_core::pipeline::detect_image_use_case::DetectImageUseCase;
use handstream_core::pipeline::drive_loop::{DriveLoop, RenderOptions};
use handstream_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use handstream_core::render::domain::drawing_surface::DrawingSurface;
use handstream_core::render::domain::label_table::LabelTable;
use handstream_core::render::domain::viewport::Fit;
use handstream_core::render::infrastructure::json_lines_surface::JsonLinesSurface;
use handstream_core::shared::constants::{IMAGE_QUALITY, IMAGE_TARGET_WIDTH};
use handstream_core::shared::settings::{
    detector_url, image_detect_url, PipelineSettings, Reachability,
};
use handstream_core::stream::domain::stream_client::StreamClient;
use handstream_core::stream::infrastructure::http_detector::HttpDetector;
use handstream_core::stream::infrastructure::websocket_transport::WebSocketTransport;
use handstream_core::tracking::domain::track_smoother::ExponentialSmoother;

/// Streams hand-region crops to a detector and tracks what it finds.
#[derive(Parser)]
#[command(name = "handstream")]
struct Cli {
    /// Detector API base, e.g. http://localhost:8000.
    api_base: String,

    /// Directory of frames, played back in file-name order.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// JSON file with one landmark signal per frame.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Detect once on a single image instead of streaming frames.
    #[arg(long, conflicts_with_all = ["frames", "landmarks"])]
    image: Option<PathBuf>,

    /// JSON array of class names, indexed by class id.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Settings file (default: <config dir>/handstream/settings.json).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Mirror the overlay horizontally.
    #[arg(long)]
    mirror: bool,

    /// Viewport size as WIDTHxHEIGHT (default: source frame size).
    #[arg(long)]
    viewport: Option<String>,

    /// How frames fill the viewport: cover or contain.
    #[arg(long, default_value = "cover")]
    fit: String,

    /// Write scene records here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log a status line every N ticks.
    #[arg(long, default_value = "60")]
    report_every: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let render = render_options(&cli)?;
    if let Some(image) = &cli.image {
        return run_image(&cli, image, render);
    }
    // validate() guarantees both are set when no image is given.
    let (Some(frames_dir), Some(landmarks_path)) = (&cli.frames, &cli.landmarks) else {
        return Err("--frames and --landmarks are required".into());
    };

    let url = detector_url(&cli.api_base);
    let reachability = Reachability::from_url(&url);
    let settings = load_settings(cli.settings.as_deref())?.resolve(reachability)?;
    log::info!(
        "Detector {url} ({reachability:?}): {} px, quality {:.2}, min interval {} ms",
        settings.profile.target_width,
        settings.profile.quality,
        settings.profile.min_send_interval.as_millis()
    );

    let frames = ImageSequenceSource::open(frames_dir)?;
    log::info!("{} frames in {}", frames.len(), frames_dir.display());
    let landmarks = JsonLandmarkSource::load(landmarks_path)?;
    if landmarks.len() < frames.len() {
        log::warn!(
            "Only {} landmark signals for {} frames; the rest count as no hands",
            landmarks.len(),
            frames.len()
        );
    }

    let client = StreamClient::new(Box::new(WebSocketTransport::new(url)));
    let mut drive = DriveLoop::new(
        Box::new(frames),
        Box::new(landmarks),
        Box::new(JpegFrameEncoder::new(settings.profile.quality)),
        client,
        Box::new(ExponentialSmoother::new(
            settings.tracker.smoothing_rate_per_sec,
        )),
        open_surface(cli.output.as_deref())?,
        Box::new(StdoutPipelineLogger::new(cli.report_every)),
        &settings,
        render,
    );

    drive.run(Arc::new(AtomicBool::new(false)))?;
    if let Some(output) = &cli.output {
        log::info!("Scene records written to {}", output.display());
    }
    Ok(())
}

fn run_image(cli: &Cli, image: &Path, render: RenderOptions) -> Result<(), Box<dyn std::error::Error>> {
    let url = image_detect_url(&cli.api_base);
    let frame = read_frame(image, 0)?;
    log::info!(
        "Detecting on {} ({}x{}) via {url}",
        image.display(),
        frame.width(),
        frame.height()
    );

    let mut use_case = DetectImageUseCase::new(
        Box::new(JpegFrameEncoder::new(IMAGE_QUALITY)),
        Box::new(HttpDetector::new(url)?),
        open_surface(cli.output.as_deref())?,
        render,
        IMAGE_TARGET_WIDTH,
    );
    let detections = use_case.execute(&frame)?;
    log::info!("{} detections", detections.len());
    if let Some(output) = &cli.output {
        log::info!("Scene record written to {}", output.display());
    }
    Ok(())
}

fn render_options(cli: &Cli) -> Result<RenderOptions, Box<dyn std::error::Error>> {
    Ok(RenderOptions {
        viewport_size: cli.viewport.as_deref().map(parse_viewport).transpose()?,
        fit: parse_fit(&cli.fit),
        mirrored: cli.mirror,
        labels: match &cli.labels {
            Some(path) => LabelTable::load(path)?,
            None => LabelTable::default(),
        },
    })
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(image) = &cli.image {
        if !image.is_file() {
            return Err(format!("Image not found: {}", image.display()).into());
        }
    } else {
        match &cli.frames {
            Some(frames) if !frames.is_dir() => {
                return Err(format!("Frame directory not found: {}", frames.display()).into());
            }
            Some(_) => {}
            None => return Err("--frames is required unless --image is given".into()),
        }
        match &cli.landmarks {
            Some(landmarks) if !landmarks.exists() => {
                return Err(format!("Landmark file not found: {}", landmarks.display()).into());
            }
            Some(_) => {}
            None => return Err("--landmarks is required unless --image is given".into()),
        }
    }
    if let Some(labels) = &cli.labels {
        if !labels.exists() {
            return Err(format!("Label file not found: {}", labels.display()).into());
        }
    }
    if cli.fit != "cover" && cli.fit != "contain" {
        return Err(format!("Fit must be 'cover' or 'contain', got '{}'", cli.fit).into());
    }
    if cli.report_every == 0 {
        return Err("Report interval must be at least 1".into());
    }
    let base = cli.api_base.to_ascii_lowercase();
    if !["http://", "https://", "ws://", "wss://"]
        .iter()
        .any(|scheme| base.starts_with(scheme))
    {
        return Err(format!(
            "API base must start with http://, https://, ws:// or wss://, got '{}'",
            cli.api_base
        )
        .into());
    }
    Ok(())
}

fn load_settings(explicit: Option<&Path>) -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Settings file not found: {}", path.display()).into());
            }
            Ok(PipelineSettings::load(path)?)
        }
        None => match PipelineSettings::default_path() {
            Some(path) => Ok(PipelineSettings::load(&path)?),
            None => Ok(PipelineSettings::default()),
        },
    }
}

fn open_surface(output: Option<&Path>) -> Result<Box<dyn DrawingSurface>, Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            let file = File::create(path)?;
            Ok(Box::new(JsonLinesSurface::new(Box::new(BufWriter::new(file)))))
        }
        None => Ok(Box::new(JsonLinesSurface::stdout())),
    }
}

fn parse_fit(fit: &str) -> Fit {
    if fit == "contain" {
        Fit::Contain
    } else {
        Fit::Cover
    }
}

fn parse_viewport(spec: &str) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let parsed = spec
        .split_once(|c: char| c == 'x' || c == 'X')
        .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)));
    match parsed {
        Some((w, h)) if w > 0 && h > 0 => Ok((f64::from(w), f64::from(h))),
        _ => Err(format!("Viewport must look like 640x480, got '{spec}'").into()),
    }
}
