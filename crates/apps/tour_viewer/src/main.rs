use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use foundation::ids::SceneId;
use foundation::time::Time;
use formats::manifest::{TileManifest, parse_manifest};
use formats::scene_record::{SceneRecord, parse_scene_record};
use formats::tile_url::TileUrls;
use image::RgbaImage;
use reqwest::Client;
use runtime::frame::Frame;
use streaming::pipeline::TileLoadError;
use streaming::request::LoadTicket;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use viewer::{LoaderCommand, SceneLoadError, Viewer, ViewerConfig, ViewerEvent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless panorama tour runner")]
struct Args {
    /// Tour asset root (falls back to TOUR_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Scene to open first
    #[arg(long)]
    scene: String,

    /// Viewer config JSON; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Hotspot to activate once the first scene is up
    #[arg(long)]
    navigate: Option<String>,
}

/// Fetch results travelling back to the frame loop.
enum Delivery {
    Scene {
        scene_id: SceneId,
        manifest: Result<TileManifest, SceneLoadError>,
        record: Result<SceneRecord, SceneLoadError>,
    },
    Tile {
        ticket: LoadTicket,
        result: Result<RgbaImage, TileLoadError>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => ViewerConfig::default(),
    };
    let base_url = args
        .base_url
        .or_else(|| env::var("TOUR_BASE_URL").ok())
        .ok_or("no --base-url given and TOUR_BASE_URL is unset")?;
    config.urls = TileUrls {
        base_url: base_url.trim_end_matches('/').to_string(),
        ..config.urls
    };

    let client = Client::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
    let mut viewer = Viewer::new(config);
    viewer.load_scene(args.scene.as_str());

    let dt = 1.0 / f64::from(args.fps.max(1));
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(dt));
    let mut navigate = args.navigate;
    let started = Instant::now();
    let mut frame = Frame::start(Time::ZERO);

    for i in 0..args.frames {
        ticker.tick().await;
        if i > 0 {
            frame = frame.advance_to(Time(started.elapsed().as_secs_f64()));
        }

        for command in viewer.drain_commands() {
            spawn_fetch(&client, command, tx.clone());
        }
        while let Ok(delivery) = rx.try_recv() {
            match delivery {
                Delivery::Scene {
                    scene_id,
                    manifest,
                    record,
                } => viewer.on_scene_fetched(scene_id, manifest, record),
                Delivery::Tile { ticket, result } => viewer.on_tile_loaded(ticket, result),
            }
        }

        viewer.tick(frame);

        if viewer.active_scene().is_some()
            && let Some(hotspot) = navigate.take()
            && !viewer.activate_hotspot(&hotspot)
        {
            warn!("no hotspot {hotspot} in the current scene");
        }

        for event in viewer.drain_events() {
            log_event(event.frame_index, &event.payload);
        }
    }

    let snapshot = viewer.metrics().snapshot();
    for (name, value) in snapshot.counters {
        info!("{name} = {value}");
    }
    for (name, value) in snapshot.gauges {
        info!("{name} = {value}");
    }
    Ok(())
}

fn log_event(frame: u64, event: &ViewerEvent) {
    match event {
        ViewerEvent::CameraChanged { yaw, pitch, fov } => {
            debug!("[{frame}] camera yaw={yaw:.1} pitch={pitch:.1} fov={fov:.1}")
        }
        ViewerEvent::LoadingProgress { scene_id, percent } => {
            info!("[{frame}] {scene_id}: {percent}%")
        }
        ViewerEvent::LoadWarning { scene_id, message } => {
            warn!("[{frame}] {scene_id}: {message}")
        }
        other => info!("[{frame}] {other:?}"),
    }
}

fn spawn_fetch(client: &Client, command: LoaderCommand, tx: mpsc::UnboundedSender<Delivery>) {
    let client = client.clone();
    tokio::spawn(async move {
        let delivery = match command {
            LoaderCommand::FetchScene {
                scene_id,
                manifest_url,
                record_url,
            } => {
                let (manifest, record) =
                    tokio::join!(fetch_text(&client, &manifest_url), fetch_text(&client, &record_url));
                Delivery::Scene {
                    manifest: manifest.and_then(|raw| Ok(parse_manifest(&raw)?)),
                    record: record.and_then(|raw| Ok(parse_scene_record(&raw)?)),
                    scene_id,
                }
            }
            LoaderCommand::FetchTile { ticket, url } => Delivery::Tile {
                result: fetch_tile(&client, &url).await,
                ticket,
            },
        };
        // The receiver is gone once the frame loop ends.
        let _ = tx.send(delivery);
    });
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, SceneLoadError> {
    let failed = |message: String| SceneLoadError::Fetch {
        url: url.to_string(),
        message,
    };
    let resp = client.get(url).send().await.map_err(|e| failed(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(failed(format!("HTTP {}", resp.status())));
    }
    resp.text().await.map_err(|e| failed(e.to_string()))
}

async fn fetch_tile(client: &Client, url: &str) -> Result<RgbaImage, TileLoadError> {
    let fetch_error = |e: reqwest::Error| TileLoadError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };
    let resp = client.get(url).send().await.map_err(fetch_error)?;
    if !resp.status().is_success() {
        return Err(TileLoadError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    let bytes = resp.bytes().await.map_err(fetch_error)?;
    tokio::task::spawn_blocking(move || gpu::decode_rgba(&bytes))
        .await
        .map_err(|e| TileLoadError::Decode {
            message: e.to_string(),
        })?
}
