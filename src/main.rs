//! Face overlay replay tool: runs recorded tracker sessions through the full
//! pipeline headlessly.

use anyhow::Result;
use clap::Parser;
use face_overlay::{
    app::OverlayApp,
    assets::SyntheticLoader,
    config::Config,
    gestures::GestureEvent,
    scene::NullRenderer,
    tracking::{FrameSource, ReplaySource},
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded tracker session to replay (JSON array of frames)
    #[arg(short, long)]
    frames: String,

    /// Accessories to activate before replay (comma-separated ids)
    #[arg(short, long, default_value = "glasses")]
    activate: String,

    /// Display container width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Display container height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Wheel delta to apply to the selected accessory before replay
    /// (simulates a scale gesture)
    #[arg(long)]
    wheel: Option<f32>,

    /// Print the selected accessory's transform after every frame
    #[arg(short, long)]
    print_transforms: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Overlay - session replay");

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let mut source = ReplaySource::from_file(&args.frames)?;
    info!("Replaying {} recorded frames", source.len());

    let mut app = OverlayApp::with_builtin_manifest(
        config,
        SyntheticLoader::new(),
        NullRenderer::default(),
        (args.width, args.height),
    )?;

    for id in args.activate.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match app.toggle_accessory(id) {
            Ok(()) => info!("Activated {id}"),
            Err(e) => warn!("Skipping {id}: {e}"),
        }
    }

    let mut frames = 0u64;
    let mut detected = 0u64;

    while let Some(frame) = source.next_frame() {
        app.tick(Some(&frame));
        frames += 1;

        // Gestures only apply once a subject has been seen
        if frames == 1 {
            if let Some(delta_y) = args.wheel {
                app.handle_gesture(&GestureEvent::Wheel {
                    delta_y,
                    depth_modifier: false,
                });
            }
        }

        if app.face_detected() {
            detected += 1;
        }

        if args.print_transforms {
            if let Some((id, transform)) = app.selected_transform() {
                println!(
                    "frame {frames}: {id} pos=({:.3}, {:.3}, {:.3}) scale={:.3}",
                    transform.position.x,
                    transform.position.y,
                    transform.position.z,
                    transform.scale.x,
                );
            }
        }
    }

    info!(
        "Replay finished: {frames} frames, {detected} with a detected face, {} accessories active, {} models loaded",
        app.active_count(),
        app.loaded_count(),
    );

    Ok(())
}
