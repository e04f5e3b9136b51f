use ::rand as external_rand;
use clap::Parser;
use external_rand::rngs::StdRng;
use external_rand::SeedableRng;
use tracing_subscriber::{fmt, EnvFilter};

mod color;
mod config;
mod driver;
mod error;
mod geometry;
mod graph;
mod growth;
mod loader;
mod selector;
mod timers;
mod types;

use config::LoaderConfig;
use loader::Loader;

#[cfg(feature = "ui")]
mod controls;
#[cfg(feature = "ui")]
mod visualization;

mod api;

#[cfg(feature = "ui")]
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in headless mode (HTTP API server)
    #[arg(long)]
    headless: bool,

    /// Port for headless API server
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Configuration file path (YAML or JSON). If not specified, searches for config.yaml, config.yml, or config.json in current directory.
    #[arg(short, long)]
    config: Option<String>,

    /// Line color override, e.g. "rgb(255, 128, 0, 0.9)" or "#ff8000"
    #[arg(long)]
    color: Option<String>,

    /// Seed the random generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[cfg(not(feature = "ui"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Headless mode only
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config.log_level);
    headless_main(args.port, config, make_rng(args.seed)).await
}

#[cfg(feature = "ui")]
#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);

    if args.headless {
        // Run headless mode even with UI feature enabled
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("failed to start runtime: {e}");
                std::process::exit(1);
            }
        };
        rt.block_on(async {
            if let Err(e) = headless_main(args.port, config, make_rng(args.seed)).await {
                tracing::error!("headless mode failed: {e}");
                std::process::exit(1);
            }
        });
    } else {
        ui_main(config, make_rng(args.seed)).await;
    }
}

/// Load configuration from file or use default, then apply CLI overrides
fn load_config(args: &Args) -> Result<LoaderConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config.as_deref() {
        Some(path) => LoaderConfig::from_file(path)
            .map_err(|e| format!("Failed to load config from {}: {}", path, e))?,
        None => LoaderConfig::from_default_paths(),
    };
    if let Some(color) = &args.color {
        config.line_color = color.clone();
    }
    Ok(config)
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(feature = "ui")]
async fn ui_main(config: LoaderConfig, mut rng: StdRng) {
    use color::{Rgba, TEAL, TEAL_OPAQUE};
    use controls::{handle_controls, ViewFlags};
    use visualization::{draw_growth, draw_stats, LineStyle};

    let style = LineStyle::new(
        Rgba::parse_or(&config.line_color, TEAL),
        Rgba::parse_or(&config.marker_color, TEAL_OPAQUE),
        config.line_width,
    );
    let mut flags = ViewFlags::default();
    let mut loader = Loader::new(config, screen_width(), screen_height(), now_ms(), &mut rng);

    prevent_quit();
    loop {
        let now = now_ms();
        if is_quit_requested() || is_key_pressed(KeyCode::Escape) {
            loader.shutdown();
            break;
        }

        handle_controls(&mut loader, &mut flags, now, &mut rng);

        // The window is the rendering surface; any size change restarts growth
        loader.set_surface(screen_width(), screen_height(), now, &mut rng);
        loader.advance(now, &mut rng);

        clear_background(Color::new(0.02, 0.04, 0.06, 1.0));
        draw_growth(&loader.frame(), &style);

        if flags.stats_visible {
            draw_stats(&loader.stats());
        }

        if flags.take_screenshot {
            flags.take_screenshot = false;
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let filename = format!("sproutline_{}.png", timestamp);
            match capture_screenshot(&filename) {
                Ok(_) => tracing::info!("screenshot saved: {}", filename),
                Err(e) => tracing::warn!("failed to save screenshot {}: {}", filename, e),
            }
        }

        next_frame().await;
    }
}

#[cfg(feature = "ui")]
fn now_ms() -> f64 {
    get_time() * 1000.0
}

#[cfg(feature = "ui")]
fn window_conf() -> Conf {
    let config = LoaderConfig::from_default_paths();

    Conf {
        window_title: "Sproutline".to_owned(),
        window_width: config.window_width as i32,
        window_height: config.window_height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[cfg(feature = "ui")]
/// Capture a screenshot of the current screen
fn capture_screenshot(filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let screen_image = get_screen_data();

    let width = screen_image.width as u32;
    let height = screen_image.height as u32;
    let bytes = &screen_image.bytes;

    let mut img = image::RgbaImage::new(width, height);

    // OpenGL has origin at bottom-left, images at top-left
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize * 4;
            if idx + 3 < bytes.len() {
                let pixel = [bytes[idx], bytes[idx + 1], bytes[idx + 2], bytes[idx + 3]];
                img.put_pixel(x, height - 1 - y, image::Rgba(pixel));
            }
        }
    }

    img.save(filename)?;

    Ok(())
}

/// Headless mode - runs HTTP API server
async fn headless_main(
    port: u16,
    config: LoaderConfig,
    mut rng: StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    use api::{run_server, ApiState};

    let started = std::time::Instant::now();
    let width = config.window_width as f32;
    let height = config.window_height as f32;
    let loader = Loader::new(config, width, height, 0.0, &mut rng);

    let api_state = ApiState::new(loader, rng, started);
    run_server(api_state, port).await?;

    Ok(())
}
