use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use factory_tint::{PixelBuffer, StagePolicy, Watermark, PRESET_NAMES};
use refinish::api;
use refinish::assets::AssetLoader;
use refinish::models::AppConfig;
use refinish::rendering::{encode_png, PngQuality};
use refinish::server;

#[derive(Parser)]
#[command(name = "refinish")]
#[command(about = "Refinish - factory paint for product photos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Paint a subject image directly to a PNG file
    Recolor {
        /// Input image (PNG with transparency, or an already isolated subject)
        #[arg(short, long)]
        input: PathBuf,

        /// Swatch name, hex color (e.g. "#CC0000") or "transparent"
        #[arg(short, long)]
        color: String,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Long-edge cap in pixels (default from config)
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Paint recipe: factory-finish, lean or re-lighting (default from config)
        #[arg(long)]
        preset: Option<String>,

        /// Watermark image drawn behind the subject
        #[arg(long)]
        watermark: Option<PathBuf>,
    },
    /// Print the configured paint swatches
    Palette,
    /// Extract the embedded config.yaml for customization
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Refinish API",
        description = "Factory paint for product photos",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_palette,
        api::handle_upload,
        api::handle_image,
        api::handle_share,
        api::handle_delete,
        api::handle_set_color,
        api::handle_transition,
        api::handle_preview,
    ),
    components(schemas(
        api::SwatchResponse,
        api::SubjectResponse,
        api::ShareResponse,
        api::ColorRequest,
        api::TransitionResponse,
    )),
    tags(
        (name = "Palette", description = "Configured paint swatches"),
        (name = "Subjects", description = "Subject upload, export and sharing"),
        (name = "Painting", description = "Debounced color changes and previews")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Recolor {
            input,
            color,
            output,
            max_dimension,
            preset,
            watermark,
        }) => run_recolor_command(
            &input,
            &color,
            &output,
            max_dimension,
            preset.as_deref(),
            watermark.as_ref(),
        ),
        Some(Commands::Palette) => run_palette_command(),
        Some(Commands::Init { force, list }) => run_init_command(force, list),
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI one-shots
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refinish=warn,factory_tint=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Paint a subject directly to a PNG file (no server needed)
fn run_recolor_command(
    input: &PathBuf,
    color: &str,
    output: &PathBuf,
    max_dimension: Option<u32>,
    preset: Option<&str>,
    watermark: Option<&PathBuf>,
) -> anyhow::Result<()> {
    init_cli_tracing();

    let loader = AssetLoader::from_env();
    let mut config = AppConfig::load_from_assets(&loader);

    if let Some(max) = max_dimension {
        config.engine.max_dimension = max;
    }
    if let Some(name) = preset {
        if StagePolicy::preset(name).is_none() {
            anyhow::bail!(
                "Unknown preset '{name}' (expected one of: {})",
                PRESET_NAMES.join(", ")
            );
        }
        config.engine.preset = name.to_string();
        config.engine.policy = None;
    }

    let target = config
        .palette
        .resolve(color)
        .map_err(|e| anyhow::anyhow!("Invalid color '{color}': {e}"))?;

    let watermark = match watermark {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            let image = PixelBuffer::decode(&bytes)
                .map_err(|e| anyhow::anyhow!("Watermark {}: {e}", path.display()))?;
            Some(
                Watermark::new(image)
                    .opacity(config.watermark.opacity)
                    .scale(config.watermark.scale),
            )
        }
        None => None,
    };

    let bytes = std::fs::read(input)?;
    let subject = PixelBuffer::decode(&bytes)
        .map_err(|e| anyhow::anyhow!("Input {}: {e}", input.display()))?;
    if !subject.has_transparency() {
        tracing::warn!(
            input = %input.display(),
            "Input has no transparency; the whole image is treated as the subject"
        );
    }

    let painted = config
        .recolorer()
        .recolor(&subject, target)
        .map_err(|e| anyhow::anyhow!("Recolor failed: {e}"))?;
    let finished = match watermark {
        Some(mark) => mark.composite_behind(&painted)?,
        None => painted,
    };
    let png_bytes = encode_png(&finished, PngQuality::Export)?;

    std::fs::write(output, &png_bytes)?;
    println!(
        "Painted {} as {} ({}x{}, {} bytes)",
        output.display(),
        config.palette.name_for(target),
        finished.width(),
        finished.height(),
        png_bytes.len()
    );

    Ok(())
}

/// Print configured swatches
fn run_palette_command() -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    let width = config
        .palette
        .swatches()
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0);

    for swatch in config.palette.swatches() {
        println!("  {:<width$}  {}", swatch.name, swatch.value);
    }
    Ok(())
}

/// Extract the embedded config to the filesystem
fn run_init_command(force: bool, list: bool) -> anyhow::Result<()> {
    if list {
        println!("Embedded assets:\n");
        for f in AssetLoader::list_embedded() {
            println!("  {f}");
        }
        return Ok(());
    }

    let loader = AssetLoader::from_env();
    let report = loader.init(force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let watermark_file = std::env::var("WATERMARK_FILE").ok();

    // Header
    println!("Refinish v{VERSION}");
    println!("Factory paint for product photos\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR      = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE    = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  WATERMARK_FILE = {}",
        watermark_file.as_deref().unwrap_or("(not set)")
    );

    // Asset sources section
    println!("\nAsset Sources:");

    let config_source = match config_file {
        Some(ref path) if PathBuf::from(path).exists() => path.to_string(),
        Some(_) => "embedded (file not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("  Config:    {config_source}");

    let watermark_source = match watermark_file {
        Some(ref path) if PathBuf::from(path).exists() => path.to_string(),
        Some(_) => "none (file not found)".to_string(),
        None => "none".to_string(),
    };
    println!("  Watermark: {watermark_source}");

    // Commands section
    println!("\nCommands:");
    println!("  refinish serve     Start the HTTP server");
    println!("  refinish recolor   Paint an image to a PNG file");
    println!("  refinish palette   List configured swatches");
    println!("  refinish init      Extract embedded config");
    println!("\nRun 'refinish --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refinish=debug,factory_tint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let asset_loader = Arc::new(AssetLoader::from_env());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    // Log asset sources
    tracing::info!(
        config = ?asset_loader.config_file().map(|p| p.display().to_string()).unwrap_or_else(|| "embedded".to_string()),
        watermark = ?asset_loader.watermark_file().map(|p| p.display().to_string()),
        "Asset sources configured"
    );

    // Seed a missing config file
    if let Err(e) = asset_loader.seed_if_configured() {
        tracing::warn!(%e, "Failed to seed config");
    }

    // Create application state using shared server module
    let state = server::create_app_state(asset_loader)?;

    // Build router: start with shared API routes, add production-only routes
    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Refinish server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
