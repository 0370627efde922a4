use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod color;
mod config;
mod error;
mod footprint;
mod mapping;
mod renderer;
mod server;

use config::{Config, RunMode};
use mapping::ImpactParameters;

#[derive(Parser, Debug)]
#[command(name = "impactviz")]
#[command(author, version, about = "Impact footprint calculator: web form and PNG renderer")]
struct Args {
    /// Run mode: serve the web form, or render one image and exit
    #[arg(short, long, default_value = "serve")]
    mode: RunMode,

    /// Config file path (defaults to ~/.config/impactviz/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory served under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Canvas edge length in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Impactor mass in kg (render mode)
    #[arg(long, allow_negative_numbers = true)]
    mass: Option<f64>,

    /// Impactor speed in km/s (render mode)
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<f64>,

    /// Height of burst in km (render mode)
    #[arg(long, allow_negative_numbers = true)]
    height_of_burst: Option<f64>,

    /// Entry angle in degrees (render mode)
    #[arg(long, allow_negative_numbers = true)]
    entry_angle: Option<f64>,

    /// Output PNG path (render mode)
    #[arg(short, long, default_value = "footprint.png")]
    output: PathBuf,
}

impl Args {
    fn impact_parameters(&self) -> Result<ImpactParameters> {
        let require = |value: Option<f64>, flag: &str| -> Result<f64> {
            match value {
                Some(v) if v.is_finite() => Ok(v),
                Some(v) => anyhow::bail!("--{} must be a finite number (got {})", flag, v),
                None => anyhow::bail!("--{} is required in render mode", flag),
            }
        };
        Ok(ImpactParameters {
            mass_kg: require(self.mass, "mass")?,
            speed_km_s: require(self.speed, "speed")?,
            height_of_burst_km: require(self.height_of_burst, "height-of-burst")?,
            entry_angle_deg: require(self.entry_angle, "entry-angle")?,
        })
    }
}

fn render_to_file(args: &Args, config: &Config) -> Result<()> {
    let params = args.impact_parameters()?;
    let fp = footprint::compute(params, config)?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.output, &fp.image.png_data)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Wrote {} ({}x{})",
        args.output.display(),
        fp.image.width,
        fp.image.height
    );
    println!("{}", serde_json::to_string_pretty(&fp.geometry)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("impactviz=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Created config file at {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);
    config.validate()?;

    info!("Starting impactviz in {:?} mode", args.mode);

    match args.mode {
        RunMode::Serve => server::run(config).await?,
        RunMode::Render => render_to_file(&args, &config)?,
    }

    Ok(())
}
