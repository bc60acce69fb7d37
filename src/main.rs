use clap::{Parser, Subcommand};
use image_variants::config::{self, CONFIG_FILE};
use image_variants::imaging::RustBackend;
use image_variants::job::{self, JobError, VariantJob};
use image_variants::output;
use image_variants::types::SourceImage;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Which image type and file a job works on.
#[derive(clap::Args, Clone)]
struct JobArgs {
    /// Image type, as named under [types.<name>] in the config
    #[arg(long = "type", short = 't')]
    image_type: String,

    /// Source image file
    source: PathBuf,
}

#[derive(Parser)]
#[command(name = "image-variants")]
#[command(about = "Generate resized image variants from a declarative size config")]
#[command(long_about = "\
Generate resized image variants from a declarative size config

Each image type lists named sizes. Running a job on one source image writes
one file per size:

  <compiled>/<folder>/<file name>-<width>x<height>.<extension>

Sizes are cropped to fill, letterboxed, stretched, or scaled on one side to
keep the aspect ratio. Animated GIFs can be resized frame by frame.

Set RUST_LOG=image_variants=debug to see every fit decision.

Run 'image-variants gen-config' to generate a documented image-variants.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every variant of one source image
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Print the generated variants as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what `run` would write, without writing anything
    Plan(JobArgs),
    /// Validate the config and list the configured types
    Check,
    /// Print a stock image-variants.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_variants=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { job: args, json } => {
            let config = load(&cli.config)?;
            let type_config = config.type_config(&args.image_type)?;
            let backend = RustBackend::new();
            let job = VariantJob::new(
                source_image(&args.source)?,
                type_config,
                &config.imaging,
                &backend,
                job::frame_codec(&config.imaging),
            );
            let variants = job.run()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&variants)?);
            } else {
                output::print_run_output(job.source(), &variants);
            }
        }
        Command::Plan(args) => {
            let config = load(&cli.config)?;
            let type_config = config.type_config(&args.image_type)?;
            let backend = RustBackend::new();
            let job = VariantJob::new(
                source_image(&args.source)?,
                type_config,
                &config.imaging,
                &backend,
                job::frame_codec(&config.imaging),
            );
            let plans = job.plan()?;
            output::print_plan_output(job.source(), &plans);
        }
        Command::Check => {
            let config = load(&cli.config)?;
            output::print_check_output(&config, &cli.config);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<config::ResizerConfig, config::ConfigError> {
    if !path.exists() {
        warn!("{} not found, using stock defaults", path.display());
    }
    config::load_config(path)
}

fn source_image(path: &Path) -> Result<SourceImage, JobError> {
    SourceImage::from_path(path).ok_or_else(|| {
        JobError::InvalidSource(format!(
            "{} needs a file name and an extension",
            path.display()
        ))
    })
}
