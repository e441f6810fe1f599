use clap::{Parser, Subcommand};
use pixmend::imaging::{Color, FileCodec, ImageCodec, ResizeQuality};
use pixmend::pipeline::{self, Step, StepDefaults};
use pixmend::{config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Input and output file of a single-image command.
#[derive(clap::Args, Clone)]
struct FileArgs {
    /// Image to read
    input: PathBuf,
    /// Where to write the result (format from the extension)
    output: PathBuf,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pixmend")]
#[command(about = "Resize, flip, rotate, crop and recolor images")]
#[command(long_about = "\
Resize, flip, rotate, crop and recolor images

Single-image commands read one file and write one file. The output format
follows the output extension (png, jpg, jpeg, tif, tiff, webp).

  pixmend resize photo.jpg small.png --width 800
  pixmend rotate scan.png upright.png --degrees 270
  pixmend crop photo.png framed.png --top 10 --bottom 10 --percent
  pixmend replace-color logo.png logo-green.png --from '#ff0000' --to '#00ff00' --threshold 16

Pipelines live in pixmend.toml as [[steps]]. `run` applies them to one
file, `batch` to every image under a directory, in parallel.

Run 'pixmend gen-config' to generate a documented pixmend.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (stock defaults when it does not exist)
    #[arg(long, default_value = "pixmend.toml", global = true)]
    config: PathBuf,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show size and transparency of an image
    Info {
        /// Image to inspect
        input: PathBuf,
    },
    /// Resize; a zero or missing dimension keeps the aspect ratio
    Resize {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        width: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        height: i32,
        /// Defaults to [resize] quality from the config
        #[arg(long, value_enum)]
        quality: Option<ResizeQuality>,
    },
    /// Mirror horizontally and/or vertically
    Flip {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long)]
        horizontal: bool,
        #[arg(long)]
        vertical: bool,
    },
    /// Rotate clockwise by 90, 180 or 270 degrees
    Rotate {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long, allow_negative_numbers = true)]
        degrees: i32,
    },
    /// Remove margins, in pixels or percent
    Crop {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        top: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        right: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        bottom: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        left: i32,
        /// Margins are percentages of the image size
        #[arg(long)]
        percent: bool,
    },
    /// Keep one rectangle of the image
    Extract {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        #[arg(long, allow_negative_numbers = true)]
        width: i32,
        #[arg(long, allow_negative_numbers = true)]
        height: i32,
    },
    /// Invert red, green and blue
    Invert(FileArgs),
    /// Convert to grayscale
    Grayscale(FileArgs),
    /// Replace colors close to --from with --to, keeping alpha
    ReplaceColor {
        #[command(flatten)]
        files: FileArgs,
        /// Color to match: #rrggbb, #rrggbbaa or r,g,b[,a]
        #[arg(long)]
        from: Color,
        /// Replacement color
        #[arg(long)]
        to: Color,
        /// Per-channel tolerance 0-255 (defaults to [colors] threshold)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i32>,
    },
    /// Apply the config's [[steps]] to one image
    Run(FileArgs),
    /// Apply the config's [[steps]] to every image under a directory
    Batch {
        /// Directory to scan recursively
        input_dir: PathBuf,
        /// Output directory (mirrors the input layout, gets report.json)
        #[arg(long, default_value = "pixmend-out")]
        out_dir: PathBuf,
    },
    /// Print a stock pixmend.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.command {
        // Must work even when the existing config is broken.
        Command::GenConfig => config::PixmendConfig::default(),
        _ => config::load_config(&cli.config)?,
    };
    let codec = FileCodec::new();

    match cli.command {
        Command::Info { input } => {
            let buffer = codec.decode(&input)?;
            output::print_info(&input, &buffer);
        }
        Command::Resize {
            files,
            width,
            height,
            quality,
        } => run_single(
            &codec,
            &files,
            &[Step::Resize {
                width,
                height,
                quality,
            }],
            &config,
        )?,
        Command::Flip {
            files,
            horizontal,
            vertical,
        } => run_single(
            &codec,
            &files,
            &[Step::Flip {
                horizontal,
                vertical,
            }],
            &config,
        )?,
        Command::Rotate { files, degrees } => {
            run_single(&codec, &files, &[Step::Rotate { degrees }], &config)?
        }
        Command::Crop {
            files,
            top,
            right,
            bottom,
            left,
            percent,
        } => run_single(
            &codec,
            &files,
            &[Step::Crop {
                top,
                right,
                bottom,
                left,
                percent,
            }],
            &config,
        )?,
        Command::Extract {
            files,
            x,
            y,
            width,
            height,
        } => run_single(
            &codec,
            &files,
            &[Step::Extract {
                x,
                y,
                width,
                height,
            }],
            &config,
        )?,
        Command::Invert(files) => run_single(&codec, &files, &[Step::Invert {}], &config)?,
        Command::Grayscale(files) => run_single(&codec, &files, &[Step::Grayscale {}], &config)?,
        Command::ReplaceColor {
            files,
            from,
            to,
            threshold,
        } => run_single(
            &codec,
            &files,
            &[Step::ReplaceColor {
                from,
                to,
                threshold,
            }],
            &config,
        )?,
        Command::Run(files) => run_single(&codec, &files, &config.steps, &config)?,
        Command::Batch { input_dir, out_dir } => run_batch(&codec, &input_dir, &out_dir, &config)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Validate, apply and report `steps` for one file.
fn run_single(
    codec: &FileCodec,
    files: &FileArgs,
    steps: &[Step],
    config: &config::PixmendConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    for step in steps {
        step.validate()?;
    }
    let defaults = StepDefaults::from_config(config);
    let report = pipeline::process_file(codec, &files.input, &files.output, steps, &defaults)?;
    output::print_file_report(&report, steps);
    Ok(())
}

fn run_batch(
    codec: &FileCodec,
    input_dir: &Path,
    out_dir: &Path,
    config: &config::PixmendConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&config.processing);
    let inputs = pipeline::collect_inputs(input_dir)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = pipeline::process_batch(codec, &inputs, input_dir, out_dir, config, Some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;
    let report = result?;

    let report_path = pipeline::write_report(&report, out_dir)?;
    output::print_batch_summary(&report, &report_path);

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} of {} images failed", report.failed.len(), inputs.len()).into())
    }
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "pixmend=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
