//! comic2pdf: convert a directory of comic archives and PDFs into
//! normalized, image-only PDFs.
//!
//! `comic2pdf [DIR] [options]`. Without DIR the directory is asked for on
//! stdin.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use comic_convert::config;
use comic_convert::console::ConsoleNotifier;
use comic_convert::{EXIT_FAILURE, EXIT_OK};
use comic_core::cancel::CancelToken;
use comic_core::notify::Notifier;
use comic_core::options::{ConversionOptions, PageOrder};

#[derive(Parser)]
#[command(
    name = "comic2pdf",
    version,
    about = "Convert PDF, CBZ and CBR comics into normalized image-only PDFs"
)]
struct Cli {
    /// Directory containing the files to convert (prompted for when omitted)
    dir: Option<PathBuf>,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// JPEG quality for transcoded pages (1-100, default 90)
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Page ordering: natural, lexical, enumeration (default: natural)
    #[arg(long)]
    page_order: Option<String>,

    /// Parent directory for per-file scratch directories
    #[arg(long)]
    work_root: Option<PathBuf>,

    /// Report what would be done without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(opts: &mut ConversionOptions, cli: &Cli) -> Result<(), String> {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }

    if let Some(quality) = cli.jpeg_quality {
        opts.jpeg_quality = quality.clamp(1, 100);
    }

    if let Some(ref order) = cli.page_order {
        opts.page_order = PageOrder::from_name(order).ok_or_else(|| {
            format!(
                "unknown page order '{}' (expected natural, lexical or enumeration)",
                order
            )
        })?;
    }

    if cli.work_root.is_some() {
        opts.work_root = cli.work_root.clone();
    }

    if cli.dry_run {
        opts.dry_run = true;
    }
    Ok(())
}

fn log_level(opts: &ConversionOptions, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match opts.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() {
    let cli = Cli::parse();

    let (mut options, config_problems) = config::load_config(&config::config_paths());
    let override_result = apply_cli_overrides(&mut options, &cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(&options, cli.quiet)),
    )
    .init();

    for problem in &config_problems {
        log::warn!("{}", problem);
    }
    if let Err(e) = override_result {
        eprintln!("Error: {}", e);
        process::exit(EXIT_FAILURE);
    }

    // Handle --dump-config
    if cli.dump_config {
        let code = match dump_config(&options) {
            Ok(()) => EXIT_OK,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_FAILURE
            }
        };
        process::exit(code);
    }

    process::exit(run(cli.dir, &options));
}

fn dump_config(options: &ConversionOptions) -> anyhow::Result<()> {
    let s = toml::to_string_pretty(options).context("Error serializing config")?;
    println!("{}", s);
    Ok(())
}

fn run(dir: Option<PathBuf>, options: &ConversionOptions) -> i32 {
    let notifier = ConsoleNotifier;

    if let Err(e) = comic_convert::check_required_tools(options) {
        notifier.error(&e.to_string());
        return EXIT_FAILURE;
    }

    let Some(dir) = dir.or_else(|| notifier.pick_directory()) else {
        log::info!("No directory selected");
        return EXIT_FAILURE;
    };

    let cancel = CancelToken::new();
    if let Err(e) = comic_convert::interrupt::install(cancel.clone())
        .context("Could not install Ctrl-C handler")
    {
        log::warn!("{:#}", e);
    }

    let outcome = comic_convert::convert_directory(
        &dir,
        options,
        &cancel,
        &notifier,
        Some(comic_convert::log_progress()),
    );
    if let Err(ref e) = outcome {
        if !e.is_cancelled() {
            notifier.error(&e.to_string());
        }
    }
    comic_convert::exit_code(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("comic2pdf").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_overrides_only_given_flags() {
        let mut opts = ConversionOptions {
            jpeg_quality: 70,
            ..Default::default()
        };
        apply_cli_overrides(&mut opts, &parse(&["comics", "--page-order", "lexical"])).unwrap();
        assert_eq!(opts.jpeg_quality, 70);
        assert_eq!(opts.page_order, PageOrder::Lexical);
        assert!(!opts.dry_run);
    }

    #[test]
    fn test_quality_is_clamped() {
        let mut opts = ConversionOptions::default();
        apply_cli_overrides(&mut opts, &parse(&["--jpeg-quality", "0"])).unwrap();
        assert_eq!(opts.jpeg_quality, 1);
    }

    #[test]
    fn test_unknown_page_order_rejected() {
        let mut opts = ConversionOptions::default();
        let err = apply_cli_overrides(&mut opts, &parse(&["--page-order", "random"]));
        assert!(err.is_err());
    }

    #[test]
    fn test_log_levels() {
        let mut opts = ConversionOptions::default();
        assert_eq!(log_level(&opts, false), "info");
        assert_eq!(log_level(&opts, true), "warn");
        opts.verbose = 2;
        assert_eq!(log_level(&opts, false), "trace");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["comic2pdf", "-q", "-v"]).is_err());
    }
}
