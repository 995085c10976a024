//! Graphics Mode Selector - Main Entry Point
//!
//! Opens the mode selection dialog and prints the outcome as JSON.

use clap::Parser;
use gfx_modesel::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

/// Graphics mode selector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Pick a driver and resolution in the terminal
    gfx-modesel

    # Pick a colour depth too, starting from 800x600 at 16 bpp
    gfx-modesel --extended --width 800 --height 600 --depth 16

    # Scripted run against a driver table
    gfx-modesel --platform-file drivers.toml --keys down,down,enter

    # Show the catalog the dialog would offer
    gfx-modesel --platform-file drivers.toml --list
")]
struct Args {
    /// Initial driver: auto, fullscreen, windowed, safe, a number or a tag
    #[arg(short, long, default_value = "auto")]
    driver: DriverId,

    /// Initial width
    #[arg(short = 'W', long, default_value_t = 640)]
    width: u32,

    /// Initial height
    #[arg(short = 'H', long, default_value_t = 480)]
    height: u32,

    /// Initial colour depth in bits per pixel
    #[arg(short = 'D', long, default_value_t = 8)]
    depth: u32,

    /// Also select the colour depth
    #[arg(short, long)]
    extended: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Driver table (TOML or JSON) used instead of the framebuffer devices
    #[arg(short, long)]
    platform_file: Option<PathBuf>,

    /// Run headless, replaying comma separated input events
    /// (e.g. down,tab,enter or click:12:5)
    #[arg(short, long)]
    keys: Option<String>,

    /// Print the driver catalog and exit
    #[arg(short, long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Printed after a dialog run
#[derive(Serialize)]
struct Outcome {
    accepted: bool,
    mode: GfxMode,
}

/// One catalog row printed by `--list`
#[derive(Serialize)]
struct CatalogRow<'a> {
    id: DriverId,
    name: &'a str,
    default_modes: bool,
    modes: &'a [ResolutionEntry],
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            log::error!("Mode selection failed: {}", e);
            process::exit(2);
        }
    }
}

/// Returns false when the dialog was cancelled
fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };

    let platform: Box<dyn Platform> = match args.platform_file.as_ref().or(config.platform_file.as_ref()) {
        Some(path) => {
            log::debug!("Using driver table {}", path.display());
            Box::new(TablePlatform::load(path)?)
        }
        None => Box::new(FbdevPlatform::new()),
    };

    let selector = ModeSelector::new(config, platform);

    if args.list {
        print_catalog(&selector)?;
        return Ok(true);
    }

    let mut mode = GfxMode {
        driver: args.driver,
        width: args.width,
        height: args.height,
        depth: args.depth,
    };

    let accepted = match &args.keys {
        Some(script) => {
            let mut backend = HeadlessBackend::new(80, 25).with_events(parse_script(script)?);
            select(&selector, &mut backend, &mut mode, args.extended)?
        }
        None => run_tui(&selector, &mut mode, args.extended)?,
    };

    let outcome = Outcome { accepted, mode };
    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| ModeSelError::ParseError(e.to_string()))?;
    println!("{}", json);
    Ok(accepted)
}

fn select(
    selector: &ModeSelector,
    backend: &mut dyn Backend,
    mode: &mut GfxMode,
    extended: bool,
) -> Result<bool> {
    if extended {
        selector.select_extended(backend, mode)
    } else {
        selector.select(backend, mode)
    }
}

#[cfg(feature = "tui")]
fn run_tui(selector: &ModeSelector, mode: &mut GfxMode, extended: bool) -> Result<bool> {
    // Notcurses is stopped when the context drops, before the result prints
    let mut backend = NotcursesContext::init()?;
    select(selector, &mut backend, mode, extended)
}

#[cfg(not(feature = "tui"))]
fn run_tui(_selector: &ModeSelector, _mode: &mut GfxMode, _extended: bool) -> Result<bool> {
    Err(ModeSelError::ui(
        "Built without the 'tui' feature; use --keys for a headless run",
    ))
}

fn print_catalog(selector: &ModeSelector) -> Result<()> {
    let catalog = selector.catalog()?;
    let rows: Vec<CatalogRow<'_>> = catalog
        .drivers()
        .iter()
        .map(|d| CatalogRow {
            id: d.id,
            name: &d.name,
            default_modes: d.modes.is_borrowed(),
            modes: d.modes.entries(),
        })
        .collect();

    let json =
        serde_json::to_string_pretty(&rows).map_err(|e| ModeSelError::ParseError(e.to_string()))?;
    drop(rows);
    catalog.teardown();

    println!("{}", json);
    Ok(())
}
