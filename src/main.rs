use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use clap::Parser;
use crossfill::render::draw_grid_image;
use crossfill::{
    find_fill, generate_grid_config_from_structure, render_grid, Assignment, FillFailure,
    FillOptions, GridConfig, GridError, ValueOrdering, VariableOrdering, WordList,
};
use log::{error, info, warn, LevelFilter};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grid structure: one line per row, `_` for an open cell and any other character (including a
    /// space) for a block.
    structure: PathBuf,

    /// Word list with one word per line. Words are upper-cased on load.
    words: PathBuf,

    /// Also save the filled grid here: as text for a `.txt` path, otherwise as a PNG image.
    output: Option<PathBuf>,

    /// TrueType font for the letters of an image output.
    #[arg(long, default_value = "assets/fonts/OpenSans-Regular.ttf")]
    font: PathBuf,

    /// Give up after visiting this many search states.
    #[arg(long)]
    max_states: Option<u64>,

    #[arg(long, value_enum, default_value_t)]
    variable_ordering: VariableOrdering,

    #[arg(long, value_enum, default_value_t)]
    value_ordering: ValueOrdering,

    /// Print search statistics after the grid.
    #[arg(short = 's', long)]
    statistics: bool,

    /// Log more detail; repeat for more.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read or write a file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid grid structure: {0}")]
    Grid(#[from] GridError),
    #[error("{} is not a usable font file", .path.display())]
    Font { path: PathBuf },
    #[error("failed to save the image: {0}")]
    Image(#[from] image::ImageError),
}

fn main() {
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();

    let level_filter = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level_filter)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let word_list = WordList::from_text(&fs::read_to_string(&args.words)?);
    info!("Loaded {} words from {}", word_list.len(), args.words.display());

    let structure = fs::read_to_string(&args.structure)?;
    let config = generate_grid_config_from_structure(word_list, &structure)?;
    info!(
        "Grid is {}x{} with {} slots",
        config.width,
        config.height,
        config.slot_count()
    );

    let options = FillOptions {
        variable_ordering: args.variable_ordering,
        value_ordering: args.value_ordering,
        max_states: args.max_states,
    };

    let result = match find_fill(&config, &options) {
        Ok(result) => result,
        Err(failure) => {
            if let FillFailure::ExhaustedStateBudget { .. } = failure {
                warn!("{failure}");
            } else {
                info!("{failure}");
            }
            println!("No solution.");
            return Ok(());
        }
    };

    let display_grid = render_grid(&config, &result.assignment);
    println!("{display_grid}");

    if args.statistics {
        let statistics = &result.statistics;
        println!();
        println!("states: {}", statistics.states);
        println!("words tested: {}", statistics.words_tested);
        println!("backtracks: {}", statistics.backtracks);
        println!("duration: {:?}", statistics.duration);
    }

    if let Some(output) = &args.output {
        if is_text_path(output) {
            fs::write(output, display_grid + "\n")?;
        } else {
            save_image(&config, &result.assignment, &args.font, output)?;
        }
        info!("Wrote filled grid to {}", output.display());
    }

    Ok(())
}

fn is_text_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"))
}

fn save_image(
    config: &GridConfig,
    assignment: &Assignment,
    font_path: &Path,
    output: &Path,
) -> Result<(), CliError> {
    let font = fs::read(font_path)
        .ok()
        .and_then(|bytes| FontVec::try_from_vec(bytes).ok())
        .ok_or_else(|| CliError::Font {
            path: font_path.to_path_buf(),
        })?;

    draw_grid_image(config, assignment, Some(&font)).save(output)?;

    Ok(())
}
