//! sudoscan CLI — scan a Sudoku photo into a grid, solve puzzles, list
//! per-cell candidate digits.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sudoscan::{ScanOutcome, Scanner};
use sudoscan_core::{candidates, count_solutions, solve, Board, CandidateMap};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sudoscan")]
#[command(about = "Scan 9x9 Sudoku puzzles from photos and solve them by exhaustive search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a puzzle photo into a grid of digits.
    Scan(CliScanArgs),

    /// Solve a puzzle given as an 81-character board string.
    Solve(CliBoardArgs),

    /// List the legal digits for every empty cell.
    Hint(CliBoardArgs),
}

#[derive(Debug, Clone, Args)]
struct CliScanArgs {
    /// Path to the input photo.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the scan report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Solve the recognized grid after scanning.
    #[arg(long)]
    solve: bool,

    /// Side length of the rectified canvas in pixels.
    #[arg(long, default_value = "450")]
    canvas_size: u32,

    /// Margin cropped from each cell edge before recognition (pixels).
    #[arg(long, default_value = "8")]
    inset: u32,

    /// Binary threshold applied to each cell crop before recognition.
    #[arg(long, default_value = "150")]
    cell_threshold: u8,

    /// Minimum OCR confidence (0-100) required to accept a digit.
    #[arg(long, default_value = "60.0")]
    min_confidence: f32,

    /// Tesseract language model.
    #[arg(long, default_value = "eng")]
    lang: String,
}

#[derive(Debug, Clone, Args)]
struct CliBoardArgs {
    /// Board as 81 characters, row-major; digits 1-9 fill cells, `.`, `0`
    /// or `_` mark empty cells.
    #[arg(long)]
    puzzle: String,

    /// Path to write the result (JSON).
    #[arg(long)]
    out: Option<PathBuf>,
}

/// JSON report for a scan run.
#[derive(Debug, Clone, serde::Serialize)]
struct ScanReport {
    outcome: ScanOutcome,
    solution: Option<Board>,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan(args) => run_scan(args).await,
        Commands::Solve(args) => run_solve(args),
        Commands::Hint(args) => run_hint(args),
    }
}

async fn run_scan(args: CliScanArgs) -> CliResult<()> {
    let mut scanner = Scanner::new();
    {
        let config = scanner.config_mut();
        config.rectify.canvas_size = args.canvas_size;
        config.segment.inset = args.inset;
        config.recognize.cell_threshold = args.cell_threshold;
        config.recognize.min_confidence = args.min_confidence;
        config.recognize.lang = args.lang.clone();
    }

    let outcome = scanner.scan_path_async(args.image.clone()).await?;
    println!("Recognized grid ({} digits):", outcome.board.filled_count());
    print!("{}", outcome.board);

    let solution = if args.solve {
        let solved = solve(&outcome.board)?;
        if count_solutions(&outcome.board, 2) > 1 {
            tracing::warn!("puzzle has more than one solution; showing the first");
        }
        println!("\nSolution:");
        print!("{}", solved);
        Some(solved)
    } else {
        None
    };

    if let Some(out) = &args.out {
        let report = ScanReport { outcome, solution };
        std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("report written to {}", out.display());
    }
    Ok(())
}

fn run_solve(args: CliBoardArgs) -> CliResult<()> {
    let board = Board::parse(&args.puzzle)?;
    let solved = solve(&board)?;
    print!("{}", solved);

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&solved)?)?;
    }
    Ok(())
}

fn run_hint(args: CliBoardArgs) -> CliResult<()> {
    let board = Board::parse(&args.puzzle)?;
    let map: CandidateMap = candidates(&board)?;

    for (row, row_sets) in map.iter().enumerate() {
        for (col, set) in row_sets.iter().enumerate() {
            if let Some(digits) = set {
                let rendered: Vec<String> = digits.iter().map(u8::to_string).collect();
                println!("r{}c{}: {}", row + 1, col + 1, rendered.join(" "));
            }
        }
    }

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&map)?)?;
    }
    Ok(())
}
