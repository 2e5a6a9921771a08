use std::path::PathBuf;

use chess_lattice::{
    load_lines, ImageGeometry, LatticeIoError, LatticeReconstructor, PipelineError, Reconstruction,
    ReconstructionParams, ReconstructionReport,
};
use chess_lattice_core::level_from_verbosity;
#[cfg(not(feature = "tracing"))]
use chess_lattice_core::init_with_level;
use clap::{Args, Parser, Subcommand};
use log::info;
use nalgebra::Point2;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] LatticeIoError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to install logger: {0}")]
    Logger(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "chess-lattice",
    about = "Recover a chessboard lattice from Hough lines",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON-formatted tracing events instead of plain log lines
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct the lattice and write a JSON report
    Reconstruct {
        #[command(flatten)]
        input: InputArgs,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reconstruct the lattice and print the board cell of one image point
    Locate {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, allow_hyphen_values = true)]
        x: f32,

        #[arg(long, allow_hyphen_values = true)]
        y: f32,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON array of detected lines: [{"rho": .., "theta": ..}, ...]
    #[arg(short, long)]
    lines: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: u32,

    /// Image height in pixels
    #[arg(long)]
    height: u32,

    /// JSON file with reconstruction parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Return a partial lattice instead of failing when rows are missing
    #[arg(long)]
    allow_incomplete: bool,
}

impl InputArgs {
    fn reconstruct(&self) -> Result<Reconstruction, CliError> {
        let mut params = match &self.config {
            Some(path) => ReconstructionParams::load_json(path)?,
            None => ReconstructionParams::default(),
        };
        if self.allow_incomplete {
            params.require_complete = false;
        }

        let lines = load_lines(&self.lines)?;
        info!("loaded {} lines from {}", lines.len(), self.lines.display());

        let geometry = ImageGeometry::new(self.width, self.height);
        Ok(LatticeReconstructor::new(params).reconstruct(&lines, geometry)?)
    }
}

fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let level = level_from_verbosity(cli.verbose);
    #[cfg(feature = "tracing")]
    {
        tracing_log::LogTracer::init().map_err(|e| CliError::Logger(e.to_string()))?;
        chess_lattice_core::init_tracing(cli.json_logs, level);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        init_with_level(level).map_err(|e| CliError::Logger(e.to_string()))?;
        Ok(())
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli)?;

    match cli.command {
        Command::Reconstruct { input, output } => {
            let report = ReconstructionReport::new(&input.reconstruct()?);
            match output {
                Some(path) => {
                    report.write_json(&path)?;
                    info!("wrote report to {}", path.display());
                }
                None => println!("{}", report.to_json()?),
            }
        }
        Command::Locate { input, x, y } => {
            let result = input.reconstruct()?;
            let lookup = result.lookup(Point2::new(x, y));
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "x": x,
                    "y": y,
                    "file": lookup.cell.file,
                    "rank": lookup.cell.rank,
                    "fallback": lookup.is_fallback(),
                    "complete": result.lattice.is_complete(),
                }))
                .map_err(LatticeIoError::from)?
            );
        }
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl log::Log for Silent {
        fn enabled(&self, _: &log::Metadata) -> bool {
            false
        }
        fn log(&self, _: &log::Record) {}
        fn flush(&self) {}
    }

    static SILENT: Silent = Silent;

    #[test]
    fn logger_conflict_is_a_cli_error() {
        let _ = log::set_logger(&SILENT);
        let cli = Cli::parse_from([
            "chess-lattice",
            "reconstruct",
            "--lines",
            "lines.json",
            "--width",
            "10",
            "--height",
            "10",
        ]);

        let err = init_logging(&cli).unwrap_err();
        assert!(matches!(err, CliError::Logger(_)));
        assert!(err.to_string().starts_with("failed to install logger"));
    }
}
