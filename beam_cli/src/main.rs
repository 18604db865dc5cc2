//! # Beam CLI Application
//!
//! Solves beam documents from the command line.
//!
//! ```text
//! beam_cli [--json] [FILE]
//! ```
//!
//! `FILE` is either a beam document (see `beam_core::document`) or a bare
//! beam description. Without a file a built-in hinged demonstration beam is
//! solved. `--json` prints the full solution as JSON instead of the summary.
//! Set `RUST_LOG=debug` to trace the solving pipeline.

use std::path::Path;
use std::process::ExitCode;

use log::{info, warn};

use beam_core::beam::Quantity;
use beam_core::document::DocumentSettings;
use beam_core::file_io::{load_beam_input, load_document};
use beam_core::input::BeamInput;
use beam_core::{BeamError, BeamResult, BeamSolution};

struct Args {
    json: bool,
    path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        json: false,
        path: None,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => args.json = true,
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            _ if args.path.is_some() => return Err("only one input file is accepted".to_string()),
            _ => args.path = Some(arg.clone()),
        }
    }
    Ok(args)
}

/// Beams to solve, with the sampling density to use for their extremes
fn load_inputs(path: Option<&str>) -> BeamResult<(Vec<BeamInput>, DocumentSettings)> {
    let Some(path) = path else {
        info!("no input file, solving the demonstration beam");
        return Ok((vec![BeamInput::hinged_demo()], DocumentSettings::default()));
    };
    let path = Path::new(path);
    match load_document(path) {
        Ok(document) => {
            let settings = document.settings.clone();
            let beams = document
                .beams_by_label()
                .into_iter()
                .map(|(_, beam)| beam.clone())
                .collect();
            Ok((beams, settings))
        }
        Err(BeamError::SerializationError { .. }) => {
            info!("{} is not a document, reading it as a single beam", path.display());
            Ok((vec![load_beam_input(path)?], DocumentSettings::default()))
        }
        Err(e) => Err(e),
    }
}

fn print_summary(input: &BeamInput, solution: &BeamSolution, settings: &DocumentSettings) {
    println!("═══════════════════════════════════════");
    println!("  {}", input.label);
    println!("═══════════════════════════════════════");
    println!("Length: {}  (origin {})", solution.length, solution.origin);
    println!();

    println!("Reactions:");
    for reaction in solution.reactions() {
        println!(
            "  x = {:<8} {:<16} R = {}   M = {}",
            reaction.x_coord.to_string(),
            reaction.kind.name(),
            reaction.force,
            reaction.moment
        );
    }

    for segment in &solution.segments {
        println!();
        println!("Segment [{}, {}]:", segment.x_start, segment.x_end);
        for quantity in Quantity::ALL {
            println!("  {} = {}", quantity.symbol(), segment.quantity(quantity));
        }
    }

    println!();
    println!("Extremes:");
    for quantity in Quantity::ALL {
        match solution.extreme(quantity, &input.bindings, settings.diagram_samples) {
            Ok(Some(extreme)) => println!(
                "  {:<15} {:>14.6e} at x = {:.4}",
                quantity.display_name(),
                extreme.value,
                extreme.position
            ),
            Ok(None) => {}
            Err(e) => {
                warn!("cannot evaluate {}: {}", quantity.display_name(), e);
                println!("  {:<15} (needs numeric bindings)", quantity.display_name());
            }
        }
    }
    println!();
}

fn run(args: &Args) -> BeamResult<()> {
    let (inputs, settings) = load_inputs(args.path.as_deref())?;
    let mut solutions = Vec::with_capacity(inputs.len());

    for input in &inputs {
        let mut beam = input.build()?;
        beam.solve()?;
        let solution = beam
            .solution()
            .ok_or_else(|| BeamError::internal("solved beam produced no solution"))?;
        if !args.json {
            print_summary(input, &solution, &settings);
        }
        solutions.push(solution);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&solutions).map_err(|e| BeamError::SerializationError {
            reason: e.to_string(),
        })?;
        println!("{}", json);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
            }
            eprintln!("Usage: beam_cli [--json] [FILE]");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
