//! The `xcdcl` CLI: wires [`xcdcl::options::SolverOptions`] to the library, reads one input
//! document per `--format`, drives the solver and renders results the way spec §6 describes.

use std::fs;
use std::io;
use std::io::Read;
use std::process::ExitCode as ProcessExitCode;

use clap::Parser;
use log::error;
use log::info;
use xcdcl::engine::coordinator::TheoryCoordinator;
use xcdcl::engine::optimization::SearchDriver;
use xcdcl::engine::optimization::SolveOutcome;
use xcdcl::engine::runtime::install_signal_handler;
use xcdcl::engine::runtime::Runtime;
use xcdcl::options::InputFormat;
use xcdcl::options::SolverOptions;
use xcdcl::output::write_model;
use xcdcl::output::write_result_line;
use xcdcl::output::ExitCode;
use xcdcl::parsing::ecnf;
use xcdcl::parsing::lparse;
use xcdcl::parsing::opb;
use xcdcl::remap::Remapper;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn read_input(options: &SolverOptions) -> io::Result<String> {
    match &options.input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn main() -> ProcessExitCode {
    let options = SolverOptions::parse();
    init_logging(options.verbosity);

    let runtime = Runtime::new();
    if let Err(err) = install_signal_handler(&runtime) {
        error!("could not install signal handler: {err}");
    }

    let mut coordinator = TheoryCoordinator::new(runtime);
    coordinator.set_def_semantics(options.defsem);
    if options.format == InputFormat::Fz {
        coordinator.enable_cp_bridge();
    }
    let mut remapper = Remapper::default();

    let text = match read_input(&options) {
        Ok(text) => text,
        Err(err) => {
            error!("could not read input: {err}");
            return exit_code(ExitCode::Unknown);
        }
    };

    let parse_result = match options.format {
        InputFormat::Fodot => ecnf::read_ecnf(&text, &mut coordinator, &mut remapper),
        InputFormat::Asp => lparse::read_lparse(&text, &mut coordinator, &mut remapper),
        InputFormat::Opb => opb::read_opb(&text, &mut coordinator, &mut remapper),
        InputFormat::Fz => {
            error!("--format fz expects a FlatZincModel built programmatically, not a text document");
            return exit_code(ExitCode::Unknown);
        }
    };
    if let Err(err) = parse_result {
        error!("parse error: {err}");
        return exit_code(ExitCode::Unknown);
    }

    let (_present, root_unsat) = coordinator.finish_parsing();
    if root_unsat {
        let _ = write_result_line(&mut io::stdout(), ExitCode::Unsat);
        return exit_code(ExitCode::Unsat);
    }

    let mut models_found = 0u32;
    let target = options.model_count;
    let mut stdout = io::stdout();
    loop {
        match coordinator.solve() {
            SolveOutcome::Sat => {
                models_found += 1;
                let model = coordinator.snapshot_model();
                if write_model(&mut stdout, &model, Some(&remapper)).is_err() {
                    error!("failed to write model to stdout");
                    return exit_code(ExitCode::Unknown);
                }
                if target != 0 && models_found >= target {
                    break;
                }
                if coordinator.invalidate_current_model().is_err() {
                    break;
                }
            }
            SolveOutcome::Unsat => break,
            SolveOutcome::Unknown => {
                info!("search aborted before reaching a verdict");
                let _ = write_result_line(&mut stdout, ExitCode::Unknown);
                return exit_code(ExitCode::Unknown);
            }
        }
    }

    let final_code = if models_found > 0 { ExitCode::Sat } else { ExitCode::Unsat };
    let _ = write_result_line(&mut stdout, final_code);
    exit_code(final_code)
}

fn exit_code(code: ExitCode) -> ProcessExitCode {
    ProcessExitCode::from(code.code() as u8)
}
