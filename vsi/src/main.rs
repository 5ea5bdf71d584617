use clap::{ArgAction, ArgMatches, Command, command};
use clap_complete::{Shell, generate};
use std::fmt::Display;
use std::fs;
use std::{
    io,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};
use vsi::import::Import;
use vsi::info::Info;
use vsi::json::Json;
use vsimport::{Consume, ImportOptions, ImportTarget, ProcessorRegistry};

#[cfg(target_os = "linux")]
use mimalloc::MiMalloc;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[macro_use]
extern crate clap;

const PATH: &str = "PATH";
const EXT_DESCR: &str = "Visual Studio solution extension";
const TARGET_DESCR: &str = "Framework projects are imported for: dotnet or mono";
const DEFAULT_SOLUTION_EXT: &str = "sln";

fn main() {
    init_tracing();

    let app = build_cli();
    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("info", cmd)) => info(cmd),
        Some(("import", cmd)) => import(cmd),
        Some(("json", cmd)) => json(cmd),
        Some(("completion", cmd)) => print_completions(cmd),
        _ => {}
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn info(cmd: &ArgMatches) {
    let mut consumer = Info::new();
    scan_path(cmd, &mut consumer, true);
}

fn import(cmd: &ArgMatches) {
    let fail_if_failed = cmd.get_flag("fail");
    let mut consumer = Import::new();
    scan_path(cmd, &mut consumer, true);
    if consumer.has_failures() && fail_if_failed {
        std::process::exit(exitcode::DATAERR);
    }
}

fn json(cmd: &ArgMatches) {
    let pretty = cmd.get_flag("pretty");
    let mut consumer = Json::new(pretty);
    scan_path(cmd, &mut consumer, false);
    print!("{consumer}");
}

fn options(cmd: &ArgMatches) -> ImportOptions {
    let target = cmd
        .try_get_one::<ImportTarget>("target")
        .ok()
        .flatten()
        .copied()
        .unwrap_or_default();
    ImportOptions {
        target,
        ..ImportOptions::default()
    }
}

fn scan_path<C: Consume + Display>(cmd: &ArgMatches, consumer: &mut C, print_totals: bool) {
    let Some(path) = cmd.get_one::<String>(PATH) else {
        return;
    };
    let Ok(metadata) = fs::metadata(path) else {
        eprintln!("{path} not found");
        return;
    };
    let registry = ProcessorRegistry::with_defaults();
    let options = options(cmd);

    if metadata.is_dir() {
        let now = Instant::now();
        let empty = String::default();
        let extension = cmd.get_one::<String>("ext").unwrap_or(&empty);
        vsimport::scan_dir(path, extension, &registry, &options, consumer);

        if print_totals {
            print!("{consumer}");

            let duration = now.elapsed().as_millis();
            let duration = Duration::from_millis(u64::try_from(duration).unwrap_or(u64::MAX));
            println!("{:>2} {}", "elapsed:", humantime::format_duration(duration));
        }
    } else if let Err(e) = vsimport::scan_solution(path, &registry, &options, consumer) {
        vsi::print_error(path, &e);
    }
}

fn print_completions(matches: &ArgMatches) {
    let mut cmd = build_cli();
    let bin_name = cmd.get_name().to_string();
    if let Some(generator) = matches.get_one::<Shell>("generator") {
        generate(*generator, &mut cmd, bin_name, &mut io::stdout());
    }
}

fn path_arg() -> clap::Arg {
    arg!([PATH])
        .help("Sets solution path or directory with solutions to import")
        .required(true)
}

fn ext_arg() -> clap::Arg {
    arg!(-e --ext <EXTENSION>)
        .required(false)
        .default_value(DEFAULT_SOLUTION_EXT)
        .help(EXT_DESCR)
}

fn target_arg() -> clap::Arg {
    arg!(-t --target <TARGET>)
        .required(false)
        .value_parser(value_parser!(ImportTarget))
        .help(TARGET_DESCR)
}

fn build_cli() -> Command {
    command!(crate_name!())
        .arg_required_else_help(true)
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .subcommand(
            Command::new("info")
                .aliases(["i"])
                .about("Get information about projects that can be imported from found solutions")
                .arg(ext_arg())
                .arg(target_arg())
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("import")
                .aliases(["im"])
                .about("Import found solutions into modules and show resulting modules and layers")
                .arg(ext_arg())
                .arg(target_arg())
                .arg(
                    arg!(-f --fail)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Return not zero exit code if any solution or project failed to import"),
                )
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("json")
                .aliases(["j"])
                .about("Scan solutions and output import plan as JSON")
                .arg(ext_arg())
                .arg(target_arg())
                .arg(
                    arg!(-p --pretty)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print JSON output"),
                )
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate the autocompletion script for the specified shell")
                .arg(
                    arg!([generator])
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .index(1),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test_case(&["vsi", "info", "."], ImportTarget::DotNet ; "default target")]
    #[test_case(&["vsi", "i", "-t", "mono", "."], ImportTarget::Mono ; "alias and mono")]
    #[test_case(&["vsi", "im", "--target", ".NET", "."], ImportTarget::DotNet ; "dotnet name")]
    fn target_option_tests(args: &[&str], expected: ImportTarget) {
        // Arrange
        let matches = build_cli().try_get_matches_from(args).unwrap();

        // Act
        let (_, cmd) = matches.subcommand().unwrap();
        let actual = options(cmd);

        // Assert
        assert_eq!(actual.target, expected);
        assert_eq!(actual.default_layer, "Default");
    }

    #[test]
    fn unknown_target_rejected() {
        // Arrange
        let args = ["vsi", "info", "-t", "java", "."];

        // Act
        let actual = build_cli().try_get_matches_from(args);

        // Assert
        assert!(actual.is_err());
    }
}
