use clap::{Arg, ArgAction, Command};
use log::{debug, LevelFilter};
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("nscript")
        .about("Line-oriented NScript console with underlined error diagnostics")
        .arg(
            Arg::new("file")
                .help("Script to run, one statement per line")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive console mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cwd")
                .long("cwd")
                .value_name("DIR")
                .help("Starting working directory (defaults to the current one)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise the log level, may be repeated")
                .action(ArgAction::Count),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let cwd = match matches.get_one::<String>("cwd") {
        // the session only understands absolute paths
        Some(dir) => match fs::canonicalize(dir) {
            Ok(absolute) => absolute.to_string_lossy().into_owned(),
            Err(error) => {
                eprintln!("Error: unable to use '{}' as working directory: {}", dir, error);
                process::exit(1);
            }
        },
        None => default_cwd(),
    };
    debug!("starting in {}", cwd);

    if let Some(file_path) = matches.get_one::<String>("file") {
        if !run_file(file_path, &cwd) {
            process::exit(1);
        }
        if matches.get_flag("interactive") {
            nscript::start_repl(&cwd);
        }
    } else {
        nscript::start_repl(&cwd);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn default_cwd() -> String {
    match std::env::current_dir() {
        Ok(dir) => dir.to_string_lossy().into_owned(),
        Err(error) => {
            log::warn!("unable to read the current directory, using `/`: {}", error);
            "/".to_string()
        }
    }
}

fn run_file(path: &str, cwd: &str) -> bool {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            nscript::run(&source, Some(&filename), cwd)
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
