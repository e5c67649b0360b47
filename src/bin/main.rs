use anagram_core::logging::init_logging;
use anagram_core::{build_index, Settings, WordFinder};
use crossterm::style::Stylize;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::error;

const USAGE_EXIT_CODE: i32 = -1;
const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Init { store: PathBuf, dictionary: PathBuf },
    Find { store: PathBuf, length: i64, letters: String },
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("anagram_finder");

    let Some(command) = parse_args(args.get(1..).unwrap_or(&[])) else {
        print_usage(program);
        process::exit(USAGE_EXIT_CODE);
    };

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            process::exit(FAILURE_EXIT_CODE);
        }
    };
    init_logging(&settings);

    // Store handles are dropped inside `run`, before exiting.
    let code = run(command, &settings);
    process::exit(code);
}

fn run(command: Command, settings: &Settings) -> i32 {
    match command {
        Command::Init { store, dictionary } => match build_index(&store, &dictionary, settings) {
            Ok(_) => 0,
            Err(e) => {
                error!(error = %e, "Initialization failed");
                FAILURE_EXIT_CODE
            }
        },
        Command::Find { store, length, letters } => find_words(&store, length, &letters),
    }
}

fn find_words(store: &Path, length: i64, letters: &str) -> i32 {
    let mut finder = match WordFinder::open(store) {
        Ok(finder) => finder,
        Err(e) => {
            error!(store = %store.display(), error = %e, "Cannot open store");
            return FAILURE_EXIT_CODE;
        }
    };
    let matches = match finder.find_words(length, letters) {
        Ok(matches) => matches,
        Err(e) => {
            error!(error = %e, "Error searching store");
            return FAILURE_EXIT_CODE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for word in matches {
        let word = match word {
            Ok(word) => word,
            Err(e) => {
                error!(error = %e, "Error searching store");
                return FAILURE_EXIT_CODE;
            }
        };
        if let Err(e) = writeln!(out, "{}", word) {
            if e.kind() == ErrorKind::BrokenPipe {
                return 0;
            }
            error!(error = %e, "Cannot write result");
            return FAILURE_EXIT_CODE;
        }
    }
    0
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args {
        [init, store, dictionary] if init == "init" => Some(Command::Init {
            store: PathBuf::from(store),
            dictionary: PathBuf::from(dictionary),
        }),
        [store, length, letters] => Some(Command::Find {
            store: PathBuf::from(store),
            length: parse_length(length),
            letters: letters.clone(),
        }),
        _ => None,
    }
}

/// `atoi`-style: optional whitespace and sign, then leading digits.
/// Unparsable input gives 0; overflow saturates.
fn parse_length(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(digit - b'0'));
    }
    if negative {
        -value
    } else {
        value
    }
}

fn print_usage(program: &str) {
    eprintln!("{}\t{} init <path_to_store> <path_to_dict>", "Usage:".bold(), program);
    eprintln!("\t{} <path_to_store> <length> <letters>", program);
}
