//! GVariant text command-line tool: validate and transcode GVariant values.
//!
//! Usage: gvariant [OPTIONS] [FILE|DIR|-]
//!
//! Options:
//!   -e, --eval <TEXT>      Parse TEXT instead of reading a file
//!   -t, --to <FORMAT>      Output format (debug, yaml, toml, cbor, diag)
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if input is valid (exit 0 if valid, 1 if invalid)
//!   --max-depth <N>        Maximum container nesting depth
//!   -h, --help             Print help
//!   -V, --version          Print version

use libgvariant::{parse_value_with_limits, Limits, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

mod transcode;

/// Output formats selectable with -t.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Debug,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "debug" => Some(Format::Debug),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "cbor" => Some(Format::Cbor),
        "diag" => Some(Format::CborDiag),
        _ => None,
    }
}

/// Where the text to parse comes from.
enum Source<'a> {
    Eval(&'a str),
    Path(&'a str),
    Stdin,
}

/// Options shared by every input processed in one run.
struct Options<'a> {
    format: Format,
    output_file: Option<&'a str>,
    check_only: bool,
    limits: Limits,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut format = Format::Debug;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut limits = Limits::default();
    let mut source: Option<Source> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("gvariant {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                let name = option_argument(&args, &mut i, "-t requires a format argument");
                format = match parse_format(name) {
                    Some(f) => f,
                    None => {
                        eprintln!("Error: Unknown format: {}", name);
                        process::exit(1);
                    }
                };
            }
            "-o" | "--output" => {
                output_file = Some(option_argument(
                    &args,
                    &mut i,
                    "--output requires an argument",
                ));
            }
            "-e" | "--eval" => {
                let text = option_argument(&args, &mut i, "--eval requires a text argument");
                set_source(&mut source, Source::Eval(text));
            }
            "--check" => {
                check_only = true;
            }
            "--max-depth" => {
                let n = option_argument(&args, &mut i, "--max-depth requires a number");
                limits.max_nesting_depth = match n.parse() {
                    Ok(depth) => depth,
                    Err(_) => {
                        eprintln!("Error: Invalid --max-depth: {}", n);
                        process::exit(1);
                    }
                };
            }
            "-" => set_source(&mut source, Source::Stdin),
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            path => set_source(&mut source, Source::Path(path)),
        }
        i += 1;
    }

    let options = Options {
        format,
        output_file,
        check_only,
        limits,
    };

    let exit_code = match source.unwrap_or(Source::Stdin) {
        Source::Eval(text) => process_input(text, None, &options),
        Source::Path(path) if Path::new(path).is_dir() => {
            if options.output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            if options.format == Format::Cbor && !options.check_only {
                eprintln!("Error: --to cbor cannot be used with directory input");
                process::exit(1);
            }
            process_directory(path, &options)
        }
        Source::Path(path) => match fs::read_to_string(path) {
            Ok(input) => process_input(&input, Some(path), &options),
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                1
            }
        },
        Source::Stdin => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            process_input(&input, None, &options)
        }
    };
    process::exit(exit_code);
}

/// Consume the argument following option `args[*i]`, or exit with `missing`.
fn option_argument<'a>(args: &'a [String], i: &mut usize, missing: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(arg) => arg,
        None => {
            eprintln!("Error: {}", missing);
            process::exit(1);
        }
    }
}

fn set_source<'a>(slot: &mut Option<Source<'a>>, source: Source<'a>) {
    if slot.is_some() {
        eprintln!("Error: Multiple inputs not supported");
        process::exit(1);
    }
    *slot = Some(source);
}

/// Sorted paths of the `.gv` files directly inside `dir`.
fn collect_gv_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "gv"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Line printed before each file's output in directory mode.
fn file_header(path: &str) -> String {
    format!("{}:", path)
}

/// Process every `.gv` file in a directory; 1 if any of them failed.
fn process_directory(dir_path: &str, options: &Options) -> i32 {
    let paths = match collect_gv_files(Path::new(dir_path)) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        if !options.check_only {
            println!("{}", file_header(&path_str));
        }
        let exit_code = match fs::read_to_string(&path) {
            Ok(input) => process_input(&input, Some(&*path_str), options),
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                1
            }
        };
        had_errors |= exit_code != 0;
    }

    if had_errors {
        1
    } else {
        0
    }
}

fn process_input(input: &str, input_file: Option<&str>, options: &Options) -> i32 {
    let value = match parse_value_with_limits(input, options.limits) {
        Ok(value) => value,
        Err(e) => {
            match input_file {
                Some(path) => eprintln!("{}", e.describe(input, Some(path))),
                None => eprintln!("Parse error: {}", e.describe(input, None)),
            }
            return 1;
        }
    };

    if options.check_only {
        match input_file {
            Some(path) => println!("{}: ok", path),
            None => println!("ok"),
        }
        return 0;
    }

    output_value(&value, options)
}

/// Encode a parsed value in the requested format and write it out.
fn output_value(value: &Value, options: &Options) -> i32 {
    let output_file = options.output_file;
    match options.format {
        Format::Debug => write_text_output(&format!("{:?}", value), output_file),
        Format::Yaml => match transcode::yaml::encode(value) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to YAML: {}", e);
                return 1;
            }
        },
        Format::Toml => match transcode::toml::encode(value) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to TOML: {}", e);
                return 1;
            }
        },
        Format::Cbor => match transcode::cbor::encode(value) {
            Ok(bytes) => write_binary_output(&bytes, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to CBOR: {}", e);
                return 1;
            }
        },
        Format::CborDiag => {
            let diag = transcode::cbor::encode(value)
                .and_then(|bytes| transcode::cbor::diagnostic(&bytes));
            match diag {
                Ok(output) => write_text_output(&output, output_file),
                Err(e) => {
                    eprintln!("Error: Cannot render CBOR diagnostic notation: {}", e);
                    return 1;
                }
            }
        }
    }
    0
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }
}

fn write_binary_output(output: &[u8], output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else if let Err(e) = io::stdout().lock().write_all(output) {
        eprintln!("Error writing to stdout: {}", e);
        process::exit(1);
    }
}

fn print_help() {
    println!(
        "gvariant - GVariant text command-line tool

USAGE:
    gvariant [OPTIONS] [FILE|DIR|-]

ARGS:
    [FILE|DIR|-]   Input file or directory (reads from stdin if not provided)
                   When a directory is given, processes all .gv files in it,
                   printing each file name before its output

OPTIONS:
    -e, --eval <TEXT>      Parse TEXT instead of reading a file

    -t, --to <FORMAT>      Output format [default: debug]
                           Supported: debug, yaml, toml, cbor, diag

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    --max-depth <N>        Maximum container nesting depth [default: {}]

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Show the parsed value tree
    gvariant -e \"{{'a': (1, 'x')}}\"
    gvariant -e \"[{{1, 'one'}}, {{2, 'two'}}]\"

    # Validate every .gv file in a directory
    gvariant --check ./values/

    # Convert a dictionary to YAML or TOML
    gvariant -t yaml settings.gv
    gvariant -t toml settings.gv -o settings.toml

    # Convert to CBOR, or inspect the CBOR encoding
    gvariant -t cbor value.gv -o value.cbor
    gvariant -t diag value.gv

    # Read from a pipe
    gdbus call ... | gvariant -t yaml -",
        Limits::default().max_nesting_depth
    );
}
