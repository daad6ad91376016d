use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use openjson::{Indent, ParseMode, ParseOptions, SerializeOptions, UnicodeEscapes, Value};

#[derive(Parser, Debug)]
#[command(name = "ojson", version, about = "JSON validator and pretty-printer")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Accept `//` and `/* */` comments and single-quoted strings.
    #[arg(short, long)]
    permissive: bool,

    /// Decode `\uXXXX` escapes instead of keeping them as written.
    #[arg(long = "decode-unicode")]
    decode_unicode: bool,

    /// Indentation: "tab" or a number of spaces (default: tab).
    #[arg(long, value_name = "tab|number", default_value = "tab", value_parser = parse_indent)]
    indent: Indent,

    /// Re-escape quotes, backslashes and control characters in strings.
    #[arg(long)]
    escape: bool,

    /// Only validate the input; print "ok" when it parses.
    #[arg(long)]
    check: bool,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let (input_text, input_source) = read_input(args.input.as_deref())?;
    let options = parse_options(args);
    tracing::debug!(mode = ?options.mode, source = ?input_source, "parsing input");

    let value = openjson::parse_with_options(&input_text, &options)?;
    if args.check {
        println!("ok");
        return Ok(());
    }

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    with_output_writer(output_target.path(), |writer| write_value(writer, &value, args))?;
    if let OutputTarget::File(path) = &output_target {
        report_status(&input_source, path);
    }
    Ok(())
}

fn parse_options(args: &Args) -> ParseOptions {
    let mode = if args.permissive {
        ParseMode::Permissive
    } else {
        ParseMode::Strict
    };
    let unicode_escapes = if args.decode_unicode {
        UnicodeEscapes::Decode
    } else {
        UnicodeEscapes::Passthrough
    };
    ParseOptions::new()
        .with_mode(mode)
        .with_unicode_escapes(unicode_escapes)
}

fn write_value(writer: &mut dyn Write, value: &Value, args: &Args) -> Result<(), Box<dyn Error>> {
    let options = SerializeOptions::new()
        .with_indent(args.indent)
        .with_escape_strings(args.escape);
    openjson::to_writer_with_options(writer, value, &options)?;
    Ok(())
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)
                .map_err(|err| format!("cannot read {path}: {err}"))?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

fn parse_indent(raw: &str) -> Result<Indent, String> {
    raw.parse::<Indent>()
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn report_status(input_source: &InputSource, output_path: &str) {
    let input_label = match input_source {
        InputSource::Stdin => "stdin".to_string(),
        InputSource::File(path) => display_path(path),
    };
    println!("✔ Formatted {input_label} → {}", display_path(output_path));
}

fn display_path(path: &str) -> String {
    let path = Path::new(path);
    let Ok(cwd) = std::env::current_dir() else {
        return path.to_string_lossy().into_owned();
    };
    match path.strip_prefix(&cwd) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
