//! Template Normalizer CLI
//!
//! Usage:
//!   tmpl-norm [OPTIONS] [VALUES]...
//!
//! Options:
//!   -t, --template <TEMPLATE>  Template to apply, e.g. "{d3}.{d3}.{d3}-{d2}"
//!   -r, --rule <RULE>          Use a rule from the rule book
//!   -b, --rules <FILE>         Rule book file (TOML format)
//!   --fill                     Always fill from raw characters
//!   --validate                 Only report whether values match
//!   --strict                   Treat leftover input as an incomplete fill
//!   --sentinel <CHAR>          Character used to pad unfilled slots
//!   --json                     Print one JSON response per value
//!   -p, --pattern              Print the compiled regular expression
//!   -l, --list                 List the rules in the rule book
//!   -g, --grammar              Show placeholder reference
//!   -v, --verbose...           Increase log verbosity
//!   -h, --help                 Print help

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::Level;

use template_normalizer::normalize::Normalized;
use template_normalizer::{
    parse, CompiledTemplate, FillOptions, LeftoverPolicy, RuleBook, RuleStore, TestResponse,
};

#[derive(Parser)]
#[command(name = "tmpl-norm")]
#[command(about = "Validate and normalize values with placeholder templates")]
struct Cli {
    /// Values to normalize (reads lines from stdin if not provided)
    values: Vec<String>,

    /// Template to apply
    #[arg(short, long, conflicts_with = "rule")]
    template: Option<String>,

    /// Name of a rule from the rule book
    #[arg(short, long)]
    rule: Option<String>,

    /// Rule book file (TOML format); built-in rules are used when omitted
    #[arg(short = 'b', long = "rules")]
    rules: Option<PathBuf>,

    /// Always fill the template from the raw characters of each value
    #[arg(long)]
    fill: bool,

    /// Only report whether each value already matches
    #[arg(long, conflicts_with = "fill")]
    validate: bool,

    /// Treat leftover input as an incomplete fill
    #[arg(long)]
    strict: bool,

    /// Character used to pad unfilled slots
    #[arg(long)]
    sentinel: Option<char>,

    /// Print one JSON response per value
    #[arg(long)]
    json: bool,

    /// Print the compiled regular expression and exit
    #[arg(short, long)]
    pattern: bool,

    /// List the rules in the rule book and exit
    #[arg(short, long)]
    list: bool,

    /// Show placeholder reference
    #[arg(short, long)]
    grammar: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy)]
enum Mode {
    Normalize,
    Fill,
    Validate,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.grammar {
        print_grammar();
        return;
    }

    // Load rule book
    let book = match &cli.rules {
        Some(path) => match RuleBook::from_file(path) {
            Ok(book) => book,
            Err(e) => {
                eprintln!("Error loading rule book '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => RuleBook::default(),
    };

    let mut options = book.settings.clone();
    if cli.strict {
        options = options.with_leftover(LeftoverPolicy::Reject);
    }
    if let Some(sentinel) = cli.sentinel {
        options = options.with_sentinel(sentinel);
    }
    let store = book.into_store();

    if cli.list {
        for rule in store.list() {
            let status = if rule.is_active { "" } else { " (inactive)" };
            println!("{}{}\t{}\t{}", rule.name, status, rule.template, rule.regex_pattern);
        }
        return;
    }

    let source = match (&cli.template, &cli.rule) {
        (Some(template), _) => template.clone(),
        (None, Some(name)) => match store.find_by_name(name) {
            Some(rule) if rule.is_active => rule.template,
            Some(_) => {
                eprintln!("Error: rule '{}' is inactive", name);
                process::exit(1);
            }
            None => {
                eprintln!("Error: rule '{}' not found", name);
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Error: provide --template or --rule (see --help)");
            process::exit(1);
        }
    };

    let compiled = compile_or_exit(&source);

    if cli.pattern {
        println!("{}", compiled.pattern());
        return;
    }

    let values = if cli.values.is_empty() {
        read_stdin_values()
    } else {
        cli.values.clone()
    };

    let mode = if cli.validate {
        Mode::Validate
    } else if cli.fill {
        Mode::Fill
    } else {
        Mode::Normalize
    };

    tracing::debug!(template = %source, values = values.len(), "processing values");

    let mut failures = 0;
    for value in &values {
        let response = run(&compiled, value, mode, &options);
        if !response.success {
            failures += 1;
        }
        if cli.json {
            match serde_json::to_string(&response) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error encoding response: {}", e);
                    process::exit(1);
                }
            }
        } else {
            print_plain(&response, mode);
        }
    }

    if failures > 0 {
        tracing::info!(failures, "some values did not conform");
        process::exit(2);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Compile the template, printing source-annotated errors on failure
fn compile_or_exit(source: &str) -> CompiledTemplate {
    let template = match parse(source) {
        Ok(template) => template,
        Err(errors) => {
            for error in &errors {
                eprint!("{}", error.format(source, "template"));
            }
            process::exit(1);
        }
    };
    match CompiledTemplate::compile(template) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn read_stdin_values() -> Vec<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Reading values from stdin, one per line (Ctrl-D to finish)");
    }
    let mut values = Vec::new();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => values.push(line),
            Err(e) => {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            }
        }
    }
    values
}

fn run(compiled: &CompiledTemplate, value: &str, mode: Mode, options: &FillOptions) -> TestResponse {
    match mode {
        Mode::Normalize => TestResponse::from_normalized(value, compiled.normalize(value, options)),
        Mode::Fill => {
            let fill = compiled.fill_from_raw(value, options);
            TestResponse::from_normalized(value, Normalized::Filled(fill))
        }
        Mode::Validate => TestResponse {
            success: compiled.validate(value).is_valid(),
            normalized_value: None,
            original_value: value.to_string(),
            error: None,
        },
    }
}

fn print_plain(response: &TestResponse, mode: Mode) {
    match mode {
        Mode::Validate => {
            let verdict = if response.success { "valid" } else { "no match" };
            println!("{}\t{}", response.original_value, verdict);
        }
        Mode::Normalize | Mode::Fill => {
            let output = response.normalized_value.as_deref().unwrap_or_default();
            if response.success {
                println!("{}", output);
            } else {
                println!("{}\t(incomplete: {})", output, response.original_value);
            }
        }
    }
}

fn print_grammar() {
    println!(
        r#"TEMPLATE GRAMMAR
================

Text outside braces is copied verbatim. Each {{...}} is a placeholder.

PLACEHOLDERS
------------
{{d}}          one digit
{{d3}}         exactly 3 digits
{{D}}          one or more digits
{{l}}  {{l2}}   letters, exactly 1 / exactly 2
{{L}}          one or more letters
{{w}}  {{w4}}   letters or digits, exactly 1 / exactly 4
{{W}}          one or more letters or digits

MODIFIERS
---------
?            the slot may be absent: {{d3?}}
:upper       uppercase letters on output: {{l:upper}}, {{L:upper}}
:lower       lowercase letters on output: {{w2:lower}}

Counts run from 1 to 1000. Digit slots take no case modifier, and
one-or-more slots take no count.

EXAMPLES
--------
{{d3}}.{{d3}}.{{d3}}-{{d2}}        12345678901 -> 123.456.789-01
({{d2}}) {{d5}}-{{d4}}           61999998888 -> (61) 99999-8888
{{l3:upper}}-{{d}}{{l}}{{d2}}       abc1d23     -> ABC-1d23"#
    );
}
