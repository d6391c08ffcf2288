//! Read a program, ground it, and print the ground program followed
//! by the answers to its query (if any), as comments.
//!
//! Usage: `slash [FILE]`, reading standard input when `FILE` is absent
//! or `-`. Set `SLASH_MAX_ITERATIONS` to bound the number of fixpoint
//! passes, and `SLASH_TRACE` to a comma-separated list of trace levels
//! (`safety`, `stratify`, `ground`, `assemble`; empty means all).

use std::env;
use std::fs::read_to_string;
use std::io::{stdin, Read};

use anyhow::{Context as _, Result};
use atty::Stream;

use slash_ground::{ground_with_options, GroundingOptions};
use slash_syntax::parse_program;
use slash_tracer::Trace;

fn main() -> Result<()> {
    let filename = env::args().nth(1);
    if filename.is_none() && atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
        println!("Welcome to Slash! Please enter your rules, terminated with Ctrl-D.");
    }
    let input = read_file(filename.as_deref())?;
    let program = parse_program(&input).context("Parsing program")?;
    let grounded = ground_with_options(program, options()?).context("Grounding program")?;
    print!("{grounded}");
    if let Some(query) = grounded.query() {
        println!("% {query}?");
        for answer in grounded.answers() {
            println!("% {answer}");
        }
    }
    Ok(())
}

/// Grounding options from the environment.
fn options() -> Result<GroundingOptions> {
    let mut options = GroundingOptions::default();
    if let Ok(passes) = env::var("SLASH_MAX_ITERATIONS") {
        let passes = passes
            .trim()
            .parse()
            .with_context(|| format!("Parsing SLASH_MAX_ITERATIONS={passes}"))?;
        options = options.max_iterations(passes);
    }
    if let Ok(levels) = env::var("SLASH_TRACE") {
        options = options.trace(if levels.trim().is_empty() {
            Trace::all()
        } else {
            Trace::from_names(&levels)
        });
    }
    Ok(options)
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None | Some("-") => {
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}
