//! Execute mispli scripts from a file or standard input
//!
//! Usage: mispli [script.el]

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use mispli::runtime::printer::render;
use mispli::Evaluator;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: mispli [script.el]");
        process::exit(2);
    }

    let (origin, code) = match args.get(1) {
        Some(path) => {
            let code = fs::read_to_string(path)
                .with_context(|| format!("reading file '{}'", path))?;
            (path.clone(), code)
        }
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("reading standard input")?;
            ("<stdin>".to_string(), code)
        }
    };

    let mut evaluator = Evaluator::new();
    let forms = evaluator
        .read(&code)
        .with_context(|| format!("parsing {}", origin))?;

    for (index, form) in forms.iter().enumerate() {
        let value = evaluator
            .execute(std::slice::from_ref(form))
            .with_context(|| format!("evaluating form {} of {}: {}", index + 1, origin, form))?;
        println!("{}", render(&value));
    }

    Ok(())
}
