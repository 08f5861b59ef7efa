//! Minimal CLI wrapping [`wordsmith::execute`]/[`wordsmith::translate`],
//! gated behind the `cli-demo` feature so `tracing-subscriber`/`clap` stay
//! out of the default dependency tree. Mirrors the teacher's `main.rs`
//! shape (tracing init, then `clap::Parser::parse`), simplified to a
//! stderr subscriber since this is a demo binary, not a long-lived
//! service with a log directory to manage.

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use wordsmith::{execute, translate, RenderConfig, VariableEnvironment};

#[derive(Debug, Parser)]
#[clap(author, version, about = "Evaluate a wordsmith expression or template from the command line")]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Evaluate `source` as a standalone expression.
    Execute {
        source: String,
        /// HTML-escape the result instead of the default pass-through.
        #[clap(long)]
        html_escape: bool,
    },
    /// Evaluate `source` as a template.
    Translate {
        source: String,
        #[clap(long)]
        html_escape: bool,
    },
}

fn main() {
    initialize_tracing();
    let args = Args::parse();

    let (source, html_escape, is_template) = match &args.mode {
        Mode::Execute { source, html_escape } => (source, *html_escape, false),
        Mode::Translate { source, html_escape } => (source, *html_escape, true),
    };
    let config = if html_escape { RenderConfig::html_escape() } else { RenderConfig::identity() };

    let answer = if is_template { translate(source) } else { execute(source) };
    let answer = answer.unwrap_or_else(|error| {
        eprintln!("{error}");
        std::process::exit(1);
    });

    let mut env = VariableEnvironment::new();
    match answer.get_with_config(&mut env, &config) {
        Ok(value) => println!("{value}"),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn initialize_tracing() {
    let subscriber = tracing_subscriber::fmt::layer().with_target(false).with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(subscriber).init();
}
