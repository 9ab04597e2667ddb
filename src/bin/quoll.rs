//! Quoll command line host

use std::io::Read;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quoll::tools::NativeFn;
use quoll::{Interpreter, InterpreterConfig, Library, SExprScanner, Value};

#[derive(Parser)]
#[command(name = "quoll")]
#[command(about = "Quoll interpreter CLI")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Evaluate the well-formed forms of a document with syntax errors
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a source file
    Run {
        /// Input file (or - for stdin)
        file: String,
    },

    /// Evaluate an expression given on the command line
    Eval {
        /// Source text
        source: String,
    },

    /// Print the parsed document
    Parse {
        /// Input file (or - for stdin)
        file: String,

        /// Dump the reader's raw tree as JSON instead
        #[arg(long)]
        raw: bool,
    },
}

fn read_source(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file))
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<InterpreterConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            InterpreterConfig::from_json(&text).map_err(|e| anyhow!(e.to_string()))?
        }
        None => InterpreterConfig::default(),
    };
    if cli.lenient {
        config.strict_syntax = false;
    }
    Ok(config)
}

/// Host functions available to scripts run from the command line
fn host_library() -> Library {
    let mut library = Library::empty();
    library.register(NativeFn::sync("println", |args| {
        let line: Vec<String> = args.iter().map(Value::to_display_string).collect();
        println!("{}", line.join(" "));
        Ok(Value::Nil)
    }));
    library.register(
        NativeFn::new("sleep", |args: Vec<Value>| async move {
            let millis = args[0].as_int()?.max(0) as u64;
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(Value::Nil)
        })
        .with_arity(1),
    );
    library
}

async fn evaluate(source: &str, config: InterpreterConfig) -> anyhow::Result<()> {
    let interpreter = Interpreter::with_options(config, &host_library());
    let value = interpreter
        .eval_str(source)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    println!("{}", value);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("quoll=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Run { file } => {
            let source = read_source(file)?;
            tracing::info!(file = %file, "running");
            evaluate(&source, config).await?;
        }

        Commands::Eval { source } => {
            evaluate(source, config).await?;
        }

        Commands::Parse { file, raw } => {
            let source = read_source(file)?;
            if *raw {
                let document = SExprScanner::new(&source).scan_document();
                println!("{}", serde_json::to_string_pretty(&document.root)?);
            } else {
                let parsed = quoll::parse(&source);
                for error in &parsed.syntax_errors {
                    let meta = error.meta();
                    tracing::warn!(start = ?meta.start, end = ?meta.end, "syntax error");
                }
                println!("{}", parsed.document);
            }
        }
    }

    Ok(())
}
