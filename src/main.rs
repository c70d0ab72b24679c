use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use weir_lang::cli::{self, CheckOptions, CheckResult, CliError};

#[derive(ClapParser)]
#[command(name = "weir")]
#[command(about = "Weir - evaluate mediation expressions against a JSON message")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and evaluate an expression
    Check {
        /// The expression to evaluate (bare, ${...}, or #[...])
        expression: String,

        /// JSON payload (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Context variable binding, name=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,

        /// Transport header binding, name=value (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,

        /// Synapse attribute binding, name=value (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Expression engine to use
        #[arg(long, default_value = "default")]
        engine: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            vars,
            headers,
            attrs,
            syntax_only,
            engine,
        } => run_check(expression, input, vars, headers, attrs, syntax_only, engine),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    expression: String,
    input: Option<String>,
    vars: Vec<String>,
    headers: Vec<String>,
    attrs: Vec<String>,
    syntax_only: bool,
    engine: String,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            if buffer.trim().is_empty() {
                None
            } else {
                Some(buffer)
            }
        }
        None => None,
    };

    let options = CheckOptions {
        expression,
        input,
        vars,
        headers,
        attrs,
        syntax_only,
        engine,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid { content_aware } => {
            println!(
                "Syntax is valid (content-aware: {})",
                content_aware
            );
        }
        CheckResult::Success(Some(output)) => println!("{}", output),
        CheckResult::Success(None) => println!(),
    }
    Ok(())
}
