use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use faultline::logging::{init_logging, LoggingConfig};
use faultline::{with_code, CodeCatalog, CodeRegistry, Error, Render, ResultExt};

#[derive(Parser, Debug)]
#[command(name = "faultline")]
#[command(version)]
#[command(about = "Inspect error code catalogs and preview rendered errors")]
struct Cli {
    /// Silence diagnostic logs
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a catalog into a fresh registry and list the registered codes
    Check {
        /// Path to the catalog TOML file
        catalog: PathBuf,

        /// Print the registered codes as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Build a coded error and print how it renders
    Render {
        /// Path to the catalog TOML file
        catalog: PathBuf,

        /// Error code to attach
        #[arg(long)]
        code: i32,

        /// Internal message of the coded error
        #[arg(long)]
        message: String,

        /// Message of an underlying cause, rendered as an inner segment
        #[arg(long)]
        cause: Option<String>,

        /// Show code, caller and external message
        #[arg(long)]
        detail: bool,

        /// Render every segment of the chain
        #[arg(long)]
        trace: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LoggingConfig::from_flags(cli.verbose, cli.quiet)) {
        eprintln!("warning: {}", err);
    }

    let registry = CodeRegistry::new();
    let result = match cli.command {
        Command::Check { catalog, json } => check(&registry, &catalog, json),
        Command::Render {
            catalog,
            code,
            message,
            cause,
            detail,
            trace,
            json,
        } => load(&registry, &catalog).map(|_| {
            let err = match cause {
                Some(cause) => with_code(Some(Error::new(cause)), code, message),
                None => Some(Error::coded(code, message)),
            };
            if let Some(err) = err {
                let rendered = Render::new(&err)
                    .with_registry(&registry)
                    .detail(detail)
                    .trace(trace)
                    .json(json);
                println!("{}", rendered);
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", Render::new(&err).with_registry(&registry));
            ExitCode::from(1)
        }
    }
}

fn load(registry: &CodeRegistry, path: &Path) -> Result<usize, Error> {
    CodeCatalog::load(path)
        .and_then(|catalog| registry.load_catalog(&catalog))
        .wrap_with(|| format!("loading catalog {}", path.display()))
}

fn check(registry: &CodeRegistry, path: &Path, json: bool) -> Result<(), Error> {
    let loaded = load(registry, path)?;
    let coders = registry.coders();
    if json {
        let encoded = serde_json::to_string_pretty(&coders).wrap("encoding codes")?;
        println!("{}", encoded);
    } else {
        for coder in &coders {
            println!(
                "{:>8}  {:>3}  {}",
                coder.code(),
                coder.http_status(),
                coder.message()
            );
        }
    }
    eprintln!("{} code(s) loaded from {}", loaded, path.display());
    Ok(())
}
