//! JSON Reference Resolver CLI
//!
//! Command-line interface for dereferencing `$ref` links in JSON documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use json_ref_resolver::{load_source, DefaultFetcher, Fetcher, RefFailure, ResolveOptions, Resolver};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "json-ref-resolver")]
#[command(about = "Dereference $ref links in JSON documents")]
#[command(version)]
struct Cli {
    /// Log resolution progress to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every $ref in a document with the value it points to
    Resolve {
        /// Document source: file path or URL (http://, https:// or file://)
        source: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Fetch a document again for every $ref that points into it
        #[arg(long)]
        no_cache: bool,

        /// Do not fail references that loop back onto themselves (may not terminate)
        #[arg(long)]
        allow_cycles: bool,

        /// Exit with status 1 if any reference could not be resolved
        #[arg(long)]
        strict: bool,

        /// Format for unresolved-reference reports on stderr
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        report: ReportFormat,

        /// HTTP timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

struct ResolveArgs {
    source: String,
    output: Option<PathBuf>,
    pretty: bool,
    options: ResolveOptions,
    strict: bool,
    report: ReportFormat,
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            source,
            output,
            pretty,
            no_cache,
            allow_cycles,
            strict,
            report,
            timeout,
        } => {
            run_resolve(ResolveArgs {
                source,
                output,
                pretty,
                options: ResolveOptions::new()
                    .cache_documents(!no_cache)
                    .detect_cycles(!allow_cycles),
                strict,
                report,
                timeout,
            })
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "json_ref_resolver=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_fetcher(args: &ResolveArgs) -> Result<DefaultFetcher, u8> {
    #[cfg(feature = "remote")]
    {
        let http = json_ref_resolver::HttpFetcher::with_timeout(std::time::Duration::from_secs(
            args.timeout,
        ))
        .map_err(|e| {
            eprintln!("Error: building HTTP client: {}", e);
            3u8
        })?;
        Ok(DefaultFetcher::with_http(http))
    }
    #[cfg(not(feature = "remote"))]
    {
        let _ = args;
        DefaultFetcher::new().map_err(|e| {
            eprintln!("Error: {}", e);
            3u8
        })
    }
}

async fn run_resolve(args: ResolveArgs) -> Result<(), u8> {
    let fetcher = build_fetcher(&args)?;
    let fetcher: &dyn Fetcher = &fetcher;

    let (location, root) = load_source(&args.source, fetcher).await.map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let resolution = Resolver::new(fetcher)
        .with_options(args.options.clone())
        .resolve(&location, root)
        .await;

    if !resolution.failures.is_empty() {
        report_failures(args.report, &resolution.failures);
    }

    let json_output = if args.pretty {
        serde_json::to_string_pretty(&resolution.value)
    } else {
        serde_json::to_string(&resolution.value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    if args.strict && !resolution.failures.is_empty() {
        return Err(1);
    }
    Ok(())
}

/// One unresolved reference in the JSON report.
#[derive(Serialize)]
struct FailureReport<'a> {
    path: &'a str,
    reference: &'a str,
    error: String,
}

/// Print unresolved references to stderr in text or JSON form.
fn report_failures(format: ReportFormat, failures: &[RefFailure]) {
    match format {
        ReportFormat::Text => {
            eprintln!("Unresolved references:");
            for failure in failures {
                eprintln!("  {}", failure);
            }
        }
        ReportFormat::Json => {
            let entries: Vec<FailureReport<'_>> = failures
                .iter()
                .map(|f| FailureReport {
                    path: &f.path,
                    reference: &f.reference,
                    error: f.error.to_string(),
                })
                .collect();
            match serde_json::to_string(&entries) {
                Ok(json) => eprintln!("{}", json),
                Err(e) => eprintln!("Error serializing report: {}", e),
            }
        }
    }
}
