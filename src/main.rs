mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use symref::diagnostics;

use crate::commands::Inputs;

#[derive(Parser)]
#[command(name = "symref", version, about = "Resolve documentation links against symbol graphs")]
struct Cli {
    /// The command to run.
    #[command(subcommand)]
    command: Commands,
    /// Log debug events to stderr (`RUST_LOG` takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the path hierarchy with disambiguated names
    Dump {
        /// Symbol graph inputs.
        #[command(flatten)]
        input: GraphArgs,
    },
    /// Merge relationships and print the merged model as JSON
    Merge {
        /// Symbol graph inputs.
        #[command(flatten)]
        input: GraphArgs,
    },
    /// Resolve documentation links to canonical references
    Resolve {
        /// Precise identifier of the symbol relative links start from.
        #[arg(long, value_name = "PRECISE-ID")]
        from: Option<String>,
        /// Symbol graph inputs, when resolving locally.
        #[command(flatten)]
        input: GraphArgs,
        /// Links to resolve, such as `/MyKit/MyEnum/case-enum.case`.
        #[arg(required = true)]
        links: Vec<String>,
        /// Resolve against this snapshot instead of symbol graphs.
        #[arg(long, requires = "summaries", value_name = "FILE")]
        snapshot: Option<PathBuf>,
        /// Linkable-element summaries that belong to `--snapshot`.
        #[arg(long, requires = "snapshot", value_name = "FILE")]
        summaries: Option<PathBuf>,
    },
    /// Write a link-resolution snapshot and linkable-element summaries
    Snapshot {
        /// Symbol graph inputs.
        #[command(flatten)]
        input: GraphArgs,
        /// Directory to write the files to.
        #[arg(long, short)]
        output: PathBuf,
    },
}

/// Flags shared by every command that builds a documentation context.
#[derive(Args)]
struct GraphArgs {
    /// Bundle identifier for generated references.
    #[arg(long)]
    bundle_id: Option<String>,
    /// Config file to use instead of `./.symref.toml`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Symbol graph file or directory (repeatable).
    #[arg(long = "graph", value_name = "PATH")]
    graphs: Vec<PathBuf>,
    /// Keep documentation inherited from other modules.
    #[arg(long)]
    inherit_docs: bool,
}

impl GraphArgs {
    /// Command-independent view of the flags.
    fn into_inputs(self) -> Inputs {
        return Inputs {
            bundle_id: self.bundle_id,
            config: self.config,
            graphs: self.graphs,
            inherit_docs: self.inherit_docs,
        };
    }

    /// Whether any flag was passed.
    fn is_given(&self) -> bool {
        return self.bundle_id.is_some() || self.config.is_some() || !self.graphs.is_empty() || self.inherit_docs;
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Dump { input } => commands::dump(&input.into_inputs()),
        Commands::Merge { input } => commands::merge(&input.into_inputs()),
        Commands::Resolve { from, input, links, snapshot, summaries } => match (snapshot, summaries) {
            (Some(snapshot), Some(summaries)) => {
                if input.is_given() {
                    tracing::warn!("--graph, --config, --bundle-id and --inherit-docs are ignored with --snapshot");
                }
                commands::resolve_external(&snapshot, &summaries, &links, from.as_deref())
            },
            _ => commands::resolve_local(&input.into_inputs(), &links, from.as_deref()),
        },
        Commands::Snapshot { input, output } => commands::snapshot(&input.into_inputs(), &output),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}
