use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(
    name = "simenv",
    version,
    about = "Environment manager for simulation frameworks and their models"
)]
struct Cli {
    /// Catalog file to use instead of the built-in catalog
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every project and its known versions
    List,
    /// Show one project version in detail, including its options
    Info {
        /// Project reference: name, name-version, or name@version
        project: String,
    },
    /// Resolve references to a mutually consistent set of versions
    Resolve {
        /// Project references (name, name-version, or name@version)
        #[arg(required = true)]
        refs: Vec<String>,
        /// Print every valid combination instead of the best one
        #[arg(long)]
        all: bool,
        /// Activate options ("opt" or "project:opt"), may repeat
        #[arg(short, long)]
        options: Vec<String>,
        /// Do not apply default options
        #[arg(long)]
        no_defaults: bool,
    },
    /// Download and build a consistent set of projects
    Install {
        /// Project references (name, name-version, or name@version)
        #[arg(required = true)]
        refs: Vec<String>,
        /// Workspace directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
        /// Activate options ("opt" or "project:opt"), may repeat
        #[arg(short, long)]
        options: Vec<String>,
        /// Do not apply default options
        #[arg(long)]
        no_defaults: bool,
        /// Keep a partially downloaded directory on failure
        #[arg(long)]
        keep_partial: bool,
    },
    /// Show the installation state of every catalog project
    Status {
        /// Workspace directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let registry = cli::load_registry(cli.catalog.as_deref());

    match cli.command {
        Command::List => cli::list::cmd_list(&registry),
        Command::Info { project } => cli::info::cmd_info(&registry, &project),
        Command::Resolve {
            refs,
            all,
            options,
            no_defaults,
        } => cli::resolve::cmd_resolve(&registry, &refs, all, &options, !no_defaults),
        Command::Install {
            refs,
            workspace,
            options,
            no_defaults,
            keep_partial,
        } => cli::install::cmd_install(
            &registry,
            &workspace,
            &refs,
            &options,
            !no_defaults,
            keep_partial,
        ),
        Command::Status { workspace } => cli::status::cmd_status(&registry, &workspace),
    }
}
