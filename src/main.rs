use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use tscn::cli::{Cli, Commands};
use tscn::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "tscn=info",
        2 => "tscn=debug",
        _ => "tscn=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new();

    match cli.command {
        Commands::Tree(args) => tscn::cli::tree::run(args, &printer)?,
        Commands::Check(args) => tscn::cli::check::run(args, &printer)?,
        Commands::Resources(args) => tscn::cli::resources::run(args, &printer)?,
        Commands::Export(args) => tscn::cli::export::run(args, &printer)?,
        Commands::Watch(args) => tscn::cli::watch::run(args, &printer)?,
        Commands::Init(args) => tscn::cli::init::run(args, &printer)?,
        Commands::Completions(args) => tscn::cli::completions::run(args)?,
    }

    Ok(())
}
