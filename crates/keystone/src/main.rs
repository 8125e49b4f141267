mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use keystone_core::kernel::bootstrap::Application;
use keystone_core::kernel::constants::DEFAULT_SETTINGS_DIR;
use keystone_core::kernel::error::Result;
use keystone_core::packaging::resolve;
use log::{error, info};

/// Keystone: bootstraps an application out of packages
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Directory holding the config store files
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_DIR)]
    settings_dir: PathBuf,

    /// Disable a package for this invocation (repeatable)
    #[arg(long = "disable", value_name = "PACKAGE", global = true)]
    disabled: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect the discovered packages
    Packages {
        #[command(subcommand)]
        command: PackagesCommand,
    },
    /// Bootstrap without running and print the load order
    Check,
    /// Bootstrap and run until Ctrl-C
    Run,
}

#[derive(Subcommand, Debug)]
enum PackagesCommand {
    /// List discovered packages
    List,
    /// Print the resolved load order
    Order,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        // Nothing to do without a command
        if let Err(e) = CliArgs::command().print_help() {
            eprintln!("Failed to print help: {}", e);
        }
        return ExitCode::SUCCESS;
    };

    match execute(command, &args.settings_dir, &args.disabled).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Commands, settings_dir: &Path, disabled: &[String]) -> Result<()> {
    let catalog = cli::discover(disabled)?;

    match command {
        Commands::Packages {
            command: PackagesCommand::List,
        } => {
            if catalog.is_empty() {
                println!("No packages discovered.");
            }
            for descriptor in catalog.descriptors() {
                println!("{}", cli::describe(&descriptor));
            }
        }
        Commands::Packages {
            command: PackagesCommand::Order,
        } => {
            for descriptor in resolve(&catalog.descriptors())? {
                println!("{}", descriptor.name());
            }
        }
        Commands::Check => {
            let mut app = Application::with_settings_dir(settings_dir).scripting(true);
            app.load(&catalog)?;
            println!("Load order:");
            for name in app.loaded_packages() {
                println!("  {}", name);
            }
            println!("Bootstrap OK ({} packages)", app.loaded_packages().len());
        }
        Commands::Run => {
            let mut app = Application::with_settings_dir(settings_dir);
            app.load(&catalog)?;
            info!("Press Ctrl-C to stop");
            app.run().await?;
            println!("Shutting down application...");
        }
    }
    Ok(())
}
