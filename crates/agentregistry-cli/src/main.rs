//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use agentregistry_cli::{
    Cli, CliError, Commands, RuntimeCommand, bootstrap, handlers, settings_from_cli,
};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command.as_ref() else {
        return Ok(());
    };

    let ctx = bootstrap(settings_from_cli(&cli))?;
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match command {
        Commands::Paths => handlers::paths::execute(&ctx),
        Commands::Runtime { command } => match command {
            RuntimeCommand::Render(args) => handlers::runtime::render(&ctx, args)?,
            RuntimeCommand::Apply(args) => handlers::runtime::apply(&ctx, args, &cancel).await?,
            RuntimeCommand::Down => handlers::runtime::down(&ctx, &cancel).await?,
            RuntimeCommand::Status { json } => handlers::runtime::status(&ctx, *json).await?,
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so ARCTL_* fallbacks see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.command.is_none() {
        Cli::command().print_help()?;
        return Ok(());
    }

    if let Err(err) = run(cli).await {
        debug!(?err, "Command failed");
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}
