use anyhow::Result;
use clap::Parser;
use menousdb_rs::Client;

mod cli;
mod telemetry;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match telemetry::init_telemetry(cli.verbose, cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = run(&cli).await;
    if let Err(e) = &result {
        tracing::error!("❌ {:#}", e);
        eprintln!("{}", error_message(e));
    }

    // Flush the file log before exiting
    drop(guard);

    if result.is_err() {
        std::process::exit(1);
    }
}

fn error_message(err: &anyhow::Error) -> String {
    format!("❌ {:#}", err)
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.connection.resolve()?;
    tracing::debug!("  Server: {}", config.normalized_url());
    tracing::debug!("  Database: {}", config.database().unwrap_or("<none>"));

    let client = Client::from_config(&config)?;
    let output = cli.command.run(&client).await?;

    println!("{}", output.render()?);
    Ok(())
}
