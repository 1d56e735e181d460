use clap::Parser;

use cftutor::app::App;
use cftutor::config::{Cli, Config};
use cftutor::error::AppResult;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let mut app = App::new(config);
    let outcome = app.run().await?;
    if outcome.command_failed {
        std::process::exit(1);
    }
    Ok(())
}
