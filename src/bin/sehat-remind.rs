use std::sync::Arc;

use clap::Parser;
use sehat_pulse::{
    config::{self, ClientConfig},
    logging,
    reminders::{runner, ConsoleNotifier, SystemClock},
};

/// Terminal reminder client for Sehat Pulse
#[derive(Parser)]
#[command(name = "sehat-remind", version = env!("CARGO_PKG_VERSION"), long_about = None)]
struct Cli {
    /// Send one test reminder and exit without contacting the API
    #[arg(long = "test")]
    test: bool,
}

// The local UTC offset can only be read reliably while the process is still
// single threaded, so configuration is loaded before the runtime starts.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init("sehat_pulse=info");

    if cli.test {
        let clock = SystemClock::new(config::offset_from_env()?);
        runner::send_test(&ConsoleNotifier::default(), &clock);
        return Ok(());
    }

    let config = ClientConfig::from_env()?;
    tokio::runtime::Runtime::new()?.block_on(runner::run(config, Arc::new(ConsoleNotifier::default())))
}
