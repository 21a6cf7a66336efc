use clap::{Parser, Subcommand};
use correos_tracker::bot::{self, PollLoop};
use correos_tracker::carrier::CorreosClient;
use correos_tracker::config::Config;
use correos_tracker::store::TrackingStore;
use correos_tracker::telegram::formatter::NOTHING_TRACKED;
use correos_tracker::telegram::messenger::TelegramMessenger;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "correos-tracker",
    about = "Track Correos shipments and get notified on Telegram"
)]
struct Cli {
    /// Config file (defaults to ~/.config/correos-tracker/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the tracker bot (long-running, default)
    Run,
    /// Print tracked shipments and their last known status
    List,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Config error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime: {e}");
                    std::process::exit(1);
                }
            };
            rt.block_on(run(config));
            tracing::info!("Stopped.");
        }
        Commands::List => print_tracked(&config),
    }
}

async fn run(config: Config) {
    let store = TrackingStore::open(config.effective_data_file());
    let carrier = CorreosClient::new(&config);
    let messenger = TelegramMessenger::new(&config);
    let cancel_token = CancellationToken::new();

    bot::spawn_signal_handler(cancel_token.clone());

    PollLoop::new(&config, store, carrier, messenger)
        .run(cancel_token)
        .await;
}

fn print_tracked(config: &Config) {
    let store = TrackingStore::open(config.effective_data_file());
    let numbers = store.list();
    if numbers.is_empty() {
        println!("{NOTHING_TRACKED}");
        return;
    }

    for number in numbers {
        match store.latest_known_event(&number) {
            Some(event) => println!(
                "{number}\t{} {}\t{}",
                event.event_date, event.event_time, event.summary_text
            ),
            None => println!("{number}\t(not checked yet)"),
        }
    }
}
