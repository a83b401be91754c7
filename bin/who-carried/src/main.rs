use clap::{Parser, Subcommand};
use command::{Data, Options, RateLimited};
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use who_carried_evaluation::summary::QueueFilter;
use who_carried_evaluation::Identity;

mod advisor;
mod command;
mod config;
mod report;

// EX_TEMPFAIL from sysexits.h
const RATE_LIMITED_EXIT: u8 = 75;

#[derive(Parser)]
#[command(name = "who-carried")]
#[command(about = "Scores League of Legends matches and ranks squads by contribution")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Queue to analyze: all, solo, flex, aram, normal or a queue id
    #[arg(long, global = true, default_value = "all")]
    queue: QueueFilter,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Ask the advisory model for commentary
    #[arg(long, global = true)]
    advice: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score one player's recent matches
    Analyze {
        /// Riot ID, e.g. "Hide on bush#KR1" (tag defaults to KR1)
        riot_id: Identity,
    },

    /// Rank a squad over the games they played together
    Squad {
        /// Riot ID of the player whose history is searched
        riot_id: Identity,

        /// Other squad members; defaults to the latest team
        members: Vec<Identity>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    setup_tracing_subscriber();
    let cli = Cli::parse();

    info!("Loading configuration");
    let config = Config::load(cli.config.as_ref()).await?;
    let data = Data::new(config)?;

    let options = Options {
        queue: cli.queue,
        json: cli.json,
        advice: cli.advice,
    };
    let result = match cli.command {
        Command::Analyze { riot_id } => command::analyze(&data, &riot_id, options).await,
        Command::Squad { riot_id, members } => {
            command::squad(&data, &riot_id, &members, options).await
        }
    };

    match result {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<RateLimited>() {
            Some(rate_limited) => {
                warn!("Giving up after a rate limit at {}", rate_limited.endpoint);
                eprintln!("{rate_limited}");
                Ok(ExitCode::from(RATE_LIMITED_EXIT))
            }
            None => Err(e),
        },
    }
}

fn setup_tracing_subscriber() {
    let layer = fmt::layer()
        .pretty()
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_thread_ids(false)
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::from_default_env())
        .init();
}
