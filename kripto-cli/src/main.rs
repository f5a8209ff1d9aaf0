mod commands;
mod config;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use kripto_lottery::{
    CommitmentScheme, LotteryError, DEFAULT_ENTRY_FEE_SATS, DEFAULT_MAX_PARTICIPANTS,
};
use std::path::PathBuf;
use store::LotteryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kripto")]
#[command(about = "Commit-reveal lottery with a fixed entry fee")]
#[command(version)]
struct Cli {
    /// Data directory for lottery storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    /// hash(secret, identity)
    Bound,
    /// hash(secret)
    Bare,
}

impl From<SchemeArg> for CommitmentScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Bound => CommitmentScheme::IdentityBound,
            SchemeArg::Bare => CommitmentScheme::Bare,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new lottery
    Init {
        /// Owner identity (random if omitted)
        #[arg(long)]
        owner: Option<String>,
        /// Maximum participants per round
        #[arg(long, default_value_t = DEFAULT_MAX_PARTICIPANTS)]
        max: usize,
        /// Entry fee in satoshis
        #[arg(long, default_value_t = DEFAULT_ENTRY_FEE_SATS)]
        fee: u64,
        /// Commitment scheme
        #[arg(long, value_enum, default_value_t = SchemeArg::Bound)]
        scheme: SchemeArg,
        /// Replace an existing lottery
        #[arg(long)]
        force: bool,
    },
    /// Generate a random identity
    Identity,
    /// Credit an identity on the local ledger
    Fund {
        /// Identity to credit
        identity: String,
        /// Amount in satoshis
        sats: u64,
    },
    /// Compute the commitment for a secret
    Commit {
        /// Identity that will join
        identity: String,
        /// Secret (decimal or 0x hex)
        secret: String,
    },
    /// Join the current round
    Join {
        /// Joining identity
        identity: String,
        /// Commitment hash (hex)
        commitment: String,
        /// Value paid in satoshis (defaults to the entry fee)
        #[arg(long)]
        value: Option<u64>,
    },
    /// Reveal the secret behind a commitment
    Reveal {
        /// Revealing identity
        identity: String,
        /// Secret (decimal or 0x hex)
        secret: String,
    },
    /// Change the participant limit (owner only)
    SetMax {
        /// Owner identity
        caller: String,
        /// New limit
        max: usize,
    },
    /// Draw the winner and pay out the pool (owner only)
    Draw {
        /// Owner identity
        caller: String,
    },
    /// Show the current round
    Status,
    /// Show the last completed round
    Last,
    /// List LotteryRunFinished events
    Events,
    /// Show a ledger balance, or the lottery escrow if no identity is given
    Balance {
        /// Identity
        identity: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CliConfig::new(cli.data_dir, cli.verbose);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Ensure data directory exists
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let store = LotteryStore::new(&config.data_dir);

    // Execute command
    let result = match cli.command {
        Commands::Init {
            owner,
            max,
            fee,
            scheme,
            force,
        } => {
            commands::init_lottery(&store, owner.as_deref(), max, fee, scheme.into(), force).await
        }
        Commands::Identity => commands::new_identity(),
        Commands::Fund { identity, sats } => commands::fund(&store, &identity, sats).await,
        Commands::Commit { identity, secret } => {
            commands::make_commitment(&store, &identity, &secret).await
        }
        Commands::Join {
            identity,
            commitment,
            value,
        } => commands::join(&store, &identity, &commitment, value).await,
        Commands::Reveal { identity, secret } => {
            commands::reveal(&store, &identity, &secret).await
        }
        Commands::SetMax { caller, max } => {
            commands::set_max_participants(&store, &caller, max).await
        }
        Commands::Draw { caller } => commands::draw(&store, &caller).await,
        Commands::Status => commands::show_status(&store).await,
        Commands::Last => commands::show_last(&store).await,
        Commands::Events => commands::list_events(&store).await,
        Commands::Balance { identity } => commands::show_balance(&store, identity.as_deref()).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<LotteryError>() {
            Some(LotteryError::Unauthorized { caller }) => {
                eprintln!("Error: {} is not the lottery owner", caller);
                eprintln!("Use 'kripto status' to see the owner");
            }
            Some(LotteryError::NoRevealedSecrets) => {
                eprintln!("Error: Nobody has revealed a secret yet");
                eprintln!("Participants reveal with 'kripto reveal <identity> <secret>'");
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
