use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ledger_core::{
    AdmissionMode, Block, Ledger, LedgerConfig, SharedLedger, Signer, Transaction, Wallet,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Drive an in-memory proof-of-work ledger")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct LedgerOpts {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leading zero hex digits required of a block hash
    #[arg(long)]
    difficulty: Option<u32>,
    /// Mining reward per block
    #[arg(long)]
    reward: Option<Decimal>,
    /// Reject malformed transactions instead of queueing them
    #[arg(long)]
    strict: bool,
    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,
}

impl LedgerOpts {
    fn load(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                LedgerConfig::from_json(&raw)?
            }
            None => LedgerConfig::default(),
        };
        if let Some(d) = self.difficulty {
            config.difficulty = d;
        }
        if let Some(r) = self.reward {
            config.mining_reward = r;
        }
        if self.strict {
            config.admission = AdmissionMode::WellFormed;
        }
        config.parallel_mining |= self.parallel;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create wallets, send a payment, mine and print the chain
    Demo {
        #[command(flatten)]
        ledger: LedgerOpts,
        /// Amount user A pays user B in each block
        #[arg(long, default_value = "10.5")]
        amount: Decimal,
        /// Number of blocks to mine
        #[arg(long, default_value_t = 1)]
        blocks: u32,
    },
    /// Mine empty blocks and report how long each search took
    Mine {
        #[command(flatten)]
        ledger: LedgerOpts,
        #[arg(long, default_value_t = 3)]
        blocks: u32,
    },
    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        ledger: LedgerOpts,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    fmt().with_env_filter(filter).init();

    match cli.cmd {
        Command::Demo {
            ledger,
            amount,
            blocks,
        } => demo(ledger.load()?, amount, blocks).await,
        Command::Mine { ledger, blocks } => mine(ledger.load()?, blocks).await,
        Command::Config { ledger } => {
            println!("{}", serde_json::to_string_pretty(&ledger.load()?)?);
            Ok(())
        }
    }
}

async fn demo(config: LedgerConfig, amount: Decimal, blocks: u32) -> Result<()> {
    println!("Mini-Blockchain Started");

    let miner = Wallet::generate();
    let user_a = Wallet::generate();
    let user_b = Wallet::generate();
    info!(miner = %miner.address(), "wallets created");

    let ledger = SharedLedger::new(Ledger::with_config(miner.address(), config)?);

    for _ in 0..blocks {
        let tx = Transaction::now(user_a.address(), user_b.address(), amount).signed_by(&user_a);
        ledger.add_transaction(tx).await?;
        let block = ledger.mine_pending(&miner.address()).await?;
        println!("Block successfully mined: {}", block.hash);
    }

    println!("\n=== Blockchain State ===");
    for block in ledger.blocks().await {
        print_block(&block);
    }

    println!("\nMiner Balance: {}", ledger.balance_of(&miner.address()).await);
    println!("User A Balance: {}", ledger.balance_of(&user_a.address()).await);
    println!("User B Balance: {}", ledger.balance_of(&user_b.address()).await);

    match ledger.validate().await {
        Ok(()) => println!("Chain valid: true"),
        Err(e) => println!("Chain valid: false ({e})"),
    }
    Ok(())
}

async fn mine(config: LedgerConfig, blocks: u32) -> Result<()> {
    let difficulty = config.difficulty;
    let ledger = SharedLedger::new(Ledger::with_config("genesis", config)?);
    for _ in 0..blocks {
        let started = Instant::now();
        let block = ledger.mine_pending("miner").await?;
        println!(
            "block {} difficulty {} nonce {} in {:?}: {}",
            block.header.index,
            difficulty,
            block.header.nonce,
            started.elapsed(),
            block.hash
        );
    }
    println!("chain valid: {}", ledger.is_valid().await);
    Ok(())
}

fn print_block(block: &Block) {
    println!("\n=== Block {} ===", block.header.index);
    println!("Hash: {}", block.hash);
    println!("Previous Hash: {}", block.header.previous_hash);
    println!("Timestamp: {}", block.header.timestamp);
    println!("Transactions: {}", block.txs.len());
    for (j, tx) in block.txs.iter().enumerate() {
        if tx.is_reward() {
            println!("  Transaction {}: Mining Reward -> {} ({})", j + 1, tx.to, tx.amount);
        } else {
            println!("  Transaction {}: {} -> {} ({})", j + 1, tx.from, tx.to, tx.amount);
        }
    }
}
