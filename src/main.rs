use std::{fs::File, io, path::PathBuf};

use anyhow::Context;
use bankledger::{Bank, BankPolicy, Ledger, TransactionGenerator, input, output};
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use tracing_subscriber::EnvFilter;

/// Toy bank ledger: validates transaction lines and renders the result per account
#[derive(Parser, Debug)]
#[command(name = "bankledger", version, about)]
struct Cli {
    /// Log more, repeat for even more. RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file overriding the bank policy (fees, thresholds, bounds)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process transaction lines and print the ledger
    Process {
        /// File with one transaction per line, stdin when left out
        file: Option<PathBuf>,

        /// Also write the open accounts to this csv file
        #[arg(long)]
        accounts_csv: Option<PathBuf>,
    },
    /// Print random transaction lines that are all valid in sequence
    Generate {
        /// Number of lines
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Longest `pass time` to generate, in months
        #[arg(long, default_value_t = 3)]
        max_months: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = match &cli.policy {
        Some(path) => BankPolicy::from_json_file(path)?,
        None => BankPolicy::default(),
    };

    match cli.command {
        Command::Process { file, accounts_csv } => {
            let lines = input::read_transaction_lines(file.as_deref())
                .context("failed to read transaction lines")?;

            let mut ledger = Ledger::with_policy(policy);
            ledger.submit_all(&lines);

            output::print_ledger(&ledger, io::stdout().lock())?;

            if let Some(path) = accounts_csv {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                output::write_accounts_csv(ledger.bank(), file)?;
            }
        }
        Command::Generate {
            count,
            seed,
            max_months,
        } => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let mut bank = Bank::with_policy(policy);
            let lines = TransactionGenerator::new(rng)
                .with_max_months(max_months)
                .generate_batch(&mut bank, count)?;
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// logs go to stderr, stdout is reserved for the ledger
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
