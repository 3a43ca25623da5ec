use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use num_bigint::BigInt;
use num_traits::Signed;
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use shamir_recover::{
    algebra::radix::RadixError,
    document::{Document, Limits},
    schemes::{
        select::{AscendingIndex, DocumentOrder, ListedOrder, Randomized, Selection},
        shamir::{self, DEFAULT_COEFFICIENT_BITS},
    },
    Recovery, RecoveryError,
};

#[derive(Error, Debug)]
enum CliError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
    #[error("Could not encode shares: {0}")]
    Encoding(#[from] RadixError),
    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Parser)]
#[command(version, about("Shamir secret recovery from radix-encoded shares"), long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Recover(Recover),
    Split(Split),
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// First k shares in enumeration order: integer keys ascending, then the rest
    Document,
    /// First k shares exactly as listed in the document
    Listed,
    /// The k smallest indices
    Index,
    /// A random k-subset
    Random,
}

#[derive(Args)]
#[command(about("Reconstruct the secret of one or more share documents"))]
struct Recover {
    /// Share documents. Reads stdin when empty or `-`
    files: Vec<PathBuf>,

    /// Which k shares to use
    #[arg(long, value_enum, default_value_t = Policy::Document)]
    policy: Policy,

    /// Seed for the random policy
    #[arg(long)]
    seed: Option<u64>,

    /// Fail instead of rounding when the shares do not fit an integer polynomial
    #[arg(long)]
    strict: bool,

    /// Most shares accepted per document
    #[arg(long, default_value_t = Limits::default().max_shares)]
    max_shares: usize,

    /// Longest digit string accepted per share index or value
    #[arg(long, default_value_t = Limits::default().max_digits)]
    max_digits: usize,
}

impl Recover {
    fn policy(&self) -> Box<dyn Selection> {
        match self.policy {
            Policy::Document => Box::new(DocumentOrder),
            Policy::Listed => Box::new(ListedOrder),
            Policy::Index => Box::new(AscendingIndex),
            Policy::Random => Box::new(Randomized::new(rng(self.seed))),
        }
    }

    fn run(&self) -> Result<(), CliError> {
        let limits = Limits {
            max_shares: self.max_shares,
            max_digits: self.max_digits,
        };
        let mut recovery = Recovery::new()
            .with_policy(self.policy())
            .with_limits(limits)
            .strict(self.strict);

        let stdin = [PathBuf::from("-")];
        let inputs = if self.files.is_empty() {
            &stdin[..]
        } else {
            &self.files[..]
        };

        for path in inputs {
            let document = read_document(path)?;
            let secret = recovery.recover(&document)?;
            if inputs.len() > 1 {
                println!("{}: {secret}", path.display());
            } else {
                println!("{secret}");
            }
        }
        Ok(())
    }
}

#[derive(Args)]
#[command(about("Deal a fresh share document for a secret"))]
struct Split {
    /// Non-negative secret, in decimal
    #[arg(long, allow_hyphen_values = true)]
    secret: BigInt,

    /// Shares needed to reconstruct
    #[arg(short = 'k', long)]
    threshold: usize,

    /// Shares to deal
    #[arg(short = 'n', long)]
    shares: usize,

    /// Radix of the written values
    #[arg(long, default_value_t = 10)]
    base: u32,

    /// Bit size of the random coefficients
    #[arg(long, default_value_t = DEFAULT_COEFFICIENT_BITS)]
    bits: u64,

    /// Seed for the coefficients
    #[arg(long)]
    seed: Option<u64>,
}

impl Split {
    fn run(&self) -> Result<(), CliError> {
        if self.secret.is_negative() {
            return Err(CliError::InvalidArgument(
                "Secret must be non-negative".to_owned(),
            ));
        }
        if self.threshold == 0 || self.threshold > self.shares {
            return Err(CliError::InvalidArgument(format!(
                "Threshold must be in 1..={}, got {}",
                self.shares, self.threshold
            )));
        }

        let ids: Vec<BigInt> = (1..=self.shares).map(BigInt::from).collect();
        let mut rng = rng(self.seed);
        let shares = shamir::share_with_bits(&self.secret, &ids, self.threshold, self.bits, &mut rng);
        let document = Document::from_shares(&shares, self.threshold, self.base)?;

        println!("{document}");
        Ok(())
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    seed.map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy)
}

fn read_document(path: &Path) -> Result<Document, CliError> {
    let document = if path == Path::new("-") {
        Document::from_reader(io::stdin().lock())
    } else {
        tracing::debug!("Reading from file: {}", path.display());
        let file = File::open(path).map_err(|source| CliError::Io {
            path: path.to_owned(),
            source,
        })?;
        Document::from_reader(BufReader::new(file))
    };
    Ok(document.map_err(RecoveryError::from)?)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let res = match &cli.command {
        Commands::Recover(recover) => recover.run(),
        Commands::Split(split) => split.run(),
    };

    if let Err(err) = res {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
