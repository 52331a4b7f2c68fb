//! A toy bank ledger.
//!
//! Plain text transaction lines are parsed, validated against the rules of
//! the account types involved, applied to an in-memory [`Bank`], and rendered
//! back as a ledger grouped by account with the rejected lines set aside.
//!
//! ```
//! use bankledger::Ledger;
//!
//! let ledger = Ledger::from_lines([
//!     "create checking 12345678 5",
//!     "deposit 12345678 500",
//!     "withdraw 12345678 1000",
//! ]);
//! assert_eq!(
//!     ledger.render(),
//!     [
//!         "checking 12345678 5.00 500.00",
//!         "deposit 12345678 500.00",
//!         "invalid withdraw 12345678 1000",
//!     ]
//! );
//! ```

pub mod accounts;
pub mod bank;
pub mod config;
pub mod error;
pub mod generator;
pub mod input;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod transaction;

pub use accounts::{Account, AccountType};
pub use bank::Bank;
pub use config::BankPolicy;
pub use error::{ConfigError, GeneratorError, TransactionError};
pub use generator::TransactionGenerator;
pub use ledger::Ledger;
pub use pipeline::{ProcessingPipeline, ValidationPipeline};
pub use transaction::{Transaction, TransactionType};

/// Runs a batch of raw lines with the default policy and returns the rendered ledger
pub fn render_ledger<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ledger::from_lines(lines).render()
}
