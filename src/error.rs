use std::path::PathBuf;

use crate::transaction::TransactionType;

/// Everything that can make a single ledger line invalid.
///
/// None of these are fatal to a batch, a failing line is filed in the
/// rejected bucket and processing continues with the next one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionError {
    /// The line had no tokens at all
    #[error("empty transaction line")]
    Empty,
    /// The leading keyword(s) did not name any transaction kind
    #[error("unknown transaction kind `{0}`")]
    UnknownKind(String),
    /// The kind was recognised but the operand count is off
    #[error("`{kind}` expects {expected} operands, found {found}")]
    WrongArity {
        kind: TransactionType,
        expected: usize,
        found: usize,
    },
    /// `create` named an account type that does not exist
    #[error("unknown account type `{0}`")]
    UnknownAccountType(String),
    /// An amount or APR token could not be read as a number
    #[error("`{0}` is not a number")]
    NotANumber(String),
    /// Months have to be a whole, non-negative number
    #[error("`{0}` is not a whole number of months")]
    NotAMonthCount(String),
    /// Well formed, but the bank's rules do not allow it right now
    #[error("{0} rejected by bank rules")]
    RuleViolation(TransactionType),
    /// The referenced account is not registered
    #[error("account {0} does not exist")]
    UnknownAccount(String),
    /// An account with this id is already registered
    #[error("account {0} already exists")]
    DuplicateAccount(String),
}

impl TransactionError {
    /// true when the line could not even be parsed
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            TransactionError::Empty
                | TransactionError::UnknownKind(_)
                | TransactionError::WrongArity { .. }
                | TransactionError::UnknownAccountType(_)
                | TransactionError::NotANumber(_)
                | TransactionError::NotAMonthCount(_)
        )
    }
}

/// Misconfiguration of the transaction generator. Unlike a bad ledger line
/// these are surfaced to the caller straight away.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    #[error("{kind} needs at least {needed} accounts, the bank has {found}")]
    NotEnoughAccounts {
        kind: TransactionType,
        needed: usize,
        found: usize,
    },
    #[error("no account can currently take a {0}")]
    NoEligibleAccount(TransactionType),
    #[error("gave up on {kind} after {attempts} rejected candidates")]
    Exhausted {
        kind: TransactionType,
        attempts: usize,
    },
    /// Passed validation but the bank refused it, the pipelines disagree
    #[error("generated `{line}` did not apply: {source}")]
    NotApplied {
        line: String,
        source: TransactionError,
    },
}

/// Failure to load a [`BankPolicy`](crate::config::BankPolicy) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read policy file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("policy file {path} is not valid")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid policy: {0}")]
    Invalid(String),
}
