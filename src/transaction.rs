//! One ledger line, parsed once into a typed value.
//!
//! The grammar is whitespace separated with case insensitive keywords:
//!
//! ```text
//! create <checking|savings|cd> <id> <apr> [<initial balance, cd only>]
//! deposit <id> <amount>
//! withdraw <id> <amount>
//! transfer <from id> <to id> <amount>
//! pass time <months>
//! ```
//!
//! `infinity` is accepted wherever an amount is expected.

use std::fmt;
use std::str::FromStr;

use crate::{accounts::AccountType, error::TransactionError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Create,
    Deposit,
    Withdraw,
    Transfer,
    PassTime,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Create => "create",
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
            TransactionType::Transfer => "transfer",
            TransactionType::PassTime => "pass time",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Create {
        account_type: AccountType,
        id: String,
        apr: f64,
        /// only present, and required, for a CD
        balance: Option<f64>,
    },
    Deposit {
        id: String,
        amount: f64,
    },
    Withdraw {
        id: String,
        amount: f64,
    },
    Transfer {
        from: String,
        to: String,
        amount: f64,
    },
    PassTime {
        months: u32,
    },
}

impl Transaction {
    pub fn kind(&self) -> TransactionType {
        match self {
            Transaction::Create { .. } => TransactionType::Create,
            Transaction::Deposit { .. } => TransactionType::Deposit,
            Transaction::Withdraw { .. } => TransactionType::Withdraw,
            Transaction::Transfer { .. } => TransactionType::Transfer,
            Transaction::PassTime { .. } => TransactionType::PassTime,
        }
    }

    /// Parse a raw ledger line. Anything that does not fit the grammar is an
    /// error, never a panic.
    pub fn parse(line: &str) -> Result<Self, TransactionError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, operands) = tokens.split_first().ok_or(TransactionError::Empty)?;

        match keyword.to_ascii_lowercase().as_str() {
            "create" => parse_create(operands),
            "deposit" => {
                let [id, amount] = operands_of::<2>(TransactionType::Deposit, operands)?;
                Ok(Transaction::Deposit {
                    id: id.to_string(),
                    amount: parse_amount(amount)?,
                })
            }
            "withdraw" => {
                let [id, amount] = operands_of::<2>(TransactionType::Withdraw, operands)?;
                Ok(Transaction::Withdraw {
                    id: id.to_string(),
                    amount: parse_amount(amount)?,
                })
            }
            "transfer" => {
                let [from, to, amount] = operands_of::<3>(TransactionType::Transfer, operands)?;
                Ok(Transaction::Transfer {
                    from: from.to_string(),
                    to: to.to_string(),
                    amount: parse_amount(amount)?,
                })
            }
            // the only two word keyword
            "pass" => match operands.split_first() {
                Some((second, rest)) if second.eq_ignore_ascii_case("time") => {
                    let [months] = operands_of::<1>(TransactionType::PassTime, rest)?;
                    Ok(Transaction::PassTime {
                        months: parse_months(months)?,
                    })
                }
                _ => Err(TransactionError::UnknownKind(line.trim().to_string())),
            },
            _ => Err(TransactionError::UnknownKind(keyword.to_string())),
        }
    }
}

impl FromStr for Transaction {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transaction::parse(s)
    }
}

/// The canonical text of a transaction, lower cased with two decimals
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::Create {
                account_type,
                id,
                apr,
                balance,
            } => {
                write!(f, "create {account_type} {id} {apr:.2}")?;
                if let Some(balance) = balance {
                    write!(f, " {}", Amount(*balance))?;
                }
                Ok(())
            }
            Transaction::Deposit { id, amount } => write!(f, "deposit {id} {}", Amount(*amount)),
            Transaction::Withdraw { id, amount } => write!(f, "withdraw {id} {}", Amount(*amount)),
            Transaction::Transfer { from, to, amount } => {
                write!(f, "transfer {from} {to} {}", Amount(*amount))
            }
            Transaction::PassTime { months } => write!(f, "pass time {months}"),
        }
    }
}

/// Renders an amount so that it parses back to itself
struct Amount(f64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            f.write_str("infinity")
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

fn parse_create(operands: &[&str]) -> Result<Transaction, TransactionError> {
    let type_token = operands.first().ok_or(TransactionError::WrongArity {
        kind: TransactionType::Create,
        expected: 3,
        found: 0,
    })?;
    let account_type = AccountType::from_token(type_token)
        .ok_or_else(|| TransactionError::UnknownAccountType(type_token.to_string()))?;

    match account_type {
        AccountType::Cd => {
            let [_, id, apr, balance] = operands_of::<4>(TransactionType::Create, operands)?;
            Ok(Transaction::Create {
                account_type,
                id: id.to_string(),
                apr: parse_amount(apr)?,
                balance: Some(parse_amount(balance)?),
            })
        }
        AccountType::Checking | AccountType::Savings => {
            let [_, id, apr] = operands_of::<3>(TransactionType::Create, operands)?;
            Ok(Transaction::Create {
                account_type,
                id: id.to_string(),
                apr: parse_amount(apr)?,
                balance: None,
            })
        }
    }
}

fn operands_of<'a, const N: usize>(
    kind: TransactionType,
    operands: &[&'a str],
) -> Result<[&'a str; N], TransactionError> {
    <[&str; N]>::try_from(operands).map_err(|_| TransactionError::WrongArity {
        kind,
        expected: N,
        found: operands.len(),
    })
}

/// Decimal number rounded to whole cents, or the literal `infinity`
pub fn parse_amount(token: &str) -> Result<f64, TransactionError> {
    if token.eq_ignore_ascii_case("infinity") {
        return Ok(f64::INFINITY);
    }
    // f64::from_str also knows "inf" and "nan", neither is part of the grammar
    match token.parse::<f64>().map(to_cents) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TransactionError::NotANumber(token.to_string())),
    }
}

/// Amounts are kept at the precision they are written back with, so a
/// filed line always means the same as the line that was submitted
fn to_cents(value: f64) -> f64 {
    // adding zero turns a rounded -0.0 into 0.0
    (value * 100.0).round() / 100.0 + 0.0
}

fn parse_months(token: &str) -> Result<u32, TransactionError> {
    token
        .parse::<u32>()
        .map_err(|_| TransactionError::NotAMonthCount(token.to_string()))
}
