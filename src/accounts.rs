use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest single deposit a checking account accepts
pub const CHECKING_MAX_DEPOSIT: f64 = 1000.0;
/// Largest single withdrawal from a checking account
pub const CHECKING_MAX_WITHDRAW: f64 = 400.0;
pub const SAVINGS_MAX_DEPOSIT: f64 = 2500.0;
pub const SAVINGS_MAX_WITHDRAW: f64 = 1000.0;
/// Months a CD has to age before it can be withdrawn from
pub const CD_MATURITY_MONTHS: u32 = 12;
/// Interest is applied this many times per month on a CD
pub const CD_COMPOUNDS_PER_STEP: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Cd,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Cd => "cd",
        }
    }

    /// Case insensitive lookup of the token used in `create` lines
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "checking" => Some(AccountType::Checking),
            "savings" => Some(AccountType::Savings),
            "cd" => Some(AccountType::Cd),
            _ => None,
        }
    }

    /// upper bound of a single deposit, zero when deposits are never allowed
    pub fn max_deposit(&self) -> f64 {
        match self {
            AccountType::Checking => CHECKING_MAX_DEPOSIT,
            AccountType::Savings => SAVINGS_MAX_DEPOSIT,
            AccountType::Cd => 0.0,
        }
    }

    /// upper bound of a single withdrawal, a CD has none since it has to be emptied
    pub fn max_withdraw(&self) -> f64 {
        match self {
            AccountType::Checking => CHECKING_MAX_WITHDRAW,
            AccountType::Savings => SAVINGS_MAX_WITHDRAW,
            AccountType::Cd => f64::INFINITY,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of an account that depends on its type
#[derive(Clone, Debug, PartialEq)]
enum AccountKind {
    Checking,
    Savings {
        /// only one withdrawal per period, cleared by the monthly step
        withdrawn_this_period: bool,
    },
    Cd {
        /// months passed since the CD was opened
        age: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    id: String,
    apr: f64,
    balance: f64,
    kind: AccountKind,
}

impl Account {
    /// Opens an empty checking account
    pub fn checking(id: impl Into<String>, apr: f64) -> Self {
        Self {
            id: id.into(),
            apr,
            balance: 0.0,
            kind: AccountKind::Checking,
        }
    }

    /// Opens an empty savings account
    pub fn savings(id: impl Into<String>, apr: f64) -> Self {
        Self {
            id: id.into(),
            apr,
            balance: 0.0,
            kind: AccountKind::Savings {
                withdrawn_this_period: false,
            },
        }
    }

    /// Opens a CD, the only account type that starts with money in it
    pub fn cd(id: impl Into<String>, apr: f64, balance: f64) -> Self {
        Self {
            id: id.into(),
            apr,
            balance,
            kind: AccountKind::Cd { age: 0 },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn apr(&self) -> f64 {
        self.apr
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn account_type(&self) -> AccountType {
        match self.kind {
            AccountKind::Checking => AccountType::Checking,
            AccountKind::Savings { .. } => AccountType::Savings,
            AccountKind::Cd { .. } => AccountType::Cd,
        }
    }

    /// Months a CD has been open, `None` for the other types
    pub fn cd_age(&self) -> Option<u32> {
        match self.kind {
            AccountKind::Cd { age } => Some(age),
            _ => None,
        }
    }

    /// Whether a savings account already used its withdrawal this period
    pub fn withdrawn_this_period(&self) -> bool {
        matches!(
            self.kind,
            AccountKind::Savings {
                withdrawn_this_period: true
            }
        )
    }

    pub fn is_deposit_valid(&self, amount: f64) -> bool {
        match self.kind {
            AccountKind::Checking | AccountKind::Savings { .. } => {
                amount > 0.0 && amount <= self.account_type().max_deposit()
            }
            AccountKind::Cd { .. } => false,
        }
    }

    pub fn is_withdraw_valid(&self, amount: f64) -> bool {
        match self.kind {
            AccountKind::Checking => amount > 0.0 && amount <= CHECKING_MAX_WITHDRAW,
            AccountKind::Savings {
                withdrawn_this_period,
            } => !withdrawn_this_period && amount > 0.0 && amount <= SAVINGS_MAX_WITHDRAW,
            // a matured CD can only be emptied in one go
            AccountKind::Cd { age } => age >= CD_MATURITY_MONTHS && amount >= self.balance,
        }
    }

    /// Adds to the balance. Limits are the validators job, not this one
    pub(crate) fn deposit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Takes `amount` out of the account, or everything if there is not that much.
    /// Returns what was actually taken.
    pub(crate) fn withdraw(&mut self, amount: f64) -> f64 {
        let taken = if amount > self.balance {
            self.balance
        } else {
            // NaN and negative amounts take nothing
            amount.max(0.0)
        };
        self.balance -= taken;

        if let AccountKind::Savings {
            withdrawn_this_period,
        } = &mut self.kind
        {
            *withdrawn_this_period = true;
        }
        taken
    }

    /// One month of interest, plus whatever else the type does monthly
    pub(crate) fn apply_time_step(&mut self) {
        match &mut self.kind {
            AccountKind::Checking => {
                self.balance += monthly_interest(self.balance, self.apr);
            }
            AccountKind::Savings {
                withdrawn_this_period,
            } => {
                self.balance += monthly_interest(self.balance, self.apr);
                *withdrawn_this_period = false;
            }
            AccountKind::Cd { age } => {
                for _ in 0..CD_COMPOUNDS_PER_STEP {
                    self.balance += monthly_interest(self.balance, self.apr);
                }
                *age += 1;
            }
        }
    }
}

/// `<type> <id> <apr> <balance>`, the summary line of the rendered ledger
impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2} {:.2}",
            self.account_type(),
            self.id,
            self.apr,
            self.balance
        )
    }
}

fn monthly_interest(balance: f64, apr: f64) -> f64 {
    balance * apr / 100.0 / 12.0
}
