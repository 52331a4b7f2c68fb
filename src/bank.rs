use std::collections::BTreeMap;

use crate::{
    accounts::{Account, AccountType},
    config::BankPolicy,
    error::TransactionError,
};

/// Registry of accounts, and the only thing allowed to change their balances.
///
/// Accounts are looked up by id but iterated in the order they were opened,
/// which is the order the ledger is rendered in.
#[derive(Debug, Clone, Default)]
pub struct Bank {
    accounts: BTreeMap<String, Account>,
    /// ids in registration order
    order: Vec<String>,
    policy: BankPolicy,
}

impl Bank {
    /// create a new bank with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: BankPolicy) -> Self {
        Self {
            accounts: BTreeMap::new(),
            order: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &BankPolicy {
        &self.policy
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn contains_account(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    /// Accounts in the order they were opened
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.order.iter().filter_map(|id| self.accounts.get(id))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn create_checking(&mut self, id: &str, apr: f64) -> Result<(), TransactionError> {
        self.register(Account::checking(id, apr))
    }

    pub fn create_savings(&mut self, id: &str, apr: f64) -> Result<(), TransactionError> {
        self.register(Account::savings(id, apr))
    }

    pub fn create_cd(&mut self, id: &str, apr: f64, balance: f64) -> Result<(), TransactionError> {
        self.register(Account::cd(id, apr, balance))
    }

    fn register(&mut self, account: Account) -> Result<(), TransactionError> {
        if self.contains_account(account.id()) {
            return Err(TransactionError::DuplicateAccount(account.id().to_string()));
        }
        tracing::debug!(id = account.id(), kind = %account.account_type(), "opening account");
        self.order.push(account.id().to_string());
        self.accounts.insert(account.id().to_string(), account);
        Ok(())
    }

    fn account_mut(&mut self, id: &str) -> Result<&mut Account, TransactionError> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| TransactionError::UnknownAccount(id.to_string()))
    }

    pub fn deposit(&mut self, id: &str, amount: f64) -> Result<(), TransactionError> {
        self.account_mut(id)?.deposit(amount);
        Ok(())
    }

    /// Withdraws at most the current balance, returns what was taken
    pub fn withdraw(&mut self, id: &str, amount: f64) -> Result<f64, TransactionError> {
        Ok(self.account_mut(id)?.withdraw(amount))
    }

    /// Moves `amount` between two accounts. If the payer has less than that,
    /// only its balance moves. Returns the amount actually moved.
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> Result<f64, TransactionError> {
        // both have to exist before anything is touched
        if !self.contains_account(to) {
            return Err(TransactionError::UnknownAccount(to.to_string()));
        }
        let payer = self.account_mut(from)?;
        let moved = payer.withdraw(amount.min(payer.balance()));
        self.account_mut(to)?.deposit(moved);
        Ok(moved)
    }

    /// Advances every account `months` months, one month at a time.
    ///
    /// At the start of each month an account with exactly nothing in it is
    /// closed, one at or below the threshold is charged the fee, and then
    /// interest is paid on whatever is left.
    pub fn pass_time(&mut self, months: u32) {
        for _ in 0..months {
            // accounts are removed while stepping, so walk a copy of the ids
            let ids = self.order.clone();
            for id in ids {
                let Some(account) = self.accounts.get_mut(&id) else {
                    continue;
                };
                if account.balance() == 0.0 {
                    tracing::debug!(id = %id, "closing account with zero balance");
                    self.accounts.remove(&id);
                    self.order.retain(|other| *other != id);
                    continue;
                }
                if account.balance() <= self.policy.low_balance_threshold {
                    let fee = account.withdraw(self.policy.low_balance_fee);
                    tracing::debug!(id = %id, fee, "charged low balance fee");
                }
                account.apply_time_step();
            }
        }
    }

    /// 8 ascii digits, and not already in use
    pub fn is_id_valid(&self, id: &str) -> bool {
        id.len() == 8 && id.bytes().all(|b| b.is_ascii_digit()) && !self.contains_account(id)
    }

    pub fn is_apr_valid(&self, apr: f64) -> bool {
        apr >= self.policy.min_apr && apr <= self.policy.max_apr
    }

    pub fn is_cd_balance_valid(&self, balance: f64) -> bool {
        balance >= self.policy.min_cd_balance && balance <= self.policy.max_cd_balance
    }

    /// Whether `create` of this type, id and apr (and initial balance for a CD) is allowed
    pub fn is_create_valid(
        &self,
        account_type: AccountType,
        id: &str,
        apr: f64,
        balance: Option<f64>,
    ) -> bool {
        if !self.is_id_valid(id) || !self.is_apr_valid(apr) {
            return false;
        }
        match (account_type, balance) {
            (AccountType::Cd, Some(balance)) => self.is_cd_balance_valid(balance),
            (AccountType::Checking | AccountType::Savings, None) => true,
            _ => false,
        }
    }

    pub fn is_deposit_valid(&self, id: &str, amount: f64) -> bool {
        self.account(id)
            .is_some_and(|account| account.is_deposit_valid(amount))
    }

    pub fn is_withdraw_valid(&self, id: &str, amount: f64) -> bool {
        self.account(id)
            .is_some_and(|account| account.is_withdraw_valid(amount))
    }

    pub fn is_transfer_valid(&self, from: &str, to: &str, amount: f64) -> bool {
        from != to && self.is_withdraw_valid(from, amount) && self.is_deposit_valid(to, amount)
    }

    pub fn is_pass_time_valid(&self, months: u32) -> bool {
        months >= 1 && months <= self.policy.max_pass_time_months
    }
}
