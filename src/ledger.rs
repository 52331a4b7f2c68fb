use std::collections::BTreeMap;

use crate::{
    bank::Bank,
    config::BankPolicy,
    error::TransactionError,
    pipeline::{ProcessingPipeline, ValidationPipeline},
    transaction::Transaction,
};

/// Prefix of every rejected line in the rendered ledger
pub const INVALID_PREFIX: &str = "invalid";

/// Runs raw transaction lines against a bank and groups the accepted ones by
/// account.
///
/// Lines are handled strictly in order, every line sees the bank as the
/// previous ones left it.
pub struct Ledger {
    bank: Bank,
    validator: ValidationPipeline,
    processor: ProcessingPipeline,
    /// canonical lines per account id
    buckets: BTreeMap<String, Vec<String>>,
    /// the reserved bucket, original text of every line that was turned down
    rejected: Vec<String>,
    accepted: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_bank(Bank::new())
    }

    pub fn with_policy(policy: BankPolicy) -> Self {
        Self::with_bank(Bank::with_policy(policy))
    }

    pub fn with_bank(bank: Bank) -> Self {
        Self {
            bank,
            validator: ValidationPipeline::new(),
            processor: ProcessingPipeline::new(),
            buckets: BTreeMap::new(),
            rejected: Vec::new(),
            accepted: 0,
        }
    }

    /// Process a whole batch with the default policy
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Self::new();
        ledger.submit_all(lines);
        ledger
    }

    /// Submit every line in order, a bad line never stops the ones after it
    pub fn submit_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            // the outcome is already filed, nothing more to do with it here
            let _ = self.submit(line.as_ref());
        }
        tracing::info!(
            accepted = self.accepted,
            rejected = self.rejected.len(),
            accounts = self.bank.len(),
            "ledger batch processed"
        );
    }

    /// Validate, apply and file a single line.
    ///
    /// Returns the parsed transaction when it was accepted, otherwise why it
    /// ended up in the rejected bucket.
    pub fn submit(&mut self, line: &str) -> Result<Transaction, TransactionError> {
        match self.apply(line) {
            Ok(transaction) => {
                self.accepted += 1;
                self.file(&transaction);
                Ok(transaction)
            }
            Err(e) => {
                tracing::debug!(line, malformed = e.is_malformed(), reason = %e, "rejected transaction");
                self.rejected.push(line.to_string());
                Err(e)
            }
        }
    }

    fn apply(&mut self, line: &str) -> Result<Transaction, TransactionError> {
        let transaction = Transaction::parse(line)?;
        // processing only ever sees transactions that passed validation
        if !self.validator.validate(&self.bank, &transaction) {
            return Err(TransactionError::RuleViolation(transaction.kind()));
        }
        self.processor.process(&mut self.bank, &transaction)?;
        Ok(transaction)
    }

    fn file(&mut self, transaction: &Transaction) {
        match transaction {
            // a reused id starts over with an empty history
            Transaction::Create { id, .. } => {
                self.buckets.insert(id.clone(), Vec::new());
            }
            Transaction::Deposit { id, .. } | Transaction::Withdraw { id, .. } => {
                self.bucket(id).push(transaction.to_string());
            }
            Transaction::Transfer { from, to, .. } => {
                let line = transaction.to_string();
                self.bucket(from).push(line.clone());
                self.bucket(to).push(line);
            }
            // accounts closed this time around take their history with them
            Transaction::PassTime { .. } => {
                let bank = &self.bank;
                self.buckets.retain(|id, _| bank.contains_account(id));
            }
        }
    }

    fn bucket(&mut self, id: &str) -> &mut Vec<String> {
        self.buckets.entry(id.to_string()).or_default()
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Accepted lines filed under `id`, if it has a bucket
    pub fn transactions(&self, id: &str) -> Option<&[String]> {
        self.buckets.get(id).map(Vec::as_slice)
    }

    /// Original text of the rejected lines, in input order
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// The ledger as lines of text.
    ///
    /// Every open account gets its summary line followed by its transactions,
    /// in the order the accounts were opened. Accounts closed by `pass time`
    /// are left out. The rejected lines come last.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        for account in self.bank.accounts() {
            out.push(account.to_string());
            if let Some(lines) = self.buckets.get(account.id()) {
                out.extend(lines.iter().cloned());
            }
        }
        out.extend(
            self.rejected
                .iter()
                .map(|line| format!("{INVALID_PREFIX} {line}")),
        );
        out
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
