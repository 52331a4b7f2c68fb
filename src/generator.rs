//! Random, but always valid, transactions for a given bank state.
//!
//! Candidates are drawn at random and checked with the [`ValidationPipeline`]
//! only. A candidate the pipeline turns down is thrown away and another one is
//! drawn, up to [`MAX_ATTEMPTS`] times.

use rand::Rng;

use crate::{
    accounts::{Account, AccountType},
    bank::Bank,
    error::GeneratorError,
    pipeline::{ProcessingPipeline, ValidationPipeline},
    transaction::{Transaction, TransactionType},
};

/// Candidates drawn for one transaction before giving up
pub const MAX_ATTEMPTS: usize = 64;

const ALL_KINDS: [TransactionType; 5] = [
    TransactionType::Create,
    TransactionType::Deposit,
    TransactionType::Withdraw,
    TransactionType::Transfer,
    TransactionType::PassTime,
];

pub struct TransactionGenerator<R> {
    rng: R,
    validator: ValidationPipeline,
    /// longest `pass time` the generator draws, keeps accounts alive for a while
    max_months: u32,
}

impl<R: Rng> TransactionGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            validator: ValidationPipeline::new(),
            max_months: 3,
        }
    }

    /// Cap the months drawn for `pass time`, the bank's own horizon still applies
    pub fn with_max_months(mut self, months: u32) -> Self {
        self.max_months = months.max(1);
        self
    }

    /// A valid transaction of the given kind against `bank`.
    ///
    /// Fails straight away if the bank can not support the kind at all, e.g. a
    /// transfer with fewer than two accounts.
    pub fn generate(
        &mut self,
        bank: &Bank,
        kind: TransactionType,
    ) -> Result<Transaction, GeneratorError> {
        self.check_preconditions(bank, kind)?;

        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.candidate(bank, kind)?;
            if self.validator.validate(bank, &candidate) {
                return Ok(candidate);
            }
            tracing::trace!(%candidate, "discarding generated candidate");
        }
        Err(GeneratorError::Exhausted {
            kind,
            attempts: MAX_ATTEMPTS,
        })
    }

    /// A valid transaction of any kind the bank can currently support
    pub fn generate_any(&mut self, bank: &Bank) -> Result<Transaction, GeneratorError> {
        let mut kinds: Vec<TransactionType> = ALL_KINDS
            .into_iter()
            .filter(|kind| self.check_preconditions(bank, *kind).is_ok())
            .collect();

        // try the feasible kinds in random order, first success wins
        let mut last_err = GeneratorError::NoEligibleAccount(TransactionType::Create);
        while !kinds.is_empty() {
            let kind = kinds.swap_remove(self.rng.random_range(0..kinds.len()));
            match self.generate(bank, kind) {
                Ok(transaction) => return Ok(transaction),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    /// `count` lines that are each valid against the bank the previous ones
    /// produced, starting from `bank`. The bank is advanced as it goes.
    pub fn generate_batch(
        &mut self,
        bank: &mut Bank,
        count: usize,
    ) -> Result<Vec<String>, GeneratorError> {
        let processor = ProcessingPipeline::new();
        let mut lines = Vec::with_capacity(count);

        for _ in 0..count {
            let transaction = self.generate_any(bank)?;
            let line = transaction.to_string();
            if let Err(source) = processor.process(bank, &transaction) {
                tracing::error!(%line, error = %source, "generated transaction did not apply");
                return Err(GeneratorError::NotApplied { line, source });
            }
            lines.push(line);
        }
        Ok(lines)
    }

    /// Whether the bank could support `kind` at all.
    ///
    /// A transfer needs two distinct accounts of which the receiver is not a
    /// CD. Savings accounts count on either side, so two checking accounts are
    /// enough but not required.
    fn check_preconditions(&self, bank: &Bank, kind: TransactionType) -> Result<(), GeneratorError> {
        match kind {
            TransactionType::Create | TransactionType::PassTime => Ok(()),
            TransactionType::Deposit => {
                if bank.accounts().any(takes_deposits) {
                    Ok(())
                } else {
                    Err(GeneratorError::NoEligibleAccount(kind))
                }
            }
            TransactionType::Withdraw => {
                if bank.is_empty() {
                    Err(GeneratorError::NoEligibleAccount(kind))
                } else {
                    Ok(())
                }
            }
            TransactionType::Transfer => {
                if bank.len() < 2 {
                    return Err(GeneratorError::NotEnoughAccounts {
                        kind,
                        needed: 2,
                        found: bank.len(),
                    });
                }
                if bank.accounts().any(takes_deposits) {
                    Ok(())
                } else {
                    Err(GeneratorError::NoEligibleAccount(kind))
                }
            }
        }
    }

    fn candidate(&mut self, bank: &Bank, kind: TransactionType) -> Result<Transaction, GeneratorError> {
        let transaction = match kind {
            TransactionType::Create => self.create_candidate(),
            TransactionType::Deposit => {
                let receivers: Vec<&Account> = bank.accounts().filter(|a| takes_deposits(a)).collect();
                let account = self.pick(&receivers, kind)?;
                Transaction::Deposit {
                    id: account.id().to_string(),
                    amount: self.amount_up_to(account.account_type().max_deposit()),
                }
            }
            TransactionType::Withdraw => {
                let accounts: Vec<&Account> = bank.accounts().collect();
                let account = self.pick(&accounts, kind)?;
                Transaction::Withdraw {
                    id: account.id().to_string(),
                    amount: self.withdraw_amount(account),
                }
            }
            TransactionType::Transfer => {
                let receivers: Vec<&Account> = bank.accounts().filter(|a| takes_deposits(a)).collect();
                let to = self.pick(&receivers, kind)?;
                let payers: Vec<&Account> = bank.accounts().filter(|a| a.id() != to.id()).collect();
                let from = self.pick(&payers, kind)?;
                let ceiling = to.account_type().max_deposit().min(from.account_type().max_withdraw());
                Transaction::Transfer {
                    from: from.id().to_string(),
                    to: to.id().to_string(),
                    amount: self.amount_up_to(ceiling),
                }
            }
            TransactionType::PassTime => {
                let horizon = self.max_months.min(bank.policy().max_pass_time_months);
                Transaction::PassTime {
                    months: self.rng.random_range(1..=horizon.max(1)),
                }
            }
        };
        Ok(transaction)
    }

    fn create_candidate(&mut self) -> Transaction {
        let account_type = match self.rng.random_range(0..3) {
            0 => AccountType::Checking,
            1 => AccountType::Savings,
            _ => AccountType::Cd,
        };
        let id = format!("{:08}", self.rng.random_range(0..100_000_000u32));
        // whole basis points so the two decimal text parses back to the same value
        let apr = self.rng.random_range(0..=1000u32) as f64 / 100.0;
        let balance = match account_type {
            AccountType::Cd => Some(self.rng.random_range(100_000..=1_000_000u32) as f64 / 100.0),
            AccountType::Checking | AccountType::Savings => None,
        };
        Transaction::Create {
            account_type,
            id,
            apr,
            balance,
        }
    }

    fn withdraw_amount(&mut self, account: &Account) -> f64 {
        match account.account_type() {
            // a CD can only be emptied, and infinity always covers the balance
            AccountType::Cd => f64::INFINITY,
            other => self.amount_up_to(other.max_withdraw()),
        }
    }

    /// Random amount in (0, ceiling], in whole cents
    fn amount_up_to(&mut self, ceiling: f64) -> f64 {
        let cents = (ceiling * 100.0).floor().max(1.0) as u64;
        self.rng.random_range(1..=cents) as f64 / 100.0
    }

    fn pick<'a>(
        &mut self,
        accounts: &[&'a Account],
        kind: TransactionType,
    ) -> Result<&'a Account, GeneratorError> {
        if accounts.is_empty() {
            return Err(GeneratorError::NoEligibleAccount(kind));
        }
        Ok(accounts[self.rng.random_range(0..accounts.len())])
    }
}

fn takes_deposits(account: &Account) -> bool {
    account.account_type() != AccountType::Cd
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn generator(seed: u64) -> TransactionGenerator<StdRng> {
        TransactionGenerator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    /// Transfers need two accounts, that is the caller's problem and reported as such
    fn transfer_needs_two_accounts() {
        let mut bank = Bank::new();
        bank.create_checking("11111111", 0.0).unwrap();

        let res = generator(1).generate(&bank, TransactionType::Transfer);
        assert_eq!(
            Err(GeneratorError::NotEnoughAccounts {
                kind: TransactionType::Transfer,
                needed: 2,
                found: 1
            }),
            res
        );
    }

    #[test]
    /// Any two accounts with a non-CD receiver will do, not only checking ones
    fn transfer_between_savings_accounts() {
        let mut bank = Bank::new();
        bank.create_savings("11111111", 1.0).unwrap();
        bank.create_savings("22222222", 1.0).unwrap();

        let transaction = generator(7)
            .generate(&bank, TransactionType::Transfer)
            .unwrap();
        assert!(ValidationPipeline::new().validate(&bank, &transaction));
        assert_eq!(TransactionType::Transfer, transaction.kind());
    }

    #[test]
    fn deposit_needs_a_receiver() {
        let mut bank = Bank::new();
        let res = generator(2).generate(&bank, TransactionType::Deposit);
        assert_eq!(
            Err(GeneratorError::NoEligibleAccount(TransactionType::Deposit)),
            res
        );

        bank.create_cd("11111111", 1.0, 1000.0).unwrap();
        let res = generator(2).generate(&bank, TransactionType::Deposit);
        assert!(res.is_err(), "CDs do not take deposits: {:?}", res);
    }

    #[test]
    /// An immature CD can never be withdrawn from, so the generator gives up
    fn immature_cd_exhausts() {
        let mut bank = Bank::new();
        bank.create_cd("11111111", 1.0, 1000.0).unwrap();
        let res = generator(3).generate(&bank, TransactionType::Withdraw);
        assert_eq!(
            Err(GeneratorError::Exhausted {
                kind: TransactionType::Withdraw,
                attempts: MAX_ATTEMPTS
            }),
            res
        );
    }

    #[test]
    fn generated_transactions_validate() {
        let validator = ValidationPipeline::new();
        let mut bank = Bank::new();
        bank.create_checking("11111111", 1.0).unwrap();
        bank.create_savings("22222222", 1.0).unwrap();
        bank.deposit("11111111", 500.0).unwrap();

        let mut generator = generator(4);
        for kind in ALL_KINDS {
            for _ in 0..20 {
                let transaction = generator.generate(&bank, kind).unwrap();
                assert_eq!(kind, transaction.kind());
                assert!(validator.validate(&bank, &transaction), "{transaction} is invalid");
            }
        }
    }

    #[test]
    fn pass_time_respects_max_months() {
        let bank = Bank::new();
        let mut generator = generator(6).with_max_months(2);
        for _ in 0..50 {
            let transaction = generator.generate(&bank, TransactionType::PassTime).unwrap();
            let Transaction::PassTime { months } = &transaction else {
                panic!("expected pass time, got {transaction}");
            };
            assert!((1..=2).contains(months), "months out of range: {months}");
        }
    }

    #[test]
    /// A batch replayed through a ledger is accepted line for line
    fn batch_replays_cleanly() {
        let mut bank = Bank::new();
        let lines = generator(5).generate_batch(&mut bank, 200).unwrap();
        assert_eq!(200, lines.len());

        let ledger = crate::ledger::Ledger::from_lines(&lines);
        assert!(
            ledger.rejected().is_empty(),
            "rejected: {:?}",
            ledger.rejected()
        );
        assert_eq!(bank.len(), ledger.bank().len());
    }
}
