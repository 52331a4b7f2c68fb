//! The two handler chains every transaction goes through.
//!
//! Both chains hold one handler per transaction kind, in the order Create,
//! Deposit, Withdraw, Transfer, PassTime. A handler only answers for its own
//! kind and returns `None` for anything else, so the chain moves on to the
//! next one. A transaction nobody answers for is invalid.

use crate::{
    accounts::AccountType,
    bank::Bank,
    error::TransactionError,
    transaction::{Transaction, TransactionType},
};

/// Read-only check of a transaction against the current bank state
pub trait ValidationHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool>;
}

/// Applies a transaction that already passed validation
pub trait ProcessingHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>>;
}

pub struct ValidationPipeline {
    handlers: Vec<Box<dyn ValidationHandler>>,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(CreateHandler),
                Box::new(DepositHandler),
                Box::new(WithdrawHandler),
                Box::new(TransferHandler),
                Box::new(PassTimeHandler),
            ],
        }
    }

    pub fn validate(&self, bank: &Bank, transaction: &Transaction) -> bool {
        self.handlers
            .iter()
            .find_map(|handler| handler.handle(bank, transaction))
            .unwrap_or(false)
    }

    /// Parse and validate a raw line, malformed lines are simply invalid
    pub fn validate_line(&self, bank: &Bank, line: &str) -> bool {
        Transaction::parse(line).is_ok_and(|transaction| self.validate(bank, &transaction))
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProcessingPipeline {
    handlers: Vec<Box<dyn ProcessingHandler>>,
}

impl ProcessingPipeline {
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(CreateHandler),
                Box::new(DepositHandler),
                Box::new(WithdrawHandler),
                Box::new(TransferHandler),
                Box::new(PassTimeHandler),
            ],
        }
    }

    /// Never call this with a transaction that did not pass [`ValidationPipeline::validate`]
    pub fn process(&self, bank: &mut Bank, transaction: &Transaction) -> Result<(), TransactionError> {
        for handler in &self.handlers {
            if let Some(res) = handler.handle(bank, transaction) {
                return res;
            }
        }
        Err(TransactionError::RuleViolation(transaction.kind()))
    }
}

impl Default for ProcessingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

struct CreateHandler;
struct DepositHandler;
struct WithdrawHandler;
struct TransferHandler;
struct PassTimeHandler;

impl ValidationHandler for CreateHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool> {
        let Transaction::Create {
            account_type,
            id,
            apr,
            balance,
        } = transaction
        else {
            return None;
        };
        Some(bank.is_create_valid(*account_type, id, *apr, *balance))
    }
}

impl ProcessingHandler for CreateHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>> {
        let Transaction::Create {
            account_type,
            id,
            apr,
            balance,
        } = transaction
        else {
            return None;
        };
        let res = match (account_type, balance) {
            (AccountType::Checking, _) => bank.create_checking(id, *apr),
            (AccountType::Savings, _) => bank.create_savings(id, *apr),
            (AccountType::Cd, Some(balance)) => bank.create_cd(id, *apr, *balance),
            // the parser never builds this
            (AccountType::Cd, None) => Err(TransactionError::RuleViolation(TransactionType::Create)),
        };
        Some(res)
    }
}

impl ValidationHandler for DepositHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool> {
        match transaction {
            Transaction::Deposit { id, amount } => Some(bank.is_deposit_valid(id, *amount)),
            _ => None,
        }
    }
}

impl ProcessingHandler for DepositHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>> {
        match transaction {
            Transaction::Deposit { id, amount } => Some(bank.deposit(id, *amount)),
            _ => None,
        }
    }
}

impl ValidationHandler for WithdrawHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool> {
        match transaction {
            Transaction::Withdraw { id, amount } => Some(bank.is_withdraw_valid(id, *amount)),
            _ => None,
        }
    }
}

impl ProcessingHandler for WithdrawHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>> {
        match transaction {
            Transaction::Withdraw { id, amount } => Some(bank.withdraw(id, *amount).map(|_| ())),
            _ => None,
        }
    }
}

impl ValidationHandler for TransferHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool> {
        match transaction {
            Transaction::Transfer { from, to, amount } => {
                Some(bank.is_transfer_valid(from, to, *amount))
            }
            _ => None,
        }
    }
}

impl ProcessingHandler for TransferHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>> {
        match transaction {
            Transaction::Transfer { from, to, amount } => {
                Some(bank.transfer(from, to, *amount).map(|_| ()))
            }
            _ => None,
        }
    }
}

impl ValidationHandler for PassTimeHandler {
    fn handle(&self, bank: &Bank, transaction: &Transaction) -> Option<bool> {
        match transaction {
            Transaction::PassTime { months } => Some(bank.is_pass_time_valid(*months)),
            _ => None,
        }
    }
}

impl ProcessingHandler for PassTimeHandler {
    fn handle(
        &self,
        bank: &mut Bank,
        transaction: &Transaction,
    ) -> Option<Result<(), TransactionError>> {
        match transaction {
            Transaction::PassTime { months } => {
                bank.pass_time(*months);
                Some(Ok(()))
            }
            _ => None,
        }
    }
}
