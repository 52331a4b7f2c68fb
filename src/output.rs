use std::io::{self, Write};

use serde::Serialize;

use crate::{accounts::AccountType, bank::Bank, ledger::Ledger};

/// One row of the account snapshot
#[derive(Debug, Serialize)]
struct AccountRecord<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    account_type: AccountType,
    apr: String,
    balance: String,
}

/// Writes the rendered ledger, one line each
pub fn print_ledger(ledger: &Ledger, mut out: impl Write) -> io::Result<()> {
    for line in ledger.render() {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// Writes the open accounts as csv with a `id,type,apr,balance` header
pub fn write_accounts_csv(bank: &Bank, out: impl Write) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    for account in bank.accounts() {
        writer.serialize(AccountRecord {
            id: account.id(),
            account_type: account.account_type(),
            apr: format!("{:.2}", account.apr()),
            balance: format!("{:.2}", account.balance()),
        })?;
    }
    writer.flush()?;
    Ok(())
}
