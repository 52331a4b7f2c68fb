//! Property tests for the ledger and the account rules.
//!
//! The strategies build transaction lines over a handful of fixed ids so that
//! generated batches actually hit existing accounts most of the time.

use bankledger::{Bank, BankPolicy, Ledger, Transaction, TransactionGenerator, ValidationPipeline};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

const IDS: [&str; 3] = ["11111111", "22222222", "33333333"];

// PROPERTY TEST STRATEGIES

fn id_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(IDS.to_vec())
}

/// Amounts in whole cents, sometimes without decimals or finer than a cent
fn amount_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..300_000).prop_map(|cents| format!("{}.{:02}", cents / 100, cents % 100)),
        (0u32..3_000_000).prop_map(|mills| format!("{}.{:03}", mills / 1000, mills % 1000)),
        (0u32..3000).prop_map(|whole| whole.to_string()),
        Just("infinity".to_string()),
    ]
}

fn keyword_case(keyword: &'static str) -> impl Strategy<Value = String> {
    prop_oneof![
        Just(keyword.to_string()),
        Just(keyword.to_uppercase()),
        Just(format!("{}{}", keyword[..1].to_uppercase(), &keyword[1..])),
    ]
}

/// A raw ledger line: mostly well formed, mixed case, sometimes garbage
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (
            keyword_case("create"),
            prop::sample::select(vec!["checking", "savings"]),
            id_strategy(),
            0u32..1200
        )
            .prop_map(|(kw, ty, id, apr)| format!("{kw} {ty} {id} {}", apr as f64 / 100.0)),
        (keyword_case("create"), id_strategy(), 0u32..=10, 500u32..12000)
            .prop_map(|(kw, id, apr, balance)| format!("{kw} cd {id} {apr} {balance}")),
        (keyword_case("deposit"), id_strategy(), amount_strategy())
            .prop_map(|(kw, id, amount)| format!("{kw} {id} {amount}")),
        (keyword_case("withdraw"), id_strategy(), amount_strategy())
            .prop_map(|(kw, id, amount)| format!("{kw} {id} {amount}")),
        (keyword_case("transfer"), id_strategy(), id_strategy(), amount_strategy())
            .prop_map(|(kw, from, to, amount)| format!("{kw} {from} {to} {amount}")),
        (keyword_case("pass"), 0u32..15).prop_map(|(kw, months)| format!("{kw} time {months}")),
        "[a-z ]{0,12}",
    ]
}

fn batch_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 1..60)
}

/// Every well formed line replaced by its canonical text
fn canonicalize(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| match Transaction::parse(line) {
            Ok(transaction) => transaction.to_string(),
            Err(_) => line.clone(),
        })
        .collect()
}

fn has_two_decimals(field: &str) -> bool {
    field
        .split_once('.')
        .is_some_and(|(_, decimals)| decimals.len() == 2)
}

// PROPERTY TESTS
proptest! {
    /// Property: the summary line of any freshly created account shows APR and
    /// balance with exactly two decimals
    #[test]
    fn summary_has_two_decimals(
        ty in prop::sample::select(vec!["checking", "savings", "cd"]),
        apr in 0.0f64..=10.0,
        balance in 1000.0f64..=10000.0,
    ) {
        let line = if ty == "cd" {
            format!("create {ty} 12345678 {apr} {balance}")
        } else {
            format!("create {ty} 12345678 {apr}")
        };
        let rendered = Ledger::from_lines([line]).render();
        prop_assert_eq!(1, rendered.len());

        let fields: Vec<&str> = rendered[0].split(' ').collect();
        prop_assert_eq!(4, fields.len());
        prop_assert_eq!(ty, fields[0]);
        prop_assert!(has_two_decimals(fields[2]), "apr field {}", fields[2]);
        prop_assert!(has_two_decimals(fields[3]), "balance field {}", fields[3]);
    }

    /// Property: feeding the canonical form of a batch gives the same ledger
    /// and accepts exactly the same lines
    #[test]
    fn canonical_input_reproduces_ledger(lines in batch_strategy()) {
        let original = Ledger::from_lines(&lines);
        let canonical = Ledger::from_lines(canonicalize(&lines));

        let accounts = |ledger: &Ledger| -> Vec<String> {
            let mut out = Vec::new();
            for account in ledger.bank().accounts() {
                out.push(account.to_string());
                out.extend(ledger.transactions(account.id()).unwrap_or_default().iter().cloned());
            }
            out
        };
        prop_assert_eq!(accounts(&original), accounts(&canonical));
        prop_assert_eq!(original.rejected().len(), canonical.rejected().len());

        // and the filed lines are already canonical
        for line in accounts(&original).iter().filter(|l| Transaction::parse(l).is_ok()) {
            let reparsed = Transaction::parse(line).unwrap().to_string();
            prop_assert_eq!(line, &reparsed);
        }
    }

    /// Property: no sequence of lines ever leaves an account negative
    #[test]
    fn balances_never_negative(lines in batch_strategy()) {
        let ledger = Ledger::from_lines(&lines);
        for account in ledger.bank().accounts() {
            prop_assert!(account.balance() >= 0.0, "{} went negative", account);
        }
    }

    /// Property: raw deposits and withdrawals of non-negative amounts, even
    /// unchecked by the validator, can not push a balance below zero
    #[test]
    fn mutation_clamps_at_zero(
        ops in prop::collection::vec((any::<bool>(), 0.0f64..5000.0), 1..100),
        ty in 0u8..3,
    ) {
        let mut bank = Bank::new();
        match ty {
            0 => bank.create_checking("12345678", 1.0).unwrap(),
            1 => bank.create_savings("12345678", 1.0).unwrap(),
            _ => bank.create_cd("12345678", 1.0, 1000.0).unwrap(),
        }
        for (is_deposit, amount) in ops {
            if is_deposit {
                bank.deposit("12345678", amount).unwrap();
            } else {
                let taken = bank.withdraw("12345678", amount).unwrap();
                prop_assert!(taken <= amount);
            }
            prop_assert!(bank.account("12345678").unwrap().balance() >= 0.0);
        }
    }

    /// Property: a CD can not be withdrawn from during its first twelve
    /// months, after that only amounts covering the balance are allowed
    #[test]
    fn cd_locked_until_mature(
        months in 0u32..12,
        amount in 0.0f64..1_000_000.0,
        apr in 0.0f64..=10.0,
    ) {
        let mut bank = Bank::new();
        bank.create_cd("12345678", apr, 1000.0).unwrap();
        for _ in 0..months {
            bank.pass_time(1);
        }
        prop_assert!(!bank.is_withdraw_valid("12345678", amount));
        prop_assert!(!bank.is_withdraw_valid("12345678", f64::INFINITY));

        for _ in months..12 {
            bank.pass_time(1);
        }
        let balance = bank.account("12345678").unwrap().balance();
        prop_assert_eq!(amount >= balance, bank.is_withdraw_valid("12345678", amount));
    }

    /// Property: one savings withdrawal per period, any pass time resets it
    #[test]
    fn savings_withdrawal_resets(first in 0.01f64..=1000.0, second in 0.01f64..=1000.0, months in 1u32..=60) {
        let mut ledger = Ledger::new();
        ledger.submit_all(["create savings 12345678 0", "deposit 12345678 2500"]);

        let first = format!("withdraw 12345678 {first:.2}");
        let second = format!("withdraw 12345678 {second:.2}");
        prop_assert!(ledger.submit(&first).is_ok());
        prop_assert!(ledger.submit(&second).is_err());

        let pass = format!("pass time {months}");
        prop_assert!(ledger.submit(&pass).is_ok());
        prop_assert!(ledger.submit(&second).is_ok());
    }

    /// Property: at the start of a month a low balance is charged the fee
    /// before interest, and an empty account is closed instead
    #[test]
    fn fee_precedes_interest(cents in 0u32..=10_000, apr in 0.0f64..=10.0) {
        let policy = BankPolicy::default();
        let balance = cents as f64 / 100.0;

        let mut bank = Bank::new();
        bank.create_checking("12345678", apr).unwrap();
        bank.deposit("12345678", balance).unwrap();
        bank.pass_time(1);

        if cents == 0 {
            prop_assert!(!bank.contains_account("12345678"));
        } else {
            let after_fee = (balance - policy.low_balance_fee).max(0.0);
            let expected = after_fee + after_fee * apr / 100.0 / 12.0;
            let actual = bank.account("12345678").unwrap().balance();
            prop_assert!((expected - actual).abs() < 1e-9, "expected {}, got {}", expected, actual);
        }
    }

    /// Property: whatever the generator produces passes validation, and a
    /// generated batch replays through a ledger without a single rejection
    #[test]
    fn generated_batches_are_valid(seed in any::<u64>(), count in 1usize..80) {
        let mut generator = TransactionGenerator::new(StdRng::seed_from_u64(seed));
        let mut bank = Bank::new();
        let lines = generator.generate_batch(&mut bank, count).unwrap();

        let validator = ValidationPipeline::new();
        prop_assert!(validator.validate_line(&Bank::new(), &lines[0]));

        let ledger = Ledger::from_lines(&lines);
        prop_assert!(ledger.rejected().is_empty(), "rejected {:?}", ledger.rejected());
        prop_assert_eq!(bank.len(), ledger.bank().len());
    }
}
