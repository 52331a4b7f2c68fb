use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bank wide constants that the predicates and `pass time` consult.
///
/// Every field has a default, so a policy file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankPolicy {
    /// flat fee charged each month to accounts at or below the threshold
    pub low_balance_fee: f64,
    /// balances at or below this are charged the fee
    pub low_balance_threshold: f64,
    pub min_apr: f64,
    pub max_apr: f64,
    /// bounds for the initial balance of a CD, inclusive
    pub min_cd_balance: f64,
    pub max_cd_balance: f64,
    /// longest single `pass time` jump, in months
    pub max_pass_time_months: u32,
}

impl Default for BankPolicy {
    fn default() -> Self {
        Self {
            low_balance_fee: 25.0,
            low_balance_threshold: 100.0,
            min_apr: 0.0,
            max_apr: 10.0,
            min_cd_balance: 1000.0,
            max_cd_balance: 10000.0,
            max_pass_time_months: 60,
        }
    }
}

impl BankPolicy {
    /// Read a policy from a JSON file, missing fields fall back to the defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy: BankPolicy =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        policy.check()?;
        Ok(policy)
    }

    /// Reject bounds that could never be satisfied
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.low_balance_fee < 0.0 || !self.low_balance_fee.is_finite() {
            return Err(ConfigError::Invalid(
                "low_balance_fee must be a finite, non-negative amount".into(),
            ));
        }
        if self.min_apr > self.max_apr {
            return Err(ConfigError::Invalid("min_apr is above max_apr".into()));
        }
        if self.min_cd_balance > self.max_cd_balance {
            return Err(ConfigError::Invalid(
                "min_cd_balance is above max_cd_balance".into(),
            ));
        }
        if self.max_pass_time_months == 0 {
            return Err(ConfigError::Invalid(
                "max_pass_time_months must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
