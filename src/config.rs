// region:    --- Imports
use crate::auction::model::AccountId;
use crate::error::ConfigError;
use crate::registry::DEFAULT_AUCTION_DURATION_SECS;
use chrono::{Duration, Utc};

// endregion: --- Imports

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// region:    --- App Config
/// 환경 변수 설정
/// - AUCTION_OWNER: 레지스트리 소유자 (필수)
/// - AUCTION_BIND_ADDR: 서버 주소
/// - AUCTION_DURATION_SECS: 경매 기간 (초)
/// - AUCTION_BALANCES: 초기 잔액 (`alice=1000,bob=500`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub owner: AccountId,
    pub bind_addr: String,
    pub auction_duration: Duration,
    pub initial_balances: Vec<(AccountId, u64)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let owner = lookup("AUCTION_OWNER")
            .filter(|owner| !owner.trim().is_empty())
            .map(|owner| AccountId::new(owner.trim()))
            .ok_or(ConfigError::Missing("AUCTION_OWNER"))?;

        let bind_addr =
            lookup("AUCTION_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let auction_duration = match lookup("AUCTION_DURATION_SECS") {
            Some(value) => parse_duration(&value).ok_or(ConfigError::Invalid {
                key: "AUCTION_DURATION_SECS",
                value,
            })?,
            None => Duration::seconds(DEFAULT_AUCTION_DURATION_SECS),
        };

        let initial_balances = match lookup("AUCTION_BALANCES") {
            Some(value) => parse_balances(&value)?,
            None => Vec::new(),
        };

        Ok(Self {
            owner,
            bind_addr,
            auction_duration,
            initial_balances,
        })
    }
}

/// 양수이고, 지금 시작한 경매의 종료 시각이 표현 가능한 기간만 받는다.
fn parse_duration(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<i64>().ok().filter(|secs| *secs > 0)?;
    let duration = Duration::try_seconds(secs)?;
    Utc::now().checked_add_signed(duration).map(|_| duration)
}

fn parse_balances(value: &str) -> Result<Vec<(AccountId, u64)>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(AccountId, u64), ConfigError> {
            let invalid = || ConfigError::Invalid {
                key: "AUCTION_BALANCES",
                value: entry.to_string(),
            };
            let (account, amount) = entry.split_once('=').ok_or_else(invalid)?;
            let account = account.trim();
            if account.is_empty() {
                return Err(invalid());
            }
            let amount = amount.trim().parse::<u64>().map_err(|_| invalid())?;
            Ok((AccountId::new(account), amount))
        })
        .collect()
}
// endregion: --- App Config
