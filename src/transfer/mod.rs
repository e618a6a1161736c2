//! 자금 이동 협력자
//! 1. 환불 (원장 -> 이전 최고 입찰자)
//! 2. 입찰금 수령 (입찰자 -> 원장)
// region:    --- Imports
use crate::auction::model::AccountId;
use crate::error::TransferError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Transfer Plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStep {
    Refund { to: AccountId, amount: u64 },
    Capture { from: AccountId, amount: u64 },
}

/// 한 번의 입찰에서 일어나는 자금 이동 묶음. 단계는 순서대로 실행된다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    steps: Vec<TransferStep>,
}

impl TransferPlan {
    /// 환불이 있으면 항상 수령보다 먼저 온다.
    pub fn for_bid(refund: Option<(AccountId, u64)>, bidder: AccountId, amount: u64) -> Self {
        let mut steps = Vec::with_capacity(2);
        if let Some((to, refund_amount)) = refund {
            steps.push(TransferStep::Refund {
                to,
                amount: refund_amount,
            });
        }
        steps.push(TransferStep::Capture {
            from: bidder,
            amount,
        });
        Self { steps }
    }

    pub fn steps(&self) -> &[TransferStep] {
        &self.steps
    }
}
// endregion: --- Transfer Plan

// region:    --- Value Transfer Trait
/// 자금 이동 트레이트
///
/// 구현체는 계획의 모든 단계를 적용하거나 하나도 적용하지 않아야 한다.
#[async_trait]
pub trait ValueTransfer: Send + Sync {
    async fn execute(&self, plan: &TransferPlan) -> Result<(), TransferError>;
}
// endregion: --- Value Transfer Trait

// region:    --- In-Memory Bank
#[derive(Debug, Clone, Default)]
struct Ledger {
    balances: HashMap<AccountId, u64>,
    escrow: u64,
}

impl Ledger {
    fn apply(&mut self, step: &TransferStep) -> Result<(), TransferError> {
        match step {
            TransferStep::Refund { to, amount } => {
                if self.escrow < *amount {
                    return Err(TransferError::InsufficientEscrow {
                        escrow: self.escrow,
                        required: *amount,
                    });
                }
                let balance = self.balances.entry(to.clone()).or_insert(0);
                *balance = balance
                    .checked_add(*amount)
                    .ok_or_else(|| TransferError::Overflow(to.clone()))?;
                self.escrow -= amount;
            }
            TransferStep::Capture { from, amount } => {
                let balance = self.balances.get(from).copied().unwrap_or(0);
                if balance < *amount {
                    return Err(TransferError::InsufficientFunds {
                        account: from.clone(),
                        balance,
                        required: *amount,
                    });
                }
                self.escrow = self
                    .escrow
                    .checked_add(*amount)
                    .ok_or_else(|| TransferError::Overflow(from.clone()))?;
                self.balances.insert(from.clone(), balance - amount);
            }
        }
        Ok(())
    }
}

/// 메모리 잔액 장부
///
/// 입찰금은 에스크로에 보관되고, 환불은 에스크로에서 나간다.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    ledger: Mutex<Ledger>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (AccountId, u64)>) -> Self {
        let bank = Self::new();
        for (account, amount) in balances {
            bank.deposit(&account, amount);
        }
        bank
    }

    /// 입금 (오버플로 시 최대값에서 멈춘다)
    pub fn deposit(&self, account: &AccountId, amount: u64) {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let balance = ledger.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self, account: &AccountId) -> u64 {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// 원장이 보관 중인 입찰금 총액
    pub fn escrow(&self) -> u64 {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .escrow
    }

    /// 트랜잭션 실행
    /// 복사본에 적용한 뒤 성공하면 커밋, 실패하면 버린다.
    fn transaction<R, F>(&self, f: F) -> Result<R, TransferError>
    where
        F: FnOnce(&mut Ledger) -> Result<R, TransferError>,
    {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = ledger.clone();
        let result = f(&mut staged)?;
        *ledger = staged;
        Ok(result)
    }
}

#[async_trait]
impl ValueTransfer for InMemoryBank {
    async fn execute(&self, plan: &TransferPlan) -> Result<(), TransferError> {
        let result = self.transaction(|ledger| {
            for step in plan.steps() {
                ledger.apply(step)?;
            }
            Ok(())
        });

        match &result {
            Ok(()) => info!(
                "{:<12} --> 자금 이동 완료: {} 단계",
                "Bank",
                plan.steps().len()
            ),
            Err(e) => warn!("{:<12} --> 자금 이동 롤백: {}", "Bank", e),
        }
        result
    }
}
// endregion: --- In-Memory Bank
