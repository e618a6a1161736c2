//! 경매 레지스트리
//!
//! 소유자만 경매를 만들 수 있고, 입찰은 경매/상품으로 전달되어 시간, 소유자 제외,
//! 최고가 규칙을 통과해야 기록된다. 입찰 한 건의 검증 -> 환불 -> 수령 및 갱신은
//! 경매 단위 입찰 잠금 안에서 끝까지 실행된다.
//!
//! 조회는 입찰 잠금을 기다리지 않고 마지막으로 확정된 스냅샷을 읽는다. 자금 이동
//! 도중 같은 경매를 조회하면 갱신 전 상태가 보이고, 같은 경매에 다시 입찰하면
//! `BidInProgress` 로 바로 거절된다.
// region:    --- Imports
use crate::auction::model::{AccountId, Auction};
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::event_store::EventLog;
use crate::transfer::ValueTransfer;
use chrono::Duration;
use std::sync::{Arc, PoisonError, RwLock as SyncRwLock};
use tokio::sync::{Mutex, RwLock};

// endregion: --- Imports

// region:    --- Modules
pub mod commands;
pub mod queries;


// endregion: --- Modules

/// 경매 기간 기본값 (2일)
pub const DEFAULT_AUCTION_DURATION_SECS: i64 = 2 * 24 * 60 * 60;

// region:    --- Auction Registry
pub struct AuctionRegistry {
    owner: AccountId,
    clock: Arc<dyn Clock>,
    transfer: Arc<dyn ValueTransfer>,
    duration: Duration,
    auctions: RwLock<Vec<Arc<AuctionSlot>>>,
    events: EventLog,
}

impl AuctionRegistry {
    pub fn new(owner: AccountId, clock: Arc<dyn Clock>, transfer: Arc<dyn ValueTransfer>) -> Self {
        Self {
            owner,
            clock,
            transfer,
            duration: Duration::seconds(DEFAULT_AUCTION_DURATION_SECS),
            auctions: RwLock::new(Vec::new()),
            events: EventLog::new(),
        }
    }

    /// 이후 생성되는 경매의 기간 설정
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn auction_duration(&self) -> Duration {
        self.duration
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), AuctionError> {
        if caller != &self.owner {
            return Err(AuctionError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    async fn auction_handle(&self, auction_id: u64) -> Result<Arc<AuctionSlot>, AuctionError> {
        let auctions = self.auctions.read().await;
        usize::try_from(auction_id)
            .ok()
            .and_then(|index| auctions.get(index))
            .cloned()
            .ok_or(AuctionError::AuctionNotFound { auction_id })
    }
}
// endregion: --- Auction Registry

// region:    --- Auction Slot
/// 경매 하나의 저장 단위
///
/// `bid_lock` 은 입찰 한 건이 끝날 때까지 잡고 있고, `committed` 는 짧은 동기
/// 구간에서만 잠근다. `committed` 를 쓰는 건 `bid_lock` 을 가진 쪽뿐이다.
struct AuctionSlot {
    bid_lock: Mutex<()>,
    committed: SyncRwLock<Auction>,
}

impl AuctionSlot {
    fn new(auction: Auction) -> Self {
        Self {
            bid_lock: Mutex::new(()),
            committed: SyncRwLock::new(auction),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Auction) -> R) -> R {
        let auction = self.committed.read().unwrap_or_else(PoisonError::into_inner);
        f(&auction)
    }

    fn snapshot(&self) -> Auction {
        self.read(Auction::clone)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Auction) -> R) -> R {
        let mut auction = self
            .committed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut auction)
    }
}
// endregion: --- Auction Slot
