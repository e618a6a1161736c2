//! 원장 상태를 바꾸는 커맨드 처리
//! 1. 경매 생성 (소유자 전용)
//! 2. 입찰
// region:    --- Imports
use super::{AuctionRegistry, AuctionSlot};
use crate::auction::events::AuctionEvent;
use crate::auction::model::{AccountId, Auction, AuctionState, ItemSpec};
use crate::error::{AuctionError, TransferError};
use crate::transfer::TransferPlan;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

tokio::task_local! {
    /// 현재 태스크에서 자금 이동을 기다리고 있는 경매 id
    static BIDS_IN_FLIGHT: Vec<u64>;
}

fn bid_in_flight(auction_id: u64) -> bool {
    BIDS_IN_FLIGHT
        .try_with(|ids| ids.contains(&auction_id))
        .unwrap_or(false)
}

// region:    --- Commands
/// 경매 생성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub caller: AccountId,
    pub auction_name: String,
    pub items: Vec<ItemSpec>,
}

/// 입찰 명령
///
/// `attached_funds` 는 호출과 함께 보낸 자금으로 `amount` 와 같아야 한다.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: u64,
    pub item_id: u64,
    pub bidder: AccountId,
    pub amount: u64,
    pub attached_funds: u64,
}

impl PlaceBidCommand {
    /// 금액만큼 자금을 첨부한 입찰
    pub fn new(auction_id: u64, item_id: u64, bidder: AccountId, amount: u64) -> Self {
        Self {
            auction_id,
            item_id,
            bidder,
            amount,
            attached_funds: amount,
        }
    }
}
// endregion: --- Commands

// region:    --- Command Handlers
impl AuctionRegistry {
    /// 1. 경매 생성
    pub async fn create_auction(
        &self,
        caller: &AccountId,
        items: Vec<ItemSpec>,
        auction_name: impl Into<String>,
    ) -> Result<u64, AuctionError> {
        let auction_name = auction_name.into();
        info!(
            "{:<12} --> 경매 생성 요청: caller={}, name={}",
            "Command", caller, auction_name
        );

        if let Err(e) = self.ensure_owner(caller) {
            warn!("{:<12} --> 경매 생성 거절: {}", "Command", e);
            return Err(e);
        }
        if items.is_empty() {
            warn!("{:<12} --> 경매 생성 거절: 상품 없음", "Command");
            return Err(AuctionError::InvalidItems);
        }

        let now = self.clock.now();
        let item_count = items.len();

        let mut auctions = self.auctions.write().await;
        let auction_id = auctions.len() as u64;
        let auction =
            match Auction::new(auction_id, auction_name.clone(), items, now, self.duration) {
                Ok(auction) => auction,
                Err(e) => {
                    warn!("{:<12} --> 경매 생성 거절: {}", "Command", e);
                    return Err(e);
                }
            };
        let end_time = auction.end_time();
        auctions.push(Arc::new(AuctionSlot::new(auction)));

        self.events.append(AuctionEvent::AuctionCreated {
            auction_id,
            auction_name,
            item_count,
            end_time,
            timestamp: now,
        });
        info!(
            "{:<12} --> 경매 생성 완료: auction_id={}, 상품 수={}, 종료={}",
            "Command", auction_id, item_count, end_time
        );

        Ok(auction_id)
    }

    /// 2. 입찰
    pub async fn place_bid(&self, cmd: PlaceBidCommand) -> Result<(), AuctionError> {
        info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

        let result = self.try_place_bid(&cmd).await;
        if let Err(e) = &result {
            warn!(
                "{:<12} --> 입찰 거절: code={}, {}",
                "Command",
                e.code(),
                e
            );
        }
        result
    }

    async fn try_place_bid(&self, cmd: &PlaceBidCommand) -> Result<(), AuctionError> {
        // 소유자는 입찰할 수 없다
        if cmd.bidder == self.owner {
            return Err(AuctionError::Unauthorized {
                caller: cmd.bidder.clone(),
            });
        }

        let slot = self.auction_handle(cmd.auction_id).await?;
        // 자금 이동 중 같은 경매로 다시 들어온 입찰은 잠금을 기다리지 않고 거절
        if bid_in_flight(cmd.auction_id) {
            return Err(AuctionError::BidInProgress {
                auction_id: cmd.auction_id,
            });
        }
        // 검증부터 상태 갱신까지 입찰 잠금 유지
        let _bid_guard = slot.bid_lock.lock().await;

        let now = self.clock.now();
        let refund = slot.read(|auction| -> Result<Option<(AccountId, u64)>, AuctionError> {
            let item = auction
                .item(cmd.item_id)
                .ok_or(AuctionError::ItemNotFound {
                    auction_id: cmd.auction_id,
                    item_id: cmd.item_id,
                })?;

            if auction.state_at(now) == AuctionState::Closed {
                return Err(AuctionError::AuctionClosed {
                    auction_id: cmd.auction_id,
                });
            }

            // 시작가 이하 입찰도 여기서 걸린다 (highest_bid 는 시작가로 시작)
            if cmd.amount <= item.highest_bid() {
                return Err(AuctionError::BidTooLow {
                    bid_amount: cmd.amount,
                    highest_bid: item.highest_bid(),
                });
            }

            if cmd.attached_funds != cmd.amount {
                return Err(TransferError::AttachedFundsMismatch {
                    attached: cmd.attached_funds,
                    amount: cmd.amount,
                }
                .into());
            }

            Ok(item.outstanding_refund())
        })?;

        // 환불 -> 수령 순서. 자금 이동이 끝나기 전에는 상품 상태를 건드리지 않는다.
        let plan = TransferPlan::for_bid(refund.clone(), cmd.bidder.clone(), cmd.amount);
        let mut in_flight = BIDS_IN_FLIGHT.try_with(Vec::clone).unwrap_or_default();
        in_flight.push(cmd.auction_id);
        BIDS_IN_FLIGHT
            .scope(in_flight, self.transfer.execute(&plan))
            .await?;

        slot.update(|auction| {
            auction
                .item_mut(cmd.item_id)
                .map(|item| item.record_bid(cmd.bidder.clone(), cmd.amount))
                .ok_or(AuctionError::ItemNotFound {
                    auction_id: cmd.auction_id,
                    item_id: cmd.item_id,
                })
        })?;

        if let Some((previous, refunded)) = refund {
            info!(
                "{:<12} --> 이전 최고 입찰자 환불: bidder={}, amount={}",
                "Command", previous, refunded
            );
            self.events.append(AuctionEvent::BidRefunded {
                auction_id: cmd.auction_id,
                item_id: cmd.item_id,
                bidder: previous,
                amount: refunded,
                timestamp: now,
            });
        }
        self.events.append(AuctionEvent::BidPlaced {
            auction_id: cmd.auction_id,
            item_id: cmd.item_id,
            bidder: cmd.bidder.clone(),
            bid_amount: cmd.amount,
            timestamp: now,
        });
        info!(
            "{:<12} --> 입찰 성공: auction_id={}, item_id={}, 현재 가격 {}",
            "Command", cmd.auction_id, cmd.item_id, cmd.amount
        );

        Ok(())
    }
}
// endregion: --- Command Handlers
