// region:    --- Imports
use super::AuctionRegistry;
use crate::auction::events::AuctionEvent;
use crate::auction::model::{AccountId, Auction, AuctionState, Bid, Item, Settlement};
use crate::error::AuctionError;
use crate::event_store::Event;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Query Handlers
impl AuctionRegistry {
    /// 경매 조회
    pub async fn get_auction(&self, auction_id: u64) -> Result<Auction, AuctionError> {
        debug!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
        let slot = self.auction_handle(auction_id).await?;
        Ok(slot.snapshot())
    }

    /// 경매 상품 조회 (생성 순서)
    pub async fn get_auction_items(&self, auction_id: u64) -> Result<Vec<Item>, AuctionError> {
        debug!("{:<12} --> 경매 상품 조회 id: {}", "Query", auction_id);
        let slot = self.auction_handle(auction_id).await?;
        Ok(slot.read(|auction| auction.items().to_vec()))
    }

    /// 모든 경매 조회 (최신순)
    pub async fn list_auctions(&self) -> Vec<Auction> {
        debug!("{:<12} --> 모든 경매 조회", "Query");
        let slots = self.auctions.read().await;
        slots.iter().rev().map(|slot| slot.snapshot()).collect()
    }

    /// 경매 현재 상태 (Open / Closed)
    pub async fn get_auction_state(&self, auction_id: u64) -> Result<AuctionState, AuctionError> {
        let slot = self.auction_handle(auction_id).await?;
        let now = self.clock.now();
        Ok(slot.read(|auction| auction.state_at(now)))
    }

    /// 정산: 상품별 최고 입찰자 조회
    /// 소유자만, 경매 종료 이후에만 호출할 수 있다.
    pub async fn find_highest_bidders(
        &self,
        caller: &AccountId,
        auction_id: u64,
    ) -> Result<Vec<Settlement>, AuctionError> {
        info!(
            "{:<12} --> 낙찰자 조회 요청: caller={}, auction_id={}",
            "Query", caller, auction_id
        );
        let result = self.settle(caller, auction_id).await;
        if let Err(e) = &result {
            warn!("{:<12} --> 낙찰자 조회 거절: code={}, {}", "Query", e.code(), e);
        }
        result
    }

    async fn settle(
        &self,
        caller: &AccountId,
        auction_id: u64,
    ) -> Result<Vec<Settlement>, AuctionError> {
        self.ensure_owner(caller)?;

        let slot = self.auction_handle(auction_id).await?;
        let now = self.clock.now();

        slot.read(|auction| {
            if auction.state_at(now) == AuctionState::Open {
                return Err(AuctionError::AuctionNotEnded { auction_id });
            }

            Ok(auction
                .items()
                .iter()
                .map(|item| Settlement {
                    item_id: item.item_id(),
                    highest_bidder: item.highest_bidder().cloned(),
                    highest_bid: item.highest_bid(),
                })
                .collect())
        })
    }

    /// 상품 입찰 이력 조회 (최신순)
    pub async fn get_bid_history(
        &self,
        auction_id: u64,
        item_id: u64,
    ) -> Result<Vec<Bid>, AuctionError> {
        debug!(
            "{:<12} --> 입찰 이력 조회 auction_id: {}, item_id: {}",
            "Query", auction_id, item_id
        );
        let slot = self.auction_handle(auction_id).await?;
        if slot.read(|auction| auction.item(item_id).is_none()) {
            return Err(AuctionError::ItemNotFound {
                auction_id,
                item_id,
            });
        }

        let mut bids: Vec<Bid> = self
            .events
            .events_for(auction_id)
            .into_iter()
            .filter_map(|event| match event.data {
                AuctionEvent::BidPlaced {
                    item_id: bid_item,
                    bidder,
                    bid_amount,
                    timestamp,
                    ..
                } if bid_item == item_id => Some(Bid {
                    item_id,
                    bidder,
                    bid_amount,
                    bid_time: timestamp,
                }),
                _ => None,
            })
            .collect();
        bids.reverse();
        Ok(bids)
    }

    /// 경매 이벤트 조회 (버전 순)
    pub async fn get_events(&self, auction_id: u64) -> Result<Vec<Event>, AuctionError> {
        debug!("{:<12} --> 경매 이벤트 조회 id: {}", "Query", auction_id);
        self.auction_handle(auction_id).await?;
        Ok(self.events.events_for(auction_id))
    }
}
// endregion: --- Query Handlers
