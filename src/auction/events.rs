use crate::auction::model::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    // 경매 생성 이벤트
    AuctionCreated {
        auction_id: u64,
        auction_name: String,
        item_count: usize,
        end_time: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    // 이전 최고 입찰자 환불 이벤트
    BidRefunded {
        auction_id: u64,
        item_id: u64,
        bidder: AccountId,
        amount: u64,
        timestamp: DateTime<Utc>,
    },
    // 입찰 이벤트
    BidPlaced {
        auction_id: u64,
        item_id: u64,
        bidder: AccountId,
        bid_amount: u64,
        timestamp: DateTime<Utc>,
    },
}

impl AuctionEvent {
    pub fn auction_id(&self) -> u64 {
        match self {
            AuctionEvent::AuctionCreated { auction_id, .. }
            | AuctionEvent::BidRefunded { auction_id, .. }
            | AuctionEvent::BidPlaced { auction_id, .. } => *auction_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            AuctionEvent::AuctionCreated { .. } => "AuctionCreated",
            AuctionEvent::BidRefunded { .. } => "BidRefunded",
            AuctionEvent::BidPlaced { .. } => "BidPlaced",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuctionEvent::AuctionCreated { timestamp, .. }
            | AuctionEvent::BidRefunded { timestamp, .. }
            | AuctionEvent::BidPlaced { timestamp, .. } => *timestamp,
        }
    }
}
