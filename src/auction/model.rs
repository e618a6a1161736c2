// region:    --- Imports
use crate::error::AuctionError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
// endregion: --- Imports

// region:    --- Account
/// 참여자 식별자 (소유자, 입찰자)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
// endregion: --- Account

// region:    --- Item
/// 경매 생성 시 소유자가 넘기는 상품 정의
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub item_name: String,
    pub starting_price: u64,
}

impl ItemSpec {
    pub fn new(item_name: impl Into<String>, starting_price: u64) -> Self {
        Self {
            item_name: item_name.into(),
            starting_price,
        }
    }
}

/// 상품 모델
///
/// `highest_bid` 는 `starting_price` 로 시작해서 더 높은 입찰로만 바뀐다.
/// `highest_bidder` 가 `None` 이면 아직 받아들여진 입찰이 없다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    item_id: u64,
    item_name: String,
    starting_price: u64,
    highest_bid: u64,
    highest_bidder: Option<AccountId>,
}

impl Item {
    fn new(item_id: u64, spec: ItemSpec) -> Self {
        Self {
            item_id,
            item_name: spec.item_name,
            starting_price: spec.starting_price,
            highest_bid: spec.starting_price,
            highest_bidder: None,
        }
    }

    pub fn item_id(&self) -> u64 {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn starting_price(&self) -> u64 {
        self.starting_price
    }

    pub fn highest_bid(&self) -> u64 {
        self.highest_bid
    }

    pub fn highest_bidder(&self) -> Option<&AccountId> {
        self.highest_bidder.as_ref()
    }

    /// 새 입찰이 받아들여지면 돌려줘야 할 (이전 최고 입찰자, 금액)
    pub fn outstanding_refund(&self) -> Option<(AccountId, u64)> {
        self.highest_bidder
            .clone()
            .map(|bidder| (bidder, self.highest_bid))
    }

    /// 검증과 자금 이동이 끝난 입찰을 기록한다.
    pub(crate) fn record_bid(&mut self, bidder: AccountId, amount: u64) {
        debug_assert!(amount > self.highest_bid);
        self.highest_bid = amount;
        self.highest_bidder = Some(bidder);
    }
}
// endregion: --- Item

// region:    --- Auction
/// 경매 상태. 저장하지 않고 매번 현재 시각으로 계산한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionState {
    Open,
    Closed,
}

/// 경매 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    auction_id: u64,
    auction_name: String,
    items: Vec<Item>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl Auction {
    pub(crate) fn new(
        auction_id: u64,
        auction_name: String,
        specs: Vec<ItemSpec>,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Self, AuctionError> {
        let end_time = now
            .checked_add_signed(duration)
            .ok_or(AuctionError::InvalidDuration {
                duration_secs: duration.num_seconds(),
            })?;
        let items = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Item::new(index as u64, spec))
            .collect();

        Ok(Self {
            auction_id,
            auction_name,
            items,
            start_time: now,
            end_time,
        })
    }

    pub fn auction_id(&self) -> u64 {
        self.auction_id
    }

    pub fn auction_name(&self) -> &str {
        &self.auction_name
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> AuctionState {
        if now < self.end_time {
            AuctionState::Open
        } else {
            AuctionState::Closed
        }
    }

    pub fn item(&self, item_id: u64) -> Option<&Item> {
        usize::try_from(item_id)
            .ok()
            .and_then(|index| self.items.get(index))
    }

    pub(crate) fn item_mut(&mut self, item_id: u64) -> Option<&mut Item> {
        usize::try_from(item_id)
            .ok()
            .and_then(move |index| self.items.get_mut(index))
    }
}
// endregion: --- Auction

// region:    --- Read Models
/// 정산 결과 한 줄 (상품별 낙찰자)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub item_id: u64,
    pub highest_bidder: Option<AccountId>,
    pub highest_bid: u64,
}

/// 입찰 이력 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub item_id: u64,
    pub bidder: AccountId,
    pub bid_amount: u64,
    pub bid_time: DateTime<Utc>,
}
// endregion: --- Read Models

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_auction() -> Auction {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Auction::new(
            0,
            "봄 경매".to_string(),
            vec![ItemSpec::new("Item 1", 100), ItemSpec::new("Item 2", 0)],
            now,
            Duration::days(2),
        )
        .unwrap()
    }

    #[test]
    fn items_start_at_starting_price_without_bidder() {
        let auction = sample_auction();

        assert_eq!(auction.items().len(), 2);
        for (index, item) in auction.items().iter().enumerate() {
            assert_eq!(item.item_id(), index as u64);
            assert_eq!(item.highest_bid(), item.starting_price());
            assert_eq!(item.highest_bidder(), None);
            assert_eq!(item.outstanding_refund(), None);
        }
        assert_eq!(auction.item(0).unwrap().item_name(), "Item 1");
        assert!(auction.item(2).is_none());
    }

    #[test]
    fn state_is_derived_from_end_time() {
        let auction = sample_auction();
        let end = auction.end_time();

        assert_eq!(end - auction.start_time(), Duration::days(2));
        assert_eq!(auction.state_at(auction.start_time()), AuctionState::Open);
        assert_eq!(
            auction.state_at(end - Duration::seconds(1)),
            AuctionState::Open
        );
        assert_eq!(auction.state_at(end), AuctionState::Closed);
        assert_eq!(
            auction.state_at(end + Duration::seconds(1)),
            AuctionState::Closed
        );
    }

    #[test]
    fn recorded_bid_becomes_outstanding_refund() {
        let mut auction = sample_auction();
        let item = auction.item_mut(0).unwrap();

        item.record_bid(AccountId::from("bidder1"), 125);

        assert_eq!(item.highest_bid(), 125);
        assert_eq!(item.starting_price(), 100);
        assert_eq!(
            item.outstanding_refund(),
            Some((AccountId::from("bidder1"), 125))
        );
    }

    #[test]
    fn end_time_out_of_range_is_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let err = Auction::new(
            0,
            "긴 경매".to_string(),
            vec![ItemSpec::new("Item 1", 100)],
            now,
            Duration::seconds(9_000_000_000_000),
        )
        .unwrap_err();

        assert_eq!(
            err,
            AuctionError::InvalidDuration {
                duration_secs: 9_000_000_000_000
            }
        );
    }

    #[test]
    fn account_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
// endregion: --- Tests
