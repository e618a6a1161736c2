// region:    --- Imports
use crate::auction::model::AccountId;
use thiserror::Error;
// endregion: --- Imports

// region:    --- Auction Error
/// 경매 원장 연산 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuctionError {
    #[error("권한이 없습니다: {caller}")]
    Unauthorized { caller: AccountId },

    #[error("경매를 찾을 수 없습니다: auction_id={auction_id}")]
    AuctionNotFound { auction_id: u64 },

    #[error("상품을 찾을 수 없습니다: auction_id={auction_id}, item_id={item_id}")]
    ItemNotFound { auction_id: u64, item_id: u64 },

    #[error("경매에는 최소 한 개의 상품이 필요합니다.")]
    InvalidItems,

    #[error("경매 종료 시각을 계산할 수 없습니다: 기간 {duration_secs}초")]
    InvalidDuration { duration_secs: i64 },

    #[error("경매가 이미 종료되었습니다: auction_id={auction_id}")]
    AuctionClosed { auction_id: u64 },

    #[error("경매가 아직 종료되지 않았습니다: auction_id={auction_id}")]
    AuctionNotEnded { auction_id: u64 },

    #[error("입찰 금액이 현재 가격보다 낮습니다: bid_amount={bid_amount}, highest_bid={highest_bid}")]
    BidTooLow { bid_amount: u64, highest_bid: u64 },

    #[error("같은 경매의 입찰이 처리 중입니다: auction_id={auction_id}")]
    BidInProgress { auction_id: u64 },

    #[error("자금 이동 실패: {0}")]
    ValueTransferFailed(String),
}

impl AuctionError {
    /// 응답에 실리는 고정 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Unauthorized { .. } => "UNAUTHORIZED",
            AuctionError::AuctionNotFound { .. } | AuctionError::ItemNotFound { .. } => {
                "NOT_FOUND"
            }
            AuctionError::InvalidItems => "INVALID_ITEMS",
            AuctionError::InvalidDuration { .. } => "INVALID_DURATION",
            AuctionError::AuctionClosed { .. } => "AUCTION_CLOSED",
            AuctionError::AuctionNotEnded { .. } => "AUCTION_NOT_ENDED",
            AuctionError::BidTooLow { .. } => "LOW_BID",
            AuctionError::BidInProgress { .. } => "BID_IN_PROGRESS",
            AuctionError::ValueTransferFailed(_) => "TRANSFER_FAILED",
        }
    }
}

impl From<TransferError> for AuctionError {
    fn from(err: TransferError) -> Self {
        AuctionError::ValueTransferFailed(err.to_string())
    }
}
// endregion: --- Auction Error

// region:    --- Transfer Error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("잔액 부족: account={account}, balance={balance}, required={required}")]
    InsufficientFunds {
        account: AccountId,
        balance: u64,
        required: u64,
    },

    #[error("에스크로 잔액 부족: escrow={escrow}, required={required}")]
    InsufficientEscrow { escrow: u64, required: u64 },

    #[error("첨부 자금이 입찰 금액과 다릅니다: attached={attached}, amount={amount}")]
    AttachedFundsMismatch { attached: u64, amount: u64 },

    #[error("잔액 오버플로: account={0}")]
    Overflow(AccountId),

    #[error("{0}")]
    Rejected(String),
}
// endregion: --- Transfer Error

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} 환경 변수가 필요합니다.")]
    Missing(&'static str),

    #[error("{key} 값이 올바르지 않습니다: {value}")]
    Invalid { key: &'static str, value: String },
}
// endregion: --- Config Error
