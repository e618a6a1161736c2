// region:    --- Imports
use crate::auction::model::{AccountId, Auction, AuctionState};
use crate::error::AuctionError;
use crate::registry::commands::{CreateAuctionCommand, PlaceBidCommand};
use crate::registry::AuctionRegistry;
use crate::transfer::InMemoryBank;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AuctionRegistry>,
    pub bank: Arc<InMemoryBank>,
}

impl AppState {
    pub fn new(registry: Arc<AuctionRegistry>, bank: Arc<InMemoryBank>) -> Self {
        Self { registry, bank }
    }
}

/// 라우터 설정
pub fn router(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/owner", get(handle_get_owner))
        .route(
            "/auctions",
            post(handle_create_auction).get(handle_list_auctions),
        )
        .route("/auctions/:id", get(handle_get_auction))
        .route("/auctions/:id/items", get(handle_get_auction_items))
        .route("/auctions/:id/winners", get(handle_find_highest_bidders))
        .route("/auctions/:id/events", get(handle_get_events))
        .route(
            "/auctions/:id/items/:item_id/bids",
            get(handle_get_bid_history),
        )
        .route("/bid", post(handle_bid))
        .route("/accounts/:id/balance", get(handle_get_balance))
        .layer(cors)
        .with_state(state)
}
// endregion: --- App State

// region:    --- Error Response
/// 핸들러 에러. 원장 에러와 요청 파싱 실패 모두 `{"error", "code"}` 로 응답한다.
#[derive(Debug)]
pub enum ApiError {
    Auction(AuctionError),
    InvalidRequest { status: StatusCode, message: String },
}

impl From<AuctionError> for ApiError {
    fn from(err: AuctionError) -> Self {
        ApiError::Auction(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

fn error_body(status: StatusCode, error: String, code: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "code": code,
        })),
    )
        .into_response()
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let status = match self {
            AuctionError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            AuctionError::AuctionNotFound { .. } | AuctionError::ItemNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::BAD_REQUEST,
        };
        error_body(status, self.to_string(), self.code())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auction(err) => err.into_response(),
            ApiError::InvalidRequest { status, message } => {
                warn!("{:<12} --> 잘못된 요청: {}", "Handler", message);
                error_body(status, message, "INVALID_REQUEST")
            }
        }
    }
}
// endregion: --- Error Response

// region:    --- Command Handlers

/// 경매 생성 요청 처리
pub async fn handle_create_auction(
    State(state): State<AppState>,
    payload: Result<Json<CreateAuctionCommand>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(cmd) = payload?;
    info!("{:<12} --> 경매 생성 요청: {:?}", "Handler", cmd);
    let auction_id = state
        .registry
        .create_auction(&cmd.caller, cmd.items, cmd.auction_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "auction_id": auction_id })),
    ))
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    payload: Result<Json<PlaceBidCommand>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(cmd) = payload?;
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", cmd);
    let bid_amount = cmd.amount;

    state.registry.place_bid(cmd).await?;

    // 받아들여진 입찰 금액이 곧 현재 가격
    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "current_price": bid_amount,
        "bid_amount": bid_amount
    })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct CallerQuery {
    pub caller: AccountId,
}

/// 경매 조회 응답 (현재 상태 포함)
#[derive(Debug, Serialize)]
pub struct AuctionView {
    #[serde(flatten)]
    pub auction: Auction,
    pub state: AuctionState,
}

/// 소유자 조회
pub async fn handle_get_owner(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "owner": state.registry.owner() }))
}

/// 모든 경매 조회
pub async fn handle_list_auctions(State(state): State<AppState>) -> impl IntoResponse {
    info!("{:<12} --> 모든 경매 조회", "HandlerQuery");
    Json(state.registry.list_auctions().await)
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    auction_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<AuctionView>, ApiError> {
    let Path(auction_id) = auction_id?;
    info!("{:<12} --> 경매 조회 id: {}", "HandlerQuery", auction_id);
    let auction = state.registry.get_auction(auction_id).await?;
    let auction_state = state.registry.get_auction_state(auction_id).await?;
    Ok(Json(AuctionView {
        auction,
        state: auction_state,
    }))
}

/// 경매 상품 조회
pub async fn handle_get_auction_items(
    State(state): State<AppState>,
    auction_id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(auction_id) = auction_id?;
    info!("{:<12} --> 경매 상품 조회 id: {}", "HandlerQuery", auction_id);
    Ok(Json(state.registry.get_auction_items(auction_id).await?))
}

/// 낙찰자 조회
pub async fn handle_find_highest_bidders(
    State(state): State<AppState>,
    auction_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<CallerQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(auction_id) = auction_id?;
    let Query(query) = query?;
    info!(
        "{:<12} --> 낙찰자 조회 id: {}, caller: {}",
        "HandlerQuery", auction_id, query.caller
    );
    Ok(Json(
        state
            .registry
            .find_highest_bidders(&query.caller, auction_id)
            .await?,
    ))
}

/// 경매 이벤트 조회
pub async fn handle_get_events(
    State(state): State<AppState>,
    auction_id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(auction_id) = auction_id?;
    info!("{:<12} --> 경매 이벤트 조회 id: {}", "HandlerQuery", auction_id);
    Ok(Json(state.registry.get_events(auction_id).await?))
}

/// 상품 입찰 이력 조회
pub async fn handle_get_bid_history(
    State(state): State<AppState>,
    ids: Result<Path<(u64, u64)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((auction_id, item_id)) = ids?;
    info!(
        "{:<12} --> 상품 입찰 이력 조회 auction_id: {}, item_id: {}",
        "HandlerQuery", auction_id, item_id
    );
    Ok(Json(
        state.registry.get_bid_history(auction_id, item_id).await?,
    ))
}

/// 계좌 잔액 조회
pub async fn handle_get_balance(
    State(state): State<AppState>,
    Path(account): Path<AccountId>,
) -> impl IntoResponse {
    info!("{:<12} --> 잔액 조회 account: {}", "HandlerQuery", account);
    Json(serde_json::json!({
        "account": account,
        "balance": state.bank.balance(&account),
    }))
}

// endregion: --- Query Handlers
