// region:    --- Imports
use auction_ledger::clock::SystemClock;
use auction_ledger::config::AppConfig;
use auction_ledger::handlers::{self, AppState};
use auction_ledger::registry::AuctionRegistry;
use auction_ledger::transfer::InMemoryBank;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };
    info!(
        "{:<12} --> 설정 로드 성공: owner={}, 경매 기간={}초",
        "Main",
        config.owner,
        config.auction_duration.num_seconds()
    );

    // 잔액 장부 생성
    let bank = Arc::new(InMemoryBank::with_balances(config.initial_balances.clone()));
    info!(
        "{:<12} --> 초기 잔액 {}개 계좌 등록",
        "Main",
        config.initial_balances.len()
    );

    // 경매 레지스트리 생성
    let registry = Arc::new(
        AuctionRegistry::new(config.owner.clone(), Arc::new(SystemClock), bank.clone())
            .with_duration(config.auction_duration),
    );

    let routes_all = handlers::router(AppState::new(registry, bank));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
