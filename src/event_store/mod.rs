// region:    --- Imports
use crate::auction::events::AuctionEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

// endregion: --- Imports

// region:    --- Event Model
/// 이벤트 로그에 저장되는 이벤트 모델
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub aggregate_id: u64,
    pub event_type: String,
    pub data: AuctionEvent,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: u64,
}
// endregion: --- Event Model

// region:    --- Event Log
#[derive(Default)]
struct LogInner {
    events: Vec<Event>,
    versions: HashMap<u64, u64>,
}

/// 추가만 가능한 메모리 이벤트 로그
///
/// `id` 는 로그 전체에서, `version` 은 경매(aggregate)별로 1부터 증가한다.
#[derive(Default)]
pub struct EventLog {
    inner: Mutex<LogInner>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 이벤트 저장
    pub fn append(&self, data: AuctionEvent) -> Event {
        let mut inner = self.lock();
        let aggregate_id = data.auction_id();
        let version = {
            let version = inner.versions.entry(aggregate_id).or_insert(0);
            *version += 1;
            *version
        };

        let event = Event {
            id: inner.events.len() as u64 + 1,
            aggregate_id,
            event_type: data.event_type().to_string(),
            timestamp: data.timestamp(),
            data,
            version,
        };
        debug!(
            "{:<12} --> 이벤트 저장: type={}, aggregate_id={}, version={}",
            "EventLog", event.event_type, aggregate_id, version
        );
        inner.events.push(event.clone());
        event
    }

    /// 경매별 이벤트 조회 (버전 순)
    pub fn events_for(&self, aggregate_id: u64) -> Vec<Event> {
        self.lock()
            .events
            .iter()
            .filter(|event| event.aggregate_id == aggregate_id)
            .cloned()
            .collect()
    }

    /// 경매별 현재 버전 (이벤트가 없으면 0)
    pub fn version_of(&self, aggregate_id: u64) -> u64 {
        self.lock()
            .versions
            .get(&aggregate_id)
            .copied()
            .unwrap_or(0)
    }
}
// endregion: --- Event Log
