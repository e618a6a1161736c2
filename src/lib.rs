pub mod auction;
pub mod clock;
pub mod config;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod registry;
pub mod transfer;
