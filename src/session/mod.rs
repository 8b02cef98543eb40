pub mod export;
pub mod live_session;
pub mod opts;
