pub mod live_stats;
pub mod live_stream;
pub mod ws_messages;
