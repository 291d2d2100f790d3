pub mod live_handlers;
