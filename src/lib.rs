pub mod api;
pub mod card;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod form;
pub mod http;
pub mod inflight;
pub mod recommend;
pub mod showcase;
pub mod undo;
pub mod webhook;

pub use self::config::Config;
