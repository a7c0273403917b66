pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod match_blocks;
pub mod match_parser;
pub mod store;
pub mod types;
pub mod web;

pub use crawler::{CrawlOutcome, ScheduleCrawler};
pub use error::CrawlError;
pub use types::{MatchRecord, MatchStatus};
