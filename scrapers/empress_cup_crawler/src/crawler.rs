use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    config::ScrapingConfig,
    error::Result,
    fetcher::ScheduleFetcher,
    match_blocks::extract_match_blocks,
    match_parser::parse_match_info,
    store::{upsert_all, MatchStore},
    types::MatchRecord,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    NoUpdates,
    Updated {
        matches_updated: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Fetch, extract, parse and upsert the schedule page in one pass.
pub struct ScheduleCrawler {
    schedule_url: String,
    fetcher: ScheduleFetcher,
    store: Arc<dyn MatchStore>,
    run_lock: Mutex<()>,
}

impl ScheduleCrawler {
    pub fn new(config: &ScrapingConfig, store: Arc<dyn MatchStore>) -> Result<Self> {
        Ok(Self {
            schedule_url: config.schedule_url.clone(),
            fetcher: ScheduleFetcher::new(config)?,
            store,
            run_lock: Mutex::new(()),
        })
    }

    pub fn schedule_url(&self) -> &str {
        &self.schedule_url
    }

    /// Runs one crawl. Overlapping calls wait for the one in progress.
    pub async fn run(&self) -> Result<CrawlOutcome> {
        let _guard = self.run_lock.lock().await;

        let html = self.fetcher.fetch(&self.schedule_url).await?;

        let blocks = extract_match_blocks(&html);
        info!("Found {} match rows", blocks.len());

        let matches = parse_blocks(&blocks);
        if matches.is_empty() {
            info!("No matches parsed; nothing to update");
            return Ok(CrawlOutcome::NoUpdates);
        }

        let timestamp = Utc::now();
        let matches_updated = upsert_all(self.store.as_ref(), &matches, timestamp).await?;
        info!("Upserted {} matches", matches_updated);

        Ok(CrawlOutcome::Updated {
            matches_updated,
            timestamp,
        })
    }
}

/// Parses every row and keys the results by match id; a later row with the same
/// id replaces the earlier one.
pub fn parse_blocks(blocks: &[String]) -> BTreeMap<String, MatchRecord> {
    let mut matches = BTreeMap::new();
    for block in blocks {
        if let Some(record) = parse_match_info(block) {
            if matches.contains_key(&record.id) {
                debug!("Match {} appears more than once; keeping the last row", record.id);
            }
            matches.insert(record.id.clone(), record);
        }
    }
    matches
}
