use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::types::MatchRecord;

/// Shown in the score cell until a match has been played.
pub const SCORE_PLACEHOLDER: &str = "\u{2015}";

static MATCH_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"M0\d+").unwrap());

/// Parses one match row. Returns `None` when no match identifier appears anywhere
/// in the row's text; header and spacer rows end up here.
pub fn parse_match_info(fragment: &str) -> Option<MatchRecord> {
    let document = parse_row_fragment(fragment);
    let root = document.root_element();

    let Some(match_id) = find_match_id(&root) else {
        debug!("Skipping row without match id");
        return None;
    };

    let mut record = MatchRecord::new(match_id);

    let score_selector = Selector::parse("td.score").unwrap();
    if let Some(score) = root.select(&score_selector).next().map(cell_text) {
        if !score.is_empty() && score != SCORE_PLACEHOLDER {
            record.set_score(score);
        }
    }

    let team_selector = Selector::parse("td.team").unwrap();
    let teams: Vec<String> = root.select(&team_selector).map(cell_text).collect();
    if let [home, away, ..] = teams.as_slice() {
        record.home_team = Some(home.clone());
        record.away_team = Some(away.clone());
    }

    let date_selector = Selector::parse("td.date").unwrap();
    if let Some(date) = root.select(&date_selector).next().map(cell_text) {
        if !date.is_empty() {
            record.date = Some(date);
        }
    }

    Some(record)
}

// Row markup parsed on its own loses its <tr>/<td> tags under HTML5 fragment
// rules, so it is re-parsed inside a table.
fn parse_row_fragment(fragment: &str) -> Html {
    Html::parse_fragment(&format!("<table>{}</table>", fragment))
}

// Scans every text node of the row, one per line, not just the number cell.
fn find_match_id(root: &ElementRef) -> Option<String> {
    root.text()
        .flat_map(|text| text.lines())
        .find_map(|line| MATCH_ID_RE.find(line))
        .map(|m| m.as_str().to_string())
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
