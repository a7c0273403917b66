use scraper::{Html, Selector};

/// Returns the outer HTML of every `tr.match` row, in page order.
pub fn extract_match_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr.match").unwrap();

    document
        .select(&row_selector)
        .map(|row| row.html())
        .collect()
}
