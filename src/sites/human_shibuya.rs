use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, warn};

use super::{absolute_https, fetch_page, own_text, polite_pause, selector};
use crate::{
    error::AppResult,
    models::{ShowingRecord, truncate_synopsis},
};

pub const THEATER_ID: &str = "human_shibuya";
pub const NAME: &str = "ヒューマントラストシネマ渋谷";
pub const OFFICIAL_URL: &str = "https://ttcg.jp/human_shibuya/";

const LISTING_URL: &str = "https://ttcg.jp/human_shibuya/movie/";
const OWN_DOMAINS: [&str; 2] = ["ttcg.jp", "theatres.co.jp"];
const CREDIT_MARKERS: [&str; 4] = ["©", "(C)", "All Rights Reserved", "製作委員会"];

pub async fn fetch_showings(http: &reqwest::Client, delay_ms: u64) -> AppResult<Vec<ShowingRecord>> {
    let listing = fetch_page(http, LISTING_URL).await?;
    let detail_urls = parse_listing(&listing, LISTING_URL)?;
    debug!(detail_pages = detail_urls.len(), "parsed listing");

    let mut out = Vec::with_capacity(detail_urls.len());
    for (i, url) in detail_urls.iter().enumerate() {
        if i > 0 {
            polite_pause(delay_ms).await;
        }

        let html = match fetch_page(http, url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(detail_url = %url, error = %err, "failed to fetch detail page");
                continue;
            },
        };

        match parse_detail(&html, url)? {
            Some(showing) => {
                debug!(title = %showing.title, year = ?showing.release_year, "parsed detail page");
                out.push(showing);
            },
            None => warn!(detail_url = %url, "detail page without a title"),
        }
    }

    Ok(out)
}

/// Detail page URLs in listing order, each once.
pub fn parse_listing(html: &str, page_url: &str) -> AppResult<Vec<String>> {
    let doc = Html::parse_document(html);
    let link_sel = selector(r#"a[href*="/human_shibuya/movie/"]"#)?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for link in doc.select(&link_sel) {
        let Some(href) = link.value().attr("href") else { continue };
        let Some(url) = absolute_https(page_url, href) else { continue };
        if url.ends_with("/movie/") || !url.ends_with(".html") {
            continue;
        }
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    Ok(out)
}

pub fn parse_detail(html: &str, detail_url: &str) -> AppResult<Option<ShowingRecord>> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let Some(title) = own_text(root, &selector("h2")?) else {
        return Ok(None);
    };

    let paragraph_sel = selector("div p")?;
    let paragraphs: Vec<&str> = doc
        .select(&paragraph_sel)
        .flat_map(|p| p.children().filter_map(|node| node.value().as_text()))
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .filter(|text| !CREDIT_MARKERS.iter().any(|marker| text.contains(marker)))
        .collect();

    let link_sel = selector(r#"a[href^="http"]"#)?;
    let official_website = doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| !OWN_DOMAINS.iter().any(|domain| href.contains(domain)))
        .map(str::to_string);

    let mut showing = ShowingRecord::new(THEATER_ID, detail_url, title);
    showing.release_year = find_year(&showing.title);
    showing.official_website = official_website;
    showing.synopsis = truncate_synopsis(&paragraphs.join(" "));
    Ok(Some(showing))
}

/// The first run of four digits in the text, full-width digits included.
fn find_year(text: &str) -> Option<i32> {
    let digits: Vec<Option<u32>> = text.chars().map(digit_value).collect();
    digits.windows(4).find_map(|w| {
        w.iter().try_fold(0i32, |acc, d| d.map(|d| acc * 10 + d as i32))
    })
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}
