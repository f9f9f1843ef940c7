use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, warn};

use super::{absolute_https, fetch_page, own_text, selector};
use crate::{
    error::AppResult,
    models::{ShowingRecord, truncate_synopsis},
};

pub const THEATER_ID: &str = "cinema_qualite";
pub const NAME: &str = "新宿シネマカリテ";
pub const OFFICIAL_URL: &str = "https://qualite.musashino-k.jp/";

pub async fn fetch_showings(http: &reqwest::Client) -> AppResult<Vec<ShowingRecord>> {
    let html = fetch_page(http, OFFICIAL_URL).await?;
    parse_listing(&html, OFFICIAL_URL)
}

/// Everything is on the top page: each movie is a link into `/movies/` whose
/// card carries the title and the "…まで" showing period.
pub fn parse_listing(html: &str, page_url: &str) -> AppResult<Vec<ShowingRecord>> {
    let doc = Html::parse_document(html);
    let link_sel = selector(r#"a[href*="/movies/"]"#)?;
    let title_sels = [
        selector("div.description div.text h4.title b")?,
        selector("div.description div.text h4.title")?,
        selector("b")?,
    ];

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut link_count = 0;

    for link in doc.select(&link_sel) {
        link_count += 1;
        let Some(href) = link.value().attr("href") else { continue };
        let Some(detail_url) = absolute_https(page_url, href) else { continue };
        if detail_url.ends_with("/movies/") {
            continue;
        }

        let Some(title) = title_sels.iter().find_map(|sel| own_text(link, sel)) else {
            warn!(detail_url = %detail_url, "movie link without a title");
            continue;
        };

        if !seen.insert(detail_url.clone()) {
            continue;
        }

        let period = link.text().map(str::trim).find(|text| text.contains("まで"));

        let mut showing = ShowingRecord::new(THEATER_ID, detail_url, title);
        showing.synopsis = period.map(truncate_synopsis).unwrap_or_default();
        out.push(showing);
    }

    debug!(links = link_count, showings = out.len(), "parsed listing");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <nav><a href="/movies/">上映作品一覧</a></nav>
          <div class="slider">
            <a href="/movies/21001/">
              <div class="description"><div class="text">
                <h4 class="title"><b>ルックバック</b></h4>
                <p>7月4日(木)まで</p>
              </div></div>
            </a>
            <a href="http://qualite.musashino-k.jp/movies/21002/">
              <div class="description"><div class="text">
                <h4 class="title">ドライブ・マイ・カー</h4>
              </div></div>
            </a>
          </div>
          <ul>
            <li><a href="https://qualite.musashino-k.jp/movies/21001/"><b>ルックバック</b></a></li>
            <li><a href="/movies/21003/"><b>夜明けのすべて</b><span>上映中</span></a></li>
            <li><a href="/movies/21004/"><img src="poster.jpg"></a></li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn listing_yields_unique_titled_movies() {
        let showings = parse_listing(LISTING, OFFICIAL_URL).unwrap();

        let got: Vec<(&str, &str)> =
            showings.iter().map(|s| (s.detail_url.as_str(), s.title.as_str())).collect();
        assert_eq!(
            got,
            vec![
                ("https://qualite.musashino-k.jp/movies/21001/", "ルックバック"),
                ("https://qualite.musashino-k.jp/movies/21002/", "ドライブ・マイ・カー"),
                ("https://qualite.musashino-k.jp/movies/21003/", "夜明けのすべて"),
            ]
        );
        assert!(showings.iter().all(|s| s.theater_id == THEATER_ID));
    }

    #[test]
    fn showing_period_becomes_synopsis() {
        let showings = parse_listing(LISTING, OFFICIAL_URL).unwrap();
        assert_eq!(showings[0].synopsis, "7月4日(木)まで");
        assert_eq!(showings[1].synopsis, "");
        assert_eq!(showings[0].original_title, None);
        assert_eq!(showings[0].release_year, None);
    }
}
