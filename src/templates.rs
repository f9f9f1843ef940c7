use maud::{DOCTYPE, Markup, html};

use crate::{
    models::{RunSummary, ShowingRecord, TheaterRecord},
    sites::Site,
    tmdb,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn index_page(theaters: &[TheaterRecord], sites: &[Site]) -> String {
    page(
        "Marquee",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Marquee" }
                        p class="mt-2 text-gray-600" { "Now showing at independent cinemas." }

                        h2 class="mt-8 text-lg font-semibold text-gray-900" { "Theaters" }
                        @if theaters.is_empty() {
                            p class="mt-2 text-sm text-gray-500" { "Nothing scraped yet." }
                        } @else {
                            ul class="mt-2 space-y-1" {
                                @for theater in theaters {
                                    li class="text-sm" {
                                        a class="text-blue-600 hover:text-blue-800" href=(theater_href(&theater.theater_id)) { (theater.name) }
                                        span class="ml-2 text-gray-500" { "updated " (format_timestamp(&theater.last_updated)) }
                                    }
                                }
                            }
                        }

                        h2 class="mt-8 text-lg font-semibold text-gray-900" { "Scrape" }
                        div class="mt-2 space-y-2" {
                            @for site in sites {
                                form method="post" action=(format!("/scrape/{}", site.slug())) {
                                    button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { (site.name()) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn summary_page(summary: &RunSummary) -> String {
    page(
        "Scrape finished",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Scrape finished" }
                        dl class="mt-4 grid grid-cols-2 gap-2 text-sm text-gray-700" {
                            dt { "Showings stored" } dd { (summary.showings) }
                            dt { "Matched in TMDB" } dd { (summary.enriched) }
                            dt { "Rejected" } dd { (summary.rejected) }
                            dt { "Failed to store" } dd { (summary.failed) }
                        }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href=(theater_href(&summary.site)) { "View showings" }
                    }
                }
            }
        },
    )
}

pub fn theater_page(theater_id: &str, showings: &[ShowingRecord], poster_size: &str) -> String {
    page(
        theater_id,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { (theater_id) }
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }

                @if showings.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No showings stored for this theater." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for showing in showings {
                            (showing_card(showing, poster_size))
                        }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn showing_card(showing: &ShowingRecord, poster_size: &str) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-4" {
            @if let Some(path) = &showing.tmdb_poster_path {
                img class="w-24 rounded" src=(tmdb::poster_url(path, poster_size)) alt=(showing.title);
            }
            div {
                h2 class="text-xl font-semibold text-gray-900" {
                    a href=(showing.detail_url) target="_blank" rel="noopener noreferrer" { (showing.title) }
                    @if let Some(year) = showing.release_year {
                        span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                    }
                }
                @if let Some(original) = &showing.original_title {
                    p class="text-sm text-gray-500" { (original) }
                }
                @if !showing.synopsis.is_empty() {
                    p class="mt-2 text-sm text-gray-700" { (showing.synopsis) }
                }
                div class="mt-2 flex gap-4 text-sm" {
                    @if let Some(site) = &showing.official_website {
                        a class="text-gray-500 hover:text-gray-700" href=(site) target="_blank" rel="noopener noreferrer" { "Official site" }
                    }
                    @if let Some(tmdb_id) = showing.tmdb_id {
                        a class="text-gray-500 hover:text-gray-700" href=(format!("https://www.themoviedb.org/movie/{}", tmdb_id)) target="_blank" rel="noopener noreferrer" { "TMDB" }
                    }
                }
            }
        }
    }
}

fn theater_href(theater_id: &str) -> String {
    format!("/theaters/{}", urlencoding::encode(theater_id))
}

fn format_timestamp(ts: &jiff::Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M").to_string()
}
