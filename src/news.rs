//! Macro-economy news proxy
//!
//! Fetches business top-headlines from NewsAPI with a server-side key,
//! keeps only articles relevant to macro-economy topics, and classifies
//! each one into a market sector for the frontend ticker.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Hard cap on the number of articles returned to the caller.
pub const MAX_ARTICLES: usize = 30;

const ECONOMY_KEYWORDS: &[&str] = &[
    "economía",
    "economy",
    "económico",
    "banco central",
    "fed",
    "pib",
    "gdp",
    "inflación",
    "tasas de interés",
    "interest rates",
    "desempleo",
    "comercio",
    "trade",
    "fiscal",
    "monetaria",
    "monetary",
    "recession",
    "recesión",
    "growth",
    "crecimiento",
    "mercado",
    "market",
    "bolsa",
    "divisas",
    "forex",
    "petroleo",
    "oro",
];

/// A filtered, classified article as served to the frontend.
#[derive(Debug, Serialize)]
pub struct NewsArticle {
    pub datetime: i64,
    pub title: String,
    pub sector: &'static str,
    pub source: String,
    pub url: String,
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
struct TopHeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    name: Option<String>,
}

/// Fetch, filter and classify business headlines.
pub async fn fetch_business_news(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<NewsArticle>, ProxyError> {
    let url = format!(
        "{base_url}/top-headlines?category=business&language=es&pageSize=50&apiKey={api_key}"
    );

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(ProxyError::Unexpected(anyhow::anyhow!(
            "news upstream responded with status {}",
            response.status()
        )));
    }
    let payload: TopHeadlinesResponse = response.json().await?;

    let articles = payload
        .articles
        .into_iter()
        .filter(is_macro_relevant)
        .take(MAX_ARTICLES)
        .map(to_article)
        .collect();
    Ok(articles)
}

fn is_macro_relevant(article: &RawArticle) -> bool {
    let title = article.title.as_deref().unwrap_or("").to_lowercase();
    let description = article.description.as_deref().unwrap_or("").to_lowercase();
    ECONOMY_KEYWORDS
        .iter()
        .any(|keyword| title.contains(keyword) || description.contains(keyword))
}

fn to_article(raw: RawArticle) -> NewsArticle {
    let title = raw.title.unwrap_or_default();
    NewsArticle {
        datetime: raw
            .published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.timestamp())
            .unwrap_or(0),
        sector: classify_sector(&title),
        title,
        source: raw
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        url: raw.url.unwrap_or_default(),
        image: raw.url_to_image.unwrap_or_default(),
    }
}

fn classify_sector(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if title.contains("bitcoin") || title.contains("crypto") || title.contains("ethereum") {
        "crypto"
    } else if title.contains("forex") || title.contains("usd") || title.contains("eur") {
        "forex"
    } else if title.contains("s&p") || title.contains("nasdaq") || title.contains("dow") {
        "indices"
    } else if title.contains("gold") || title.contains("oil") || title.contains("commodity") {
        "commodities"
    } else {
        "indices"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn keyword_filter_keeps_macro_news_only() {
        assert!(is_macro_relevant(&article(
            "Fed holds interest rates steady",
            ""
        )));
        assert!(is_macro_relevant(&article(
            "Resumen semanal",
            "La inflación sube en la eurozona"
        )));
        assert!(!is_macro_relevant(&article(
            "Local football results",
            "Sunday league roundup"
        )));
    }

    #[test]
    fn sector_classification() {
        assert_eq!(classify_sector("Bitcoin rallies past 100k"), "crypto");
        assert_eq!(classify_sector("USD strengthens against the yen"), "forex");
        assert_eq!(classify_sector("Nasdaq closes at record high"), "indices");
        assert_eq!(classify_sector("Gold demand surges"), "commodities");
        assert_eq!(classify_sector("Central bank policy update"), "indices");
    }

    #[test]
    fn conversion_fills_defaults_for_missing_fields() {
        let converted = to_article(RawArticle::default());
        assert_eq!(converted.datetime, 0);
        assert_eq!(converted.title, "");
        assert_eq!(converted.source, "Unknown");
    }

    #[test]
    fn conversion_parses_rfc3339_timestamps() {
        let raw = RawArticle {
            title: Some("Markets rally".to_string()),
            published_at: Some("2024-05-01T12:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(to_article(raw).datetime, 1_714_564_800);
    }
}
