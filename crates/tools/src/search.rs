//! Web search capability backing the search, page-fetch and marketplace tools.
//!
//! `WebSearcher` scrapes DuckDuckGo's HTML endpoint and falls back to Google
//! when DuckDuckGo yields nothing. No API keys are needed. Failures are
//! logged and degrade to empty results so a tool call never aborts a run.

use async_trait::async_trait;
use rangaayan_config::SearchConfig;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Search, fetch and suggestion backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `num_results` organic results. Empty when every backend failed.
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit>;

    /// Readable text of the page at `url`, truncated to `max_chars` characters.
    async fn fetch_page(&self, url: &str, max_chars: usize) -> Result<String, SearchError>;

    /// Autocomplete suggestions for `query`, at most 10.
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

const MAX_SUGGESTIONS: usize = 10;

static DDG_RESULT: LazyLock<Selector> = LazyLock::new(|| css("div.result"));
static DDG_TITLE: LazyLock<Selector> = LazyLock::new(|| css("a.result__a"));
static DDG_SNIPPET: LazyLock<Selector> = LazyLock::new(|| css("a.result__snippet"));
static GOOGLE_RESULT: LazyLock<Selector> = LazyLock::new(|| css("div.g"));
static GOOGLE_TITLE: LazyLock<Selector> = LazyLock::new(|| css("h3"));
static GOOGLE_LINK: LazyLock<Selector> = LazyLock::new(|| css("a"));
static GOOGLE_SNIPPET: LazyLock<Selector> = LazyLock::new(|| css("div.VwiC3b, span.aCOpRe"));
static BODY: LazyLock<Selector> = LazyLock::new(|| css("body"));

/// Elements whose text never counts as page content.
const BOILERPLATE: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static CSS selector")
}

/// Element text with whitespace runs collapsed.
fn clean_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse DuckDuckGo's HTML results page.
pub fn parse_duckduckgo(html: &str, num_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&DDG_RESULT)
        .filter_map(|node| {
            let title_node = node.select(&DDG_TITLE).next()?;
            let title = clean_text(title_node);
            let url = title_node.value().attr("href").unwrap_or_default().to_string();
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let snippet = node.select(&DDG_SNIPPET).next().map(clean_text).unwrap_or_default();
            Some(SearchHit { title, url, snippet })
        })
        .take(num_results)
        .collect()
}

/// Parse a Google results page. Only absolute links are kept.
pub fn parse_google(html: &str, num_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&GOOGLE_RESULT)
        .filter_map(|node| {
            let title = node.select(&GOOGLE_TITLE).next()?;
            let link = node.select(&GOOGLE_LINK).next()?;
            let url = link.value().attr("href").unwrap_or_default();
            if !url.starts_with("http") {
                return None;
            }
            Some(SearchHit {
                title: clean_text(title),
                url: url.to_string(),
                snippet: node.select(&GOOGLE_SNIPPET).next().map(clean_text).unwrap_or_default(),
            })
        })
        .take(num_results)
        .collect()
}

/// Body text of a page without boilerplate elements, one text node per line.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);
    let Some(body) = doc.select(&BODY).next() else {
        return String::new();
    };

    let text = body
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| BOILERPLATE.contains(&e.name()))
            })
        })
        .filter_map(|node| node.value().as_text().map(|t| t.trim()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    text.chars().take(max_chars).collect()
}

/// Parse the `client=firefox` suggest format: `["query", ["s1", "s2", ...]]`.
pub fn parse_suggestions(body: &serde_json::Value) -> Vec<String> {
    body.get(1)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str().map(String::from))
                .take(MAX_SUGGESTIONS)
                .collect()
        })
        .unwrap_or_default()
}

/// HTTP-backed `SearchProvider`.
pub struct WebSearcher {
    client: reqwest::Client,
    config: SearchConfig,
}

impl WebSearcher {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_html(&self, request: reqwest::RequestBuilder) -> Result<String, SearchError> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn duckduckgo(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        let request = self.client.get(&self.config.duckduckgo_url).query(&[("q", query)]);
        match self.get_html(request).await {
            Ok(html) => parse_duckduckgo(&html, num_results),
            Err(e) => {
                warn!(error = %e, "DuckDuckGo search failed");
                Vec::new()
            }
        }
    }

    async fn google(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        tokio::time::sleep(Duration::from_millis(self.config.fallback_delay_ms)).await;
        let num = num_results.to_string();
        let request = self
            .client
            .get(&self.config.google_url)
            .query(&[("q", query), ("num", num.as_str()), ("hl", "en")])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-IN,en;q=0.9");
        match self.get_html(request).await {
            Ok(html) => parse_google(&html, num_results),
            Err(e) => {
                warn!(error = %e, "Google scrape failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SearchProvider for WebSearcher {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        let hits = self.duckduckgo(query, num_results).await;
        if !hits.is_empty() {
            debug!(query, count = hits.len(), "DuckDuckGo results");
            return hits;
        }
        let hits = self.google(query, num_results).await;
        debug!(query, count = hits.len(), "Google fallback results");
        hits
    }

    async fn fetch_page(&self, url: &str, max_chars: usize) -> Result<String, SearchError> {
        let html = self.get_html(self.client.get(url)).await?;
        Ok(extract_page_text(&html, max_chars))
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .get(&self.config.suggest_url)
            .query(&[("client", "firefox"), ("q", query)])
            .send()
            .await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        Ok(parse_suggestions(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DDG_HTML: &str = r#"
        <html><body>
          <div class="result">
            <a class="result__a" href="https://www.amazon.in/saree">Handloom   Cotton Saree</a>
            <a class="result__snippet">Buy now at ₹1,299 with free delivery</a>
          </div>
          <div class="result">
            <a class="result__a" href="">No link</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://www.flipkart.com/saree">Silk Saree</a>
          </div>
        </body></html>"#;

    const GOOGLE_HTML: &str = r#"
        <html><body>
          <div class="g"><a href="/url?q=relative"><h3>Relative</h3></a></div>
          <div class="g">
            <a href="https://meesho.com/pot"><h3>Terracotta Pot</h3></a>
            <div class="VwiC3b">Pots from ₹249</div>
          </div>
        </body></html>"#;

    fn test_config(server: &MockServer) -> SearchConfig {
        SearchConfig {
            duckduckgo_url: format!("{}/ddg", server.uri()),
            google_url: format!("{}/google", server.uri()),
            suggest_url: format!("{}/suggest", server.uri()),
            fallback_delay_ms: 0,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn duckduckgo_parsing() {
        let hits = parse_duckduckgo(DDG_HTML, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Handloom Cotton Saree");
        assert_eq!(hits[0].url, "https://www.amazon.in/saree");
        assert!(hits[0].snippet.contains("₹1,299"));
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn duckduckgo_respects_limit() {
        assert_eq!(parse_duckduckgo(DDG_HTML, 1).len(), 1);
    }

    #[test]
    fn google_parsing_skips_relative_links() {
        let hits = parse_google(GOOGLE_HTML, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Terracotta Pot");
        assert_eq!(hits[0].snippet, "Pots from ₹249");
    }

    #[test]
    fn page_text_strips_boilerplate() {
        let html = r#"<html><head><title>t</title></head><body>
            <header>Site header</header>
            <nav>Menu</nav>
            <main><h1>Madhubani Painting</h1><p>Hand painted on handmade paper.</p></main>
            <script>var x = 1;</script>
            <aside>Ads</aside>
            <footer>Copyright</footer>
        </body></html>"#;
        let text = extract_page_text(html, 3000);
        assert_eq!(text, "Madhubani Painting\nHand painted on handmade paper.");
    }

    #[test]
    fn page_text_truncates_on_char_boundary() {
        let html = "<html><body><p>₹₹₹₹₹</p></body></html>";
        assert_eq!(extract_page_text(html, 3), "₹₹₹");
    }

    #[test]
    fn suggestion_parsing() {
        let body = json!(["saree", ["saree online", "saree silk", 3]]);
        assert_eq!(parse_suggestions(&body), ["saree online", "saree silk"]);
        assert!(parse_suggestions(&json!({"unexpected": true})).is_empty());

        let many: Vec<String> = (0..15).map(|i| format!("s{i}")).collect();
        assert_eq!(parse_suggestions(&json!(["q", many])).len(), 10);
    }

    #[tokio::test]
    async fn search_uses_duckduckgo_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ddg"))
            .and(query_param("q", "cotton saree"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DDG_HTML))
            .mount(&server)
            .await;
        Mock::given(path("/google"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOGLE_HTML))
            .expect(0)
            .mount(&server)
            .await;

        let searcher = WebSearcher::new(test_config(&server)).unwrap();
        let hits = searcher.search("cotton saree", 5).await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn search_falls_back_to_google() {
        let server = MockServer::start().await;
        Mock::given(path("/ddg"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(path("/google"))
            .and(query_param("hl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOGLE_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let searcher = WebSearcher::new(test_config(&server)).unwrap();
        let hits = searcher.search("terracotta pot", 5).await;
        assert_eq!(hits[0].url, "https://meesho.com/pot");
    }

    #[tokio::test]
    async fn search_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let searcher = WebSearcher::new(test_config(&server)).unwrap();
        assert!(searcher.search("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_page_errors_on_bad_status() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let searcher = WebSearcher::new(test_config(&server)).unwrap();
        let result = searcher.fetch_page(&format!("{}/missing", server.uri()), 100).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn suggestions_over_http() {
        let server = MockServer::start().await;
        Mock::given(path("/suggest"))
            .and(query_param("client", "firefox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["pickle", ["mango pickle", "lemon pickle"]])))
            .mount(&server)
            .await;

        let searcher = WebSearcher::new(test_config(&server)).unwrap();
        let suggestions = searcher.suggestions("pickle").await.unwrap();
        assert_eq!(suggestions, ["mango pickle", "lemon pickle"]);
    }
}
