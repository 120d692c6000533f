//! Website content probing: fetches a fixed set of likely pages on a
//! domain and runs the text extractor over each.

use crate::extract;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::time::Duration;

/// Small rotating pool of desktop user agents for polite scraping.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

static BIO_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"https?://[^\s<>"{}|\\^`\[\]]+|(?:linktr\.ee|stan\.store|beacons\.ai)/[^\s<>"{}|\\^`\[\]]+"#,
    )
    .unwrap()
});

/// Page-fetching capability, injectable so tests can run the full
/// pipeline without touching the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and return its body on HTTP 200. Any error or
    /// non-200 status degrades to `None`; fetch failures never fail
    /// enrichment.
    async fn get(&self, url: &str) -> Option<String>;
}

/// Live fetcher backed by reqwest with a randomized user agent.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Option<String> {
        let url = ensure_scheme(url);
        let user_agent = *USER_AGENTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&USER_AGENTS[0]);

        let response = match self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!("Error fetching {}: {}", url, e);
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!("Non-200 status {} for {}", response.status(), url);
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("Error reading body from {}: {}", url, e);
                None
            }
        }
    }
}

fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Contact signals accumulated across a site's likely pages.
#[derive(Debug, Clone, Default)]
pub struct SiteContacts {
    /// First valid email seen, page order.
    pub email: Option<String>,
    /// First phone seen, page order.
    pub phone: Option<String>,
    /// Every distinct valid email across all pages, first-seen order.
    /// Feeds naming-pattern detection downstream.
    pub all_emails: Vec<String>,
}

/// Email/phone found on a single linked page.
#[derive(Debug, Clone, Default)]
pub struct PageContacts {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Probes the site's home page plus the usual contact/about paths, in
/// a fixed order, with a small randomized delay between requests.
/// Stops early once both an email and a phone have been found.
pub async fn deep_scrape(
    fetcher: &dyn Fetcher,
    website: &str,
    delay_bounds_ms: (u64, u64),
) -> SiteContacts {
    let base = ensure_scheme(website);
    let root = base.trim_end_matches('/');
    let pages = [
        base.clone(),
        format!("{}/contact", root),
        format!("{}/contact-us", root),
        format!("{}/about", root),
        format!("{}/about-us", root),
    ];

    let mut result = SiteContacts::default();
    let page_count = pages.len();

    for (idx, url) in pages.iter().enumerate() {
        let html = match fetcher.get(url).await {
            Some(body) => body,
            None => continue,
        };

        for email in extract::extract_all_emails(&html) {
            if !result
                .all_emails
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&email))
            {
                result.all_emails.push(email);
            }
        }

        if result.email.is_none() {
            result.email = result.all_emails.first().cloned();
        }

        if result.phone.is_none() {
            result.phone = extract::extract_phone(&html);
        }

        if result.email.is_some() && result.phone.is_some() {
            break;
        }

        if idx + 1 < page_count {
            polite_delay(delay_bounds_ms).await;
        }
    }

    result
}

/// Fetch a single bio-linked page and pull contact signals out of it.
pub async fn scrape_link_page(fetcher: &dyn Fetcher, url: &str) -> PageContacts {
    let html = match fetcher.get(url).await {
        Some(body) => body,
        None => return PageContacts::default(),
    };

    PageContacts {
        email: extract::extract_email(&html),
        phone: extract::extract_phone(&html),
    }
}

/// Embedded profile links in a bio: plain URLs plus the well-known
/// link-aggregator domains that are usually written without a scheme.
pub fn extract_bio_links(bio: &str) -> Vec<String> {
    BIO_LINK_RE
        .find_iter(bio)
        .map(|m| {
            let mut link = m.as_str().to_string();
            if !link.starts_with("http") {
                link = format!("https://{}", link);
            }
            link.trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
                .to_string()
        })
        .collect()
}

async fn polite_delay(bounds_ms: (u64, u64)) {
    let (min, max) = bounds_ms;
    let millis = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
