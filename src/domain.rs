//! Company-domain inference: either straight from a usable website, or
//! by deriving company-name guesses and confirming them against live
//! mail-exchange records.

use crate::errors::AppError;
use crate::models::LeadProfile;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;
use url::Url;

/// Link aggregators and social platforms whose hosts say nothing about
/// where the lead's business email lives.
const USELESS_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "instagram.com",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "linktr.ee",
    "stan.store",
    "beacons.ai",
    "bit.ly",
    "spotify.com",
];

static ROLE_COMPANY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:CEO|CTO|COO|CFO|Founder|Owner|Director|President|Partner)\s+(?:of|at|@|-)\s+(.+?)(?:\s*[|,.]|$)",
    )
    .unwrap()
});

static AT_COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:at|@)\s+(.+?)(?:\s*[|,.]|$)").unwrap());

static LEGAL_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(inc|llc|ltd|co|corp|group|holdings)\.?$").unwrap());

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// A single mail-exchange record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub host: String,
    pub preference: u16,
}

/// Mail-exchange lookup capability, injectable for tests.
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// All MX records for a domain. An empty list or an error both mean
    /// "no usable mail server".
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, AppError>;
}

/// Live resolver backed by the system DNS configuration.
pub struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for DnsMxResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MxResolver for DnsMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, AppError> {
        let lookup = self
            .resolver
            .mx_lookup(domain)
            .await
            .map_err(|e| AppError::Dns(format!("MX lookup failed for {}: {}", domain, e)))?;

        Ok(lookup
            .iter()
            .map(|mx| MxRecord {
                host: mx.exchange().to_string().trim_end_matches('.').to_string(),
                preference: mx.preference(),
            })
            .collect())
    }
}

/// Host of a website URL, stripped of `www.` and lowercased. Adds a
/// scheme when missing so bare domains parse.
pub fn extract_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?;
    let domain = host.strip_prefix("www.").unwrap_or(host).to_lowercase();
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return None;
    }
    Some(domain)
}

/// Whether the lead's claimed website points at a real business site
/// rather than a link aggregator or social profile.
pub fn website_is_useful(website: &str) -> bool {
    let lower = website.to_lowercase();
    !lower.is_empty() && !USELESS_DOMAINS.iter().any(|d| lower.contains(d))
}

/// Ordered, deduplicated company-name guesses for a lead: the explicit
/// `company` field first, then names mined out of the headline.
pub fn company_name_candidates(lead: &LeadProfile) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    if let Some(company) = lead.company() {
        names.push(company.to_string());
    }

    if let Some(headline) = lead.headline() {
        // Tail after a separator ("Growth lead at Acme" -> "Acme")
        for marker in [" at ", " @ ", " - "] {
            if headline.contains(marker) {
                if let Some(tail) = headline.split(marker).last() {
                    names.push(tail.trim().trim_end_matches('.').to_string());
                }
            }
        }

        for re in [&*ROLE_COMPANY_RE, &*AT_COMPANY_RE] {
            if let Some(caps) = re.captures(headline) {
                names.push(caps[1].trim().to_string());
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for name in names {
        let clean = PUNCT_RE.replace_all(&name, "").trim().to_string();
        if clean.len() > 2 && seen.insert(clean.to_lowercase()) {
            unique.push(clean);
        }
    }
    unique
}

fn slugify(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Domain guesses for a company name: full slug under `.com`, `.io`,
/// `.co`, then the same with a trailing legal suffix (Inc/LLC/...)
/// stripped, then the two-word concatenation for two-word names.
pub fn domain_guesses(company_name: &str) -> Vec<String> {
    let clean = company_name.to_lowercase().trim().to_string();
    let stripped = LEGAL_SUFFIX_RE.replace(&clean, "").trim().to_string();

    fn push_slug(slug: &str, guesses: &mut Vec<String>) {
        if slug.is_empty() {
            return;
        }
        for tld in ["com", "io", "co"] {
            let guess = format!("{}.{}", slug, tld);
            if !guesses.contains(&guess) {
                guesses.push(guess);
            }
        }
    }

    let mut guesses = Vec::new();

    push_slug(&slugify(&clean), &mut guesses);
    push_slug(&slugify(&stripped), &mut guesses);

    let words: Vec<&str> = clean.split_whitespace().collect();
    if words.len() == 2 {
        let concat = format!("{}{}.com", words[0], words[1]);
        if !guesses.contains(&concat) {
            guesses.push(concat);
        }
    }

    guesses
}

/// Resolves the most likely email domain for a lead whose website was
/// unusable: derive company names, guess domains, and return the first
/// guess with a resolvable mail-exchange record.
pub async fn resolve_work_domain(
    lead: &LeadProfile,
    resolver: &dyn MxResolver,
) -> Option<String> {
    for name in company_name_candidates(lead).iter().take(3) {
        for guess in domain_guesses(name) {
            match resolver.lookup_mx(&guess).await {
                Ok(records) if !records.is_empty() => {
                    tracing::debug!("Confirmed domain {} for company name '{}'", guess, name);
                    return Some(guess);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::trace!("No MX for guess {}: {}", guess, e);
                }
            }
        }
    }
    None
}
