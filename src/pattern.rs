//! Email naming-pattern detection: given one known address at a
//! domain, infer the organization's local-part convention and project
//! it onto a new name.

use moka::future::Cache;

/// Local-part naming conventions we can recognize and project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPattern {
    /// jane.doe@
    FirstDotLast,
    /// j.doe@
    InitialDotLast,
    /// jane@
    FirstOnly,
}

/// Domain -> detected pattern, shared across the workers of one bulk
/// run so leads at the same company reuse the first detection. Owned
/// by the orchestrator and scoped to a single bulk invocation. A
/// cached `None` records that detection already ran and failed.
pub type PatternCache = Cache<String, Option<NamingPattern>>;

pub fn new_pattern_cache() -> PatternCache {
    Cache::builder().max_capacity(10_000).build()
}

/// Classifies a known local part, or `None` when it follows no
/// recognizable convention.
pub fn detect(local_part: &str) -> Option<NamingPattern> {
    let parts: Vec<&str> = local_part.split('.').collect();
    if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        if parts[0].len() == 1 {
            return Some(NamingPattern::InitialDotLast);
        }
        return Some(NamingPattern::FirstDotLast);
    }
    if parts.len() == 1
        && local_part.len() >= 2
        && local_part.chars().all(|c| c.is_ascii_lowercase())
    {
        return Some(NamingPattern::FirstOnly);
    }
    None
}

/// Projects a pattern onto a new person's name at a domain.
pub fn apply(pattern: NamingPattern, first: &str, last: &str, domain: &str) -> String {
    match pattern {
        NamingPattern::FirstDotLast => format!("{}.{}@{}", first, last, domain),
        NamingPattern::InitialDotLast => {
            let initial = first.chars().next().map(String::from).unwrap_or_default();
            format!("{}.{}@{}", initial, last, domain)
        }
        NamingPattern::FirstOnly => format!("{}@{}", first, domain),
    }
}

/// Lowercased (first, last) tokens of a full name, requiring at least
/// two tokens.
pub fn name_tokens(full_name: &str) -> Option<(String, String)> {
    let lower = full_name.to_lowercase();
    let parts: Vec<&str> = lower.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    Some((parts[0].to_string(), parts[parts.len() - 1].to_string()))
}

/// Predicts an address for `full_name` at `domain` from the naming
/// convention of emails already seen at that domain.
///
/// The per-run cache is consulted first so leads sharing a domain skip
/// redundant detection; a miss detects from the first known domain
/// email and populates the cache either way. The projection is
/// discarded when it matches an address already known at the domain:
/// it has to be a genuinely new guess.
pub async fn predict_from_site_emails(
    full_name: &str,
    domain: &str,
    site_emails: &[String],
    cache: &PatternCache,
) -> Option<String> {
    let (first, last) = name_tokens(full_name)?;

    let domain_suffix = format!("@{}", domain);
    let domain_emails: Vec<String> = site_emails
        .iter()
        .filter(|e| e.to_lowercase().ends_with(&domain_suffix))
        .map(|e| e.to_lowercase())
        .collect();

    let pattern = match cache.get(domain).await {
        Some(cached) => cached,
        None => {
            let detected = domain_emails
                .first()
                .and_then(|sample| sample.split('@').next())
                .and_then(detect);
            cache.insert(domain.to_string(), detected).await;
            detected
        }
    }?;

    let predicted = apply(pattern, &first, &last, domain);
    if domain_emails
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&predicted))
    {
        tracing::debug!(
            "Pattern projection {} already known at {}, discarding",
            predicted,
            domain
        );
        return None;
    }
    Some(predicted)
}

/// The fixed templated guesses for a name at a domain, used both for
/// SMTP-probed guessing and as the published `possible_emails` when
/// nothing else resolved. Order matters: probing takes the first five.
pub fn generate_candidates(full_name: &str, domain: &str) -> Vec<String> {
    let Some((first, last)) = name_tokens(full_name) else {
        return Vec::new();
    };
    let initial = first.chars().next().map(String::from).unwrap_or_default();

    vec![
        format!("{}.{}@{}", first, last, domain),
        format!("{}@{}", first, domain),
        format!("{}{}@{}", first, last, domain),
        format!("{}.{}@{}", initial, last, domain),
        format!("{}{}@{}", initial, last, domain),
        format!("contact@{}", domain),
        format!("info@{}", domain),
    ]
}
