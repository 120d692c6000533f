//! The single-lead enrichment pipeline and the bulk orchestrator.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::config::Config;
use crate::domain::{self, DnsMxResolver, MxResolver};
use crate::extract;
use crate::hunter::HunterClient;
use crate::models::{EmailCandidate, EmailSource, EnrichedLead, LeadProfile, ScoredCandidate};
use crate::pattern::{self, PatternCache};
use crate::scoring;
use crate::scrape::{self, Fetcher, HttpFetcher, SiteContacts};
use crate::smtp::{LettreSmtpProber, SmtpProber, SmtpVerifier};

/// Runs the full enrichment pipeline for one lead or a batch. All
/// collaborators sit behind trait objects so tests can swap out every
/// network touchpoint.
pub struct LeadEnricher {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    resolver: Arc<dyn MxResolver>,
    verifier: SmtpVerifier,
    hunter: Option<HunterClient>,
}

impl LeadEnricher {
    /// Wires up the live network-backed collaborators.
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
            config.http_timeout_secs,
        ))?);
        let resolver: Arc<dyn MxResolver> = Arc::new(DnsMxResolver::new());
        let prober: Arc<dyn SmtpProber> = Arc::new(LettreSmtpProber::new(Duration::from_secs(
            config.smtp_timeout_secs,
        )));
        let hunter_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            verifier: SmtpVerifier::new(resolver.clone(), prober),
            hunter: HunterClient::from_config(&config, hunter_http),
            fetcher,
            resolver,
            config,
        })
    }

    /// Assembles an enricher from explicit collaborators. Primarily for
    /// tests that stub out the network.
    pub fn with_components(
        config: Arc<Config>,
        fetcher: Arc<dyn Fetcher>,
        resolver: Arc<dyn MxResolver>,
        prober: Arc<dyn SmtpProber>,
        hunter: Option<HunterClient>,
    ) -> Self {
        Self {
            verifier: SmtpVerifier::new(resolver.clone(), prober),
            config,
            fetcher,
            resolver,
            hunter,
        }
    }

    /// Enriches one lead. Never fails: every network hiccup degrades
    /// to a weaker signal, and the worst case is a record with no new
    /// fields beyond its lead score.
    pub async fn enrich_lead(&self, lead: &LeadProfile) -> EnrichedLead {
        self.enrich_with_cache(lead, &pattern::new_pattern_cache())
            .await
    }

    async fn enrich_with_cache(&self, lead: &LeadProfile, cache: &PatternCache) -> EnrichedLead {
        let mut record = EnrichedLead::passthrough(lead.clone());
        let mut candidates: Vec<EmailCandidate> = Vec::new();
        let delay = (
            self.config.scrape_delay_min_ms,
            self.config.scrape_delay_max_ms,
        );

        // Bio text first: the cheapest and highest-confidence source.
        let mut phone: Option<String> = None;
        if let Some(bio) = lead.bio() {
            if let Some(email) = extract::extract_email(bio) {
                candidates.push(EmailCandidate::new(email, EmailSource::Bio));
            }
            phone = extract::extract_phone(bio);
        }

        let website_usable = lead
            .website()
            .map(domain::website_is_useful)
            .unwrap_or(false);

        let mut site = SiteContacts::default();
        if website_usable {
            if let Some(website) = lead.website() {
                site = scrape::deep_scrape(self.fetcher.as_ref(), website, delay).await;
                if let Some(email) = &site.email {
                    candidates.push(EmailCandidate::new(email.clone(), EmailSource::Website));
                }
                if phone.is_none() {
                    phone = site.phone.clone();
                }
            }
        }

        // Infer a company domain when the website gave us nothing to
        // work with, and scrape the inferred site if the claimed
        // website was unusable.
        let mut company_domain: Option<String> = None;
        if !website_usable || site.all_emails.is_empty() {
            if let Some(resolved) =
                domain::resolve_work_domain(lead, self.resolver.as_ref()).await
            {
                record.company_domain = Some(resolved.clone());
                if !website_usable {
                    let url = format!("https://{}", resolved);
                    site = scrape::deep_scrape(self.fetcher.as_ref(), &url, delay).await;
                    if let Some(email) = &site.email {
                        candidates.push(EmailCandidate::new(email.clone(), EmailSource::Website));
                    }
                    if phone.is_none() {
                        phone = site.phone.clone();
                    }
                }
                company_domain = Some(resolved);
            }
        }

        let work_domain = company_domain.or_else(|| {
            if website_usable {
                lead.website().and_then(domain::extract_domain)
            } else {
                None
            }
        });

        if let (Some(name), Some(dom)) = (lead.full_name(), work_domain.as_deref()) {
            if let Some(predicted) =
                pattern::predict_from_site_emails(name, dom, &site.all_emails, cache).await
            {
                candidates.push(EmailCandidate::new(predicted, EmailSource::Pattern));
            }
        }

        // Last-resort guessing, only when nothing else produced a
        // candidate: probe the first five templated guesses and keep
        // the first one the mail server vouches for.
        if candidates.is_empty() {
            if let (Some(name), Some(dom)) = (lead.full_name(), work_domain.as_deref()) {
                for guess in pattern::generate_candidates(name, dom).iter().take(5) {
                    let verdict = self.verifier.verify(guess).await;
                    if verdict.exists && !verdict.accept_all {
                        candidates.push(EmailCandidate::new(
                            guess.clone(),
                            EmailSource::SmtpGuess,
                        ));
                        break;
                    }
                }
            }
        }

        if let Some(hunter) = &self.hunter {
            if let (Some(name), Some(website)) = (lead.full_name(), lead.website()) {
                if let (Some((first, last)), Some(dom)) =
                    (pattern::name_tokens(name), domain::extract_domain(website))
                {
                    if let Some(email) = hunter.find(&dom, &first, &last).await {
                        candidates.push(EmailCandidate::new(email, EmailSource::Hunter));
                    }
                }
            }
        }

        if let Some(bio) = lead.bio() {
            for link in scrape::extract_bio_links(bio).into_iter().take(3) {
                let contacts = scrape::scrape_link_page(self.fetcher.as_ref(), &link).await;
                if let Some(email) = contacts.email {
                    candidates.push(EmailCandidate::new(email, EmailSource::BioLink));
                }
                if phone.is_none() {
                    phone = contacts.phone;
                }
            }
        }

        if let Some(best) = self
            .select_best(dedup_candidates(candidates), site.all_emails.len())
            .await
        {
            record.email = Some(best.address);
            record.email_score = Some(best.score);
            record.email_source = Some(best.source);
            record.email_verified = Some(best.verified);
        } else if let (Some(name), Some(dom)) = (lead.full_name(), work_domain.as_deref()) {
            let guesses = pattern::generate_candidates(name, dom);
            if !guesses.is_empty() {
                record.possible_emails = Some(guesses);
            }
        }

        record.phone = phone;
        record.lead_score = Some(scoring::lead_score(&record));
        record
    }

    /// Verifies and scores every unique candidate; the highest score
    /// wins and ties keep the earliest-generated candidate.
    async fn select_best(
        &self,
        candidates: Vec<EmailCandidate>,
        site_email_count: usize,
    ) -> Option<ScoredCandidate> {
        let mut best: Option<ScoredCandidate> = None;
        for candidate in candidates {
            let verdict = self.verifier.verify(&candidate.address).await;
            let score = scoring::score_candidate(candidate.source, site_email_count, &verdict);
            tracing::debug!(
                "Candidate {} (source={}) scored {}",
                candidate.address,
                candidate.source,
                score
            );
            let scored = ScoredCandidate {
                address: candidate.address,
                source: candidate.source,
                score,
                verified: verdict.exists,
                accept_all: verdict.accept_all,
            };
            if best.as_ref().map_or(true, |b| scored.score > b.score) {
                best = Some(scored);
            }
        }
        best
    }

    /// Enriches a batch with a bounded worker pool. Always returns one
    /// record per input, in input order; a lead whose task dies comes
    /// back exactly as it was submitted.
    pub async fn enrich_bulk(
        self: &Arc<Self>,
        leads: Vec<LeadProfile>,
        concurrency: usize,
    ) -> Vec<EnrichedLead> {
        let concurrency = concurrency.max(1);
        let total = leads.len();
        tracing::info!(
            "Bulk enrichment of {} leads with concurrency {}",
            total,
            concurrency
        );

        // One naming-pattern cache per bulk run, shared by all workers
        // so leads at the same company reuse the first detection.
        let cache = pattern::new_pattern_cache();

        let mut slots: Vec<Option<EnrichedLead>> = (0..total).map(|_| None).collect();
        let mut tasks = FuturesUnordered::new();

        for (idx, lead) in leads.iter().cloned().enumerate() {
            while tasks.len() >= concurrency {
                if let Some(finished) = tasks.next().await {
                    store_result(&mut slots, finished);
                }
            }

            let enricher = Arc::clone(self);
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                let record = enricher.enrich_with_cache(&lead, &cache).await;
                (idx, record)
            }));
        }

        while let Some(finished) = tasks.next().await {
            store_result(&mut slots, finished);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| EnrichedLead::passthrough(leads[idx].clone()))
            })
            .collect()
    }
}

fn store_result(
    slots: &mut [Option<EnrichedLead>],
    finished: Result<(usize, EnrichedLead), tokio::task::JoinError>,
) {
    match finished {
        Ok((idx, record)) => slots[idx] = Some(record),
        Err(e) => {
            // The panicked task takes its index with it; its slot
            // stays empty and drains as an untouched passthrough.
            tracing::error!("Enrichment worker failed: {}", e);
        }
    }
}

/// Case-insensitive dedup by address, first seen wins.
pub fn dedup_candidates(candidates: Vec<EmailCandidate>) -> Vec<EmailCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.address.to_lowercase()) {
            unique.push(candidate);
        }
    }
    unique
}
