//! Lead enrichment core: takes a partially-known social/professional
//! profile and produces a best-guess, confidence-scored business email
//! and phone plus an overall lead-quality score.
//!
//! Module map:
//! - [`extract`] - email/phone candidate extraction from raw text
//! - [`scrape`] - website deep-scraping over the usual contact pages
//! - [`domain`] - company-domain inference backed by MX lookups
//! - [`pattern`] - email naming-pattern detection and projection
//! - [`smtp`] - SMTP existence and catch-all probing
//! - [`scoring`] - candidate and lead-quality scoring
//! - [`enrichment`] - the per-lead pipeline and bulk orchestrator
//! - [`handlers`] - the HTTP surface

pub mod config;
pub mod domain;
pub mod enrichment;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod hunter;
pub mod models;
pub mod pattern;
pub mod scoring;
pub mod scrape;
pub mod smtp;

pub use config::Config;
pub use enrichment::LeadEnricher;
pub use models::{EnrichedLead, LeadProfile};
