//! Candidate and lead scoring. Pure functions over the models so the
//! weights are testable in isolation.

use crate::models::{EmailSource, EnrichedLead, SmtpVerdict};

/// Bio keywords that mark a profile as a business or authority figure.
const BUSINESS_KEYWORDS: &[&str] = &[
    "coach",
    "consultant",
    "ceo",
    "founder",
    "entrepreneur",
    "agency",
    "business",
    "owner",
    "director",
    "manager",
];

fn source_base(source: EmailSource, site_email_count: usize) -> i32 {
    match source {
        EmailSource::Bio => 90,
        EmailSource::Hunter => 80,
        EmailSource::Website => 70,
        EmailSource::SmtpGuess => 70,
        EmailSource::BioLink => 65,
        EmailSource::ContactPage => 60,
        EmailSource::Pattern => {
            let corroboration = if site_email_count >= 3 {
                15
            } else if site_email_count >= 1 {
                10
            } else {
                0
            };
            40 + corroboration
        }
    }
}

/// Confidence for one candidate: provenance base, pattern corroboration
/// from how many emails the site itself exposed, then the SMTP verdict
/// adjustment. Clamped to [0, 100].
pub fn score_candidate(
    source: EmailSource,
    site_email_count: usize,
    verdict: &SmtpVerdict,
) -> u8 {
    let mut score = source_base(source, site_email_count);
    if verdict.exists {
        score += 10;
    }
    if verdict.accept_all {
        score -= 20;
    }
    score.clamp(0, 100) as u8
}

fn follower_band_bonus(followers: u64) -> i32 {
    if (5_000..=50_000).contains(&followers) {
        15
    } else if (1_000..=100_000).contains(&followers) {
        10
    } else if followers > 0 {
        5
    } else {
        0
    }
}

/// Overall lead quality, independent of any single candidate's score.
pub fn lead_score(lead: &EnrichedLead) -> u8 {
    let mut score: i32 = 0;

    if lead.email.is_some() {
        score += 30;
        if lead.email_source == Some(EmailSource::Hunter) {
            score += 5;
        }
    }
    if lead.phone.is_some() {
        score += 30;
    }
    if lead.profile.is_verified {
        score += 10;
    }
    score += follower_band_bonus(lead.profile.follower_count);
    if lead.profile.website().is_some() {
        score += 10;
    }
    if let Some(bio) = lead.profile.bio() {
        let bio_lower = bio.to_lowercase();
        if BUSINESS_KEYWORDS.iter().any(|k| bio_lower.contains(k)) {
            score += 5;
        }
    }

    score.clamp(0, 100) as u8
}
