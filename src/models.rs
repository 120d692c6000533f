use serde::{Deserialize, Serialize};

// ============ Input Models ============

/// A prospective contact record produced by an upstream scraper.
///
/// Every field is optional because each platform scraper fills in a
/// different subset. The profile is validated once at the pipeline
/// boundary and never mutated by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadProfile {
    /// Platform handle, if the scraper captured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Source platform tag ("instagram", "tiktok", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Display name ("Jane Doe").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Free-text bio, may contain HTML fragments and links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Claimed website URL. May be a link aggregator or social page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Company name, when the source platform exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Professional headline ("CEO at Acme Corp").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    /// Platform verification badge.
    #[serde(default)]
    pub is_verified: bool,
}

impl LeadProfile {
    /// Non-empty trimmed view of an optional string field.
    fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn full_name(&self) -> Option<&str> {
        Self::field(&self.full_name)
    }

    pub fn bio(&self) -> Option<&str> {
        Self::field(&self.bio)
    }

    pub fn website(&self) -> Option<&str> {
        Self::field(&self.website)
    }

    pub fn company(&self) -> Option<&str> {
        Self::field(&self.company)
    }

    pub fn headline(&self) -> Option<&str> {
        Self::field(&self.headline)
    }
}

// ============ Candidate Models ============

/// Provenance of an email candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    /// Found directly in the profile bio text.
    Bio,
    /// Found on the lead's own website.
    Website,
    /// Found on a dedicated contact page.
    ContactPage,
    /// Found on a page linked from the bio (link aggregators etc).
    BioLink,
    /// Returned by the hosted email-finder API.
    Hunter,
    /// Templated guess confirmed by a live SMTP probe.
    SmtpGuess,
    /// Projected from the organization's naming convention.
    Pattern,
}

impl std::fmt::Display for EmailSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EmailSource::Bio => "bio",
            EmailSource::Website => "website",
            EmailSource::ContactPage => "contact_page",
            EmailSource::BioLink => "bio_link",
            EmailSource::Hunter => "hunter",
            EmailSource::SmtpGuess => "smtp_guess",
            EmailSource::Pattern => "pattern",
        };
        write!(f, "{}", label)
    }
}

/// A provisional email address plus its provenance, pending scoring.
/// Scoped to a single enrichment invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailCandidate {
    pub address: String,
    pub source: EmailSource,
}

impl EmailCandidate {
    pub fn new(address: impl Into<String>, source: EmailSource) -> Self {
        Self {
            address: address.into(),
            source,
        }
    }
}

/// A candidate after scoring and SMTP verification.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub address: String,
    pub source: EmailSource,
    /// Confidence in [0, 100].
    pub score: u8,
    /// The mail server accepted RCPT TO for this exact address.
    pub verified: bool,
    /// The mail server also accepted a random nonexistent address.
    pub accept_all: bool,
}

// ============ SMTP Probe Models ============

/// Outcome of one SMTP session against a candidate's mail server.
///
/// Distinguishes a server that answered both probes from a session
/// that never completed. An unreachable or misbehaving server is an
/// inconclusive signal, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RcptProbe {
    /// The server answered both RCPT commands.
    Answered {
        target_accepted: bool,
        random_accepted: bool,
    },
    /// Connection refused, timeout, or mid-session disconnect.
    SessionFailed(String),
}

/// Advisory verdict from the SMTP verifier. Never a certified fact:
/// catch-all servers answer 250 for any local part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SmtpVerdict {
    pub exists: bool,
    pub accept_all: bool,
    /// Standalone probe confidence in [0, 100].
    pub score: u8,
}

// ============ Output Models ============

/// The enriched record returned for every lead. Constructed once per
/// enrichment call from a copy of the input profile; never mutated
/// after being returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLead {
    #[serde(flatten)]
    pub profile: LeadProfile,
    /// Best-guess business email. Mutually exclusive with `possible_emails`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_source: Option<EmailSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Set only when the Domain Resolver inferred the domain, not when
    /// the lead's own website supplied it directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_domain: Option<String>,
    /// Unverified templated guesses, published only when no email was
    /// confidently resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<u8>,
}

impl EnrichedLead {
    /// A record carrying only the original profile fields. Used both as
    /// the pipeline starting point and as the untouched result for a
    /// lead whose pipeline failed unexpectedly.
    pub fn passthrough(profile: LeadProfile) -> Self {
        Self {
            profile,
            email: None,
            email_score: None,
            email_source: None,
            email_verified: None,
            phone: None,
            company_domain: None,
            possible_emails: None,
            lead_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_preserves_profile_and_adds_nothing() {
        let profile = LeadProfile {
            username: Some("janedoe".into()),
            full_name: Some("Jane Doe".into()),
            bio: Some("Founder".into()),
            follower_count: 1200,
            is_verified: true,
            ..Default::default()
        };
        let record = EnrichedLead::passthrough(profile.clone());
        assert_eq!(record.profile, profile);
        assert!(record.email.is_none());
        assert!(record.phone.is_none());
        assert!(record.possible_emails.is_none());
        assert!(record.lead_score.is_none());

        // Serialized form contains only the fields the input carried.
        let json = serde_json::to_value(&record).unwrap();
        let input_json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, input_json);
    }

    #[test]
    fn platform_tag_survives_passthrough() {
        let profile: LeadProfile =
            serde_json::from_str(r#"{"username":"jane","platform":"instagram","bio":"Founder"}"#)
                .unwrap();
        assert_eq!(profile.platform.as_deref(), Some("instagram"));

        let json = serde_json::to_value(EnrichedLead::passthrough(profile)).unwrap();
        assert_eq!(json["platform"], "instagram");
    }

    #[test]
    fn email_source_serializes_snake_case() {
        let json = serde_json::to_string(&EmailSource::SmtpGuess).unwrap();
        assert_eq!(json, "\"smtp_guess\"");
        let json = serde_json::to_string(&EmailSource::ContactPage).unwrap();
        assert_eq!(json, "\"contact_page\"");
    }

    #[test]
    fn lead_profile_blank_fields_read_as_none() {
        let profile = LeadProfile {
            website: Some("   ".into()),
            company: Some("Acme".into()),
            ..Default::default()
        };
        assert!(profile.website().is_none());
        assert_eq!(profile.company(), Some("Acme"));
    }
}
