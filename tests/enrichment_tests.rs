/// Unit tests for enrichment building blocks
/// Tests text extraction, domain inference, pattern detection, and scoring
use lead_enrich_api::extract::{extract_email, extract_phone, is_valid_email};
use lead_enrich_api::models::{EmailSource, EnrichedLead, LeadProfile, SmtpVerdict};
use lead_enrich_api::pattern::{apply, detect, generate_candidates, NamingPattern};
use lead_enrich_api::scoring::{lead_score, score_candidate};
use lead_enrich_api::{domain, scrape};

mod email_extraction_tests {
    use super::*;

    #[test]
    fn test_valid_business_emails() {
        assert!(is_valid_email("jane@acme.io"));
        assert!(is_valid_email("jane.doe@acme-corp.com"));
        assert!(is_valid_email("j+leads@acme.co.uk"));
    }

    #[test]
    fn test_blacklisted_domains_rejected() {
        assert!(!is_valid_email("jane@example.com"));
        assert!(!is_valid_email("someone@test.com"));
        assert!(!is_valid_email("errors@sentry.io"));
        assert!(!is_valid_email("asset@wixpress.com"));
        assert!(!is_valid_email("img@gravatar.com"));
    }

    #[test]
    fn test_asset_lookalikes_rejected() {
        assert!(!is_valid_email("logo@2x.png"));
        assert!(!is_valid_email("bundle@app.js"));
        assert!(!is_valid_email("hero@banner.webp"));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Reach me at jane@acme.io or backup bob@initech.com";
        assert_eq!(extract_email(text).as_deref(), Some("jane@acme.io"));
    }

    #[test]
    fn test_blacklisted_first_match_skipped() {
        let bio = "Contact: jane@example.com or real jane@acme.io";
        assert_eq!(extract_email(bio).as_deref(), Some("jane@acme.io"));
    }

    #[test]
    fn test_blacklisted_only_bio_yields_nothing() {
        assert_eq!(extract_email("Contact: jane@example.com"), None);
    }
}

mod phone_extraction_tests {
    use super::*;

    #[test]
    fn test_tel_link_has_priority() {
        let html = r#"Call (555) 123-4567 or <a href="tel:+1 555 987 6543">call</a>"#;
        assert_eq!(extract_phone(html).as_deref(), Some("+1 555 987 6543"));
    }

    #[test]
    fn test_whatsapp_link() {
        let html = "DM or https://wa.me/15551234567 me";
        assert_eq!(extract_phone(html).as_deref(), Some("+15551234567"));
    }

    #[test]
    fn test_visible_text_formats() {
        assert_eq!(
            extract_phone("Office: +1 (555) 123-4567").as_deref(),
            Some("+1 (555) 123-4567")
        );
        assert_eq!(
            extract_phone("Office: (555) 123-4567").as_deref(),
            Some("(555) 123-4567")
        );
    }

    #[test]
    fn test_script_content_ignored() {
        let html = "<script>var x = '(555) 111-2222';</script><p>(555) 123-4567</p>";
        assert_eq!(extract_phone(html).as_deref(), Some("(555) 123-4567"));
    }

    #[test]
    fn test_digit_length_bounds() {
        // Too short after normalization
        assert_eq!(extract_phone(r#"<a href="tel:12345">x</a>"#), None);
    }
}

mod domain_inference_tests {
    use super::*;

    #[test]
    fn test_social_websites_are_useless() {
        assert!(!domain::website_is_useful("https://instagram.com/jane"));
        assert!(!domain::website_is_useful("https://linktr.ee/jane"));
        assert!(domain::website_is_useful("https://acme.io"));
    }

    #[test]
    fn test_domain_from_website_strips_www() {
        assert_eq!(
            domain::extract_domain("https://www.acme.io/about"),
            Some("acme.io".to_string())
        );
    }

    #[test]
    fn test_guess_order_for_two_word_company() {
        let guesses = domain::domain_guesses("Acme Corp");
        assert_eq!(&guesses[..3], &["acmecorp.com", "acmecorp.io", "acmecorp.co"]);
    }

    #[test]
    fn test_headline_company_extraction() {
        let lead = LeadProfile {
            headline: Some("Founder of Initech | investor".into()),
            ..Default::default()
        };
        let names = domain::company_name_candidates(&lead);
        assert!(names.iter().any(|n| n == "Initech"));
    }
}

mod pattern_tests {
    use super::*;

    #[test]
    fn test_detect_and_apply_round() {
        let pattern = detect("jane.doe").unwrap();
        assert_eq!(pattern, NamingPattern::FirstDotLast);
        assert_eq!(apply(pattern, "bob", "smith", "acme.io"), "bob.smith@acme.io");
    }

    #[test]
    fn test_template_guess_count_and_generics() {
        let guesses = generate_candidates("Jane Doe", "acme.io");
        assert_eq!(guesses.len(), 7);
        assert!(guesses.contains(&"contact@acme.io".to_string()));
        assert!(guesses.contains(&"info@acme.io".to_string()));
    }
}

mod bio_link_tests {
    use super::*;

    #[test]
    fn test_aggregator_links_found_without_scheme() {
        let links = scrape::extract_bio_links("stan.store/jane and beacons.ai/jane!");
        assert_eq!(
            links,
            vec![
                "https://stan.store/jane".to_string(),
                "https://beacons.ai/jane".to_string(),
            ]
        );
    }
}

mod scoring_tests {
    use super::*;

    fn verdict(exists: bool, accept_all: bool) -> SmtpVerdict {
        SmtpVerdict {
            exists,
            accept_all,
            score: 0,
        }
    }

    #[test]
    fn test_catch_all_scores_strictly_lower() {
        for source in [
            EmailSource::Bio,
            EmailSource::Website,
            EmailSource::ContactPage,
            EmailSource::BioLink,
            EmailSource::Hunter,
            EmailSource::SmtpGuess,
            EmailSource::Pattern,
        ] {
            let clean = score_candidate(source, 1, &verdict(true, false));
            let catch_all = score_candidate(source, 1, &verdict(true, true));
            assert!(
                catch_all < clean,
                "catch-all must cost points for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_lead_score_full_house_clamps() {
        let mut lead = EnrichedLead::passthrough(LeadProfile {
            website: Some("https://acme.io".into()),
            bio: Some("CEO, founder, business coach".into()),
            follower_count: 10_000,
            is_verified: true,
            ..Default::default()
        });
        lead.email = Some("jane@acme.io".into());
        lead.email_source = Some(EmailSource::Hunter);
        lead.phone = Some("+15551234567".into());
        // 30 + 5 + 30 + 10 + 15 + 10 + 5 = 105, clamped
        assert_eq!(lead_score(&lead), 100);
    }
}
