//! Text signal extraction: pulls email and phone candidates out of raw
//! text (bios, HTML bodies) via pattern matching and blacklist filtering.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// Domains that produce placeholder, test, analytics, or CDN addresses
/// rather than real mailboxes.
const EMAIL_BLACKLIST: &[&str] = &[
    "example.com",
    "test.com",
    "email.com",
    "youremail.com",
    "sentry.io",
    "wixpress.com",
    "googleapis.com",
    "w3.org",
    "schema.org",
    "gravatar.com",
    "wordpress.com",
];

/// Asset filenames that the email regex mistakes for addresses
/// (e.g. `logo@2x.png` in a srcset attribute).
const FILE_EXT_BLACKLIST: &[&str] = &[
    ".png", ".jpg", ".gif", ".css", ".js", ".svg", ".webp", ".ico",
];

static TEL_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href=["']tel:([+\d\s\-().]+)"#).unwrap());

static WHATSAPP_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:wa\.me/|api\.whatsapp\.com/send\?phone=)(\d+)").unwrap());

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Visible-text phone formats, tried in order; the ordering is a
/// deliberate, testable property of extraction.
static VISIBLE_PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // North-American with +1 prefix
        r"\+1[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        // International prefix with parenthesized area code
        r"\+?\d{1,3}[-.\s]\(?\d{3}\)[-.\s]?\d{3}[-.\s]?\d{4}",
        // Bare parenthesized NANP
        r"\(\d{3}\)[-.\s]?\d{3}[-.\s]?\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Phone matcher strategies in strict precedence order: tel: links,
/// WhatsApp links, then visible-text formats. First non-empty wins.
static PHONE_MATCHERS: &[fn(&str) -> Option<String>] =
    &[match_tel_link, match_whatsapp_link, match_visible_phone];

/// Whether an extracted address looks like a real mailbox rather than
/// a placeholder or an asset filename.
pub fn is_valid_email(email: &str) -> bool {
    let lower = email.to_lowercase();
    if EMAIL_BLACKLIST.iter().any(|b| lower.contains(b)) {
        return false;
    }
    if FILE_EXT_BLACKLIST.iter().any(|ext| lower.ends_with(ext)) {
        return false;
    }
    true
}

/// First valid email address in the text, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .find(|e| is_valid_email(e))
}

/// Every valid email address in the text, order preserved. Duplicates
/// are kept; callers dedup after accumulating across pages.
pub fn extract_all_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|e| is_valid_email(e))
        .collect()
}

/// First phone number in the text, trying each matcher strategy in
/// precedence order.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_MATCHERS.iter().find_map(|matcher| matcher(text))
}

/// Digit-plus-sign normalization used for the length sanity check.
fn normalized_len(raw: &str) -> usize {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .count()
}

fn plausible(raw: &str) -> bool {
    (10..=15).contains(&normalized_len(raw))
}

fn match_tel_link(text: &str) -> Option<String> {
    TEL_LINK_RE
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .find(|tel| plausible(tel))
}

fn match_whatsapp_link(text: &str) -> Option<String> {
    WHATSAPP_LINK_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .find(|num| (10..=15).contains(&num.len()))
        .map(|num| format!("+{}", num))
}

fn match_visible_phone(text: &str) -> Option<String> {
    // Strip scripts/styles, collapse tags to spaces, then scan what a
    // visitor would actually see.
    let visible = SCRIPT_RE.replace_all(text, "");
    let visible = STYLE_RE.replace_all(&visible, "");
    let visible = TAG_RE.replace_all(&visible, " ");
    let visible = WHITESPACE_RE.replace_all(&visible, " ");

    VISIBLE_PHONE_RES.iter().find_map(|re| {
        re.find_iter(&visible)
            .map(|m| m.as_str().trim().to_string())
            .find(|p| plausible(p))
    })
}
