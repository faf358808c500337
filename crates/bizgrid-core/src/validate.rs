//! Candidate data-quality heuristics.
//!
//! Pure functions over raw contact fields. Absent or empty input always
//! takes the "not fake" / empty-result branch; nothing here returns an
//! error or panics on malformed input.

use regex::Regex;

use crate::types::Business;

/// Raw-string placeholder sequences that mark a phone number as fabricated.
const FAKE_PHONE_PATTERNS: &[&str] = &["123-456", "000-000", "111-111"];

/// Placeholder domains that mark an email address as fabricated.
const FAKE_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "test.com",
    "demo.com",
    "fake.com",
    "sample.com",
    "domain.com",
];

/// Placeholder local-part prefixes that mark an email address as fabricated.
const FAKE_EMAIL_PREFIXES: &[&str] = &["test@", "demo@", "example@", "fake@", "noreply@"];

/// Returns `true` if `phone` looks like a placeholder rather than a real
/// number.
///
/// Checks, in order: the digits-only form contains `"555"`; seven or more
/// digits that are all identical; the raw string contains a known
/// placeholder sequence such as `"123-456"`.
#[must_use]
pub fn is_fake_phone(phone: &str) -> bool {
    if phone.trim().is_empty() {
        return false;
    }

    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.contains("555") {
        return true;
    }

    if digits.len() >= 7 {
        let mut chars = digits.chars();
        if let Some(first) = chars.next() {
            if chars.all(|c| c == first) {
                return true;
            }
        }
    }

    FAKE_PHONE_PATTERNS.iter().any(|p| phone.contains(p))
}

/// Returns `true` if `email` uses a placeholder domain or local-part prefix.
#[must_use]
pub fn is_fake_email(email: &str) -> bool {
    if email.trim().is_empty() {
        return false;
    }

    let lower = email.to_lowercase();
    FAKE_EMAIL_DOMAINS
        .iter()
        .any(|domain| lower.ends_with(&format!("@{domain}")))
        || FAKE_EMAIL_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}

/// Extracts every email-looking token from free text, case-folded,
/// deduplicated, and with placeholder addresses removed.
///
/// The result is sorted so "the first extracted email" is deterministic for
/// a given input regardless of where matches sit in the text.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let re = Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("valid email regex");
    let lower = text.to_lowercase();

    let mut emails: Vec<String> = re
        .find_iter(&lower)
        .map(|m| m.as_str().to_owned())
        .filter(|e| !is_fake_email(e))
        .collect();
    emails.sort();
    emails.dedup();
    emails
}

/// Attempts to pull a city and two-letter state code from a formatted
/// address.
///
/// Tries `", City, XX 12345"` first, then `", City, XX"` at the end of the
/// string. Returns empty strings when neither pattern matches.
#[must_use]
pub fn extract_city_state(address: &str) -> (String, String) {
    if address.is_empty() {
        return (String::new(), String::new());
    }

    for pattern in [
        r",\s*([^,]+),\s*([A-Z]{2})\s*\d{5}",
        r",\s*([^,]+),\s*([A-Z]{2})\s*$",
    ] {
        let re = Regex::new(pattern).expect("valid address regex");
        if let Some(caps) = re.captures(address) {
            let city = caps
                .get(1)
                .map(|m| m.as_str().trim().to_owned())
                .unwrap_or_default();
            let state = caps
                .get(2)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default();
            return (city, state);
        }
    }

    (String::new(), String::new())
}

/// Counts the populated contact fields of a business: phone, email,
/// website, address. Whitespace-only fields do not count. Range 0..=4.
#[must_use]
pub fn completeness_score(business: &Business) -> u8 {
    let fields = [
        &business.phone,
        &business.email,
        &business.website,
        &business.address,
    ];
    let mut score = 0u8;
    for field in fields {
        if !field.trim().is_empty() {
            score += 1;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // is_fake_phone
    // -----------------------------------------------------------------------

    #[test]
    fn fake_phone_empty_is_not_fake() {
        assert!(!is_fake_phone(""));
        assert!(!is_fake_phone("   "));
    }

    #[test]
    fn fake_phone_555_in_digits() {
        assert!(is_fake_phone("555-555-5555"));
        assert!(is_fake_phone("(512) 555-0134"));
        assert!(is_fake_phone("5-5-5 1234"));
    }

    #[test]
    fn fake_phone_all_identical_digits() {
        assert!(is_fake_phone("7777777"));
        assert!(is_fake_phone("(777) 777-7777"));
        // Six identical digits is below the threshold.
        assert!(!is_fake_phone("777777"));
    }

    #[test]
    fn fake_phone_placeholder_patterns() {
        assert!(is_fake_phone("123-456-7890"));
        assert!(is_fake_phone("000-000-0000"));
        assert!(is_fake_phone("111-111-2222"));
    }

    #[test]
    fn real_phone_is_not_fake() {
        assert!(!is_fake_phone("(512) 837-0134"));
        assert!(!is_fake_phone("214-748-3647"));
    }

    // -----------------------------------------------------------------------
    // is_fake_email
    // -----------------------------------------------------------------------

    #[test]
    fn fake_email_empty_is_not_fake() {
        assert!(!is_fake_email(""));
    }

    #[test]
    fn fake_email_blocklisted_domains() {
        assert!(is_fake_email("info@example.com"));
        assert!(is_fake_email("CONTACT@TEST.COM"));
        assert!(is_fake_email("hello@sample.com"));
    }

    #[test]
    fn fake_email_placeholder_prefixes() {
        assert!(is_fake_email("test@acmeplumbing.com"));
        assert!(is_fake_email("noreply@acmeplumbing.com"));
        assert!(is_fake_email("Demo@acmeplumbing.com"));
    }

    #[test]
    fn real_email_is_not_fake() {
        assert!(!is_fake_email("user@realcompany.io"));
        assert!(!is_fake_email("office@acmeplumbing.com"));
    }

    // -----------------------------------------------------------------------
    // extract_emails
    // -----------------------------------------------------------------------

    #[test]
    fn extract_emails_finds_and_lowercases() {
        let emails = extract_emails("Contact us at Office@AcmePlumbing.com today");
        assert_eq!(emails, vec!["office@acmeplumbing.com".to_owned()]);
    }

    #[test]
    fn extract_emails_dedupes_and_sorts() {
        let emails = extract_emails("b@zeta.io a@alpha.io b@zeta.io");
        assert_eq!(
            emails,
            vec!["a@alpha.io".to_owned(), "b@zeta.io".to_owned()]
        );
    }

    #[test]
    fn extract_emails_excludes_fakes() {
        let emails = extract_emails("write test@example.com or sales@acme.io");
        assert_eq!(emails, vec!["sales@acme.io".to_owned()]);
    }

    #[test]
    fn extract_emails_empty_text() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails("no addresses here").is_empty());
    }

    // -----------------------------------------------------------------------
    // extract_city_state
    // -----------------------------------------------------------------------

    #[test]
    fn city_state_with_zip() {
        let (city, state) = extract_city_state("123 Main St, Austin, TX 78701, USA");
        assert_eq!(city, "Austin");
        assert_eq!(state, "TX");
    }

    #[test]
    fn city_state_without_zip_at_end() {
        let (city, state) = extract_city_state("123 Main St, Plano, TX");
        assert_eq!(city, "Plano");
        assert_eq!(state, "TX");
    }

    #[test]
    fn city_state_no_match_returns_empty() {
        let (city, state) = extract_city_state("somewhere unaddressed");
        assert!(city.is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn city_state_empty_address() {
        assert_eq!(extract_city_state(""), (String::new(), String::new()));
    }

    // -----------------------------------------------------------------------
    // completeness_score
    // -----------------------------------------------------------------------

    fn business_with(phone: &str, email: &str, website: &str, address: &str) -> Business {
        Business {
            phone: phone.to_owned(),
            email: email.to_owned(),
            website: website.to_owned(),
            address: address.to_owned(),
            ..Business::default()
        }
    }

    #[test]
    fn score_counts_populated_fields() {
        assert_eq!(completeness_score(&business_with("", "", "", "")), 0);
        assert_eq!(
            completeness_score(&business_with("512-837-0134", "", "", "")),
            1
        );
        assert_eq!(
            completeness_score(&business_with(
                "512-837-0134",
                "a@b.io",
                "https://b.io",
                "1 Main St, Austin, TX"
            )),
            4
        );
    }

    #[test]
    fn score_ignores_whitespace_only_fields() {
        assert_eq!(completeness_score(&business_with("  ", "\t", "", "")), 0);
    }

    #[test]
    fn score_is_monotonic_in_each_field() {
        let base = business_with("", "a@b.io", "", "");
        let with_phone = business_with("512-837-0134", "a@b.io", "", "");
        assert!(completeness_score(&with_phone) >= completeness_score(&base));
    }
}
