use regex::Regex;
use std::sync::LazyLock;

static ABUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(hack|exploit|attack|malware|virus)\b").unwrap());
static FRAUD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(illegal|fraud|scam|phishing)\b").unwrap());
static BULK_MAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(spam|bulk email|mass email)\b").unwrap());

/// Check search text against abuse patterns. Returns descriptions of what was found.
pub fn detect_abuse(text: &str) -> Vec<String> {
    let mut findings = Vec::new();

    if let Some(m) = ABUSE_RE.find(text) {
        findings.push(format!("intrusion term: {}", m.as_str().to_lowercase()));
    }
    if let Some(m) = FRAUD_RE.find(text) {
        findings.push(format!("fraud term: {}", m.as_str().to_lowercase()));
    }
    if let Some(m) = BULK_MAIL_RE.find(text) {
        findings.push(format!("bulk mailing term: {}", m.as_str().to_lowercase()));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_query_has_no_findings() {
        assert!(detect_abuse("CEOs at cosmetics companies in Taiwan").is_empty());
    }

    #[test]
    fn matches_whole_words_only() {
        // "scampi" and "hackathon" only contain the terms
        assert!(detect_abuse("seafood scampi suppliers").is_empty());
        assert!(detect_abuse("hackathon organizers").is_empty());
    }

    #[test]
    fn case_insensitive_detection() {
        let findings = detect_abuse("Send BULK EMAIL to all Phishing targets");
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().any(|f| f.contains("phishing")));
        assert!(findings.iter().any(|f| f.contains("bulk email")));
    }
}
