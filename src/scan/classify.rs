use crate::models::{ScanStatus, ScanType};

/// Keyword list for the Deep strategy, scanned left-to-right
pub const SUSPICIOUS_KEYWORDS: [&str; 4] = ["phishing", "betting", "hack", "free-money"];

/// Static blacklist for the Basic strategy
pub const BLACKLIST: [&str; 2] = ["malicious-site.com", "bad-link.net"];

pub const MSG_DEEP_SUSPICIOUS: &str = "Deep AI scan detected potential phishing patterns.";
pub const MSG_DEEP_SAFE: &str =
    "Deep AI scan validated this link as safe. Certificate valid. No malware signatures.";
pub const MSG_BASIC_DANGEROUS: &str = "Link found in global blacklist.";
pub const MSG_BASIC_SAFE: &str = "Basic check passed (Blacklist check only).";

/// The `{status, message}` pair produced by classification, prior to persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub status: ScanStatus,
    pub message: &'static str,
}

/// Classify a URL under the given strategy.
///
/// Pure function: no I/O, no state. Matching is case-sensitive substring
/// containment on the literal URL string; scheme stripping, percent-decoding
/// and trailing-slash handling are deliberately not performed, so
/// `PHISHING` in a URL does not match the `phishing` keyword.
pub fn classify(url: &str, scan_type: ScanType) -> Verdict {
    match scan_type {
        ScanType::Deep => {
            if SUSPICIOUS_KEYWORDS.iter().any(|kw| url.contains(kw)) {
                Verdict {
                    status: ScanStatus::Suspicious,
                    message: MSG_DEEP_SUSPICIOUS,
                }
            } else {
                Verdict {
                    status: ScanStatus::Safe,
                    message: MSG_DEEP_SAFE,
                }
            }
        }
        ScanType::Basic => {
            if BLACKLIST.iter().any(|bad| url.contains(bad)) {
                Verdict {
                    status: ScanStatus::Dangerous,
                    message: MSG_BASIC_DANGEROUS,
                }
            } else {
                Verdict {
                    status: ScanStatus::Safe,
                    message: MSG_BASIC_SAFE,
                }
            }
        }
    }
}
