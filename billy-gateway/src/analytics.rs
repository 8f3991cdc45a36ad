//! Review analytics.
//!
//! Extracts structured signals (BS score, code smell markers) from Billy's
//! free-text reviews and emits them as tracing events. Parsing relies on the
//! output structure requested by the review prompt; when a model drifts from
//! that format the parsers return nothing rather than guessing.

use once_cell::sync::Lazy;
use regex::Regex;

static BS_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)BS\s+(?:SCORE|Level):\s*(\d+)(?:/10)?").expect("valid BS score pattern")
});

static SMELL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"🚩\s*(?i:CRITICAL)|(?i)\bCRITICAL\s+ISSUES\b", "critical"),
        (r"⚠️\s*(?i:MAJOR)|(?i)\bMAJOR\s+ISSUES\b", "major"),
        (r"💩\s*(?i:BS)|(?i)\bBS\s+DETECTOR\b", "bs"),
        (r"🤦\s*(?i:WTAF)|(?i)\bWTAF\s+MOMENTS\b", "wtaf"),
    ]
    .into_iter()
    .filter_map(|(pattern, label)| Regex::new(pattern).ok().map(|re| (re, label)))
    .collect()
});

/// Parse the BS score from review text.
///
/// Accepts "BS SCORE: 7/10", "BS Level: 7/10", or "BS Level: 7" in any
/// case. Returns `None` when absent or outside 1-10.
pub fn parse_bs_score(review: &str) -> Option<u8> {
    let captures = BS_SCORE_RE.captures(review)?;
    let score: u8 = captures.get(1)?.as_str().parse().ok()?;

    if !(1..=10).contains(&score) {
        tracing::warn!(score, "Parsed BS score out of range");
        return None;
    }

    Some(score)
}

/// Parse code smell category markers from review text.
///
/// Looks for the emoji markers and section headers the review prompt asks
/// for (CRITICAL ISSUES, MAJOR ISSUES, BS DETECTOR, WTAF MOMENTS).
pub fn parse_code_smells(review: &str) -> Vec<&'static str> {
    SMELL_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(review))
        .map(|(_, label)| *label)
        .collect()
}

/// Emit a structured event for a completed review.
pub fn track_review(review: &str, language: Option<&str>, provider: Option<&str>) {
    let bs_score = parse_bs_score(review);
    let smells = parse_code_smells(review);

    tracing::info!(
        endpoint = "/review",
        language = language.unwrap_or("unknown"),
        provider = provider.unwrap_or("none"),
        bs_score,
        code_smells = ?smells,
        "Review completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_with_denominator() {
        assert_eq!(parse_bs_score("Verdict. BS SCORE: 7/10. Fix it."), Some(7));
    }

    #[test]
    fn parses_level_variant_without_denominator() {
        assert_eq!(parse_bs_score("bs level: 3 overall"), Some(3));
    }

    #[test]
    fn missing_score_is_none() {
        assert_eq!(parse_bs_score("looks fine to me"), None);
    }

    #[test]
    fn out_of_range_scores_rejected() {
        assert_eq!(parse_bs_score("BS SCORE: 0/10"), None);
        assert_eq!(parse_bs_score("BS SCORE: 11/10"), None);
        assert_eq!(parse_bs_score("BS Level: 999"), None);
    }

    #[test]
    fn boundary_scores_accepted() {
        assert_eq!(parse_bs_score("BS SCORE: 1/10"), Some(1));
        assert_eq!(parse_bs_score("BS SCORE: 10/10"), Some(10));
    }

    #[test]
    fn smells_from_emoji_markers() {
        let review = "🚩 CRITICAL: sql injection\n💩 BS: factory factory";
        assert_eq!(parse_code_smells(review), vec!["critical", "bs"]);
    }

    #[test]
    fn smells_from_section_headers() {
        let review = "MAJOR ISSUES:\n- slow loop\nWTAF MOMENTS:\n- what is this";
        assert_eq!(parse_code_smells(review), vec!["major", "wtaf"]);
    }

    #[test]
    fn clean_review_has_no_smells() {
        assert!(parse_code_smells("Surprisingly decent code. BS SCORE: 2/10").is_empty());
    }
}
