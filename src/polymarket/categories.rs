use super::normalize::Market;

struct CategoryDef {
    name: &'static str,
    /// Upstream category slugs counted as a direct match.
    slugs: &'static [&'static str],
    /// Terms matched as whole words in the market question.
    terms: &'static [&'static str],
}

const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "politics",
        slugs: &["us-current-affairs", "current-affairs", "politics"],
        terms: &[
            "election", "president", "congress", "vote", "trump", "biden", "senate", "governor",
            "democrat", "republican",
        ],
    },
    CategoryDef {
        name: "sports",
        slugs: &["sports"],
        terms: &[
            "nfl", "nba", "football", "basketball", "soccer", "championship", "super bowl",
            "world cup", "playoffs", "mvp",
        ],
    },
    CategoryDef {
        name: "crypto",
        slugs: &["crypto"],
        terms: &[
            "bitcoin", "ethereum", "btc", "eth", "blockchain", "token", "solana", "crypto",
            "coin", "defi",
        ],
    },
    CategoryDef {
        name: "pop-culture",
        slugs: &["pop-culture"],
        terms: &[
            "movie", "oscar", "grammy", "celebrity", "music", "entertainment", "award", "album",
            "actor", "singer",
        ],
    },
    CategoryDef {
        name: "tech",
        slugs: &["tech"],
        terms: &[
            "apple", "google", "microsoft", "ai", "openai", "chatgpt", "twitter", "meta",
            "tesla", "elon",
        ],
    },
];

/// Whether a normalized market belongs to the named category. Uses the
/// upstream category slug first, then whole-word matches in the question.
pub fn matches_category(market: &Market, category: &str) -> bool {
    if category.is_empty() || category == "all" {
        return true;
    }

    let Some(def) = CATEGORIES.iter().find(|d| d.name == category) else {
        return false;
    };

    let market_category = market.category.to_lowercase();
    for slug in def.slugs {
        if market_category.contains(slug)
            || market_category.replace('-', " ") == slug.replace('-', " ")
        {
            return true;
        }
    }

    let question = market.question.to_lowercase();
    def.terms.iter().any(|term| contains_word(&question, term))
}

/// Substring match constrained to word boundaries, so "eth" does not match
/// "something".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut search_from = 0;
    while let Some(idx) = haystack[search_from..].find(needle) {
        let start = search_from + idx;
        let end = start + needle.len();

        let ok_before = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let ok_after = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(|c| c.is_alphanumeric());

        if ok_before && ok_after {
            return true;
        }
        search_from = start + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn market(question: &str, category: &str) -> Market {
        Market {
            id: "m1".into(),
            question: question.into(),
            slug: String::new(),
            outcomes: vec!["Yes".into(), "No".into()],
            yes_price: Decimal::new(5, 1),
            no_price: Decimal::new(5, 1),
            volume: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            end_date: None,
            category: category.into(),
            active: true,
            clob_token_ids: vec![],
        }
    }

    #[test]
    fn test_matches_by_category_slug() {
        let m = market("Anything at all?", "us-current-affairs");
        assert!(matches_category(&m, "politics"));
        assert!(!matches_category(&m, "sports"));
    }

    #[test]
    fn test_matches_by_question_term() {
        let m = market("Will Bitcoin hit $100k this year?", "general");
        assert!(matches_category(&m, "crypto"));
    }

    #[test]
    fn test_word_boundary() {
        // "eth" must not match inside "something".
        let m = market("Is something happening?", "general");
        assert!(!matches_category(&m, "crypto"));

        let m = market("Will ETH flip BTC?", "general");
        assert!(matches_category(&m, "crypto"));
    }

    #[test]
    fn test_all_matches_everything() {
        let m = market("Anything", "whatever");
        assert!(matches_category(&m, "all"));
        assert!(matches_category(&m, ""));
    }

    #[test]
    fn test_unknown_category() {
        let m = market("Anything", "whatever");
        assert!(!matches_category(&m, "weather"));
    }
}
