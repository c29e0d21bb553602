use once_cell::sync::Lazy;
use regex::Regex;
use strum::{EnumIter, IntoEnumIterator};

// "1200(Provisional)1200―3 Kyu": the rating is the number following the marker.
static REGEX_PROVISIONAL_WITH_KYU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?i:provisional)\)\s*([0-9]+)\s*[―—–-]\s*([0-9]+)\s*(Kyu|Dan)").unwrap()
});
// "1500―2 Kyu"
static REGEX_REGULAR_WITH_KYU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s*[―—–-]\s*([0-9]+)\s*(Kyu|Dan)").unwrap());
static REGEX_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static REGEX_PROVISIONAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?i:provisional)\)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRating {
    pub rating: u32,
    pub kyu_rank: Option<String>,
    pub is_provisional: bool,
}

/// Rating text grammars, in priority order. A provisional rating string also
/// contains a plain integer, so the Kyu grammars must be tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum RatingGrammar {
    ProvisionalWithKyu,
    RegularWithKyu,
    PlainNumeric,
}

impl RatingGrammar {
    /// `None` when the grammar does not apply, including when the rating
    /// does not fit in a u32.
    pub fn try_parse(&self, raw: &str) -> Option<ParsedRating> {
        match self {
            RatingGrammar::ProvisionalWithKyu => {
                let caps = REGEX_PROVISIONAL_WITH_KYU.captures(raw)?;
                Some(ParsedRating {
                    rating: caps[1].parse().ok()?,
                    kyu_rank: Some(format!("{} {}", &caps[2], &caps[3])),
                    is_provisional: true,
                })
            }
            RatingGrammar::RegularWithKyu => {
                let caps = REGEX_REGULAR_WITH_KYU.captures(raw)?;
                Some(ParsedRating {
                    rating: caps[1].parse().ok()?,
                    kyu_rank: Some(format!("{} {}", &caps[2], &caps[3])),
                    is_provisional: false,
                })
            }
            RatingGrammar::PlainNumeric => {
                let number = REGEX_NUMBER.find(raw)?;
                Some(ParsedRating {
                    rating: number.as_str().parse().ok()?,
                    kyu_rank: None,
                    is_provisional: REGEX_PROVISIONAL_MARKER.is_match(raw),
                })
            }
        }
    }
}

/// Extract the numeric rating from the free-form rating text of a profile.
/// Never fails: text matching no grammar yields a zero rating.
pub fn parse_rating(raw: &str) -> ParsedRating {
    RatingGrammar::iter()
        .find_map(|grammar| grammar.try_parse(raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_with_kyu() {
        let parsed = parse_rating("1200(Provisional)1200―3 Kyu");
        assert_eq!(
            parsed,
            ParsedRating {
                rating: 1200,
                kyu_rank: Some("3 Kyu".to_string()),
                is_provisional: true,
            }
        );
    }

    #[test]
    fn provisional_rating_is_the_number_after_the_marker() {
        let parsed = parse_rating("900 (Provisional) 1150 ― 4 Kyu");
        assert_eq!(parsed.rating, 1150);
        assert_eq!(parsed.kyu_rank.as_deref(), Some("4 Kyu"));
        assert!(parsed.is_provisional);
    }

    #[test]
    fn regular_with_kyu() {
        let parsed = parse_rating("1500―2 Kyu");
        assert_eq!(
            parsed,
            ParsedRating {
                rating: 1500,
                kyu_rank: Some("2 Kyu".to_string()),
                is_provisional: false,
            }
        );
    }

    #[test]
    fn other_dash_glyphs_and_dan() {
        assert_eq!(parse_rating("2100 - 1 Dan").kyu_rank.as_deref(), Some("1 Dan"));
        assert_eq!(parse_rating("1710—1 Kyu").rating, 1710);
        assert_eq!(parse_rating("1710 – 1  Kyu").kyu_rank.as_deref(), Some("1 Kyu"));
    }

    #[test]
    fn plain_numeric() {
        let parsed = parse_rating("842");
        assert_eq!(parsed.rating, 842);
        assert_eq!(parsed.kyu_rank, None);
        assert!(!parsed.is_provisional);

        let parsed = parse_rating("Rating: 1012 (Provisional)");
        assert_eq!(parsed.rating, 1012);
        assert!(parsed.is_provisional);
    }

    #[test]
    fn no_match_yields_zero() {
        assert_eq!(parse_rating(""), ParsedRating::default());
        assert_eq!(parse_rating("unrated"), ParsedRating::default());
    }

    #[test]
    fn only_ascii_digits_are_read() {
        // Fullwidth digits are not a rating, the ASCII number after them is.
        assert_eq!(parse_rating("１２００ / 842").rating, 842);
        assert_eq!(parse_rating("１２００―３ Kyu"), ParsedRating::default());
    }

    #[test]
    fn overflowing_rating_falls_through() {
        // Kyu grammar rejects the number, plain grammar finds the same one.
        assert_eq!(parse_rating("99999999999―3 Kyu"), ParsedRating::default());
    }

    #[test]
    fn grammars_are_tried_in_priority_order() {
        let order = RatingGrammar::iter().collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                RatingGrammar::ProvisionalWithKyu,
                RatingGrammar::RegularWithKyu,
                RatingGrammar::PlainNumeric,
            ]
        );
        // Lower priority grammars also match a provisional text, but misread it.
        let text = "1000(Provisional)1200―3 Kyu";
        assert!(!RatingGrammar::RegularWithKyu.try_parse(text).unwrap().is_provisional);
        assert_eq!(RatingGrammar::PlainNumeric.try_parse(text).unwrap().rating, 1000);

        let parsed = parse_rating(text);
        assert_eq!(parsed.rating, 1200);
        assert!(parsed.is_provisional);
    }
}
