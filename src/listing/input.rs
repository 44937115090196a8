//! Turning raw form input into criteria.
//!
//! Numeric fields that fail to parse leave their filter inactive; they are
//! never an error and never read as zero.

use std::fmt;
use std::str::FromStr;

/// One field of the criteria tuple together with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Subject(Option<String>),
    Category(Option<String>),
    MaxDistanceKm(Option<f64>),
    RatingMin(Option<f64>),
    ReviewCountMin(Option<u32>),
    RemoteOnly(bool),
    InPersonOnly(bool),
}

/// Which criterion a raw input belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKey {
    Subject,
    Category,
    MaxDistanceKm,
    RatingMin,
    ReviewCountMin,
    RemoteOnly,
    InPersonOnly,
}

impl CriterionKey {
    /// Parse the text a user committed for this key.
    pub fn parse(self, raw: &str) -> Criterion {
        match self {
            CriterionKey::Subject => Criterion::Subject(parse_choice(raw)),
            CriterionKey::Category => Criterion::Category(parse_choice(raw)),
            CriterionKey::MaxDistanceKm => Criterion::MaxDistanceKm(parse_number(raw)),
            CriterionKey::RatingMin => Criterion::RatingMin(parse_number(raw)),
            CriterionKey::ReviewCountMin => Criterion::ReviewCountMin(parse_count(raw)),
            CriterionKey::RemoteOnly => Criterion::RemoteOnly(parse_toggle(raw)),
            CriterionKey::InPersonOnly => Criterion::InPersonOnly(parse_toggle(raw)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CriterionKey::Subject => "subject",
            CriterionKey::Category => "category",
            CriterionKey::MaxDistanceKm => "max-distance",
            CriterionKey::RatingMin => "min-rating",
            CriterionKey::ReviewCountMin => "min-reviews",
            CriterionKey::RemoteOnly => "remote",
            CriterionKey::InPersonOnly => "in-person",
        }
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subject" => Ok(CriterionKey::Subject),
            "category" | "scope" => Ok(CriterionKey::Category),
            "max-distance" | "distance" => Ok(CriterionKey::MaxDistanceKm),
            "min-rating" | "rating" => Ok(CriterionKey::RatingMin),
            "min-reviews" | "reviews" => Ok(CriterionKey::ReviewCountMin),
            "remote" => Ok(CriterionKey::RemoteOnly),
            "in-person" => Ok(CriterionKey::InPersonOnly),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Picker value. Blank (the "all" entry) means no filter.
pub fn parse_choice(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Decimal number, accepting a comma separator. Non-finite values count as
/// unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Non-negative whole number.
pub fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

pub fn parse_toggle(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "tak"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_distance_is_inactive_not_zero() {
        assert_eq!(
            CriterionKey::MaxDistanceKm.parse("abc"),
            Criterion::MaxDistanceKm(None)
        );
        assert_eq!(
            CriterionKey::MaxDistanceKm.parse("0"),
            Criterion::MaxDistanceKm(Some(0.0))
        );
        assert_eq!(
            CriterionKey::MaxDistanceKm.parse(" 12,5 "),
            Criterion::MaxDistanceKm(Some(12.5))
        );
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn counts_must_be_whole_and_non_negative() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("2.5"), None);
    }

    #[test]
    fn picker_all_entry_clears_the_choice() {
        assert_eq!(CriterionKey::Subject.parse(" "), Criterion::Subject(None));
        assert_eq!(
            CriterionKey::Category.parse("Studia"),
            Criterion::Category(Some("Studia".to_string()))
        );
    }

    #[test]
    fn keys_parse_from_names() {
        assert_eq!("distance".parse::<CriterionKey>().unwrap(), CriterionKey::MaxDistanceKm);
        assert_eq!(CriterionKey::RatingMin.to_string(), "min-rating");
        assert!("colour".parse::<CriterionKey>().is_err());
        assert_eq!(CriterionKey::RemoteOnly.parse("on"), Criterion::RemoteOnly(true));
    }
}
