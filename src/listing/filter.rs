//! Composition of the predicates into one stable filter pass.

use super::predicates::{
    matches_category, matches_in_person, matches_remote, matches_subject, meets_rating,
    meets_review_count, within_distance,
};
use crate::models::{AdWithStats, Coordinates};

/// Active filter values. `Default` is "no filter at all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub subject: Option<String>,
    pub category: Option<String>,
    pub max_distance_km: Option<f64>,
    pub rating_min: Option<f64>,
    pub review_count_min: Option<u32>,
    pub remote_only: bool,
    pub in_person_only: bool,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of predicates that can reject an ad.
    pub fn active_count(&self) -> usize {
        [
            self.subject.is_some(),
            self.category.is_some(),
            self.max_distance_km.is_some(),
            self.rating_min.is_some(),
            self.review_count_min.is_some(),
            self.remote_only,
            self.in_person_only,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// Logical AND of every criterion for one ad.
pub fn matches(ad: &AdWithStats, criteria: &Criteria, user_location: Option<Coordinates>) -> bool {
    matches_subject(ad, criteria.subject.as_deref())
        && matches_category(ad, criteria.category.as_deref())
        && within_distance(ad, criteria.max_distance_km, user_location)
        && matches_remote(ad, criteria.remote_only)
        && matches_in_person(ad, criteria.in_person_only)
        && meets_rating(ad, criteria.rating_min)
        && meets_review_count(ad, criteria.review_count_min)
}

/// Indices into `ads` that pass `criteria`, ascending.
#[must_use]
pub fn filtered_indices(
    ads: &[AdWithStats],
    criteria: &Criteria,
    user_location: Option<Coordinates>,
) -> Vec<usize> {
    if criteria.is_empty() {
        return (0..ads.len()).collect();
    }
    ads.iter()
        .enumerate()
        .filter_map(|(i, ad)| matches(ad, criteria, user_location).then_some(i))
        .collect()
}

/// Ads that pass `criteria`, in their original order.
#[must_use]
pub fn filter_ads<'a>(
    ads: &'a [AdWithStats],
    criteria: &Criteria,
    user_location: Option<Coordinates>,
) -> Vec<&'a AdWithStats> {
    filtered_indices(ads, criteria, user_location)
        .into_iter()
        .map(|i| &ads[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ad, AdStatus};
    use uuid::Uuid;

    fn ad(id: i64, subject: &str, remote: bool, ratings: &[u8]) -> AdWithStats {
        AdWithStats::new(
            Ad {
                id,
                title: format!("ad {id}"),
                description: String::new(),
                price: 40.0,
                address: None,
                latitude: None,
                longitude: None,
                contact_info: String::new(),
                status: AdStatus::Active,
                is_remote: remote,
                is_in_person: !remote,
                subject_id: 1,
                scope_id: 1,
                owner_id: Uuid::nil(),
            },
            subject,
            "Studia",
            ratings,
            None,
        )
    }

    #[test]
    fn empty_criteria_is_identity() {
        let ads = vec![ad(1, "Chemia", true, &[]), ad(2, "Fizyka", false, &[5])];
        assert!(Criteria::default().is_empty());
        assert_eq!(filtered_indices(&ads, &Criteria::default(), None), vec![0, 1]);
    }

    #[test]
    fn predicates_are_anded_and_order_is_kept() {
        let ads = vec![
            ad(1, "Chemia", true, &[5]),
            ad(2, "Chemia", false, &[5]),
            ad(3, "Fizyka", true, &[5]),
            ad(4, "Chemia", true, &[2]),
            ad(5, "Chemia", true, &[4, 5]),
        ];
        let criteria = Criteria {
            subject: Some("Chemia".to_string()),
            remote_only: true,
            rating_min: Some(4.0),
            ..Criteria::default()
        };
        assert_eq!(criteria.active_count(), 3);
        let ids: Vec<i64> = filter_ads(&ads, &criteria, None).iter().map(|a| a.ad.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn both_toggles_require_both_modes() {
        let mut hybrid = ad(1, "Chemia", true, &[]);
        hybrid.ad.is_in_person = true;
        let ads = vec![hybrid, ad(2, "Chemia", true, &[])];
        let criteria = Criteria {
            remote_only: true,
            in_person_only: true,
            ..Criteria::default()
        };
        assert_eq!(filtered_indices(&ads, &criteria, None), vec![0]);
    }
}
