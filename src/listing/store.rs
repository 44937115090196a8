use tracing::debug;

use super::filter::{filtered_indices, Criteria};
use super::input::{parse_choice, Criterion, CriterionKey};
use crate::models::{AdWithStats, Coordinates};

/// The fetched listing plus the criteria currently applied to it.
///
/// The filtered view is a list of indices into `all_ads`, recomputed
/// synchronously on every change, so it always reflects the latest load and
/// the latest criteria.
#[derive(Debug, Clone, Default)]
pub struct ListingStore {
    all_ads: Vec<AdWithStats>,
    criteria: Criteria,
    user_location: Option<Coordinates>,
    visible: Vec<usize>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ads(ads: Vec<AdWithStats>) -> Self {
        let mut store = Self::new();
        store.load(ads);
        store
    }

    /// Replace the listing and recompute the view.
    ///
    /// Criteria survive a reload and are applied to the new ads, so the view
    /// is the whole listing only when no criterion is set. Call
    /// [`ListingStore::clear`] first for an unfiltered view.
    pub fn load(&mut self, ads: Vec<AdWithStats>) {
        self.all_ads = ads;
        self.refilter();
    }

    pub fn set_criterion(&mut self, criterion: Criterion) {
        match criterion {
            Criterion::Subject(v) => {
                self.criteria.subject = v.as_deref().and_then(parse_choice);
            }
            Criterion::Category(v) => {
                self.criteria.category = v.as_deref().and_then(parse_choice);
            }
            Criterion::MaxDistanceKm(v) => {
                self.criteria.max_distance_km = v.filter(|km| km.is_finite());
            }
            Criterion::RatingMin(v) => self.criteria.rating_min = v.filter(|r| r.is_finite()),
            Criterion::ReviewCountMin(v) => self.criteria.review_count_min = v,
            Criterion::RemoteOnly(v) => self.criteria.remote_only = v,
            Criterion::InPersonOnly(v) => self.criteria.in_person_only = v,
        }
        self.refilter();
    }

    /// Commit raw form text for one criterion.
    pub fn set_criterion_text(&mut self, key: CriterionKey, raw: &str) {
        self.set_criterion(key.parse(raw));
    }

    pub fn set_user_location(&mut self, location: Option<Coordinates>) {
        self.user_location = location;
        self.refilter();
    }

    /// Drop every criterion. The view becomes exactly the last loaded listing.
    pub fn clear(&mut self) {
        self.criteria = Criteria::default();
        self.refilter();
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn all_ads(&self) -> &[AdWithStats] {
        &self.all_ads
    }

    pub fn filtered(&self) -> impl Iterator<Item = &AdWithStats> + '_ {
        self.visible.iter().map(|&i| &self.all_ads[i])
    }

    pub fn filtered_ads(&self) -> Vec<&AdWithStats> {
        self.filtered().collect()
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    fn refilter(&mut self) {
        self.visible = filtered_indices(&self.all_ads, &self.criteria, self.user_location);
        debug!(
            total = self.all_ads.len(),
            visible = self.visible.len(),
            active = self.criteria.active_count(),
            "listing refiltered"
        );
    }
}
