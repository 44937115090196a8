//! Single-criterion tests over one ad.
//!
//! Every predicate is total and pure. An absent criterion (`None`, or a
//! toggle that is off) always evaluates to `true`: filters are opt-in.

use crate::models::{AdWithStats, Coordinates};

/// Mean Earth radius used by the distance filter, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn matches_subject(ad: &AdWithStats, subject: Option<&str>) -> bool {
    subject.map_or(true, |s| ad.subject_name == s)
}

pub fn matches_category(ad: &AdWithStats, category: Option<&str>) -> bool {
    category.map_or(true, |c| ad.scope_name == c)
}

/// `distance <= max_km` from the user. Without a known user location the
/// filter is not applied; ads without coordinates never pass an active filter.
pub fn within_distance(
    ad: &AdWithStats,
    max_km: Option<f64>,
    user_location: Option<Coordinates>,
) -> bool {
    let (Some(max_km), Some(user)) = (max_km, user_location) else {
        return true;
    };
    ad.coordinates()
        .is_some_and(|at| haversine_km(user, at) <= max_km)
}

pub fn matches_remote(ad: &AdWithStats, remote_only: bool) -> bool {
    !remote_only || ad.ad.is_remote
}

pub fn matches_in_person(ad: &AdWithStats, in_person_only: bool) -> bool {
    !in_person_only || ad.ad.is_in_person
}

/// Unrated ads are excluded whenever a minimum is set.
pub fn meets_rating(ad: &AdWithStats, rating_min: Option<f64>) -> bool {
    rating_min.map_or(true, |min| ad.average_rating.is_some_and(|avg| avg >= min))
}

pub fn meets_review_count(ad: &AdWithStats, review_count_min: Option<u32>) -> bool {
    review_count_min.map_or(true, |min| ad.review_count >= min as usize)
}
