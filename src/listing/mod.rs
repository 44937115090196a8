//! Client-side filtering of a fetched listing.

pub mod filter;
pub mod input;
pub mod predicates;
pub mod store;

pub use filter::{filter_ads, filtered_indices, Criteria};
pub use input::{Criterion, CriterionKey};
pub use predicates::haversine_km;
pub use store::ListingStore;
