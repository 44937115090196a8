//! Client core of a tutoring-offers marketplace: typed records, a Supabase
//! backend client, the paid publication flow and client-side listing filters.

pub mod app;
pub mod avatar;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;

pub use app::Marketplace;
pub use error::{ClientError, Result};
