//! Command-line front end. Each subcommand is one screen of the app.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::app::Marketplace;
use crate::backend::{ManualCoordinates, PaymentConfirmer, PaymentIntent};
use crate::error::ClientError;
use crate::listing::{CriterionKey, ListingStore};
use crate::models::{AdDraft, Coordinates, Scope, Subject};

/// tutor-scout - browse, publish and review tutoring offers
#[derive(Parser, Debug)]
#[command(name = "tutor-scout")]
#[command(version)]
#[command(about = "Browse, publish and review tutoring offers", long_about = None)]
pub struct Args {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List offers, optionally filtered
    Browse(BrowseArgs),
    /// Show one offer with its reviews
    Details { id: i64 },
    /// Review an offer (rating 1-5)
    Review {
        id: i64,
        rating: i64,
        comment: String,
    },
    /// List your own offers
    MyAds,
    /// Archive one of your offers
    Archive { id: i64 },
    /// Edit one of your offers; unset fields keep their current value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: AdFields,
    },
    /// Pay the listing fee and publish a new offer
    Publish {
        #[command(flatten)]
        fields: AdFields,
    },
    /// Offers with a location, for the map
    Map,
    /// Show a profile (yours when no id is given)
    Profile { user_id: Option<Uuid> },
    /// Create your profile after signing up
    Register { name: String, last_name: String },
    /// Set your profile description
    Describe { text: String },
    /// Upload a new avatar image
    Avatar { file: PathBuf },
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct BrowseArgs {
    /// Subject name, e.g. "Matematyka"
    #[arg(long)]
    pub subject: Option<String>,
    /// Category (education level), e.g. "Studia"
    #[arg(long)]
    pub category: Option<String>,
    /// Maximum distance in km from --lat/--lon
    #[arg(long)]
    pub max_distance: Option<String>,
    /// Minimum average rating
    #[arg(long)]
    pub min_rating: Option<String>,
    /// Minimum number of reviews
    #[arg(long)]
    pub min_reviews: Option<String>,
    /// Only remote lessons
    #[arg(long)]
    pub remote: bool,
    /// Only in-person lessons
    #[arg(long)]
    pub in_person: bool,
    /// Your latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Your longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl BrowseArgs {
    pub fn user_location(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }

    /// Filter inputs as raw text, the way the filter form commits them.
    pub fn criterion_inputs(&self) -> Vec<(CriterionKey, String)> {
        let mut inputs = Vec::new();
        let text = [
            (CriterionKey::Subject, &self.subject),
            (CriterionKey::Category, &self.category),
            (CriterionKey::MaxDistanceKm, &self.max_distance),
            (CriterionKey::RatingMin, &self.min_rating),
            (CriterionKey::ReviewCountMin, &self.min_reviews),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                inputs.push((key, value.clone()));
            }
        }
        if self.remote {
            inputs.push((CriterionKey::RemoteOnly, "true".to_string()));
        }
        if self.in_person {
            inputs.push((CriterionKey::InPersonOnly, "true".to_string()));
        }
        inputs
    }

    pub fn apply(&self, store: &mut ListingStore) {
        for (key, raw) in self.criterion_inputs() {
            store.set_criterion_text(key, &raw);
        }
    }
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct AdFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Price per 60 minutes
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Phone number or other contact details
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Offered remotely
    #[arg(long)]
    pub remote: Option<bool>,
    /// Offered in person
    #[arg(long)]
    pub in_person: Option<bool>,
    /// Latitude of the address
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude of the address
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl AdFields {
    /// Overlay the given fields on `draft`. Returns whether the address changed.
    pub fn merge_into(&self, draft: &mut AdDraft) -> Result<bool, ClientError> {
        let set = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                *target = v.clone();
            }
        };
        set(&mut draft.title, &self.title);
        set(&mut draft.description, &self.description);
        set(&mut draft.price, &self.price);
        set(&mut draft.contact_info, &self.contact);

        let address_changed = match &self.address {
            Some(address) if address.trim() != draft.address.trim() => {
                draft.address = address.clone();
                true
            }
            _ => false,
        };

        if let Some(subject) = &self.subject {
            draft.subject = Some(Subject::from_name(subject)?);
        }
        if let Some(category) = &self.category {
            draft.scope = Some(Scope::from_name(category)?);
        }
        if let Some(remote) = self.remote {
            draft.is_remote = remote;
        }
        if let Some(in_person) = self.in_person {
            draft.is_in_person = in_person;
        }
        Ok(address_changed)
    }

    pub fn geocoder(&self) -> ManualCoordinates {
        ManualCoordinates(self.lat.zip(self.lon).map(|(lat, lon)| Coordinates::new(lat, lon)))
    }
}

/// Asks on the terminal before a payment intent is treated as paid.
pub struct TerminalConfirmer {
    pub amount_minor: i64,
    pub currency: String,
}

#[async_trait]
impl PaymentConfirmer for TerminalConfirmer {
    async fn confirm(&self, intent: &PaymentIntent) -> Result<(), ClientError> {
        println!(
            "Listing fee: {}.{:02} {} ({:?})",
            self.amount_minor / 100,
            self.amount_minor % 100,
            self.currency.to_uppercase(),
            intent
        );
        println!("Confirm payment? [y/N]");

        let mut line = String::new();
        BufReader::new(io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| ClientError::Payment(format!("could not read confirmation: {e}")))?;

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" | "t" | "tak" => Ok(()),
            _ => Err(ClientError::Payment("payment cancelled".to_string())),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_rating(average: Option<f64>, count: usize) -> String {
    match average {
        Some(avg) => format!("{avg:.1}/5 ({count} reviews)"),
        None => "no reviews".to_string(),
    }
}

/// Run one command against the marketplace.
pub async fn run(args: Args, market: &Marketplace) -> Result<()> {
    match args.command {
        Command::Browse(filters) => {
            let mut store = market
                .browse(filters.user_location())
                .await
                .context("Failed to fetch ads")?;
            filters.apply(&mut store);

            if args.json {
                return print_json(&store.filtered_ads());
            }
            println!("{} of {} offers\n", store.len(), store.all_ads().len());
            for (i, ad) in store.filtered().enumerate() {
                println!("{}. {} - {}", i + 1, ad.subject_name, ad.ad.title);
                println!("   {} PLN, {}", ad.ad.price, format_rating(ad.average_rating, ad.review_count));
                println!("   {} | remote: {} | in person: {}", ad.scope_name, ad.ad.is_remote, ad.ad.is_in_person);
                if let Some(address) = &ad.ad.address {
                    println!("   {}", address);
                }
                println!("   ID: {}", ad.ad.id);
                println!();
            }
        }
        Command::Details { id } => {
            let details = market.ad_details(id).await.context("Failed to fetch ad details")?;
            if args.json {
                return print_json(&details);
            }
            let ad = &details.ad;
            println!("{} ({} / {})", ad.title, details.subject_name, details.scope_name);
            println!("{} PLN / 60 min", ad.price);
            if let Some(address) = &ad.address {
                println!("Address: {}", address);
            }
            println!("Contact: {}", ad.contact_info);
            println!("\n{}\n", ad.description);
            println!("{}", format_rating(details.average_rating, details.reviews.len()));
            for review in &details.reviews {
                println!(
                    "  {}/5 {} - {}",
                    review.rating,
                    review.created_at.format("%Y-%m-%d"),
                    review.comment
                );
            }
        }
        Command::Review { id, rating, comment } => {
            market
                .add_review(id, rating, &comment)
                .await
                .context("Failed to add review")?;
            println!("Review added.");
        }
        Command::MyAds => {
            let ads = market.my_ads().await.context("Failed to fetch your ads")?;
            if args.json {
                return print_json(&ads);
            }
            if ads.is_empty() {
                println!("You have no ads yet.");
            }
            for ad in ads {
                println!("{} [{:?}] {} - {} / {}", ad.id, ad.status, ad.title, ad.subject_name, ad.scope_name);
            }
        }
        Command::Archive { id } => {
            market.archive_ad(id).await.context("Failed to archive ad")?;
            println!("Ad {} archived.", id);
        }
        Command::Edit { id, fields } => {
            let mut draft = market
                .load_ad_for_edit(id)
                .await
                .context("Failed to load ad")?;
            let address_changed = fields.merge_into(&mut draft)?;
            if fields.lat.is_some() {
                draft.coordinates = fields.geocoder().0;
            }
            market
                .save_ad_edits(id, draft, address_changed, &fields.geocoder())
                .await
                .context("Failed to save changes")?;
            println!("Ad {} updated.", id);
        }
        Command::Publish { fields } => {
            let mut draft = AdDraft::default();
            fields.merge_into(&mut draft)?;
            let fee = market.listing_fee();
            let confirmer = TerminalConfirmer {
                amount_minor: fee.amount,
                currency: fee.currency.clone(),
            };
            let ad = market
                .submit_ad(draft, &fields.geocoder(), &confirmer)
                .await
                .context("Failed to publish ad")?;
            println!("Payment accepted, ad {} published.", ad.id);
        }
        Command::Map => {
            let pins = market.map_pins().await.context("Failed to fetch locations")?;
            if args.json {
                return print_json(&pins);
            }
            for pin in pins {
                println!(
                    "{:>9.5} {:>10.5}  {} - {} (ID: {})",
                    pin.latitude,
                    pin.longitude,
                    pin.title,
                    pin.caption(),
                    pin.ad_id
                );
            }
        }
        Command::Profile { user_id } => {
            let profile = match user_id {
                Some(id) => market.profile(id).await,
                None => market.my_profile().await,
            }
            .context("Failed to fetch profile")?;
            if args.json {
                return print_json(&profile);
            }
            println!("{}", profile.full_name());
            if let Some(description) = &profile.description {
                println!("{}", description);
            }
            if let Some(path) = &profile.image_path {
                println!("Avatar: {}", market.avatar_url(path));
            }
        }
        Command::Register { name, last_name } => {
            market
                .register_profile(&name, &last_name)
                .await
                .context("Failed to save profile")?;
            println!("Profile created.");
        }
        Command::Describe { text } => {
            market
                .update_description(&text)
                .await
                .context("Failed to update profile")?;
            println!("Profile updated.");
        }
        Command::Avatar { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let path = market
                .upload_avatar(bytes, file_name, None)
                .await
                .context("Failed to upload avatar")?;
            println!("Avatar uploaded: {}", market.avatar_url(&path));
        }
    }
    Ok(())
}
