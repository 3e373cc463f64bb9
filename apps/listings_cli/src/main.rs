use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, contact_form, CurrentUser, HttpListingApi, ListingApi, LoadOutcome,
    PropertyCatalog, PropertyFilter, ReviewFormOptions, ReviewList, ReviewSummary,
    ReviewsSection, SubmitOutcome,
};
use shared::domain::{ListingType, PropertyId, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides `api_base_url` from listings.toml and the environment.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Properties {
        #[arg(long)]
        city: Option<String>,
        #[arg(long = "type")]
        property_type: Option<String>,
        #[arg(long)]
        rent: bool,
        #[arg(long)]
        sale: bool,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_bedrooms: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Reviews {
        property_id: i64,
    },
    Review {
        property_id: i64,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
    Contact {
        property_id: i64,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = client_core::config::normalize_api_base_url(&url);
    }
    settings.api_base_url()?;
    if let Some(id) = &settings.analytics_measurement_id {
        info!(measurement_id = %id, "analytics configured");
    }
    let api: Arc<dyn ListingApi> = Arc::new(
        HttpListingApi::new(&settings.api_base_url).context("failed to build api client")?,
    );

    match cli.command {
        Command::Properties {
            city,
            property_type,
            rent,
            sale,
            min_price,
            max_price,
            min_bedrooms,
            search,
            json,
        } => {
            let listing_type = match (rent, sale) {
                (true, true) => bail!("--rent and --sale are mutually exclusive"),
                (true, false) => Some(ListingType::Rent),
                (false, true) => Some(ListingType::Sale),
                (false, false) => None,
            };
            let filter = PropertyFilter {
                city,
                property_type,
                listing_type,
                min_price,
                max_price,
                min_bedrooms,
                search,
            };
            let catalog = PropertyCatalog::new(api);
            require_loaded("listings", catalog.load().await)?;
            let properties = catalog.filtered(&filter).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else {
                for property in &properties {
                    println!(
                        "#{} {} - {} ({}, {:?}) {:.0} [{} bd]",
                        property.id,
                        property.title,
                        property.city,
                        property.property_type,
                        property.listing_type,
                        property.price,
                        property.bedrooms
                    );
                }
                println!("{} listing(s)", properties.len());
            }
        }
        Command::Reviews { property_id } => {
            let list = ReviewList::new(api, PropertyId(property_id));
            require_loaded("reviews", list.load().await)?;
            let state = list.state().await;
            for review in &state.items {
                println!(
                    "{}★ {} - {}{}",
                    review.rating.stars(),
                    review.author_name,
                    review.title.as_deref().unwrap_or("(untitled)"),
                    review
                        .comment
                        .as_deref()
                        .map(|c| format!(": {c}"))
                        .unwrap_or_default()
                );
            }
            let summary = ReviewSummary::from_reviews(&state.items);
            match summary.average {
                Some(average) => println!("{} review(s), average {average:.1}", summary.count),
                None => println!("no reviews yet"),
            }
        }
        Command::Review {
            property_id,
            rating,
            title,
            comment,
            user_id,
            name,
            token,
        } => {
            let user = match (user_id, name, token) {
                (Some(user_id), Some(name), Some(token)) => {
                    Some(CurrentUser::new(UserId(user_id), name, token))
                }
                _ => None,
            };
            let section = ReviewsSection::mount(api, user, PropertyId(property_id)).await;
            let form = section.review_form(ReviewFormOptions::default());
            form.select_rating(rating).await?;
            if let Some(title) = title {
                form.set_title(title).await;
            }
            if let Some(comment) = comment {
                form.set_comment(comment).await;
            }
            match form.submit().await {
                SubmitOutcome::Succeeded(review) => {
                    println!("review #{} posted", review.id);
                    let summary = section.summary().await;
                    println!("listing now has {} review(s)", summary.count);
                }
                SubmitOutcome::LoginRequired => {
                    bail!("sign in required: pass --user-id, --name and --token")
                }
                other => return Err(outcome_error(other)),
            }
        }
        Command::Contact {
            property_id,
            full_name,
            email,
            phone,
            message,
        } => {
            let form = client_core::ContactForm::new(api, PropertyId(property_id));
            form.set_field(contact_form::FULL_NAME, full_name).await;
            form.set_field(contact_form::EMAIL, email).await;
            form.set_field(contact_form::PHONE, phone).await;
            form.set_field(contact_form::MESSAGE, message).await;
            match form.submit().await {
                SubmitOutcome::Succeeded(ack) => println!(
                    "{}",
                    ack.message
                        .unwrap_or_else(|| "message sent".to_string())
                ),
                other => return Err(outcome_error(other)),
            }
        }
    }

    Ok(())
}

/// A fetch that never landed must not read as an empty result.
fn require_loaded(what: &str, outcome: LoadOutcome) -> Result<usize> {
    match outcome {
        LoadOutcome::Loaded { count } => Ok(count),
        LoadOutcome::Failed => bail!("failed to load {what}; see the log for details"),
        LoadOutcome::Discarded | LoadOutcome::Superseded => {
            bail!("loading {what} was interrupted")
        }
    }
}

fn outcome_error<T>(outcome: SubmitOutcome<T>) -> anyhow::Error {
    match outcome {
        SubmitOutcome::Failed(message) => anyhow!(message),
        SubmitOutcome::Invalid(err) => anyhow!(err),
        SubmitOutcome::Ignored => anyhow!("submission already in progress"),
        SubmitOutcome::LoginRequired => anyhow!("sign in required"),
        SubmitOutcome::Succeeded(_) => anyhow!("unexpected success"),
    }
}
