use crate::infra::{parse_date, ApiContext};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use stayfinder::config::AppConfig;
use stayfinder::error::AppError;
use stayfinder::workflows::bookings::{BookingId, Reservation};
use stayfinder::workflows::catalog::{
    sort_listings, synthetic, CatalogSnapshot, Listing, ListingFilter, ListingId, SortKey,
};
use stayfinder::workflows::profiles::{NewProfile, UserId};

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Profile to rank listings for
    user_id: String,
    /// Number of listings to return (defaults to APP_RECOMMEND_TOP_N)
    #[arg(long)]
    top_n: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct AvailabilityArgs {
    /// Listing identifier
    listing_id: u64,
    /// Arrival date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    check_in: NaiveDate,
    /// Departure date (YYYY-MM-DD); that night is not occupied
    #[arg(long, value_parser = parse_date)]
    check_out: NaiveDate,
}

#[derive(Args, Debug)]
pub(crate) struct BookArgs {
    /// Guest making the booking
    #[arg(long = "user")]
    user_id: String,
    /// Listing to reserve
    #[arg(long = "listing")]
    listing_id: u64,
    /// Arrival date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    check_in: NaiveDate,
    /// Departure date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    check_out: NaiveDate,
}

#[derive(Args, Debug)]
pub(crate) struct CancelArgs {
    /// Booking number to cancel
    booking_id: u64,
    /// Guest who holds the booking
    #[arg(long = "user")]
    user_id: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct BookingsArgs {
    /// Show bookings held by this user
    #[arg(long = "user")]
    user_id: Option<String>,
    /// Show bookings on this listing
    #[arg(long = "listing")]
    listing_id: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value_t = 1)]
    group_size: u32,
    /// Preferred environment keyword, e.g. beach or city
    #[arg(long, default_value = "")]
    environment: String,
    #[arg(long)]
    budget_min: f64,
    #[arg(long)]
    budget_max: f64,
}

#[derive(Args, Debug)]
pub(crate) struct UserDeleteArgs {
    user_id: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogListArgs {
    /// Keyword matched against tags, location, and property type
    #[arg(long)]
    environment: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_accommodates: Option<u32>,
    /// Sort by price, rating, or accommodates
    #[arg(long)]
    sort: Option<SortKey>,
    /// Sort from highest to lowest
    #[arg(long)]
    descending: bool,
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct MergeSyntheticArgs {
    /// Text file holding generated output with an embedded JSON array of listings
    #[arg(long)]
    input: PathBuf,
    /// Where to write the merged catalog (defaults to the configured listings CSV)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn open_context() -> Result<(AppConfig, ApiContext), AppError> {
    let config = AppConfig::load()?;
    let context = ApiContext::open(&config.storage, &config.recommendations)?;
    Ok((config, context))
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let profile = context.require_user(&UserId(args.user_id))?;
    let catalog = context.catalog();
    let top_n = args.top_n.unwrap_or(context.default_top_n);

    println!(
        "Recommendations for {} ({}, group of {}, budget ${:.0}-${:.0})",
        profile.name,
        profile.user_id,
        profile.group_size,
        profile.budget_min,
        profile.budget_max
    );
    if profile.has_inverted_budget() {
        println!("  Budget minimum exceeds maximum; no listing can match.");
    }

    let ranked = context
        .recommender
        .explain(&profile.preference(), catalog.listings(), top_n);
    if ranked.is_empty() {
        println!("  No listings fit this budget and group size.");
        return Ok(());
    }

    for (rank, score) in ranked.iter().enumerate() {
        let Some(listing) = catalog.find(score.listing_id) else {
            continue;
        };
        println!(
            "{:>3}. {} | score {:.1} (environment {:.1}, price {:.1}, rating {:.1})",
            rank + 1,
            describe_listing(listing),
            score.total,
            score.environment,
            score.price_proximity,
            score.rating
        );
    }
    Ok(())
}

pub(crate) fn run_availability(args: AvailabilityArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let listing = context.require_listing(ListingId(args.listing_id))?;
    let available = context
        .bookings
        .is_available(listing.id, args.check_in, args.check_out)?;

    let verdict = if available { "available" } else { "booked" };
    println!(
        "{} is {} from {} to {}",
        describe_listing(&listing),
        verdict,
        args.check_in,
        args.check_out
    );
    Ok(())
}

pub(crate) fn run_book(args: BookArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let user_id = UserId(args.user_id);
    context.require_user(&user_id)?;
    let listing = context.require_listing(ListingId(args.listing_id))?;

    let reservation =
        context
            .bookings
            .create_reservation(user_id, listing.id, args.check_in, args.check_out)?;
    println!(
        "Booked {} as booking {}",
        describe_listing(&listing),
        reservation.booking_id
    );
    print_reservation(&reservation);
    Ok(())
}

pub(crate) fn run_cancel(args: CancelArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let booking_id = BookingId(args.booking_id);
    let user_id = UserId(args.user_id);

    if context.bookings.cancel_reservation(booking_id, &user_id)? {
        println!("Cancelled booking {booking_id}");
    } else {
        println!("No booking {booking_id} held by {user_id}; nothing cancelled");
    }
    Ok(())
}

pub(crate) fn run_bookings(args: BookingsArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let reservations = match (args.user_id, args.listing_id) {
        (Some(user_id), _) => {
            let user_id = UserId(user_id);
            context.require_user(&user_id)?;
            context.bookings.list_for_user(&user_id)
        }
        (None, Some(listing_id)) => {
            let listing_id = ListingId(listing_id);
            context.require_listing(listing_id)?;
            context.bookings.list_for_listing(listing_id)
        }
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "pass --user or --listing".to_string(),
            ))
        }
    };

    if reservations.is_empty() {
        println!("No bookings found");
    }
    for reservation in &reservations {
        print_reservation(reservation);
    }
    Ok(())
}

pub(crate) fn run_users_list() -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let profiles = context.profiles.list();
    if profiles.is_empty() {
        println!("No user profiles stored");
    }
    for profile in profiles {
        let environment = if profile.preferred_environment.is_empty() {
            "any"
        } else {
            profile.preferred_environment.as_str()
        };
        println!(
            "- {} {} | group {} | {} | ${:.0}-${:.0}",
            profile.user_id,
            profile.name,
            profile.group_size,
            environment,
            profile.budget_min,
            profile.budget_max
        );
    }
    Ok(())
}

pub(crate) fn run_users_create(args: UserCreateArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let profile = context.profiles.create(NewProfile {
        name: args.name,
        group_size: args.group_size,
        preferred_environment: args.environment,
        budget_min: args.budget_min,
        budget_max: args.budget_max,
    })?;
    println!("Created {} ({})", profile.user_id, profile.name);
    Ok(())
}

pub(crate) fn run_users_delete(args: UserDeleteArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let user_id = UserId(args.user_id);
    if context.profiles.delete(&user_id)? {
        println!("Deleted {user_id}");
        Ok(())
    } else {
        Err(AppError::NotFound(format!("user {user_id}")))
    }
}

pub(crate) fn run_catalog_list(args: CatalogListArgs) -> Result<(), AppError> {
    let (_, context) = open_context()?;
    let catalog = context.catalog();
    for listing in browse(&catalog, &args) {
        println!("- {}", describe_listing(listing));
    }
    Ok(())
}

pub(crate) fn run_merge_synthetic(args: MergeSyntheticArgs) -> Result<(), AppError> {
    let (config, context) = open_context()?;
    let text = std::fs::read_to_string(&args.input)?;
    let rows = synthetic::extract_listings(&text)?;

    let current = context.catalog();
    let merged = current.merged_with(rows);
    let output = args.output.unwrap_or(config.storage.listings_csv);
    merged.save(&output)?;

    println!(
        "Added {} listings; {} now holds {}",
        merged.len() - current.len(),
        output.display(),
        merged.len()
    );
    Ok(())
}

fn browse<'a>(catalog: &'a CatalogSnapshot, args: &CatalogListArgs) -> Vec<&'a Listing> {
    let filter = ListingFilter {
        environment: args.environment.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
        min_accommodates: args.min_accommodates,
    };
    let mut listings = catalog.filter(&filter);
    if let Some(key) = args.sort {
        listings = sort_listings(listings, key, !args.descending);
    }
    listings.truncate(args.limit.unwrap_or(usize::MAX));
    listings
}

pub(crate) fn describe_listing(listing: &Listing) -> String {
    format!(
        "[{}] {} ({}, {}) sleeps {} | ${:.0}/night | rated {:.1}",
        listing.id,
        listing.name,
        listing.location,
        listing.property_type,
        listing.accommodates,
        listing.price,
        listing.rating
    )
}

pub(crate) fn print_reservation(reservation: &Reservation) {
    println!(
        "  booking {} | listing {} | {} | {} to {} ({} nights)",
        reservation.booking_id,
        reservation.listing_id,
        reservation.user_id,
        reservation.check_in,
        reservation.check_out,
        reservation.nights()
    );
}
