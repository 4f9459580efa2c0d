use crate::commands::{describe_listing, print_reservation};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::io::Cursor;
use stayfinder::error::AppError;
use stayfinder::workflows::bookings::{InMemoryLedger, ReservationEngine, ReservationError};
use stayfinder::workflows::catalog::CatalogSnapshot;
use stayfinder::workflows::profiles::UserId;
use stayfinder::workflows::recommendations::{RecommendationEngine, UserPreference};

const DEMO_CATALOG: &str = "\
listing_id,name,location,property_type,accommodates,amenities,price,min_nights,max_nights,review_rating,tags
101,Shoreline Retreat,Grand Bend,Entire home,6,\"wifi,kayaks,bbq\",185,2,14,4.9,\"beach,lake,family\"
102,Dune Cottage,Sauble Beach,Cottage,4,\"wifi,fire pit\",160,2,10,4.7,\"beach,quiet\"
103,Harbourfront Loft,Toronto,Entire condo,2,\"gym,wifi\",210,1,30,4.6,\"city,nightlife\"
104,Pine Ridge Cabin,Algonquin,Cabin,4,fireplace,120,2,7,4.8,\"forest,hiking\"
105,Budget Beach Room,Wasaga Beach,Private room,2,wifi,95,1,5,not rated,
106,Maple Lane House,Stratford,Entire home,5,\"wifi,garden\",175,2,14,4.5,\"theatre,quiet\"
";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Environment keyword for the demo guest
    #[arg(long, default_value = "beach")]
    pub(crate) environment: String,
    /// Guests travelling together
    #[arg(long, default_value_t = 4)]
    pub(crate) group_size: u32,
    #[arg(long, default_value_t = 120.0)]
    pub(crate) budget_min: f64,
    #[arg(long, default_value_t = 200.0)]
    pub(crate) budget_max: f64,
    /// Arrival date for the sample booking (YYYY-MM-DD). Defaults to two weeks from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) check_in: Option<NaiveDate>,
    #[arg(long, default_value_t = 3)]
    pub(crate) nights: i64,
    #[arg(long, default_value_t = 3)]
    pub(crate) top_n: usize,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        environment,
        group_size,
        budget_min,
        budget_max,
        check_in,
        nights,
        top_n,
    } = args;

    if nights < 1 {
        return Err(AppError::InvalidRequest(
            "--nights must be at least 1".to_string(),
        ));
    }
    let check_in = check_in.unwrap_or_else(|| Local::now().date_naive() + Duration::days(14));
    let check_out = check_in + Duration::days(nights);

    let catalog = CatalogSnapshot::from_reader(Cursor::new(DEMO_CATALOG))?;
    let preference = UserPreference {
        budget_min,
        budget_max,
        group_size,
        preferred_environment: environment,
    };

    println!("StayFinder demo ({} listings in the sample catalog)", catalog.len());
    println!(
        "\nTop {} for a group of {} wanting '{}' at ${:.0}-${:.0}:",
        top_n, group_size, preference.preferred_environment, budget_min, budget_max
    );
    let engine = RecommendationEngine::default();
    let ranked = engine.explain(&preference, catalog.listings(), top_n);
    for (rank, score) in ranked.iter().enumerate() {
        if let Some(listing) = catalog.find(score.listing_id) {
            println!(
                "{:>3}. {} | score {:.1}",
                rank + 1,
                describe_listing(listing),
                score.total
            );
        }
    }

    let Some(choice) = ranked.first().and_then(|score| catalog.find(score.listing_id)) else {
        println!("  Nothing fits; widen the budget or shrink the group to continue the demo.");
        return Ok(());
    };

    let bookings = ReservationEngine::open(InMemoryLedger::default())?;
    let guest = UserId::from("demo-guest");
    let other_guest = UserId::from("demo-neighbour");

    println!("\nBooking walkthrough on listing {}", choice.id);
    println!(
        "- {} to {} available: {}",
        check_in,
        check_out,
        bookings.is_available(choice.id, check_in, check_out)?
    );

    let reservation =
        bookings.create_reservation(guest.clone(), choice.id, check_in, check_out)?;
    println!("- Reserved for {guest}:");
    print_reservation(&reservation);

    let overlap_start = check_out - Duration::days(1);
    match bookings.create_reservation(
        other_guest.clone(),
        choice.id,
        overlap_start,
        overlap_start + Duration::days(2),
    ) {
        Ok(_) => println!("- Unexpected: overlapping stay was accepted"),
        Err(ReservationError::BookingConflict { conflicting, .. }) => println!(
            "- Overlapping request from {other_guest} refused (held by booking {conflicting})"
        ),
        Err(err) => return Err(err.into()),
    }

    let follow_on = bookings.create_reservation(
        other_guest.clone(),
        choice.id,
        check_out,
        check_out + Duration::days(2),
    )?;
    println!("- Arrival on the check-out day is allowed:");
    print_reservation(&follow_on);

    println!(
        "- Cancel booking {} as {}: {}",
        reservation.booking_id,
        other_guest,
        bookings.cancel_reservation(reservation.booking_id, &other_guest)?
    );
    println!(
        "- Cancel booking {} as {}: {}",
        reservation.booking_id,
        guest,
        bookings.cancel_reservation(reservation.booking_id, &guest)?
    );
    println!(
        "- {} to {} available again: {}",
        check_in,
        check_out,
        bookings.is_available(choice.id, check_in, check_out)?
    );

    Ok(())
}
