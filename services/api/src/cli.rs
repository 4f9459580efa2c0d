use crate::commands::{
    run_availability, run_book, run_bookings, run_cancel, run_catalog_list, run_merge_synthetic,
    run_recommend, run_users_create, run_users_delete, run_users_list, AvailabilityArgs,
    BookArgs, BookingsArgs, CancelArgs, CatalogListArgs, MergeSyntheticArgs, RecommendArgs,
    UserCreateArgs, UserDeleteArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use stayfinder::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "StayFinder",
    about = "Browse listings, rank recommendations, and manage bookings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank listings for a stored user profile
    Recommend(RecommendArgs),
    /// Check whether a listing is free for a stay
    Availability(AvailabilityArgs),
    /// Reserve a listing for a stay
    Book(BookArgs),
    /// Cancel a booking held by a user
    Cancel(CancelArgs),
    /// List bookings for a user or a listing
    Bookings(BookingsArgs),
    /// Manage user profiles
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Browse or extend the listing catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Run an offline walkthrough against a built-in catalog
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// List stored profiles
    List,
    /// Create a profile
    Create(UserCreateArgs),
    /// Delete a profile
    Delete(UserDeleteArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Filter and sort catalog listings
    List(CatalogListArgs),
    /// Merge listings recovered from generated text into the catalog CSV
    MergeSynthetic(MergeSyntheticArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::Availability(args) => run_availability(args),
        Command::Book(args) => run_book(args),
        Command::Cancel(args) => run_cancel(args),
        Command::Bookings(args) => run_bookings(args),
        Command::Users { command } => match command {
            UsersCommand::List => run_users_list(),
            UsersCommand::Create(args) => run_users_create(args),
            UsersCommand::Delete(args) => run_users_delete(args),
        },
        Command::Catalog { command } => match command {
            CatalogCommand::List(args) => run_catalog_list(args),
            CatalogCommand::MergeSynthetic(args) => run_merge_synthetic(args),
        },
        Command::Demo(args) => run_demo(args),
    }
}
