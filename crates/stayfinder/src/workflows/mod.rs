pub mod bookings;
pub mod catalog;
pub mod favorites;
pub mod profiles;
pub mod recommendations;
