pub mod booking;
pub mod event;
pub mod user;
pub mod venue;

pub use booking::{Booking, BookingStatus};
pub use event::BookingEvent;
pub use user::User;
pub use venue::Venue;
