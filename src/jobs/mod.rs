pub mod expiration;

pub use expiration::start_listing_expiration_sweep;
