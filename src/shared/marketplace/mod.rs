//! Marketplace Module
//!
//! Listings that users put up for sale and buy from each other.

pub mod listing;

pub use listing::{Listing, NewListing};
