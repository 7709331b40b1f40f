pub mod date_parser;
pub mod frequency;
pub mod listing;
pub mod utils;

pub use frequency::FrequencyTable;
pub use listing::{load_listings, read_listings, Listing, ListingColumns};
