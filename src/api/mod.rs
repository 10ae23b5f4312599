pub mod fields;

pub use fields::{FieldError, ListingPatch, NewListing, RawFields};
