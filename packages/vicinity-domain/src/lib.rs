pub mod aggregate;
pub mod gate;
pub mod geo;
pub mod item;
pub mod records;
pub mod throttle;

mod error;

pub use error::{Error, Result};

/// Upper bound on ranked items per query and on history records per listing.
pub const TOP_K: usize = 25;
