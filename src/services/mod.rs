//! Services backing the launcher front end.
//!
//! - `apps` - Desktop application catalog, listing and launching

pub mod apps;
