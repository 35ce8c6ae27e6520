//! Domain input types and errors.
//!
//! These are the already-fetched, read-only facts the generators consume:
//! the company profile, the period under escrituração, and the fiscal
//! document collections. The generators never mutate them.

mod error;
mod types;

pub use error::*;
pub use types::*;
