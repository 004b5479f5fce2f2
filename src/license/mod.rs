//! License resolution for SPDX output.
//!
//! - [`resolver`] — turns a reported license string into an SPDX license
//!   reference, allocating `LicenseRef-<n>` entries for non-standard ones.
//! - [`aliases`] — maps common license display names onto SPDX identifiers.

pub mod aliases;
pub mod resolver;

pub use resolver::LicenseResolver;
