//! Post-export summaries.
//!
//! - [`terminal`] — colored summary of the written document; respects `--verbose` / `--quiet`.

pub mod terminal;
