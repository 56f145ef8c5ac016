//! Shared helpers: markup scanning, paths, pluralization.

pub mod html;
pub mod path;
mod plural;

pub use plural::plural_count;
