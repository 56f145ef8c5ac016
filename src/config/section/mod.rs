//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pressline.toml`:
//!
//! | Module     | TOML Section   | Purpose                                 |
//! |------------|----------------|-----------------------------------------|
//! | `build`    | `[build]`      | Paths, minification, js and css options |
//! | `cache`    | `[cache]`      | Transform cache persistence             |

pub mod build;
mod cache;

pub use build::BuildSectionConfig;
pub use cache::CacheConfig;
