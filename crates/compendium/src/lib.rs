//! Herosmith compendium: embedded rule content behind read-only
//! collections.
//!
//! The domain crate computes; this crate answers "what is a longsword".
//! Content loads once from the embedded JSON dataset, is indexed by id,
//! and implements the domain's [`herosmith_domain::RuleContent`] boundary.

mod collection;
mod compendium;

pub use collection::{Collection, ContentEntry};
pub use compendium::{Compendium, CompendiumError, ContentData};
