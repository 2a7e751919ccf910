//! # Lingua Common Library
//!
//! Shared code for the Lingua content services including:
//! - Learning item data model (items, exercises, modules, levels)
//! - CEFR reference wordlist loading
//! - Key/module inference and reclassification heuristics
//! - Level assignment
//! - Configuration loading
//!
//! Everything that decides *where* an item goes lives here, so the import
//! service and any dry-run preview share one implementation.

pub mod classify;
pub mod config;
pub mod error;
pub mod level;
pub mod model;
pub mod wordlist;

pub use classify::{route, RoutedItem, TensePattern};
pub use error::{Error, Result};
pub use level::assign_level;
pub use model::{
    CefrTier, Exercise, ExerciseKind, Headword, Item, Level, Module, PartitionEntry, PartitionId,
    ShadowedKeys,
};
pub use wordlist::CefrIndex;
