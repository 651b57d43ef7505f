//! File actions module.
//!
//! This module provides the deletion executor that removes duplicate files
//! from disk while keeping the live [`crate::review::MatchSet`] consistent:
//! - Single deletion of one side of one match
//! - Bulk deletion of one side across the whole set
//! - Recoverable (trash) or permanent deletion modes

pub mod delete;

pub use delete::{
    DeleteError, DeleteExecutor, DeleteMode, DeleteResult, Side, SideDeleteSummary,
};
