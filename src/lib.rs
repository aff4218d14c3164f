//! Client library for the Stash media server's GraphQL API.
//!
//! Two pieces do the real work: [`FragmentRegistry`] expands queries into
//! self-contained documents by resolving fragment spreads, and
//! [`matcher`] decides whether a free-text name refers to an
//! already-known catalog entity. [`StashClient`] wires both into typed
//! operations for tags, performers, studios, movies, scenes, galleries,
//! and scrapers.

pub mod client;
pub mod connection;
pub mod error;
pub mod fragments;
pub mod log;
pub mod matcher;
pub mod scrapers;
pub mod types;

mod find;
mod scenes;

pub use client::StashClient;
pub use connection::{ConnectionConfig, config_path, save_to_file};
pub use error::StashError;
pub use fragments::FragmentRegistry;
pub use matcher::{AliasMode, MatchOutcome, NamedEntity};
pub use scrapers::ScrapeKind;
pub use types::{
    FindFilter, Gallery, Movie, Performer, PhashDistance, Scene, ScrapedGallery, ScrapedMovie,
    ScrapedPerformer, ScrapedScene, ScrapedStudio, ScrapedTag, Studio, Tag,
};
