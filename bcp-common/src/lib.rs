//! # BCP Common Library
//!
//! Emission aggregation and uncertainty propagation shared by all BCP tools:
//! - Category taxonomies (Post / SubPost per environment)
//! - Data-quality model and uncertainty calculation
//! - Composite-input dependency filtering
//! - Result tree aggregation and re-aggregating filters
//! - Situation snapshot loading
//! - Configuration loading

pub mod config;
pub mod dependency;
pub mod emission;
pub mod error;
pub mod quality;
pub mod results;
pub mod snapshot;
pub mod taxonomy;
pub mod uncertainty;

pub use emission::{EmissionSource, EmissionSourceId, StudySite};
pub use error::{Error, Result};
pub use results::{compute_results_by_post, filter_results, AggregationOptions, LeafFilter, ResultCategory, ResultNode};
pub use taxonomy::{Environment, Post, SubPost};
