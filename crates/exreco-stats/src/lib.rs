//! Statistical summaries for the exreco workspace.
//!
//! The genetic algorithm reports per-generation fitness distributions and uses the
//! population fitness variance as one of its early-stopping criteria. This crate keeps
//! those computations in one place.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing a set of `f32` values
//!
//! # Examples
//!
//! ```
//! use exreco_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [0.25, 0.5, 0.75];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.count, 3);
//! assert_eq!(stats.mean, 0.5);
//! ```

pub mod descriptive;
