//! `approx-sketch` provides two constant-memory probabilistic structures over
//! arbitrary strings:
//!
//! - [`CardinalityEstimator`], a HyperLogLog estimating how many distinct
//!   items were added,
//! - [`MembershipFilter`], a Bloom filter answering whether an item was
//!   possibly added or definitely not.
//!
//! Both hash their input with [`hash`] and are otherwise independent.
//! On top of the filter, [`check_uniqueness`] classifies candidate values as
//! unique, already used or invalid.
//!
//! ```
//! use approx_sketch::{check_uniqueness, SketchConfig, UniquenessStatus};
//!
//! let config = SketchConfig::default();
//!
//! let mut estimator = config.estimator().unwrap();
//! for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.1"] {
//!     estimator.add(ip);
//! }
//! assert!((estimator.count() - 2.0).abs() < 0.1);
//!
//! let mut filter = config.filter().unwrap();
//! filter.add("admin123");
//! let report = check_uniqueness(&mut filter, [Some("admin123"), Some("guest")], true);
//! assert_eq!(report.get("admin123"), Some(UniquenessStatus::AlreadyUsed));
//! assert_eq!(report.get("guest"), Some(UniquenessStatus::Unique));
//! ```
pub mod config;
pub mod error;
pub mod estimator;
pub mod filter;
pub mod hash;
pub mod uniqueness;

pub use config::SketchConfig;
pub use error::{Result, SketchError};
pub use estimator::CardinalityEstimator;
pub use filter::MembershipFilter;
pub use uniqueness::{check_uniqueness, UniquenessReport, UniquenessStatus};
