//! Minutecast Core: minute bars in, labeled feature table out.
//!
//! This crate contains:
//! - Domain types (minute bars) and series validation
//! - Feature columns over explicit windowed scans
//! - The forward-return label
//! - FeatureBuilder and the columnar FeatureTable
//! - Bar ingestion from Parquet/CSV and dataset fingerprinting

pub mod builder;
pub mod config;
pub mod data;
pub mod domain;
pub mod features;
pub mod fingerprint;
pub mod label;
pub mod table;

pub use builder::FeatureBuilder;
pub use config::{ConfigError, FeatureConfig, OpenReturnsPolicy, SessionConfig, ZeroCountPolicy};
pub use domain::{Bar, BarError};
pub use table::{FeatureRow, FeatureTable, TableError, TARGET_COLUMN};
