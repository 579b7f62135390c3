//! Faultline Detector - Finds failure modes in executed scenario batches
//!
//! This crate provides:
//! - A standardized feature matrix built from execution results
//! - Global (isolation forest) and local (LOF) anomaly detection
//! - DBSCAN clustering of failing scenarios
//! - Perturbation-based instability testing
//! - Impact ranking of anomalous edge cases

pub mod algorithms;
pub mod anomaly;
pub mod clustering;
pub mod config;
pub mod detection;
pub mod detector;
pub mod edge_cases;
pub mod error;
pub mod instability;
pub mod matrix;

pub use algorithms::{Clusterer, Dbscan, IsolationForest, LocalOutlierFactor, OutlierScorer};
pub use anomaly::AnomalyResult;
pub use clustering::{ClusteringResult, FailureCluster, FailurePredicate};
pub use config::DetectorConfig;
pub use detection::{ClusterSummary, Detection, DetectionReport, DetectionSummary};
pub use detector::FailureDetector;
pub use edge_cases::EdgeCase;
pub use error::{DetectorError, Result};
pub use instability::{
    InstabilityAnalysis, InstabilityFinding, InstabilityReport, MagnitudeSweep, ProbeSettings,
    SweepPoint,
};
pub use matrix::FeatureMatrix;
