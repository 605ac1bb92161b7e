//! # API Module
//!
//! HTTP client for the VibeGuard scanning service.
//!
//! - [`client`] - Core HTTP client and error types
//! - [`scans`] - Scan endpoints, wire types and the [`ScanService`] trait

pub mod client;
pub mod scans;

pub use client::{ApiClient, ApiError};
pub use scans::{
    ArchiveUpload, IssueResponse, ScanResponse, ScanService, ScanSummaryResponse,
    SnippetScanRequest,
};
