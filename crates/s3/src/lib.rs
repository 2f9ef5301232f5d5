//! s3nav-s3: S3 SDK adapter for s3nav
//!
//! This crate provides the implementations of the StoreClient and
//! ArchiveBuilder traits using the aws-sdk-s3 crate. It is the only crate
//! that directly depends on the AWS SDK.

pub mod archive;
pub mod client;

pub use archive::S3ArchiveBuilder;
pub use client::{ObjectData, S3Client};
