//! Bucket configuration commands
//!
//! A configured bucket is a named entry holding the bucket, its endpoint,
//! credentials and the root folder browsing is confined to.

use clap::Subcommand;
use serde::Serialize;

use s3nav_core::{BucketConfig, BucketManager, ConfigManager, Credentials, Error};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Bucket subcommands
#[derive(Subcommand, Debug)]
pub enum BucketCommands {
    /// Add or update a bucket
    Set(SetArgs),

    /// List all configured buckets
    List(ListArgs),

    /// Remove a bucket
    Remove(RemoveArgs),
}

/// Arguments for the `bucket set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Name used to refer to this bucket (e.g., "media")
    pub name: String,

    /// Bucket name in the store
    pub bucket: String,

    /// S3 endpoint URL (e.g., "http://localhost:9000"); AWS when omitted
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Region
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Access key ID
    #[arg(long, requires = "secret_key")]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, requires = "access_key")]
    pub secret_key: Option<String>,

    /// Folder browsing is confined to (e.g., "team/docs")
    #[arg(long)]
    pub root_folder: Option<String>,

    /// Bucket lookup style: auto, path, or dns
    #[arg(long, default_value = "auto")]
    pub bucket_lookup: String,
}

impl SetArgs {
    fn into_config(self) -> BucketConfig {
        let mut config = BucketConfig::new(self.name, self.bucket);
        config.endpoint = self.endpoint;
        config.region = self.region;
        config.credentials = match (self.access_key, self.secret_key) {
            (Some(access_key), Some(secret_key)) => Some(Credentials {
                access_key,
                secret_key,
            }),
            _ => None,
        };
        config.root_folder = self.root_folder;
        config.bucket_lookup = self.bucket_lookup;
        config
    }
}

/// Arguments for the `bucket list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show endpoint, region and root folder
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `bucket remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the bucket to remove
    pub name: String,
}

/// JSON output for bucket list
#[derive(Serialize)]
struct BucketListOutput {
    buckets: Vec<BucketInfo>,
}

/// Bucket information for JSON output (without credentials)
#[derive(Debug, Serialize)]
struct BucketInfo {
    name: String,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    region: String,
    root_prefix: String,
    anonymous: bool,
}

impl From<&BucketConfig> for BucketInfo {
    fn from(config: &BucketConfig) -> Self {
        Self {
            name: config.name.clone(),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
            region: config.region.clone(),
            root_prefix: config.root_prefix(),
            anonymous: config.credentials.is_none(),
        }
    }
}

/// JSON output for bucket set/remove operations
#[derive(Serialize)]
struct BucketOperationOutput {
    success: bool,
    bucket: String,
    message: String,
}

/// Execute a bucket subcommand
pub async fn execute(cmd: BucketCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ConfigManager::new() {
        Ok(config) => BucketManager::with_repository(config),
        Err(e) => return super::fail(&formatter, "Failed to load configuration", &e),
    };

    match cmd {
        BucketCommands::Set(args) => execute_set(args, &manager, &formatter),
        BucketCommands::List(args) => execute_list(args, &manager, &formatter),
        BucketCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(
    args: SetArgs,
    manager: &BucketManager<ConfigManager>,
    formatter: &Formatter,
) -> ExitCode {
    if args.name.is_empty() {
        formatter.error("Bucket name cannot be empty");
        return ExitCode::UsageError;
    }

    let name = args.name.clone();
    match manager.set(args.into_config()) {
        Ok(()) => {
            let message = format!("Bucket '{name}' configured successfully");
            if formatter.is_json() {
                formatter.json(&BucketOperationOutput {
                    success: true,
                    bucket: name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => super::fail(formatter, "Failed to save bucket", &e),
    }
}

fn execute_list(
    args: ListArgs,
    manager: &BucketManager<ConfigManager>,
    formatter: &Formatter,
) -> ExitCode {
    let buckets = match manager.list() {
        Ok(buckets) => buckets,
        Err(e) => return super::fail(formatter, "Failed to list buckets", &e),
    };

    if formatter.is_json() {
        formatter.json(&BucketListOutput {
            buckets: buckets.iter().map(BucketInfo::from).collect(),
        });
    } else if buckets.is_empty() {
        formatter.println("No buckets configured.");
    } else {
        for config in &buckets {
            let endpoint = config.endpoint.as_deref().unwrap_or("aws");
            if args.long {
                let root = config.root_prefix();
                formatter.println(&format!(
                    "{:<12} {}/{} {}",
                    config.name,
                    endpoint,
                    config.bucket,
                    formatter.dim(&format!(
                        "(region: {}, root: {}, lookup: {})",
                        config.region,
                        if root.is_empty() { "/" } else { root.as_str() },
                        config.bucket_lookup
                    ))
                ));
            } else {
                formatter.println(&format!("{:<12} {}/{}", config.name, endpoint, config.bucket));
            }
        }
    }
    ExitCode::Success
}

fn execute_remove(
    args: RemoveArgs,
    manager: &BucketManager<ConfigManager>,
    formatter: &Formatter,
) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Bucket '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&BucketOperationOutput {
                    success: true,
                    bucket: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(Error::BucketNotFound(_)) => {
            formatter.error(&format!("Bucket '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => super::fail(formatter, "Failed to remove bucket", &e),
    }
}
