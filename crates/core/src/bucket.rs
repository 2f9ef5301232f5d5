//! Bucket configuration management
//!
//! A bucket config is a named reference to one bucket on an S3-compatible
//! endpoint, with optional credentials and an optional root folder that scopes
//! every browsing session opened on it.

use serde::{Deserialize, Serialize};

use crate::config::BucketRepository;
use crate::error::{Error, Result};
use crate::path::normalize_root;

/// Static access credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,
}

/// A configured bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Unique name for this config
    pub name: String,

    /// Bucket name on the endpoint
    pub bucket: String,

    /// S3 endpoint URL; the SDK default endpoint is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Credentials; anonymous access when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Folder the session is scoped to; root access when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,

    /// Bucket lookup style: "auto", "path", or "dns"
    #[serde(default = "default_bucket_lookup")]
    pub bucket_lookup: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket_lookup() -> String {
    "auto".to_string()
}

impl BucketConfig {
    /// Create a new bucket config with required fields
    pub fn new(name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: bucket.into(),
            endpoint: None,
            region: default_region(),
            credentials: None,
            root_folder: None,
            bucket_lookup: default_bucket_lookup(),
        }
    }

    /// Root prefix every session on this bucket starts from
    pub fn root_prefix(&self) -> String {
        normalize_root(self.root_folder.as_deref())
    }

    /// Check the fields a session depends on
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("Bucket config name cannot be empty".into()));
        }
        if self.bucket.is_empty() {
            return Err(Error::Config("Bucket name cannot be empty".into()));
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }
        if !matches!(self.bucket_lookup.as_str(), "auto" | "path" | "dns") {
            return Err(Error::Config(
                "Bucket lookup must be 'auto', 'path', or 'dns'".into(),
            ));
        }
        Ok(())
    }
}

/// Manager for bucket config operations
pub struct BucketManager<R> {
    repository: R,
}

impl<R: BucketRepository> BucketManager<R> {
    /// Create a manager on top of a repository
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }

    /// List all configured buckets
    pub fn list(&self) -> Result<Vec<BucketConfig>> {
        Ok(self.repository.load()?.buckets)
    }

    /// Get a bucket config by name
    pub fn get(&self, name: &str) -> Result<BucketConfig> {
        self.repository
            .load()?
            .buckets
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::BucketNotFound(name.to_string()))
    }

    /// Add or update a bucket config
    pub fn set(&self, bucket: BucketConfig) -> Result<()> {
        bucket.validate()?;
        let mut config = self.repository.load()?;

        config.buckets.retain(|b| b.name != bucket.name);
        config.buckets.push(bucket);

        self.repository.save(&config)
    }

    /// Remove a bucket config
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.repository.load()?;
        let original_len = config.buckets.len();

        config.buckets.retain(|b| b.name != name);

        if config.buckets.len() == original_len {
            return Err(Error::BucketNotFound(name.to_string()));
        }

        self.repository.save(&config)
    }

    /// Check if a bucket config exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.repository.load()?.buckets.iter().any(|b| b.name == name))
    }

    /// Default page size from the loaded configuration
    pub fn default_page_size(&self) -> Result<crate::pipeline::PageSize> {
        Ok(self.repository.load()?.defaults.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryRepository;

    fn manager() -> BucketManager<MemoryRepository> {
        BucketManager::with_repository(MemoryRepository::default())
    }

    #[test]
    fn test_bucket_config_new() {
        let bucket = BucketConfig::new("photos", "my-photos");
        assert_eq!(bucket.name, "photos");
        assert_eq!(bucket.bucket, "my-photos");
        assert_eq!(bucket.region, "us-east-1");
        assert_eq!(bucket.bucket_lookup, "auto");
        assert!(bucket.credentials.is_none());
        assert_eq!(bucket.root_prefix(), "");
    }

    #[test]
    fn test_root_prefix_is_normalized() {
        let mut bucket = BucketConfig::new("photos", "my-photos");
        bucket.root_folder = Some("/2024".into());
        assert_eq!(bucket.root_prefix(), "2024/");
    }

    #[test]
    fn test_validate() {
        let mut bucket = BucketConfig::new("photos", "my-photos");
        assert!(bucket.validate().is_ok());

        bucket.endpoint = Some("not a url".into());
        assert!(matches!(bucket.validate(), Err(Error::InvalidUrl(_))));

        bucket.endpoint = Some("http://localhost:9000".into());
        bucket.bucket_lookup = "sideways".into();
        assert!(matches!(bucket.validate(), Err(Error::Config(_))));

        let empty = BucketConfig::new("photos", "");
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_manager_set_and_get() {
        let manager = manager();
        manager.set(BucketConfig::new("photos", "my-photos")).unwrap();

        let bucket = manager.get("photos").unwrap();
        assert_eq!(bucket.bucket, "my-photos");
        assert!(manager.exists("photos").unwrap());
    }

    #[test]
    fn test_manager_update_existing() {
        let manager = manager();
        manager.set(BucketConfig::new("photos", "old")).unwrap();
        manager.set(BucketConfig::new("photos", "new")).unwrap();

        let buckets = manager.list().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket, "new");
    }

    #[test]
    fn test_manager_remove() {
        let manager = manager();
        manager.set(BucketConfig::new("photos", "my-photos")).unwrap();
        manager.remove("photos").unwrap();
        assert!(!manager.exists("photos").unwrap());

        let result = manager.remove("photos");
        assert!(matches!(result, Err(Error::BucketNotFound(_))));
    }

    #[test]
    fn test_manager_get_not_found() {
        let result = manager().get("nonexistent");
        assert!(matches!(result, Err(Error::BucketNotFound(_))));
    }

    #[test]
    fn test_manager_rejects_invalid() {
        let result = manager().set(BucketConfig::new("", "b"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
