//! Where datasets come from.
//!
//! [`DataSource`] abstracts over the supplier of records so the dashboard can
//! run against a file on disk, in-memory data, or a remote API.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::dataset::{Dataset, Format};
use crate::error::{DashboardError, Result};

/// Supplier of validated datasets.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch and validate the current records.
    async fn load(&self) -> Result<Dataset>;

    /// Short human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// Reads a JSON or YAML dataset file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: Format,
}

impl FileSource {
    /// Source for `path`, with the format taken from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path).ok_or_else(|| {
            DashboardError::Config(format!(
                "cannot tell dataset format of {} (expected .json, .yaml or .yml)",
                path.display()
            ))
        })?;
        Ok(Self { path, format })
    }

    /// Source for `path` with an explicit format.
    pub fn with_format(path: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn load(&self) -> Result<Dataset> {
        tracing::debug!(path = %self.path.display(), format = ?self.format, "Reading dataset");
        let text = tokio::fs::read_to_string(&self.path).await?;
        Dataset::parse(&text, self.format)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Serves a dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    dataset: Dataset,
}

impl StaticSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Source serving the built-in sample data.
    pub fn sample() -> Result<Self> {
        Ok(Self::new(Dataset::sample()?))
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn load(&self) -> Result<Dataset> {
        self.dataset.validate()?;
        Ok(self.dataset.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_needs_known_extension() {
        assert!(FileSource::new("/tmp/data.json").is_ok());
        assert!(matches!(
            FileSource::new("/tmp/data.txt"),
            Err(DashboardError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/nonexistent/pm-dashboard/data.json").unwrap();
        assert!(matches!(source.load().await, Err(DashboardError::Io(_))));
        assert_eq!(source.describe(), "file:/nonexistent/pm-dashboard/data.json");
    }

    #[tokio::test]
    async fn test_static_source_revalidates() {
        let source = StaticSource::sample().unwrap();
        let dataset = source.load().await.unwrap();
        assert_eq!(dataset.projects.len(), 3);

        let mut broken = dataset.clone();
        broken.projects[0].progress = 200;
        let source: Box<dyn DataSource> = Box::new(StaticSource::new(broken));
        assert!(matches!(source.load().await, Err(DashboardError::Schema(_))));
    }

    #[test]
    fn test_static_source_blocking() {
        let dataset = tokio_test::block_on(StaticSource::default().load()).unwrap();
        assert_eq!(dataset, Dataset::default());
    }
}
