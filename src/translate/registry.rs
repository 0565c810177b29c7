use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::LanguagePair;
use crate::error::AppError;

pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/argosopentech/argospm-index/main/index.json";

const PACKAGE_EXTENSION: &str = "argosmodel";

/// One entry of the package index.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    pub from_code: String,
    pub to_code: String,
    #[serde(default)]
    pub package_version: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl PackageInfo {
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.from_code, &self.to_code)
    }
}

/// An installed model package.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    pub pair: LanguagePair,
    pub version: String,
    pub path: PathBuf,
}

#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Packages the index offers for download.
    async fn available_packages(&self) -> Result<Vec<PackageInfo>, AppError>;

    /// Packages already present locally.
    async fn installed_packages(&self) -> Result<Vec<ModelHandle>, AppError>;

    async fn install(&self, package: &PackageInfo) -> Result<ModelHandle, AppError>;
}

/// Exact pair match only. A missing direction is never bridged through a
/// third language.
pub fn find_package<'a>(packages: &'a [PackageInfo], pair: &LanguagePair) -> Option<&'a PackageInfo> {
    packages
        .iter()
        .find(|p| p.from_code == pair.source && p.to_code == pair.target)
}

/// Registry backed by the Argos package index, storing downloaded archives
/// in a local models directory.
pub struct ArgosIndexRegistry {
    client: Client,
    index_url: String,
    models_dir: PathBuf,
    index: OnceCell<Vec<PackageInfo>>,
}

impl ArgosIndexRegistry {
    pub fn new(index_url: impl Into<String>, models_dir: PathBuf) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| AppError::RegistryError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            index_url: index_url.into(),
            models_dir,
            index: OnceCell::new(),
        })
    }

    async fn fetch_index(&self) -> Result<Vec<PackageInfo>, AppError> {
        tracing::info!("Updating package index from {}", self.index_url);

        let response = self
            .client
            .get(&self.index_url)
            .send()
            .await
            .map_err(|e| AppError::RegistryError(format!("Index request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::RegistryError(format!(
                "HTTP {} for {}",
                response.status(),
                self.index_url
            )));
        }

        let packages: Vec<PackageInfo> = response
            .json()
            .await
            .map_err(|e| AppError::RegistryError(format!("Invalid package index: {}", e)))?;

        tracing::info!("Package index lists {} packages", packages.len());
        Ok(packages)
    }
}

#[async_trait]
impl ModelRegistry for ArgosIndexRegistry {
    async fn available_packages(&self) -> Result<Vec<PackageInfo>, AppError> {
        // Fetched once; a failed fetch is retried on the next call.
        let index = self.index.get_or_try_init(|| self.fetch_index()).await?;
        Ok(index.clone())
    }

    async fn installed_packages(&self) -> Result<Vec<ModelHandle>, AppError> {
        let mut installed = Vec::new();

        if !self.models_dir.exists() {
            return Ok(installed);
        }

        let mut entries = tokio::fs::read_dir(&self.models_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };

            if let Some((pair, version)) = parse_package_file_name(&name) {
                installed.push(ModelHandle { pair, version, path });
            }
        }

        installed.sort_by(|a, b| a.pair.cmp(&b.pair));
        Ok(installed)
    }

    async fn install(&self, package: &PackageInfo) -> Result<ModelHandle, AppError> {
        let pair = package.pair();
        let url = package.links.first().ok_or_else(|| {
            AppError::RegistryError(format!("Package {} has no download link", pair))
        })?;

        tokio::fs::create_dir_all(&self.models_dir).await?;

        tracing::debug!("Downloading {} from {}", pair, url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::RegistryError(format!("Download of {} failed: {}", pair, e)))?;

        if !response.status().is_success() {
            return Err(AppError::RegistryError(format!(
                "HTTP {} downloading {}",
                response.status(),
                pair
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::RegistryError(format!("Download of {} failed: {}", pair, e)))?;

        let dest = self
            .models_dir
            .join(package_file_name(&pair, &package.package_version));
        write_atomically(&dest, &bytes).await?;

        tracing::info!("Installed {} ({} bytes) at {}", pair, bytes.len(), dest.display());

        Ok(ModelHandle {
            pair,
            version: package.package_version.clone(),
            path: dest,
        })
    }
}

async fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let part = dest.with_extension("part");
    tokio::fs::write(&part, bytes).await?;
    tokio::fs::rename(&part, dest).await?;
    Ok(())
}

/// `translate-en_de-1_9.argosmodel`
fn package_file_name(pair: &LanguagePair, version: &str) -> String {
    let version = if version.is_empty() { "0" } else { version };
    format!(
        "translate-{}_{}-{}.{}",
        pair.source,
        pair.target,
        version.replace('.', "_"),
        PACKAGE_EXTENSION
    )
}

fn parse_package_file_name(name: &str) -> Option<(LanguagePair, String)> {
    let stem = name
        .strip_prefix("translate-")?
        .strip_suffix(PACKAGE_EXTENSION)?
        .strip_suffix('.')?;
    let (codes, version) = stem.split_once('-')?;
    let (source, target) = codes.split_once('_')?;

    if source.is_empty() || target.is_empty() {
        return None;
    }

    Some((LanguagePair::new(source, target), version.replace('_', ".")))
}
