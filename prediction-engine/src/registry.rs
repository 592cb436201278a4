use crate::bundle::ModelBundle;
use rcc_core::{ModelError, PredictionError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Read-only set of community bundles, built once at startup and shared by
/// every prediction.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    communities: Vec<String>,
    bundles: HashMap<String, ModelBundle>,
}

impl ModelRegistry {
    /// Validates every bundle. Communities listed without a bundle are
    /// kept; predicting for them fails with `UnknownCommunity`.
    pub fn new(
        communities: Vec<String>,
        bundles: HashMap<String, ModelBundle>,
    ) -> Result<Self, ModelError> {
        for (community, bundle) in &bundles {
            bundle.validate(community)?;
        }
        for community in &communities {
            if !bundles.contains_key(community) {
                warn!("No model bundle for listed community r/{}", community);
            }
        }
        Ok(Self {
            communities,
            bundles,
        })
    }

    pub fn load(subreddits_path: &Path, models_path: &Path) -> Result<Self, ModelError> {
        let communities: Vec<String> = read_artifact(subreddits_path)?;
        let bundles: HashMap<String, ModelBundle> = read_artifact(models_path)?;
        let registry = Self::new(communities, bundles)?;
        info!(
            "Loaded {} model bundles for {} communities",
            registry.bundles.len(),
            registry.communities.len()
        );
        Ok(registry)
    }

    pub fn communities(&self) -> &[String] {
        &self.communities
    }

    pub fn bundle(&self, community: &str) -> Result<&ModelBundle, PredictionError> {
        self.bundles
            .get(community)
            .ok_or_else(|| PredictionError::UnknownCommunity {
                community: community.to_string(),
            })
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let contents = std::fs::read_to_string(path).map_err(|_| ModelError::ArtifactNotFound {
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| ModelError::InvalidArtifact {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}
