//! Wiring of the cache and coordinator against the HTTP gateway.

use std::sync::Arc;

use trove_config::ClientConfig;

use crate::api::{GatewayBuildError, HttpGateway};
use crate::commit::{CommitPolicy, ListingCommitCoordinator};
use crate::media::{MediaCache, StalenessRegistry};

/// Everything a surface needs, sharing one gateway and one staleness
/// registry so that commits refresh bound photos.
#[derive(Debug, Clone)]
pub struct ClientServices {
    pub gateway: Arc<HttpGateway>,
    pub tokens: StalenessRegistry,
    pub media: MediaCache,
    pub commits: ListingCommitCoordinator,
}

impl ClientServices {
    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayBuildError> {
        let gateway = Arc::new(HttpGateway::new(&config.api)?);
        let tokens = StalenessRegistry::new();
        let media = MediaCache::with_config(gateway.clone(), tokens.clone(), &config.media);
        let commits =
            ListingCommitCoordinator::new(gateway.clone(), gateway.clone(), tokens.clone())
                .with_policy(CommitPolicy::from(&config.commit));

        Ok(Self {
            gateway,
            tokens,
            media,
            commits,
        })
    }
}
