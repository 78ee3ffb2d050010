//! Centralized logic for initializing http clients to
//! ensure uniform configuration.

use std::time::Duration;

use crate::errors::DistResult;
use axoasset::reqwest;

/// How long we wait on raw.githubusercontent.com before giving up
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for http clients
///
/// Any settings that should apply to all http requests should
/// be stored here, to avoid different configurations.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientSettings {
    /// Create new ClientSettings using all necessary values
    pub fn new() -> Self {
        Self::default()
    }
}

fn create_reqwest_client(settings: &ClientSettings) -> DistResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("binfetch/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.timeout)
        .build()?;
    Ok(client)
}

/// Create an AxoClient
///
/// Ideally this should be called only once and reused!
pub fn create_axoasset_client(settings: &ClientSettings) -> DistResult<axoasset::AxoClient> {
    let client = create_reqwest_client(settings)?;
    Ok(axoasset::AxoClient::with_reqwest(client))
}
