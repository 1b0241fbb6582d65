use candid::Principal;

use crate::config::Network;
use crate::error::ClientError;

/// Identity provider endpoint on mainnet.
const MAINNET_PROVIDER_URL: &str = "https://identity.ic0.app";

/// Browser family the interactive login flow will open.
///
/// Safari refuses third-party storage on `*.localhost` subdomains, which
/// breaks the subdomain form of the local provider URL, so Safari gets the
/// query-parameter form instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Safari,
    Other,
}

impl Browser {
    /// Sniff the browser the system will open links with: an explicit
    /// `BROWSER` variable wins, otherwise the platform default.
    pub fn detect() -> Self {
        match std::env::var("BROWSER") {
            Ok(browser) if browser.to_ascii_lowercase().contains("safari") => Browser::Safari,
            Ok(_) => Browser::Other,
            Err(_) if cfg!(target_os = "macos") => Browser::Safari,
            Err(_) => Browser::Other,
        }
    }
}

/// Identity provider endpoint for the given network target and browser.
pub fn identity_provider_url(
    network: Network,
    identity_provider: Option<Principal>,
    browser: Browser,
) -> Result<String, ClientError> {
    match network {
        Network::Ic => Ok(MAINNET_PROVIDER_URL.to_string()),
        Network::Local { port } => {
            let canister_id = identity_provider.ok_or_else(|| {
                ClientError::Validation(
                    "CANISTER_ID_INTERNET_IDENTITY is required on a local network".to_string(),
                )
            })?;
            let url = match browser {
                Browser::Safari => format!("http://localhost:{port}/?canisterId={canister_id}"),
                Browser::Other => format!("http://{canister_id}.localhost:{port}"),
            };
            Ok(url)
        }
    }
}
