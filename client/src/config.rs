use std::path::PathBuf;

use candid::Principal;

use crate::error::ClientError;

const ENV_NETWORK: &str = "DFX_NETWORK";
const ENV_STORE_CANISTER_ID: &str = "CANISTER_ID";
const ENV_II_CANISTER_ID: &str = "CANISTER_ID_INTERNET_IDENTITY";
const ENV_LOCAL_PORT: &str = "DFX_PORT";
const ENV_STATE_DIR: &str = "FILESTORE_STATE_DIR";
const ENV_IDENTITY_PEM: &str = "FILESTORE_IDENTITY_PEM";

/// Port a local replica listens on unless overridden.
pub const DEFAULT_LOCAL_PORT: u16 = 4943;

/// Network target the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Local development replica.
    Local { port: u16 },
    /// Mainnet.
    Ic,
}

impl Network {
    pub fn is_local(&self) -> bool {
        matches!(self, Network::Local { .. })
    }
}

/// Startup configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    /// Canister id of the shared asset store.
    pub store_canister_id: Principal,
    /// Canister id of the identity provider; only used to build local
    /// provider URLs.
    pub identity_provider_canister_id: Option<Principal>,
    /// Key-file identity for local development; skips the interactive flow.
    pub identity_pem: Option<PathBuf>,
    /// Directory session state is persisted under.
    pub state_dir: PathBuf,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = match lookup(ENV_NETWORK).as_deref() {
            Some("ic") => Network::Ic,
            _ => {
                let port = match lookup(ENV_LOCAL_PORT) {
                    Some(raw) => raw.parse::<u16>().map_err(|_| {
                        ClientError::Validation(format!(
                            "{ENV_LOCAL_PORT} must be a port number, got {raw}"
                        ))
                    })?,
                    None => DEFAULT_LOCAL_PORT,
                };
                Network::Local { port }
            }
        };

        let store_canister_id = match lookup(ENV_STORE_CANISTER_ID) {
            Some(raw) => parse_principal(ENV_STORE_CANISTER_ID, &raw)?,
            None => {
                return Err(ClientError::Validation(format!(
                    "{ENV_STORE_CANISTER_ID} is not set"
                )));
            }
        };
        let identity_provider_canister_id = match lookup(ENV_II_CANISTER_ID) {
            Some(raw) => Some(parse_principal(ENV_II_CANISTER_ID, &raw)?),
            None => None,
        };

        let identity_pem = lookup(ENV_IDENTITY_PEM).map(PathBuf::from);
        let state_dir = match lookup(ENV_STATE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ic-filestore"),
        };

        Ok(Self {
            network,
            store_canister_id,
            identity_provider_canister_id,
            identity_pem,
            state_dir,
        })
    }

    /// Gateway URL the communication handle is built against.
    pub fn agent_host(&self) -> String {
        match self.network {
            Network::Local { port } => format!("http://127.0.0.1:{port}"),
            Network::Ic => "https://ic0.app".to_string(),
        }
    }

    /// Stable URL the asset behind `key` is served at.
    pub fn asset_url(&self, key: &str) -> String {
        match self.network {
            Network::Local { port } => format!(
                "http://127.0.0.1:{port}{key}?canisterId={}",
                self.store_canister_id
            ),
            Network::Ic => format!("https://{}.icp0.io{key}", self.store_canister_id),
        }
    }
}

fn parse_principal(name: &str, raw: &str) -> Result<Principal, ClientError> {
    Principal::from_text(raw)
        .map_err(|error| ClientError::Validation(format!("{name} is not a valid principal: {error}")))
}

#[cfg(test)]
mod test {

    use std::collections::HashMap;

    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| vars.get(name).map(|value| value.to_string())
    }

    fn store_id() -> String {
        Principal::from_slice(&[1; 29]).to_text()
    }

    #[test]
    fn test_should_default_to_local_network() {
        let store = store_id();
        let config = Config::from_lookup(lookup(&[("CANISTER_ID", &store)])).expect("config");

        assert_eq!(
            config.network,
            Network::Local {
                port: DEFAULT_LOCAL_PORT
            }
        );
        assert!(config.network.is_local());
        assert_eq!(config.store_canister_id.to_text(), store);
    }

    #[test]
    fn test_should_select_mainnet() {
        let store = store_id();
        let config =
            Config::from_lookup(lookup(&[("DFX_NETWORK", "ic"), ("CANISTER_ID", &store)]))
                .expect("config");

        assert_eq!(config.network, Network::Ic);
        assert!(!config.network.is_local());
        assert_eq!(config.agent_host(), "https://ic0.app");
    }

    #[test]
    fn test_should_read_local_port_override() {
        let store = store_id();
        let config = Config::from_lookup(lookup(&[
            ("CANISTER_ID", &store),
            ("DFX_PORT", "8000"),
        ]))
        .expect("config");

        assert_eq!(config.network, Network::Local { port: 8000 });
        assert_eq!(config.agent_host(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_should_fail_without_store_canister_id() {
        let result = Config::from_lookup(lookup(&[]));

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_should_fail_on_invalid_principal() {
        let result = Config::from_lookup(lookup(&[("CANISTER_ID", "not a principal")]));

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_should_build_asset_urls_per_network() {
        let store = store_id();
        let local =
            Config::from_lookup(lookup(&[("CANISTER_ID", &store)])).expect("config");
        let mainnet =
            Config::from_lookup(lookup(&[("DFX_NETWORK", "ic"), ("CANISTER_ID", &store)]))
                .expect("config");

        let key = format!("/uploads/{}/1-a.txt", Principal::anonymous());
        assert_eq!(
            local.asset_url(&key),
            format!("http://127.0.0.1:4943{key}?canisterId={store}")
        );
        assert_eq!(
            mainnet.asset_url(&key),
            format!("https://{store}.icp0.io{key}")
        );
    }
}
