mod auth;
mod provider;

use candid::Principal;
use ic_agent::Agent;
use tokio::sync::watch;

pub use self::auth::{AuthClient, LoginRequest, StoredAuthClient};
pub use self::provider::{Browser, identity_provider_url};
use crate::config::Config;
use crate::error::ClientError;

/// Login state plus the identity-bound communication handle.
#[derive(Clone)]
pub struct Session {
    pub is_authenticated: bool,
    pub principal: Principal,
    /// Identity-bound agent; present only while authenticated.
    pub agent: Option<Agent>,
}

impl Session {
    fn logged_out() -> Self {
        Self {
            is_authenticated: false,
            principal: Principal::anonymous(),
            agent: None,
        }
    }
}

/// Tracks login state and derives the communication handle bound to the
/// current identity. Every state change is published on a watch channel so
/// interested workflows can refresh per change.
pub struct SessionManager<A: AuthClient> {
    auth: A,
    config: Config,
    state: watch::Sender<Session>,
}

impl<A: AuthClient> SessionManager<A> {
    pub fn new(config: Config, auth: A) -> Self {
        let (state, _) = watch::channel(Session::logged_out());
        Self { auth, config, state }
    }

    /// Probe the authentication collaborator and converge to a definite
    /// login state.
    ///
    /// A handle built against a local target fetches the root key before it
    /// is handed out; mainnet skips that step.
    pub async fn initialize(&mut self) -> Result<Session, ClientError> {
        let session = if self.auth.is_authenticated() {
            let agent = Agent::builder()
                .with_url(self.config.agent_host())
                .with_arc_identity(self.auth.identity())
                .build()
                .map_err(ClientError::from_agent)?;
            if self.config.network.is_local() {
                agent.fetch_root_key().await.map_err(ClientError::from_agent)?;
            }
            Session {
                is_authenticated: true,
                principal: self.auth.principal(),
                agent: Some(agent),
            }
        } else {
            Session::logged_out()
        };

        log::debug!("session initialized; principal {}", session.principal);
        self.state.send_replace(session.clone());
        Ok(session)
    }

    /// Current session value.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identity provider endpoint `login` will drive, for surfacing to the
    /// user before the interactive flow starts.
    pub fn provider_url(&self, browser: Browser) -> Result<String, ClientError> {
        identity_provider_url(
            self.config.network,
            self.config.identity_provider_canister_id,
            browser,
        )
    }

    /// Run the interactive login flow, then re-initialize so identity and
    /// handle reflect the new session.
    pub async fn login(&mut self, browser: Browser) -> Result<Session, ClientError> {
        let identity_provider = self.provider_url(browser)?;
        self.auth.login(LoginRequest { identity_provider }).await?;
        self.initialize().await
    }

    /// Clear the held session and re-initialize. A no-op when already
    /// logged out.
    pub async fn logout(&mut self) -> Result<Session, ClientError> {
        self.auth.logout().await?;
        self.initialize().await
    }
}

#[cfg(test)]
mod test {

    use std::sync::Arc;

    use ic_agent::Identity;
    use ic_agent::identity::AnonymousIdentity;

    use super::*;
    use crate::config::Network;

    struct MockAuthClient {
        authenticated: bool,
        principal: Principal,
    }

    impl MockAuthClient {
        fn logged_out() -> Self {
            Self {
                authenticated: false,
                principal: Principal::from_slice(&[2; 29]),
            }
        }
    }

    impl AuthClient for MockAuthClient {
        fn is_authenticated(&self) -> bool {
            self.authenticated
        }

        fn principal(&self) -> Principal {
            if self.authenticated {
                self.principal
            } else {
                Principal::anonymous()
            }
        }

        fn identity(&self) -> Arc<dyn Identity> {
            Arc::new(AnonymousIdentity)
        }

        async fn login(&mut self, _request: LoginRequest) -> Result<(), ClientError> {
            self.authenticated = true;
            Ok(())
        }

        async fn logout(&mut self) -> Result<(), ClientError> {
            self.authenticated = false;
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            network: Network::Ic,
            store_canister_id: Principal::from_slice(&[1; 29]),
            identity_provider_canister_id: None,
            identity_pem: None,
            state_dir: std::env::temp_dir(),
        }
    }

    #[tokio::test]
    async fn test_should_initialize_to_logged_out() {
        let mut manager = SessionManager::new(config(), MockAuthClient::logged_out());
        let session = manager.initialize().await.expect("initialize");

        assert!(!session.is_authenticated);
        assert_eq!(session.principal, Principal::anonymous());
        assert!(session.agent.is_none());
    }

    #[tokio::test]
    async fn test_should_login_and_derive_agent() {
        let mut manager = SessionManager::new(config(), MockAuthClient::logged_out());
        manager.initialize().await.expect("initialize");

        let session = manager.login(Browser::Other).await.expect("login");

        assert!(session.is_authenticated);
        assert_eq!(session.principal, Principal::from_slice(&[2; 29]));
        assert!(session.agent.is_some());
    }

    #[tokio::test]
    async fn test_should_logout_and_drop_agent() {
        let mut manager = SessionManager::new(config(), MockAuthClient::logged_out());
        manager.initialize().await.expect("initialize");
        manager.login(Browser::Other).await.expect("login");

        let session = manager.logout().await.expect("logout");

        assert!(!session.is_authenticated);
        assert!(session.agent.is_none());

        // logging out again stays a quiet no-op
        let session = manager.logout().await.expect("second logout");
        assert!(!session.is_authenticated);
    }

    #[tokio::test]
    async fn test_should_publish_session_changes() {
        let mut manager = SessionManager::new(config(), MockAuthClient::logged_out());
        let receiver = manager.subscribe();
        manager.initialize().await.expect("initialize");

        manager.login(Browser::Other).await.expect("login");
        assert!(receiver.borrow().is_authenticated);

        manager.logout().await.expect("logout");
        assert!(!receiver.borrow().is_authenticated);
    }
}
