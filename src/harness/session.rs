//! One-time construction of the service handles.

use super::HarnessError;
use crate::account::Account;
use crate::config::ClientConfig;
use crate::core::Client;
use crate::AppwriteApp;
use crate::databases::Databases;
use crate::functions::Functions;
use crate::locale::Locale;
use crate::realtime::{Realtime, Subscription};
use crate::storage::Storage;
use crate::teams::Teams;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Account,
    Storage,
    Documents,
    Functions,
    Teams,
    Locale,
    Realtime,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceKind::Account => "account",
            ServiceKind::Storage => "storage",
            ServiceKind::Documents => "documents",
            ServiceKind::Functions => "functions",
            ServiceKind::Teams => "teams",
            ServiceKind::Locale => "locale",
            ServiceKind::Realtime => "realtime",
        })
    }
}

/// Every service client, sharing one [`Client`] (and so one session cookie jar).
#[derive(Clone)]
pub struct Services {
    pub client: Client,
    pub account: Account,
    pub databases: Databases,
    pub storage: Storage,
    pub functions: Functions,
    pub teams: Teams,
    pub locale: Locale,
    pub realtime: Realtime,
}

impl Services {
    pub fn new(app: &AppwriteApp) -> Self {
        Self {
            client: app.client().clone(),
            account: app.account(),
            databases: app.databases(),
            storage: app.storage(),
            functions: app.functions(),
            teams: app.teams(),
            locale: app.locale(),
            realtime: app.realtime(),
        }
    }
}

/// A single service picked by [`Session::service_for`].
#[derive(Clone)]
pub enum ServiceHandle {
    Account(Account),
    Storage(Storage),
    Documents(Databases),
    Functions(Functions),
    Teams(Teams),
    Locale(Locale),
    Realtime(Realtime),
}

impl ServiceHandle {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceHandle::Account(_) => ServiceKind::Account,
            ServiceHandle::Storage(_) => ServiceKind::Storage,
            ServiceHandle::Documents(_) => ServiceKind::Documents,
            ServiceHandle::Functions(_) => ServiceKind::Functions,
            ServiceHandle::Teams(_) => ServiceKind::Teams,
            ServiceHandle::Locale(_) => ServiceKind::Locale,
            ServiceHandle::Realtime(_) => ServiceKind::Realtime,
        }
    }
}

/// Snapshot of the realtime subscription owned by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub channels: Vec<String>,
    pub connected: bool,
}

/// Owns the service handles and the realtime subscription.
///
/// `Uninitialized -> Initializing -> Ready | Failed`; both end states are final. Dropping the
/// session drops the subscription, which unsubscribes.
pub struct Session {
    state: Mutex<SessionState>,
    services: OnceCell<Result<Services, HarnessError>>,
    subscription: Mutex<Option<Subscription>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialized),
            services: OnceCell::new(),
            subscription: Mutex::new(None),
        }
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Builds every service handle from `config`.
    ///
    /// Only the first call does any work; later and concurrent calls get the same result,
    /// including a stored failure.
    pub async fn initialize(&self, config: &ClientConfig) -> Result<(), HarnessError> {
        let result = self
            .services
            .get_or_init(|| async {
                self.set_state(SessionState::Initializing);
                let result = AppwriteApp::new(config)
                    .map(|app| Services::new(&app))
                    .map_err(|e| HarnessError::InitializationError(e.to_string()));
                match &result {
                    Ok(services) => {
                        tracing::info!(
                            endpoint = services.client.endpoint(),
                            project = services.client.project_id(),
                            "session ready"
                        );
                        self.set_state(SessionState::Ready);
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "session initialization failed");
                        self.set_state(SessionState::Failed);
                    }
                }
                result
            })
            .await;
        result.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    /// The service bundle, once initialization succeeded.
    pub fn services(&self) -> Option<&Services> {
        match self.services.get() {
            Some(Ok(services)) => Some(services),
            _ => None,
        }
    }

    pub fn service_for(&self, kind: ServiceKind) -> Result<ServiceHandle, HarnessError> {
        let services = self.services().ok_or(HarnessError::NotInitialized(kind))?;
        Ok(match kind {
            ServiceKind::Account => ServiceHandle::Account(services.account.clone()),
            ServiceKind::Storage => ServiceHandle::Storage(services.storage.clone()),
            ServiceKind::Documents => ServiceHandle::Documents(services.databases.clone()),
            ServiceKind::Functions => ServiceHandle::Functions(services.functions.clone()),
            ServiceKind::Teams => ServiceHandle::Teams(services.teams.clone()),
            ServiceKind::Locale => ServiceHandle::Locale(services.locale.clone()),
            ServiceKind::Realtime => ServiceHandle::Realtime(services.realtime.clone()),
        })
    }

    fn subscription(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.subscription.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Takes ownership of a subscription, closing any previous one.
    pub fn attach_subscription(&self, subscription: Subscription) {
        if let Some(mut previous) = self.subscription().replace(subscription) {
            previous.close();
        }
    }

    pub fn subscription_info(&self) -> Option<SubscriptionInfo> {
        self.subscription().as_ref().map(|s| SubscriptionInfo {
            channels: s.channels().to_vec(),
            connected: s.is_connected(),
        })
    }

    /// Unsubscribes from realtime. The service handles stay usable.
    pub fn close(&self) {
        if let Some(mut subscription) = self.subscription().take() {
            subscription.close();
        }
    }
}
