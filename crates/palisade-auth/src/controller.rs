//! Session lifecycle orchestration.
//!
//! [`SessionController`] is the single entry point the storefront uses for
//! authentication. It owns the attempt limiter, the activity tracker, the
//! anti-forgery token manager, and the persisted session records, and it is
//! the only component allowed to mutate session state.
//!
//! # Lifecycle
//!
//! The controller serves direct calls (`login`, `logout`, `validate_session`,
//! `refresh_session`) as soon as it is constructed. [`SessionController::start`]
//! additionally spawns two background tasks: one that reacts to inactivity
//! timeouts from the activity tracker, and one that refreshes the persisted
//! session records on a fixed interval. [`SessionController::stop`] aborts
//! both. `start` is one-shot; a stopped controller keeps serving direct calls
//! but no longer reacts to inactivity.

use crate::activity::{ActivityTracker, SessionEvent};
use crate::csrf::AntiForgeryTokenManager;
use crate::error::{AuthError, Result};
use crate::limiter::LoginAttemptLimiter;
use crate::password::{self, PasswordAssessment};
use crate::provider::{IdentityProvider, ProviderError, ProviderGrant};
use crate::session::{Session, SessionState};
use palisade_core::config::SecurityConfig;
use palisade_core::error::PalisadeError;
use palisade_core::types::{EmailAddress, SessionId, Timestamp};
use palisade_vault::CredentialStore;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Record key for the provider-issued bearer token.
const AUTH_TOKEN_KEY: &str = "auth_token";
/// Record key for the locally minted session identifier.
const SESSION_ID_KEY: &str = "session_id";
/// Record key for the anti-forgery token.
const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Result of a login call that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Whether a session was established.
    pub success: bool,
    /// Whether the identity provider requires a second factor before a
    /// session can be established. When set, no session exists yet.
    pub requires_second_factor: bool,
}

/// Coordinates login, logout, session validation, and refresh.
///
/// Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct SessionController {
    provider: Arc<dyn IdentityProvider>,
    credentials: Arc<CredentialStore>,
    limiter: Arc<LoginAttemptLimiter>,
    tracker: Arc<ActivityTracker>,
    csrf: Arc<AntiForgeryTokenManager>,
    session: Arc<RwLock<Option<Session>>>,
    state: Arc<RwLock<SessionState>>,
    remote_token: Arc<Mutex<Option<Zeroizing<String>>>>,
    events: Arc<Mutex<Option<mpsc::UnboundedReceiver<SessionEvent>>>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    // Serializes record writes in refresh_session against logout's cleanup.
    commit_lock: Arc<tokio::sync::Mutex<()>>,
    session_ttl: Duration,
    refresh_interval: Duration,
}

impl SessionController {
    /// Create a controller from its two injected ports and configuration.
    ///
    /// The identity provider and the credential store are the only external
    /// dependencies; everything else is built here from `config`.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        credentials: Arc<CredentialStore>,
        config: &SecurityConfig,
    ) -> Self {
        let limiter = LoginAttemptLimiter::new(
            config.login.max_attempts,
            config.login.lockout_duration(),
        );
        let (tracker, events) = ActivityTracker::new(config.session.inactivity_duration());
        let csrf = AntiForgeryTokenManager::new(
            Arc::clone(&credentials),
            CSRF_TOKEN_KEY,
            config.session.session_ttl(),
        );

        Self {
            provider,
            credentials,
            limiter: Arc::new(limiter),
            tracker: Arc::new(tracker),
            csrf: Arc::new(csrf),
            session: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(SessionState::Anonymous)),
            remote_token: Arc::new(Mutex::new(None)),
            events: Arc::new(Mutex::new(Some(events))),
            tasks: Arc::new(Mutex::new(Vec::new())),
            commit_lock: Arc::new(tokio::sync::Mutex::new(())),
            session_ttl: config.session.session_ttl(),
            refresh_interval: config.session.refresh_interval(),
        }
    }

    /// Current controller state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read().expect("session state lock poisoned")
    }

    /// Snapshot of the current session, if one is established.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Authenticate against the identity provider.
    ///
    /// The identifier is validated locally before any remote call; a
    /// malformed identifier never counts as a login attempt. A login while
    /// already authenticated first logs the existing session out.
    ///
    /// # Errors
    /// [`AuthError::Validation`] for malformed input, [`AuthError::RateLimited`]
    /// when the attempt limiter rejects, [`AuthError::InvalidCredentials`] and
    /// [`AuthError::RemoteUnavailable`] as reported by the provider.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = EmailAddress::parse(email).map_err(|e| match e {
            PalisadeError::Validation(msg) => AuthError::Validation(msg),
            other => AuthError::Validation(other.to_string()),
        })?;
        if password.is_empty() {
            return Err(AuthError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        if self.state() == SessionState::Authenticated {
            debug!("Login requested while authenticated; replacing session");
            self.logout().await;
        }

        let identifier = email.normalized().to_string();
        if !self.limiter.can_attempt(&identifier) {
            let remaining = self
                .limiter
                .remaining_lockout(&identifier)
                .unwrap_or_default();
            self.set_state(SessionState::LockedOut);
            warn!("Login rejected by attempt limiter");
            return Err(AuthError::RateLimited(remaining));
        }

        self.set_state(SessionState::Authenticating);

        match self.provider.authenticate(&email, password).await {
            Ok(grant) if grant.second_factor_required => {
                self.set_state(SessionState::Anonymous);
                info!("Identity provider requires a second factor; no session established");
                Ok(LoginOutcome {
                    success: false,
                    requires_second_factor: true,
                })
            }
            Ok(grant) => {
                if let Err(e) = self.commit_login(&email, grant).await {
                    warn!(error = %e, "Failed to persist session records after login");
                    self.clear_local_state().await;
                    return Err(e);
                }
                Ok(LoginOutcome {
                    success: true,
                    requires_second_factor: false,
                })
            }
            Err(ProviderError::InvalidCredentials) => {
                self.set_state(SessionState::Anonymous);
                info!("Identity provider rejected the credentials");
                Err(AuthError::InvalidCredentials)
            }
            Err(ProviderError::Unavailable(msg)) => {
                self.set_state(SessionState::Anonymous);
                warn!(error = %msg, "Identity provider unavailable during login");
                Err(AuthError::RemoteUnavailable(msg))
            }
        }
    }

    /// Persist the grant, mint the session, and flip to `Authenticated`.
    ///
    /// State is flipped last so observers never see `Authenticated` with
    /// partially written records.
    async fn commit_login(&self, email: &EmailAddress, grant: ProviderGrant) -> Result<()> {
        let session_id = SessionId::generate();
        let session = Session {
            session_id,
            user_id: grant.user.id,
            issued_at: Timestamp::now(),
            expires_at: Timestamp::after(self.session_ttl),
            permissions: grant.user.permissions.into_iter().collect(),
        };
        let user_id = session.user_id.to_string();

        self.credentials
            .put(AUTH_TOKEN_KEY, &grant.session_token, self.session_ttl)
            .await?;
        self.credentials
            .put(SESSION_ID_KEY, &session_id.to_string(), self.session_ttl)
            .await?;
        self.csrf.rotate().await?;

        self.limiter.reset(email.normalized());
        self.tracker.record_activity();

        {
            let mut token = self.remote_token.lock().expect("remote token lock poisoned");
            *token = Some(Zeroizing::new(grant.session_token));
        }
        {
            let mut current = self.session.write().expect("session lock poisoned");
            *current = Some(session);
        }
        self.set_state(SessionState::Authenticated);

        info!(user_id = %user_id, "Login succeeded");
        Ok(())
    }

    /// End the current session.
    ///
    /// Remote invalidation is best-effort; local cleanup always runs and the
    /// pending inactivity timer is cancelled before this returns. Logout
    /// serializes with [`SessionController::refresh_session`]: a refresh
    /// caught mid-commit finishes first, and everything it persisted is
    /// removed here, so cleared records stay cleared.
    pub async fn logout(&self) {
        let _commit = self.commit_lock.lock().await;

        let token = self
            .remote_token
            .lock()
            .expect("remote token lock poisoned")
            .take();

        if let Some(token) = token {
            if let Err(e) = self.provider.invalidate(&token).await {
                warn!(error = %e, "Remote session invalidation failed; continuing with local cleanup");
            }
        }

        self.clear_local_state().await;
        info!("Logged out");
    }

    /// Remove persisted records, drop in-memory session state, and cancel
    /// the inactivity timer. Record removal failures are logged, never
    /// surfaced; the in-memory state is cleared regardless.
    async fn clear_local_state(&self) {
        for key in [AUTH_TOKEN_KEY, SESSION_ID_KEY] {
            if let Err(e) = self.credentials.remove(key).await {
                warn!(error = %e, key, "Failed to remove persisted session record");
            }
        }
        if let Err(e) = self.csrf.discard().await {
            warn!(error = %e, "Failed to discard anti-forgery token");
        }

        self.tracker.clear();
        {
            let mut current = self.session.write().expect("session lock poisoned");
            *current = None;
        }
        {
            let mut token = self.remote_token.lock().expect("remote token lock poisoned");
            *token = None;
        }
        self.set_state(SessionState::Anonymous);
    }

    /// Whether the current session is valid right now.
    ///
    /// A pure check: state is `Authenticated`, the session has not passed
    /// its expiry, the user has been active within the inactivity window,
    /// and the persisted session identifier matches the in-memory one.
    /// Never mutates state.
    pub async fn validate_session(&self) -> bool {
        if self.state() != SessionState::Authenticated {
            return false;
        }
        let Some(session) = self.current_session() else {
            return false;
        };
        if session.is_expired() {
            debug!("Session rejected: past its expiry");
            return false;
        }
        if !self.tracker.is_active() {
            debug!("Session rejected: inactivity window elapsed");
            return false;
        }

        match self.credentials.get(SESSION_ID_KEY).await {
            Ok(Some(stored)) => stored == session.session_id.to_string(),
            Ok(None) => {
                debug!("Session rejected: persisted session record absent");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session record");
                false
            }
        }
    }

    /// Re-validate the session and extend its persisted records.
    ///
    /// Returns `true` when the records were refreshed. A session that fails
    /// revalidation is logged out; a refresh failure is treated the same
    /// way, never left half-extended. The revalidate-and-persist sequence
    /// holds the same lock as `logout`, so a logout that wins the race
    /// leaves nothing to refresh and this returns `false` without writing.
    pub async fn refresh_session(&self) -> bool {
        if self.state() != SessionState::Authenticated {
            return false;
        }

        let guard = self.commit_lock.lock().await;
        if self.state() != SessionState::Authenticated {
            // A logout held the lock first and already cleared everything.
            return false;
        }
        if !self.validate_session().await {
            drop(guard);
            warn!("Session failed revalidation during refresh; logging out");
            self.logout().await;
            return false;
        }

        let token = self
            .remote_token
            .lock()
            .expect("remote token lock poisoned")
            .clone();
        let Some(token) = token else {
            drop(guard);
            warn!("No remote token held during refresh; logging out");
            self.logout().await;
            return false;
        };
        let Some(session) = self.current_session() else {
            return false;
        };

        if let Err(e) = self.persist_refresh(&token, &session.session_id).await {
            drop(guard);
            warn!(error = %e, "Failed to refresh persisted session records; logging out");
            self.logout().await;
            return false;
        }

        {
            let mut current = self.session.write().expect("session lock poisoned");
            let Some(live) = current.as_mut() else {
                return false;
            };
            live.expires_at = Timestamp::after(self.session_ttl);
        }
        debug!("Session records refreshed");
        true
    }

    async fn persist_refresh(&self, token: &str, session_id: &SessionId) -> Result<()> {
        self.credentials
            .put(AUTH_TOKEN_KEY, token, self.session_ttl)
            .await?;
        self.credentials
            .put(SESSION_ID_KEY, &session_id.to_string(), self.session_ttl)
            .await?;
        Ok(())
    }

    /// Anti-forgery token for the current session, minting one if needed.
    ///
    /// # Errors
    /// [`AuthError::NotAuthenticated`] without an established session;
    /// [`AuthError::Storage`] if the token cannot be persisted.
    pub async fn anti_forgery_token(&self) -> Result<String> {
        if self.state() != SessionState::Authenticated {
            return Err(AuthError::NotAuthenticated);
        }
        self.csrf.get_or_create().await
    }

    /// Whether `candidate` matches the current anti-forgery token.
    ///
    /// Always `false` when no token is stored (including after logout).
    ///
    /// # Errors
    /// [`AuthError::Storage`] if the stored token cannot be read.
    pub async fn validate_anti_forgery_token(&self, candidate: &str) -> Result<bool> {
        self.csrf.validate(candidate).await
    }

    /// Score a candidate password for signup and password-change forms.
    ///
    /// Advisory only; never consulted during login.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn evaluate_password_strength(&self, password: &str) -> PasswordAssessment {
        password::evaluate(password)
    }

    /// Record user interaction, postponing the inactivity timeout.
    ///
    /// A no-op unless a session is established.
    pub fn record_activity(&self) {
        if self.state() == SessionState::Authenticated {
            self.tracker.record_activity();
        }
    }

    /// Spawn the background tasks: inactivity handling and periodic refresh.
    ///
    /// One-shot; calling `start` a second time logs and returns. Must be
    /// called from within a tokio runtime.
    pub fn start(&self) {
        let receiver = self
            .events
            .lock()
            .expect("event receiver lock poisoned")
            .take();
        let Some(mut receiver) = receiver else {
            warn!("Session controller already started");
            return;
        };

        let controller = self.clone();
        let inactivity_task = tokio::spawn(async move {
            while let Some(SessionEvent::InactivityTimeout) = receiver.recv().await {
                if controller.state() == SessionState::Authenticated {
                    info!("Inactivity window elapsed; ending session");
                    controller.logout().await;
                }
            }
        });

        let controller = self.clone();
        let interval = self.refresh_interval;
        let refresh_task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if controller.state() == SessionState::Authenticated {
                    controller.refresh_session().await;
                }
            }
        });

        let mut tasks = self.tasks.lock().expect("task list lock poisoned");
        tasks.push(inactivity_task);
        tasks.push(refresh_task);
        info!("Session controller started");
    }

    /// Abort the background tasks and cancel any pending inactivity timer.
    ///
    /// Does not log out; persisted records and in-memory session state are
    /// left for the next `login` or explicit `logout` to handle.
    pub fn stop(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().expect("task list lock poisoned");
            tasks.drain(..).collect()
        };
        for handle in handles {
            handle.abort();
        }
        self.tracker.clear();
        info!("Session controller stopped");
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().expect("session state lock poisoned");
        if *state != next {
            debug!(from = %*state, to = %next, "Session state transition");
        }
        *state = next;
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("session_ttl", &self.session_ttl)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}
