// ── Dashboard facade ──
//
// Wires the API client, the session manager and the global data store
// together and owns the background tasks: heartbeat, status polling, the
// settings fetch effect and the auth-lost listener. One-shot operations
// (topology, SIM, reboot) are plain async methods on the same handle.

use std::sync::Arc;
use std::time::Duration;

use cpedash_api::CgiClient;
use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::error::CoreError;
use crate::model::{GlobalKey, GlobalValue, MacAddress, PinStatus};
use crate::session::{LoginState, SessionManager};
use crate::store::GlobalData;
use crate::token::TokenStore;
use crate::topology::{self, TopologyData};
use crate::validate;

/// SIM state the status page shows once the PIN has been accepted.
const SIM_READY: &str = "READY";

/// Outcome of one settings fetch round.
#[derive(Debug, Default)]
pub struct SettingsRefresh {
    /// Keys whose fresh value landed in the store.
    pub applied: Vec<GlobalKey>,
    /// Keys fetched fine but superseded by a newer write.
    pub discarded: Vec<GlobalKey>,
    pub failed: Vec<(GlobalKey, CoreError)>,
}

/// Handle to one router. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DeviceConfig,
    client: Arc<CgiClient>,
    session: SessionManager,
    data: GlobalData,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Build a dashboard. Does not touch the network; call
    /// [`start()`](Self::start) to launch background tasks, or use the
    /// one-shot methods directly.
    pub fn new(config: DeviceConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        for (name, period) in [
            ("heartbeat_interval", config.heartbeat_interval),
            ("status_interval", config.status_interval),
        ] {
            if period.is_zero() {
                return Err(CoreError::Config {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }

        let client = Arc::new(CgiClient::new(
            config.url.clone(),
            &config.cgi_path,
            &config.transport(),
        )?);
        let session = SessionManager::new(Arc::clone(&client), tokens);

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                session,
                data: GlobalData::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn data(&self) -> &GlobalData {
        &self.inner.data
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn client(&self) -> &CgiClient {
        &self.inner.client
    }

    pub fn login_state(&self) -> watch::Receiver<LoginState> {
        self.inner.session.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the heartbeat, status poll, settings effect and auth-lost
    /// listener.
    ///
    /// A dashboard runs once: after [`stop()`](Self::stop) it cannot be
    /// started again.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Internal("dashboard has been stopped".into()));
        }

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("dashboard already started");
            return Ok(());
        }

        let cancel = self.inner.cancel.clone();
        // Subscribe before spawning so no signal raised by the first
        // requests is missed.
        let auth_rx = self.inner.client.auth_events();
        let state_rx = self.inner.session.subscribe();

        handles.push(tokio::spawn(auth_signal_task(
            self.clone(),
            auth_rx,
            cancel.clone(),
        )));
        handles.push(tokio::spawn(heartbeat_task(
            self.clone(),
            self.inner.config.heartbeat_interval,
            cancel.clone(),
        )));
        handles.push(tokio::spawn(status_poll_task(
            self.clone(),
            self.inner.config.status_interval,
            cancel.clone(),
        )));
        handles.push(tokio::spawn(settings_task(self.clone(), state_rx, cancel)));

        info!(url = %self.inner.config.url, "dashboard started");
        Ok(())
    }

    /// Cancel every background task and wait for them to finish.
    ///
    /// The store is closed first, so responses still in flight are
    /// discarded rather than written.
    pub async fn stop(&self) {
        self.inner.data.close();
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("dashboard stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn check_session(&self) -> bool {
        self.inner.session.check_session().await
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        self.inner.session.login(username, password).await
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        self.inner.session.logout().await
    }

    /// Make sure a valid session exists, logging in with the configured
    /// credentials when the current one is missing or rejected.
    pub async fn ensure_session(&self) -> Result<(), CoreError> {
        if self.check_session().await {
            return Ok(());
        }
        match &self.inner.config.credentials {
            Some(creds) => self.login(&creds.username, &creds.password).await,
            None => Err(CoreError::NotLoggedIn),
        }
    }

    // ── Global data fetches ──────────────────────────────────────────

    /// Fetch one key and offer it to the store under a ticket taken
    /// before the request went out. Returns whether the value landed.
    pub async fn refresh_key(&self, key: GlobalKey) -> Result<bool, CoreError> {
        let data = &self.inner.data;
        let client = &self.inner.client;
        let ticket = data.next_ticket();

        let value = match key {
            GlobalKey::StatusInfo => GlobalValue::StatusInfo(client.status_info().await?),
            GlobalKey::ConnectionSettings => {
                GlobalValue::ConnectionSettings(client.connection_settings().await?)
            }
            GlobalKey::WifiSettings => GlobalValue::WifiSettings(client.wifi_settings().await?),
            GlobalKey::AccountLevel => GlobalValue::AccountLevel(client.account_level().await?),
            GlobalKey::GlobalConfig => GlobalValue::GlobalConfig(client.global_config().await?),
        };
        Ok(data.apply_fetched(ticket, value))
    }

    pub async fn refresh_status(&self) -> Result<bool, CoreError> {
        self.refresh_key(GlobalKey::StatusInfo).await
    }

    /// One run of the settings effect.
    ///
    /// Connection settings are always fetched; Wi-Fi settings, account
    /// level and the enumeration tables only when logged in. Sub-fetches
    /// run concurrently and fail independently.
    pub async fn refresh_settings(&self) -> SettingsRefresh {
        let mut keys = vec![GlobalKey::ConnectionSettings];
        if self.inner.session.is_logged_in() {
            keys.extend([
                GlobalKey::WifiSettings,
                GlobalKey::AccountLevel,
                GlobalKey::GlobalConfig,
            ]);
        }

        let mut set = JoinSet::new();
        for key in keys {
            let dash = self.clone();
            set.spawn(async move { (key, dash.refresh_key(key).await) });
        }

        let mut outcome = SettingsRefresh::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((key, Ok(true))) => outcome.applied.push(key),
                Ok((key, Ok(false))) => outcome.discarded.push(key),
                Ok((key, Err(e))) => {
                    warn!(%key, error = %e, "settings fetch failed");
                    outcome.failed.push((key, e));
                }
                Err(e) => warn!(error = %e, "settings fetch task panicked"),
            }
        }
        outcome.applied.sort_unstable();
        outcome.discarded.sort_unstable();
        outcome.failed.sort_by_key(|(key, _)| *key);
        outcome
    }

    // ── Topology ─────────────────────────────────────────────────────

    /// Fetch the mesh report and DHCP table and build the tree.
    ///
    /// A failed DHCP fetch only costs the IP/hostname enrichment.
    pub async fn topology(&self, al_mac: Option<&MacAddress>) -> Result<TopologyData, CoreError> {
        let report = self.inner.client.topology().await?;
        let leases = match self.inner.client.dhcp_leases().await {
            Ok(leases) => leases,
            Err(e) => {
                warn!(error = %e, "DHCP lease fetch failed, topology without addresses");
                Vec::new()
            }
        };
        Ok(topology::create_data(&report.raw, &leases, al_mac))
    }

    // ── SIM ──────────────────────────────────────────────────────────

    pub async fn pin_status(&self) -> Result<PinStatus, CoreError> {
        Ok(self.inner.client.pin_status().await?)
    }

    /// Submit the SIM PIN.
    ///
    /// On rejection the remaining PIN attempts are re-read from the device
    /// and attached to the error.
    pub async fn verify_pin(&self, pin: &str) -> Result<(), CoreError> {
        validate::pin("pin", pin)?;

        match self.inner.client.verify_pin(pin).await {
            Ok(()) => {
                self.mark_sim_ready();
                Ok(())
            }
            Err(cpedash_api::Error::Command { message, .. }) => {
                let remaining_attempts = self.remaining(|s| s.pin_remaining).await;
                Err(CoreError::Rejected {
                    message,
                    remaining_attempts,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Unlock a PUK-blocked SIM and set a new PIN.
    pub async fn unlock_puk(&self, puk: &str, new_pin: &str) -> Result<(), CoreError> {
        validate::puk("puk", puk)?;
        validate::pin("new_pin", new_pin)?;

        match self.inner.client.unlock_puk(puk, new_pin).await {
            Ok(()) => {
                self.mark_sim_ready();
                Ok(())
            }
            Err(cpedash_api::Error::Command { message, .. }) => {
                let remaining_attempts = self.remaining(|s| s.puk_remaining).await;
                Err(CoreError::Rejected {
                    message,
                    remaining_attempts,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remaining(&self, pick: impl FnOnce(&PinStatus) -> Option<i64>) -> Option<i64> {
        match self.inner.client.pin_status().await {
            Ok(status) => pick(&status),
            Err(e) => {
                warn!(error = %e, "could not re-read SIM attempt counters");
                None
            }
        }
    }

    /// Optimistic patch so the status page stops asking for the PIN
    /// before the next poll comes back.
    fn mark_sim_ready(&self) {
        self.inner
            .data
            .patch_status_info(|s| s.sim_status = Some(SIM_READY.into()));
    }

    // ── System ───────────────────────────────────────────────────────

    pub async fn reboot(&self) -> Result<(), CoreError> {
        info!("requesting device reboot");
        Ok(self.inner.client.reboot().await?)
    }
}

// ── Background tasks ────────────────────────────────────────────────

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Re-validate the session right away, then every `period`.
async fn heartbeat_task(dash: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    valid = dash.check_session() => debug!(valid, "heartbeat"),
                }
            }
        }
    }
}

/// Poll public status on a fixed cadence, logged in or not.
async fn status_poll_task(dash: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = dash.refresh_status() => {
                        if let Err(e) = result {
                            warn!(error = %e, "status poll failed");
                        }
                    }
                }
            }
        }
    }
}

/// Run the settings fetch for the initial login state and again on every
/// transition.
async fn settings_task(
    dash: Dashboard,
    mut state_rx: watch::Receiver<LoginState>,
    cancel: CancellationToken,
) {
    state_rx.borrow_and_update();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = dash.refresh_settings() => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                debug!(%state, "login state changed, refreshing settings");
            }
        }
    }
}

/// Force logged-out whenever the API layer reports a rejected session.
async fn auth_signal_task(
    dash: Dashboard,
    mut auth_rx: broadcast::Receiver<cpedash_api::AuthLost>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = auth_rx.recv() => match event {
                Ok(event) => dash.inner.session.handle_auth_lost(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth-lost signals dropped, forcing logout");
                    dash.inner.session.force_logged_out();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
