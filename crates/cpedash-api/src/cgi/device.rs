// Device state and mutation endpoints
//
// Thin typed wrappers over `execute`: each issues one command and
// unwraps the matching `CgiResponse` variant.

use serde_json::{Map, Value};
use tracing::debug;

use crate::cgi::client::CgiClient;
use crate::cgi::commands::{CgiCommand, CgiResponse};
use crate::cgi::models::{
    AccountLevel, ConnectionSettings, DhcpLease, GlobalConfig, PinStatus, StatusInfo,
    TopologyReport, WifiSettings,
};
use crate::error::Error;

fn unexpected(cmd: CgiCommand, resp: &CgiResponse) -> Error {
    Error::UnexpectedResponse {
        cmd: cmd.number(),
        got: resp.kind().into(),
    }
}

impl CgiClient {
    /// Public device status (signal, SIM, uptime, traffic counters).
    pub async fn status_info(&self) -> Result<StatusInfo, Error> {
        let cmd = CgiCommand::StatusInfo;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::StatusInfo(s) => Ok(s),
            other => Err(unexpected(cmd, &other)),
        }
    }

    /// Public WAN connection settings.
    pub async fn connection_settings(&self) -> Result<ConnectionSettings, Error> {
        let cmd = CgiCommand::ConnectionSettings;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::ConnectionSettings(s) => Ok(s),
            other => Err(unexpected(cmd, &other)),
        }
    }

    pub async fn wifi_settings(&self) -> Result<WifiSettings, Error> {
        let cmd = CgiCommand::WifiSettings;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::WifiSettings(s) => Ok(s),
            other => Err(unexpected(cmd, &other)),
        }
    }

    pub async fn account_level(&self) -> Result<AccountLevel, Error> {
        let cmd = CgiCommand::AccountLevel;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::AccountLevel(a) => Ok(a),
            other => Err(unexpected(cmd, &other)),
        }
    }

    /// Enumeration tables (country, channel, ...) used by dependent forms.
    pub async fn global_config(&self) -> Result<GlobalConfig, Error> {
        let cmd = CgiCommand::GlobalConfig;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::GlobalConfig(g) => Ok(g),
            other => Err(unexpected(cmd, &other)),
        }
    }

    /// Raw mesh topology report.
    pub async fn topology(&self) -> Result<TopologyReport, Error> {
        let cmd = CgiCommand::Topology;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::Topology(t) => Ok(t),
            other => Err(unexpected(cmd, &other)),
        }
    }

    pub async fn dhcp_leases(&self) -> Result<Vec<DhcpLease>, Error> {
        let cmd = CgiCommand::DhcpLeases;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::DhcpLeases(l) => Ok(l),
            other => Err(unexpected(cmd, &other)),
        }
    }

    // ── SIM ──────────────────────────────────────────────────────────

    pub async fn pin_status(&self) -> Result<PinStatus, Error> {
        let cmd = CgiCommand::PinStatus;
        match self.execute(cmd, Map::new()).await? {
            CgiResponse::PinStatus(p) => Ok(p),
            other => Err(unexpected(cmd, &other)),
        }
    }

    /// Submit the SIM PIN. A wrong PIN comes back as `Error::Command`.
    pub async fn verify_pin(&self, pin: &str) -> Result<(), Error> {
        debug!("verifying SIM PIN");
        let mut params = Map::new();
        params.insert("pin".into(), Value::from(pin));
        self.execute(CgiCommand::VerifyPin, params).await.map(|_| ())
    }

    /// Unlock a PUK-locked SIM and set a new PIN.
    pub async fn unlock_puk(&self, puk: &str, new_pin: &str) -> Result<(), Error> {
        debug!("unlocking SIM with PUK");
        let mut params = Map::new();
        params.insert("puk".into(), Value::from(puk));
        params.insert("newPin".into(), Value::from(new_pin));
        self.execute(CgiCommand::UnlockPuk, params).await.map(|_| ())
    }

    // ── System ───────────────────────────────────────────────────────

    pub async fn reboot(&self) -> Result<(), Error> {
        debug!("rebooting device");
        self.execute(CgiCommand::Reboot, Map::new()).await.map(|_| ())
    }
}
