//! Wireless link establishment and supervision.
//!
//! Startup walks the persisted credential table, preferring the last slot
//! that worked. Link-level failures are never fatal here; they drive
//! failover to the next candidate. Once online, the supervisor watches the
//! link and raises the restart signal only after its reconnect budget is
//! spent.

use embassy_time::{Duration, Timer};
use heapless::String;
use log::{info, warn};

use crate::credentials::{self, BlobStore, CREDENTIAL_RECORD, SLOT_COUNT, StorageError};
use crate::restart::{RestartReason, RestartSignal};
use crate::telemetry::Telemetry;

/// Connectivity as reported by the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Online,
    /// Authentication rejected or the network was not found.
    BadCredentials,
    /// Association lost after it had been established.
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkError;

/// The wireless driver, reduced to what the manager needs.
#[allow(async_fn_in_trait)]
pub trait LinkLayer {
    /// Point the link at a network and start connecting.
    async fn apply_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError>;

    fn state(&self) -> LinkState;

    fn signal_strength(&self) -> i8;
}

/// An explicitly configured last-resort credential pair, tried only when
/// every table slot has failed.
#[derive(Debug, Clone, Copy)]
pub struct FallbackCredential {
    pub ssid: &'static str,
    pub password: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectivityConfig {
    /// How long one credential attempt may take before it counts as failed.
    pub connect_timeout: Duration,
    /// Link-state polling interval.
    pub poll_interval: Duration,
    /// Reconnect attempts after a lost link before giving up.
    pub retry_limit: u32,
    pub fallback: Option<FallbackCredential>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            retry_limit: 3,
            fallback: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    Storage(StorageError),
    /// No table slot (and no fallback) produced a connection.
    NoKnownNetwork,
}

impl From<StorageError> for StartupError {
    fn from(err: StorageError) -> Self {
        StartupError::Storage(err)
    }
}

const CREDENTIAL_CAPACITY: usize = credentials::FIELD_LEN - 1;

pub struct ConnectivityManager<L, S> {
    link: L,
    store: S,
    config: ConnectivityConfig,
    current_ssid: String<CREDENTIAL_CAPACITY>,
    current_password: String<CREDENTIAL_CAPACITY>,
}

impl<L: LinkLayer, S: BlobStore> ConnectivityManager<L, S> {
    pub fn new(link: L, store: S, config: ConnectivityConfig) -> Self {
        Self {
            link,
            store,
            config,
            current_ssid: String::new(),
            current_password: String::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Establish the wireless link from the persisted credential table.
    ///
    /// Storage failures are fatal to startup; link failures only move the
    /// search to the next candidate. The caller owns the decision of what
    /// to do when no known network is reachable.
    pub async fn bring_up(&mut self) -> Result<(), StartupError> {
        let mut table = credentials::load_or_init(&mut self.store).await?;

        // The slot that worked last time is the most likely to work again.
        if let Some(last) = table.last_index() {
            if let Some((ssid, password)) = table.entry(last) {
                if self.try_credentials(ssid, password).await {
                    return Ok(());
                }
            }
        }

        for index in 0..SLOT_COUNT {
            let Some((ssid, password)) = table.entry(index) else {
                continue;
            };
            if self.try_credentials(ssid, password).await {
                if table.last_index() != Some(index) {
                    table.set_last_index(index);
                    self.store
                        .write_record(&CREDENTIAL_RECORD, &table.encode())
                        .await?;
                    info!("connectivity: last-used slot is now {}", index);
                }
                return Ok(());
            }
        }

        if let Some(fallback) = self.config.fallback {
            warn!("connectivity: table exhausted, trying fallback network");
            if self.try_credentials(fallback.ssid, fallback.password).await {
                return Ok(());
            }
        }

        Err(StartupError::NoKnownNetwork)
    }

    /// Watch an established link, reconnecting after losses.
    ///
    /// Returns only after the reconnect budget is exhausted, with the
    /// restart signal raised. Also feeds the link signal strength to the
    /// telemetry sampler, which has no link access of its own.
    pub async fn supervise(mut self, restart: &RestartSignal, telemetry: &Telemetry) {
        let mut failures: u32 = 0;
        loop {
            Timer::after(self.config.poll_interval).await;
            match self.link.state() {
                LinkState::Online => {
                    failures = 0;
                    telemetry.record_signal_strength(self.link.signal_strength());
                }
                LinkState::Connecting | LinkState::Idle => {}
                LinkState::BadCredentials | LinkState::Lost => {
                    if failures >= self.config.retry_limit {
                        warn!("connectivity: reconnect attempts exhausted");
                        restart.request(RestartReason::LinkLost);
                        return;
                    }
                    failures += 1;
                    info!("connectivity: link lost, reconnect attempt {}", failures);
                    let ssid = self.current_ssid.clone();
                    let password = self.current_password.clone();
                    self.try_credentials(&ssid, &password).await;
                }
            }
        }
    }

    /// One connection attempt: apply the credentials, then poll the link
    /// state up to the configured timeout.
    async fn try_credentials(&mut self, ssid: &str, password: &str) -> bool {
        info!("connectivity: trying network {}", ssid);
        if self.link.apply_credentials(ssid, password).await.is_err() {
            return false;
        }

        let poll_ms = self.config.poll_interval.as_millis().max(1);
        let polls = (self.config.connect_timeout.as_millis() / poll_ms).max(1);
        for _ in 0..polls {
            Timer::after(self.config.poll_interval).await;
            match self.link.state() {
                LinkState::Online => {
                    self.remember(ssid, password);
                    info!("connectivity: online via {}", ssid);
                    return true;
                }
                LinkState::BadCredentials | LinkState::Lost => return false,
                LinkState::Connecting | LinkState::Idle => {}
            }
        }
        false
    }

    fn remember(&mut self, ssid: &str, password: &str) {
        self.current_ssid.clear();
        let _ = self.current_ssid.push_str(ssid);
        self.current_password.clear();
        let _ = self.current_password.push_str(password);
    }
}
