//! Wireless link driver over the esp-radio STA interface.

use core::cell::{Cell, RefCell};
use core::str::FromStr;

use embassy_net::{DhcpConfig, Runner, Stack, StackResources};
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{
    AuthMethod, ClientConfig, Config as WifiConfig, ModeConfig, WifiController, WifiDevice,
    WifiStaState,
};
use heapless::String;
use myrtio_cam_core::connectivity::{LinkError, LinkLayer, LinkState};
use static_cell::make_static;

use crate::config;

const MAX_CONNECTIONS: usize = 6;

pub fn init_network_stack(
    wifi_device: WIFI<'static>,
) -> (
    Stack<'static>,
    Runner<'static, WifiDevice<'static>>,
    WifiController<'static>,
) {
    let esp_radio_ctrl = &*make_static!(esp_radio::init().unwrap());
    let (controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, WifiConfig::default()).unwrap();

    let mut dhcp_config = DhcpConfig::default();
    let hostname = String::from_str(config::HOSTNAME).expect("Invalid hostname");
    dhcp_config.hostname = Some(hostname);
    let net_config = embassy_net::Config::dhcpv4(dhcp_config);

    let network_resources = make_static!(StackResources::<MAX_CONNECTIONS>::new());
    let (stack, runner) =
        embassy_net::new(interfaces.sta, net_config, network_resources, get_seed());

    (stack, runner, controller)
}

fn get_seed() -> u64 {
    let rng = Rng::new();
    u64::from(rng.random()) << 32 | u64::from(rng.random())
}

/// Wait for full network connectivity (link + DHCP lease).
pub async fn wait_for_connection(stack: Stack<'_>) -> embassy_net::StaticConfigV4 {
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
    loop {
        if let Some(net_config) = stack.config_v4() {
            return net_config;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}

/// [`LinkLayer`] over the radio controller and the network stack.
///
/// The controller sits in a `RefCell` because the trait reads state
/// through `&self`; the link is owned by the connectivity manager and
/// only ever used from its task.
pub struct EspWifiLink {
    controller: RefCell<WifiController<'static>>,
    stack: Stack<'static>,
    auth_failed: Cell<bool>,
    was_online: Cell<bool>,
}

impl EspWifiLink {
    pub fn new(controller: WifiController<'static>, stack: Stack<'static>) -> Self {
        Self {
            controller: RefCell::new(controller),
            stack,
            auth_failed: Cell::new(false),
            was_online: Cell::new(false),
        }
    }
}

impl LinkLayer for EspWifiLink {
    async fn apply_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        let mut controller = self.controller.borrow_mut();
        self.auth_failed.set(false);
        self.was_online.set(false);

        if matches!(controller.is_connected(), Ok(true)) {
            let _ = controller.disconnect_async().await;
        }

        let client_config = if password.is_empty() {
            ClientConfig::default()
                .with_ssid(ssid.into())
                .with_auth_method(AuthMethod::None)
        } else {
            ClientConfig::default()
                .with_ssid(ssid.into())
                .with_password(password.into())
        };
        controller
            .set_config(&ModeConfig::Client(client_config))
            .map_err(|_| LinkError)?;

        if !matches!(controller.is_started(), Ok(true)) {
            controller.start_async().await.map_err(|_| LinkError)?;
        }

        // A rejected handshake or an unknown SSID surfaces here; the state
        // machine below reports it as bad credentials rather than an error.
        if controller.connect_async().await.is_err() {
            self.auth_failed.set(true);
        }
        Ok(())
    }

    fn state(&self) -> LinkState {
        if self.auth_failed.get() {
            return LinkState::BadCredentials;
        }
        match esp_radio::wifi::sta_state() {
            WifiStaState::Connected => {
                if self.stack.is_link_up() && self.stack.config_v4().is_some() {
                    self.was_online.set(true);
                    LinkState::Online
                } else {
                    LinkState::Connecting
                }
            }
            WifiStaState::Disconnected => {
                if self.was_online.get() {
                    LinkState::Lost
                } else {
                    LinkState::BadCredentials
                }
            }
            _ => LinkState::Connecting,
        }
    }

    fn signal_strength(&self) -> i8 {
        self.controller.borrow_mut().rssi().unwrap_or(0)
    }
}
