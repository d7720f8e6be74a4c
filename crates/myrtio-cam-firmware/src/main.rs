#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_storage::FlashStorage;
use log::{error, info};
use static_cell::StaticCell;

use myrtio_cam_core::camera::set_stream_speed;
use myrtio_cam_core::connectivity::{ConnectivityConfig, ConnectivityManager};
use myrtio_cam_core::router::ServerConfig;

mod config;
mod drivers;
mod tasks;

use drivers::{
    EspWifiLink, FlashBlobStore, FlashLed, Ov2640Camera, StatusLed, init_network_stack,
    wait_for_connection,
};
use tasks::CamContext;

esp_bootloader_esp_idf::esp_app_desc!();

static FLASH_STORAGE: StaticCell<FlashStorage<'static>> = StaticCell::new();

/// Pre-compressed control page, served from flash as-is.
static HOME_PAGE: &[u8] = include_bytes!("../assets/index.html.gz");

// static_cell::make_static! in main causes a compiler error
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // Allocate heap memory (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Status LED on while booting
    let mut status_led = StatusLed::new(Output::new(
        peripherals.GPIO33,
        Level::Low,
        OutputConfig::default(),
    ));
    status_led.set_busy(true);

    let flash = FLASH_STORAGE.init(FlashStorage::new(peripherals.FLASH));
    let store = FlashBlobStore::new(flash as *mut FlashStorage<'static>);

    // Bring up the capture pipeline. Without a camera there is nothing to
    // serve; reset and retry from scratch.
    let camera = match Ov2640Camera::init() {
        Ok(camera) => camera,
        Err(e) => {
            error!("boot: camera init failed: {:?}, resetting", e);
            Timer::after(Duration::from_secs(1)).await;
            esp_hal::system::software_reset()
        }
    };
    let light = FlashLed::new(Output::new(
        peripherals.GPIO4,
        Level::Low,
        OutputConfig::default(),
    ));

    let ctx = mk_static!(CamContext, CamContext::new(camera, light));
    {
        // Boot at full sensor clock; the control flags must agree.
        let mut cam = ctx.camera.lock().await;
        if set_stream_speed(&mut *cam, &ctx.state, true).is_err() {
            error!("boot: could not set initial stream speed");
        }
    }

    let cfg = mk_static!(ServerConfig, ServerConfig::new(HOME_PAGE));

    // Initialize network stack and spawn network tasks
    let (stack, runner, controller) = init_network_stack(peripherals.WIFI);
    spawner.spawn(tasks::network_runner_task(runner)).ok();

    let link = EspWifiLink::new(controller, stack);
    let connectivity_config = ConnectivityConfig {
        fallback: config::FALLBACK_NETWORK,
        ..ConnectivityConfig::default()
    };
    let mut manager = ConnectivityManager::new(link, store, connectivity_config);
    if let Err(e) = manager.bring_up().await {
        error!("boot: no usable network: {:?}, resetting", e);
        // Waiting a while keeps a missing router from turning into a
        // tight reset loop.
        Timer::after(Duration::from_secs(10)).await;
        esp_hal::system::software_reset()
    }

    let net_config = wait_for_connection(stack).await;
    info!("network: online, ip {}", net_config.address);

    status_led.set_busy(false);

    spawner.spawn(tasks::connectivity_task(manager, ctx)).ok();
    spawner.spawn(tasks::telemetry_task(ctx)).ok();
    spawner.spawn(tasks::restart_task(ctx)).ok();
    spawner.spawn(tasks::control_server_task(ctx, cfg, stack)).ok();
    spawner.spawn(tasks::stream_server_task(ctx, cfg, stack)).ok();

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}
