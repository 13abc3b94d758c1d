#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::net::Ipv4Addr;

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration as EmbassyDuration, Timer, WithTimeout};
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    time::{Instant, Rate},
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController};
use heapless::Vec as HeaplessVec;
use log::{LevelFilter, info, warn};
use shiftwatch_core::{
    app::{StatusApp, TickResult},
    net::NetworkView,
    schedule::ShiftSchedule,
    sense::RunSense,
    settings::ConfigStore,
    terminal::{StatusTerminal, TextSize},
};
use shiftwatch_hal_esp32s3::{
    input::run_sense::{GpioRunSense, RunSenseConfig},
    network::{ConnectivityHandle, WifiConfig},
    platform::display::Oled,
    render::OledTerminal,
    storage::flash_config::FlashConfigStore,
};
use static_cell::StaticCell;
use ug2864::{Config as PanelConfig, FrameBuffer};

use config_sync::ConfigSyncState;

#[path = "main/config_sync.rs"]
mod config_sync;

const DISPLAY_I2C_KHZ: u32 = 400;
const TITLE: &str = "SHIFTWATCH";

/// Sense channels wired on this board; capacity-bounded by the store's
/// asset limit.
const MONITORED_ASSETS: usize = 4;
const DEFAULT_ASSET_NAMES: [&str; MONITORED_ASSETS] = ["Mill A", "Mill B", "Press", "Packline"];

const SENSE_POLL_INTERVAL_MS: u64 = 100;
const CONFIG_SAVE_DEBOUNCE_MS: u64 = 1_500;
const WIFI_RETRY_BACKOFF_MIN_SECS: u64 = 2;
const WIFI_RETRY_BACKOFF_MAX_SECS: u64 = 120;
const NETWORK_POLL_INTERVAL_MS: u64 = 500;
const DHCP_TIMEOUT_SECS: u64 = 15;

const WIFI_SSID: &str = env!(
    "SHIFTWATCH_WIFI_SSID",
    "Set SHIFTWATCH_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "SHIFTWATCH_WIFI_PASSWORD",
    "Set SHIFTWATCH_WIFI_PASSWORD in your environment before building/flashing."
);
const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

fn wifi_retry_backoff_secs(consecutive_failures: u32) -> u64 {
    // 2, 4, 8, 16, 32, 64, 120, 120, ...
    let shift = consecutive_failures.min(6);
    WIFI_RETRY_BACKOFF_MIN_SECS
        .saturating_mul(1u64 << shift)
        .min(WIFI_RETRY_BACKOFF_MAX_SECS)
}

async fn wait_before_wifi_retry(consecutive_failures: &mut u32) {
    let delay_secs = wifi_retry_backoff_secs(*consecutive_failures);
    *consecutive_failures = consecutive_failures.saturating_add(1);
    info!(
        "wifi retrying in {}s (consecutive_failures={})",
        delay_secs, *consecutive_failures
    );
    Timer::after_secs(delay_secs).await;
}

fn current_ipv4(stack: Stack<'_>) -> Option<Ipv4Addr> {
    stack.config_v4().map(|config| config.address.address())
}

async fn wifi_connection_loop(
    wifi_controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    connectivity: &'static ConnectivityHandle,
) -> ! {
    let mut consecutive_failures = 0u32;

    loop {
        connectivity.mark_connecting();

        if !wifi_controller.is_started().unwrap_or(false) {
            if let Err(err) = wifi_controller.start_async().await {
                info!("wifi start failed: {:?}", err);
                connectivity.mark_disconnected();
                wait_before_wifi_retry(&mut consecutive_failures).await;
                continue;
            }
        }

        if let Err(err) = wifi_controller.connect_async().await {
            info!("wifi connect failed: {:?}", err);
            connectivity.mark_disconnected();
            let _ = wifi_controller.disconnect_async().await;
            wait_before_wifi_retry(&mut consecutive_failures).await;
            continue;
        }

        match stack
            .wait_config_up()
            .with_timeout(EmbassyDuration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                connectivity.update_link_ip(stack.is_link_up(), current_ipv4(stack));
                info!("wifi connected and dhcp ready");
            }
            Err(_) => {
                info!("dhcp timeout; forcing reconnect");
                connectivity.update_link_ip(stack.is_link_up(), None);
                let _ = wifi_controller.disconnect_async().await;
                wait_before_wifi_retry(&mut consecutive_failures).await;
                continue;
            }
        }

        consecutive_failures = 0;

        loop {
            let link_up = stack.is_link_up();
            let ipv4 = current_ipv4(stack);
            let is_connected = matches!(wifi_controller.is_connected(), Ok(true));

            connectivity.update_link_ip(link_up, ipv4);

            if !(link_up && ipv4.is_some() && is_connected) {
                info!(
                    "wifi state lost (link_up={} has_ipv4={} connected={}); reconnecting",
                    link_up,
                    ipv4.is_some(),
                    is_connected
                );
                break;
            }

            Timer::after_millis(NETWORK_POLL_INTERVAL_MS).await;
        }

        connectivity.mark_disconnected();
        let _ = wifi_controller.disconnect_async().await;
        wait_before_wifi_retry(&mut consecutive_failures).await;
    }
}

/// Shipped schedule for a board with nothing provisioned yet: four named
/// assets on the plant's two standard shifts.
fn default_schedule() -> ShiftSchedule {
    let mut schedule = ShiftSchedule::new();

    for (asset, name) in DEFAULT_ASSET_NAMES.iter().enumerate() {
        // Static defaults are in bounds and well formed.
        let _ = schedule.set_asset_name(asset, name);
        let _ = schedule.set_shift_span(asset, 0, "06:00", "14:00");
        let _ = schedule.set_shift_span(asset, 1, "14:00", "22:00");
    }

    schedule
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: shiftwatch starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // OLED wiring used by this board: SDA=GPIO8, SCL=GPIO9.
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(DISPLAY_I2C_KHZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO8)
    .with_scl(peripherals.GPIO9);

    let mut delay = Delay::new();
    let mut display = Oled::new(i2c, PanelConfig::default());
    let mut display_fault_logged = false;

    esp_println::println!("display: init begin (SDA=8 SCL=9)");
    if let Err(err) = display.initialize(&mut delay) {
        esp_println::println!("display: initialize failed");
        info!("display initialize failed: {:?}", err);
        display_fault_logged = true;
    } else {
        esp_println::println!("display: initialize ok");
    }
    if let Err(err) = display.clear_panel() {
        esp_println::println!("display: clear failed");
        info!("display clear failed: {:?}", err);
        display_fault_logged = true;
    } else {
        esp_println::println!("display: clear ok");
    }

    let mut frame = FrameBuffer::new();

    // Early bring-up proof: splash before any app state exists.
    {
        let mut term = OledTerminal::new(&mut frame, &mut display);
        let _ = term.clear();
        let _ = term.set_text_size(TextSize::Large);
        let _ = term.set_cursor(1, 1);
        let _ = term.print_line(TITLE);
        let _ = term.set_text_size(TextSize::Small);
        let _ = term.set_cursor(0, 5);
        let _ = term.print_line("starting...");
        if let Err(err) = term.commit() {
            if !display_fault_logged {
                esp_println::println!("display: splash flush failed");
                info!("display splash flush failed: {:?}", err);
            }
        } else {
            esp_println::println!("display: splash frame flushed");
        }
    }

    // Machine sense wiring, one channel per asset slot:
    // GPIO4, GPIO5, GPIO6, GPIO7, pulled up, high = running.
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let mut sense_pins: HeaplessVec<Input<'static>, MONITORED_ASSETS> = HeaplessVec::new();
    let _ = sense_pins.push(Input::new(peripherals.GPIO4, input_cfg));
    let _ = sense_pins.push(Input::new(peripherals.GPIO5, input_cfg));
    let _ = sense_pins.push(Input::new(peripherals.GPIO6, input_cfg));
    let _ = sense_pins.push(Input::new(peripherals.GPIO7, input_cfg));
    let mut sense = GpioRunSense::new(sense_pins, RunSenseConfig::default());

    let mut config_store = match FlashConfigStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            info!(
                "config storage unavailable ({:?}); schedule will be volatile",
                err
            );
            None
        }
    };

    let schedule = match config_store.as_mut().map(|store| store.load()) {
        Some(Ok(Some(saved))) => {
            info!(
                "configuration restored from flash ({} assets provisioned)",
                saved.configured_assets()
            );
            saved
        }
        Some(Ok(None)) => {
            let seeded = default_schedule();
            if let Some(store) = config_store.as_mut() {
                match store.save(&seeded) {
                    Ok(()) => info!("first boot; default configuration persisted"),
                    Err(err) => warn!("failed to persist default configuration: {:?}", err),
                }
            }
            seeded
        }
        Some(Err(err)) => {
            warn!(
                "stored configuration unreadable ({:?}); using defaults",
                err
            );
            default_schedule()
        }
        None => default_schedule(),
    };

    let mut app = StatusApp::new(schedule, 0);
    let mut config_sync = ConfigSyncState::new(app.schedule().clone());

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(WIFI_CONFIG.ssid.into())
        .with_password(WIFI_CONFIG.password.into());
    let wifi_mode = ModeConfig::Client(client_config);
    if let Err(err) = wifi_controller.set_config(&wifi_mode) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x7A3C_41F8_0B52_9D6E,
    );

    let mut last_connectivity_revision = u32::MAX;
    let mut sense_fault_logged = false;
    let mut next_sense_ms = 0u64;

    let loop_start = Instant::now();

    info!(
        "shiftwatch started: assets={} sense_poll_ms={} screen_dwell_ms={}",
        MONITORED_ASSETS,
        SENSE_POLL_INTERVAL_MS,
        shiftwatch_core::app::SCREEN_DWELL_MS
    );
    info!("display pins: SDA=GPIO8 SCL=GPIO9");
    info!("sense pins: GPIO4 GPIO5 GPIO6 GPIO7 (pull-up, high=running)");
    info!("wifi bootstrap configured from env; ssid={}", WIFI_CONFIG.ssid);

    CONNECTIVITY.mark_connecting();

    let net_future = net_runner.run();
    let wifi_future = wifi_connection_loop(&mut wifi_controller, stack, &CONNECTIVITY);
    let ui_future = async {
        loop {
            let now_ms = loop_start.elapsed().as_millis();

            if now_ms >= next_sense_ms {
                next_sense_ms = now_ms + SENSE_POLL_INTERVAL_MS;

                for asset in 0..sense.asset_count() {
                    match sense.is_running(asset) {
                        Ok(running) => {
                            if let Ok(Some(event)) = app.record_sample(asset, running, now_ms) {
                                let name = app
                                    .schedule()
                                    .asset_name(event.asset as usize)
                                    .unwrap_or("?");
                                info!(
                                    "event: machine={} state={} duration_s={}",
                                    name,
                                    event.kind.as_str(),
                                    event.duration_ms / 1_000
                                );
                            }
                        }
                        Err(err) => {
                            if !sense_fault_logged {
                                warn!("sense channel {} read failed: {:?}", asset, err);
                                sense_fault_logged = true;
                            }
                        }
                    }
                }
            }

            let connectivity = CONNECTIVITY.snapshot();
            let connectivity_changed = connectivity.revision != last_connectivity_revision;
            let app_requests_render = app.tick(now_ms) == TickResult::RenderRequested;

            if app_requests_render || connectivity_changed {
                let addr = connectivity.addr_text();
                let view = NetworkView {
                    ssid: WIFI_CONFIG.ssid,
                    addr: &addr,
                };

                let mut term = OledTerminal::new(&mut frame, &mut display);
                app.render(now_ms, view, &mut term);

                last_connectivity_revision = connectivity.revision;
            }

            config_sync.track_current(app.schedule(), now_ms);
            config_sync.flush_if_due(config_store.as_mut(), now_ms);

            Timer::after_millis(1).await;
        }
    };

    let _ = embassy_futures::join::join3(net_future, wifi_future, ui_future).await;
    unreachable!()
}
