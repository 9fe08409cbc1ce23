#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, select3, Either, Either3};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use portable_atomic::{AtomicU32, Ordering};
use rover_link_rp2040::{
    link_config, read_byte, CommandMailbox, DriveState, FrameOutcome, LinkSession, RoverAction,
    TelemetrySample, UartFrameSink, COMMAND_BUFFER_LEN, FRAME_TIMEOUT_MS, LINK_BAUDRATE,
    RX_BUFFER_SIZE, TELEMETRY_PERIOD_MS,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

type RxBytes = Channel<CriticalSectionRawMutex, u8, RX_BUFFER_SIZE>;
type Mailbox = CommandMailbox<CriticalSectionRawMutex, COMMAND_BUFFER_LEN>;
type TelemetrySignal = Signal<CriticalSectionRawMutex, TelemetrySample>;

/// Received bytes on their way from the UART reader to the link task.
static RX_BYTES: StaticCell<RxBytes> = StaticCell::new();

/// Decoded commands on their way from the link task to the rover task.
static MAILBOX: StaticCell<Mailbox> = StaticCell::new();

/// Telemetry waiting to be sent. Using Signal gives "latest value wins"
/// semantics: a sample that was never sent is replaced by a newer one.
static TELEMETRY_SIGNAL: StaticCell<TelemetrySignal> = StaticCell::new();

/// Commands applied by the rover task, reported with the link statistics.
static COMMANDS_APPLIED: AtomicU32 = AtomicU32::new(0);

/// Link statistics are logged every this many timeout ticks (10 s).
const STATS_EVERY_TICKS: u32 = 100;

/// Rover control loop period.
const CONTROL_PERIOD: Duration = Duration::from_millis(10);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Rover link starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let rx_bytes = RX_BYTES.init(Channel::new());
    let mailbox = MAILBOX.init(CommandMailbox::new());
    let telemetry = TELEMETRY_SIGNAL.init(Signal::new());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = LINK_BAUDRATE;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();
    let session = LinkSession::with_config(UartFrameSink::new(tx), link_config());

    // On-board LED on Pico, toggled per applied command
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(uart_rx_task(rx, rx_bytes).unwrap());
    spawner.spawn(link_task(session, rx_bytes, mailbox, telemetry).unwrap());
    spawner.spawn(rover_task(mailbox, telemetry, led).unwrap());

    info!("Rover link initialized, waiting for commands...");
}

/// UART RX task - the only place the receiver is awaited.
///
/// The read is never raced against other futures; the link task selects on
/// the channel instead.
#[embassy_executor::task]
async fn uart_rx_task(mut rx: UartRx<'static, Async>, bytes: &'static RxBytes) {
    loop {
        match read_byte(&mut rx).await {
            Ok(byte) => bytes.send(byte).await,
            Err(e) => error!("UART error: {:?}", e),
        }
    }
}

/// Link task - owns the session, answers frames, and sends telemetry.
#[embassy_executor::task]
async fn link_task(
    mut session: LinkSession<UartFrameSink<'static>>,
    rx_bytes: &'static RxBytes,
    mailbox: &'static Mailbox,
    telemetry: &'static TelemetrySignal,
) {
    let mut ticker = Ticker::every(Duration::from_millis(FRAME_TIMEOUT_MS));
    let mut ticks: u32 = 0;

    loop {
        match select3(rx_bytes.receive(), telemetry.wait(), ticker.next()).await {
            Either3::First(byte) => {
                let now = Instant::now().as_millis();
                if let Some(FrameOutcome::Overflow) = session.push_byte_at(byte, now) {
                    warn!("Frame overflow, waiting for next start marker");
                }

                while let Some(cmd) = session.next_command() {
                    if let Some(dropped) = mailbox.post(cmd) {
                        warn!("Rover busy, dropped command #{}", dropped.id);
                    }
                }
            }
            Either3::Second(sample) => {
                if let Err(e) = session.send_telemetry(&sample) {
                    error!("Telemetry send failed: {}", e);
                }
            }
            Either3::Third(()) => {
                session.poll_timeout(Instant::now().as_millis());

                ticks = ticks.wrapping_add(1);
                if ticks % STATS_EVERY_TICKS == 0 {
                    info!(
                        "Link stats: {}, commands applied: {}",
                        session.stats(),
                        COMMANDS_APPLIED.load(Ordering::Relaxed)
                    );
                }
            }
        }
    }
}

/// Rover task - applies commands to the wheels and produces telemetry.
#[embassy_executor::task]
async fn rover_task(
    mailbox: &'static Mailbox,
    telemetry: &'static TelemetrySignal,
    mut led: Output<'static>,
) {
    let mut control = Ticker::every(CONTROL_PERIOD);
    let mut report = Ticker::every(Duration::from_millis(TELEMETRY_PERIOD_MS));
    let mut drive = DriveState::new();
    let mut sequence: u32 = 0;

    loop {
        match select(control.next(), report.next()).await {
            Either::First(()) => {
                while let Some(cmd) = mailbox.take() {
                    let action = drive.apply(&cmd);
                    COMMANDS_APPLIED.fetch_add(1, Ordering::Relaxed);
                    led.toggle();
                    info!(
                        "#{} {}: left={} right={}",
                        cmd.id, action, drive.left_speed, drive.right_speed
                    );

                    if action == RoverAction::GetTelemetry {
                        sequence = sequence.wrapping_add(1);
                        // Signal the latest sample (overwrites any unsent one)
                        telemetry.signal(drive.simulated_telemetry(sequence));
                    }
                }
            }
            Either::Second(()) => {
                sequence = sequence.wrapping_add(1);
                telemetry.signal(drive.simulated_telemetry(sequence));
            }
        }
    }
}
