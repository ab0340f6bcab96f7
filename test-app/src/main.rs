// atcs test application -- CLI tool for exercising an ATCS mount controller
// against real hardware or a scripted mock transport.
//
// Usage:
//   atcs-test-app --port /dev/ttyUSB0 info
//   atcs-test-app --port /dev/ttyUSB0 coords
//   atcs-test-app --port /dev/ttyUSB0 slew 5.5 -20.25 --wait
//   atcs-test-app --port COM3 --topology asymmetrical move north --rate 2 --duration-ms 1500
//   atcs-test-app --port /dev/ttyUSB0 track custom 15.0 -2.5
//   atcs-test-app --mock coords
//   atcs-test-app rates
//
// Set RUST_LOG=debug to see every command on the wire.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use atcs::angle::{format_dec, format_ra};
use atcs::{AtcsMount, Direction, MountBuilder, MountTopology, OPEN_LOOP_RATES, TrackingMode};
use atcs_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// atcs test application -- drives an ATCS mount from the command line.
#[derive(Parser)]
#[command(name = "atcs-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Use a scripted mock transport instead of a real serial port.
    /// Useful for verifying CLI parsing and builder wiring without hardware.
    #[arg(long)]
    mock: bool,

    /// Mount layout; decides alignment type and meridian policy.
    #[arg(long, value_enum, default_value_t = TopologyArg::Symmetrical)]
    topology: TopologyArg,

    /// Per-frame reply timeout in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum TopologyArg {
    Symmetrical,
    Asymmetrical,
    Altaz,
}

impl From<TopologyArg> for MountTopology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Symmetrical => MountTopology::SymmetricalEquatorial,
            TopologyArg::Asymmetrical => MountTopology::AsymmetricalEquatorial,
            TopologyArg::Altaz => MountTopology::AltAz,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print controller info, alignment and park state.
    Info,

    /// Print the current RA/Dec.
    Coords,

    /// Sync the sky model to RA (hours) / Dec (degrees).
    Sync {
        ra: f64,
        #[arg(allow_hyphen_values = true)]
        dec: f64,
    },

    /// Goto RA (hours) / Dec (degrees).
    Slew {
        ra: f64,
        #[arg(allow_hyphen_values = true)]
        dec: f64,
        /// Poll until the slew completes.
        #[arg(long)]
        wait: bool,
    },

    /// Open-loop move for a fixed time, then stop.
    Move {
        /// n, s, e, w (or north, south, east, west).
        direction: String,
        /// Rate index; see `rates`.
        #[arg(long, default_value_t = 1)]
        rate: usize,
        #[arg(long, default_value_t = 1000)]
        duration_ms: u64,
    },

    /// Stop all motion.
    Abort,

    /// Tracking operations.
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Park operations.
    Park {
        #[command(subcommand)]
        action: ParkAction,
    },

    /// Print the hour-angle soft limits.
    Limits,

    /// Site operations.
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Controller clock operations.
    Time {
        #[command(subcommand)]
        action: TimeAction,
    },

    /// Read or set atmospheric refraction correction.
    Refraction {
        /// on or off; omit to read.
        state: Option<String>,
    },

    /// List open-loop rates (no connection needed).
    Rates,
}

#[derive(Subcommand)]
enum TrackAction {
    /// Read the tracking mode and offsets.
    Get,
    /// Tracking off.
    Off,
    Sidereal,
    /// Sidereal plus offsets in arcseconds per hour.
    Custom {
        #[arg(allow_hyphen_values = true)]
        ra_offset: f64,
        #[arg(allow_hyphen_values = true)]
        dec_offset: f64,
    },
}

#[derive(Subcommand)]
enum ParkAction {
    /// Goto the park position.
    Go,
    /// Store the current position as park.
    Mark,
    /// Is the mount parked?
    Status,
    /// Leave park and resume tracking.
    Unpark,
}

#[derive(Subcommand)]
enum SiteAction {
    /// Print the site in use.
    Get,
    /// Write longitude (east positive), latitude and UTC offset in hours.
    Set {
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        timezone: f64,
    },
}

#[derive(Subcommand)]
enum TimeAction {
    /// Print the controller's date and time.
    Get,
    /// Push the host's local date and time.
    Sync,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_on_off(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "ON" } else { "OFF" }
}

/// Canned controller replies for `command`, so `--mock` runs end to end.
fn mock_transport(command: &Command) -> MockTransport {
    let mut mock = MockTransport::new();
    match command {
        Command::Info => {
            mock.expect_reply(b"!HGfv;", "2.1.7");
            mock.expect_reply(b"!HGsm;", "ATCS-2");
            mock.expect_reply(b"!HGtf;", "None");
            mock.expect_reply(b"!AGas;", "Complete");
            mock.expect_reply(b"!AGak;", "No");
        }
        Command::Coords => {
            mock.expect_reply(b"!CGra;", "05:34:31.9");
            mock.expect_reply(b"!CGde;", "+22:00:52");
        }
        Command::Limits => {
            mock.expect_reply(b"!NGle;", "-95.0");
            mock.expect_reply(b"!NGlw;", "95.0");
        }
        Command::Park {
            action: ParkAction::Status,
        } => {
            mock.expect_reply(b"!AGak;", "Yes");
        }
        Command::Track {
            action: TrackAction::Get,
        } => {
            mock.expect_reply(b"!RGtr;", "Sidereal");
            mock.expect_reply(b"!RGor;", "0.00");
            mock.expect_reply(b"!RGod;", "0.00");
        }
        _ => {}
    }
    mock
}

async fn create_mount(cli: &Cli) -> Result<AtcsMount> {
    let builder = MountBuilder::new()
        .topology(cli.topology.into())
        .command_timeout(Duration::from_millis(cli.timeout_ms));

    if cli.mock {
        let mount = builder
            .build_with_transport(Box::new(mock_transport(&cli.command)))
            .context("failed to build mount with mock transport")?;
        println!("Connected (mock transport)");
        return Ok(mount);
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required when not using --mock")?;
    let mount = builder
        .serial_port(port)
        .build()
        .await
        .with_context(|| format!("failed to connect to ATCS controller on {port}"))?;
    println!("Connected to {port}");
    Ok(mount)
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_info(mount: &mut AtcsMount) -> Result<()> {
    let firmware = mount.firmware_version().await?;
    let model = mount.model().await?;
    let fault = mount.top_active_fault().await?;
    let alignment = mount.alignment_status().await?;
    let parked = mount.is_parked().await?;

    println!("Controller");
    println!("  Model:          {model}");
    println!("  Firmware:       {firmware}");
    println!("  Top fault:      {fault}");
    println!("  Alignment:      {alignment}");
    println!("  Parked:         {}", if parked { "yes" } else { "no" });
    println!("  Topology:       {:?}", mount.config().topology);
    Ok(())
}

async fn cmd_coords(mount: &mut AtcsMount) -> Result<()> {
    let pos = mount.ra_dec().await?;
    println!("RA:  {}  ({:.5} h)", format_ra(pos.ra), pos.ra);
    println!("Dec: {}  ({:.5}°)", format_dec(pos.dec), pos.dec);
    Ok(())
}

async fn cmd_slew(mount: &mut AtcsMount, ra: f64, dec: f64, wait: bool) -> Result<()> {
    mount.start_slew_to(ra, dec).await?;
    println!("Slewing to {} {}", format_ra(ra), format_dec(dec));
    if !wait {
        return Ok(());
    }

    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        if mount.is_slew_complete().await? {
            break;
        }
    }
    println!("Slew complete.");
    Ok(())
}

async fn cmd_move(mount: &mut AtcsMount, direction: &str, rate: usize, duration_ms: u64) -> Result<()> {
    let direction: Direction = direction.parse()?;
    let name = mount
        .rate_name(rate)
        .with_context(|| format!("rate {rate} out of range, see `rates`"))?;

    mount.start_open_loop(direction, rate).await?;
    println!("Moving {direction:?} at {name} for {duration_ms} ms");
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
    mount.stop_open_loop().await?;
    println!("Stopped.");
    Ok(())
}

async fn cmd_track(mount: &mut AtcsMount, action: &TrackAction) -> Result<()> {
    let mode = match action {
        TrackAction::Get => {
            let rates = mount.tracking_rates().await?;
            println!("Tracking:   {}", on_off(rates.tracking_on));
            println!("RA offset:  {:.2} arcsec/h", rates.ra_offset);
            println!("Dec offset: {:.2} arcsec/h", rates.dec_offset);
            return Ok(());
        }
        TrackAction::Off => TrackingMode::Drift,
        TrackAction::Sidereal => TrackingMode::Sidereal,
        TrackAction::Custom {
            ra_offset,
            dec_offset,
        } => TrackingMode::Custom {
            ra_offset: *ra_offset,
            dec_offset: *dec_offset,
        },
    };
    mount.set_tracking(mode).await?;
    println!("Tracking set to {mode:?}");
    Ok(())
}

async fn cmd_park(mount: &mut AtcsMount, action: &ParkAction) -> Result<()> {
    match action {
        ParkAction::Go => {
            mount.goto_park().await?;
            println!("Parking.");
        }
        ParkAction::Mark => {
            mount.mark_park_position().await?;
            println!("Park position stored.");
        }
        ParkAction::Status => {
            let parked = mount.is_parked().await?;
            println!("Parked: {}", if parked { "yes" } else { "no" });
        }
        ParkAction::Unpark => {
            mount.unpark().await?;
            println!("Unparked, tracking sidereal.");
        }
    }
    Ok(())
}

async fn cmd_limits(mount: &mut AtcsMount) -> Result<()> {
    let limits = mount.soft_limits().await?;
    println!("East limit: {:+.3} h", limits.east_hours);
    println!("West limit: {:+.3} h", limits.west_hours);
    Ok(())
}

async fn cmd_site(mount: &mut AtcsMount, action: &SiteAction) -> Result<()> {
    match action {
        SiteAction::Get => {
            let n = mount.site_number().await?;
            let name = mount.site_name().await?;
            println!("Site {n}: {name}");
        }
        SiteAction::Set {
            longitude,
            latitude,
            timezone,
        } => {
            mount.set_site_data(*longitude, *latitude, *timezone).await?;
            println!("Site updated.");
        }
    }
    Ok(())
}

async fn cmd_time(mount: &mut AtcsMount, action: &TimeAction) -> Result<()> {
    match action {
        TimeAction::Get => {
            let date = mount.standard_date().await?;
            let time = mount.standard_time().await?;
            println!("{date} {time}");
        }
        TimeAction::Sync => {
            mount.local_time_format().await?;
            mount.date_format().await?;
            mount.sync_time().await?;
            mount.sync_date().await?;
            println!("Controller clock set from host.");
        }
    }
    Ok(())
}

async fn cmd_refraction(mount: &mut AtcsMount, state: Option<&str>) -> Result<()> {
    match state {
        Some(s) => {
            let on = parse_on_off(s)?;
            mount.set_refraction_correction(on).await?;
            println!("Refraction correction: {}", on_off(on));
        }
        None => {
            let on = mount.refraction_correction().await?;
            println!("Refraction correction: {}", on_off(on));
        }
    }
    Ok(())
}

fn cmd_rates() -> Result<()> {
    println!("{:<6} Name", "Index");
    for (i, name) in OPEN_LOOP_RATES.iter().enumerate() {
        println!("{i:<6} {name}");
    }
    Ok(())
}

async fn run(mount: &mut AtcsMount, command: &Command) -> Result<()> {
    match command {
        Command::Info => cmd_info(mount).await,
        Command::Coords => cmd_coords(mount).await,
        Command::Sync { ra, dec } => {
            mount.sync(*ra, *dec).await?;
            println!("Synced to {} {}", format_ra(*ra), format_dec(*dec));
            Ok(())
        }
        Command::Slew { ra, dec, wait } => cmd_slew(mount, *ra, *dec, *wait).await,
        Command::Move {
            direction,
            rate,
            duration_ms,
        } => cmd_move(mount, direction, *rate, *duration_ms).await,
        Command::Abort => {
            mount.abort().await?;
            println!("All motion stopped.");
            Ok(())
        }
        Command::Track { action } => cmd_track(mount, action).await,
        Command::Park { action } => cmd_park(mount, action).await,
        Command::Limits => cmd_limits(mount).await,
        Command::Site { action } => cmd_site(mount, action).await,
        Command::Time { action } => cmd_time(mount, action).await,
        Command::Refraction { state } => cmd_refraction(mount, state.as_deref()).await,
        Command::Rates => cmd_rates(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // The `rates` command does not require a connection.
    if matches!(&cli.command, Command::Rates) {
        return cmd_rates();
    }

    let mut mount = create_mount(&cli).await?;
    let result = run(&mut mount, &cli.command).await;
    mount.disconnect().await.ok();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_off_parsing() {
        assert!(parse_on_off("on").unwrap());
        assert!(!parse_on_off("OFF").unwrap());
        assert!(parse_on_off("maybe").is_err());
    }

    #[test]
    fn cli_parses_negative_dec() {
        let cli = Cli::try_parse_from(["atcs-test-app", "--mock", "slew", "5.5", "-20.25"]).unwrap();
        match cli.command {
            Command::Slew { ra, dec, wait } => {
                assert_eq!(ra, 5.5);
                assert_eq!(dec, -20.25);
                assert!(!wait);
            }
            _ => panic!("expected slew"),
        }
    }

    #[tokio::test]
    async fn mock_info_runs_end_to_end() {
        let cli = Cli::try_parse_from(["atcs-test-app", "--mock", "info"]).unwrap();
        let mut mount = create_mount(&cli).await.unwrap();
        run(&mut mount, &cli.command).await.unwrap();
    }

    #[tokio::test]
    async fn mock_coords_runs_end_to_end() {
        let cli = Cli::try_parse_from(["atcs-test-app", "--mock", "coords"]).unwrap();
        let mut mount = create_mount(&cli).await.unwrap();
        run(&mut mount, &cli.command).await.unwrap();
    }

    #[tokio::test]
    async fn port_required_without_mock() {
        let cli = Cli::try_parse_from(["atcs-test-app", "coords"]).unwrap();
        assert!(create_mount(&cli).await.is_err());
    }
}
