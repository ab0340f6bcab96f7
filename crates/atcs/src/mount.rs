//! AtcsMount -- mount control for ATCS controllers.
//!
//! The mount owns one [`Framer`] while connected and runs every operation
//! as a plain sequence of catalog commands. Operations take `&mut self`, so
//! a second command can never be sent while a reply is outstanding.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use atcs_atcl::io::{Framer, FramerConfig};
use atcs_atcl::protocol::MAX_FRAME;
use atcs_core::angle::{sexagesimal_to_degrees, sexagesimal_to_hours};
use atcs_core::error::{Error, Result};
use atcs_core::geometry::SkyGeometry;
use atcs_core::transport::{PortOpener, Transport};
use atcs_core::types::{
    AlignmentStatus, Axis, DateOrder, Direction, MountTopology, RaDec, SoftLimits, TimeFormat,
    TrackingMode, TrackingRates,
};

use crate::commands::{self, Arg, CommandSpec, Value};
use crate::session::{LinkState, Session};
use crate::site;

/// Open-loop rates by index. The last entry is the full slew rate.
pub const OPEN_LOOP_RATES: [&str; 5] = ["ViewVel 1", "ViewVel 2", "ViewVel 3", "ViewVel 4", "Slew"];

const SLEW_RATE_INDEX: usize = OPEN_LOOP_RATES.len() - 1;

/// `CGra`/`CGde` reply while the controller has no sky model.
const NO_COORDINATES: &str = "N/A";

/// Timing and layout settings for a mount.
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub topology: MountTopology,
    /// Per-frame reply timeout.
    pub command_timeout: Duration,
    /// How long to keep retrying the ENTER handshake.
    pub handshake_budget: Duration,
    /// After a goto, report "still slewing" for this long without asking.
    /// The controller needs a moment before its progress counter is valid.
    pub slew_settle: Duration,
    pub max_frame: usize,
}

impl Default for MountConfig {
    fn default() -> Self {
        MountConfig {
            topology: MountTopology::default(),
            command_timeout: Duration::from_secs(1),
            handshake_budget: Duration::from_secs(3),
            slew_settle: Duration::from_secs(2),
            max_frame: MAX_FRAME,
        }
    }
}

/// An ATCS-controlled telescope mount.
pub struct AtcsMount {
    config: MountConfig,
    opener: Arc<dyn PortOpener>,
    geometry: Arc<dyn SkyGeometry>,
    framer: Option<Framer>,
    session: Session,
}

/// Log a failed connect housekeeping step and carry on.
fn housekeeping<T>(step: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(step, error = %e, "connect step failed, continuing");
            None
        }
    }
}

/// Wrap a failed step of a compound operation, leaving link failures as
/// they are so the host still sees them.
fn failed_step(step: &'static str) -> impl Fn(Error) -> Error {
    move |e| {
        if e.is_link_failure() || matches!(e, Error::NotConnected) {
            e
        } else {
            Error::CommandFailed(format!("{step}: {e}"))
        }
    }
}

/// Wake the controller: ENTER then `QDcn` until `QDcn` succeeds or the
/// budget runs out.
async fn handshake(framer: &mut Framer, budget: Duration) -> Result<()> {
    let start = Instant::now();
    let enter = commands::encode(&commands::ENTER, Arg::None)?;
    let probe = commands::encode(&commands::DISABLE_CHANGE_NOTIFICATIONS, Arg::None)?;

    loop {
        if let Err(e) = framer.execute(&enter).await {
            debug!(error = %e, "no reply to ENTER");
        }
        match framer.execute(&probe).await {
            Ok(_) => {
                debug!(elapsed_ms = start.elapsed().as_millis() as u64, "handshake complete");
                return Ok(());
            }
            Err(e) if e.is_link_failure() || matches!(e, Error::NotConnected) => {
                warn!(error = %e, "link failed during handshake");
                return Err(Error::NoLink);
            }
            Err(e) => {
                if start.elapsed() > budget {
                    warn!(error = %e, budget_ms = budget.as_millis() as u64, "controller never answered");
                    return Err(Error::NoLink);
                }
                debug!(error = %e, "handshake attempt failed, retrying");
            }
        }
    }
}

impl AtcsMount {
    pub(crate) fn new(
        config: MountConfig,
        opener: Arc<dyn PortOpener>,
        geometry: Arc<dyn SkyGeometry>,
    ) -> Self {
        AtcsMount {
            config,
            opener,
            geometry,
            framer: None,
            session: Session::default(),
        }
    }

    /// Adopt an already-open transport as a ready link, skipping the
    /// handshake and housekeeping.
    pub(crate) fn attach(&mut self, transport: Box<dyn Transport>) {
        self.session.reset();
        self.framer = Some(Framer::new(transport, self.framer_config()));
        self.session.link = LinkState::Ready;
    }

    fn framer_config(&self) -> FramerConfig {
        FramerConfig {
            command_timeout: self.config.command_timeout,
            max_frame: self.config.max_frame,
        }
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.framer.is_some() && self.session.is_ready()
    }

    fn ensure_connected(&self) -> Result<()> {
        let usable = matches!(self.session.link, LinkState::Configuring | LinkState::Ready);
        if usable && self.framer.is_some() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    async fn exec(&mut self, spec: &CommandSpec, arg: Arg<'_>) -> Result<Value> {
        self.ensure_connected()?;
        let framer = self.framer.as_mut().ok_or(Error::NotConnected)?;
        commands::execute(framer, spec, arg).await
    }

    async fn exec_text(&mut self, spec: &CommandSpec) -> Result<String> {
        self.exec(spec, Arg::None).await?.into_text()
    }

    // -----------------------------------------------------------------
    // Connection
    // -----------------------------------------------------------------

    /// Open `port`, wake the controller, and push session settings.
    ///
    /// Fails with [`Error::CommLink`] if the port will not open and with
    /// [`Error::NoLink`] if the controller does not answer within the
    /// handshake budget. Once the controller has answered, failures in the
    /// remaining setup steps are logged and do not fail the connect.
    pub async fn connect(&mut self, port: &str) -> Result<()> {
        if self.framer.is_some() {
            self.disconnect().await?;
        }

        info!(port, "connecting to ATCS controller");
        self.session.reset();
        self.session.link = LinkState::Handshaking;

        let transport = match self.opener.open(port).await {
            Ok(t) => t,
            Err(e) => {
                self.session.link = LinkState::Disconnected;
                return Err(match e {
                    Error::CommLink(_) => e,
                    other => Error::CommLink(other.to_string()),
                });
            }
        };

        let mut framer = Framer::new(transport, self.framer_config());
        if let Err(e) = handshake(&mut framer, self.config.handshake_budget).await {
            if let Err(close_err) = framer.close().await {
                warn!(error = %close_err, "closing port after failed handshake");
            }
            self.session.link = LinkState::Disconnected;
            return Err(e);
        }

        self.framer = Some(framer);
        self.session.link = LinkState::Configuring;
        self.configure().await;
        self.session.link = LinkState::Ready;

        info!(port, "ATCS controller ready");
        Ok(())
    }

    async fn configure(&mut self) {
        let topology = self.config.topology;

        housekeeping(
            "disable packet sequencing",
            self.exec(&commands::DISABLE_PACKET_SEQUENCING, Arg::None).await,
        );
        housekeeping(
            "disable change notifications",
            self.exec(&commands::DISABLE_CHANGE_NOTIFICATIONS, Arg::None).await,
        );
        housekeeping(
            "alignment type",
            self.exec(&commands::SET_ALIGNMENT_TYPE, Arg::Word(topology.alignment_type()))
                .await,
        );
        housekeeping(
            "meridian policy",
            self.exec(&commands::SET_MERIDIAN_POLICY, Arg::Word(topology.meridian_policy()))
                .await,
        );
        housekeeping(
            "epoch of entry",
            self.exec(&commands::SET_EPOCH_NOW, Arg::None).await,
        );
        self.session.jnow = true;

        let set_once = self
            .exec(&commands::SITE_TIME_SET_ONCE, Arg::None)
            .await
            .and_then(Value::into_flag);
        if let Some(set_once) = housekeeping("time set once", set_once) {
            self.session.time_set_once = set_once;
            housekeeping("local time format", self.local_time_format().await);
            housekeeping("date format", self.date_format().await);
            if !set_once {
                info!("controller clock was never set, pushing host time and date");
                housekeeping("set time", self.sync_time().await);
                housekeeping("set date", self.sync_date().await);
            }
        }

        if let Some(false) = housekeeping("at park", self.is_parked().await) {
            let status = housekeeping("alignment status", self.alignment_status().await);
            if status.as_ref().is_some_and(AlignmentStatus::is_aligned) {
                info!("not parked and aligned, resuming sidereal tracking");
                housekeeping(
                    "resume tracking",
                    self.set_tracking(TrackingMode::Sidereal).await,
                );
            }
        }

        self.session.soft_limits = None;
    }

    /// Purge and close the port and forget all session state. Safe to call
    /// when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut framer) = self.framer.take() {
            info!("disconnecting from ATCS controller");
            if let Err(e) = framer.close().await {
                warn!(error = %e, "error closing port (continuing anyway)");
            }
        }
        self.session.reset();
        Ok(())
    }

    /// Turn asynchronous status updates on or off.
    pub async fn set_async_updates(&mut self, enabled: bool) -> Result<()> {
        debug!(enabled, "set_async_updates");
        self.exec(&commands::SET_ASYNC_UPDATES, Arg::Flag(enabled))
            .await
            .map(drop)
    }

    // -----------------------------------------------------------------
    // Hardware info
    // -----------------------------------------------------------------

    pub async fn firmware_version(&mut self) -> Result<String> {
        self.exec_text(&commands::FIRMWARE_VERSION).await
    }

    pub async fn model(&mut self) -> Result<String> {
        self.exec_text(&commands::MODEL).await
    }

    /// The most severe fault the controller currently reports.
    pub async fn top_active_fault(&mut self) -> Result<String> {
        self.exec_text(&commands::TOP_ACTIVE_FAULT).await
    }

    // -----------------------------------------------------------------
    // Coordinates and alignment
    // -----------------------------------------------------------------

    /// Current pointing in JNOW.
    ///
    /// Without a sky model the controller answers `N/A`; that reads as
    /// zero rather than an error.
    pub async fn ra_dec(&mut self) -> Result<RaDec> {
        let ra_text = self.exec_text(&commands::GET_RA).await?;
        if ra_text == NO_COORDINATES {
            debug!("no coordinates until the mount is aligned");
            return Ok(RaDec::default());
        }
        let ra = sexagesimal_to_hours(&ra_text)?;

        // The mount may have reached park between the two reads.
        let dec_text = self.exec_text(&commands::GET_DEC).await?;
        if dec_text == NO_COORDINATES {
            return Ok(RaDec { ra, dec: 0.0 });
        }
        let dec = sexagesimal_to_degrees(&dec_text)?;

        Ok(RaDec { ra, dec })
    }

    async fn set_target(&mut self, ra: f64, dec: f64) -> Result<()> {
        self.exec(&commands::SET_TARGET_RA, Arg::Hours(ra)).await?;
        self.exec(&commands::SET_TARGET_DEC, Arg::Degrees(dec)).await?;
        Ok(())
    }

    /// Alignment state, always read from the controller.
    pub async fn alignment_status(&mut self) -> Result<AlignmentStatus> {
        let text = self.exec_text(&commands::ALIGNMENT_STATUS).await?;
        Ok(AlignmentStatus::from_reply(&text))
    }

    pub async fn is_aligned(&mut self) -> Result<bool> {
        Ok(self.alignment_status().await?.is_aligned())
    }

    pub async fn alignment_type(&mut self) -> Result<String> {
        self.exec_text(&commands::GET_ALIGNMENT_TYPE).await
    }

    pub async fn set_alignment_type(&mut self, kind: &str) -> Result<()> {
        self.exec(&commands::SET_ALIGNMENT_TYPE, Arg::Word(kind))
            .await
            .map(drop)
    }

    /// Tell the controller the mount is pointing at `ra`/`dec`.
    ///
    /// Builds the first sky model when there is none, otherwise refines
    /// the existing one.
    pub async fn sync(&mut self, ra: f64, dec: f64) -> Result<()> {
        let status = self
            .alignment_status()
            .await
            .map_err(failed_step("sync: read alignment"))?;
        self.set_target(ra, dec)
            .await
            .map_err(failed_step("sync: set target"))?;

        let spec = if status.is_aligned() {
            &commands::CALIBRATE_NOW
        } else {
            &commands::ALIGN_FROM_TARGET_NOW
        };
        info!(%status, command = spec.name, ra, dec, "sync");
        self.exec(spec, Arg::None)
            .await
            .map_err(failed_step("sync"))?;
        Ok(())
    }

    /// Build a new sky model from `ra`/`dec` given in the epoch of entry
    /// rather than JNOW.
    pub async fn align_from_target(&mut self, ra: f64, dec: f64) -> Result<()> {
        self.target_then(&commands::ALIGN_FROM_TARGET, ra, dec).await
    }

    /// Refine the sky model from `ra`/`dec` given in the epoch of entry
    /// rather than JNOW.
    pub async fn calibrate(&mut self, ra: f64, dec: f64) -> Result<()> {
        self.target_then(&commands::CALIBRATE, ra, dec).await
    }

    async fn target_then(&mut self, spec: &CommandSpec, ra: f64, dec: f64) -> Result<()> {
        self.set_target(ra, dec)
            .await
            .map_err(failed_step("set target"))?;
        info!(command = spec.name, ra, dec, "model update");
        self.exec(spec, Arg::None)
            .await
            .map_err(failed_step(spec.name))?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Slewing
    // -----------------------------------------------------------------

    /// Start a goto and arm the settle guard.
    pub async fn start_slew_to(&mut self, ra: f64, dec: f64) -> Result<()> {
        self.ensure_connected()?;
        match self.alignment_status().await {
            Ok(status) => debug!(%status, "alignment before slew"),
            Err(e) => warn!(error = %e, "could not read alignment before slew"),
        }

        self.set_target(ra, dec).await?;
        self.exec(&commands::GOTO_TARGET, Arg::None).await?;
        self.session.slew_started = Some(Instant::now());
        info!(ra, dec, "slew started");
        Ok(())
    }

    /// Whether the last goto has finished.
    ///
    /// Inside the settle window this answers `false` without touching the
    /// wire.
    pub async fn is_slew_complete(&mut self) -> Result<bool> {
        self.ensure_connected()?;
        if let Some(started) = self.session.slew_started {
            if started.elapsed() < self.config.slew_settle {
                return Ok(false);
            }
        }

        let remaining = self
            .exec(&commands::SLEW_PROGRESS, Arg::None)
            .await?
            .into_integer()?;
        debug!(remaining, "slew progress");

        if remaining == 0 {
            self.session.slew_started = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Stop everything.
    pub async fn abort(&mut self) -> Result<()> {
        self.exec(&commands::ABORT, Arg::None).await?;
        self.session.open_loop = None;
        self.session.slew_started = None;
        warn!("all motion aborted");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Open-loop moves
    // -----------------------------------------------------------------

    pub fn rate_count(&self) -> usize {
        OPEN_LOOP_RATES.len()
    }

    pub fn rate_name(&self, index: usize) -> Option<&'static str> {
        OPEN_LOOP_RATES.get(index).copied()
    }

    /// Start moving in `direction` at rate `rate_index` (see
    /// [`OPEN_LOOP_RATES`]) until [`stop_open_loop`](Self::stop_open_loop).
    pub async fn start_open_loop(&mut self, direction: Direction, rate_index: usize) -> Result<()> {
        self.ensure_connected()?;
        let Some(rate) = self.rate_name(rate_index) else {
            return Err(Error::InvalidParameter(format!(
                "open-loop rate index {rate_index} out of range 0..{}",
                OPEN_LOOP_RATES.len()
            )));
        };
        debug!(?direction, rate, "start_open_loop");

        if rate_index == SLEW_RATE_INDEX {
            self.exec(&commands::SELECT_SLEW_RATE, Arg::None).await?;
        } else {
            self.exec(&commands::CLEAR_SLEW_RATE, Arg::None).await?;
            let velocity = rate_index as u32 + 1;
            self.exec(&commands::SELECT_VIEW_VELOCITY, Arg::Index(velocity))
                .await?;
        }

        self.session.open_loop = Some(direction);
        let spec = match direction {
            Direction::North => &commands::MOVE_NORTH,
            Direction::South => &commands::MOVE_SOUTH,
            Direction::East => &commands::MOVE_EAST,
            Direction::West => &commands::MOVE_WEST,
        };
        self.exec(spec, Arg::None).await?;
        Ok(())
    }

    /// Stop the open-loop move in progress. Nothing is sent if there is
    /// none.
    pub async fn stop_open_loop(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let Some(direction) = self.session.open_loop.take() else {
            return Ok(());
        };

        let spec = match direction.axis() {
            Axis::Declination => &commands::STOP_DEC_AXIS,
            Axis::RightAscension => &commands::STOP_RA_AXIS,
        };
        debug!(?direction, "stop_open_loop");
        self.exec(spec, Arg::None).await?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Tracking
    // -----------------------------------------------------------------

    pub async fn set_tracking(&mut self, mode: TrackingMode) -> Result<()> {
        debug!(?mode, "set_tracking");
        match mode {
            TrackingMode::Drift => {
                self.exec(&commands::SET_TRACKING_MODE, Arg::Word("Drift"))
                    .await?;
            }
            TrackingMode::Sidereal => {
                self.exec(&commands::SET_TRACKING_MODE, Arg::Word("Sidereal"))
                    .await?;
            }
            TrackingMode::Custom {
                ra_offset,
                dec_offset,
            } => {
                // No point switching to custom if the offsets did not stick.
                self.exec(&commands::SET_RA_OFFSET, Arg::Number(ra_offset))
                    .await
                    .map_err(failed_step("set RA rate offset"))?;
                self.exec(&commands::SET_DEC_OFFSET, Arg::Number(dec_offset))
                    .await
                    .map_err(failed_step("set Dec rate offset"))?;
                self.exec(&commands::SET_TRACKING_MODE, Arg::Word("Custom"))
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn tracking_rates(&mut self) -> Result<TrackingRates> {
        let mode = self.exec_text(&commands::GET_TRACKING_MODE).await?;
        let ra_offset = self
            .exec(&commands::GET_RA_OFFSET, Arg::None)
            .await?
            .into_number()?;
        let dec_offset = self
            .exec(&commands::GET_DEC_OFFSET, Arg::None)
            .await?
            .into_number()?;
        Ok(TrackingRates {
            tracking_on: mode != "Drift",
            ra_offset,
            dec_offset,
        })
    }

    // -----------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------

    /// Hour-angle soft limits. Read once per connection, then cached.
    pub async fn soft_limits(&mut self) -> Result<SoftLimits> {
        self.ensure_connected()?;
        if let Some(limits) = self.session.soft_limits {
            return Ok(limits);
        }

        let east = self
            .exec(&commands::EAST_LIMIT, Arg::None)
            .await?
            .into_number()?;
        let west = self
            .exec(&commands::WEST_LIMIT, Arg::None)
            .await?
            .into_number()?;

        let limits = SoftLimits {
            east_hours: self.geometry.hour_angle(east),
            west_hours: self.geometry.hour_angle(west),
        };
        debug!(east, west, ?limits, "soft limits");
        self.session.soft_limits = Some(limits);
        Ok(limits)
    }

    // -----------------------------------------------------------------
    // Park
    // -----------------------------------------------------------------

    pub async fn goto_park(&mut self) -> Result<()> {
        info!("parking");
        self.exec(&commands::GOTO_PARK, Arg::None).await.map(drop)
    }

    /// Store the current position as the park position.
    pub async fn mark_park_position(&mut self) -> Result<()> {
        self.exec(&commands::MARK_PARK, Arg::None).await.map(drop)
    }

    pub async fn is_parked(&mut self) -> Result<bool> {
        self.exec(&commands::AT_PARK, Arg::None).await?.into_flag()
    }

    /// Leave park and resume sidereal tracking.
    ///
    /// An unaligned controller is first aligned from its last known
    /// position; if that fails the mount is unparked anyway.
    pub async fn unpark(&mut self) -> Result<()> {
        let status = self.alignment_status().await?;
        if !status.is_aligned() {
            if let Err(e) = self
                .exec(&commands::ALIGN_FROM_LAST_POSITION, Arg::None)
                .await
            {
                warn!(error = %e, "align from last position failed, unparking anyway");
            }
        }
        self.set_tracking(TrackingMode::Sidereal).await
    }

    // -----------------------------------------------------------------
    // Refraction
    // -----------------------------------------------------------------

    pub async fn refraction_correction(&mut self) -> Result<bool> {
        self.exec(&commands::REFRACTION, Arg::None).await?.into_flag()
    }

    pub async fn set_refraction_correction(&mut self, enabled: bool) -> Result<()> {
        self.exec(&commands::SET_REFRACTION, Arg::Flag(enabled))
            .await
            .map(drop)
    }

    // -----------------------------------------------------------------
    // Site
    // -----------------------------------------------------------------

    /// Site record in use. Cached per connection.
    pub async fn site_number(&mut self) -> Result<u32> {
        self.ensure_connected()?;
        if let Some(n) = self.session.site_number {
            return Ok(n);
        }
        let raw = self
            .exec(&commands::SITE_NUMBER, Arg::None)
            .await?
            .into_integer()?;
        let n = u32::try_from(raw)
            .map_err(|_| Error::Parse(format!("site number {raw} out of range")))?;
        self.session.site_number = Some(n);
        Ok(n)
    }

    pub async fn site_name(&mut self) -> Result<String> {
        let n = self.site_number().await?;
        self.exec(&commands::SITE_NAME, Arg::Index(n))
            .await?
            .into_text()
    }

    /// Write longitude (east positive), latitude, and time zone (hours east
    /// of UTC) into the site record in use.
    pub async fn set_site_data(&mut self, longitude: f64, latitude: f64, timezone: f64) -> Result<()> {
        for (name, v) in [
            ("longitude", longitude),
            ("latitude", latitude),
            ("timezone", timezone),
        ] {
            if !v.is_finite() {
                return Err(Error::InvalidParameter(format!("{name} {v} is not finite")));
            }
        }

        let n = self.site_number().await?;
        let lon = format!("{n}{}", site::format_longitude(longitude));
        let lat = format!("{n}{}", site::format_latitude(latitude));
        let tz = format!("{n}{}", site::format_timezone(timezone));
        debug!(site = n, %lon, %lat, %tz, "set_site_data");

        self.exec(&commands::SET_SITE_LONGITUDE, Arg::Text(&lon))
            .await?;
        self.exec(&commands::SET_SITE_LATITUDE, Arg::Text(&lat))
            .await?;
        self.exec(&commands::SET_SITE_TIMEZONE, Arg::Text(&tz))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Time and date
    // -----------------------------------------------------------------

    /// Read the controller's clock format and remember it.
    pub async fn local_time_format(&mut self) -> Result<TimeFormat> {
        let reply = self.exec_text(&commands::LOCAL_TIME_FORMAT).await?;
        let format = site::parse_time_format(&reply);
        self.session.time_format = format;
        Ok(format)
    }

    /// Read the controller's date order and remember it.
    pub async fn date_format(&mut self) -> Result<DateOrder> {
        let reply = self.exec_text(&commands::DATE_FORMAT).await?;
        let order = site::parse_date_order(&reply);
        self.session.date_order = order;
        Ok(order)
    }

    pub async fn standard_time(&mut self) -> Result<String> {
        self.exec_text(&commands::STANDARD_TIME).await
    }

    pub async fn standard_date(&mut self) -> Result<String> {
        self.exec_text(&commands::STANDARD_DATE).await
    }

    /// Push the host's local time in the controller's clock format.
    pub async fn sync_time(&mut self) -> Result<()> {
        let now = self.geometry.local_date_time();
        let text = site::format_time(now, self.session.time_format);
        debug!(%text, "sync_time");
        self.exec(&commands::SET_STANDARD_TIME, Arg::Text(&text))
            .await
            .map(drop)
    }

    /// Push the host's local date in the controller's date order.
    pub async fn sync_date(&mut self) -> Result<()> {
        let now = self.geometry.local_date_time();
        let text = site::format_date(now, self.session.date_order);
        debug!(%text, "sync_date");
        self.exec(&commands::SET_STANDARD_DATE, Arg::Text(&text))
            .await
            .map(drop)
    }
}
