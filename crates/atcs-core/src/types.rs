//! Shared mount types.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Physical layout of the mount. Decides the alignment type and meridian
/// policy pushed to the controller on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountTopology {
    /// German equatorial mount that flips at the meridian.
    #[default]
    SymmetricalEquatorial,
    /// Equatorial mount that can track through the meridian.
    AsymmetricalEquatorial,
    AltAz,
}

impl MountTopology {
    /// `NSat` argument for this topology.
    pub fn alignment_type(self) -> &'static str {
        match self {
            MountTopology::SymmetricalEquatorial | MountTopology::AsymmetricalEquatorial => {
                "Polar"
            }
            MountTopology::AltAz => "AltAz",
        }
    }

    /// `NSmp` argument for this topology.
    pub fn meridian_policy(self) -> &'static str {
        match self {
            MountTopology::AsymmetricalEquatorial => "FullGEM",
            MountTopology::SymmetricalEquatorial | MountTopology::AltAz => "Lower",
        }
    }
}

impl FromStr for MountTopology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "symmetrical" | "gem" | "symmetrical-equatorial" => {
                Ok(MountTopology::SymmetricalEquatorial)
            }
            "asymmetrical" | "asymmetrical-equatorial" => Ok(MountTopology::AsymmetricalEquatorial),
            "altaz" | "alt-az" => Ok(MountTopology::AltAz),
            other => Err(Error::InvalidParameter(format!(
                "unknown mount topology {other:?}"
            ))),
        }
    }
}

/// Controller sky-model state, as reported by `AGas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentStatus {
    NotAligned,
    Preliminary,
    Complete,
    /// Any reply the firmware invents later. Treated as not aligned.
    Unknown(String),
}

impl AlignmentStatus {
    pub fn from_reply(reply: &str) -> Self {
        match reply {
            "NotAligned" => AlignmentStatus::NotAligned,
            "Preliminary" => AlignmentStatus::Preliminary,
            "Complete" => AlignmentStatus::Complete,
            other => AlignmentStatus::Unknown(other.to_string()),
        }
    }

    /// Only a complete model counts as aligned.
    pub fn is_aligned(&self) -> bool {
        matches!(self, AlignmentStatus::Complete)
    }
}

impl fmt::Display for AlignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentStatus::NotAligned => write!(f, "NotAligned"),
            AlignmentStatus::Preliminary => write!(f, "Preliminary"),
            AlignmentStatus::Complete => write!(f, "Complete"),
            AlignmentStatus::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// Tracking mode selected with `RStr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingMode {
    /// Tracking off.
    Drift,
    Sidereal,
    /// Sidereal plus per-axis offsets in arcseconds per hour.
    Custom { ra_offset: f64, dec_offset: f64 },
}

impl TrackingMode {
    /// Build the mode a host asks for with its usual three arguments.
    pub fn from_host(tracking_on: bool, ignore_rates: bool, ra_offset: f64, dec_offset: f64) -> Self {
        match (tracking_on, ignore_rates) {
            (false, _) => TrackingMode::Drift,
            (true, true) => TrackingMode::Sidereal,
            (true, false) => TrackingMode::Custom {
                ra_offset,
                dec_offset,
            },
        }
    }
}

/// Tracking state read back from the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingRates {
    pub tracking_on: bool,
    /// RA offset in arcseconds per hour.
    pub ra_offset: f64,
    /// Dec offset in arcseconds per hour.
    pub dec_offset: f64,
}

/// Open-loop move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The axis this direction moves.
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Declination,
            Direction::East | Direction::West => Axis::RightAscension,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            other => Err(Error::InvalidParameter(format!("unknown direction {other:?}"))),
        }
    }
}

/// Mount axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    RightAscension,
    Declination,
}

/// Controller clock display format (`TGlf`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[default]
    TwelveHour,
    TwentyFourHour,
}

/// Controller date field order (`TGdf`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// `mm/dd/yy`
    #[default]
    MonthFirst,
    /// `dd/mm/yy`
    DayFirst,
}

/// Equatorial coordinates in the JNOW frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaDec {
    /// Right ascension in hours.
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
}

/// Hour-angle soft limits, converted from the controller's degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftLimits {
    pub east_hours: f64,
    pub west_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_mapping() {
        let t = MountTopology::SymmetricalEquatorial;
        assert_eq!((t.alignment_type(), t.meridian_policy()), ("Polar", "Lower"));
        let t = MountTopology::AsymmetricalEquatorial;
        assert_eq!((t.alignment_type(), t.meridian_policy()), ("Polar", "FullGEM"));
        let t = MountTopology::AltAz;
        assert_eq!((t.alignment_type(), t.meridian_policy()), ("AltAz", "Lower"));
    }

    #[test]
    fn topology_from_str() {
        assert_eq!(
            "altaz".parse::<MountTopology>().unwrap(),
            MountTopology::AltAz
        );
        assert!("fork".parse::<MountTopology>().is_err());
    }

    #[test]
    fn alignment_from_reply() {
        assert_eq!(
            AlignmentStatus::from_reply("NotAligned"),
            AlignmentStatus::NotAligned
        );
        assert!(AlignmentStatus::from_reply("Complete").is_aligned());
        assert!(!AlignmentStatus::from_reply("Preliminary").is_aligned());
        assert!(!AlignmentStatus::from_reply("Weird").is_aligned());
    }

    #[test]
    fn tracking_from_host() {
        assert_eq!(TrackingMode::from_host(false, true, 1.0, 2.0), TrackingMode::Drift);
        assert_eq!(TrackingMode::from_host(true, true, 1.0, 2.0), TrackingMode::Sidereal);
        assert_eq!(
            TrackingMode::from_host(true, false, 1.0, 2.0),
            TrackingMode::Custom {
                ra_offset: 1.0,
                dec_offset: 2.0
            }
        );
    }

    #[test]
    fn direction_axis() {
        assert_eq!(Direction::North.axis(), Axis::Declination);
        assert_eq!(Direction::West.axis(), Axis::RightAscension);
        assert_eq!("e".parse::<Direction>().unwrap(), Direction::East);
    }
}
