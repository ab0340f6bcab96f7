//! Host clock and sky geometry.
//!
//! The mount needs two things it cannot work out on its own: the host's
//! local date and time (to set the controller clock) and hour-angle lookups
//! for the soft limits. Hosts usually have a better source for both, so they
//! sit behind [`SkyGeometry`].

use chrono::{Local, NaiveDateTime};

/// Clock and hour-angle lookups supplied by the host.
pub trait SkyGeometry: Send + Sync {
    /// Current local civil date and time.
    fn local_date_time(&self) -> NaiveDateTime;

    /// Convert an angle in degrees to an hour angle in hours.
    fn hour_angle(&self, angle_deg: f64) -> f64;
}

/// Host clock from the operating system and a plain `deg / 15` hour angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicGeometry;

impl SkyGeometry for BasicGeometry {
    fn local_date_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn hour_angle(&self, angle_deg: f64) -> f64 {
        angle_deg / 15.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_hour_angle() {
        let g = BasicGeometry;
        assert!((g.hour_angle(-90.0) + 6.0).abs() < 1e-12);
        assert!((g.hour_angle(15.0) - 1.0).abs() < 1e-12);
    }
}
