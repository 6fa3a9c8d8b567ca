use foundation::time::Time;

use super::MapViewport;
use crate::config::{CameraTransition, MapOptions};

/// Length of the initial fly-to animation.
pub const FLY_DURATION_S: f64 = 2.0;
/// Zoom levels the fly-to starts below the target camera.
pub const FLY_ZOOM_OUT: f64 = 2.0;

/// The initial camera move from the start viewport to the configured one.
///
/// `Jump` starts at the target. `FlyTo` starts zoomed out over the same center
/// and eases in over [`FLY_DURATION_S`] once started.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraFlight {
    from: MapViewport,
    to: MapViewport,
    duration_s: f64,
    started_at: Option<Time>,
}

impl CameraFlight {
    pub fn new(target: MapViewport, transition: CameraTransition) -> Self {
        match transition {
            CameraTransition::Jump => Self {
                from: target,
                to: target,
                duration_s: 0.0,
                started_at: None,
            },
            CameraTransition::FlyTo => Self {
                from: MapViewport {
                    center: target.center,
                    zoom: (target.zoom - FLY_ZOOM_OUT).max(0.0),
                },
                to: target,
                duration_s: FLY_DURATION_S,
                started_at: None,
            },
        }
    }

    pub fn start_viewport(&self) -> MapViewport {
        self.from
    }

    pub fn target(&self) -> MapViewport {
        self.to
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn is_animated(&self) -> bool {
        self.duration_s > 0.0
    }

    /// Begins the move. Later calls keep the first start time.
    pub fn start(&mut self, now: Time) {
        self.started_at.get_or_insert(now);
    }

    /// Camera at `now`: the start viewport until started, the target once done.
    pub fn at(&self, now: Time) -> MapViewport {
        let Some(started_at) = self.started_at else {
            return self.from;
        };
        let t = if self.is_animated() {
            now.since(started_at) / self.duration_s
        } else {
            1.0
        };
        if t >= 1.0 {
            return self.to;
        }
        let e = t * t * (3.0 - 2.0 * t);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        MapViewport {
            center: foundation::LngLat::new(
                lerp(self.from.center.lng, self.to.center.lng),
                lerp(self.from.center.lat, self.to.center.lat),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom),
        }
    }
}

/// On-map ornaments a host draws over the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceChrome {
    pub logo: bool,
    pub attribution: bool,
    pub compass: bool,
}

impl From<&MapOptions> for SurfaceChrome {
    fn from(options: &MapOptions) -> Self {
        Self {
            logo: options.show_logo,
            attribution: options.show_attribution,
            compass: options.show_compass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraFlight, FLY_DURATION_S, SurfaceChrome};
    use crate::backend::MapViewport;
    use crate::config::{CameraTransition, MapOptions};
    use foundation::LngLat;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    fn target() -> MapViewport {
        MapViewport {
            center: LngLat::new(-87.6298, 41.8781),
            zoom: 11.6,
        }
    }

    #[test]
    fn jump_lands_on_target_immediately() {
        let mut flight = CameraFlight::new(target(), CameraTransition::Jump);
        assert_eq!(flight.start_viewport(), target());
        flight.start(Time(1.0));
        assert_eq!(flight.at(Time(1.0)), target());
    }

    #[test]
    fn fly_to_zooms_in_over_the_duration() {
        let mut flight = CameraFlight::new(target(), CameraTransition::FlyTo);
        assert!((flight.at(Time(5.0)).zoom - 9.6).abs() < 1e-9);

        flight.start(Time(1.0));
        flight.start(Time(3.0));
        let mid = flight.at(Time(1.0 + FLY_DURATION_S / 2.0));
        assert!((mid.zoom - 10.6).abs() < 1e-9);
        assert_eq!(mid.center, target().center);
        assert_eq!(flight.at(Time(1.0 + FLY_DURATION_S)), target());
        assert_eq!(flight.at(Time(60.0)), target());
    }

    #[test]
    fn chrome_follows_options() {
        let chrome = SurfaceChrome::from(&MapOptions::default());
        assert_eq!(
            chrome,
            SurfaceChrome {
                logo: false,
                attribution: false,
                compass: true,
            }
        );
    }
}
