/// Animation curve applied to pulse progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Easing {
    Linear,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
        }
    }

    /// CSS `animation-timing-function` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
        }
    }
}

/// Parameters of the repeating halo pulse.
///
/// One cycle scales the halo from `scale_from` to `scale_to` while fading it
/// from `opacity_from` to `opacity_to`, then jumps back to the start values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PulseSpec {
    pub scale_from: f64,
    pub scale_to: f64,
    pub opacity_from: f64,
    pub opacity_to: f64,
    pub period_ms: u64,
    pub easing: Easing,
}

/// The pulse used by every marker on every backend.
pub const PULSE: PulseSpec = PulseSpec {
    scale_from: 1.0,
    scale_to: 2.35,
    opacity_from: 0.45,
    opacity_to: 0.0,
    period_ms: 1500,
    easing: Easing::Linear,
};

/// Halo transform at one instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PulseFrame {
    pub scale: f64,
    pub opacity: f64,
}

impl PulseSpec {
    pub fn period_s(&self) -> f64 {
        self.period_ms as f64 / 1000.0
    }

    /// Halo state at `progress` through a cycle, `progress` in `[0, 1)`.
    pub fn at_progress(&self, progress: f64) -> PulseFrame {
        let t = self.easing.apply(progress);
        PulseFrame {
            scale: lerp(self.scale_from, self.scale_to, t),
            opacity: lerp(self.opacity_from, self.opacity_to, t),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::{PULSE, PulseFrame};
    use foundation::time::Time;
    use runtime::timeline::AnimationScheduler;

    fn assert_frame(got: PulseFrame, scale: f64, opacity: f64) {
        assert!((got.scale - scale).abs() < 1e-9, "scale {} != {scale}", got.scale);
        assert!(
            (got.opacity - opacity).abs() < 1e-9,
            "opacity {} != {opacity}",
            got.opacity
        );
    }

    #[test]
    fn pulse_parameters_are_fixed() {
        assert_eq!(PULSE.scale_from, 1.0);
        assert_eq!(PULSE.scale_to, 2.35);
        assert_eq!(PULSE.opacity_from, 0.45);
        assert_eq!(PULSE.opacity_to, 0.0);
        assert_eq!(PULSE.period_ms, 1500);
    }

    #[test]
    fn cycle_starts_small_and_visible() {
        assert_frame(PULSE.at_progress(0.0), 1.0, 0.45);
    }

    #[test]
    fn midpoint_is_linear() {
        assert_frame(PULSE.at_progress(0.5), 1.675, 0.225);
    }

    #[test]
    fn restarts_after_each_period() {
        let sched = AnimationScheduler::new();
        let guard = sched.start_repeating(PULSE.period_s(), Time::ZERO);
        let at = |t: f64| PULSE.at_progress(guard.sample(Time(t)).unwrap().progress);
        assert_frame(at(1.5), 1.0, 0.45);
        assert_frame(at(3.0 + 0.375), 1.3375, 0.3375);
    }

    #[test]
    fn approaches_end_values_just_before_restart() {
        let f = PULSE.at_progress(0.999_999);
        assert!((f.scale - 2.35).abs() < 1e-5);
        assert!(f.opacity.abs() < 1e-5);
    }
}
