use foundation::time::Time;
use runtime::timeline::{AnimationScheduler, TimelineGuard};
use scene::selection::SelectionReader;

use crate::pulse::{PULSE, PulseFrame, PulseSpec};
use crate::stylesheet::marker_stylesheet;
use crate::symbology::{MarkerTheme, Rgba};

/// Solid inner disc of a marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CoreStyle {
    pub diameter_px: f32,
    pub fill: Rgba,
    pub border_px: f32,
    pub border_color: Rgba,
    pub scale: f32,
}

/// Selection-dependent part of a marker's look.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerAppearance {
    pub selected: bool,
    pub halo_color: Rgba,
    pub core: CoreStyle,
}

/// Everything a backend needs to draw one marker for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisual {
    pub pin_id: String,
    pub selected: bool,
    pub halo_diameter_px: f32,
    pub halo_color: Rgba,
    pub halo: PulseFrame,
    pub core: CoreStyle,
}

/// Per-marker presentation contract: a pulsing halo behind a solid core.
///
/// The pulse never depends on selection; only the colors and the core scale do.
/// Selection is read through a [`SelectionReader`], so the presenter always
/// reflects the controller's latest transition.
#[derive(Debug, Clone)]
pub struct MarkerPresenter {
    theme: MarkerTheme,
    pulse: PulseSpec,
    selection: SelectionReader,
}

impl MarkerPresenter {
    pub fn new(selection: SelectionReader) -> Self {
        Self::with_theme(MarkerTheme::default(), selection)
    }

    pub fn with_theme(theme: MarkerTheme, selection: SelectionReader) -> Self {
        Self {
            theme,
            pulse: PULSE,
            selection,
        }
    }

    pub fn theme(&self) -> &MarkerTheme {
        &self.theme
    }

    pub fn pulse(&self) -> &PulseSpec {
        &self.pulse
    }

    /// CSS for DOM markers built from this presenter's theme and pulse.
    pub fn stylesheet(&self) -> String {
        marker_stylesheet(&self.theme, &self.pulse)
    }

    pub fn is_selected(&self, pin_id: &str) -> bool {
        self.selection.is_selected(pin_id)
    }

    pub fn appearance(&self, pin_id: &str) -> MarkerAppearance {
        let selected = self.is_selected(pin_id);
        let t = &self.theme;
        MarkerAppearance {
            selected,
            halo_color: if selected {
                t.halo_color_selected
            } else {
                t.halo_color
            },
            core: CoreStyle {
                diameter_px: t.core_diameter_px,
                fill: if selected {
                    t.core_color_selected
                } else {
                    t.core_color
                },
                border_px: t.core_border_px,
                border_color: t.core_border_color,
                scale: if selected { t.core_scale_selected } else { 1.0 },
            },
        }
    }

    /// Starts the marker's pulse on `scheduler`. The pulse lives as long as the
    /// returned [`MountedMarker`].
    pub fn mount(
        &self,
        pin_id: impl Into<String>,
        scheduler: &AnimationScheduler,
        now: Time,
    ) -> MountedMarker {
        let pin_id = pin_id.into();
        let appearance = self.appearance(&pin_id);
        MountedMarker {
            pulse: scheduler.start_repeating(self.pulse.period_s(), now),
            pin_id,
            appearance,
        }
    }

    /// Samples a mounted marker. Returns `None` if its pulse is no longer scheduled.
    pub fn visual(&self, marker: &MountedMarker, now: Time) -> Option<MarkerVisual> {
        let sample = marker.pulse.sample(now)?;
        Some(MarkerVisual {
            pin_id: marker.pin_id.clone(),
            selected: marker.appearance.selected,
            halo_diameter_px: self.theme.halo_diameter_px,
            halo_color: marker.appearance.halo_color,
            halo: self.pulse.at_progress(sample.progress),
            core: marker.appearance.core,
        })
    }
}

/// A marker that is on screen, holding its pulse timeline.
#[derive(Debug)]
pub struct MountedMarker {
    pin_id: String,
    pulse: TimelineGuard,
    appearance: MarkerAppearance,
}

impl MountedMarker {
    pub fn pin_id(&self) -> &str {
        &self.pin_id
    }

    pub fn appearance(&self) -> &MarkerAppearance {
        &self.appearance
    }

    pub fn pulse(&self) -> &TimelineGuard {
        &self.pulse
    }

    /// Re-reads selection through `presenter`. Returns `true` if the look changed.
    ///
    /// The pulse timeline is left untouched.
    pub fn restyle(&mut self, presenter: &MarkerPresenter) -> bool {
        let next = presenter.appearance(&self.pin_id);
        if next == self.appearance {
            return false;
        }
        self.appearance = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerPresenter;
    use crate::symbology::MarkerTheme;
    use foundation::time::Time;
    use runtime::timeline::AnimationScheduler;
    use scene::selection::{SelectionController, SelectionState};

    fn controller() -> SelectionController {
        SelectionController::new(SelectionState::Selected("a".into()))
    }

    #[test]
    fn selected_core_is_brighter_and_larger() {
        let ctl = controller();
        let presenter = MarkerPresenter::new(ctl.reader());
        let theme = MarkerTheme::default();

        let a = presenter.appearance("a");
        assert!(a.selected);
        assert_eq!(a.core.fill, theme.core_color_selected);
        assert_eq!(a.core.scale, 1.1);
        assert_eq!(a.halo_color, theme.halo_color_selected);

        let b = presenter.appearance("b");
        assert!(!b.selected);
        assert_eq!(b.core.fill, theme.core_color);
        assert_eq!(b.core.scale, 1.0);
        assert_eq!(b.core.border_color, theme.core_border_color);
    }

    #[test]
    fn stylesheet_matches_presenter_pulse() {
        let ctl = controller();
        let css = MarkerPresenter::new(ctl.reader()).stylesheet();
        assert!(css.contains("1500ms linear infinite"));
    }

    #[test]
    fn restyle_follows_selection_without_restarting_pulse() {
        let mut ctl = controller();
        let presenter = MarkerPresenter::new(ctl.reader());
        let sched = AnimationScheduler::new();
        let mut a = presenter.mount("a", &sched, Time(0.0));
        let mut b = presenter.mount("b", &sched, Time(0.0));
        let before = presenter.visual(&b, Time(0.75)).unwrap().halo;

        ctl.select("b");
        assert!(a.restyle(&presenter));
        assert!(b.restyle(&presenter));
        assert!(!b.restyle(&presenter));
        assert!(!a.appearance().selected);
        assert!(b.appearance().selected);

        let after = presenter.visual(&b, Time(0.75)).unwrap();
        assert!(after.selected);
        assert_eq!(after.halo, before);
    }

    #[test]
    fn pulse_runs_regardless_of_selection() {
        let ctl = controller();
        let presenter = MarkerPresenter::new(ctl.reader());
        let sched = AnimationScheduler::new();
        let a = presenter.mount("a", &sched, Time(0.0));
        let b = presenter.mount("b", &sched, Time(0.0));
        let va = presenter.visual(&a, Time(0.3)).unwrap();
        let vb = presenter.visual(&b, Time(0.3)).unwrap();
        assert_eq!(va.halo, vb.halo);
        assert!(va.halo.scale > 1.0);
    }

    #[test]
    fn dropping_marker_cancels_its_pulse() {
        let ctl = controller();
        let presenter = MarkerPresenter::new(ctl.reader());
        let sched = AnimationScheduler::new();
        let a = presenter.mount("a", &sched, Time(0.0));
        assert_eq!(sched.active_count(), 1);
        drop(a);
        assert_eq!(sched.active_count(), 0);
        assert!(sched.tick(Time(1.0)).is_empty());
    }
}
