//! CSS for DOM-based markers.
//!
//! Browser markers animate through CSS, so the stylesheet is generated from the
//! same [`MarkerTheme`] and [`PulseSpec`] the native surface samples.

use crate::pulse::PulseSpec;
use crate::symbology::MarkerTheme;

pub const PIN_CLASS: &str = "atlas-pin";
pub const PULSE_CLASS: &str = "atlas-pin__pulse";
pub const CORE_CLASS: &str = "atlas-pin__core";
pub const SELECTED_CLASS: &str = "is-selected";
pub const KEYFRAMES_NAME: &str = "atlasPinPulse";

const CENTER: &str = "translate(-50%, -50%)";

pub fn marker_stylesheet(theme: &MarkerTheme, pulse: &PulseSpec) -> String {
    let mut css = String::new();
    css.push_str(&format!(
        ".{PIN_CLASS} {{ position: relative; width: {hit}px; height: {hit}px; \
         padding: 0; border: 0; background: transparent; cursor: pointer; }}\n",
        hit = theme.hit_size_px,
    ));
    css.push_str(&format!(
        ".{PULSE_CLASS} {{ position: absolute; left: 50%; top: 50%; width: {d}px; height: {d}px; \
         border-radius: 999px; pointer-events: none; background: {color}; \
         opacity: {op}; transform: {CENTER} scale({s0}); \
         animation: {KEYFRAMES_NAME} {ms}ms {ease} infinite; }}\n",
        d = theme.halo_diameter_px,
        color = theme.halo_color.to_hex(),
        op = pulse.opacity_from,
        s0 = pulse.scale_from,
        ms = pulse.period_ms,
        ease = pulse.easing.css_name(),
    ));
    css.push_str(&format!(
        ".{CORE_CLASS} {{ position: absolute; left: 50%; top: 50%; width: {d}px; height: {d}px; \
         box-sizing: border-box; border-radius: 999px; border: {bw}px solid {bc}; \
         background: {fill}; transform: {CENTER} scale(1); }}\n",
        d = theme.core_diameter_px,
        bw = theme.core_border_px,
        bc = theme.core_border_color.to_hex(),
        fill = theme.core_color.to_hex(),
    ));
    css.push_str(&format!(
        ".{PIN_CLASS}.{SELECTED_CLASS} .{PULSE_CLASS} {{ background: {color}; }}\n",
        color = theme.halo_color_selected.to_hex(),
    ));
    css.push_str(&format!(
        ".{PIN_CLASS}.{SELECTED_CLASS} .{CORE_CLASS} {{ background: {fill}; \
         transform: {CENTER} scale({s}); }}\n",
        fill = theme.core_color_selected.to_hex(),
        s = theme.core_scale_selected,
    ));
    css.push_str(&format!(
        "@keyframes {KEYFRAMES_NAME} {{ \
         0% {{ transform: {CENTER} scale({s0}); opacity: {o0}; }} \
         100% {{ transform: {CENTER} scale({s1}); opacity: {o1}; }} }}\n",
        s0 = pulse.scale_from,
        o0 = pulse.opacity_from,
        s1 = pulse.scale_to,
        o1 = pulse.opacity_to,
    ));
    css
}

#[cfg(test)]
mod tests {
    use super::marker_stylesheet;
    use crate::pulse::PULSE;
    use crate::symbology::MarkerTheme;

    #[test]
    fn keyframes_carry_shared_pulse_parameters() {
        let css = marker_stylesheet(&MarkerTheme::default(), &PULSE);
        assert!(css.contains("animation: atlasPinPulse 1500ms linear infinite;"));
        assert!(css.contains(
            "0% { transform: translate(-50%, -50%) scale(1); opacity: 0.45; }"
        ));
        assert!(css.contains(
            "100% { transform: translate(-50%, -50%) scale(2.35); opacity: 0; }"
        ));
    }

    #[test]
    fn selected_rules_use_theme_colors_and_scale() {
        let css = marker_stylesheet(&MarkerTheme::default(), &PULSE);
        assert!(css.contains(
            ".atlas-pin.is-selected .atlas-pin__core { background: #00a4ff; \
             transform: translate(-50%, -50%) scale(1.1); }"
        ));
        assert!(css.contains(".atlas-pin.is-selected .atlas-pin__pulse { background: #00d4ff; }"));
        assert!(css.contains("border: 2px solid #ffffff; background: #005de8;"));
        assert!(css.contains("width: 44px; height: 44px;"));
    }

    #[test]
    fn every_rule_is_emitted_on_its_own_line() {
        let css = marker_stylesheet(&MarkerTheme::default(), &PULSE);
        let starts: Vec<_> = css
            .lines()
            .map(|l| l.split_whitespace().next().unwrap_or(""))
            .collect();
        assert_eq!(
            starts,
            vec![
                ".atlas-pin",
                ".atlas-pin__pulse",
                ".atlas-pin__core",
                ".atlas-pin.is-selected",
                ".atlas-pin.is-selected",
                "@keyframes",
            ]
        );
    }
}
