/// 8-bit sRGB color with alpha.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 0xFF])
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Colors and pixel sizes shared by every marker on both backends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerTheme {
    /// Edge of the square tap target.
    pub hit_size_px: f32,
    pub halo_diameter_px: f32,
    pub halo_color: Rgba,
    pub halo_color_selected: Rgba,
    pub core_diameter_px: f32,
    pub core_border_px: f32,
    pub core_border_color: Rgba,
    pub core_color: Rgba,
    pub core_color_selected: Rgba,
    pub core_scale_selected: f32,
}

impl Default for MarkerTheme {
    fn default() -> Self {
        Self {
            hit_size_px: 44.0,
            halo_diameter_px: 22.0,
            halo_color: Rgba::rgb(0x24, 0xA0, 0xFF),
            halo_color_selected: Rgba::rgb(0x00, 0xD4, 0xFF),
            core_diameter_px: 16.0,
            core_border_px: 2.0,
            core_border_color: Rgba::WHITE,
            core_color: Rgba::rgb(0x00, 0x5D, 0xE8),
            core_color_selected: Rgba::rgb(0x00, 0xA4, 0xFF),
            core_scale_selected: 1.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerTheme, Rgba};

    #[test]
    fn hex_is_lowercase_six_digits() {
        assert_eq!(Rgba::rgb(0x00, 0x5D, 0xE8).to_hex(), "#005de8");
        assert_eq!(Rgba::WHITE.to_hex(), "#ffffff");
    }

    #[test]
    fn selected_core_is_brighter_than_default() {
        let theme = MarkerTheme::default();
        let lum = |c: Rgba| c.0[0] as u32 + c.0[1] as u32 + c.0[2] as u32;
        assert!(lum(theme.core_color_selected) > lum(theme.core_color));
    }
}
