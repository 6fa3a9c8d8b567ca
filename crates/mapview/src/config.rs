use catalog::CHICAGO_CENTER;
use foundation::LngLat;

/// The one environment variable the map credential is read from.
pub const ACCESS_TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/streets-v12";
pub const DEFAULT_ZOOM: f64 = 11.6;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraTransition {
    /// Animated zoom-out/pan/zoom-in to the initial camera.
    FlyTo,
    Jump,
}

/// Options passed unchanged to `MapBackend::initialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LngLat,
    pub zoom: f64,
    pub style_url: String,
    pub transition: CameraTransition,
    pub show_logo: bool,
    pub show_attribution: bool,
    pub show_compass: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: CHICAGO_CENTER,
            zoom: DEFAULT_ZOOM,
            style_url: DEFAULT_STYLE_URL.to_string(),
            transition: CameraTransition::FlyTo,
            show_logo: false,
            show_attribution: false,
            show_compass: true,
        }
    }
}

/// Configuration resolved once at startup.
#[derive(Clone, PartialEq, Default)]
pub struct AppConfig {
    pub access_token: Option<String>,
    pub map: MapOptions,
}

impl AppConfig {
    pub fn with_token(access_token: Option<String>) -> Self {
        Self {
            access_token,
            map: MapOptions::default(),
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::with_token(lookup(ACCESS_TOKEN_VAR))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("map", &self.map)
            .finish()
    }
}
