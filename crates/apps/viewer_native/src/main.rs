use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use catalog::PinCatalog;
use clap::Parser;
use foundation::math::ScreenPoint;
use mapview::backend::TapOutcome;
use mapview::{
    ACCESS_TOKEN_VAR, AppConfig, BackendKind, FallbackView, MapBackend, MapSession, Mounted,
};
use runtime::frame::Frame;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Native host for the event pin map")]
struct Args {
    /// Map access token
    #[arg(long, env = ACCESS_TOKEN_VAR, hide_env_values = true)]
    access_token: Option<String>,

    /// JSON file with pin records (defaults to the built-in Chicago events)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long, default_value_t = 390.0)]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value_t = 844.0)]
    height: f64,

    /// Frames to run after the taps (60 Hz)
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Tap to replay, in order: `x,y` in surface pixels or `pin:<id>`
    #[arg(long = "tap")]
    taps: Vec<TapTarget>,
}

#[derive(Debug, Clone)]
enum TapTarget {
    Point(ScreenPoint),
    Pin(String),
}

impl FromStr for TapTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("pin:") {
            return Ok(TapTarget::Pin(id.to_string()));
        }
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `x,y` or `pin:<id>`, got `{s}`"))?;
        let x: f64 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
        let y: f64 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
        Ok(TapTarget::Point(ScreenPoint::new(x, y)))
    }
}

fn print_fallback(view: &FallbackView) {
    println!("{}", view.title);
    println!("{}", view.body);
}

fn print_overlay(session: &MapSession) {
    match session.overlay() {
        Some(card) => {
            println!("{}", card.title);
            println!("{}", card.meta_line());
        }
        None => println!("(no event selected)"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let catalog = match &args.catalog {
        Some(path) => PinCatalog::from_json(&std::fs::read_to_string(path)?)?,
        None => PinCatalog::seeded(),
    };
    let config = AppConfig::with_token(args.access_token.clone());

    let mut session = match MapSession::mount(&config, Rc::new(catalog), BackendKind::for_target())
    {
        Ok(Mounted::Map(session)) => session,
        Ok(Mounted::Fallback(view)) => {
            print_fallback(&view);
            return Ok(());
        }
        Err(err) => {
            print_fallback(&FallbackView::backend_failure(&err));
            return Err(err.into());
        }
    };

    let Some(native) = session.backend_mut().as_native_mut() else {
        return Err("this host drives the native surface only".into());
    };
    native.mount(args.width, args.height);

    for tap in &args.taps {
        let point = match tap {
            TapTarget::Point(p) => *p,
            TapTarget::Pin(id) => match native.marker_position(id) {
                Some(p) => p,
                None => {
                    warn!(pin_id = %id, "no marker for pin; tap skipped");
                    continue;
                }
            },
        };
        match native.tap(point) {
            TapOutcome::Marker(id) => info!(pin_id = %id, x = point.x, y = point.y, "tap hit marker"),
            TapOutcome::Background => info!(x = point.x, y = point.y, "tap hit background"),
            TapOutcome::Ignored => warn!("tap ignored; surface not ready"),
        }
    }

    let draws = Frame::first()
        .following(args.frames)
        .map(|frame| native.advance(frame))
        .last()
        .unwrap_or_else(|| native.draw_list());
    if let (Some(camera), Some(chrome)) = (native.viewport(), native.chrome()) {
        info!(
            zoom = camera.zoom,
            lng = camera.center.lng,
            lat = camera.center.lat,
            logo = chrome.logo,
            attribution = chrome.attribution,
            compass = chrome.compass,
            "camera"
        );
    }
    for draw in draws {
        info!(
            pin_id = %draw.visual.pin_id,
            x = draw.position.x,
            y = draw.position.y,
            selected = draw.visual.selected,
            halo_scale = draw.visual.halo.scale,
            halo_opacity = draw.visual.halo.opacity,
            core_fill = %draw.visual.core.fill.to_hex(),
            "marker"
        );
    }

    print_overlay(&session);
    session.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::TapTarget;

    #[test]
    fn parses_point_and_pin_taps() {
        match "12.5, 40".parse::<TapTarget>().unwrap() {
            TapTarget::Point(p) => assert_eq!((p.x, p.y), (12.5, 40.0)),
            other => panic!("unexpected {other:?}"),
        }
        match "pin:west-loop-jazz".parse::<TapTarget>().unwrap() {
            TapTarget::Pin(id) => assert_eq!(id, "west-loop-jazz"),
            other => panic!("unexpected {other:?}"),
        }
        assert!("nowhere".parse::<TapTarget>().is_err());
    }
}
