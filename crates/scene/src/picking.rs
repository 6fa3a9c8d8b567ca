use foundation::math::ScreenPoint;

/// A square, screen-space hit area centered on a marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HitTarget {
    pub center: ScreenPoint,
    /// Half the edge length of the hit square, in pixels.
    pub half_extent: f64,
}

impl HitTarget {
    pub fn contains(&self, p: ScreenPoint) -> bool {
        (p.x - self.center.x).abs() <= self.half_extent
            && (p.y - self.center.y).abs() <= self.half_extent
    }
}

/// Deterministic tap picking over marker hit areas.
///
/// Ordering contract:
/// - Targets are given in draw order (later targets are drawn on top).
/// - The target whose center is closest to `p` wins.
/// - On equal distance the topmost target wins.
///
/// Returns the index of the winning target, or `None` for a background tap.
pub fn pick_target(targets: &[HitTarget], p: ScreenPoint) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for (idx, target) in targets.iter().enumerate() {
        if !target.contains(p) {
            continue;
        }
        let d = target.center.distance_sq(p);
        best = match best {
            Some((bd, _)) if d > bd => best,
            _ => Some((d, idx)),
        };
    }
    best.map(|(_, idx)| idx)
}

#[cfg(test)]
mod tests {
    use super::{HitTarget, pick_target};
    use foundation::math::ScreenPoint;

    fn t(x: f64, y: f64) -> HitTarget {
        HitTarget {
            center: ScreenPoint::new(x, y),
            half_extent: 22.0,
        }
    }

    #[test]
    fn miss_is_background() {
        let targets = [t(100.0, 100.0)];
        assert_eq!(pick_target(&targets, ScreenPoint::new(150.0, 100.0)), None);
        assert_eq!(pick_target(&[], ScreenPoint::new(0.0, 0.0)), None);
    }

    #[test]
    fn whole_square_is_hit_area() {
        let targets = [t(100.0, 100.0)];
        assert_eq!(pick_target(&targets, ScreenPoint::new(121.0, 79.0)), Some(0));
        assert_eq!(pick_target(&targets, ScreenPoint::new(122.0, 122.0)), Some(0));
    }

    #[test]
    fn closest_center_wins_when_overlapping() {
        let targets = [t(100.0, 100.0), t(120.0, 100.0)];
        assert_eq!(pick_target(&targets, ScreenPoint::new(104.0, 100.0)), Some(0));
        assert_eq!(pick_target(&targets, ScreenPoint::new(116.0, 100.0)), Some(1));
    }

    #[test]
    fn equal_distance_goes_to_topmost() {
        let targets = [t(100.0, 100.0), t(120.0, 100.0)];
        assert_eq!(pick_target(&targets, ScreenPoint::new(110.0, 100.0)), Some(1));
    }
}
