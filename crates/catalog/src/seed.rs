use foundation::LngLat;

use crate::PinRecord;

/// Default camera center for the seeded events (downtown Chicago).
pub const CHICAGO_CENTER: LngLat = LngLat::new(-87.6298, 41.8781);

fn pin(
    id: &str,
    title: &str,
    category: &str,
    starts_at: &str,
    description: &str,
    coordinate: [f64; 2],
) -> PinRecord {
    PinRecord {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        starts_at: starts_at.to_string(),
        description: description.to_string(),
        coordinate: coordinate.into(),
    }
}

pub fn chicago_events() -> Vec<PinRecord> {
    vec![
        pin(
            "chi-river-kayak-night",
            "Moonlight Kayak Tour",
            "Outdoor",
            "Fri 7:00 PM",
            "Paddle through downtown with skyline views and live guide commentary.",
            [-87.6369, 41.8884],
        ),
        pin(
            "west-loop-jazz",
            "West Loop Jazz Session",
            "Live Music",
            "Sat 8:30 PM",
            "An intimate late-night set with rotating local artists.",
            [-87.6475, 41.8827],
        ),
        pin(
            "lincoln-park-market",
            "Lincoln Park Makers Market",
            "Pop-up",
            "Sun 11:00 AM",
            "Shop handmade goods from Chicago creators and food vendors.",
            [-87.6354, 41.9214],
        ),
        pin(
            "museum-campus-foodfest",
            "Lakeside Food Fest",
            "Food",
            "Thu 5:30 PM",
            "Tastings from local chefs with waterfront views near Museum Campus.",
            [-87.6167, 41.8666],
        ),
    ]
}
