use crate::currency::Currency;
use crate::pattern::{Catalog, Pattern, VisualDescriptor};

const VIDEO_BASE_URL: &str = "https://cdn.gachagacha.com/videos";

// id, currency, machine color, effect 1, effect 2, base result, weight
type DemoRow = (i64, Currency, &'static str, &'static str, &'static str, bool, i64);

const DEMO_ROWS: &[DemoRow] = &[
    (1, Currency::BTC, "Gold", "Hot", "Hot", true, 1),
    (2, Currency::BTC, "Black", "Hot", "Hot", true, 1),
    (3, Currency::ETH, "Gold", "Hot", "Hot", true, 1),
    (4, Currency::ETH, "Silver", "Hot", "Hot", true, 1),
    (5, Currency::ETH, "Blue", "Hot", "Hot", true, 1),
    (6, Currency::ETH, "Blue", "Dark", "Return", true, 1),
    (7, Currency::ETH, "Silver", "Dark", "Return", true, 1),
    (8, Currency::ETH, "Gold", "Dark", "Dark", true, 1),
    (9, Currency::ETH, "Silver", "Hot", "Return", true, 2),
    (10, Currency::ETH, "Blue", "Dark", "Dark", true, 1),
    (11, Currency::ETH, "Gold", "Hot", "Return", true, 1),
    (13, Currency::ETH, "Silver", "Dark", "Dark", false, 1),
    (14, Currency::ETH, "Gold", "Hot", "Hot", false, 1),
    (15, Currency::ETH, "Blue", "Dark", "Dark", false, 1),
    (16, Currency::ETH, "Gold", "Hot", "Return", false, 1),
    (17, Currency::XRP, "Pink", "Dark", "Dark", true, 1),
    (18, Currency::XRP, "Blue", "Dark", "Dark", true, 1),
    (19, Currency::XRP, "Green", "Dark", "Dark", true, 1),
    (20, Currency::XRP, "Blue", "Dark", "Return", true, 1),
    (21, Currency::XRP, "Pink", "Dark", "Return", true, 2),
    (22, Currency::XRP, "Green", "Dark", "Return", true, 2),
    (25, Currency::XRP, "Blue", "Dark", "Return", false, 1),
    (26, Currency::XRP, "Pink", "Dark", "Dark", false, 1),
    (27, Currency::XRP, "Green", "Dark", "Dark", false, 1),
    (28, Currency::XRP, "Pink", "Hot", "Dark", false, 1),
    (29, Currency::XRP, "Blue", "Hot", "Dark", false, 1),
    (30, Currency::XRP, "Green", "Hot", "Hot", false, 1),
    (31, Currency::XRP, "Pink", "Hot", "Hot", false, 2),
    (33, Currency::TRX, "Red", "Dark", "Dark", true, 1),
    (34, Currency::TRX, "Black", "Dark", "Return", true, 1),
    (35, Currency::TRX, "Purple", "Hot", "Return", true, 1),
    (36, Currency::TRX, "Purple", "Hot", "Hot", true, 1),
    (37, Currency::TRX, "Red", "Dark", "Dark", false, 1),
    (38, Currency::TRX, "Black", "Dark", "Dark", false, 1),
    (39, Currency::TRX, "Purple", "Dark", "Dark", false, 1),
    (40, Currency::TRX, "Red", "Hot", "Dark", false, 2),
    (41, Currency::TRX, "Black", "Hot", "Hot", false, 2),
    (42, Currency::TRX, "Purple", "Hot", "Return", false, 2),
    (43, Currency::TRX, "Red", "Dark", "Return", false, 2),
    (44, Currency::TRX, "Black", "Dark", "Return", false, 1),
    (47, Currency::TRX, "Purple", "Dark", "Return", false, 1),
    (50, Currency::TRX, "Purple", "Dark", "Dark", false, 1),
];

pub fn demo_prize(currency: Currency) -> f64 {
    match currency {
        Currency::BTC => 250.0,
        Currency::ETH => 15.0,
        Currency::XRP => 4.0,
        Currency::TRX => 3.0,
    }
}

/// Fixed catalog served by the demo endpoint and used for offline simulation.
pub fn demo_catalog() -> Catalog {
    DEMO_ROWS
        .iter()
        .map(|&(id, currency, color, effect_1, effect_2, base_result, weight)| Pattern {
            id,
            currency,
            visual: VisualDescriptor {
                machine_color: color.to_string(),
                effect_1: effect_1.to_string(),
                effect_2: effect_2.to_string(),
            },
            base_result,
            weight: Some(weight),
            prize_amount: demo_prize(currency),
            video_url: format!("{VIDEO_BASE_URL}/pattern_{id:02}.mp4"),
        })
        .collect::<Vec<_>>()
        .into()
}
