pub mod admin;
pub mod gacha;
pub mod user;

use gacha_core::Pattern;
use gacha_shared::PatternView;

use crate::db::HistoryRow;

pub fn pattern_view(p: &Pattern) -> PatternView {
    PatternView {
        id: p.id,
        currency: p.currency.to_string(),
        machine_color: p.visual.machine_color.clone(),
        effect1: p.visual.effect_1.clone(),
        effect2: p.visual.effect_2.clone(),
        video_url: p.video_url.clone(),
    }
}

pub fn history_pattern_view(row: &HistoryRow) -> PatternView {
    PatternView {
        id: row.pattern_id,
        currency: row.currency.clone(),
        machine_color: row.machine_color.clone(),
        effect1: row.effect_1.clone(),
        effect2: row.effect_2.clone(),
        video_url: row.video_url.clone(),
    }
}
