use crate::rng::RandomSource;

/// Cumulative-weight draw: roll `r` in `[0, total)` and return the first item
/// whose running weight exceeds `r`. Falls back to the last item if nothing
/// matches. `None` only for an empty slice or a zero total. Sums saturate at
/// `u64::MAX` instead of overflowing.
pub fn pick_weighted<'a, T, R, F>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
    F: Fn(&T) -> u64,
{
    let total = items
        .iter()
        .fold(0u64, |acc, item| acc.saturating_add(weight(item)));
    if total == 0 {
        return None;
    }
    let target = rng.next_below(total);
    let mut cumulative = 0u64;
    for item in items {
        cumulative = cumulative.saturating_add(weight(item));
        if target < cumulative {
            return Some(item);
        }
    }
    items.last()
}
