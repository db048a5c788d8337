use rand::Rng;

/// Pick a block producer with probability proportional to its stake.
///
/// Walks the cumulative stake until it passes a uniform draw in
/// `[0, total)`. When no one holds any stake the first entry is returned;
/// an empty list yields `None`.
pub fn select_producer<'a>(stakes: &'a [(String, u64)], rng: &mut impl Rng) -> Option<&'a str> {
    let (first, _) = stakes.first()?;
    let total: u64 = stakes.iter().map(|(_, stake)| *stake).fold(0, u64::saturating_add);
    if total == 0 {
        return Some(first.as_str());
    }

    let draw = rng.gen_range(0..total);
    let mut cumulative: u64 = 0;
    for (node, stake) in stakes {
        cumulative = cumulative.saturating_add(*stake);
        if cumulative > draw {
            return Some(node.as_str());
        }
    }
    Some(first.as_str())
}
