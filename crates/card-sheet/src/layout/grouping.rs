//! Splitting the card list into page groups

/// Split `cards` into consecutive groups of at most `capacity` items.
///
/// Order is preserved and every group except the last is full. Empty input,
/// or a zero capacity, yields no groups.
pub fn group_cards<T>(cards: &[T], capacity: usize) -> Vec<&[T]> {
    if capacity == 0 {
        return Vec::new();
    }
    cards.chunks(capacity).collect()
}

/// Number of groups `card_count` cards occupy at `capacity` per page
pub fn group_count(card_count: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    card_count.div_ceil(capacity)
}
