use crate::layout::{compute_geometry, group_count};
use crate::options::SheetOptions;
use crate::types::*;

/// Calculate statistics for a card sheet of `card_count` cards
pub fn calculate_statistics(card_count: usize, options: &SheetOptions) -> Result<SheetStatistics> {
    let geometry = compute_geometry(options)?;
    let capacity = geometry.capacity();

    let groups = group_count(card_count, capacity);

    // Front and back of each sheet
    let output_pages = groups * 2;

    let last_group_size = match card_count % capacity {
        0 if card_count > 0 => capacity,
        rest => rest,
    };
    let empty_slots = if groups == 0 {
        0
    } else {
        capacity - last_group_size
    };

    Ok(SheetStatistics {
        cards: card_count,
        capacity,
        groups,
        output_pages,
        last_group_size,
        empty_slots,
    })
}
