use super::Direction;

/// Wraparound subpage stepping.
///
/// Subpages are 1-indexed; a page with `max <= 1` has nothing to cycle,
/// so the result is pinned to 1 regardless of direction.
pub fn next_sub_page(current: u16, max: u16, direction: Direction) -> u16 {
    if max <= 1 {
        return 1;
    }

    match direction {
        Direction::Next => {
            if current >= max {
                1
            } else {
                current + 1
            }
        }
        Direction::Back => {
            if current <= 1 {
                max
            } else {
                current - 1
            }
        }
    }
}
