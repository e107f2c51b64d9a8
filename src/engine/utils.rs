use crate::entity::Ghost;
use crate::rng::RandomSource;
use crate::types::{Direction, Position};

pub(super) fn random_direction(rng: &mut dyn RandomSource) -> Direction {
    Direction::ALL[rng.pick_index(Direction::ALL.len())]
}

pub(super) fn ghost_index_at(ghosts: &[Ghost], pos: Position) -> Option<usize> {
    ghosts.iter().position(|ghost| ghost.pos == pos)
}

pub(super) fn is_cell_occupied_by_other_ghost(
    ghosts: &[Ghost],
    pos: Position,
    exclude_ghost_idx: usize,
) -> bool {
    ghosts
        .iter()
        .enumerate()
        .any(|(idx, ghost)| idx != exclude_ghost_idx && ghost.pos == pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    fn ghost(id: &str, row: usize, col: usize) -> Ghost {
        Ghost {
            id: id.to_string(),
            pos: Position::new(row, col),
            color_index: 0,
        }
    }

    #[test]
    fn random_direction_maps_indices_in_draw_order() {
        struct Fixed(usize);
        impl RandomSource for Fixed {
            fn pick_index(&mut self, _len: usize) -> usize {
                self.0
            }
        }
        assert_eq!(random_direction(&mut Fixed(0)), Direction::Up);
        assert_eq!(random_direction(&mut Fixed(1)), Direction::Down);
        assert_eq!(random_direction(&mut Fixed(2)), Direction::Left);
        assert_eq!(random_direction(&mut Fixed(3)), Direction::Right);

        let mut rng = Rng::new(5);
        for _ in 0..32 {
            let _ = random_direction(&mut rng);
        }
    }

    #[test]
    fn occupancy_ignores_the_moving_ghost() {
        let ghosts = vec![ghost("ghost_1", 0, 0), ghost("ghost_2", 0, 1)];
        assert!(!is_cell_occupied_by_other_ghost(&ghosts, Position::new(0, 0), 0));
        assert!(is_cell_occupied_by_other_ghost(&ghosts, Position::new(0, 1), 0));
        assert_eq!(ghost_index_at(&ghosts, Position::new(0, 1)), Some(1));
        assert_eq!(ghost_index_at(&ghosts, Position::new(1, 1)), None);
    }
}
