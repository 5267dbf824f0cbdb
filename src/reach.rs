use arrayvec::ArrayVec;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, Cell, Direction, Position};

const WALK_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// Order in which the walk tries the neighbours of a cell.
///
/// The order never changes whether a destination is reachable, only how much
/// of the board gets walked before it is found.
#[derive(Debug, Clone)]
pub enum NeighborOrder {
    /// Up, Down, Left, Right.
    Fixed,
    /// Random order per step, drawn from a seeded generator so runs repeat.
    Shuffled(ChaCha8Rng),
}

impl NeighborOrder {
    pub fn shuffled(seed: u64) -> Self {
        NeighborOrder::Shuffled(ChaCha8Rng::seed_from_u64(seed))
    }

    fn directions(&mut self) -> [Direction; 4] {
        let mut dirs = WALK_DIRECTIONS;
        if let NeighborOrder::Shuffled(rng) = self {
            dirs.shuffle(rng);
        }
        dirs
    }
}

/// Answers whether the player can walk between two cells with the boxes held
/// in place.
#[derive(Debug, Clone)]
pub struct Oracle {
    order: NeighborOrder,
}

impl Oracle {
    pub fn new(order: NeighborOrder) -> Self {
        Oracle { order }
    }

    /// Returns true if `destination` can be reached from `start` by walking
    /// over `Path` cells only. `start` itself may be any kind of cell.
    pub fn reachable(&mut self, board: &Board, start: Position, destination: Position) -> bool {
        if start == destination {
            return true;
        }

        let mut scratch = board.clone();
        let mut stack = vec![start];
        scratch.set(start, Cell::ReachableMarked);

        while let Some(&top) = stack.last() {
            let open: ArrayVec<Position, 4> = self
                .order
                .directions()
                .into_iter()
                .filter_map(|dir| scratch.step(top, dir))
                .filter(|&next| scratch.get(next) == Cell::Path)
                .collect();

            match open.first() {
                Some(&next) => {
                    if next == destination {
                        return true;
                    }
                    scratch.set(next, Cell::ReachableMarked);
                    stack.push(next);
                }
                None => {
                    // Dead end
                    scratch.set(top, Cell::UnreachableMarked);
                    stack.pop();
                }
            }
        }

        false
    }
}

impl Default for Oracle {
    fn default() -> Self {
        Self::new(NeighborOrder::Fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two rooms joined by a corridor that a box at (4, 2) plugs.
    //
    //   #########
    //   #  #    #
    //   #   $   #
    //   #  #    #
    //   #########
    fn plugged_rooms() -> Board {
        use Cell::*;
        Board::from_rows(vec![
            vec![Wall; 9],
            vec![Wall, Path, Path, Wall, Wall, Path, Path, Path, Wall],
            vec![Wall, Path, Path, Path, Box, Path, Path, Path, Wall],
            vec![Wall, Path, Path, Wall, Wall, Path, Path, Path, Wall],
            vec![Wall; 9],
        ])
        .unwrap()
    }

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_same_cell() {
        let board = plugged_rooms();
        let mut oracle = Oracle::default();
        assert!(oracle.reachable(&board, p(1, 1), p(1, 1)));
        // Holds even for cells the player could never stand on
        assert!(oracle.reachable(&board, p(0, 0), p(0, 0)));
    }

    #[test]
    fn test_within_room() {
        let board = plugged_rooms();
        let mut oracle = Oracle::default();
        assert!(oracle.reachable(&board, p(1, 1), p(3, 2)));
        assert!(oracle.reachable(&board, p(7, 3), p(5, 1)));
    }

    #[test]
    fn test_box_blocks() {
        let board = plugged_rooms();
        let mut oracle = Oracle::default();
        assert!(!oracle.reachable(&board, p(1, 1), p(5, 2)));
        assert!(!oracle.reachable(&board, p(1, 1), p(4, 2)));
    }

    #[test]
    fn test_opened_corridor() {
        let mut board = plugged_rooms();
        board.set(p(4, 2), Cell::Path);
        let mut oracle = Oracle::default();
        assert!(oracle.reachable(&board, p(1, 1), p(7, 3)));
    }

    #[test]
    fn test_walls_are_not_destinations() {
        let board = plugged_rooms();
        let mut oracle = Oracle::default();
        assert!(!oracle.reachable(&board, p(1, 1), p(0, 1)));
        assert!(!oracle.reachable(&board, p(1, 1), p(3, 1)));
    }

    #[test]
    fn test_start_on_box() {
        // The walk may leave a non-path start cell, e.g. a box the player is
        // standing in front of conceptually.
        let board = plugged_rooms();
        let mut oracle = Oracle::default();
        assert!(oracle.reachable(&board, p(4, 2), p(1, 1)));
        assert!(oracle.reachable(&board, p(4, 2), p(7, 3)));
    }

    #[test]
    fn test_does_not_modify_board() {
        let board = plugged_rooms();
        let before = board.clone();
        let mut oracle = Oracle::default();
        oracle.reachable(&board, p(1, 1), p(7, 3));
        assert_eq!(board, before);
    }

    #[test]
    fn test_symmetric() {
        let board = plugged_rooms();
        let open: Vec<Position> = board
            .positions()
            .filter(|&pos| board.get(pos) == Cell::Path)
            .collect();
        let mut oracle = Oracle::default();

        for &a in &open {
            for &b in &open {
                assert_eq!(
                    oracle.reachable(&board, a, b),
                    oracle.reachable(&board, b, a),
                    "{} <-> {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_shuffled_order_agrees() {
        let board = plugged_rooms();
        let mut fixed = Oracle::default();
        let mut shuffled = Oracle::new(NeighborOrder::shuffled(7));

        for a in board.positions() {
            for b in board.positions() {
                assert_eq!(
                    fixed.reachable(&board, a, b),
                    shuffled.reachable(&board, a, b),
                    "{} -> {}",
                    a,
                    b
                );
            }
        }
    }
}
