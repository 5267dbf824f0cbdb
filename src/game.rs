use std::fmt;

use crate::board::{Board, Cell, Direction, PUSH_DIRECTIONS, Position};
use crate::reach::Oracle;

/// Push the box at `box_pos` one cell in `direction`. The player stands on
/// the opposite side of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushMove {
    pub box_pos: Position,
    pub direction: Direction,
}

impl PushMove {
    pub fn new(box_pos: Position, direction: Direction) -> Self {
        PushMove { box_pos, direction }
    }
}

impl fmt::Display for PushMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.box_pos, self.direction)
    }
}

/// The board layout together with where the player stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStatus {
    pub board: Board,
    pub player: Position,
}

impl BoardStatus {
    pub fn new(board: Board, player: Position) -> Self {
        BoardStatus { board, player }
    }

    fn destination(&self, push: PushMove) -> Position {
        self.board
            .step(push.box_pos, push.direction)
            .unwrap_or_else(|| panic!("Cannot push box at {} off the board", push.box_pos))
    }

    /// Apply a push. The player ends up where the box used to be.
    /// Panics if there is no box to push or the destination is blocked.
    pub fn update(&mut self, push: PushMove) {
        assert!(
            self.board.get(push.box_pos) == Cell::Box,
            "No box at {}",
            push.box_pos
        );
        let dest = self.destination(push);
        assert!(
            self.board.get(dest) == Cell::Path,
            "Cannot push box to {}: destination blocked",
            dest
        );

        self.board.set(push.box_pos, Cell::Path);
        self.board.set(dest, Cell::Box);
        self.player = push.box_pos;
    }

    /// Undo a push made with `update`.
    /// The player goes back to the cell it pushed from.
    pub fn retrospect(&mut self, push: PushMove) {
        let dest = self.destination(push);
        assert!(
            self.board.get(dest) == Cell::Box,
            "Cannot undo push {}: no box at {}",
            push,
            dest
        );
        let behind = self
            .board
            .step(push.box_pos, push.direction.opposite())
            .unwrap_or_else(|| panic!("Cannot undo push {}: no cell behind the box", push));

        self.board.set(dest, Cell::Path);
        self.board.set(push.box_pos, Cell::Box);
        self.player = behind;
    }

    /// Every push the player can currently make.
    ///
    /// Boxes are visited in row-major order and, for each box, directions in
    /// the order Left, Right, Up, Down. The search always tries the last entry
    /// first, so this order fixes the exploration order.
    pub fn generate_pushes(&self, oracle: &mut Oracle) -> Vec<PushMove> {
        let mut pushes = Vec::new();

        for box_pos in self.board.box_positions() {
            for dir in PUSH_DIRECTIONS {
                let Some(dest) = self.board.step(box_pos, dir) else {
                    continue;
                };
                let Some(stand) = self.board.step(box_pos, dir.opposite()) else {
                    continue;
                };

                if self.board.get(dest) == Cell::Path
                    && oracle.reachable(&self.board, self.player, stand)
                {
                    pushes.push(PushMove::new(box_pos, dir));
                }
            }
        }

        pushes
    }
}
