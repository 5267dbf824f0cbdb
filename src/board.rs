use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Outside the playable area.
    Void,
    Wall,
    Path,
    Box,
    /// Target marker. Only used for display, never part of a search layout.
    Endpoint,
    // Scratch markers written by the reachability oracle on its own copy.
    ReachableMarked,
    UnreachableMarked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Order in which the push generator tries directions for each box.
pub const PUSH_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Build a board from rows of cells. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, String> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);

        if height == 0 || width == 0 {
            return Err("Empty board".to_string());
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(format!(
                    "Row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                ));
            }
            cells.extend(row);
        }

        Ok(Board {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn offset(&self, pos: Position) -> usize {
        assert!(
            self.contains(pos),
            "Position {} out of range for {}x{} board",
            pos,
            self.width,
            self.height
        );
        pos.y * self.width + pos.x
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[self.offset(pos)]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let offset = self.offset(pos);
        self.cells[offset] = cell;
    }

    /// Move from `pos` one cell in `dir`.
    /// Returns None if the new position would fall off the board.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let next = Position::new(x, y);
        self.contains(next).then_some(next)
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Positions currently holding a box, in row-major order.
    pub fn box_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|&pos| self.get(pos) == Cell::Box)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        use Cell::*;
        Board::from_rows(vec![
            vec![Wall, Wall, Wall, Wall],
            vec![Wall, Box, Path, Wall],
            vec![Wall, Path, Box, Wall],
            vec![Wall, Wall, Wall, Wall],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_rows() {
        let board = sample();
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 4);
        assert_eq!(board.get(Position::new(1, 1)), Cell::Box);
        assert_eq!(board.get(Position::new(2, 1)), Cell::Path);
        assert_eq!(board.get(Position::new(3, 3)), Cell::Wall);
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![Cell::Wall, Cell::Wall], vec![Cell::Wall]];
        assert!(Board::from_rows(rows).is_err());
    }

    #[test]
    fn test_from_rows_empty() {
        assert!(Board::from_rows(Vec::new()).is_err());
        assert!(Board::from_rows(vec![Vec::new()]).is_err());
    }

    #[test]
    fn test_set() {
        let mut board = sample();
        board.set(Position::new(2, 1), Cell::Box);
        assert_eq!(board.get(Position::new(2, 1)), Cell::Box);
    }

    #[test]
    fn test_box_positions_row_major() {
        let mut board = sample();
        board.set(Position::new(2, 1), Cell::Box);
        assert_eq!(
            board.box_positions(),
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_step() {
        let board = sample();
        let origin = Position::new(0, 0);
        assert_eq!(board.step(origin, Direction::Left), None);
        assert_eq!(board.step(origin, Direction::Up), None);
        assert_eq!(
            board.step(origin, Direction::Right),
            Some(Position::new(1, 0))
        );
        assert_eq!(
            board.step(origin, Direction::Down),
            Some(Position::new(0, 1))
        );

        let corner = Position::new(3, 3);
        assert_eq!(board.step(corner, Direction::Right), None);
        assert_eq!(board.step(corner, Direction::Down), None);
    }

    #[test]
    fn test_opposite() {
        for dir in PUSH_DIRECTIONS {
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_structural_equality() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);

        b.set(Position::new(2, 1), Cell::Box);
        assert_ne!(a, b);

        b.set(Position::new(2, 1), Cell::Path);
        assert_eq!(a, b);

        // Same cells, different shape
        let wide = Board::from_rows(vec![vec![Cell::Path; 4]; 2]).unwrap();
        let tall = Board::from_rows(vec![vec![Cell::Path; 2]; 4]).unwrap();
        assert_ne!(wide, tall);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range() {
        let board = sample();
        board.get(Position::new(4, 0));
    }
}
