use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::board::{Board, Cell, Position};
use crate::game::{BoardStatus, PushMove};

/// Error type for puzzle loading.
#[derive(Debug)]
pub enum PuzzleError {
    /// IO error when reading from file
    Io(io::Error),
    /// Malformed or inconsistent puzzle content
    Invalid(String),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::Io(err) => write!(f, "IO error: {}", err),
            PuzzleError::Invalid(msg) => write!(f, "Invalid puzzle: {}", msg),
        }
    }
}

impl std::error::Error for PuzzleError {}

impl From<io::Error> for PuzzleError {
    fn from(err: io::Error) -> Self {
        PuzzleError::Io(err)
    }
}

impl From<String> for PuzzleError {
    fn from(err: String) -> Self {
        PuzzleError::Invalid(err)
    }
}

/// A validated starting configuration: board, player start and targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    board: Board,
    player: Position,
    targets: Vec<Position>,
}

impl Puzzle {
    /// Validate a decoded puzzle.
    ///
    /// `Endpoint` cells are display markers: they are added to the targets and
    /// turned back into `Path` so the search only ever sees floor, walls and
    /// boxes.
    pub fn new(
        mut board: Board,
        player: Position,
        mut targets: Vec<Position>,
    ) -> Result<Self, PuzzleError> {
        let positions: Vec<Position> = board.positions().collect();
        for pos in positions {
            match board.get(pos) {
                Cell::Endpoint => {
                    board.set(pos, Cell::Path);
                    if !targets.contains(&pos) {
                        targets.push(pos);
                    }
                }
                Cell::ReachableMarked | Cell::UnreachableMarked => {
                    return Err(format!("Unexpected scratch marker at {}", pos).into());
                }
                _ => {}
            }
        }

        if !board.contains(player) {
            return Err(format!("Player start {} is outside the board", player).into());
        }
        if board.get(player) != Cell::Path {
            return Err(format!(
                "Player start {} is on {:?}, expected Path",
                player,
                board.get(player)
            )
            .into());
        }

        if targets.is_empty() {
            return Err("No targets given".to_string().into());
        }
        for (i, &target) in targets.iter().enumerate() {
            if !board.contains(target) {
                return Err(format!("Target {} is outside the board", target).into());
            }
            let cell = board.get(target);
            if cell != Cell::Path && cell != Cell::Box {
                return Err(format!("Target {} is on {:?}", target, cell).into());
            }
            if targets[..i].contains(&target) {
                return Err(format!("Duplicate target {}", target).into());
            }
        }

        Ok(Puzzle {
            board,
            player,
            targets,
        })
    }

    /// Parse a puzzle description.
    ///
    /// The description has three sections separated by `;`:
    /// - the board: rows separated by `*`, cells separated by whitespace,
    ///   each cell one of `WALL`, `PATH`, `BOX` or `VOID`
    /// - the player start as `(x, y)`
    /// - the targets as one or more `(x, y)` groups
    pub fn from_text(text: &str) -> Result<Self, PuzzleError> {
        let text = text.trim().trim_end_matches(';');
        let sections: Vec<&str> = text.split(';').collect();
        if sections.len() != 3 {
            return Err(format!(
                "Expected 3 sections separated by ';', found {}",
                sections.len()
            )
            .into());
        }

        let board = parse_board(sections[0])?;

        let player = match parse_coordinates(sections[1])?.as_slice() {
            [player] => *player,
            other => {
                return Err(format!(
                    "Expected one player start, found {} coordinates",
                    other.len()
                )
                .into());
            }
        };

        let targets = parse_coordinates(sections[2])?;

        Self::new(board, player, targets)
    }

    /// Parse a puzzle from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PuzzleError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn targets(&self) -> &[Position] {
        &self.targets
    }

    pub fn initial_status(&self) -> BoardStatus {
        BoardStatus::new(self.board.clone(), self.player)
    }

    /// True if every target holds a box on the given board.
    pub fn is_solved(&self, board: &Board) -> bool {
        self.targets
            .iter()
            .all(|&target| board.get(target) == Cell::Box)
    }

    /// Apply a sequence of pushes to the starting configuration.
    pub fn replay(&self, pushes: &[PushMove]) -> BoardStatus {
        let mut status = self.initial_status();
        for &push in pushes {
            status.update(push);
        }
        status
    }
}

fn parse_cell(token: &str) -> Result<Cell, String> {
    match token {
        "WALL" => Ok(Cell::Wall),
        "PATH" => Ok(Cell::Path),
        "BOX" => Ok(Cell::Box),
        "VOID" => Ok(Cell::Void),
        _ => Err(format!("Unknown cell '{}'", token)),
    }
}

fn parse_board(section: &str) -> Result<Board, String> {
    let rows = section
        .split('*')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.split_whitespace()
                .map(parse_cell)
                .collect::<Result<Vec<Cell>, String>>()
        })
        .collect::<Result<Vec<_>, String>>()?;

    Board::from_rows(rows)
}

/// Parse a run of `(x, y)` groups, optionally separated by commas.
fn parse_coordinates(section: &str) -> Result<Vec<Position>, String> {
    let mut positions = Vec::new();
    let mut rest = section.trim();

    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('(')
            .ok_or_else(|| format!("Expected '(' in '{}'", section.trim()))?;
        let close = inner
            .find(')')
            .ok_or_else(|| format!("Unclosed '(' in '{}'", section.trim()))?;

        let parts: Vec<&str> = inner[..close].split(',').map(str::trim).collect();
        let [x, y] = parts.as_slice() else {
            return Err(format!("Expected (x, y), found '({})'", &inner[..close]));
        };
        let x = x
            .parse::<usize>()
            .map_err(|_| format!("Invalid coordinate '{}'", x))?;
        let y = y
            .parse::<usize>()
            .map_err(|_| format!("Invalid coordinate '{}'", y))?;
        positions.push(Position::new(x, y));

        rest = inner[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    if positions.is_empty() {
        return Err("Expected at least one (x, y) coordinate".to_string());
    }

    Ok(positions)
}
