use std::collections::HashMap;

use crate::board::{Board, Position};
use crate::game::{BoardStatus, PushMove};
use crate::puzzle::Puzzle;
use crate::reach::{NeighborOrder, Oracle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Pushes that take the starting configuration to a solved one.
    Solved(Vec<PushMove>),
    /// Every distinct configuration was explored without reaching the goal.
    Exhausted,
    /// The step budget ran out first.
    Aborted,
}

/// Search transitions reported to a `Tracer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Push(PushMove),
    Undo(PushMove),
    /// The current configuration is equivalent to one already explored.
    Repetition,
    /// No push is possible from the current configuration.
    DeadEnd,
}

pub trait Tracer {
    fn trace(&self, event: Event, status: &BoardStatus, steps: usize);
}

pub struct NullTracer;

impl Tracer for NullTracer {
    fn trace(&self, _event: Event, _status: &BoardStatus, _steps: usize) {}
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Give up after examining this many configurations.
    pub max_steps: Option<usize>,
    pub neighbor_order: NeighborOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_steps: None,
            neighbor_order: NeighborOrder::Fixed,
        }
    }
}

/// One level of the backtracking stack.
struct Frame {
    applied: PushMove,
    siblings: Vec<PushMove>,
}

/// Configurations explored so far, grouped by box layout. Within a layout the
/// player positions keep the order they were recorded in.
struct Visited {
    layouts: HashMap<Board, Vec<Position>>,
    len: usize,
}

impl Visited {
    fn new() -> Self {
        Visited {
            layouts: HashMap::new(),
            len: 0,
        }
    }

    fn record(&mut self, status: &BoardStatus) {
        self.layouts
            .entry(status.board.clone())
            .or_default()
            .push(status.player);
        self.len += 1;
    }

    /// True if a recorded configuration has the same layout and a player the
    /// current player can walk to.
    fn contains(&self, status: &BoardStatus, oracle: &mut Oracle) -> bool {
        self.layouts.get(&status.board).is_some_and(|players| {
            players
                .iter()
                .any(|&player| oracle.reachable(&status.board, status.player, player))
        })
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Depth-first push search with exact undo.
pub struct Solver<T: Tracer = NullTracer> {
    puzzle: Puzzle,
    status: BoardStatus,
    oracle: Oracle,
    frames: Vec<Frame>,
    visited: Visited,
    steps: usize,
    max_steps: Option<usize>,
    tracer: T,
}

impl Solver<NullTracer> {
    pub fn new(puzzle: &Puzzle, config: SolverConfig) -> Self {
        Solver {
            puzzle: puzzle.clone(),
            status: puzzle.initial_status(),
            oracle: Oracle::new(config.neighbor_order),
            frames: Vec::new(),
            visited: Visited::new(),
            steps: 0,
            max_steps: config.max_steps,
            tracer: NullTracer,
        }
    }
}

impl<T: Tracer> Solver<T> {
    pub fn with_tracer<U: Tracer>(self, tracer: U) -> Solver<U> {
        Solver {
            puzzle: self.puzzle,
            status: self.status,
            oracle: self.oracle,
            frames: self.frames,
            visited: self.visited,
            steps: self.steps,
            max_steps: self.max_steps,
            tracer,
        }
    }

    /// Number of configurations examined by the last `solve`.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of distinct configurations recorded by the last `solve`.
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Search from the puzzle's starting configuration.
    pub fn solve(&mut self) -> SolveResult {
        self.status = self.puzzle.initial_status();
        self.frames.clear();
        self.visited = Visited::new();
        self.steps = 0;

        loop {
            if self.max_steps.is_some_and(|max| self.steps >= max) {
                return SolveResult::Aborted;
            }
            self.steps += 1;

            if self.puzzle.is_solved(&self.status.board) {
                let pushes = self.frames.iter().map(|frame| frame.applied).collect();
                return SolveResult::Solved(pushes);
            }

            if self.visited.contains(&self.status, &mut self.oracle) {
                self.tracer.trace(Event::Repetition, &self.status, self.steps);
                if !self.backtrack() {
                    return SolveResult::Exhausted;
                }
                continue;
            }
            self.visited.record(&self.status);

            let mut pushes = self.status.generate_pushes(&mut self.oracle);
            match pushes.pop() {
                Some(push) => self.apply(push, pushes),
                None => {
                    self.tracer.trace(Event::DeadEnd, &self.status, self.steps);
                    if !self.backtrack() {
                        return SolveResult::Exhausted;
                    }
                }
            }
        }
    }

    fn apply(&mut self, push: PushMove, siblings: Vec<PushMove>) {
        self.status.update(push);
        self.frames.push(Frame {
            applied: push,
            siblings,
        });
        self.tracer.trace(Event::Push(push), &self.status, self.steps);
    }

    /// Undo pushes until a frame has an untried sibling, then apply it in
    /// place of that frame's push. Returns false once the stack is empty.
    fn backtrack(&mut self) -> bool {
        while let Some(frame) = self.frames.last_mut() {
            self.status.retrospect(frame.applied);
            self.tracer
                .trace(Event::Undo(frame.applied), &self.status, self.steps);

            if let Some(next) = frame.siblings.pop() {
                frame.applied = next;
                self.status.update(next);
                self.tracer.trace(Event::Push(next), &self.status, self.steps);
                return true;
            }
            self.frames.pop();
        }
        false
    }
}
