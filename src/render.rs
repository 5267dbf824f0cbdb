use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use image::{Rgb, RgbImage};
use log::debug;

use crate::board::{Cell, Position};
use crate::game::{BoardStatus, PushMove};
use crate::puzzle::Puzzle;

const WALL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const PATH_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const PLAYER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TARGET_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const VOID_COLOR: Rgb<u8> = Rgb([64, 64, 64]);

/// A board status drawn together with the targets it is trying to fill.
pub struct Scene<'a> {
    status: &'a BoardStatus,
    targets: &'a [Position],
}

impl<'a> Scene<'a> {
    pub fn new(status: &'a BoardStatus, targets: &'a [Position]) -> Self {
        Scene { status, targets }
    }

    fn is_target(&self, pos: Position) -> bool {
        self.targets.contains(&pos)
    }

    fn color(&self, pos: Position) -> Rgb<u8> {
        if pos == self.status.player {
            return PLAYER_COLOR;
        }
        match self.status.board.get(pos) {
            Cell::Box => BOX_COLOR,
            Cell::Wall => WALL_COLOR,
            Cell::Void => VOID_COLOR,
            Cell::Endpoint => TARGET_COLOR,
            _ if self.is_target(pos) => TARGET_COLOR,
            _ => PATH_COLOR,
        }
    }

    /// Draw each cell as a `block_size` square.
    pub fn to_image(&self, block_size: u32) -> RgbImage {
        let board = &self.status.board;
        let mut img = RgbImage::new(
            board.width() as u32 * block_size,
            board.height() as u32 * block_size,
        );

        for pos in board.positions() {
            let color = self.color(pos);
            let x0 = pos.x as u32 * block_size;
            let y0 = pos.y as u32 * block_size;
            for dy in 0..block_size {
                for dx in 0..block_size {
                    img.put_pixel(x0 + dx, y0 + dy, color);
                }
            }
        }

        img
    }
}

impl fmt::Display for Scene<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = &self.status.board;
        for y in 0..board.height() {
            let mut line = String::new();
            for x in 0..board.width() {
                let pos = Position::new(x, y);
                let is_target = self.is_target(pos);

                let ch = if pos == self.status.player {
                    if is_target { '+' } else { '@' }
                } else {
                    match board.get(pos) {
                        Cell::Box if is_target => '*',
                        Cell::Box => '$',
                        Cell::Wall => '#',
                        Cell::Void => '-',
                        Cell::Endpoint => '.',
                        _ if is_target => '.',
                        _ => ' ',
                    }
                };
                line.push(ch);
            }
            // Trim trailing spaces
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Error type for image export.
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Image(image::ImageError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "IO error: {}", err),
            ExportError::Image(err) => write!(f, "image encode error: {}", err),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::Image(err)
    }
}

fn save_frame(
    status: &BoardStatus,
    targets: &[Position],
    dir: &Path,
    frame: usize,
    block_size: u32,
) -> Result<(), ExportError> {
    let path = dir.join(format!("step_{}.png", frame));
    debug!("writing {}", path.display());
    Scene::new(status, targets).to_image(block_size).save(&path)?;
    Ok(())
}

/// Write one PNG per frame of a solution into `dir`.
///
/// Frame 0 is the starting configuration. Each push adds two frames: the
/// player standing behind the box, then the board after the push. Returns the
/// number of frames written.
pub fn export_steps(
    puzzle: &Puzzle,
    pushes: &[PushMove],
    dir: &Path,
    block_size: u32,
) -> Result<usize, ExportError> {
    fs::create_dir_all(dir)?;

    let targets = puzzle.targets();
    let mut status = puzzle.initial_status();
    let mut frame = 0;

    save_frame(&status, targets, dir, frame, block_size)?;
    frame += 1;

    for &push in pushes {
        if let Some(stand) = status.board.step(push.box_pos, push.direction.opposite()) {
            status.player = stand;
        }
        save_frame(&status, targets, dir, frame, block_size)?;
        frame += 1;

        status.update(push);
        save_frame(&status, targets, dir, frame, block_size)?;
        frame += 1;
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;

    const SMALL: &str = "\
* VOID WALL WALL WALL WALL WALL
* VOID WALL PATH BOX PATH WALL
* VOID WALL WALL WALL WALL WALL
;(2, 1);(4, 1)
";

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("pushbox-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_display() {
        let puzzle = Puzzle::from_text(SMALL).unwrap();
        let status = puzzle.initial_status();
        let output = Scene::new(&status, puzzle.targets()).to_string();
        assert_eq!(output, "-#####\n-#@$.#\n-#####\n");
    }

    #[test]
    fn test_display_solved() {
        let puzzle = Puzzle::from_text(SMALL).unwrap();
        let status = puzzle.replay(&[PushMove::new(Position::new(3, 1), Direction::Right)]);
        let output = Scene::new(&status, puzzle.targets()).to_string();
        assert_eq!(output, "-#####\n-# @*#\n-#####\n");
    }

    #[test]
    fn test_display_player_on_target() {
        let puzzle = Puzzle::from_text(SMALL).unwrap();
        let status = puzzle.initial_status();
        let targets = [Position::new(2, 1)];
        let output = Scene::new(&status, &targets).to_string();
        assert_eq!(output, "-#####\n-#+$ #\n-#####\n");
    }

    #[test]
    fn test_to_image() {
        let puzzle = Puzzle::from_text(SMALL).unwrap();
        let status = puzzle.initial_status();
        let img = Scene::new(&status, puzzle.targets()).to_image(4);

        assert_eq!(img.dimensions(), (24, 12));
        assert_eq!(*img.get_pixel(1, 1), VOID_COLOR);
        assert_eq!(*img.get_pixel(5, 1), WALL_COLOR);
        assert_eq!(*img.get_pixel(9, 5), PLAYER_COLOR);
        assert_eq!(*img.get_pixel(15, 7), BOX_COLOR);
        assert_eq!(*img.get_pixel(16, 4), TARGET_COLOR);
    }

    #[test]
    fn test_export_steps() {
        let puzzle = Puzzle::from_text(SMALL).unwrap();
        let pushes = [PushMove::new(Position::new(3, 1), Direction::Right)];
        let dir = scratch_dir("export");

        let frames = export_steps(&puzzle, &pushes, &dir, 2).unwrap();
        assert_eq!(frames, 3);
        for frame in 0..frames {
            assert!(dir.join(format!("step_{}.png", frame)).exists());
        }

        let last = image::open(dir.join("step_2.png")).unwrap().to_rgb8();
        assert_eq!(last.dimensions(), (12, 6));
        assert_eq!(*last.get_pixel(6, 2), PLAYER_COLOR);
        assert_eq!(*last.get_pixel(8, 2), BOX_COLOR);

        fs::remove_dir_all(&dir).unwrap();
    }
}
