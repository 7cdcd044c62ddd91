//! Tile grid world model
//!
//! The map is a rectangle of single-character symbols. Lookups outside the
//! rectangle (or with non-finite coordinates) resolve to a wall so callers
//! never have to bounds-check.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::LOS_SAMPLES_PER_UNIT;

/// Map parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("row {row} has length {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("map has no exit tile")]
    MissingExit,
    #[error("map has more than one exit tile (second at ({x}, {y}))")]
    DuplicateExit { x: usize, y: usize },
}

/// One cell of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    Door,
    Window,
    Mirror,
    Light,
    Exit,
    Reception,
    Kitchen,
    Bathroom,
    Stairs,
    GhostSpawn,
    ClueMarker,
}

impl Tile {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            '#' => Tile::Wall,
            '.' => Tile::Floor,
            'D' => Tile::Door,
            'W' => Tile::Window,
            'M' => Tile::Mirror,
            'L' => Tile::Light,
            'E' => Tile::Exit,
            'R' => Tile::Reception,
            'K' => Tile::Kitchen,
            'B' => Tile::Bathroom,
            'S' => Tile::Stairs,
            'G' => Tile::GhostSpawn,
            'C' => Tile::ClueMarker,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Door => 'D',
            Tile::Window => 'W',
            Tile::Mirror => 'M',
            Tile::Light => 'L',
            Tile::Exit => 'E',
            Tile::Reception => 'R',
            Tile::Kitchen => 'K',
            Tile::Bathroom => 'B',
            Tile::Stairs => 'S',
            Tile::GhostSpawn => 'G',
            Tile::ClueMarker => 'C',
        }
    }

    /// True only for permanent walls
    #[inline]
    pub fn is_wall(self) -> bool {
        self == Tile::Wall
    }

    /// Whether this tile stops movement and rays
    #[inline]
    pub fn blocks(self, exit_open: bool) -> bool {
        match self {
            Tile::Wall => true,
            Tile::Exit => !exit_open,
            _ => false,
        }
    }
}

/// A static light source extracted from the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub pos: Vec2,
    pub radius: f32,
}

impl Light {
    #[inline]
    pub fn covers(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }
}

/// Immutable rectangular tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    exit: Vec2,
}

impl Grid {
    /// Parse map rows. Every row must have the same length and exactly one exit.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut exit = None;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let tile =
                    Tile::from_symbol(symbol).ok_or(MapError::UnknownSymbol { symbol, x, y })?;
                if tile == Tile::Exit {
                    if exit.is_some() {
                        return Err(MapError::DuplicateExit { x, y });
                    }
                    exit = Some(cell_center(x, y));
                }
                tiles.push(tile);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            exit: exit.ok_or(MapError::MissingExit)?,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Center of the exit cell
    #[inline]
    pub fn exit(&self) -> Vec2 {
        self.exit
    }

    /// Tile at an integer cell; out-of-bounds cells are walls
    #[inline]
    pub fn tile_at_cell(&self, cx: i32, cy: i32) -> Tile {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return Tile::Wall;
        }
        self.tiles[cy as usize * self.width + cx as usize]
    }

    /// Tile under a continuous position (truncated to its cell)
    #[inline]
    pub fn tile_at(&self, pos: Vec2) -> Tile {
        if !pos.is_finite() {
            return Tile::Wall;
        }
        self.tile_at_cell(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// Whether a position lies inside the map rectangle
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.is_finite()
            && pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x < self.width as f32
            && pos.y < self.height as f32
    }

    /// Whether a position is inside something solid
    #[inline]
    pub fn is_solid(&self, pos: Vec2, exit_open: bool) -> bool {
        self.tile_at(pos).blocks(exit_open)
    }

    /// Whether the straight segment from `a` to `b` crosses no wall.
    ///
    /// Samples ten points per grid unit, so a one-cell wall cannot slip
    /// between two samples.
    pub fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        let delta = b - a;
        let steps = (delta.length() * LOS_SAMPLES_PER_UNIT).ceil() as u32;
        (1..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            !self.tile_at(a + delta * t).is_wall()
        })
    }

    /// Every light tile as a light source with the given radius
    pub fn lights(&self, radius: f32) -> Vec<Light> {
        self.cells()
            .filter(|&(_, _, tile)| tile == Tile::Light)
            .map(|(x, y, _)| Light {
                pos: cell_center(x, y),
                radius,
            })
            .collect()
    }

    /// Iterate `(x, y, tile)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, &tile)| (i % self.width, i / self.width, tile))
    }
}

#[inline]
fn cell_center(x: usize, y: usize) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SMALL: [&str; 5] = ["#######", "#..L..#", "#.###.#", "#....E#", "#######"];

    fn small() -> Grid {
        Grid::parse(&SMALL).unwrap()
    }

    #[test]
    fn test_parse_dimensions_and_exit() {
        let grid = small();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.exit(), Vec2::new(5.5, 3.5));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Grid::parse(&["###", "#E", "###"]).unwrap_err();
        assert_eq!(
            err,
            MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing_exit() {
        assert!(matches!(
            Grid::parse(&["#?#"]),
            Err(MapError::UnknownSymbol { symbol: '?', .. })
        ));
        assert_eq!(Grid::parse(&["###"]), Err(MapError::MissingExit));
        assert!(matches!(
            Grid::parse(&["#EE#"]),
            Err(MapError::DuplicateExit { x: 2, y: 0 })
        ));
        assert_eq!(Grid::parse::<&str>(&[]), Err(MapError::Empty));
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = small();
        assert_eq!(grid.tile_at(Vec2::new(-0.5, 1.5)), Tile::Wall);
        assert_eq!(grid.tile_at(Vec2::new(1.5, 99.0)), Tile::Wall);
        assert_eq!(grid.tile_at(Vec2::new(f32::NAN, 1.5)), Tile::Wall);
        assert_eq!(grid.tile_at_cell(7, 0), Tile::Wall);
        assert!(!grid.contains(Vec2::new(-0.5, 1.5)));
        assert!(!grid.contains(Vec2::new(7.0, 1.5)));
        assert!(grid.contains(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_exit_solid_until_open() {
        let grid = small();
        let exit = grid.exit();
        assert!(grid.is_solid(exit, false));
        assert!(!grid.is_solid(exit, true));
    }

    #[test]
    fn test_line_of_sight() {
        let grid = small();
        // Along the open top corridor
        assert!(grid.line_of_sight(Vec2::new(1.5, 1.5), Vec2::new(5.5, 1.5)));
        // Through the middle wall block
        assert!(!grid.line_of_sight(Vec2::new(3.5, 1.5), Vec2::new(3.5, 3.5)));
        // Zero-length segment is always clear
        assert!(grid.line_of_sight(Vec2::new(1.5, 1.5), Vec2::new(1.5, 1.5)));
    }

    #[test]
    fn test_locked_exit_does_not_block_sight() {
        let grid = Grid::parse(&["#####", "#.E.#", "#####"]).unwrap();
        assert!(grid.line_of_sight(Vec2::new(1.5, 1.5), Vec2::new(3.5, 1.5)));
    }

    #[test]
    fn test_lights_extracted() {
        let lights = small().lights(6.5);
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].pos, Vec2::new(3.5, 1.5));
        assert!(lights[0].covers(Vec2::new(1.5, 1.5)));
    }

    proptest! {
        #[test]
        fn prop_walls_and_locked_exit_always_solid(x in -3.0f32..10.0, y in -3.0f32..8.0) {
            let grid = small();
            let p = Vec2::new(x, y);
            let tile = grid.tile_at(p);
            if tile == Tile::Wall {
                prop_assert!(grid.is_solid(p, false));
                prop_assert!(grid.is_solid(p, true));
            }
            if tile == Tile::Exit {
                prop_assert!(grid.is_solid(p, false));
            }
        }
    }
}
