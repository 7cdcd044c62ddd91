//! DDA grid raycaster and wall shading
//!
//! One ray per screen column. Each ray walks the grid cell by cell until it
//! enters something solid, and the per-column distance is kept in a depth
//! buffer for sprite occlusion.

use glam::Vec2;

use super::framebuffer::{Framebuffer, Rgb};
use crate::sim::grid::{Grid, Tile};

const CEILING: Rgb = Rgb::hex(0x2a2a35);
const FLOOR: Rgb = Rgb::hex(0x3a2a1a);
const FOG: Rgb = Rgb::new(20, 20, 30);
const MAX_FOG: f32 = 0.2;
const BRIGHTNESS: f32 = 1.5;
const Y_SIDE_SHADE: f32 = 0.85;

/// Which kind of grid line the ray crossed last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// A vertical grid line (x = const)
    X,
    /// A horizontal grid line (y = const)
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray to the hit
    pub distance: f32,
    pub tile: Tile,
    pub side: Side,
    pub cell: (i32, i32),
}

/// Screen projection for a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    pub fov: f32,
    /// Distance from the eye to the projection plane, in pixels
    pub projection: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, fov: f32) -> Self {
        Self {
            width,
            height,
            fov,
            projection: (width as f32 / 2.0) / (fov / 2.0).tan(),
        }
    }

    /// Ray angle for a screen column
    #[inline]
    pub fn column_angle(&self, heading: f32, column: u32) -> f32 {
        heading - self.fov / 2.0 + (column as f32 / self.width as f32) * self.fov
    }

    /// Screen x for an angular offset from the heading
    #[inline]
    pub fn column_for_offset(&self, offset: f32) -> f32 {
        (offset + self.fov / 2.0) / self.fov * self.width as f32
    }

    /// On-screen height of something `scale` units tall at `distance`
    #[inline]
    pub fn projected_height(&self, scale: f32, distance: f32) -> f32 {
        self.projection * scale / distance.max(1e-4)
    }
}

/// Per-column wall distance, perpendicular to the view plane
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepthBuffer(Vec<f32>);

impl DepthBuffer {
    pub fn new(width: u32) -> Self {
        Self(vec![f32::INFINITY; width as usize])
    }

    pub fn resize(&mut self, width: u32) {
        self.0.resize(width as usize, f32::INFINITY);
    }

    /// Depth at a column; off-screen columns read as zero so nothing draws
    #[inline]
    pub fn get(&self, column: i32) -> f32 {
        if column < 0 {
            return 0.0;
        }
        self.0.get(column as usize).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn set(&mut self, column: usize, depth: f32) {
        if let Some(d) = self.0.get_mut(column) {
            *d = depth;
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Walk the grid from `origin` along `angle` until a solid tile is entered
pub fn cast_ray(grid: &Grid, origin: Vec2, angle: f32, exit_open: bool) -> RayHit {
    let dir = Vec2::new(angle.cos(), angle.sin());
    let mut cell = (origin.x.floor() as i32, origin.y.floor() as i32);

    let delta = Vec2::new(
        if dir.x == 0.0 { f32::INFINITY } else { (1.0 / dir.x).abs() },
        if dir.y == 0.0 { f32::INFINITY } else { (1.0 / dir.y).abs() },
    );
    let (step_x, mut side_x) = if dir.x == 0.0 {
        (0, f32::INFINITY)
    } else if dir.x < 0.0 {
        (-1, (origin.x - cell.0 as f32) * delta.x)
    } else {
        (1, (cell.0 as f32 + 1.0 - origin.x) * delta.x)
    };
    let (step_y, mut side_y) = if dir.y == 0.0 {
        (0, f32::INFINITY)
    } else if dir.y < 0.0 {
        (-1, (origin.y - cell.1 as f32) * delta.y)
    } else {
        (1, (cell.1 as f32 + 1.0 - origin.y) * delta.y)
    };

    // Out-of-bounds cells are walls, so a ray always stops within this many steps
    let max_steps = grid.width() + grid.height() + 2;
    let mut side = Side::X;
    let mut tile = Tile::Wall;
    for _ in 0..max_steps {
        if side_x < side_y {
            side_x += delta.x;
            cell.0 += step_x;
            side = Side::X;
        } else {
            side_y += delta.y;
            cell.1 += step_y;
            side = Side::Y;
        }
        tile = grid.tile_at_cell(cell.0, cell.1);
        if tile.blocks(exit_open) {
            break;
        }
    }

    let distance = match side {
        Side::X => side_x - delta.x,
        Side::Y => side_y - delta.y,
    };
    RayHit {
        distance,
        tile,
        side,
        cell,
    }
}

/// Unlit material color of a tile
pub fn base_color(tile: Tile, exit_open: bool) -> Rgb {
    match tile {
        Tile::Wall => Rgb::hex(0x8d6944),
        Tile::Door => Rgb::hex(0xa57341),
        Tile::Window => Rgb::hex(0xb0d4eb),
        Tile::Mirror => Rgb::hex(0xe0e0e0),
        Tile::Exit if exit_open => Rgb::new(80, 180, 140),
        Tile::Exit => Rgb::new(200, 120, 80),
        Tile::Light => Rgb::new(255, 255, 220),
        Tile::ClueMarker => Rgb::new(200, 150, 255),
        Tile::Reception => Rgb::new(150, 100, 60),
        Tile::Kitchen => Rgb::new(120, 120, 150),
        Tile::Bathroom => Rgb::new(150, 150, 170),
        Tile::Stairs => Rgb::new(160, 140, 100),
        Tile::GhostSpawn => Rgb::new(100, 100, 130),
        Tile::Floor => Rgb::new(120, 100, 80),
    }
}

/// Lit wall color: distance falloff, darker y-sides, a faint banding texture
pub fn shade(tile: Tile, distance: f32, side: Side, exit_open: bool) -> Rgb {
    let falloff = 1.0 / (1.0 + distance * 0.06);
    let side_factor = match side {
        Side::X => 1.0,
        Side::Y => Y_SIDE_SHADE,
    };
    let texture = 1.0 + (distance * 10.0).sin() * 0.05;
    base_color(tile, exit_open).scaled(falloff * side_factor * texture * BRIGHTNESS)
}

/// Fog strength for a column
#[inline]
pub fn fog_alpha(distance: f32, fear: f32) -> f32 {
    (distance / 25.0 + fear * 0.1).min(MAX_FOG)
}

/// Ceiling, floor and one wall slice per column; fills `depth`
#[allow(clippy::too_many_arguments)]
pub fn render_walls(
    frame: &mut Framebuffer,
    depth: &mut DepthBuffer,
    camera: &Camera,
    grid: &Grid,
    eye: Vec2,
    heading: f32,
    exit_open: bool,
    fear: f32,
) {
    let w = camera.width;
    let h = camera.height as f32;
    let horizon = (camera.height / 2) as i32;
    frame.fill_rect(0, 0, w as i32, horizon, CEILING);
    frame.fill_rect(0, horizon, w as i32, camera.height as i32 - horizon, FLOOR);

    for column in 0..w {
        let angle = camera.column_angle(heading, column);
        let hit = cast_ray(grid, eye, angle, exit_open);
        let corrected = hit.distance * (angle - heading).cos();
        depth.set(column as usize, corrected);

        let wall_height = h.min(camera.projection / corrected.max(1e-4));
        let top = (h - wall_height) / 2.0;
        let x = column as i32;
        frame.fill_column(x, top, wall_height, shade(hit.tile, corrected, hit.side, exit_open));
        frame.blend_column(x, 0.0, h, FOG, fog_alpha(corrected, fear));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    // Corridor along x: open from x=1 to x=9, wall at x=10
    const CORRIDOR: [&str; 3] = ["###########", "#.........E", "###########"];

    fn corridor() -> Grid {
        Grid::parse(&CORRIDOR).unwrap()
    }

    #[test]
    fn test_corridor_length() {
        let grid = corridor();
        let hit = cast_ray(&grid, Vec2::new(1.5, 1.5), 0.0, false);
        assert!((hit.distance - 8.5).abs() < 1e-4);
        assert_eq!(hit.tile, Tile::Exit);
        assert_eq!(hit.side, Side::X);
        assert_eq!(hit.cell, (10, 1));

        let back = cast_ray(&grid, Vec2::new(5.25, 1.5), PI, false);
        assert!((back.distance - 4.25).abs() < 1e-4);
        assert_eq!(back.tile, Tile::Wall);
    }

    #[test]
    fn test_open_exit_lets_ray_through() {
        let grid = corridor();
        let hit = cast_ray(&grid, Vec2::new(1.5, 1.5), 0.0, true);
        // Past the open exit lies the out-of-bounds wall
        assert!((hit.distance - 9.5).abs() < 1e-4);
        assert_eq!(hit.tile, Tile::Wall);
    }

    #[test]
    fn test_axis_aligned_vertical_ray() {
        let grid = corridor();
        let hit = cast_ray(&grid, Vec2::new(3.5, 1.5), FRAC_PI_2, false);
        assert!((hit.distance - 0.5).abs() < 1e-4);
        assert_eq!(hit.side, Side::Y);
    }

    #[test]
    fn test_corrected_center_column_matches_ray() {
        let grid = corridor();
        let camera = Camera::new(64, 48, crate::consts::FOV);
        let mut frame = Framebuffer::new(64, 48);
        let mut depth = DepthBuffer::new(64);
        render_walls(
            &mut frame,
            &mut depth,
            &camera,
            &grid,
            Vec2::new(1.5, 1.5),
            0.0,
            false,
            0.2,
        );
        // Column w/2 looks straight down the corridor
        assert!((depth.get(32) - 8.5).abs() < 1e-3);
        assert_eq!(depth.get(-1), 0.0);
        assert_eq!(depth.get(64), 0.0);
    }

    #[test]
    fn test_shading() {
        let near = shade(Tile::Wall, 0.0, Side::X, false);
        let far = shade(Tile::Wall, 10.0, Side::X, false);
        let y_side = shade(Tile::Wall, 0.0, Side::Y, false);
        assert_eq!(near, Rgb::hex(0x8d6944).scaled(1.5));
        assert!(far.r < near.r);
        assert!(y_side.r < near.r);
        assert_ne!(base_color(Tile::Exit, false), base_color(Tile::Exit, true));
    }

    #[test]
    fn test_fog_is_capped() {
        assert_eq!(fog_alpha(100.0, 1.0), 0.2);
        assert!((fog_alpha(1.0, 0.0) - 0.04).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_ray_always_terminates_on_solid(
            x in 1.01f32..9.99,
            angle in -7.0f32..7.0,
            exit_open in any::<bool>(),
        ) {
            let grid = corridor();
            let hit = cast_ray(&grid, Vec2::new(x, 1.5), angle, exit_open);
            prop_assert!(hit.tile.blocks(exit_open));
            prop_assert!(hit.distance.is_finite());
            prop_assert!(hit.distance >= 0.0);
        }
    }
}
