//! Overhead map overlay

use glam::Vec2;

use super::framebuffer::{Framebuffer, Rgb};
use crate::heading_vector;
use crate::sim::grid::Tile;
use crate::sim::state::Session;

/// Pixels per map cell
pub const MINIMAP_SCALE: i32 = 4;
/// Gap between the overlay and the frame edge
const MARGIN: i32 = 8;

const WALL: Rgb = Rgb::hex(0x444444);
const LAMP: Rgb = Rgb::hex(0xffff88);
const EXIT: Rgb = Rgb::hex(0x00ff88);
const MARKER: Rgb = Rgb::hex(0xff8800);
const FLOOR: Rgb = Rgb::hex(0x222222);
const CLUE: Rgb = Rgb::hex(0xffd700);
const GHOST: Rgb = Rgb::hex(0xff4444);
const PLAYER: Rgb = Rgb::hex(0x44ff88);

fn tile_color(tile: Tile) -> Rgb {
    match tile {
        Tile::Wall | Tile::Door | Tile::Window | Tile::Mirror => WALL,
        Tile::Light => LAMP,
        Tile::Exit => EXIT,
        Tile::ClueMarker => MARKER,
        _ => FLOOR,
    }
}

/// Top-left corner of the overlay for a frame, top-right aligned
pub fn origin(frame: &Framebuffer, map_width: usize) -> (i32, i32) {
    let w = map_width as i32 * MINIMAP_SCALE;
    (frame.width() as i32 - w - MARGIN, MARGIN)
}

/// Square marker of `size` cells centered on `pos`
fn marker(frame: &mut Framebuffer, at: (i32, i32), pos: Vec2, size: f32, color: Rgb) {
    let s = MINIMAP_SCALE as f32;
    let x = at.0 + ((pos.x - size / 2.0) * s).round() as i32;
    let y = at.1 + ((pos.y - size / 2.0) * s).round() as i32;
    let px = (size * s).round().max(1.0) as i32;
    frame.fill_rect(x, y, px, px, color);
}

/// Tiles, unfound clues, the ghost, the player and a heading tick
pub fn draw(frame: &mut Framebuffer, session: &Session) {
    let at = origin(frame, session.grid.width());
    for (x, y, tile) in session.grid.cells() {
        frame.fill_rect(
            at.0 + x as i32 * MINIMAP_SCALE,
            at.1 + y as i32 * MINIMAP_SCALE,
            MINIMAP_SCALE,
            MINIMAP_SCALE,
            tile_color(tile),
        );
    }

    for clue in session.objective.clues().iter().filter(|c| !c.found) {
        marker(frame, at, clue.pos, 0.4, CLUE);
    }
    marker(frame, at, session.ghost.pos, 0.6, GHOST);

    let player = session.player.pos;
    marker(frame, at, player, 0.4, PLAYER);

    // One sample per pixel along a 1.5 cell line
    let dir = heading_vector(session.player.heading);
    let steps = (1.5 * MINIMAP_SCALE as f32).ceil() as i32;
    for i in 1..=steps {
        let p = (player + dir * (i as f32 / MINIMAP_SCALE as f32)) * MINIMAP_SCALE as f32;
        frame.blend_pixel(at.0 + p.x.round() as i32, at.1 + p.y.round() as i32, PLAYER, 1.0);
    }
}
