//! Tile post-processor: mud ring flood fill, then adjacency packing.
//! Both passes run once per chunk load and are pure functions of the
//! chunk's already-generated surfaces plus `(world_seed, coord)`.

use unit::ChunkCoordinate;

use crate::chunk::Tile;
use crate::noise::tile_hash;
use crate::surface::{Adjacency, Direction, Surface};

/// How many flood-fill waves extend mud outward from water before giving up.
const MUD_MAX_DISTANCE: u32 = 3;
const MUD_BASE_PROBABILITY: f32 = 0.95;
const MUD_PROBABILITY_FALLOFF: f32 = 0.15;

const CARDINAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

pub fn process_chunk(tiles: &mut [Tile], coord: ChunkCoordinate, world_seed: u64) {
    generate_mud(tiles, coord, world_seed);
    pack_adjacency(tiles);
}

fn generate_mud(tiles: &mut [Tile], coord: ChunkCoordinate, world_seed: u64) {
    let size = (tiles.len() as f64).sqrt() as usize;
    debug_assert_eq!(size * size, tiles.len(), "tile slice must be square");
    let mut is_mud = vec![false; size * size];

    // wave 1: every non-water tile with a cardinal water neighbour
    let mut frontier = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let idx = y * size + x;
            if !tiles[idx].surface.can_become_mud() {
                continue;
            }
            if has_cardinal_water(tiles, x, y, size) {
                is_mud[idx] = true;
                frontier.push((x, y));
            }
        }
    }

    // waves 2..=MUD_MAX_DISTANCE: extend only from existing mud
    for wave in 2..=MUD_MAX_DISTANCE {
        let probability =
        (MUD_BASE_PROBABILITY - MUD_PROBABILITY_FALLOFF * (wave - 1) as f32).max(0.0);
        let mut next_frontier = Vec::new();

        for &(x, y) in &frontier {
            for (dx, dy) in CARDINAL_OFFSETS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= size as i32 || ny >= size as i32 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let nidx = ny * size + nx;
                if is_mud[nidx] || !tiles[nidx].surface.can_become_mud() {
                    continue;
                }

                let roll = tile_hash(coord.0, coord.1, nx as u16, ny as u16, world_seed ^ (wave as u64))
                as f32
                / u32::MAX as f32;
                if roll < probability {
                    is_mud[nidx] = true;
                    next_frontier.push((nx, ny));
                }
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    for (idx, tile) in tiles.iter_mut().enumerate() {
        if is_mud[idx] {
            tile.surface = Surface::Mud;
        }
    }
}

fn has_cardinal_water(tiles: &[Tile], x: usize, y: usize, size: usize) -> bool {
    for (dx, dy) in CARDINAL_OFFSETS {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= size as i32 || ny >= size as i32 {
            continue;
        }
        let idx = ny as usize * size + nx as usize;
        if tiles[idx].surface == Surface::Water {
            return true;
        }
    }
    false
}

fn pack_adjacency(tiles: &mut [Tile]) {
    let size = (tiles.len() as f64).sqrt() as i32;
    debug_assert_eq!((size * size) as usize, tiles.len(), "tile slice must be square");
    let surfaces: Vec<Surface> = tiles.iter().map(|t| t.surface).collect();

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) as usize;
            let mut adjacency = Adjacency::default();
            for dir in Direction::ALL {
                let (dx, dy) = dir.offset();
                let nx = x + dx;
                let ny = y + dy;
                let surface_id = if nx < 0 || ny < 0 || nx >= size || ny >= size {
                    0
                } else {
                    surfaces[(ny * size + nx) as usize].id()
                };
                adjacency.set(dir, surface_id);
            }
            tiles[idx].adjacency = adjacency;
        }
    }
}
