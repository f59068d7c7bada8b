//! Chunk registry and streaming
//!
//! `World` owns every materialized chunk and is the only thing that adds or
//! removes them. Each tick `reconcile` materializes the square of chunks
//! within the render radius around the player and evicts anything beyond
//! radius + 1. The one-chunk hysteresis band keeps chunks from thrashing
//! when the player runs along a chunk border.

use glam::Vec3;
use std::collections::HashMap;

use super::chunk::{Chunk, ChunkCoord};
use super::generate::{ChunkGenerator, GenerationParams};
use super::random::RandomSource;
use super::scene::{PropFactory, RenderSurface};
use crate::error::Result;

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub center: ChunkCoord,
    pub materialized: Vec<ChunkCoord>,
    pub evicted: Vec<ChunkCoord>,
}

/// Collaborators a reconcile pass needs to build new chunks
pub struct Streaming<'a> {
    pub generator: &'a mut ChunkGenerator,
    pub params: GenerationParams,
    pub props: &'a mut dyn PropFactory,
    pub rng: &'a mut dyn RandomSource,
    pub surface: &'a mut dyn RenderSurface,
}

/// Materialized chunks keyed by coordinate
#[derive(Debug)]
pub struct World {
    chunks: HashMap<ChunkCoord, Chunk>,
    chunk_size: f32,
    render_radius: u32,
}

impl World {
    pub fn new(chunk_size: f32, render_radius: u32) -> Self {
        Self {
            chunks: HashMap::new(),
            chunk_size,
            render_radius,
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn render_radius(&self) -> u32 {
        self.render_radius
    }

    /// Chunks beyond this axis distance are torn down
    #[inline]
    pub fn eviction_radius(&self) -> u32 {
        self.render_radius + 1
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Lookups against an evicted coordinate simply miss
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Materialized coordinates in sorted order
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// The 3x3 block around `center` in scan order (z outer, x inner);
    /// absent chunks are skipped
    pub fn neighborhood(&self, center: ChunkCoord) -> impl Iterator<Item = &Chunk> {
        (-1..=1)
            .flat_map(move |dz| (-1..=1).map(move |dx| center.offset(dx, dz)))
            .filter_map(|coord| self.chunks.get(&coord))
    }

    /// Bring the registry in line with the player's position
    pub fn reconcile(&mut self, player: Vec3, streaming: Streaming<'_>) -> Result<ReconcileReport> {
        let Streaming {
            generator,
            params,
            props,
            rng,
            surface,
        } = streaming;

        let center = ChunkCoord::containing(player, self.chunk_size);
        let mut report = ReconcileReport {
            center,
            ..Default::default()
        };

        let r = self.render_radius as i32;
        for dz in -r..=r {
            for dx in -r..=r {
                let coord = center.offset(dx, dz);
                if self.chunks.contains_key(&coord) {
                    continue;
                }
                let chunk = generator.generate(coord, params, props, rng)?;
                chunk.show(surface);
                self.chunks.insert(coord, chunk);
                report.materialized.push(coord);
            }
        }

        let limit = self.eviction_radius();
        let mut stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coord| {
                let (dx, dz) = coord.axis_distance(center);
                dx > limit || dz > limit
            })
            .copied()
            .collect();
        stale.sort_unstable();
        for coord in stale {
            if let Some(chunk) = self.chunks.remove(&coord) {
                chunk.teardown(surface);
                report.evicted.push(coord);
            }
        }

        if !report.materialized.is_empty() || !report.evicted.is_empty() {
            log::debug!(
                "Chunks around {:?}: +{} -{} ({} live)",
                center,
                report.materialized.len(),
                report.evicted.len(),
                self.chunks.len()
            );
        }
        Ok(report)
    }

    /// Run every live chunk's per-frame hooks
    pub fn animate(&mut self, delta: f32, time: f32, surface: &mut dyn RenderSurface) {
        for chunk in self.chunks.values_mut() {
            chunk.animate(delta, time, surface);
        }
    }

    /// Register a hand-built chunk, bypassing generation
    #[cfg(test)]
    pub(crate) fn adopt(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.coord, chunk);
    }

    /// Tear down every chunk (new run)
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) {
        for (_, chunk) in self.chunks.drain() {
            chunk.teardown(surface);
        }
    }
}
