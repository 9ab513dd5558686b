//! Per-block training statistics.
//!
//! Episodes are grouped into fixed-size blocks; each full block yields a
//! [`BlockSummary`] with the mean/max score, throughput and how often each
//! tile was reached.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::episode::EpisodeSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileReach {
    pub tile: u32,
    /// Fraction of the block's episodes whose largest tile was at least `tile`.
    pub reached: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    /// Episodes completed so far, including this block.
    pub episodes: u64,
    pub mean_score: f64,
    pub max_score: u64,
    pub moves_per_sec: f64,
    /// From the block's smallest max tile upward.
    pub tile_reach: Vec<TileReach>,
}

impl fmt::Display for BlockSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}\tavg = {:.0}\tmax = {}\tops = {:.0}",
            self.episodes, self.mean_score, self.max_score, self.moves_per_sec
        )?;
        for reach in &self.tile_reach {
            writeln!(f, "\t{}\t{:.1}%", reach.tile, reach.reached * 100.0)?;
        }
        Ok(())
    }
}

pub struct Statistics {
    block: usize,
    total: u64,
    pending: Vec<EpisodeSummary>,
}

impl Statistics {
    pub fn new(block: usize) -> Self {
        let block = block.max(1);
        Statistics { block, total: 0, pending: Vec::with_capacity(block) }
    }

    pub fn episodes(&self) -> u64 { self.total }

    /// Record one episode; returns the block summary when a block fills up.
    pub fn record(&mut self, episode: EpisodeSummary) -> Option<BlockSummary> {
        self.total += 1;
        self.pending.push(episode);
        if self.pending.len() < self.block {
            return None;
        }
        let summary = summarize(self.total, &self.pending);
        self.pending.clear();
        Some(summary)
    }
}

fn summarize(total: u64, episodes: &[EpisodeSummary]) -> BlockSummary {
    let n = episodes.len() as f64;
    let score_sum: u64 = episodes.iter().map(|e| e.score).sum();
    let max_score = episodes.iter().map(|e| e.score).max().unwrap_or(0);
    let moves: u64 = episodes.iter().map(|e| e.moves as u64).sum();
    let elapsed: Duration = episodes.iter().map(|e| e.elapsed).sum();
    let moves_per_sec = moves as f64 / elapsed.as_secs_f64().max(1e-6);

    // counts[e] = episodes whose max exponent is exactly e
    let mut counts = [0u64; 16];
    for e in episodes {
        counts[e.max_exponent as usize & 0xf] += 1;
    }
    let lowest = counts.iter().position(|&c| c > 0).unwrap_or(0);
    let highest = counts.iter().rposition(|&c| c > 0).unwrap_or(0);
    let mut tile_reach = Vec::new();
    let mut at_least: u64 = counts[lowest..].iter().sum();
    for exponent in lowest..=highest {
        if exponent > 0 {
            tile_reach.push(TileReach { tile: 1u32 << exponent, reached: at_least as f64 / n });
        }
        at_least -= counts[exponent];
    }

    BlockSummary {
        episodes: total,
        mean_score: score_sum as f64 / n,
        max_score,
        moves_per_sec,
        tile_reach,
    }
}
