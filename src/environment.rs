//! Tile generator playing against the player.
//!
//! New tiles appear on the edge opposite the player's last slide (anywhere
//! before the first slide). Regular tiles come from a shuffled bag of twelve
//! (four each of 2, 4 and 8). Once the board holds a 128 or larger, a bonus tile
//! of an eighth of the largest tile may replace a regular one, as long as bonus
//! tiles stay within 1/21 of the regular tiles placed so far.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::action::Action;
use crate::board::{Board, Exponent, CELLS};
use crate::config::{BonusScope, EnvironmentConfig};
use crate::turn::TurnContext;

/// Exponents refilled into the bag each time it runs dry.
pub const TILE_BAG: [Exponent; 12] = [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];
/// Smallest max exponent (a 128 tile) at which bonus tiles become possible.
pub const BONUS_MIN_EXPONENT: Exponent = 7;
/// A bonus tile is `max_exponent - BONUS_OFFSET`, i.e. an eighth of the largest tile.
pub const BONUS_OFFSET: Exponent = 3;
/// At most one bonus tile per this many regular tiles.
pub const BONUS_RATIO: u64 = 21;

const ALL_CELLS: [usize; CELLS] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Bag and counters behind tile selection.
#[derive(Debug, Clone)]
struct TileSupply {
    bag: [Exponent; TILE_BAG.len()],
    /// Tiles already drawn from the current shuffle of `bag`.
    drawn: usize,
    regular: u64,
    bonus: u64,
}

impl Default for TileSupply {
    fn default() -> Self {
        // starts exhausted so the first draw shuffles
        TileSupply { bag: TILE_BAG, drawn: TILE_BAG.len(), regular: 0, bonus: 0 }
    }
}

impl TileSupply {
    /// Reserve a bonus tile if the budget allows it.
    fn try_bonus(&mut self) -> bool {
        self.bonus += 1;
        if self.bonus * BONUS_RATIO <= self.regular {
            return true;
        }
        self.bonus -= 1;
        false
    }

    fn draw_regular(&mut self, rng: &mut StdRng) -> Exponent {
        self.regular += 1;
        if self.drawn == self.bag.len() {
            self.bag = TILE_BAG;
            self.bag.shuffle(rng);
            self.drawn = 0;
        }
        let exponent = self.bag[self.drawn];
        self.drawn += 1;
        exponent
    }
}

pub struct Environment {
    cfg: EnvironmentConfig,
    rng: StdRng,
    supply: TileSupply,
}

impl Environment {
    pub fn new(cfg: EnvironmentConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Environment { cfg, rng, supply: TileSupply::default() }
    }

    /// Regular tiles placed while the current counters have been live.
    pub fn regular_placed(&self) -> u64 { self.supply.regular }

    /// Bonus tiles placed while the current counters have been live.
    pub fn bonus_placed(&self) -> u64 { self.supply.bonus }

    /// Start of an episode: restart the tile supply only under [`BonusScope::Episode`].
    pub fn open_episode(&mut self) {
        if self.cfg.bonus_scope == BonusScope::Episode {
            self.supply = TileSupply::default();
        }
    }

    /// Place one tile on `after`, or pass if no candidate cell is empty.
    pub fn take_action(&mut self, ctx: &TurnContext, after: &Board) -> Action {
        let mut space = match ctx.last_move {
            None => ALL_CELLS.to_vec(),
            Some(dir) => dir.opposite_edge().to_vec(),
        };
        space.shuffle(&mut self.rng);

        let max_exponent = after.max_exponent();
        let Some(cell) = space.into_iter().find(|&pos| after.cell(pos) == 0) else {
            return Action::None;
        };

        if max_exponent >= BONUS_MIN_EXPONENT && self.supply.try_bonus() {
            let exponent = max_exponent - BONUS_OFFSET;
            log::trace!(
                "bonus tile {} at {} ({} bonus / {} regular)",
                1u32 << exponent,
                cell,
                self.supply.bonus,
                self.supply.regular
            );
            return Action::Place { cell, exponent };
        }

        let exponent = self.supply.draw_regular(&mut self.rng);
        Action::Place { cell, exponent }
    }
}
