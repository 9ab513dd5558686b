use std::time::{Duration, Instant};

use serde::Serialize;

use crate::action::Action;
use crate::board::{Board, Exponent};
use crate::environment::Environment;
use crate::player::Player;
use crate::turn::TurnContext;

/// Opening turns taken by the environment before the player moves.
pub const OPENING_TILES: usize = 2;

/// Outcome of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Sum of slide rewards.
    pub score: u64,
    pub max_exponent: Exponent,
    /// Slides made by the player.
    pub moves: u32,
    /// Tiles placed by the environment.
    pub placements: u32,
    #[serde(serialize_with = "as_secs")]
    pub elapsed: Duration,
}

impl EpisodeSummary {
    /// Largest tile value reached.
    pub fn max_tile(&self) -> u32 { if self.max_exponent == 0 { 0 } else { 1 << self.max_exponent } }
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Player,
    Environment,
}

/// One game from an empty board until a side passes or fails to act.
pub struct Episode {
    board: Board,
    ctx: TurnContext,
    score: u64,
    moves: u32,
    placements: u32,
    started: Instant,
}

impl Episode {
    pub fn new() -> Self {
        Episode {
            board: Board::EMPTY,
            ctx: TurnContext::new(),
            score: 0,
            moves: 0,
            placements: 0,
            started: Instant::now(),
        }
    }

    pub fn board(&self) -> &Board { &self.board }

    fn turn(&self) -> Side {
        let taken = (self.moves + self.placements) as usize;
        if taken < OPENING_TILES || taken % 2 == 1 {
            Side::Environment
        } else {
            Side::Player
        }
    }

    /// Apply `action` for `side`. Returns false once the episode is over.
    fn apply(&mut self, side: Side, action: Action) -> bool {
        let Some(reward) = action.apply(&mut self.board) else {
            if !action.is_none() {
                log::warn!("{:?} action {} could not be applied", side, action);
            }
            return false;
        };
        match side {
            Side::Player => {
                self.moves += 1;
                self.score += reward as u64;
            }
            Side::Environment => self.placements += 1,
        }
        true
    }

    /// Alternate the two sides until one of them ends the game.
    pub fn play(mut self, player: &mut Player, env: &mut Environment) -> EpisodeSummary {
        player.open_episode();
        env.open_episode();
        loop {
            let side = self.turn();
            let action = match side {
                Side::Player => player.take_action(&mut self.ctx, &self.board),
                Side::Environment => env.take_action(&self.ctx, &self.board),
            };
            if !self.apply(side, action) {
                break;
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            score: self.score,
            max_exponent: self.board.max_exponent(),
            moves: self.moves,
            placements: self.placements,
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for Episode {
    fn default() -> Self { Self::new() }
}
