//! Greedy afterstate player that learns from its own episodes.
//!
//! Move selection scores each legal slide as `reward + V(afterstate)` and keeps
//! the best one, later directions winning ties. Every accepted move is recorded;
//! when no slide is legal the episode is over and the recorded afterstates are
//! swept newest to oldest with TD(0), after which the history is cleared.

use crate::action::{Action, Direction};
use crate::board::Board;
use crate::config::{ConfigError, PlayerConfig};
use crate::pattern::FeatureIndices;
use crate::turn::TurnContext;
use crate::value::ValueFunction;
use crate::weights::{WeightError, Weights};

/// One accepted move: the afterstate it produced and its immediate reward
/// with the learned value taken back out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub afterstate: Board,
    pub reward: f32,
}

#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Weights(#[from] WeightError),
}

#[derive(Clone, Copy)]
struct Candidate {
    dir: Direction,
    score: f32,
    value: f32,
}

pub struct Player {
    cfg: PlayerConfig,
    value: ValueFunction,
    history: Vec<Step>,
}

impl Player {
    /// Build a player, loading weights from `cfg.load` when set.
    pub fn new(cfg: PlayerConfig) -> Result<Self, PlayerError> {
        cfg.validate()?;
        let value = match &cfg.load {
            Some(path) => {
                let value = ValueFunction::from_weights(Weights::load(path)?)?;
                log::info!("loaded weights from {}", path.display());
                value
            }
            None => ValueFunction::new(),
        };
        Ok(Self::with_value(cfg, value))
    }

    /// Build a player around an existing value function.
    pub fn with_value(cfg: PlayerConfig, value: ValueFunction) -> Self {
        Player { cfg, value, history: Vec::with_capacity(1024) }
    }

    pub fn value(&self) -> &ValueFunction { &self.value }

    pub fn learning_rate(&self) -> f32 { self.cfg.learning_rate }

    /// Moves recorded so far in the current episode, oldest first.
    pub fn history(&self) -> &[Step] { &self.history }

    /// Forget whatever an interrupted episode left behind.
    pub fn open_episode(&mut self) {
        if !self.history.is_empty() {
            log::debug!("discarding {} steps from an unfinished episode", self.history.len());
            self.history.clear();
        }
    }

    /// Write the weights to the configured save path, if any.
    pub fn save_weights(&self) -> Result<(), WeightError> {
        if let Some(path) = &self.cfg.save {
            self.value.weights().save(path)?;
            log::info!("saved weights to {}", path.display());
        }
        Ok(())
    }

    /// Pick a slide for `before`, or learn from the finished episode and pass.
    pub fn take_action(&mut self, ctx: &mut TurnContext, before: &Board) -> Action {
        let Some(best) = self.select(before) else {
            self.learn_from_episode();
            return Action::None;
        };

        let mut dir = best.dir;
        let mut after = *before;
        if after.slide(dir).is_none() {
            // Re-check against the board we were handed; take the last legal direction.
            match self.last_legal(before) {
                Some((fallback, board)) => {
                    log::warn!("chosen slide {} no longer applies, using {}", dir, fallback);
                    dir = fallback;
                    after = board;
                }
                None => {
                    self.learn_from_episode();
                    return Action::None;
                }
            }
        }

        self.history.push(Step { afterstate: after, reward: best.score - best.value });
        ctx.last_move = Some(dir);
        Action::Slide(dir)
    }

    fn select(&self, before: &Board) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for dir in Direction::ALL {
            let mut after = *before;
            let Some(reward) = after.slide(dir) else { continue };
            let value = self.value.evaluate(&after);
            let score = reward as f32 + value;
            if best.map_or(true, |b| score >= b.score) {
                best = Some(Candidate { dir, score, value });
            }
        }
        best
    }

    fn last_legal(&self, before: &Board) -> Option<(Direction, Board)> {
        Direction::ALL.iter().rev().find_map(|&dir| {
            let mut after = *before;
            after.slide(dir).map(|_| (dir, after))
        })
    }

    /// Backward TD(0) over the recorded afterstates.
    ///
    /// The newest afterstate led to a dead end, so its entries are zeroed first;
    /// each older state then moves toward the (already updated) value of its
    /// successor plus the reward earned getting there.
    fn learn_from_episode(&mut self) {
        let n = self.history.len();
        if n == 0 {
            return;
        }
        let alpha = self.cfg.learning_rate;

        let terminal = self.value.feature_indices(&self.history[n - 1].afterstate);
        for_each_entry(&terminal, |pattern, index| self.value.reset(pattern, index));

        for j in 1..n {
            let prev = &self.history[n - j];
            let cur = &self.history[n - 1 - j];
            let prev_indices = self.value.feature_indices(&prev.afterstate);
            let cur_indices = self.value.feature_indices(&cur.afterstate);
            let error = self.value.estimate(&prev_indices) - self.value.estimate(&cur_indices) + prev.reward;
            let delta = alpha * error;
            for_each_entry(&cur_indices, |pattern, index| self.value.accumulate(pattern, index, delta));
        }

        log::debug!("td sweep over {} afterstates", n);
        self.history.clear();
    }
}

fn for_each_entry(indices: &FeatureIndices, mut f: impl FnMut(usize, usize)) {
    for row in indices {
        for (pattern, &index) in row.iter().enumerate() {
            f(pattern, index);
        }
    }
}
