//! ntuple-2048: an n-tuple network TD learner for a 2048-style game
//!
//! This crate provides:
//! - A compact `Board` type (`board` module) with slide/rotate/reflect primitives
//! - A four-pattern, eight-symmetry n-tuple value function (`pattern`, `value`, `weights`)
//! - A greedy afterstate `Player` that learns online with a backward TD(0) sweep
//! - A biased tile-generating `Environment` with a shuffled tile bag and capped bonus tiles
//! - An `Episode` driver and block `Statistics` for training runs
//!
//! Quick start:
//! ```
//! use ntuple_2048::config::{EnvironmentConfig, PlayerConfig};
//! use ntuple_2048::environment::Environment;
//! use ntuple_2048::episode::Episode;
//! use ntuple_2048::player::Player;
//!
//! let mut player = Player::new(PlayerConfig::default()).unwrap();
//! let mut env = Environment::new(EnvironmentConfig { seed: Some(42), ..Default::default() });
//!
//! // Play (and learn from) one full game.
//! let summary = Episode::new().play(&mut player, &mut env);
//! assert!(summary.moves > 0);
//! assert!(player.history().is_empty());
//! ```
//!
//! Turn by turn, the shared [`turn::TurnContext`] carries the player's last
//! slide over to the environment:
//! ```
//! use ntuple_2048::action::{Action, Direction};
//! use ntuple_2048::board::Board;
//! use ntuple_2048::config::{EnvironmentConfig, PlayerConfig};
//! use ntuple_2048::environment::Environment;
//! use ntuple_2048::player::Player;
//! use ntuple_2048::turn::TurnContext;
//!
//! let mut player = Player::new(PlayerConfig::default()).unwrap();
//! let mut env = Environment::new(EnvironmentConfig { seed: Some(1), ..Default::default() });
//! let mut ctx = TurnContext::new();
//!
//! let board = Board::from_cells([1, 2, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
//! let mut after = board;
//! assert_eq!(player.take_action(&mut ctx, &board), Action::Slide(Direction::Down));
//! after.slide(Direction::Down);
//!
//! // The new tile lands on the top edge, away from the slide.
//! match env.take_action(&ctx, &after) {
//!     Action::Place { cell, .. } => assert!(cell < 4),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
pub mod action;
pub mod board;
pub mod config;
pub mod environment;
pub mod episode;
pub mod pattern;
pub mod player;
pub mod stats;
pub mod turn;
pub mod value;
pub mod weights;
