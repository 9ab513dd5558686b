use crate::action::Direction;

/// State shared between the two sides of a turn.
///
/// The player writes the direction it slid; the environment reads it to
/// decide where the next tile may appear. The driver owns one context per
/// episode and hands it to whichever side is acting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnContext {
    /// Last slide executed by the player, `None` before the first move.
    pub last_move: Option<Direction>,
}

impl TurnContext {
    pub fn new() -> Self { Self::default() }
}
