use log::info;

use super::PhaseContext;

/// Terminal phase. Only reports the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndPhase {
    winner: Option<usize>,
}

impl EndPhase {
    pub fn new(winner: Option<usize>, ctx: &mut PhaseContext<'_>) -> Self {
        let name = winner.map(|i| ctx.players[i].name());
        info!("game over, winner: {}", name.unwrap_or("none"));
        ctx.log.game_end(name);
        Self { winner }
    }

    /// Index of the winning player. `None` when the match was called off.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }
}
