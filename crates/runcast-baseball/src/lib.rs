// Projection engine: matchup calculator, arsenal blend, lineup and game
// projector, and the repository-driven service that feeds them.

pub mod arsenal;
pub mod league;
pub mod matchup;
pub mod projection;
pub mod service;

pub use matchup::{calculate_matchup, MatchupBreakdown, MatchupContext};
pub use projection::{project_game, GameContext, GameProjection};
pub use service::{matchup_from_repository, project_from_repository, GameRequest, MatchupRequest};
