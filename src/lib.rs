//! Single-elimination brackets: a pure engine (seeding, results, progression) and the
//! tournament service and record store that drive it.

pub mod api_error;
pub mod config;
pub mod identity;
pub mod import;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::{Config, ConfigError};
pub use identity::{admin_token_matches, Actor, Role};
pub use import::read_participant_names;
pub use logic::{
    check_round_integrity, group_rounds, is_seedable, record_result, round_name, seed,
    seed_with_rng, start_match, total_rounds, AdvanceResult, BracketRound, SeedResult,
};
pub use models::{
    BracketError, GameMatch, InvalidResultReason, MatchId, MatchStatus, MatchUpdate,
    Participant, ParticipantId, Tournament, TournamentError, TournamentId, TournamentStatus,
    TournamentUpdate,
};
pub use service::{BracketView, TournamentService};
pub use store::RecordStore;
