//! Bracket engine: seeding, result recording and round progression. Pure, no I/O.

mod progression;
mod rounds;
mod seeding;

pub use progression::{record_result, start_match, AdvanceResult};
pub use rounds::{check_round_integrity, group_rounds, round_name, total_rounds, BracketRound};
pub use seeding::{is_seedable, seed, seed_with_rng, SeedResult};
