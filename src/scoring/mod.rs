//! Ranking, region scoring and terminal payoffs.
//!
//! ## Ranking
//!
//! Players are ranked per region by descending caballero count. A block of
//! tied players all take the *worst* position the block covers, so two
//! leaders tied at the top are both second and nobody is first.
//!
//! ## Payoffs
//!
//! `margins` measures each total against the midpoint of the two best;
//! `returns` turns totals into a zero-sum payoff in `[-1, 1]`.

mod rank;
mod returns;

pub use rank::{rank_players, score_counts, score_one_region, ScoreMode};
pub use returns::{margins, returns};
