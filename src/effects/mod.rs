//! Card effects and how they resolve.
//!
//! - `CardEffect`: typed effect of an action card
//! - `classify`: how many decisions an effect needs
//! - `MovementTracking`: in-progress caballero-by-caballero moves
//! - `ResponseQueue`: opponent sub-choices that interrupt a card
//! - `EffectResolver`: applies effects to a board
//!
//! Effects are resolved once from typed data at config load; nothing is
//! re-interpreted from strings during play.

mod classify;
mod effect;
mod movement;
mod resolver;
mod response;

pub use classify::{classify, Resolution};
pub use effect::{
    Branch, CardEffect, Count, Destination, KingReach, MoveEffect, PlayerFilter, Quota, ScoreSelection, Source,
};
pub use movement::{AreaSet, MovementTracking, QuotaPattern};
pub use resolver::EffectResolver;
pub use response::{Finalize, RegionRule, ResponseQueue, ResponseStep};
