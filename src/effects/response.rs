//! Opponent sub-choices that interrupt a card.
//!
//! When a card makes other players decide (secret-disc region picks, or
//! returning caballeros one at a time) the engine parks the card phase,
//! walks a queue of per-player steps, then runs one finalize routine and
//! resumes the parked phase.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{AreaId, Phase, PlayerId, MAX_PLAYERS};

/// Which regions a secret choice may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionRule {
    /// Any region or the Castillo.
    Any,
    /// A region (not the king's) holding at least this many of the chooser's caballeros.
    Holding(u8),
    /// Any region other than the king's and the given one.
    Except(AreaId),
}

/// One pending decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStep {
    /// Secretly name a region.
    ChooseRegion { player: PlayerId, rule: RegionRule },
    /// Return caballeros one at a time from court or regions.
    Return { player: PlayerId, remaining: u8, to: AreaId },
}

impl ResponseStep {
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match *self {
            Self::ChooseRegion { player, .. } | Self::Return { player, .. } => player,
        }
    }
}

/// What happens once every step is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finalize {
    Nothing,
    /// Every chooser moves all their caballeros from `from` to their chosen region.
    Evict { from: AreaId },
    /// Every chooser returns `count` (or all, if `None`) from their chosen region to `to`.
    ReturnFromChosen { count: Option<u8>, to: AreaId },
    /// Regions named by exactly one player score for that player.
    UniqueScore,
}

/// Queue of pending steps plus what to resume afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseQueue {
    pub steps: SmallVec<[ResponseStep; MAX_PLAYERS]>,
    pub finalize: Finalize,
    /// Card phase interrupted by this queue.
    pub resume_phase: Phase,
    /// Player whose card started it.
    pub active: PlayerId,
}

impl ResponseQueue {
    #[must_use]
    pub fn new(active: PlayerId, resume_phase: Phase, finalize: Finalize) -> Self {
        Self {
            steps: SmallVec::new(),
            finalize,
            resume_phase,
            active,
        }
    }

    pub fn push(&mut self, step: ResponseStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn current(&self) -> Option<&ResponseStep> {
        self.steps.first()
    }

    pub fn current_mut(&mut self) -> Option<&mut ResponseStep> {
        self.steps.first_mut()
    }

    /// Drop the front step.
    pub fn advance(&mut self) {
        if !self.steps.is_empty() {
            self.steps.remove(0);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_walks_in_order() {
        let mut queue = ResponseQueue::new(PlayerId(0), Phase::ActionCard1, Finalize::UniqueScore);
        queue.push(ResponseStep::ChooseRegion { player: PlayerId(1), rule: RegionRule::Any });
        queue.push(ResponseStep::ChooseRegion { player: PlayerId(0), rule: RegionRule::Any });

        assert_eq!(queue.current().map(ResponseStep::player), Some(PlayerId(1)));
        queue.advance();
        assert_eq!(queue.current().map(ResponseStep::player), Some(PlayerId(0)));
        queue.advance();
        assert!(queue.is_empty());
        queue.advance();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_return_step_counts_down() {
        let mut queue = ResponseQueue::new(PlayerId(2), Phase::ActionCard2, Finalize::Nothing);
        queue.push(ResponseStep::Return { player: PlayerId(0), remaining: 3, to: AreaId(11) });

        if let Some(ResponseStep::Return { remaining, .. }) = queue.current_mut() {
            *remaining -= 1;
        }
        assert_eq!(
            queue.current(),
            Some(&ResponseStep::Return { player: PlayerId(0), remaining: 2, to: AreaId(11) })
        );
    }
}
