//! Turn phases.
//!
//! A round runs `power → action → actionchoose → actioncard1 → actioncab2`
//! (or `actioncab1 → actioncard2`) once per player, then `scoring` on
//! scoring rounds. `response` interrupts a card phase while opponents make
//! their choices. `start` only exists when players place their own grandes.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Power,
    Action,
    ActionChoose,
    ActionCard1,
    ActionCab1,
    ActionCard2,
    ActionCab2,
    Response,
    Scoring,
    End,
}

impl Phase {
    /// Lowercase name as used in snapshots.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Power => "power",
            Self::Action => "action",
            Self::ActionChoose => "actionchoose",
            Self::ActionCard1 => "actioncard1",
            Self::ActionCab1 => "actioncab1",
            Self::ActionCard2 => "actioncard2",
            Self::ActionCab2 => "actioncab2",
            Self::Response => "response",
            Self::Scoring => "scoring",
            Self::End => "end",
        }
    }

    /// Card effect is being resolved.
    #[must_use]
    pub fn is_card(self) -> bool {
        matches!(self, Self::ActionCard1 | Self::ActionCard2)
    }

    /// Caballeros are being placed from court.
    #[must_use]
    pub fn is_placement(self) -> bool {
        matches!(self, Self::ActionCab1 | Self::ActionCab2)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
