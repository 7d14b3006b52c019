//! Common identifier types shared across the engine.

/// Stable identifier for a player within one game instance.
///
/// The transport layer maps connection handles to `PlayerId`s when a player
/// joins; the engine never sees raw connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Target of a submitted action.
///
/// The monster is a single shared entity, so it gets its own variant rather
/// than a reserved player id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetId {
    Player(PlayerId),
    Monster,
}

impl core::fmt::Display for TargetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Monster => write!(f, "monster"),
        }
    }
}

/// One discrete resolution cycle. Rounds are numbered from 1.
pub type Round = u32;

/// Liveness view of one player, as supplied by the session for validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerVitals {
    pub id: PlayerId,
    pub is_alive: bool,
}

/// Liveness view of the shared monster entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterVitals {
    pub hp: i32,
}

impl MonsterVitals {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Logical timestamp for a submission: the round it was made in plus a
/// per-round sequence number assigned by the session. Keeps the engine
/// deterministic without wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmissionStamp {
    pub round: Round,
    pub seq: u32,
}

impl SubmissionStamp {
    pub const fn new(round: Round, seq: u32) -> Self {
        Self { round, seq }
    }
}
