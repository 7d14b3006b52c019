/// Game configuration constants and tunable balance parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Floor below which stone armor never degrades.
    pub stone_armor_minimum: i32,
    /// Flat amount stone armor loses per nonzero hit taken while intact.
    pub stone_armor_degradation: i32,
    /// Upper bound accepted for any configured percentage magnitude
    /// (vulnerability, resistance, damage modifiers). Content exceeding this
    /// is rejected at load as a content bug.
    pub max_effect_percent: u32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum simultaneous status effects on one player.
    pub const MAX_STATUS_EFFECTS: usize = 12;
    /// Maximum effect tags a temporary immunity can block.
    pub const MAX_IMMUNITY_TAGS: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STONE_ARMOR_MINIMUM: i32 = 0;
    pub const DEFAULT_STONE_ARMOR_DEGRADATION: i32 = 1;
    pub const DEFAULT_MAX_EFFECT_PERCENT: u32 = 300;

    pub fn new() -> Self {
        Self {
            stone_armor_minimum: Self::DEFAULT_STONE_ARMOR_MINIMUM,
            stone_armor_degradation: Self::DEFAULT_STONE_ARMOR_DEGRADATION,
            max_effect_percent: Self::DEFAULT_MAX_EFFECT_PERCENT,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
