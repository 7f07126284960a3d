//! Tier catalog
//!
//! Twelve immutable tiers. The last one is terminal and never merges.

use serde::{Deserialize, Serialize};

/// Number of tiers in the catalog
pub const TIER_COUNT: usize = 12;

/// Size/power class of a piece, 0 (smallest) to 11 (terminal)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Tier::new(index).ok_or_else(|| format!("tier {} out of range 0..{}", index, TIER_COUNT))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.0
    }
}

impl Tier {
    pub const MIN: Tier = Tier(0);
    pub const TERMINAL: Tier = Tier(TIER_COUNT as u8 - 1);

    /// Build a tier, rejecting indices outside the catalog
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < TIER_COUNT).then_some(Tier(index))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    /// The tier a merge would produce, None at the terminal tier
    pub fn next(self) -> Option<Tier> {
        Tier::new(self.0 + 1)
    }

    /// Catalog entry for this tier
    pub fn info(self) -> &'static TierInfo {
        &TIERS[self.index()]
    }
}

/// Static attributes of one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierInfo {
    pub tier: Tier,
    pub radius: f32,
    /// Display color as `#RRGGBB`
    pub color: &'static str,
    /// Also the merge-equality label of pieces at this tier
    pub name: &'static str,
    pub base_score: u64,
}

impl TierInfo {
    /// Score awarded for producing a piece of this tier
    pub fn merge_score(&self) -> u64 {
        self.base_score * 2
    }

    /// Coins awarded for producing a piece of this tier
    pub fn merge_coins(&self) -> u64 {
        crate::ceil_div(self.base_score, 5)
    }
}

const fn entry(
    tier: u8,
    radius: f32,
    color: &'static str,
    name: &'static str,
    base_score: u64,
) -> TierInfo {
    TierInfo {
        tier: Tier(tier),
        radius,
        color,
        name,
        base_score,
    }
}

pub static TIERS: [TierInfo; TIER_COUNT] = [
    entry(0, 15.0, "#FF4D4D", "T1", 2),
    entry(1, 22.0, "#FFA500", "T2", 4),
    entry(2, 32.0, "#FFFF00", "T3", 8),
    entry(3, 42.0, "#32CD32", "T4", 16),
    entry(4, 55.0, "#00FA9A", "T5", 32),
    entry(5, 70.0, "#1E90FF", "T6", 64),
    entry(6, 85.0, "#4169E1", "T7", 128),
    entry(7, 105.0, "#9370DB", "T8", 256),
    entry(8, 125.0, "#BA55D3", "T9", 512),
    entry(9, 150.0, "#FF69B4", "T10", 1024),
    entry(10, 180.0, "#FF1493", "T11", 2048),
    entry(11, 210.0, "#FFD700", "T12", 4096),
];

/// Look up a tier by raw index
pub fn lookup(index: usize) -> Option<&'static TierInfo> {
    TIERS.get(index)
}
