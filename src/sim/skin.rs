//! Skin profiles
//!
//! A skin bundles the physics parameters every live piece uses, the combo
//! phrases and one icon per tier.

use serde::{Deserialize, Serialize};

use super::tier::{TIER_COUNT, Tier};

/// Id of the skin used when a requested one does not exist
pub const DEFAULT_SKIN_ID: &str = "sk_fruit";

/// Surface response of a piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    pub restitution: f32,
    pub friction: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub physics: PhysicsParams,
    pub phrases: &'static [&'static str],
    pub icons: [&'static str; TIER_COUNT],
}

impl SkinProfile {
    /// Icon shown for a piece of the given tier
    pub fn icon(&self, tier: Tier) -> &'static str {
        self.icons[tier.index()]
    }
}

pub static SKINS: &[SkinProfile] = &[
    SkinProfile {
        id: "sk_space",
        name: "Space Pack",
        physics: PhysicsParams { restitution: 0.2, friction: 0.1 },
        phrases: &["ASTEROID HIT!", "SUPERNOVA!", "ORBIT STABLE!", "VOID MERGE!", "STARDUST!"],
        icons: ["🚀", "🪐", "🛰️", "☄️", "🔭", "👨‍🚀", "🛸", "🌌", "☀️", "🌕", "👽", "🌠"],
    },
    SkinProfile {
        id: "sk_weather",
        name: "Weather Pack",
        physics: PhysicsParams { restitution: 0.3, friction: 0.08 },
        phrases: &["STORM BREWING!", "LIGHTNING!", "SUNNY DAYS!", "THUNDER CLAP!", "RAINBOW!"],
        icons: ["☁️", "🌦️", "⛈️", "🌩️", "🌪️", "🌬️", "❄️", "☔", "☀️", "🌈", "🌊", "⚡"],
    },
    SkinProfile {
        id: "sk_ocean",
        name: "Ocean Pack",
        physics: PhysicsParams { restitution: 0.4, friction: 0.06 },
        phrases: &["TIDAL WAVE!", "DEEP DIVE!", "SPLASH!", "CORAL REEF!", "OCEAN BREEZE!"],
        icons: ["🐚", "🦀", "🐟", "🐡", "🐙", "🐢", "🐬", "🦈", "🐳", "🐋", "⚓", "🏝️"],
    },
    SkinProfile {
        id: "sk_nature",
        name: "Nature Pack",
        physics: PhysicsParams { restitution: 0.5, friction: 0.05 },
        phrases: &["LEAF FALL!", "BLOOM!", "FOREST GROW!", "ROOTED!", "NATURE CALM!"],
        icons: ["🌿", "🍄", "🌲", "🪵", "🍁", "🌻", "🌵", "🌴", "🎋", "🌾", "🌹", "🌋"],
    },
    SkinProfile {
        id: "sk_music",
        name: "Music Pack",
        physics: PhysicsParams { restitution: 0.6, friction: 0.04 },
        phrases: &["BASS DROP!", "HARMONY!", "RHYTHM!", "MELODY!", "FORTE!"],
        icons: ["🎵", "🎶", "🎸", "🎹", "🥁", "🎷", "🎻", "🎤", "🎧", "📻", "🎼", "🕺"],
    },
    SkinProfile {
        id: "sk_animals",
        name: "Animal Pack",
        physics: PhysicsParams { restitution: 0.7, friction: 0.03 },
        phrases: &["WILD ROAR!", "PAW POWER!", "PACK LEADER!", "SAVAGE!", "FEATHERY!"],
        icons: ["🐭", "🐰", "🦊", "🐻", "🐼", "🦁", "🐯", "🐘", "🦒", "🐒", "🦍", "🐉"],
    },
    SkinProfile {
        id: "sk_fruit",
        name: "Fruit Pack",
        physics: PhysicsParams { restitution: 0.75, friction: 0.02 },
        phrases: &["FRUIT PUNCH!", "JUICY!", "ZESTY!", "SWEET MERGE!", "PEEL IT!"],
        icons: ["🍒", "🍓", "🍇", "🍊", "🍅", "🍎", "🍐", "🍑", "🍍", "🍈", "🍉", "🍌"],
    },
    SkinProfile {
        id: "sk_dessert",
        name: "Dessert Pack",
        physics: PhysicsParams { restitution: 0.8, friction: 0.01 },
        phrases: &["SUGAR RUSH!", "CREAMY!", "SWEET SPOT!", "GLAZED!", "CHOCO BLAST!"],
        icons: ["🍪", "🧁", "🍩", "🍦", "🍧", "🍰", "🥧", "🍮", "🍯", "🍬", "🍭", "🎂"],
    },
];

/// Find a skin by id
pub fn find(id: &str) -> Option<&'static SkinProfile> {
    SKINS.iter().find(|s| s.id == id)
}

/// The fallback skin
pub fn default_skin() -> &'static SkinProfile {
    // SKINS is a non-empty static that contains DEFAULT_SKIN_ID
    find(DEFAULT_SKIN_ID).unwrap_or(&SKINS[0])
}

/// Find a skin by id, falling back to the default skin
pub fn resolve(id: &str) -> &'static SkinProfile {
    find(id).unwrap_or_else(|| {
        log::warn!("Unknown skin '{}', using {}", id, DEFAULT_SKIN_ID);
        default_skin()
    })
}
