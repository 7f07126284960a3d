//! Cosmetic catalog, inventory and active selections
//!
//! Cosmetics never affect scoring. Skins are the exception that touches the
//! simulation: they carry physics parameters, so equipping one goes through
//! [`crate::sim::set_active_skin`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, INVENTORY_KEY, KeyValueStore, PersistenceError};
use crate::sim::{GameState, PhysicsWorld, set_active_skin, skin};

/// Shop category; each has one active slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosmeticCategory {
    Skin,
    Theme,
    Border,
    Hitbox,
    Outline,
}

impl CosmeticCategory {
    pub const ALL: [CosmeticCategory; 5] = [
        CosmeticCategory::Skin,
        CosmeticCategory::Theme,
        CosmeticCategory::Border,
        CosmeticCategory::Hitbox,
        CosmeticCategory::Outline,
    ];

    /// Item equipped when nothing valid is stored
    pub fn default_id(&self) -> &'static str {
        match self {
            CosmeticCategory::Skin => skin::DEFAULT_SKIN_ID,
            CosmeticCategory::Theme => "th_obsidian",
            CosmeticCategory::Border => "bd_zinc",
            CosmeticCategory::Hitbox => "hb_tiered",
            CosmeticCategory::Outline => "ot_default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Color(&'static str),
    Rainbow,
}

/// Fill style of piece bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxStyle {
    Tiered,
    Transparent,
    White,
    Rainbow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineStyle {
    Default,
    Black,
    Rainbow,
    Gold,
}

/// What an item does once equipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosmeticValue {
    /// Skin profile id
    Skin(&'static str),
    /// Background as `#rrggbb`
    ThemeColor(&'static str),
    Border(BorderStyle),
    Hitbox(HitboxStyle),
    Outline(OutlineStyle),
}

impl CosmeticValue {
    pub fn category(&self) -> CosmeticCategory {
        match self {
            CosmeticValue::Skin(_) => CosmeticCategory::Skin,
            CosmeticValue::ThemeColor(_) => CosmeticCategory::Theme,
            CosmeticValue::Border(_) => CosmeticCategory::Border,
            CosmeticValue::Hitbox(_) => CosmeticCategory::Hitbox,
            CosmeticValue::Outline(_) => CosmeticCategory::Outline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosmeticItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    pub value: CosmeticValue,
}

impl CosmeticItem {
    pub fn category(&self) -> CosmeticCategory {
        self.value.category()
    }

    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

const fn item(id: &'static str, name: &'static str, price: u64, value: CosmeticValue) -> CosmeticItem {
    CosmeticItem {
        id,
        name,
        price,
        value,
    }
}

const fn skin_item(id: &'static str, name: &'static str, price: u64) -> CosmeticItem {
    item(id, name, price, CosmeticValue::Skin(id))
}

const fn theme(id: &'static str, name: &'static str, price: u64, hex: &'static str) -> CosmeticItem {
    item(id, name, price, CosmeticValue::ThemeColor(hex))
}

const fn border(id: &'static str, name: &'static str, price: u64, hex: &'static str) -> CosmeticItem {
    item(id, name, price, CosmeticValue::Border(BorderStyle::Color(hex)))
}

pub static CATALOG: &[CosmeticItem] = &[
    // Skins
    skin_item("sk_space", "Space Pack", 1200),
    skin_item("sk_weather", "Weather Pack", 1200),
    skin_item("sk_ocean", "Ocean Pack", 1200),
    skin_item("sk_nature", "Nature Pack", 1200),
    skin_item("sk_music", "Music Pack", 1200),
    skin_item("sk_animals", "Animal Pack", 1200),
    skin_item("sk_fruit", "Fruit Pack", 0),
    skin_item("sk_dessert", "Dessert Pack", 1200),
    // Hitboxes
    item("hb_tiered", "Tiered Glow", 0, CosmeticValue::Hitbox(HitboxStyle::Tiered)),
    item("hb_transparent", "Clear Glass", 400, CosmeticValue::Hitbox(HitboxStyle::Transparent)),
    item("hb_white", "Frosted", 400, CosmeticValue::Hitbox(HitboxStyle::White)),
    item("hb_rainbow", "Holographic", 2500, CosmeticValue::Hitbox(HitboxStyle::Rainbow)),
    // Outlines
    item("ot_default", "Standard", 0, CosmeticValue::Outline(OutlineStyle::Default)),
    item("ot_black", "Inky Bold", 500, CosmeticValue::Outline(OutlineStyle::Black)),
    item("ot_rainbow", "RGB Wave", 1500, CosmeticValue::Outline(OutlineStyle::Rainbow)),
    item("ot_gold", "Golden Aura", 3000, CosmeticValue::Outline(OutlineStyle::Gold)),
    // Dark themes
    theme("th_obsidian", "Deep Obsidian", 0, "#09090b"),
    theme("th_midnight", "Midnight Blue", 300, "#020617"),
    theme("th_void", "Infinite Void", 600, "#000000"),
    theme("th_charcoal", "Matte Charcoal", 900, "#171717"),
    theme("th_forest", "Dark Forest", 1200, "#064e3b"),
    theme("th_crimson", "Vampire Red", 1500, "#450a0a"),
    theme("th_cyber", "Cyber Matrix", 3000, "#001a00"),
    theme("th_nebula", "Stellar Nebula", 5000, "#1a1033"),
    // Pastel themes
    theme("th_vanilla", "Vanilla Cream", 500, "#fff7ed"),
    theme("th_lavender", "Lavender Mist", 800, "#f5f3ff"),
    theme("th_mint", "Mint Sorbet", 1100, "#ecfdf5"),
    theme("th_blue", "Baby Blue", 1400, "#eff6ff"),
    theme("th_rose", "Petal Pink", 1700, "#fff1f2"),
    theme("th_lemon", "Lemonade", 2000, "#fefce8"),
    theme("th_peach", "Peach Fizz", 4000, "#fff5f1"),
    theme("th_cotton", "Cotton Candy", 8000, "#ffffff"),
    // Dark borders
    border("bd_zinc", "Industrial Zinc", 0, "#3f3f46"),
    border("bd_graphite", "Sleek Graphite", 400, "#18181b"),
    border("bd_metal", "Gunmetal", 800, "#27272a"),
    border("bd_carbon", "Carbon Fiber", 1200, "#09090b"),
    border("bd_neon", "Electric Cyan", 2000, "#22d3ee"),
    border("bd_gold", "Luxe Gold", 3500, "#fbbf24"),
    border("bd_obsidian", "Volcanic Glass", 6000, "#0a0a0a"),
    border("bd_shadow", "Shadow Realm", 10000, "#000000"),
    // Pastel borders
    border("bd_pearl", "Polished Pearl", 600, "#f4f4f5"),
    border("bd_silver", "Soft Silver", 1000, "#e4e4e7"),
    border("bd_candy", "Pink Frost", 1400, "#fdf2f8"),
    border("bd_lilac", "Lilac Bloom", 1800, "#f5f3ff"),
    border("bd_sky", "Sky Glow", 2500, "#f0f9ff"),
    border("bd_sakura", "Sakura Petal", 4000, "#fef2f2"),
    item("bd_rainbow", "Chroma Dream", 7500, CosmeticValue::Border(BorderStyle::Rainbow)),
    border("bd_cloud", "Fluffy Cloud", 15000, "#fafaf9"),
];

pub fn find(id: &str) -> Option<&'static CosmeticItem> {
    CATALOG.iter().find(|i| i.id == id)
}

/// Items of one category, in shop order
pub fn items_in(category: CosmeticCategory) -> impl Iterator<Item = &'static CosmeticItem> {
    CATALOG.iter().filter(move |i| i.category() == category)
}

/// Find an item that belongs to `category`
fn find_in(category: CosmeticCategory, id: &str) -> Option<&'static CosmeticItem> {
    find(id).filter(|i| i.category() == category)
}

/// Equipped item id per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCosmetics {
    pub skin: String,
    pub theme: String,
    pub border: String,
    pub hitbox: String,
    pub outline: String,
}

impl Default for ActiveCosmetics {
    fn default() -> Self {
        Self {
            skin: CosmeticCategory::Skin.default_id().to_owned(),
            theme: CosmeticCategory::Theme.default_id().to_owned(),
            border: CosmeticCategory::Border.default_id().to_owned(),
            hitbox: CosmeticCategory::Hitbox.default_id().to_owned(),
            outline: CosmeticCategory::Outline.default_id().to_owned(),
        }
    }
}

impl ActiveCosmetics {
    pub fn get(&self, category: CosmeticCategory) -> &str {
        match category {
            CosmeticCategory::Skin => &self.skin,
            CosmeticCategory::Theme => &self.theme,
            CosmeticCategory::Border => &self.border,
            CosmeticCategory::Hitbox => &self.hitbox,
            CosmeticCategory::Outline => &self.outline,
        }
    }

    fn slot_mut(&mut self, category: CosmeticCategory) -> &mut String {
        match category {
            CosmeticCategory::Skin => &mut self.skin,
            CosmeticCategory::Theme => &mut self.theme,
            CosmeticCategory::Border => &mut self.border,
            CosmeticCategory::Hitbox => &mut self.hitbox,
            CosmeticCategory::Outline => &mut self.outline,
        }
    }

    /// Put `id` in its category's slot. Returns false for unknown ids.
    pub fn set(&mut self, id: &str) -> bool {
        match find(id) {
            Some(item) => {
                *self.slot_mut(item.category()) = item.id.to_owned();
                true
            }
            None => false,
        }
    }

    /// Replace ids that are unknown or filed under the wrong category
    pub fn sanitize(&mut self) {
        for category in CosmeticCategory::ALL {
            let slot = self.slot_mut(category);
            if find_in(category, slot.as_str()).is_none() {
                log::warn!(
                    "Unknown {:?} cosmetic '{}', using {}",
                    category,
                    slot,
                    category.default_id()
                );
                *slot = category.default_id().to_owned();
            }
        }
    }

    /// Resolved catalog entry for a slot, default when unknown
    pub fn item(&self, category: CosmeticCategory) -> &'static CosmeticItem {
        find_in(category, self.get(category))
            .or_else(|| find(category.default_id()))
            .unwrap_or(&CATALOG[0])
    }

    pub fn theme_color(&self) -> &'static str {
        match self.item(CosmeticCategory::Theme).value {
            CosmeticValue::ThemeColor(hex) => hex,
            _ => "#09090b",
        }
    }

    pub fn border_style(&self) -> BorderStyle {
        match self.item(CosmeticCategory::Border).value {
            CosmeticValue::Border(style) => style,
            _ => BorderStyle::Color("#3f3f46"),
        }
    }

    pub fn hitbox_style(&self) -> HitboxStyle {
        match self.item(CosmeticCategory::Hitbox).value {
            CosmeticValue::Hitbox(style) => style,
            _ => HitboxStyle::Tiered,
        }
    }

    pub fn outline_style(&self) -> OutlineStyle {
        match self.item(CosmeticCategory::Outline).value {
            CosmeticValue::Outline(style) => style,
            _ => OutlineStyle::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { price: u64 },
    AlreadyOwned,
    InsufficientCoins,
    UnknownItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipOutcome {
    Equipped,
    Locked,
    UnknownItem,
}

/// Unlocked item ids, persisted as a JSON array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    unlocked: BTreeSet<String>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            unlocked: CATALOG
                .iter()
                .filter(|i| i.is_free())
                .map(|i| i.id.to_owned())
                .collect(),
        }
    }
}

impl Inventory {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// Buy an item with session coins. Charges exactly once; never goes
    /// below zero.
    pub fn purchase(&mut self, state: &mut GameState, id: &str) -> PurchaseOutcome {
        let Some(item) = find(id) else {
            log::warn!("Purchase of unknown item '{}'", id);
            return PurchaseOutcome::UnknownItem;
        };
        if self.is_unlocked(item.id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        if !state.session.try_spend(item.price) {
            log::debug!(
                "Cannot buy {}: {} coins < {}",
                item.id,
                state.session.coins,
                item.price
            );
            return PurchaseOutcome::InsufficientCoins;
        }

        self.unlocked.insert(item.id.to_owned());
        state.touch();
        log::info!(
            "Purchased {} for {} ({} coins left)",
            item.name,
            item.price,
            state.session.coins
        );
        PurchaseOutcome::Purchased { price: item.price }
    }

    /// Make an unlocked item active in its category
    pub fn equip<W: PhysicsWorld + ?Sized>(
        &self,
        state: &mut GameState,
        world: &mut W,
        id: &str,
    ) -> EquipOutcome {
        let Some(item) = find(id) else {
            return EquipOutcome::UnknownItem;
        };
        if !self.is_unlocked(item.id) {
            return EquipOutcome::Locked;
        }

        match item.value {
            CosmeticValue::Skin(skin_id) => {
                set_active_skin(state, world, skin_id);
            }
            _ => {
                state.cosmetics.set(item.id);
                state.touch();
                log::info!("Equipped {}", item.name);
            }
        }
        EquipOutcome::Equipped
    }

    /// Load from the store; free items are always unlocked and unknown ids
    /// are dropped
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut inventory: Inventory = persistence::load_or_default(store, INVENTORY_KEY);
        inventory.unlocked.retain(|id| find(id).is_some());
        inventory.unlocked.extend(Inventory::default().unlocked);
        inventory
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), PersistenceError> {
        persistence::save_json(store, INVENTORY_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::sandbox::SandboxWorld;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATALOG.len(), 48);
        assert_eq!(items_in(CosmeticCategory::Skin).count(), 8);
        assert_eq!(items_in(CosmeticCategory::Hitbox).count(), 4);
        assert_eq!(items_in(CosmeticCategory::Outline).count(), 4);
        assert_eq!(items_in(CosmeticCategory::Theme).count(), 16);
        assert_eq!(items_in(CosmeticCategory::Border).count(), 16);

        let ids: BTreeSet<&str> = CATALOG.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn test_skin_items_match_profiles() {
        for item in items_in(CosmeticCategory::Skin) {
            assert!(skin::find(item.id).is_some(), "{}", item.id);
        }
        assert_eq!(skin::SKINS.len(), 8);
    }

    #[test]
    fn test_defaults_are_free_and_unlocked() {
        let inventory = Inventory::default();
        for category in CosmeticCategory::ALL {
            let item = find(category.default_id()).unwrap();
            assert!(item.is_free());
            assert_eq!(item.category(), category);
            assert!(inventory.is_unlocked(item.id));
        }
        assert!(!inventory.is_unlocked("sk_space"));
    }

    #[test]
    fn test_purchase_charges_once() {
        let mut state = GameState::new(1);
        let mut inventory = Inventory::default();
        state.session.coins = 1500;

        let outcome = inventory.purchase(&mut state, "sk_space");
        assert_eq!(outcome, PurchaseOutcome::Purchased { price: 1200 });
        assert_eq!(state.session.coins, 300);
        assert!(inventory.is_unlocked("sk_space"));

        assert_eq!(inventory.purchase(&mut state, "sk_space"), PurchaseOutcome::AlreadyOwned);
        assert_eq!(state.session.coins, 300);
    }

    #[test]
    fn test_purchase_without_funds() {
        let mut state = GameState::new(1);
        let mut inventory = Inventory::default();
        state.session.coins = 399;
        let outcome = inventory.purchase(&mut state, "hb_white");
        assert_eq!(outcome, PurchaseOutcome::InsufficientCoins);
        assert_eq!(state.session.coins, 399);
        assert!(!inventory.is_unlocked("hb_white"));

        state.session.coins = 400;
        inventory.purchase(&mut state, "hb_white");
        assert_eq!(state.session.coins, 0);
    }

    #[test]
    fn test_purchase_unknown() {
        let mut state = GameState::new(1);
        let mut inventory = Inventory::default();
        assert_eq!(inventory.purchase(&mut state, "zz_nothing"), PurchaseOutcome::UnknownItem);
        assert_eq!(state.session.coins, 1000);
    }

    #[test]
    fn test_equip_requires_unlock() {
        let mut state = GameState::new(1);
        let mut world = SandboxWorld::with_default_well();
        let mut inventory = Inventory::default();

        assert_eq!(inventory.equip(&mut state, &mut world, "th_void"), EquipOutcome::Locked);
        assert_eq!(state.cosmetics.theme, "th_obsidian");

        inventory.purchase(&mut state, "th_void");
        assert_eq!(inventory.equip(&mut state, &mut world, "th_void"), EquipOutcome::Equipped);
        assert_eq!(state.cosmetics.theme, "th_void");
        assert_eq!(state.cosmetics.theme_color(), "#000000");
    }

    #[test]
    fn test_equip_skin_goes_through_simulation() {
        let mut state = GameState::new(1);
        let mut world = SandboxWorld::with_default_well();
        let mut inventory = Inventory::default();
        state.session.coins = 5000;
        inventory.purchase(&mut state, "sk_ocean");
        inventory.equip(&mut state, &mut world, "sk_ocean");
        assert_eq!(state.cosmetics.skin, "sk_ocean");
        assert_eq!(state.skin().id, "sk_ocean");
        assert!(
            state
                .events()
                .iter()
                .any(|e| matches!(e, crate::sim::GameEvent::SkinChanged { skin: "sk_ocean" }))
        );
    }

    #[test]
    fn test_sanitize_repairs_slots() {
        let mut active = ActiveCosmetics {
            skin: "sk_gone".into(),
            theme: "bd_gold".into(),
            border: "bd_rainbow".into(),
            hitbox: "".into(),
            outline: "ot_gold".into(),
        };
        active.sanitize();
        assert_eq!(active.skin, "sk_fruit");
        // A border id in the theme slot is the wrong category
        assert_eq!(active.theme, "th_obsidian");
        assert_eq!(active.border, "bd_rainbow");
        assert_eq!(active.border_style(), BorderStyle::Rainbow);
        assert_eq!(active.hitbox, "hb_tiered");
        assert_eq!(active.outline_style(), OutlineStyle::Gold);
    }

    #[test]
    fn test_inventory_persistence() {
        let mut store = MemoryStore::new();
        let mut state = GameState::new(1);
        let mut inventory = Inventory::default();
        inventory.purchase(&mut state, "ot_black");
        inventory.save(&mut store).unwrap();

        let loaded = Inventory::load(&store);
        assert_eq!(loaded, inventory);

        store.set(INVENTORY_KEY, r#"["ot_gold", "bogus"]"#).unwrap();
        let loaded = Inventory::load(&store);
        assert!(loaded.is_unlocked("ot_gold"));
        assert!(!loaded.is_unlocked("bogus"));
        assert!(loaded.is_unlocked("sk_fruit"));
    }
}
