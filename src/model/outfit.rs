use serde::{Deserialize, Serialize};

/// One clothing item currently placed on a bunny.
///
/// Items are supplied by the caller on every request. `slot` is kept as a free-form string so an
/// item naming a slot outside [`Slot`] still deserializes; the compositor skips it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedItem {
    /// Database identifier of the item; the only field that participates in fingerprints.
    #[serde(alias = "item_id")]
    pub item_id: String,
    /// Body region the item occupies.
    pub slot: String,
    /// Public URL (or path relative to the public root) of the item's image.
    #[serde(alias = "image_url", default)]
    pub image_url: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl EquippedItem {
    /// Build an item from its parts.
    pub fn new(
        item_id: impl Into<String>,
        slot: impl Into<String>,
        image_url: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            slot: slot.into(),
            image_url: image_url.into(),
            name: name.into(),
        }
    }
}

/// Known body regions an item can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Hats, ears accessories.
    Head,
    /// Glasses, masks.
    Face,
    /// Shirts, jackets.
    UpperBody,
    /// Trousers, skirts.
    LowerBody,
    /// Shoes.
    Feet,
    /// Held or floating extras.
    Accessory,
}

impl Slot {
    /// Every slot, in bottom-to-top body order.
    pub const ALL: [Slot; 6] = [
        Slot::Head,
        Slot::Face,
        Slot::UpperBody,
        Slot::LowerBody,
        Slot::Feet,
        Slot::Accessory,
    ];

    /// Wire name of the slot.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Head => "head",
            Slot::Face => "face",
            Slot::UpperBody => "upper_body",
            Slot::LowerBody => "lower_body",
            Slot::Feet => "feet",
            Slot::Accessory => "accessory",
        }
    }

    /// Parse a wire name; `None` for anything outside the enumerated set.
    pub fn parse(name: &str) -> Option<Slot> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel rectangle a slot's item is drawn into, in base-image coordinates.
///
/// `(x, y)` is the top-left anchor. When both `width` and `height` are set the item image is
/// contain-fitted to exactly that size; otherwise it is drawn at its native size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Target width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Target height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl SlotRect {
    /// Rectangle with a fixed target size.
    pub fn sized(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Anchor-only rectangle; items are drawn at native size.
    pub fn anchor(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            width: None,
            height: None,
        }
    }

    /// Target size when both dimensions are present.
    pub fn fit_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/outfit.rs"]
mod tests;
