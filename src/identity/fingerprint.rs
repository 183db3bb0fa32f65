use crate::model::outfit::EquippedItem;

/// Namespace prefix of scene-qualified keys.
pub const SCENE_KEY_PREFIX: &str = "bunny_gemini";

/// Order-independent summary of an item set: item ids sorted ascending and comma-joined.
///
/// Only `item_id` participates; `slot`, `name` and `image_url` never change the result.
/// Duplicate ids are kept.
pub fn items_key(items: &[EquippedItem]) -> String {
    let mut ids = items.iter().map(|i| i.item_id.as_str()).collect::<Vec<_>>();
    ids.sort();
    ids.join(",")
}

/// Plain outfit key: `base` or `base_<items>`.
pub fn fingerprint(items: &[EquippedItem], base_id: &str) -> String {
    join_key(base_id.to_string(), &items_key(items))
}

/// Scene-qualified outfit key: `bunny_gemini_<base>_<scene>` or `..._<items>`.
pub fn scene_fingerprint(items: &[EquippedItem], base_id: &str, scene_id: &str) -> String {
    join_key(
        format!("{SCENE_KEY_PREFIX}_{base_id}_{scene_id}"),
        &items_key(items),
    )
}

/// Dispatch on an optional scene, as the route layer receives it.
pub fn outfit_key(items: &[EquippedItem], base_id: &str, scene_id: Option<&str>) -> String {
    match scene_id {
        Some(scene) if !scene.is_empty() => scene_fingerprint(items, base_id, scene),
        _ => fingerprint(items, base_id),
    }
}

fn join_key(mut head: String, items: &str) -> String {
    if !items.is_empty() {
        head.push('_');
        head.push_str(items);
    }
    head
}

#[cfg(test)]
#[path = "../../tests/unit/identity/fingerprint.rs"]
mod tests;
