use crate::model::outfit::EquippedItem;

/// Instruction text for dressing the base bunny in `items`, optionally placed in a scene.
///
/// Item images follow the base image in the request, in the same order as `items`.
pub fn build_prompt(items: &[EquippedItem], scene: Option<&str>) -> String {
    let mut prompt = String::from(
        "The first image is a cartoon bunny character. Dress the bunny in the clothing items \
         shown in the following images, keeping its pose, proportions and art style unchanged.",
    );
    if items.is_empty() {
        prompt.push_str(" The bunny wears nothing extra.");
    }
    for (i, item) in items.iter().enumerate() {
        let name = if item.name.is_empty() {
            item.item_id.as_str()
        } else {
            item.name.as_str()
        };
        prompt.push_str(&format!(
            "\nImage {}: {name}, worn on the {}.",
            i + 2,
            item.slot.replace('_', " ")
        ));
    }
    match scene {
        Some(scene) if !scene.is_empty() => {
            prompt.push_str(&format!("\nPlace the dressed bunny in a {scene} scene."));
        }
        _ => prompt.push_str("\nKeep a plain transparent background."),
    }
    prompt
}
