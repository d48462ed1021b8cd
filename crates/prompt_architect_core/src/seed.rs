//! Built-in starter collection and refinement frameworks.

use crate::model::item::{Item, ItemContent, ItemValidationError};
use uuid::Uuid;

/// Named rewriting styles offered for prompt refinement.
pub const REFINEMENT_FRAMEWORKS: [&str; 6] = [
    "Okay/Better/Best",
    "Dave Clark Cinematic",
    "Problem/Agitate/Solve (PAS)",
    "Feature/Advantage/Benefit (FAB)",
    "Add more specific details",
    "Make it more concise",
];

const BLOG_OUTLINE_ID: Uuid = Uuid::from_u128(0x6f1c_2a8e_7b3d_4c59_9e12_0a4b_5c6d_7e01);
const AI_DEVELOPERS_ID: Uuid = Uuid::from_u128(0x6f1c_2a8e_7b3d_4c59_9e12_0a4b_5c6d_7e02);
const FEATURE_IDEA_ID: Uuid = Uuid::from_u128(0x6f1c_2a8e_7b3d_4c59_9e12_0a4b_5c6d_7e03);
const CINEMATIC_LAYOUT_ID: Uuid = Uuid::from_u128(0x6f1c_2a8e_7b3d_4c59_9e12_0a4b_5c6d_7e04);

/// Returns the seeded collection in display order.
///
/// Ids and timestamps are fixed so repeated seeding is reproducible.
pub fn initial_items() -> Result<Vec<Item>, ItemValidationError> {
    Ok(vec![
        Item::with_id(
            BLOG_OUTLINE_ID,
            ItemContent::prompt(
                "Create a detailed blog post outline for the topic \"{{topic}}\". The target audience is {{audience}}, and the desired tone is {{tone}}. The outline should include an introduction, 3-5 main sections with sub-bullets, and a conclusion.",
            ),
            "Generate a blog post outline",
            1_698_314_400_000,
        )?
        .with_tags(["writing", "blogging", "content-creation"])
        .with_model("gemini-2.5-pro")?
        .with_updated_at(1_698_321_600_000)?,
        Item::with_id(
            AI_DEVELOPERS_ID,
            ItemContent::bookmark("https://ai.google.dev/"),
            "Google AI for Developers",
            1_698_242_400_000,
        )?
        .with_tags(["ai", "google", "docs", "gemini"])
        .with_favicon("https://www.google.com/s2/favicons?domain=ai.google.dev&sz=128")?,
        Item::with_id(
            FEATURE_IDEA_ID,
            ItemContent::note(Some(
                "What if we used the URL Context tool from the Gemini API to automatically summarize and categorize bookmarks? This could be a game-changer for knowledge management."
                    .to_string(),
            )),
            "Idea for new app feature",
            1_698_139_800_000,
        )?
        .with_tags(["ideas", "feature", "gemini-api"]),
        Item::with_id(
            CINEMATIC_LAYOUT_ID,
            ItemContent::prompt(
                "Generate a cinematic visual description using the Dave Clark method.\n\nSCENE:\n{{scene_description}}\n\nSHOT 1:\n- Camera Angle: \n- Lens: \n- Movement: \n- Subject: \n- Action:",
            ),
            "Dave Clark Cinematic Layout",
            1_698_084_000_000,
        )?
        .with_tags(["creative", "writing", "film", "dave-clark"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::{initial_items, REFINEMENT_FRAMEWORKS};
    use crate::model::item::ItemKind;

    #[test]
    fn seed_has_one_of_each_kind_and_derived_variables() {
        let items = initial_items().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].kind(), ItemKind::Prompt);
        assert_eq!(items[1].kind(), ItemKind::Bookmark);
        assert_eq!(items[2].kind(), ItemKind::Note);
        assert_eq!(
            items[0].variables(),
            ["topic".to_string(), "audience".to_string(), "tone".to_string()]
        );
        assert_eq!(items[3].variables(), ["scene_description".to_string()]);
    }

    #[test]
    fn frameworks_are_unique() {
        let mut names = REFINEMENT_FRAMEWORKS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), REFINEMENT_FRAMEWORKS.len());
    }
}
