use serde::Serialize;

use super::entities::VoiceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub voices: Vec<VoiceRecord>,
}

/// Fold voices into category groups.
///
/// Groups appear in the order their category is first seen; voices keep their
/// input order inside a group.
pub fn group_by_category(voices: Vec<VoiceRecord>) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for voice in voices {
        match groups
            .iter_mut()
            .find(|group| group.category == voice.category)
        {
            Some(group) => group.voices.push(voice),
            None => groups.push(CategoryGroup {
                category: voice.category.clone(),
                voices: vec![voice],
            }),
        }
    }

    groups
}
