//! In-memory note filtering for list views.

use crate::models::Note;

/// Filter by exact category and by a case-insensitive substring of the
/// title, content or subcategory. Input order is preserved.
#[must_use]
pub fn filter_notes<'a>(
    notes: &'a [Note],
    category: Option<&str>,
    query: Option<&str>,
) -> Vec<&'a Note> {
    let query = query
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_lowercase);

    notes
        .iter()
        .filter(|note| category.map_or(true, |category| note.category == category))
        .filter(|note| query.as_deref().map_or(true, |query| matches_query(note, query)))
        .collect()
}

fn matches_query(note: &Note, query: &str) -> bool {
    note.title.to_lowercase().contains(query)
        || note.content.to_lowercase().contains(query)
        || note
            .subcategory
            .as_deref()
            .is_some_and(|subcategory| subcategory.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<'a>(notes: &[&'a Note]) -> Vec<&'a str> {
        notes.iter().map(|note| note.title.as_str()).collect()
    }

    #[test]
    fn filters_by_category_and_query() {
        let mut elden = Note::new("gaming", "Boss list");
        elden.subcategory = Some("Elden Ring".to_string());
        let notes = vec![
            elden,
            Note::new("gaming", "Backlog").with_content("finish the RING quest"),
            Note::new("work", "Ring the client"),
        ];

        assert_eq!(
            titles(&filter_notes(&notes, Some("gaming"), Some("ring"))),
            vec!["Boss list", "Backlog"]
        );
        assert_eq!(titles(&filter_notes(&notes, None, Some("RING"))).len(), 3);
        assert_eq!(titles(&filter_notes(&notes, Some("work"), None)), vec!["Ring the client"]);
        assert_eq!(filter_notes(&notes, None, Some("   ")).len(), 3);
        assert!(filter_notes(&notes, Some("personal"), None).is_empty());
    }
}
