//! Builtin catalog: the six knowledge-base items and the category label map.

use super::KnowledgeItem;

/// Category ids and their display names, in catalog order.
pub const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("sdg2", "Zero Hunger"),
    ("sdg3", "Good Health and Well-Being"),
    ("sdg4", "Quality Education"),
    ("sdg6", "Clean Water and Sanitation"),
    ("sdg7", "Affordable and Clean Energy"),
    ("sdg11", "Sustainable Cities and Communities"),
];

/// Returns the display name for a category id.
pub fn display_name(category: &str) -> Option<&'static str> {
    CATEGORY_LABELS
        .iter()
        .find(|(id, _)| *id == category)
        .map(|(_, name)| *name)
}

/// Returns the category id for a display name (inverse of [`display_name`]).
pub fn category_for_display_name(name: &str) -> Option<&'static str> {
    CATEGORY_LABELS
        .iter()
        .find(|(_, display)| *display == name)
        .map(|(id, _)| *id)
}

/// The builtin knowledge-base items.
pub fn builtin_items() -> Vec<KnowledgeItem> {
    vec![
        KnowledgeItem::new(
            "p1",
            "sdg2",
            "Community Grain Banks",
            "Village-level grain storage & fair distribution",
        ),
        KnowledgeItem::new(
            "p2",
            "sdg3",
            "Mobile Health Vans",
            "Basic diagnostics & telemedicine",
        ),
        KnowledgeItem::new(
            "p3",
            "sdg4",
            "Tablet Classrooms",
            "Offline-first curriculum with teacher aid",
        ),
        KnowledgeItem::new(
            "p4",
            "sdg6",
            "Solar Water Purifiers",
            "Low-cost UV + membrane",
        ),
        KnowledgeItem::new(
            "p5",
            "sdg7",
            "Community Solar Microgrid",
            "Prepaid smart meters",
        ),
        KnowledgeItem::new(
            "p6",
            "sdg11",
            "Waste Segregation & Compost",
            "Ward-level MRF & civic incentives",
        ),
    ]
}
