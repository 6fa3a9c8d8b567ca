use catalog::PinCatalog;

use crate::selection::SelectionState;

/// Text shown in the floating detail card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailCard {
    pub title: String,
    pub category: String,
    pub starts_at: String,
}

impl DetailCard {
    /// Secondary line, e.g. `Live Music • Sat 8:30 PM`.
    pub fn meta_line(&self) -> String {
        format!("{} \u{2022} {}", self.category, self.starts_at)
    }
}

/// Projects the current selection into card text.
///
/// Renders nothing when no pin is selected or the selected id is not in the catalog.
pub fn project_detail(state: &SelectionState, catalog: &PinCatalog) -> Option<DetailCard> {
    let pin = catalog.find(state.selected_id()?)?;
    Some(DetailCard {
        title: pin.title.clone(),
        category: pin.category.clone(),
        starts_at: pin.starts_at.clone(),
    })
}
