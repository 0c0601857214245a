use std::sync::Arc;

use crate::data::aggregate::{summarize, DashboardView};
use crate::data::filter::{filter, FilterSelection};
use crate::data::model::{Direction, TradeDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One session's UI state, independent of rendering.
///
/// The dataset is shared read-only; the selection and the view derived from it
/// belong to this session alone.
#[derive(Debug, Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<TradeDataset>>,

    /// Current filter selection.
    selection: FilterSelection,

    /// Charts for `selection` (cached until the selection changes).
    view: DashboardView,

    /// Number of rows passing `selection`.
    visible: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset with every filter value selected.
    pub fn set_dataset(&mut self, dataset: Arc<TradeDataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Replace the selection. Recomputes only if it actually changed.
    pub fn apply(&mut self, selection: FilterSelection) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.recompute();
    }

    fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.view = DashboardView::NoData;
            self.visible = 0;
            return;
        };
        let subset = filter(ds, &self.selection);
        log::debug!("{} of {} rows match the filters", subset.len(), ds.len());
        self.visible = subset.len();
        self.view = summarize(&subset);
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.apply(self.selection.clone().toggle_category(category));
    }

    pub fn toggle_direction(&mut self, direction: &Direction) {
        self.apply(self.selection.clone().toggle_direction(direction));
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.apply(self.selection.clone().toggle_year(year));
    }

    /// Select every value in `dimension`.
    pub fn select_all(&mut self, dimension: Dimension) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        let selection = self.selection.clone();
        self.apply(match dimension {
            Dimension::Category => selection.with_categories(ds.categories().clone()),
            Dimension::Direction => selection.with_directions(ds.directions().clone()),
            Dimension::Year => selection.with_years(ds.years().clone()),
        });
    }

    /// Deselect every value in `dimension`.
    pub fn select_none(&mut self, dimension: Dimension) {
        let selection = self.selection.clone();
        self.apply(match dimension {
            Dimension::Category => selection.with_categories(Default::default()),
            Dimension::Direction => selection.with_directions(Default::default()),
            Dimension::Year => selection.with_years(Default::default()),
        });
    }
}

/// One of the three filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    Direction,
    Year,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::aggregate::NO_DATA_NOTICE;
    use crate::data::model::Transaction;

    fn dataset() -> Arc<TradeDataset> {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        Arc::new(TradeDataset::from_transactions(
            vec![
                Transaction::new("Toys", Direction::Import, 10.0, d(2020, 1)),
                Transaction::new("Toys", Direction::Export, 20.0, d(2021, 2)),
                Transaction::new("Furniture", Direction::Import, 30.0, d(2021, 3)),
            ],
            3,
            0,
        ))
    }

    #[test]
    fn new_dataset_selects_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert_eq!(state.visible(), 3);
        assert!(matches!(state.view(), DashboardView::Charts(_)));
        assert_eq!(state.selection().years.len(), 2);
    }

    #[test]
    fn toggles_refilter() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_category("Toys");
        assert_eq!(state.visible(), 1);
        state.toggle_year(2021);
        assert_eq!(state.visible(), 0);
        assert_eq!(state.view().notice(), Some(NO_DATA_NOTICE));
        state.toggle_year(2021);
        state.toggle_direction(&Direction::Import);
        assert_eq!(state.visible(), 0);
    }

    #[test]
    fn none_then_all_restores_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        let before = state.view().clone();

        state.select_none(Dimension::Category);
        assert_eq!(state.view(), &DashboardView::NoData);

        state.select_all(Dimension::Category);
        assert_eq!(state.view(), &before);
    }

    #[test]
    fn sessions_share_dataset_but_not_selection() {
        let ds = dataset();
        let mut a = AppState::default();
        let mut b = AppState::default();
        a.set_dataset(Arc::clone(&ds));
        b.set_dataset(Arc::clone(&ds));

        a.select_none(Dimension::Direction);
        assert_eq!(a.visible(), 0);
        assert_eq!(b.visible(), 3);
        assert_eq!(Arc::strong_count(&ds), 3);
    }
}
