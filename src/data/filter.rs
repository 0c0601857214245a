use std::collections::BTreeSet;

use super::model::{Direction, TradeDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The three multi-select filters as one immutable value.
///
/// A row matches when its category, direction and year are each in the
/// corresponding set. An empty set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub directions: BTreeSet<Direction>,
    pub years: BTreeSet<i32>,
}

impl FilterSelection {
    /// Every observed value selected, i.e. show everything.
    pub fn all(dataset: &TradeDataset) -> Self {
        FilterSelection {
            categories: dataset.categories().clone(),
            directions: dataset.directions().clone(),
            years: dataset.years().clone(),
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.categories.contains(&tx.category)
            && self.directions.contains(&tx.direction)
            && self.years.contains(&tx.year)
    }

    pub fn with_categories(self, categories: BTreeSet<String>) -> Self {
        FilterSelection { categories, ..self }
    }

    pub fn with_directions(self, directions: BTreeSet<Direction>) -> Self {
        FilterSelection { directions, ..self }
    }

    pub fn with_years(self, years: BTreeSet<i32>) -> Self {
        FilterSelection { years, ..self }
    }

    pub fn toggle_category(mut self, category: &str) -> Self {
        if !self.categories.remove(category) {
            self.categories.insert(category.to_string());
        }
        self
    }

    pub fn toggle_direction(mut self, direction: &Direction) -> Self {
        if !self.directions.remove(direction) {
            self.directions.insert(direction.clone());
        }
        self
    }

    pub fn toggle_year(mut self, year: i32) -> Self {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// FilteredSubset: a view into the dataset
// ---------------------------------------------------------------------------

/// The rows of a dataset that pass a selection, kept as positions into the
/// dataset rather than copies.
#[derive(Debug, Clone)]
pub struct FilteredSubset<'a> {
    dataset: &'a TradeDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredSubset<'a> {
    /// Positions of the matching rows in [`TradeDataset::transactions`].
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let rows = self.dataset.transactions();
        self.indices.iter().map(move |&i| &rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows that pass all three filters.
pub fn filter<'a>(dataset: &'a TradeDataset, selection: &FilterSelection) -> FilteredSubset<'a> {
    let indices = dataset
        .transactions()
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.matches(tx))
        .map(|(i, _)| i)
        .collect();

    FilteredSubset { dataset, indices }
}
