use log::debug;

use super::{FilterKind, FilterSpec, Position, SmoothingFilter};
use crate::{Error, Result};

/// Several filters fed by the same raw stream, each with its own state.
///
/// Every raw sample goes through every filter so switching the selected
/// kind mid-session does not expose a cold filter.
pub struct FilterBank {
    filters: Vec<(FilterKind, Box<dyn SmoothingFilter<Position>>)>,
    selected: FilterKind,
    outputs: Vec<(FilterKind, Position)>,
}

impl FilterBank {
    /// Build a bank from filter specifications, selecting `selected`
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if a specification is invalid, a kind
    /// appears twice, or `selected` is not `None` and has no matching filter.
    pub fn new(specs: &[FilterSpec], selected: FilterKind) -> Result<Self> {
        let mut filters: Vec<(FilterKind, Box<dyn SmoothingFilter<Position>>)> = Vec::with_capacity(specs.len());

        for spec in specs {
            let kind = spec.kind();
            if filters.iter().any(|(existing, _)| *existing == kind) {
                return Err(Error::FilterError(format!("Duplicate filter kind in bank: {kind}")));
            }
            filters.push((kind, spec.build()?));
        }

        if selected != FilterKind::None && !filters.iter().any(|(kind, _)| *kind == selected) {
            return Err(Error::FilterError(format!("Selected filter {selected} is not in the bank")));
        }

        Ok(Self {
            filters,
            selected,
            outputs: Vec::new(),
        })
    }

    /// A bank with every kind at its default parameters
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; returns `Result` for API consistency.
    pub fn with_defaults(selected: FilterKind) -> Result<Self> {
        let specs: Vec<FilterSpec> = FilterKind::ALL
            .iter()
            .filter(|kind| **kind != FilterKind::None)
            .map(|kind| FilterSpec::default_for(*kind))
            .collect();
        Self::new(&specs, selected)
    }

    /// Feed one raw sample to every filter and return the selected output
    pub fn apply(&mut self, raw: Position) -> Position {
        self.outputs.clear();
        for (kind, filter) in &mut self.filters {
            let out = filter.apply(raw);
            self.outputs.push((*kind, out));
        }

        let selected = self.output(self.selected).unwrap_or(raw);
        debug!(
            "Filter bank [{}]: raw=({:.4}, {:.4}, {:.4}) -> ({:.4}, {:.4}, {:.4})",
            self.selected, raw.x, raw.y, raw.z, selected.x, selected.y, selected.z
        );
        selected
    }

    /// Output of `kind` for the most recent sample
    #[must_use]
    pub fn output(&self, kind: FilterKind) -> Option<Position> {
        self.outputs
            .iter()
            .find(|(existing, _)| *existing == kind)
            .map(|(_, out)| *out)
    }

    /// All outputs for the most recent sample
    #[must_use]
    pub fn outputs(&self) -> &[(FilterKind, Position)] {
        &self.outputs
    }

    /// Currently selected kind
    #[must_use]
    pub const fn selected(&self) -> FilterKind {
        self.selected
    }

    /// Switch the selected kind
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if the bank has no filter of that kind.
    pub fn select(&mut self, kind: FilterKind) -> Result<()> {
        if kind != FilterKind::None && !self.filters.iter().any(|(existing, _)| *existing == kind) {
            return Err(Error::FilterError(format!("Selected filter {kind} is not in the bank")));
        }
        self.selected = kind;
        Ok(())
    }

    /// Kinds held by the bank
    pub fn kinds(&self) -> impl Iterator<Item = FilterKind> + '_ {
        self.filters.iter().map(|(kind, _)| *kind)
    }

    /// Reset every filter
    pub fn reset(&mut self) {
        for (_, filter) in &mut self.filters {
            filter.reset();
        }
        self.outputs.clear();
    }
}
