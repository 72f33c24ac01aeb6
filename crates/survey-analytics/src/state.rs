//! Dashboard application state.

use std::time::Instant;

use tracing::info;

use survey_core::{
    CategoryRepository, ResponseFilter, ResponseRepository, Result, StructureRepository,
    SurveyResponse, TaxonomySnapshot,
};

use crate::engine::{compute, DashboardData};
use crate::selection::FilterSelection;

/// Reference data, the full response set and the active filter.
///
/// Loaded once; changing the filter recomputes without touching the store.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    snapshot: TaxonomySnapshot,
    responses: Vec<SurveyResponse>,
    filter: ResponseFilter,
}

impl DashboardState {
    pub fn new(snapshot: TaxonomySnapshot, responses: Vec<SurveyResponse>) -> Self {
        Self {
            snapshot,
            responses,
            filter: ResponseFilter::default(),
        }
    }

    /// Fetch the taxonomy and every stored response concurrently.
    pub async fn load<S, C, R>(structure: &S, categories: &C, responses: &R) -> Result<Self>
    where
        S: StructureRepository + ?Sized,
        C: CategoryRepository + ?Sized,
        R: ResponseRepository + ?Sized,
    {
        let start = Instant::now();
        let (snapshot, responses) = futures::try_join!(
            TaxonomySnapshot::load(structure, categories),
            responses.list_all(),
        )?;

        info!(
            subsystem = "analytics",
            component = "dashboard",
            op = "load",
            result_count = responses.len(),
            parent_count = snapshot.parents.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dashboard data loaded"
        );
        Ok(Self::new(snapshot, responses))
    }

    pub fn snapshot(&self) -> &TaxonomySnapshot {
        &self.snapshot
    }

    pub fn responses(&self) -> &[SurveyResponse] {
        &self.responses
    }

    pub fn filter(&self) -> &ResponseFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ResponseFilter) {
        self.filter = filter;
    }

    /// Resolve a name-based selection and make it the active filter.
    pub fn select(&mut self, selection: &FilterSelection) -> Result<()> {
        self.filter = selection.resolve(&self.snapshot)?;
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = ResponseFilter::default();
    }

    pub fn recompute(&self) -> DashboardData {
        compute(&self.responses, &self.filter, &self.snapshot)
    }
}
