use std::sync::Arc;

use attsweep_client::TrackerClient;
use attsweep_core::{
    compute_stats, Issue, SelectionEntry, SelectionKey, SelectionSet, Stats,
};
use tracing::warn;

use crate::cancel::CancelToken;
use crate::catalog::build_catalog;
use crate::config::EngineConfig;
use crate::deleter::{delete_selected, BatchReport};
use crate::error::EngineError;

/// Result of one sweep: the deletion report plus whatever went wrong
/// while refreshing the catalog afterwards. A refresh failure never
/// hides the deletion outcome.
#[derive(Debug)]
pub struct SweepOutcome {
    pub report: BatchReport,
    pub refresh_error: Option<EngineError>,
}

/// One interactive cleanup session: the current catalog snapshot, the
/// selection over it and the derived stats. All mutation goes through
/// the methods here so the three stay consistent.
pub struct Session<C>
where
    C: TrackerClient + ?Sized + 'static,
{
    client: Arc<C>,
    config: EngineConfig,
    catalog: Vec<Issue>,
    selection: SelectionSet,
    stats: Stats,
    last_query: Option<(u64, Option<(String, String)>)>,
}

impl<C> Session<C>
where
    C: TrackerClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            catalog: Vec::new(),
            selection: SelectionSet::new(),
            stats: Stats::default(),
            last_query: None,
        }
    }

    pub fn catalog(&self) -> &[Issue] {
        &self.catalog
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_selected(&self, key: SelectionKey) -> bool {
        self.selection.is_selected(key)
    }

    /// Build a fresh catalog for the project. Any previous catalog and
    /// selection are discarded first, so a failed search leaves the
    /// session empty rather than showing stale results.
    pub async fn search(
        &mut self,
        project_id: u64,
        key_range: Option<(&str, &str)>,
        cancel: &CancelToken,
    ) -> Result<(), EngineError> {
        self.catalog.clear();
        self.selection.clear();
        self.recompute_stats();

        let catalog =
            build_catalog(self.client.clone(), project_id, key_range, &self.config, cancel)
                .await?;
        self.catalog = catalog;
        self.last_query = Some((
            project_id,
            key_range.map(|(from, to)| (from.to_string(), to.to_string())),
        ));
        self.recompute_stats();
        Ok(())
    }

    /// Toggle one attachment in or out of the selection. The key must
    /// resolve against the current catalog.
    pub fn toggle(&mut self, key: SelectionKey) -> Result<(), EngineError> {
        let entry = self
            .catalog
            .iter()
            .find(|issue| issue.id == key.issue_id)
            .and_then(|issue| {
                issue
                    .attachments
                    .iter()
                    .find(|a| a.id == key.attachment_id)
                    .map(|a| SelectionEntry::from_attachment(issue, a))
            })
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "attachment {}/{} not in catalog",
                    key.issue_id, key.attachment_id
                ))
            })?;
        self.selection.toggle(entry);
        self.recompute_stats();
        Ok(())
    }

    pub fn toggle_all(&mut self) {
        self.selection.toggle_all(&self.catalog);
        self.recompute_stats();
    }

    /// Delete everything currently selected, then refresh the catalog
    /// from the last search query. The selection is cleared whatever the
    /// per-entry outcomes were; re-selecting survivors is an explicit
    /// follow-up action. The refresh runs exactly once and its failure
    /// is reported separately so the deletion results are never lost.
    pub async fn sweep(&mut self, cancel: &CancelToken) -> Result<SweepOutcome, EngineError> {
        let entries = self.selection.entries();
        let report =
            delete_selected(self.client.clone(), entries, &self.config, cancel).await?;

        self.selection.clear();
        self.recompute_stats();

        let refresh_error = match self.refresh().await {
            Ok(()) => None,
            Err(e) => {
                warn!("catalog refresh after sweep failed: {e}");
                Some(e)
            }
        };
        Ok(SweepOutcome {
            report,
            refresh_error,
        })
    }

    async fn refresh(&mut self) -> Result<(), EngineError> {
        let Some((project_id, range)) = self.last_query.clone() else {
            return Err(EngineError::Validation("no previous search to refresh".into()));
        };
        let key_range = range.as_ref().map(|(from, to)| (from.as_str(), to.as_str()));
        // Refresh is not cancellable: the deletes already happened, the
        // session just needs a consistent snapshot.
        let cancel = CancelToken::new();
        let catalog = build_catalog(
            self.client.clone(),
            project_id,
            key_range,
            &self.config,
            &cancel,
        )
        .await?;
        self.catalog = catalog;
        self.recompute_stats();
        Ok(())
    }

    fn recompute_stats(&mut self) {
        self.stats = compute_stats(&self.catalog, &self.selection);
    }
}
