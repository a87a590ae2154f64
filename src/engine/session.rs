use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::engine::pipeline::{apply_filters, FilteredResult};
use crate::models::{DateRange, FilterCriteria, FilterError, ViewKind};
use crate::storage::{load_view, profile_file, Dataset, DatasetKey, DatasetProfile, DatasetStorage, Encoding};

/// Where the extracts of one session live.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub all_transactions: PathBuf,
    pub identified_customers: PathBuf,
    /// The uncleaned export, only profiled.
    pub raw_export: Option<PathBuf>,
    pub raw_encoding: Encoding
}

/// The read-only datasets shared by every query of a session.
pub struct Session {
    all_transactions: Arc<Dataset>,
    identified_customers: Arc<Dataset>,
    raw_profile: Option<DatasetProfile>
}

impl Session {
    /// Loads both views through `storage`, reusing anything it already holds.
    pub fn open(config: &SessionConfig, storage: &DatasetStorage) -> Result<Self> {
        let all_transactions = open_view(storage, &config.all_transactions, ViewKind::AllTransactions)?;
        let identified_customers = open_view(storage, &config.identified_customers, ViewKind::IdentifiedCustomers)?;

        debug!("{} views cached for the session", storage.len());

        for dataset in [&all_transactions, &identified_customers] {
            if dataset.is_empty() {
                warn!("The {} view holds no transactions", dataset.view());
            }
        }

        if identified_customers.len() > all_transactions.len() {
            warn!(
                "The identified-customers view holds more rows ({}) than the all-transactions view ({})",
                identified_customers.len(),
                all_transactions.len()
            );
        }

        let raw_profile = match &config.raw_export {
            Some(path) => {
                let profile = profile_file(path, config.raw_encoding)?;
                info!("Profiled raw export {}: {} rows, {} columns", path.display(), profile.rows, profile.columns());
                Some(profile)
            }
            None => None
        };

        Ok(Self {
            all_transactions,
            identified_customers,
            raw_profile
        })
    }

    pub fn view(&self, kind: ViewKind) -> &Dataset {
        match kind {
            ViewKind::AllTransactions => self.all_transactions.as_ref(),
            ViewKind::IdentifiedCustomers => self.identified_customers.as_ref()
        }
    }

    pub fn raw_profile(&self) -> Option<&DatasetProfile> {
        self.raw_profile.as_ref()
    }

    /// Criteria covering the full date span of the view, everything else unrestricted.
    ///
    /// An empty view gets an unbounded range.
    pub fn default_criteria(&self, kind: ViewKind) -> FilterCriteria {
        let range = self.view(kind).date_span()
            .unwrap_or_else(|| DateRange::new(NaiveDate::MIN, NaiveDate::MAX));

        FilterCriteria::new(range)
    }

    /// Rejects a specific country or customer the view has never seen.
    ///
    /// Filtering itself tolerates unknown values and simply yields an empty result.
    pub fn validate(&self, kind: ViewKind, criteria: &FilterCriteria) -> Result<(), FilterError> {
        let dataset = self.view(kind);

        if let Some(country) = criteria.country.specific() {
            if !dataset.contains_country(country) {
                return Err(FilterError::unknown_country(country, kind));
            }
        }

        if kind == ViewKind::IdentifiedCustomers {
            if let Some(&customer_id) = criteria.customer.specific() {
                if !dataset.contains_customer(customer_id) {
                    return Err(FilterError::unknown_customer(customer_id, kind));
                }
            }
        }

        Ok(())
    }

    pub fn apply_filters(&self, kind: ViewKind, criteria: &FilterCriteria) -> Result<FilteredResult<'_>, FilterError> {
        apply_filters(self.view(kind), criteria)
    }
}

fn open_view(storage: &DatasetStorage, path: &Path, view: ViewKind) -> Result<Arc<Dataset>> {
    storage.load_or_insert_with(DatasetKey::new(path, view), || load_view(path, view))
}
