//! Entry points used by the presentation layer

use crate::core::adjustment::{self, AdjustmentResult, validate_amount};
use crate::core::config::LookupConfig;
use crate::core::error::IndexError;
use crate::core::resolver::resolve;
use crate::core::source::{IndexSource, requested_years};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves index values for two dates and computes the adjustment.
pub struct AdjustmentService {
    source: Arc<dyn IndexSource>,
    lookup: LookupConfig,
}

impl AdjustmentService {
    pub fn new(source: Arc<dyn IndexSource>, lookup: LookupConfig) -> Self {
        Self { source, lookup }
    }

    #[instrument(name = "ComputeAdjustment", skip(self))]
    pub async fn compute_adjustment(
        &self,
        date_old: NaiveDate,
        date_new: NaiveDate,
        base_amount: f64,
    ) -> Result<AdjustmentResult, IndexError> {
        validate_amount(base_amount)?;

        let years = requested_years(&[date_old, date_new]);
        let series = self.source.fetch_series(&years).await?;
        let look_back = self.lookup.look_back_for(series.origin());
        debug!(origin = %series.origin(), ?look_back, "Resolving index values");

        let old = resolve(&series, date_old, look_back)?;
        let new = resolve(&series, date_new, look_back)?;

        let mut result = adjustment::calculate(old.value, new.value, base_amount)?;
        result.old_index_date = Some(old.date);
        result.new_index_date = Some(new.date);
        Ok(result)
    }

    /// Manual entry variant for when the remote source is down.
    pub fn compute_adjustment_from_values(
        old_value: f64,
        new_value: f64,
        base_amount: f64,
    ) -> Result<AdjustmentResult, IndexError> {
        adjustment::calculate(old_value, new_value, base_amount)
    }
}
