// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-group reconciliation — repairs a noisy sequence of page-group
// predictions into ordered, disjoint groups.
//
// The scan walks predictions left to right holding a pending list of pages.
// A low-confidence prediction that is not the last one is folded into the
// pending list so it joins whatever comes next. A confident prediction after
// the first closes the pending list together with its own pages. Anything
// else (the first prediction when confident, or a trailing low-confidence
// one) closes the pending list on its own and emits its pages separately.
// Pending pages left at the end of the scan are always flushed.

use std::collections::HashSet;

use docsplit_core::error::{DocsplitError, Result};
use docsplit_core::types::{PageGroupPrediction, ReconciledPageGroup, checked_page_index};
use docsplit_core::SplitConfig;
use tracing::{debug, info, instrument, warn};

/// Reconciles page-group predictions against a confidence threshold. A
/// prediction at or above the threshold is trusted.
#[derive(Debug, Clone, Copy)]
pub struct PageGroupReconciler {
    threshold: f64,
}

impl Default for PageGroupReconciler {
    fn default() -> Self {
        Self::from_config(&SplitConfig::default())
    }
}

impl PageGroupReconciler {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.confidence_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Reconcile `predictions` for a document of `page_count` pages.
    ///
    /// Fails with `EmptyInput` on an empty sequence, `EmptyPageGroup` when a
    /// prediction carries no pages, and `PageIndexOutOfRange` for negative or
    /// too-large indexes. Validation covers the whole sequence before the scan
    /// starts, so a failure never yields partial groups.
    #[instrument(skip_all, fields(predictions = predictions.len(), page_count = page_count, threshold = self.threshold))]
    pub fn reconcile(
        &self,
        predictions: &[PageGroupPrediction],
        page_count: usize,
    ) -> Result<Vec<ReconciledPageGroup>> {
        let validated = validate_groups(predictions, page_count)?;
        let last = validated.len() - 1;

        let mut emitter = GroupEmitter::default();
        let mut current: Vec<usize> = Vec::new();
        let mut previous_confidence: Option<f64> = None;

        for (position, (prediction, pages)) in predictions.iter().zip(validated).enumerate() {
            let confidence = prediction.confidence;
            let confident = confidence >= self.threshold;

            if confident && position > 0 {
                current.extend(pages);
                emitter.emit(std::mem::take(&mut current));
            } else if !confident && position != last {
                current.extend(pages);
            } else {
                emitter.emit(std::mem::take(&mut current));
                emitter.emit(pages);
            }

            debug!(
                position,
                confidence,
                ?previous_confidence,
                pending = current.len(),
                emitted = emitter.groups.len(),
                "Prediction scanned"
            );
            previous_confidence = Some(confidence);
        }

        emitter.emit(current);

        info!(groups = emitter.groups.len(), "Page groups reconciled");
        Ok(emitter.groups)
    }
}

/// Reconcile with the default configuration's threshold.
pub fn reconcile(
    predictions: &[PageGroupPrediction],
    page_count: usize,
) -> Result<Vec<ReconciledPageGroup>> {
    PageGroupReconciler::default().reconcile(predictions, page_count)
}

/// Check every prediction and convert its indexes to `usize`.
///
/// Used on its own when groups are extracted as-is, without reconciliation.
pub fn validate_groups(
    predictions: &[PageGroupPrediction],
    page_count: usize,
) -> Result<Vec<Vec<usize>>> {
    if predictions.is_empty() {
        return Err(DocsplitError::EmptyInput);
    }

    predictions
        .iter()
        .enumerate()
        .map(|(position, prediction)| {
            if prediction.page_indexes.is_empty() {
                return Err(DocsplitError::EmptyPageGroup { position });
            }
            prediction
                .page_indexes
                .iter()
                .map(|&index| checked_page_index(index, page_count))
                .collect::<Result<Vec<usize>>>()
        })
        .collect()
}

/// Collects finished groups, keeping them disjoint.
#[derive(Default)]
struct GroupEmitter {
    groups: Vec<ReconciledPageGroup>,
    assigned: HashSet<usize>,
}

impl GroupEmitter {
    fn emit(&mut self, pages: Vec<usize>) {
        if pages.is_empty() {
            return;
        }
        let requested = pages.len();
        let page_indexes: Vec<usize> = pages
            .into_iter()
            .filter(|page| self.assigned.insert(*page))
            .collect();

        if page_indexes.len() < requested {
            warn!(
                dropped = requested - page_indexes.len(),
                "Pages already assigned to an earlier group were skipped"
            );
        }
        if !page_indexes.is_empty() {
            self.groups.push(ReconciledPageGroup { page_indexes });
        }
    }
}
