// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splitting — turns raw page-group predictions into clean page groups.

pub mod reconcile;

pub use reconcile::{PageGroupReconciler, reconcile, validate_groups};
