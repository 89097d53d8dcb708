// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::distance::measured_distance_31;

/// Receiver of search progress, which may also request cancellation.
///
/// Shared between the search and the caller (e.g. a UI thread), hence `Send + Sync`.
pub trait ProgressListener: Send + Sync {
    fn is_cancelled(&self) -> bool;

    /// Reports the best costs reached by each side of the search, and their queue sizes.
    fn update_status(
        &self,
        distance_from_begin: f32,
        direct_queue_size: usize,
        distance_from_end: f32,
        reverse_queue_size: usize,
    );

    /// Reports that no road was found near the start (0) or the target (1).
    fn set_segment_not_found(&self, side: usize);
}

/// Snapshot of [RouteCalculationProgress].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressStatus {
    pub segment_not_found: Option<usize>,
    pub distance_from_begin: f32,
    pub direct_queue_size: usize,
    pub distance_from_end: f32,
    pub reverse_queue_size: usize,
}

/// Default [ProgressListener], which only records the reported values.
/// Reported distances never decrease.
#[derive(Debug, Default)]
pub struct RouteCalculationProgress {
    cancelled: AtomicBool,
    status: Mutex<ProgressStatus>,
}

impl RouteCalculationProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the search to stop at its next iteration.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn status(&self) -> ProgressStatus {
        match self.status.lock() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn with_status<F: FnOnce(&mut ProgressStatus)>(&self, f: F) {
        match self.status.lock() {
            Ok(mut s) => f(&mut s),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl ProgressListener for RouteCalculationProgress {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn update_status(
        &self,
        distance_from_begin: f32,
        direct_queue_size: usize,
        distance_from_end: f32,
        reverse_queue_size: usize,
    ) {
        self.with_status(|s| {
            s.distance_from_begin = s.distance_from_begin.max(distance_from_begin);
            s.distance_from_end = s.distance_from_end.max(distance_from_end);
            s.direct_queue_size = direct_queue_size;
            s.reverse_queue_size = reverse_queue_size;
        });
    }

    fn set_segment_not_found(&self, side: usize) {
        self.with_status(|s| s.segment_not_found = Some(side));
    }
}

/// Remaining travel times along a previously calculated route,
/// used as a search heuristic when recalculating.
#[derive(Debug, Clone, Default)]
pub struct PrecalculatedRouteDirection {
    points: Vec<(u32, u32)>,
    times: Vec<f32>,
    registered: HashMap<(u32, u32), usize>,
}

impl PrecalculatedRouteDirection {
    /// Builds the hint from the points of a route, travelled at a constant `speed` (m/s).
    pub fn new(points: &[(u32, u32)], speed: f32) -> Self {
        let mut times = vec![0.0; points.len()];
        for i in (0..points.len().saturating_sub(1)).rev() {
            let (x1, y1) = points[i];
            let (x2, y2) = points[i + 1];
            times[i] = times[i + 1] + measured_distance_31(x1, y1, x2, y2) / speed;
        }

        let mut registered = HashMap::default();
        for (i, &p) in points.iter().enumerate() {
            registered.entry(p).or_insert(i);
        }

        Self {
            points: points.to_vec(),
            times,
            registered,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the remaining time (seconds) from a point of the route to its end,
    /// or `None` if the point does not belong to the route.
    pub fn time_to_end(&self, x31: u32, y31: u32) -> Option<f32> {
        self.registered.get(&(x31, y31)).map(|&i| self.times[i])
    }
}
