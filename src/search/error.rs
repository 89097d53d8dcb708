// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [search_route_internal](crate::search_route_internal).
///
/// Absence of a route is not an error - the search returns an empty route instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The search was cancelled through its [ProgressListener](crate::ProgressListener).
    #[error("route search was cancelled")]
    Cancelled,

    /// No routable road exists near the start point.
    #[error("no road found near the start point")]
    StartNotFound,

    /// No routable road exists near the target point.
    #[error("no road found near the target point")]
    TargetNotFound,
}
