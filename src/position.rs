//! Position acquisition
//!
//! Wraps the permission prompt and the device position fix into one async
//! operation with two failure outcomes, and provides the request tokens
//! screens use to discard results that arrive after they stopped caring.

use crate::models::{Coordinate, Location};
use crate::{FloodcastError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};

/// Desired accuracy hint passed to the platform
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Lowest = 1,
    Low = 2,
    Balanced = 3,
    High = 4,
    Highest = 5,
    BestForNavigation = 6,
}

/// Answer to a foreground permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// A single fix reported by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: Option<f64>,
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Prompt for foreground location access; suspends until the user answers
    async fn request_foreground_access(&self) -> PermissionStatus;
}

#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Request one position fix; suspends until the platform answers
    async fn current_position(&self, accuracy: Accuracy) -> anyhow::Result<PositionFix>;
}

/// Permission request plus position fix as one operation
#[derive(Clone)]
pub struct PositionAcquisition {
    permissions: Arc<dyn PermissionProvider>,
    positions: Arc<dyn PositionProvider>,
}

impl PositionAcquisition {
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        positions: Arc<dyn PositionProvider>,
    ) -> Self {
        Self {
            permissions,
            positions,
        }
    }

    /// Acquire the device location.
    ///
    /// Fails with [`FloodcastError::PermissionDenied`] without touching the
    /// position provider when access is declined, and with
    /// [`FloodcastError::PositionUnavailable`] when the platform cannot
    /// deliver a usable fix. Never retries.
    #[instrument(name = "acquire_position", level = "debug", skip(self))]
    pub async fn acquire(&self, accuracy: Accuracy) -> Result<Location> {
        if self.permissions.request_foreground_access().await == PermissionStatus::Denied {
            debug!("Foreground location permission denied");
            return Err(FloodcastError::PermissionDenied);
        }

        let fix = match self.positions.current_position(accuracy).await {
            Ok(fix) => fix,
            Err(e) => {
                warn!("Failed to get current position: {:#}", e);
                return Err(FloodcastError::position_unavailable(e.to_string()));
            }
        };

        let coordinate = Coordinate::new(fix.latitude, fix.longitude).map_err(|e| {
            warn!("Platform returned an unusable fix: {}", e);
            FloodcastError::position_unavailable(e.to_string())
        })?;

        debug!("Acquired position {}", coordinate.format_coordinates());
        Ok(Location::with_accuracy(coordinate, fix.accuracy))
    }
}

/// Token identifying one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Monotonic request counter; only the latest token is current.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: AtomicU64,
}

impl RequestTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` is still the latest request
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Make every outstanding token stale (screen teardown)
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ScriptedPermission, ScriptedPosition};

    fn acquisition(permission: PermissionStatus, position: ScriptedPosition) -> PositionAcquisition {
        PositionAcquisition::new(
            Arc::new(ScriptedPermission::new(permission)),
            Arc::new(position),
        )
    }

    #[tokio::test]
    async fn test_acquire_success() {
        let acq = acquisition(
            PermissionStatus::Granted,
            ScriptedPosition::fix(46.8182, 8.2275, Some(12.0)),
        );
        let loc = acq.acquire(Accuracy::Highest).await.unwrap();
        assert_eq!(loc.coordinate.latitude(), 46.8182);
        assert_eq!(loc.coordinate.longitude(), 8.2275);
        assert_eq!(loc.accuracy, Some(12.0));
    }

    #[tokio::test]
    async fn test_denied_skips_position_request() {
        let position = Arc::new(ScriptedPosition::fix(1.0, 2.0, None));
        let acq = PositionAcquisition::new(
            Arc::new(ScriptedPermission::new(PermissionStatus::Denied)),
            position.clone(),
        );
        let err = acq.acquire(Accuracy::Balanced).await.unwrap_err();
        assert!(matches!(err, FloodcastError::PermissionDenied));
        assert_eq!(position.request_count(), 0);
    }

    #[tokio::test]
    async fn test_platform_error_maps_to_unavailable() {
        let acq = acquisition(
            PermissionStatus::Granted,
            ScriptedPosition::failure("location services disabled"),
        );
        let err = acq.acquire(Accuracy::Balanced).await.unwrap_err();
        assert!(matches!(err, FloodcastError::PositionUnavailable { .. }));
        assert_eq!(err.user_message(), "Failed to get location");
    }

    #[tokio::test]
    async fn test_out_of_range_fix_is_unavailable() {
        let acq = acquisition(
            PermissionStatus::Granted,
            ScriptedPosition::fix(123.0, 0.0, None),
        );
        let err = acq.acquire(Accuracy::Balanced).await.unwrap_err();
        assert!(matches!(err, FloodcastError::PositionUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_accuracy_hint_is_forwarded() {
        let position = Arc::new(ScriptedPosition::fix(1.0, 2.0, None));
        let acq = PositionAcquisition::new(
            Arc::new(ScriptedPermission::new(PermissionStatus::Granted)),
            position.clone(),
        );
        acq.acquire(Accuracy::Highest).await.unwrap();
        assert_eq!(position.last_accuracy(), Some(Accuracy::Highest));
    }

    #[test]
    fn test_request_tokens() {
        let tokens = RequestTokens::new();
        let first = tokens.begin();
        assert!(tokens.is_current(first));

        let second = tokens.begin();
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));

        tokens.invalidate();
        assert!(!tokens.is_current(second));
    }
}
