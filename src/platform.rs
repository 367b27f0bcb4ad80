//! Headless platform stand-ins
//!
//! Scripted permission and position providers plus a map view that records
//! animation commands. The demo binary drives the screens with these, and
//! tests use them to hold a request in flight.

use crate::map_sync::MapView;
use crate::models::Region;
use crate::position::{
    Accuracy, PermissionProvider, PermissionStatus, PositionFix, PositionProvider,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Permission provider that always gives the same answer
#[derive(Debug)]
pub struct ScriptedPermission {
    status: Mutex<PermissionStatus>,
    requests: AtomicUsize,
}

impl ScriptedPermission {
    #[must_use]
    pub fn new(status: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(status),
            requests: AtomicUsize::new(0),
        }
    }

    /// Change the answer given to later prompts
    pub fn set_status(&self, status: PermissionStatus) {
        *self.status.lock().unwrap_or_else(|p| p.into_inner()) = status;
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for ScriptedPermission {
    async fn request_foreground_access(&self) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Debug, Clone)]
enum ScriptedAnswer {
    Fix(PositionFix),
    Failure(String),
}

/// Position provider returning a scripted fix or failure
#[derive(Debug)]
pub struct ScriptedPosition {
    answer: Mutex<ScriptedAnswer>,
    gate: Option<Arc<Notify>>,
    requests: AtomicUsize,
    last_accuracy: Mutex<Option<Accuracy>>,
}

impl ScriptedPosition {
    #[must_use]
    pub fn fix(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        Self::with_answer(ScriptedAnswer::Fix(PositionFix {
            latitude,
            longitude,
            accuracy,
        }))
    }

    #[must_use]
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self::with_answer(ScriptedAnswer::Failure(message.into()))
    }

    fn with_answer(answer: ScriptedAnswer) -> Self {
        Self {
            answer: Mutex::new(answer),
            gate: None,
            requests: AtomicUsize::new(0),
            last_accuracy: Mutex::new(None),
        }
    }

    /// Hold every request until `gate` is notified
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Change the fix returned by later requests
    pub fn set_fix(&self, latitude: f64, longitude: f64) {
        *self.answer.lock().unwrap_or_else(|p| p.into_inner()) =
            ScriptedAnswer::Fix(PositionFix {
                latitude,
                longitude,
                accuracy: None,
            });
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_accuracy(&self) -> Option<Accuracy> {
        *self.last_accuracy.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl PositionProvider for ScriptedPosition {
    async fn current_position(&self, accuracy: Accuracy) -> anyhow::Result<PositionFix> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_accuracy.lock().unwrap_or_else(|p| p.into_inner()) = Some(accuracy);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let answer = self.answer.lock().unwrap_or_else(|p| p.into_inner()).clone();
        match answer {
            ScriptedAnswer::Fix(fix) => Ok(fix),
            ScriptedAnswer::Failure(message) => Err(anyhow!(message)),
        }
    }
}

/// Map view that records every `animate_to` command
#[derive(Debug, Default)]
pub struct RecordingMapView {
    animations: Mutex<Vec<(Region, Duration)>>,
}

impl RecordingMapView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn animations(&self) -> Vec<(Region, Duration)> {
        self.animations.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    #[must_use]
    pub fn last_animation(&self) -> Option<(Region, Duration)> {
        self.animations().last().copied()
    }
}

impl MapView for RecordingMapView {
    fn animate_to(&self, region: Region, duration: Duration) {
        tracing::trace!(
            "Animating map to {} over {:?}",
            region.center.format_coordinates(),
            duration
        );
        self.animations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((region, duration));
    }
}
