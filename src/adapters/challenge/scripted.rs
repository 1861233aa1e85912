//! Scripted 3-D Secure challenge for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{ChallengeError, ChallengeRequest, ThreeDsChallenge};

/// Challenge double that records requests.
///
/// Ready by default; [`set_ready`](Self::set_ready) simulates a widget that
/// has not loaded and [`fail_next_start`](Self::fail_next_start) a widget
/// that errors when launched.
#[derive(Clone)]
pub struct ScriptedChallenge {
    ready: Arc<AtomicBool>,
    fail_next: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<ChallengeRequest>>>,
}

impl Default for ScriptedChallenge {
    fn default() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
            fail_next: Arc::new(AtomicBool::new(false)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedChallenge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn fail_next_start(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ChallengeRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ThreeDsChallenge for ScriptedChallenge {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn start(&self, request: &ChallengeRequest) -> Result<(), ChallengeError> {
        if !self.is_ready() {
            return Err(ChallengeError::NotReady);
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ChallengeError::Failed("scripted failure".to_string()));
        }
        Ok(())
    }
}
