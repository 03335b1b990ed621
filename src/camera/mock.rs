use super::CameraSource;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockCamera {
    frame: Arc<Mutex<Vec<u8>>>,
    denied: Arc<Mutex<bool>>,
    capture_count: Arc<Mutex<usize>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(self, frame: Vec<u8>) -> Self {
        *self.frame.lock().unwrap() = frame;
        self
    }

    pub fn with_denied(self, denied: bool) -> Self {
        *self.denied.lock().unwrap() = denied;
        self
    }

    pub fn get_capture_count(&self) -> usize {
        *self.capture_count.lock().unwrap()
    }
}

#[async_trait]
impl CameraSource for MockCamera {
    async fn capture(&self) -> Result<Vec<u8>> {
        *self.capture_count.lock().unwrap() += 1;

        if *self.denied.lock().unwrap() {
            return Err(Error::CapabilityDenied(
                "Camera permission refused".to_string(),
            ));
        }

        Ok(self.frame.lock().unwrap().clone())
    }
}
