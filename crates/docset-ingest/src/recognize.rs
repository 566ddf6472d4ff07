//! Shared access to the recognition model.
//!
//! The model is an owned resource constructed once; callers hold a
//! cloneable handle rather than reaching for a global. The lock scope
//! covers only the inference call, so a future parallel ingester cannot
//! race on model state.

use std::sync::{Arc, Mutex};
use tracing::warn;

use docset_core::traits::Recognizer;
use docset_core::types::{RawImage, Recognition};

#[derive(Clone)]
pub struct SharedRecognizer {
    model: Arc<Mutex<Box<dyn Recognizer>>>,
}

impl SharedRecognizer {
    pub fn new(model: Box<dyn Recognizer>) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }

    pub fn recognize(&self, image: &RawImage) -> anyhow::Result<Recognition> {
        let guard = self
            .model
            .lock()
            .map_err(|_| anyhow::anyhow!("recognizer lock poisoned"))?;
        guard.recognize(image)
    }

    /// Recognize several images, keeping only results whose confidence
    /// exceeds `confidence_floor` and whose text is non-empty. Returns the
    /// accepted texts joined by newlines and the mean accepted confidence.
    /// Per-image failures are logged and skipped; they are never fatal.
    pub fn recognize_images(
        &self,
        images: &[RawImage],
        confidence_floor: f32,
    ) -> (String, Option<f32>) {
        let mut texts: Vec<String> = Vec::new();
        let mut confs: Vec<f32> = Vec::new();
        for image in images {
            match self.recognize(image) {
                Ok(rec) => {
                    let text = rec.text.trim();
                    if !text.is_empty()
                        && rec.confidence.is_some_and(|c| c > confidence_floor)
                    {
                        texts.push(text.to_string());
                        confs.extend(rec.confidence);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "image recognition failed; skipping image");
                }
            }
        }
        let joined = texts.join("\n");
        let avg = if confs.is_empty() {
            None
        } else {
            Some(confs.iter().sum::<f32>() / confs.len() as f32)
        };
        (joined, avg)
    }
}
