use std::sync::Arc;

use glance_config::Settings;
use glance_types::Preview;

use crate::error::PreviewError;
use crate::lookup::{CandidateGenerator, LookupMode};
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::render::ContentRenderer;
use crate::store::KeyValueStore;

/// Text in, formatted preview out: normalize, expand candidates, batch-get, render
#[derive(Clone)]
pub struct PreviewPipeline {
    store: Arc<dyn KeyValueStore>,
    generator: CandidateGenerator,
}

impl PreviewPipeline {
    pub fn new(store: Arc<dyn KeyValueStore>, generator: CandidateGenerator) -> Self {
        Self { store, generator }
    }

    pub async fn render(&self, settings: &Settings, text: &str) -> Result<Preview, PreviewError> {
        let text = DefaultPreprocessor.process(text);
        let mode = LookupMode::detect(&text);
        let allow_capitalized = settings.lookup_with_capitalized && mode.is_ascii_like();

        let candidates = self
            .generator
            .candidates(&text, allow_capitalized, mode.is_ascii_like());
        // Reject bad settings before touching the store
        let renderer = ContentRenderer::new(settings)?;

        if candidates.is_empty() {
            return Ok(Preview::empty());
        }

        let definitions = self.store.get(&candidates).await?;
        tracing::debug!(
            "{} candidates for {:?}, {} resolved",
            candidates.len(),
            text,
            definitions.len()
        );

        Ok(renderer.generate(&candidates, &definitions, mode.is_ascii_like()))
    }
}
