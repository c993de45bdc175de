use std::time::Duration;

use glance_config::{Settings, SettingsError};
use glance_types::{Preview, SettingsCommand};
use tokio::time::Instant;

use crate::coalescer::PreviewCoalescer;
use crate::error::PreviewError;
use crate::preview::PreviewPipeline;

/// Live settings editing with a debounced preview.
///
/// Settings changes go through the coalescer, trial text changes re-render
/// right away. A failed render keeps the last good preview on screen.
pub struct PreviewSession {
    pipeline: PreviewPipeline,
    settings: Settings,
    trial_text: String,
    coalescer: PreviewCoalescer<Settings>,
    preview: Preview,
}

impl PreviewSession {
    pub fn new(
        pipeline: PreviewPipeline,
        settings: Settings,
        trial_text: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            pipeline,
            settings,
            trial_text: trial_text.into(),
            coalescer: PreviewCoalescer::new(delay),
            preview: Preview::empty(),
        }
    }

    /// Mutate the settings and schedule a regeneration
    pub fn apply(&mut self, command: SettingsCommand, now: Instant) -> Result<(), SettingsError> {
        self.settings.apply(command)?;
        self.coalescer.notify(self.settings.clone(), now);
        Ok(())
    }

    pub async fn set_trial_text(&mut self, text: impl Into<String>) -> &Preview {
        self.trial_text = text.into();
        let settings = self.settings.clone();
        self.regenerate(&settings).await;
        &self.preview
    }

    /// Periodic tick; returns the new preview when one was generated
    pub async fn tick(&mut self, now: Instant) -> Option<&Preview> {
        let snapshot = self.coalescer.poll(now)?;
        self.regenerate(&snapshot).await.then_some(&self.preview)
    }

    /// Render right now, bypassing the coalescer
    pub async fn refresh(&mut self) -> Result<&Preview, PreviewError> {
        self.preview = self
            .pipeline
            .render(&self.settings, &self.trial_text)
            .await?;
        Ok(&self.preview)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn trial_text(&self) -> &str {
        &self.trial_text
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn is_pending(&self) -> bool {
        self.coalescer.is_pending()
    }

    async fn regenerate(&mut self, settings: &Settings) -> bool {
        match self.pipeline.render(settings, &self.trial_text).await {
            Ok(preview) => {
                self.preview = preview;
                true
            }
            Err(e) => {
                tracing::warn!("Preview not updated: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use glance_types::OptionValue;

    use super::*;
    use crate::lookup::CandidateGenerator;
    use crate::store::{KeyValueStore, MemoryStore};

    const DELAY: Duration = Duration::from_millis(100);
    const TICK: Duration = Duration::from_millis(10);

    async fn session() -> PreviewSession {
        let store = Arc::new(MemoryStore::new());
        store
            .set(HashMap::from([
                ("rained".to_string(), "雨が降った".to_string()),
                ("cat".to_string(), "猫".to_string()),
            ]))
            .await
            .unwrap();
        let pipeline = PreviewPipeline::new(store, CandidateGenerator::default());
        PreviewSession::new(pipeline, Settings::default(), "rained cats and dogs", DELAY)
    }

    fn font_size(size: u32) -> SettingsCommand {
        SettingsCommand::UpdateOption {
            name: "head_font_size".into(),
            value: OptionValue::Number(size as f64),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_renders_once_with_final_settings() {
        let mut session = session().await;

        for size in 20..25 {
            session.apply(font_size(size), Instant::now()).unwrap();
            tokio::time::advance(TICK).await;
        }

        let mut renders = Vec::new();
        for _ in 0..50 {
            if let Some(preview) = session.tick(Instant::now()).await {
                renders.push(preview.clone());
            }
            tokio::time::advance(TICK).await;
        }

        assert_eq!(renders.len(), 1);
        assert!(renders[0].html.contains("font-size:24px;"));
        assert!(!session.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_renders_before_quiet_period() {
        let mut session = session().await;
        session.apply(font_size(30), Instant::now()).unwrap();

        tokio::time::advance(DELAY - TICK).await;
        assert!(session.tick(Instant::now()).await.is_none());

        tokio::time::advance(TICK).await;
        assert!(session.tick(Instant::now()).await.is_some());
    }

    #[tokio::test]
    async fn trial_text_renders_immediately() {
        let mut session = session().await;
        let preview = session.set_trial_text("cat").await;
        assert_eq!(preview.head.as_deref(), Some("cat"));
        assert_eq!(session.trial_text(), "cat");
    }

    #[tokio::test(start_paused = true)]
    async fn bad_settings_keep_last_preview() {
        let mut session = session().await;
        session.refresh().await.unwrap();
        let before = session.preview().clone();
        assert_eq!(before.head.as_deref(), Some("rained"));

        session
            .apply(
                SettingsCommand::UpdateOption {
                    name: "head_font_color".into(),
                    value: OptionValue::Text("not a color".into()),
                },
                Instant::now(),
            )
            .unwrap();
        tokio::time::advance(DELAY).await;

        assert!(session.tick(Instant::now()).await.is_none());
        assert_eq!(session.preview(), &before);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn rejected_command_schedules_nothing() {
        let mut session = session().await;
        let result = session.apply(SettingsCommand::RemoveRule { index: 9 }, Instant::now());
        assert!(matches!(result, Err(SettingsError::RuleOutOfRange { .. })));
        assert!(!session.is_pending());
    }
}
