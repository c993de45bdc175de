use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use glance_core::PreviewSession;
use glance_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod settings;
pub mod text_input;

use settings::{handle_save, handle_settings_command};
use text_input::handle_trial_text;

/// Owns the preview session: applies commands as they arrive and lets the
/// coalescer regenerate on every tick. Settings are saved on the way out.
pub async fn event_loop(
    state: Arc<AppState>,
    mut session: PreviewSession,
    event_rx: AsyncReceiver<AppEvent>,
    preview_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let tick = {
        let config = state.config.read().await;
        Duration::from_millis(config.preview.tick_ms.max(1))
    };
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    match session.refresh().await {
        Ok(preview) => preview_tx.send(AppEvent::ShowPreview(preview.clone())).await?,
        Err(e) => tracing::warn!("Initial preview failed: {e}"),
    }

    tracing::info!("Preview session started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Some(preview) = session.tick(Instant::now()).await {
                    tracing::debug!("Preview regenerated");
                    preview_tx.send(AppEvent::ShowPreview(preview.clone())).await?;
                }
            }
            event = event_rx.recv() => {
                let Ok(event) = event else {
                    tracing::debug!("Event channel closed");
                    break;
                };
                if handle_events(&state, &mut session, &preview_tx, event).await?.is_break() {
                    break;
                }
            }
        }
    }

    let saved = handle_save(&state, &session).await;
    cancel.cancel();
    tracing::info!("Preview session ended");
    saved
}

async fn handle_events(
    state: &AppState,
    session: &mut PreviewSession,
    preview_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<ControlFlow<()>> {
    match event {
        AppEvent::Settings(command) => handle_settings_command(session, command),
        AppEvent::TrialText(text) => handle_trial_text(session, text, preview_tx).await?,
        AppEvent::SaveSettings => handle_save(state, session).await?,
        AppEvent::ShowPreview(_) => {
            // Outbound only
        }
        AppEvent::Shutdown => return Ok(ControlFlow::Break(())),
    }

    Ok(ControlFlow::Continue(()))
}
