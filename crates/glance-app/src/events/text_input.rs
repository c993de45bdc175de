use glance_core::PreviewSession;
use glance_types::AppEvent;
use kanal::AsyncSender;

pub async fn handle_trial_text(
    session: &mut PreviewSession,
    text: String,
    preview_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::debug!("Trial text: {text:?}");
    let preview = session.set_trial_text(text).await.clone();
    preview_tx.send(AppEvent::ShowPreview(preview)).await?;
    Ok(())
}
