use glance_core::PreviewSession;
use glance_types::SettingsCommand;
use tokio::time::Instant;

use crate::state::AppState;

/// A rejected command leaves the settings untouched and schedules nothing
pub fn handle_settings_command(session: &mut PreviewSession, command: SettingsCommand) {
    tracing::debug!("Settings command: {command:?}");
    if let Err(e) = session.apply(command, Instant::now()) {
        tracing::warn!("Settings command rejected: {e}");
    }
}

pub async fn handle_save(state: &AppState, session: &PreviewSession) -> anyhow::Result<()> {
    state.settings.save(session.settings()).await?;
    Ok(())
}
