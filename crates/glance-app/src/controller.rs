use std::sync::Arc;

use glance_core::PreviewSession;
use glance_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::{command_reader, preview_writer};
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub commands: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub previews: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            commands: kanal::bounded_async(64),
            previews: kanal::bounded_async(16),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the preview tasks and tears them down together
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks<R, W>(
        &self,
        session: PreviewSession,
        input: R,
        output: W,
    ) -> JoinSet<anyhow::Result<()>>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            session,
            self.channels.commands.1.clone(),
            self.channels.previews.0.clone(),
            // The event loop ending stops everything else
            self.cancel_token.clone(),
        ));

        tasks.spawn(command_reader(
            input,
            self.channels.commands.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(preview_writer(
            self.channels.previews.1.clone(),
            output,
            self.cancel_token.child_token(),
        ));

        tasks
    }

    /// Sender for injecting events without going through the input reader
    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.commands.0.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

/// Wait for every task; a failing task stops the others
pub async fn run_until_done(
    controller: &AppController,
    mut tasks: JoinSet<anyhow::Result<()>>,
) -> anyhow::Result<()> {
    let mut outcome = Ok(());

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("Task failed: {e:#}");
                controller.shutdown();
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
            Err(e) => {
                tracing::error!("Task panicked: {e}");
                controller.shutdown();
            }
        }
    }

    outcome
}
