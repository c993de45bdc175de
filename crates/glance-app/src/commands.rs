use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use glance_config::Settings;
use glance_core::store::{is_loaded, mark_loaded};
use glance_core::{
    CandidateGenerator, IngestError, IngestOptions, IngestSummary, Ingestor, PreviewPipeline,
    PreviewSession, SourceEncoding, SourceFormat,
};
use glance_types::{AppEvent, IngestProgress, RuleField, SettingsCommand};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::controller::{AppController, run_until_done};
use crate::io::{NO_DEFINITION, unescape};
use crate::state::AppState;

/// Ingest a dictionary file, cancelling cleanly on Ctrl+C
pub async fn ingest(
    state: &AppState,
    path: &Path,
    encoding: Option<String>,
    format: Option<String>,
) -> anyhow::Result<()> {
    let (options, encoding, format) = {
        let config = state.config.read().await;
        let encoding = encoding.unwrap_or_else(|| config.ingest.default_encoding.clone());
        let format = format.unwrap_or_else(|| config.ingest.default_format.clone());
        (
            IngestOptions::from(&config.ingest),
            encoding.parse::<SourceEncoding>()?,
            format.parse::<SourceFormat>()?,
        )
    };

    let summary = run_ingestion(state, options, |ingestor, progress| async move {
        ingestor.ingest_file(path, encoding, format, &progress).await
    })
    .await
    .with_context(|| format!("Failed to ingest {}", path.display()))?;

    report(&summary);
    Ok(())
}

/// Load the bundled dictionary unless something was loaded before
pub async fn bootstrap(state: &AppState) -> anyhow::Result<()> {
    if is_loaded(state.dictionary.as_ref()).await? {
        println!("A dictionary is already loaded");
        return Ok(());
    }

    let options = IngestOptions::from(&state.config.read().await.ingest);
    let summary = run_ingestion(state, options, |ingestor, progress| async move {
        ingestor.ingest_default(&progress).await
    })
    .await
    .context("Failed to load the bundled dictionary")?;

    report(&summary);
    Ok(())
}

async fn run_ingestion<F, Fut>(
    state: &AppState,
    options: IngestOptions,
    run: F,
) -> anyhow::Result<IngestSummary>
where
    F: FnOnce(Ingestor, kanal::AsyncSender<IngestProgress>) -> Fut,
    Fut: Future<Output = Result<IngestSummary, IngestError>>,
{
    let cancel = CancellationToken::new();
    let ingestor = Ingestor::new(state.dictionary.clone(), options).with_cancel(cancel.clone());

    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Stopping ingestion");
                cancel.cancel();
            }
        }
    });

    let (progress_tx, progress_rx) = kanal::bounded_async::<IngestProgress>(64);
    let reporter = tokio::spawn(async move {
        while let Ok(progress) = progress_rx.recv().await {
            match progress {
                IngestProgress::Reading { .. } => tracing::debug!("{progress}"),
                IngestProgress::Loaded { .. } => tracing::info!("{progress}"),
            }
        }
    });

    let result = run(ingestor, progress_tx).await;
    ctrl_c.abort();
    let _ = reporter.await;

    let summary = result?;
    if !summary.stopped {
        mark_loaded(state.dictionary.as_ref()).await?;
    }
    Ok(summary)
}

fn report(summary: &IngestSummary) {
    let status = if summary.stopped { "stopped" } else { "done" };
    println!(
        "{status}: {} words registered, {} records skipped",
        summary.word_count, summary.skipped
    );
}

pub async fn clear(state: &AppState) -> anyhow::Result<()> {
    state.dictionary.clear().await?;
    println!("Dictionary cleared");
    Ok(())
}

pub async fn usage(state: &AppState) -> anyhow::Result<()> {
    let bytes = state.dictionary.size_in_use_bytes().await?;
    println!("{} KB", bytes / 1024);
    Ok(())
}

/// Resolve `text` against the dictionary and print the rendered preview
pub async fn lookup(state: &AppState, text: &str) -> anyhow::Result<()> {
    let settings = state.settings.load().await?;
    let generator = CandidateGenerator::new(state.config.read().await.lookup);

    let pipeline = PreviewPipeline::new(state.dictionary.clone(), generator);
    let preview = pipeline.render(&settings, text).await?;

    match preview.head {
        Some(head) => {
            println!("{head}");
            println!("{}", preview.html);
        }
        None => println!("{NO_DEFINITION}"),
    }
    Ok(())
}

pub async fn show_settings(state: &AppState) -> anyhow::Result<()> {
    let settings = state.settings.load().await?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Apply one command to the saved settings and save them back
pub async fn update_settings(state: &AppState, command: SettingsCommand) -> anyhow::Result<()> {
    let mut settings = state.settings.load().await?;
    settings.apply(command)?;
    state.settings.save(&settings).await?;
    println!("Settings saved");
    Ok(())
}

pub async fn set_option(state: &AppState, name: &str, raw: &str) -> anyhow::Result<()> {
    let value = Settings::default().parse_option(name, raw)?;
    update_settings(
        state,
        SettingsCommand::UpdateOption {
            name: name.to_string(),
            value,
        },
    )
    .await
}

pub async fn set_rule(state: &AppState, index: usize, field: &str, value: &str) -> anyhow::Result<()> {
    let field = field.parse::<RuleField>().map_err(anyhow::Error::msg)?;
    update_settings(
        state,
        SettingsCommand::UpdateRule {
            index,
            field,
            value: unescape(value),
        },
    )
    .await
}

/// Interactive preview: commands on stdin, one rendered preview per line on stdout
pub async fn preview(state: Arc<AppState>) -> anyhow::Result<()> {
    let settings = state.settings.load().await?;
    let (generator, delay, trial_text) = {
        let config = state.config.read().await;
        (
            CandidateGenerator::new(config.lookup),
            Duration::from_millis(config.preview.delay_ms),
            config.preview.trial_text.clone(),
        )
    };

    let pipeline = PreviewPipeline::new(state.dictionary.clone(), generator);
    let session = PreviewSession::new(pipeline, settings, trial_text, delay);

    let controller = AppController::new(state);
    let tasks = controller.spawn_tasks(
        session,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    let ctrl_c = controller.sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c.send(AppEvent::Shutdown).await;
        }
    });

    run_until_done(&controller, tasks).await
}
