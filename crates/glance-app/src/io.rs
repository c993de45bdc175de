use anyhow::{Context, bail};
use glance_config::Settings;
use glance_types::{AppEvent, RuleField, SettingsCommand};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Parse one line of the interactive preview protocol.
///
/// `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> anyhow::Result<Option<AppEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let event = match verb {
        "text" => AppEvent::TrialText(rest.to_string()),
        "set" => {
            let (name, raw) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                bail!("usage: set <NAME> <VALUE>");
            }
            // Option types never change, so the defaults are enough to parse against
            let value = Settings::default().parse_option(name, raw.trim())?;
            AppEvent::Settings(SettingsCommand::UpdateOption {
                name: name.to_string(),
                value,
            })
        }
        "add-rule" => AppEvent::Settings(SettingsCommand::AddRule),
        "set-rule" => {
            let index = args.next().context("usage: set-rule <I> <search|replace> <VALUE>")?;
            let field = args.next().context("usage: set-rule <I> <search|replace> <VALUE>")?;
            // Everything after the field, inner spaces included
            let value = rest[index.len()..].trim_start()[field.len()..].trim_start();
            AppEvent::Settings(SettingsCommand::UpdateRule {
                index: index.parse().context("rule index")?,
                field: field.parse::<RuleField>().map_err(anyhow::Error::msg)?,
                value: unescape(value),
            })
        }
        "move-rule" => {
            let index = args.next().context("usage: move-rule <I> <OFFSET>")?;
            let offset = args.next().context("usage: move-rule <I> <OFFSET>")?;
            AppEvent::Settings(SettingsCommand::MoveRule {
                index: index.parse().context("rule index")?,
                offset: offset.parse().context("rule offset")?,
            })
        }
        "remove-rule" => {
            let index = args.next().context("usage: remove-rule <I>")?;
            AppEvent::Settings(SettingsCommand::RemoveRule {
                index: index.parse().context("rule index")?,
            })
        }
        "reset" => AppEvent::Settings(SettingsCommand::ResetToDefaults),
        "save" => AppEvent::SaveSettings,
        "quit" | "exit" => AppEvent::Shutdown,
        other => bail!("unknown command: {other}"),
    };

    Ok(Some(event))
}

/// `\n` in a typed rule value means a line break
pub fn unescape(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// Feed commands read from `reader` into the event loop until EOF or cancellation
pub async fn command_reader<R>(
    reader: R,
    event_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Command reader stopping");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::debug!("Input closed");
            break;
        };

        match parse_command(&line) {
            Ok(Some(event)) => {
                let shutdown = matches!(event, AppEvent::Shutdown);
                event_tx.send(event).await?;
                if shutdown {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{e:#}"),
        }
    }

    event_tx.send(AppEvent::Shutdown).await?;
    Ok(())
}

/// Line written for the empty placeholder preview
pub const NO_DEFINITION: &str = "(no definition)";

/// Print every rendered preview, one per line. Queued previews are still
/// written after cancellation.
pub async fn preview_writer<W>(
    preview_rx: AsyncReceiver<AppEvent>,
    mut output: W,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = preview_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => break,
            },
        };
        write_preview(&mut output, event).await?;
    }

    while let Ok(Some(event)) = preview_rx.try_recv() {
        write_preview(&mut output, event).await?;
    }
    output.flush().await?;
    Ok(())
}

async fn write_preview<W>(output: &mut W, event: AppEvent) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let AppEvent::ShowPreview(preview) = event else {
        return Ok(());
    };

    let line = if preview.is_empty() {
        NO_DEFINITION
    } else {
        preview.html.as_str()
    };
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
