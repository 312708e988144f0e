// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process log output.
//!
//! Every line carries a UTC timestamp, the level and the message:
//!
//! ```text
//! 2025-03-02T10:15:42.118Z [INFO] [*] Listening on port 22
//! 2025-03-02T10:15:47.903Z [INFO] connection{peer=198.51.100.4:50122 port=22}: [+] Connection from 198.51.100.4:50122 on port 22
//! ```
//!
//! Lines go to standard output and are mirrored to an append-only log file.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, warn};
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            &mut writer,
            "{} [{}] ",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            metadata.level()
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber.
///
/// `log_level` is one of trace, debug, info, warn, error. If `log_file` cannot be opened the
/// agent keeps logging to standard output only.
pub fn init(
    log_level: &str,
    log_file: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{log_level}"))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(Formatter)
        .with_ansi(false)
        .with_writer(std::io::stdout);

    let (file_layer, file_error) = match OpenOptions::new().create(true).append(true).open(log_file)
    {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(Formatter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(e) = file_error {
        warn!(
            "Unable to open log file {}: {e}. Logging to stdout only",
            log_file.display()
        );
    }
    Ok(())
}

/// Logs a startup failure to standard error before the global subscriber exists.
pub fn log_startup_error(message: &str) {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_ansi(false)
        .event_format(Formatter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(subscriber, || error!("{message}"));
}
