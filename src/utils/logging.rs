//! Logging utilities for the application
//!
//! Logs go to stderr so that command output on stdout (verdicts, lists) stays
//! machine readable. The level comes from `RUST_LOG` when set, otherwise from
//! the directive passed by the caller.
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default directive when `RUST_LOG` is not set
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

type SetupResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Setup logging to stderr for the application
pub fn setup_logging(default_directive: &str) -> SetupResult {
	setup_logging_with_writer(std::io::stderr, default_directive)
}

/// Setup logging with a custom writer
///
/// Fails if a global subscriber has already been installed.
pub fn setup_logging_with_writer<W>(writer: W, default_directive: &str) -> SetupResult
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let ansi = std::env::var_os("NO_COLOR").is_none();
	subscriber_with_writer(writer, env_filter(default_directive), ansi).try_init()?;
	Ok(())
}

/// The compact formatter stack, without installing it globally
pub fn subscriber_with_writer<W>(
	writer: W,
	filter: EnvFilter,
	ansi: bool,
) -> impl tracing::Subscriber + Send + Sync
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry().with(filter).with(
		fmt::layer()
			.with_writer(writer)
			.event_format(
				fmt::format()
					.with_level(true)
					.with_target(true)
					.with_thread_ids(false)
					.with_thread_names(false)
					.with_ansi(ansi)
					.compact(),
			)
			.fmt_fields(fmt::format::PrettyFields::new()),
	)
}
