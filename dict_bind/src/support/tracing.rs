//! Subscriber setup with a level that can change at runtime
//!
//! The library itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`TracingLevel::init`] to log to
//! stderr, filtered by a process-wide level that starts at WARN.

use std::sync::atomic::{AtomicU8, Ordering};

use error_stack::ResultExt;
use strum::{AsRefStr, Display, EnumString};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::error::{Error, Result};

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(TracingLevel::Warn.as_u8());

/// Layer that drops events above the current [`TracingLevel`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicFilter;

impl<S> Layer<S> for DynamicFilter
where
    S: Subscriber,
{
    fn enabled(
        &self,
        metadata: &tracing::Metadata<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        TracingLevel::from(*metadata.level()).as_u8() <= CURRENT_LEVEL.load(Ordering::Relaxed)
    }
}

/// Tracing levels that can be set dynamically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational events
    Info,
    /// Extension and binding decisions
    Debug,
    /// Per-field detail
    Trace,
}

impl From<Level> for TracingLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            Level::TRACE => Self::Trace,
        }
    }
}

impl TracingLevel {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }

    /// Install a stderr subscriber filtered by the current level
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already set.
    pub fn init() -> Result<()> {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);

        Registry::default()
            .with(DynamicFilter)
            .with(stderr_layer)
            .try_init()
            .change_context(Error::failed_to("install tracing subscriber", "already set"))
    }

    /// The current level
    pub fn current() -> Self {
        match CURRENT_LEVEL.load(Ordering::Relaxed) {
            0 => Self::Error,
            2 => Self::Info,
            3 => Self::Debug,
            4 => Self::Trace,
            _ => Self::Warn,
        }
    }

    /// Change the level for every subscriber using [`DynamicFilter`]
    pub fn set(level: Self) {
        CURRENT_LEVEL.store(level.as_u8(), Ordering::Relaxed);
        tracing::info!(level = %level, "Tracing level set");
    }
}
