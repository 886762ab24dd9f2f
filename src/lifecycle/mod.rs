//! Daemon lifecycle: shutdown and reload signals

mod signals;

pub use signals::{ReloadSignal, ShutdownSignal};
