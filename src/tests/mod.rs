//! Orchestrator scenario tests.
//!
//! These drive the full orchestrator through the fake microphone and a
//! scripted handler, with the tokio clock paused so the debounce, command
//! timeout, and reinitialization windows are exercised deterministically.

mod support;
