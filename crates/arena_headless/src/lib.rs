//! Headless encounter runner for balance testing and CI verification.
//!
//! This crate wraps [`arena_core`] with everything that touches the outside
//! world:
//!
//! - **Data loading**: template directories and rule files from disk
//! - **Scenarios**: RON files naming both sides, seed and overrides
//! - **Batch runs**: many seeds in parallel, summarized for balance review
//! - **Interactive play**: one side driven over JSON lines
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Decisions from the controller (act, pass, auto, ...)
//! - **stdout**: Events, prompts and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Resolve a scenario and print the log
//! cargo run -p arena_headless -- run --scenario assets/scenarios/crypt_patrol.ron
//!
//! # Play the built-in duel
//! echo '{"cmd":"auto"}' | cargo run -p arena_headless -- play
//! ```

pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod render;
pub mod runner;
pub mod scenario;
pub mod template_loader;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, EncounterMetrics, SideMetrics};
pub use protocol::{Command, Response};
pub use render::CombatLog;
pub use runner::{PlaySession, SessionConfig, SessionEnd};
pub use scenario::{Scenario, ScenarioError};
pub use template_loader::{default_data_dir, load_directory, load_rules, load_templates};
