// State management module.
// Hosts the orchestration state machine that drives searches.

pub mod orchestrator;

pub use orchestrator::{
    BOOTSTRAP_TERM, DEBOUNCE_WINDOW, DEFAULT_PER_PAGE, Intent, MAX_RESULT_WINDOW, Phase,
    SearchOrchestrator, ViewState,
};
