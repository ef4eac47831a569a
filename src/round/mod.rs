pub mod best_score;
pub mod card;
pub mod clock;
pub mod config;
pub mod deck;
pub mod engine;
#[cfg(feature = "glib")]
pub mod glib_runtime;
pub mod runtime;
pub mod scoring;
pub mod selection;
pub mod services;
pub mod state;

pub use best_score::{BestScoreStore, JsonFileStore, MemoryStore};
pub use card::{Card, CardView};
pub use config::{GameConfig, GridGeometry, GridPreset, OddGridPolicy};
pub use engine::{DisplaySnapshot, Round};
pub use runtime::ManualScheduler;
pub use selection::SelectionController;
pub use services::{
    AudioCues, CardVisuals, Completion, DelayedVisuals, InputEvent, InputSender, InstantVisuals,
    Scheduler, Services, Silent,
};
pub use state::{CardId, CardState, RoundOutcome, RoundPhase, RoundSummary, SymbolId};
