//! Round engine for a memory-matching pairs game: deck dealing, the card
//! state machine, two-card selection and resolution, scoring, the countdown
//! and best-score persistence. Rendering and sound stay outside and are
//! reached through the traits in [`round::services`].

pub mod error;
pub mod round;
pub mod telemetry;

pub use error::{ConfigError, RecallError, StoreError};
pub use round::{GameConfig, Round, Services};
