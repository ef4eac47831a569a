use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use futures::future::FutureExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::card::CardView;
use super::clock::ClockTick;
use super::config::{GameConfig, GridGeometry};
use super::deck;
use super::selection::SelectionController;
use super::services::{InputEvent, InputReceiver, InputSender, Services, input_channel};
use super::state::{
    CardId, RoundOutcome, RoundPhase, RoundState, RoundSummary, SharedRound, SymbolId,
};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub score: u32,
    pub combo: u32,
    pub time_remaining: f64,
    pub time_label: String,
    pub phase: RoundPhase,
    pub summary: Option<RoundSummary>,
}

/// A running game. Owns the cards through its shared [`RoundState`];
/// restarting swaps in a fresh state and a new deck.
pub struct Round {
    shared: SharedRound,
    controller: SelectionController,
    services: Services,
    input: InputSender,
    config: GameConfig,
    geometry: GridGeometry,
    rng: RefCell<StdRng>,
}

impl Round {
    /// Validates the config, reads the best score and deals the first deck.
    /// Nothing is created when validation fails.
    pub fn start(config: GameConfig, services: Services) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let state = fresh_state(1, geometry, &config, &services, &mut rng);
        let shared = Rc::new(RefCell::new(state));
        let controller =
            SelectionController::new(shared.clone(), services.clone(), config.reveal_delay_secs);

        let (input, events) = input_channel();
        services
            .scheduler
            .spawn(pump_input(controller.clone(), events).boxed_local());

        info!(
            rows = geometry.rows,
            cols = geometry.cols,
            time = config.starting_time_secs,
            "round started"
        );

        Ok(Round {
            shared,
            controller,
            services,
            input,
            config,
            geometry,
            rng: RefCell::new(rng),
        })
    }

    pub fn restart(&self) {
        let generation = self.shared.borrow().generation.wrapping_add(1);
        let state = {
            let mut rng = self.rng.borrow_mut();
            fresh_state(
                generation,
                self.geometry,
                &self.config,
                &self.services,
                &mut rng,
            )
        };
        *self.shared.borrow_mut() = state;
        info!(generation, "round restarted");
    }

    pub fn input(&self) -> InputSender {
        self.input.clone()
    }

    pub fn request_flip(&self, card: CardId) -> bool {
        self.input.request_flip(card)
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn can_accept_input(&self) -> bool {
        self.controller.can_accept_input()
    }

    /// Advances the countdown. Expiry while a pair is being judged is left for
    /// the resolution to pick up once its score is applied.
    pub fn tick(&self, dt: f64) {
        let outcome = {
            let mut st = self.shared.borrow_mut();
            if st.phase == RoundPhase::Ended {
                return;
            }
            match st.clock.tick(dt) {
                ClockTick::Expired if st.phase == RoundPhase::Running => {
                    Some(RoundOutcome::Timeout)
                }
                ClockTick::Expired => {
                    debug!("clock expired mid-resolution, ending after the pair settles");
                    None
                }
                ClockTick::Running | ClockTick::Idle => None,
            }
        };
        if let Some(outcome) = outcome {
            conclude_round(&self.shared, &self.services, outcome);
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.shared.borrow().phase
    }

    pub fn generation(&self) -> u64 {
        self.shared.borrow().generation
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn deck(&self) -> Vec<SymbolId> {
        self.shared.borrow().deck.clone()
    }

    pub fn cards(&self) -> Vec<CardView> {
        self.shared.borrow().views()
    }

    pub fn pending(&self) -> Vec<CardId> {
        self.shared.borrow().pending.clone()
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        self.shared.borrow().summary
    }

    pub fn display(&self) -> DisplaySnapshot {
        let st = self.shared.borrow();
        DisplaySnapshot {
            score: st.tally.score,
            combo: st.tally.combo,
            time_remaining: st.clock.remaining(),
            time_label: st.clock.label(),
            phase: st.phase,
            summary: st.summary,
        }
    }
}

fn fresh_state(
    generation: u64,
    geometry: GridGeometry,
    config: &GameConfig,
    services: &Services,
    rng: &mut StdRng,
) -> RoundState {
    let best_score = services.best_score.read_best_score();
    let deck = deck::build(geometry.rows, geometry.cols, rng);
    debug!(generation, best_score, cards = deck.len(), "dealt deck");
    RoundState::new(
        generation,
        geometry,
        deck,
        config.starting_time_secs,
        best_score,
    )
}

async fn pump_input(controller: SelectionController, mut events: InputReceiver) {
    while let Some(event) = events.next().await {
        match event {
            InputEvent::FlipRequested(card) => controller.request_flip(card),
        }
    }
    debug!("input channel closed");
}

/// Round-end handling shared by the win and timeout paths: closes the round,
/// persists a beaten best score and records the summary.
pub(crate) fn conclude_round(round: &SharedRound, services: &Services, outcome: RoundOutcome) {
    let (tally, previous_best) = {
        let mut st = round.borrow_mut();
        if st.summary.is_some() {
            return;
        }
        st.phase = RoundPhase::Ended;
        st.pending.clear();
        st.flips_in_flight.clear();
        (st.tally, st.best_score)
    };

    let new_best = tally.score > previous_best;
    if new_best && let Err(err) = services.best_score.write_best_score(tally.score) {
        warn!(error = %err, score = tally.score, "failed to persist best score");
    }

    let summary = RoundSummary {
        outcome,
        final_score: tally.score,
        best_score: previous_best.max(tally.score),
        new_best,
        matches: tally.matches,
        misses: tally.misses,
    };
    {
        let mut st = round.borrow_mut();
        st.best_score = summary.best_score;
        st.summary = Some(summary);
    }
    services.audio.game_over();
    info!(
        ?outcome,
        score = summary.final_score,
        best = summary.best_score,
        new_best,
        "round ended"
    );
}
