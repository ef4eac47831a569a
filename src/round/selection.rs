//! Input gating and the two-card resolution protocol.
//!
//! Only this module moves cards between states. At most one resolution runs
//! per round because the second card switches the phase to `Resolving`
//! before the reveal delay starts, and nothing joins `pending` until the
//! phase is back to `Running`.

use futures::future::{self, FutureExt};
use tracing::{debug, trace};

use super::card::CardView;
use super::engine::conclude_round;
use super::scoring::Judgement;
use super::services::Services;
use super::state::{CardId, CardState, RoundOutcome, RoundPhase, SharedRound};

pub const PAIR_SIZE: usize = 2;

#[derive(Clone)]
pub struct SelectionController {
    round: SharedRound,
    services: Services,
    reveal_delay: f64,
}

impl SelectionController {
    pub fn new(round: SharedRound, services: Services, reveal_delay: f64) -> Self {
        SelectionController {
            round,
            services,
            reveal_delay,
        }
    }

    pub fn can_accept_input(&self) -> bool {
        self.round.borrow().can_accept_input()
    }

    pub fn request_flip(&self, card_id: CardId) {
        let (generation, view) = {
            let mut st = self.round.borrow_mut();
            if !st.can_accept_input() {
                trace!(%card_id, phase = ?st.phase, "flip ignored, input closed");
                return;
            }
            if st.pending.len() + st.flips_in_flight.len() >= PAIR_SIZE {
                trace!(%card_id, "flip ignored, two cards already in play");
                return;
            }
            let Some(card) = st.card_mut(card_id) else {
                trace!(%card_id, "flip ignored, no such card");
                return;
            };
            if !card.flip_up() {
                trace!(%card_id, state = ?card.state(), "flip ignored, card not face down");
                return;
            }
            let view = card.view();
            st.flips_in_flight.push(card_id);
            (st.generation, view)
        };

        debug!(%card_id, symbol = view.symbol, "card flipped");
        self.services.audio.flip();
        let flip = self.services.visuals.play_flip(view, true);
        let controller = self.clone();
        self.services.scheduler.spawn(
            async move {
                flip.await;
                controller.on_card_flipped_up(generation, card_id);
            }
            .boxed_local(),
        );
    }

    /// Only a completion for a flip still in flight counts. The second
    /// pending card closes input and starts resolution.
    pub fn on_card_flipped_up(&self, generation: u64, card_id: CardId) {
        let pair = {
            let mut st = self.round.borrow_mut();
            if st.generation != generation {
                trace!(%card_id, "flip completed for a discarded round");
                return;
            }
            let Some(slot) = st.flips_in_flight.iter().position(|id| *id == card_id) else {
                trace!(%card_id, "no flip in flight for this card");
                return;
            };
            st.flips_in_flight.swap_remove(slot);
            if !st.can_accept_input() || st.pending.contains(&card_id) {
                trace!(%card_id, "flip completion ignored");
                return;
            }
            if st.card(card_id).map(|card| card.state()) != Some(CardState::FaceUp) {
                return;
            }
            st.pending.push(card_id);
            if st.pending.len() < PAIR_SIZE {
                return;
            }
            st.phase = RoundPhase::Resolving;
            [st.pending[0], st.pending[1]]
        };

        debug!(first = %pair[0], second = %pair[1], "resolving pair");
        let controller = self.clone();
        self.services
            .scheduler
            .spawn(controller.resolve_pair(generation, pair).boxed_local());
    }

    async fn resolve_pair(self, generation: u64, pair: [CardId; PAIR_SIZE]) {
        self.services.scheduler.sleep(self.reveal_delay).await;

        let Some((judgement, [first, second])) = self.judge(generation, pair) else {
            return;
        };

        match judgement {
            Judgement::Match { combo, awarded } => {
                debug!(combo, awarded, "pair matched");
                self.services.audio.matched(combo);
                future::join(
                    self.remove_card(generation, first),
                    self.remove_card(generation, second),
                )
                .await;
            }
            Judgement::Miss { deducted } => {
                debug!(deducted, "pair missed");
                self.services.audio.miss();
                future::join(
                    self.services.visuals.play_flip(first, false),
                    self.services.visuals.play_flip(second, false),
                )
                .await;
            }
        }

        self.finish_resolution(generation);
    }

    /// Decides match or miss and applies score and card transitions in one
    /// step, before any outcome visual starts.
    fn judge(
        &self,
        generation: u64,
        pair: [CardId; PAIR_SIZE],
    ) -> Option<(Judgement, [CardView; PAIR_SIZE])> {
        let mut st = self.round.borrow_mut();
        if st.generation != generation {
            return None;
        }
        let [first, second] = pair;
        let first_symbol = st.card(first)?.symbol();
        let second_symbol = st.card(second)?.symbol();
        let matched = first_symbol == second_symbol;
        let judgement = st.tally.judge(matched);
        for id in pair {
            if let Some(card) = st.card_mut(id) {
                if matched {
                    card.resolve_as_match();
                } else {
                    card.resolve_as_miss();
                }
            }
        }
        let first_view = st.card(first)?.view();
        let second_view = st.card(second)?.view();
        Some((judgement, [first_view, second_view]))
    }

    async fn remove_card(&self, generation: u64, card: CardView) {
        self.services.visuals.play_removal(card).await;
        let mut st = self.round.borrow_mut();
        if st.generation != generation {
            return;
        }
        if let Some(slot) = st.card_mut(card.id) {
            slot.complete_removal();
        }
    }

    fn finish_resolution(&self, generation: u64) {
        let outcome = {
            let mut st = self.round.borrow_mut();
            if st.generation != generation {
                return;
            }
            st.pending.clear();
            if st.all_removed() {
                Some(RoundOutcome::Win)
            } else if st.clock.is_expired() {
                Some(RoundOutcome::Timeout)
            } else {
                st.phase = RoundPhase::Running;
                None
            }
        };
        if let Some(outcome) = outcome {
            conclude_round(&self.round, &self.services, outcome);
        }
    }
}
