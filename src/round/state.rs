use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::card::{Card, CardView};
use super::clock::RoundClock;
use super::config::GridGeometry;
use super::scoring::ScoreTally;

pub type SymbolId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CardId(pub usize);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum CardState {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    Running,
    Resolving,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoundOutcome {
    Win,
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub outcome: RoundOutcome,
    pub final_score: u32,
    pub best_score: u32,
    pub new_best: bool,
    pub matches: u32,
    pub misses: u32,
}

pub type SharedRound = Rc<RefCell<RoundState>>;

pub struct RoundState {
    /// Bumped on every restart; deferred work scheduled for an older
    /// generation drops out without touching the new cards.
    pub generation: u64,
    pub geometry: GridGeometry,
    pub deck: Vec<SymbolId>,
    pub cards: Vec<Card>,
    pub pending: Vec<CardId>,
    /// Cards whose flip visual has not reported back yet. Each one holds a
    /// selection slot next to `pending`.
    pub flips_in_flight: Vec<CardId>,
    pub tally: ScoreTally,
    pub clock: RoundClock,
    pub phase: RoundPhase,
    pub best_score: u32,
    pub summary: Option<RoundSummary>,
}

impl RoundState {
    pub fn new(
        generation: u64,
        geometry: GridGeometry,
        deck: Vec<SymbolId>,
        starting_time_secs: f64,
        best_score: u32,
    ) -> Self {
        let cards = deck
            .iter()
            .enumerate()
            .map(|(idx, symbol)| Card::new(CardId(idx), *symbol))
            .collect();
        RoundState {
            generation,
            geometry,
            deck,
            cards,
            pending: Vec::with_capacity(2),
            flips_in_flight: Vec::with_capacity(2),
            tally: ScoreTally::default(),
            clock: RoundClock::new(starting_time_secs),
            phase: RoundPhase::Running,
            best_score,
            summary: None,
        }
    }

    pub fn can_accept_input(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id.0)
    }

    pub fn all_removed(&self) -> bool {
        self.cards
            .iter()
            .all(|card| card.state() == CardState::Removed)
    }

    pub fn views(&self) -> Vec<CardView> {
        self.cards.iter().map(Card::view).collect()
    }
}
