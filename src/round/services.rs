use std::rc::Rc;

use futures::channel::mpsc;
use futures::future::{self, FutureExt, LocalBoxFuture};

use super::best_score::{BestScoreStore, MemoryStore};
use super::card::CardView;
use super::state::CardId;

pub type Completion = LocalBoxFuture<'static, ()>;

pub trait CardVisuals {
    fn play_flip(&self, card: CardView, face_up: bool) -> Completion;
    fn play_removal(&self, card: CardView) -> Completion;
}

/// Fire-and-forget sound cues. Every method defaults to silence.
pub trait AudioCues {
    fn flip(&self) {}
    fn matched(&self, _combo: u32) {}
    fn miss(&self) {}
    fn game_over(&self) {}
}

pub trait Scheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    fn sleep(&self, seconds: f64) -> Completion;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InstantVisuals;

impl CardVisuals for InstantVisuals {
    fn play_flip(&self, _card: CardView, _face_up: bool) -> Completion {
        future::ready(()).boxed_local()
    }

    fn play_removal(&self, _card: CardView) -> Completion {
        future::ready(()).boxed_local()
    }
}

pub struct DelayedVisuals {
    scheduler: Rc<dyn Scheduler>,
    flip_secs: f64,
    removal_secs: f64,
}

impl DelayedVisuals {
    pub fn new(scheduler: Rc<dyn Scheduler>, flip_secs: f64, removal_secs: f64) -> Self {
        DelayedVisuals {
            scheduler,
            flip_secs,
            removal_secs,
        }
    }
}

impl CardVisuals for DelayedVisuals {
    fn play_flip(&self, _card: CardView, _face_up: bool) -> Completion {
        self.scheduler.sleep(self.flip_secs)
    }

    fn play_removal(&self, _card: CardView) -> Completion {
        self.scheduler.sleep(self.removal_secs)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioCues for Silent {}

#[derive(Clone)]
pub struct Services {
    pub scheduler: Rc<dyn Scheduler>,
    pub visuals: Rc<dyn CardVisuals>,
    pub audio: Rc<dyn AudioCues>,
    pub best_score: Rc<dyn BestScoreStore>,
}

impl Services {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Services {
            scheduler,
            visuals: Rc::new(InstantVisuals),
            audio: Rc::new(Silent),
            best_score: Rc::new(MemoryStore::default()),
        }
    }

    pub fn with_visuals(mut self, visuals: Rc<dyn CardVisuals>) -> Self {
        self.visuals = visuals;
        self
    }

    pub fn with_audio(mut self, audio: Rc<dyn AudioCues>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_best_score(mut self, best_score: Rc<dyn BestScoreStore>) -> Self {
        self.best_score = best_score;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    FlipRequested(CardId),
}

pub type InputReceiver = mpsc::UnboundedReceiver<InputEvent>;

/// Write end of the input channel. Cheap to clone; hand one to whatever
/// turns clicks into card ids.
#[derive(Clone, Debug)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl InputSender {
    /// Returns false once the round that owns the channel is gone.
    pub fn request_flip(&self, card: CardId) -> bool {
        self.tx
            .unbounded_send(InputEvent::FlipRequested(card))
            .is_ok()
    }
}

pub fn input_channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (InputSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use futures::executor::block_on;

    use super::super::state::CardState;
    use super::*;

    #[test]
    fn input_channel_delivers_in_order() {
        let (sender, mut receiver) = input_channel();
        assert!(sender.request_flip(CardId(2)));
        assert!(sender.clone().request_flip(CardId(0)));
        drop(sender);

        let events: Vec<InputEvent> = block_on(async {
            let mut events = Vec::new();
            while let Some(event) = receiver.next().await {
                events.push(event);
            }
            events
        });
        assert_eq!(
            events,
            vec![
                InputEvent::FlipRequested(CardId(2)),
                InputEvent::FlipRequested(CardId(0)),
            ]
        );
    }

    #[test]
    fn closed_channel_reports_failure() {
        let (sender, receiver) = input_channel();
        drop(receiver);
        assert!(!sender.request_flip(CardId(1)));
    }

    #[test]
    fn instant_visuals_complete_immediately() {
        let card = CardView {
            id: CardId(0),
            symbol: 0,
            state: CardState::FaceUp,
        };
        block_on(InstantVisuals.play_flip(card, true));
        block_on(InstantVisuals.play_removal(card));
    }
}
