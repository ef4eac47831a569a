use serde::Serialize;

use super::state::{CardId, CardState, SymbolId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub symbol: SymbolId,
    pub state: CardState,
}

/// One grid slot. Knows only its own visibility; every rule about when a
/// transition may happen lives in the selection controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    symbol: SymbolId,
    state: CardState,
}

impl Card {
    pub fn new(id: CardId, symbol: SymbolId) -> Self {
        Card {
            id,
            symbol,
            state: CardState::FaceDown,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn view(&self) -> CardView {
        CardView {
            id: self.id,
            symbol: self.symbol,
            state: self.state,
        }
    }

    /// FaceDown -> FaceUp. Returns false (and changes nothing) from any other state.
    pub fn flip_up(&mut self) -> bool {
        self.transition(CardState::FaceDown, CardState::FaceUp)
    }

    pub fn resolve_as_match(&mut self) -> bool {
        self.transition(CardState::FaceUp, CardState::Matched)
    }

    pub fn resolve_as_miss(&mut self) -> bool {
        self.transition(CardState::FaceUp, CardState::FaceDown)
    }

    pub fn complete_removal(&mut self) -> bool {
        self.transition(CardState::Matched, CardState::Removed)
    }

    fn transition(&mut self, from: CardState, to: CardState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card::new(CardId(3), 1)
    }

    #[test]
    fn starts_face_down() {
        let card = card();
        assert_eq!(card.state(), CardState::FaceDown);
        assert_eq!(card.view().id, CardId(3));
        assert_eq!(card.symbol(), 1);
    }

    #[test]
    fn match_path_ends_removed() {
        let mut card = card();
        assert!(card.flip_up());
        assert!(card.resolve_as_match());
        assert!(!card.flip_up());
        assert!(card.complete_removal());
        assert_eq!(card.state(), CardState::Removed);

        assert!(!card.flip_up());
        assert!(!card.resolve_as_miss());
        assert!(!card.resolve_as_match());
        assert!(!card.complete_removal());
        assert_eq!(card.state(), CardState::Removed);
    }

    #[test]
    fn miss_path_returns_face_down() {
        let mut card = card();
        assert!(card.flip_up());
        assert!(!card.flip_up());
        assert!(card.resolve_as_miss());
        assert_eq!(card.state(), CardState::FaceDown);
        assert!(card.flip_up());
    }

    #[test]
    fn undefined_edges_are_no_ops() {
        let mut card = card();
        assert!(!card.resolve_as_match());
        assert!(!card.resolve_as_miss());
        assert!(!card.complete_removal());
        assert_eq!(card.state(), CardState::FaceDown);

        card.flip_up();
        assert!(!card.complete_removal());
        assert_eq!(card.state(), CardState::FaceUp);
    }
}
