use rand::Rng;

use super::state::SymbolId;

/// Unshuffled deck for `total` cards: `0, 0, 1, 1, ...`. An odd total gets a
/// third copy of the last symbol, not a fresh symbol `pairs`, so the odd card
/// out shares its face with a pair instead of standing alone.
pub fn ordered(total: usize) -> Vec<SymbolId> {
    let pairs = total / 2;
    let mut symbols = Vec::with_capacity(total);
    for symbol in 0..pairs {
        symbols.push(symbol as SymbolId);
        symbols.push(symbol as SymbolId);
    }
    if symbols.len() < total {
        symbols.push(pairs.saturating_sub(1) as SymbolId);
    }
    symbols
}

/// In-place Fisher-Yates: position `i` swaps with a uniform pick from `i..len`.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    let len = items.len();
    for i in 0..len {
        let j = rng.random_range(i..len);
        items.swap(i, j);
    }
}

pub fn build<R: Rng>(rows: u32, cols: u32, rng: &mut R) -> Vec<SymbolId> {
    let mut symbols = ordered(rows as usize * cols as usize);
    shuffle(&mut symbols, rng);
    symbols
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn counts(deck: &[SymbolId]) -> BTreeMap<SymbolId, usize> {
        let mut counts = BTreeMap::new();
        for symbol in deck {
            *counts.entry(*symbol).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn even_grids_pair_every_symbol() {
        let mut rng = StdRng::seed_from_u64(11);
        let deck = build(4, 6, &mut rng);
        assert_eq!(deck.len(), 24);
        let counts = counts(&deck);
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|count| *count == 2));
    }

    #[test]
    fn odd_grids_carry_one_triple() {
        let mut rng = StdRng::seed_from_u64(5);
        let deck = build(3, 3, &mut rng);
        assert_eq!(deck.len(), 9);
        let counts = counts(&deck);
        assert_eq!(counts.values().filter(|count| **count == 3).count(), 1);
        assert_eq!(counts.values().filter(|count| **count == 2).count(), 3);
    }

    #[test]
    fn single_card_grid_still_fills() {
        assert_eq!(ordered(1), vec![0]);
        assert_eq!(ordered(0), Vec::<SymbolId>::new());
    }

    #[test]
    fn shuffle_keeps_the_multiset() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut deck = ordered(16);
        shuffle(&mut deck, &mut rng);
        let mut sorted = deck.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, ordered(16));
    }

    #[test]
    fn same_seed_same_deck() {
        let a = build(4, 4, &mut StdRng::seed_from_u64(42));
        let b = build(4, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn every_position_is_equally_likely() {
        const TRIALS: usize = 8000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits = [[0usize; 4]; 4];
        for _ in 0..TRIALS {
            let mut items = [0usize, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            for (position, item) in items.iter().enumerate() {
                hits[position][*item] += 1;
            }
        }
        let expected = TRIALS / 4;
        for row in hits {
            for count in row {
                assert!(
                    count.abs_diff(expected) < expected / 10,
                    "position frequency {count} too far from {expected}"
                );
            }
        }
    }
}
