use serde::Serialize;

pub const MATCH_POINTS: u32 = 100;
pub const MISS_PENALTY: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgement {
    Match { combo: u32, awarded: u32 },
    Miss { deducted: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    pub score: u32,
    pub combo: u32,
    pub matches: u32,
    pub misses: u32,
}

impl ScoreTally {
    pub fn judge(&mut self, matched: bool) -> Judgement {
        if matched {
            self.apply_match()
        } else {
            self.apply_miss()
        }
    }

    /// The streak grows first, so the first match of a streak is worth 100,
    /// the second 200, and so on.
    pub fn apply_match(&mut self) -> Judgement {
        self.combo = self.combo.saturating_add(1);
        self.matches = self.matches.saturating_add(1);
        let awarded = MATCH_POINTS.saturating_mul(self.combo);
        self.score = self.score.saturating_add(awarded);
        Judgement::Match {
            combo: self.combo,
            awarded,
        }
    }

    pub fn apply_miss(&mut self) -> Judgement {
        self.combo = 0;
        self.misses = self.misses.saturating_add(1);
        let deducted = self.score.min(MISS_PENALTY);
        self.score -= deducted;
        Judgement::Miss { deducted }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn streak_scales_the_reward() {
        let mut tally = ScoreTally::default();
        assert_eq!(
            tally.apply_match(),
            Judgement::Match {
                combo: 1,
                awarded: 100
            }
        );
        assert_eq!(
            tally.apply_match(),
            Judgement::Match {
                combo: 2,
                awarded: 200
            }
        );
        assert_eq!(tally.score, 300);
        assert_eq!(tally.matches, 2);
    }

    #[test]
    fn miss_resets_combo_and_charges_penalty() {
        let mut tally = ScoreTally::default();
        tally.apply_match();
        assert_eq!(tally.apply_miss(), Judgement::Miss { deducted: 20 });
        assert_eq!(tally.score, 80);
        assert_eq!(tally.combo, 0);

        assert_eq!(
            tally.apply_match(),
            Judgement::Match {
                combo: 1,
                awarded: 100
            }
        );
        assert_eq!(tally.score, 180);
    }

    #[test]
    fn miss_penalty_clamps_at_zero() {
        let mut tally = ScoreTally {
            score: 10,
            combo: 3,
            ..ScoreTally::default()
        };
        assert_eq!(tally.judge(false), Judgement::Miss { deducted: 10 });
        assert_eq!(tally.score, 0);
        assert_eq!(tally.judge(false), Judgement::Miss { deducted: 0 });
        assert_eq!(tally.score, 0);
        assert_eq!(tally.misses, 2);
    }

    proptest! {
        #[test]
        fn score_matches_the_replayed_rules(
            events in proptest::collection::vec(any::<bool>(), 0..200)
        ) {
            let mut tally = ScoreTally::default();
            let mut expected: i64 = 0;
            let mut combo: i64 = 0;
            for matched in events {
                tally.judge(matched);
                if matched {
                    combo += 1;
                    expected += 100 * combo;
                } else {
                    combo = 0;
                    expected = (expected - 20).max(0);
                }
                prop_assert_eq!(i64::from(tally.score), expected);
                prop_assert_eq!(i64::from(tally.combo), combo);
            }
        }
    }
}
