//! Headless round runner: plays rounds with a bot that remembers every card
//! it has seen, on virtual time, and prints each round's summary.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tracing::{debug, error, info};

use recall_round::RecallError;
use recall_round::round::{
    AudioCues, CardId, CardState, DelayedVisuals, GameConfig, GridPreset, JsonFileStore,
    ManualScheduler, Round, RoundPhase, RoundSummary, Scheduler, Services, SymbolId,
};
use recall_round::telemetry::init_tracing;

const STEP_SECS: f64 = 0.1;
const FLIP_VISUAL_SECS: f64 = 0.2;
const REMOVAL_VISUAL_SECS: f64 = 0.25;

#[derive(Parser)]
#[command(name = "recall-round")]
#[command(about = "Play memory-matching rounds headlessly")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid preset: easy, normal, hard or expert
    #[arg(long)]
    preset: Option<String>,

    #[arg(long)]
    rows: Option<u32>,

    #[arg(long)]
    cols: Option<u32>,

    /// Starting time in seconds
    #[arg(long)]
    time: Option<f64>,

    /// Shuffle seed for reproducible decks
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds to play back to back
    #[arg(short, long, default_value = "1")]
    rounds: u32,

    /// Where the best score lives
    #[arg(long)]
    best_score_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

struct TracingAudio;

impl AudioCues for TracingAudio {
    fn flip(&self) {
        debug!(cue = "flip", "audio");
    }

    fn matched(&self, combo: u32) {
        debug!(cue = "match", combo, "audio");
    }

    fn miss(&self) {
        debug!(cue = "miss", "audio");
    }

    fn game_over(&self) {
        debug!(cue = "game_over", "audio");
    }
}

/// Remembers the symbol of every card it has seen face up and pairs them as
/// soon as it knows both positions.
#[derive(Default)]
struct MemoryBot {
    seen: HashMap<CardId, SymbolId>,
}

impl MemoryBot {
    fn observe(&mut self, round: &Round) {
        for card in round.cards() {
            match card.state {
                CardState::FaceUp => {
                    self.seen.insert(card.id, card.symbol);
                }
                CardState::Matched | CardState::Removed => {
                    self.seen.remove(&card.id);
                }
                CardState::FaceDown => {}
            }
        }
    }

    fn next_pick(&self, round: &Round) -> Option<CardId> {
        let cards = round.cards();
        let pending = round.pending();
        let in_flight = cards
            .iter()
            .any(|card| card.state == CardState::FaceUp && !pending.contains(&card.id));
        if in_flight || pending.len() >= 2 {
            return None;
        }

        let face_down: Vec<CardId> = cards
            .iter()
            .filter(|card| card.state == CardState::FaceDown)
            .map(|card| card.id)
            .collect();
        let known = |symbol: SymbolId| {
            face_down
                .iter()
                .copied()
                .find(|id| self.seen.get(id) == Some(&symbol))
        };
        let unknown = face_down.iter().copied().find(|id| !self.seen.contains_key(id));

        match pending.first() {
            Some(first) => {
                let symbol = self.seen.get(first).copied();
                symbol
                    .and_then(known)
                    .or(unknown)
                    .or_else(|| face_down.first().copied())
            }
            None => self
                .known_pair(&face_down)
                .or(unknown)
                .or_else(|| face_down.first().copied()),
        }
    }

    fn known_pair(&self, face_down: &[CardId]) -> Option<CardId> {
        let mut first_seen: HashMap<SymbolId, CardId> = HashMap::new();
        for id in face_down {
            let Some(symbol) = self.seen.get(id) else {
                continue;
            };
            if first_seen.contains_key(symbol) {
                return first_seen.get(symbol).copied();
            }
            first_seen.insert(*symbol, *id);
        }
        None
    }
}

fn build_config(args: &Args) -> Result<GameConfig, RecallError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(preset) = args.preset.as_deref().and_then(GridPreset::from_name) {
        let (rows, cols) = preset.geometry();
        config.rows = rows;
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(time) = args.time {
        config.starting_time_secs = time;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.best_score_file.is_some() {
        config.best_score_path = args.best_score_file.clone();
    }
    Ok(config)
}

fn play_round(round: &Round, scheduler: &ManualScheduler) -> Option<RoundSummary> {
    let mut bot = MemoryBot::default();
    while round.phase() != RoundPhase::Ended {
        bot.observe(round);
        if round.can_accept_input()
            && let Some(card) = bot.next_pick(round)
        {
            round.request_flip(card);
        }
        scheduler.run_until_stalled();
        round.tick(STEP_SECS);
        scheduler.advance(STEP_SECS);
    }
    round.summary()
}

fn print_summary(index: u32, summary: &RoundSummary) {
    println!(
        "round {:>3}  {:<7}  score {:>6}  best {:>6}{}  matches {:>3}  misses {:>3}",
        index,
        format!("{:?}", summary.outcome),
        summary.final_score,
        summary.best_score,
        if summary.new_best { " *" } else { "  " },
        summary.matches,
        summary.misses,
    );
}

fn run(args: Args) -> Result<(), RecallError> {
    let config = build_config(&args)?;
    let store = match &config.best_score_path {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_location(),
    };
    info!(path = %store.path().display(), "best score store");

    let scheduler = ManualScheduler::new();
    let shared_scheduler: Rc<dyn Scheduler> = Rc::new(scheduler.clone());
    let services = Services::new(shared_scheduler.clone())
        .with_visuals(Rc::new(DelayedVisuals::new(
            shared_scheduler,
            FLIP_VISUAL_SECS,
            REMOVAL_VISUAL_SECS,
        )))
        .with_audio(Rc::new(TracingAudio))
        .with_best_score(Rc::new(store));

    let round = Round::start(config, services)?;
    for index in 1..=args.rounds.max(1) {
        if index > 1 {
            round.restart();
        }
        if let Some(summary) = play_round(&round, &scheduler) {
            print_summary(index, &summary);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(name) = args.preset.as_deref()
        && GridPreset::from_name(name).is_none()
    {
        error!(preset = name, "unknown preset");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "round failed");
            ExitCode::FAILURE
        }
    }
}
