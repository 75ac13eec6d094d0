use std::any::Any;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::*;

/// Extra setup parameters, passed through to a variant untouched.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Delay between solving a puzzle and the adapter reporting Win, so a
/// completion effect can play. Cosmetic; `skip_win_delay` bypasses it.
pub const WIN_DELAY: f32 = 0.5;

/// Uniform contract every puzzle variant is wrapped behind: set up once,
/// then signal exactly one of Win, Lose or Cancel.
pub trait Minigame: Any {
    fn kind(&self) -> MinigameType;

    fn setup(&mut self, owner_id: &str, difficulty: Difficulty, params: &Params) -> Result<()>;

    /// Advances cosmetic timers; `dt` is in the same units as [`WIN_DELAY`].
    fn tick(&mut self, dt: f32);

    /// Requests cancellation; accepted at any point, takes effect immediately.
    fn cancel(&mut self);

    /// Collapses a pending win delay, for headless callers that do not play
    /// the completion effect.
    fn skip_win_delay(&mut self);

    /// Terminal result, once the run has ended.
    fn result(&self) -> Option<MinigameResult>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Terminal-result bookkeeping shared by all adapters. Guarantees a single
/// resolution: once `done` is set it never changes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Finisher {
    pending_win: Option<f32>,
    done: Option<MinigameResult>,
}

impl Finisher {
    fn win_after(&mut self, delay: f32) {
        if self.done.is_none() && self.pending_win.is_none() {
            self.pending_win = Some(delay);
        }
    }

    /// Immediate resolution. Cancel wins the race against a pending win.
    fn resolve(&mut self, result: MinigameResult) {
        if self.done.is_none() {
            self.pending_win = None;
            self.done = Some(result);
        }
    }

    fn tick(&mut self, dt: f32) {
        if self.done.is_some() {
            return;
        }
        if let Some(remaining) = &mut self.pending_win {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.pending_win = None;
                self.done = Some(MinigameResult::Win);
            }
        }
    }

    fn skip_delay(&mut self) {
        if self.pending_win.take().is_some() {
            self.done = Some(MinigameResult::Win);
        }
    }

    fn result(self) -> Option<MinigameResult> {
        self.done
    }

    fn check_running(self) -> Result<()> {
        if self.done.is_some() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

/// Seed for a session: an explicit `"seed"` parameter when present,
/// otherwise derived from the owning painting's id.
fn session_seed(owner_id: &str, params: &Params) -> u64 {
    if let Some(seed) = params.get("seed").and_then(serde_json::Value::as_u64) {
        return seed;
    }
    let mut hasher = DefaultHasher::new();
    owner_id.hash(&mut hasher);
    hasher.finish()
}

/// Sliding-tile puzzle behind the uniform contract.
#[derive(Clone, Debug, Default)]
pub struct SlidingMinigame {
    board: Option<SlideBoard>,
    finisher: Finisher,
}

impl SlidingMinigame {
    pub fn board(&self) -> Option<&SlideBoard> {
        self.board.as_ref()
    }

    pub fn slide(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        self.finisher.check_running()?;
        let board = self.board.as_mut().ok_or(GameError::NotReady)?;
        let outcome = board.slide(coords)?;
        if outcome == MoveOutcome::Won {
            self.finisher.win_after(WIN_DELAY);
        }
        Ok(outcome)
    }

    /// Developer cheat passthrough, see [`SlideBoard::debug_swap`].
    pub fn debug_swap(&mut self, a: Coord2, b: Coord2) -> Result<MoveOutcome> {
        self.finisher.check_running()?;
        let board = self.board.as_mut().ok_or(GameError::NotReady)?;
        let outcome = board.debug_swap(a, b)?;
        if outcome == MoveOutcome::Won {
            self.finisher.win_after(WIN_DELAY);
        }
        Ok(outcome)
    }
}

impl Minigame for SlidingMinigame {
    fn kind(&self) -> MinigameType {
        MinigameType::SlidingPuzzle
    }

    fn setup(&mut self, owner_id: &str, difficulty: Difficulty, params: &Params) -> Result<()> {
        let config = SlideConfig::for_difficulty(difficulty);
        let mut seed = session_seed(owner_id, params);
        let mut board = SlideBoard::new(config);
        board.shuffle(config.shuffle_moves, seed);
        // A short random walk can land back on the solved configuration;
        // reshuffle until it does not.
        while board.is_solved() {
            seed = seed.wrapping_add(1);
            board.shuffle(config.shuffle_moves | 1, seed);
        }
        self.board = Some(board);
        self.finisher = Finisher::default();
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.finisher.tick(dt);
    }

    fn cancel(&mut self) {
        self.finisher.resolve(MinigameResult::Cancel);
    }

    fn skip_win_delay(&mut self) {
        self.finisher.skip_delay();
    }

    fn result(&self) -> Option<MinigameResult> {
        self.finisher.result()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Sequence-memory game behind the uniform contract.
#[derive(Clone, Debug, Default)]
pub struct SequenceMinigame {
    game: Option<SequenceGame>,
    finisher: Finisher,
}

impl SequenceMinigame {
    pub fn game(&self) -> Option<&SequenceGame> {
        self.game.as_ref()
    }

    pub fn press(&mut self, key: u8) -> Result<PressOutcome> {
        self.finisher.check_running()?;
        let game = self.game.as_mut().ok_or(GameError::NotReady)?;
        let outcome = game.press(key)?;
        if outcome == PressOutcome::Won {
            self.finisher.win_after(WIN_DELAY);
        }
        Ok(outcome)
    }
}

impl Minigame for SequenceMinigame {
    fn kind(&self) -> MinigameType {
        MinigameType::SequenceMemory
    }

    fn setup(&mut self, owner_id: &str, difficulty: Difficulty, params: &Params) -> Result<()> {
        let seed = session_seed(owner_id, params);
        self.game = Some(SequenceGame::for_difficulty(difficulty, seed));
        self.finisher = Finisher::default();
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.finisher.tick(dt);
    }

    fn cancel(&mut self) {
        self.finisher.resolve(MinigameResult::Cancel);
    }

    fn skip_win_delay(&mut self) {
        self.finisher.skip_delay();
    }

    fn result(&self) -> Option<MinigameResult> {
        self.finisher.result()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fragment-snap puzzle behind the uniform contract.
#[derive(Clone, Debug, Default)]
pub struct FragmentMinigame {
    board: Option<FragmentBoard>,
    finisher: Finisher,
}

impl FragmentMinigame {
    pub fn board(&self) -> Option<&FragmentBoard> {
        self.board.as_ref()
    }

    pub fn grab(&mut self, index: usize) -> Result<GrabOutcome> {
        self.finisher.check_running()?;
        let board = self.board.as_mut().ok_or(GameError::NotReady)?;
        board.grab(index)
    }

    pub fn drag_to(&mut self, position: Point) -> Result<()> {
        self.finisher.check_running()?;
        let board = self.board.as_mut().ok_or(GameError::NotReady)?;
        board.drag_to(position);
        Ok(())
    }

    pub fn release(&mut self, position: Point) -> Result<ReleaseOutcome> {
        self.finisher.check_running()?;
        let board = self.board.as_mut().ok_or(GameError::NotReady)?;
        let outcome = board.release(position)?;
        if outcome == ReleaseOutcome::Won {
            self.finisher.win_after(WIN_DELAY);
        }
        Ok(outcome)
    }
}

impl Minigame for FragmentMinigame {
    fn kind(&self) -> MinigameType {
        MinigameType::FragmentSnap
    }

    fn setup(&mut self, owner_id: &str, difficulty: Difficulty, params: &Params) -> Result<()> {
        let seed = session_seed(owner_id, params);
        self.board = Some(FragmentBoard::for_difficulty(difficulty, seed));
        self.finisher = Finisher::default();
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.finisher.tick(dt);
    }

    fn cancel(&mut self) {
        self.finisher.resolve(MinigameResult::Cancel);
    }

    fn skip_win_delay(&mut self) {
        self.finisher.skip_delay();
    }

    fn result(&self) -> Option<MinigameResult> {
        self.finisher.result()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Adapter that resolves on command; used by manager tests and available to
/// scripted sequences.
#[derive(Clone, Debug, Default)]
pub struct MockMinigame {
    finisher: Finisher,
    ready: bool,
}

impl MockMinigame {
    pub fn resolve(&mut self, result: MinigameResult) {
        if result.is_win() {
            self.finisher.win_after(WIN_DELAY);
        } else {
            self.finisher.resolve(result);
        }
    }

    pub fn resolve_now(&mut self, result: MinigameResult) {
        self.finisher.resolve(result);
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Minigame for MockMinigame {
    fn kind(&self) -> MinigameType {
        MinigameType::Mock
    }

    fn setup(&mut self, _owner_id: &str, _difficulty: Difficulty, _params: &Params) -> Result<()> {
        self.ready = true;
        self.finisher = Finisher::default();
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.finisher.tick(dt);
    }

    fn cancel(&mut self) {
        self.finisher.resolve(MinigameResult::Cancel);
    }

    fn skip_win_delay(&mut self) {
        self.finisher.skip_delay();
    }

    fn result(&self) -> Option<MinigameResult> {
        self.finisher.result()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type Constructor = fn() -> Box<dyn Minigame>;

fn new_mock() -> Box<dyn Minigame> {
    Box::new(MockMinigame::default())
}

fn new_sliding() -> Box<dyn Minigame> {
    Box::new(SlidingMinigame::default())
}

fn new_sequence() -> Box<dyn Minigame> {
    Box::new(SequenceMinigame::default())
}

fn new_fragments() -> Box<dyn Minigame> {
    Box::new(FragmentMinigame::default())
}

// Static type -> constructor table; configuration data, not mutable state.
const REGISTRY: [(MinigameType, Constructor); 4] = [
    (MinigameType::Mock, new_mock),
    (MinigameType::SlidingPuzzle, new_sliding),
    (MinigameType::SequenceMemory, new_sequence),
    (MinigameType::FragmentSnap, new_fragments),
];

pub fn is_registered(kind: MinigameType) -> bool {
    REGISTRY.iter().any(|(key, _)| *key == kind)
}

pub fn construct_minigame(kind: MinigameType) -> Option<Box<dyn Minigame>> {
    REGISTRY
        .iter()
        .find(|(key, _)| *key == kind)
        .map(|(_, constructor)| constructor())
}
