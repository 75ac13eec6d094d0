//! End-to-end run of one painting: interact, solve the sliding puzzle by
//! undoing its shuffle, and verify the completion is persisted.

use pinacoteca_core::*;
use std::cell::RefCell;
use std::rc::Rc;

const SEED: u64 = 1234;

fn painting_config() -> PaintingConfig {
    let mut params = Params::new();
    params.insert("seed".into(), SEED.into());
    PaintingConfig {
        id: "gallery_sunrise".into(),
        minigame: MinigameType::SlidingPuzzle,
        difficulty: Difficulty::new(3),
        one_shot: true,
        params,
    }
}

/// Reproduces the board the adapter builds for `SEED`, returning the cells
/// each shuffle move slid a tile into. Mirrors the adapter's reshuffle
/// fallback for walks that happen to land back on the solved configuration.
fn replicate_shuffle() -> (SlideBoard, Vec<Coord2>) {
    let config = SlideConfig::for_difficulty(Difficulty::new(3));
    let mut seed = SEED;
    let mut board = SlideBoard::new(config);
    let mut performed = board.shuffle(config.shuffle_moves, seed);
    while board.is_solved() {
        seed = seed.wrapping_add(1);
        performed = board.shuffle(config.shuffle_moves | 1, seed);
    }
    (board, performed)
}

#[test]
fn healing_a_painting_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let progress_path = dir.path().join("progress.json");

    let store = ProgressStore::load(&progress_path);
    assert!(store.is_empty());
    let mut store = store;

    let mut manager = MinigameManager::new();
    let mut painting = Painting::from_progress(painting_config(), &store);
    assert!(painting.state().is_available());

    let results = Rc::new(RefCell::new(Vec::new()));
    let writer = Rc::clone(&results);
    let callback: ResultCallback = Box::new(move |result| writer.borrow_mut().push(result));

    assert_eq!(
        painting.interact(&mut manager, callback).unwrap(),
        InteractOutcome::Started
    );
    assert!(painting.state().is_in_progress());
    assert!(manager.paused());

    // Difficulty 3 is the 3x3 board with 8 tiles.
    let (expected, performed) = replicate_shuffle();
    {
        let adapter = manager
            .active_mut()
            .unwrap()
            .as_any_mut()
            .downcast_mut::<SlidingMinigame>()
            .unwrap();
        let board = adapter.board().unwrap();
        assert_eq!(board.size(), (3, 3));
        assert_eq!(board.total_tiles(), 8);
        assert_eq!(*board, expected);

        // Undo the shuffle exactly; the final move reports the win.
        let mut last = MoveOutcome::NoChange;
        for &cell in performed.iter().rev() {
            last = adapter.slide(cell).unwrap();
            if last == MoveOutcome::Won {
                break;
            }
        }
        assert_eq!(last, MoveOutcome::Won);
        assert!(adapter.board().unwrap().is_solved());
    }

    // The win is held behind the cosmetic delay until ticked past it.
    assert_eq!(manager.tick(0.1), None);
    let end = manager.tick(WIN_DELAY).unwrap();
    assert_eq!(end.result, MinigameResult::Win);
    assert_eq!(end.owner_id, "gallery_sunrise");
    assert!(!manager.paused());
    assert_eq!(*results.borrow(), vec![MinigameResult::Win]);

    assert_eq!(
        painting.apply_result(end.result, &mut store),
        ApplyOutcome::Completed
    );
    assert!(painting.state().is_completed());

    store.save(&progress_path).unwrap();

    // A fresh load reports the painting as completed and the painting starts
    // locked.
    let reloaded = ProgressStore::load(&progress_path);
    assert!(reloaded.is_completed("gallery_sunrise"));
    let restored = Painting::from_progress(painting_config(), &reloaded);
    assert!(restored.state().is_completed());

    let mut restored = restored;
    let outcome = restored.interact(&mut manager, Box::new(|_| {})).unwrap();
    assert!(matches!(outcome, InteractOutcome::Blocked { .. }));
}

#[test]
fn cancelling_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let progress_path = dir.path().join("progress.json");

    let mut store = ProgressStore::new();
    let mut manager = MinigameManager::new();
    let mut painting = Painting::from_progress(painting_config(), &store);

    painting.interact(&mut manager, Box::new(|_| {})).unwrap();
    let end = manager.force_close().unwrap();
    assert_eq!(end.result, MinigameResult::Cancel);

    assert_eq!(
        painting.apply_result(end.result, &mut store),
        ApplyOutcome::Available
    );
    assert!(painting.state().is_available());
    assert!(store.is_empty());

    store.save(&progress_path).unwrap();
    assert!(!ProgressStore::load(&progress_path).is_completed("gallery_sunrise"));
}
