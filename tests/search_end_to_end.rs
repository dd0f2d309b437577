//! End-to-end searches over synthetic discs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use discfind::{
    ChannelObserver, DiscFindError, Matrix2D, SearchConfig, SearchEngine, SearchEvent,
    SearchObserver, SearchResult, SearchState,
};

/// Diameter tolerance relative to the true diameter.
const DIAMETER_TOLERANCE: f32 = 0.10;

/// Center tolerance in pixels.
const CENTER_TOLERANCE_PX: f32 = 3.0;

fn disc(width: usize, height: usize, cx: f32, cy: f32, diameter: f32) -> Matrix2D<i32> {
    let r2 = diameter * diameter / 4.0;
    Matrix2D::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if dx * dx + dy * dy <= r2 {
            220
        } else {
            20
        }
    })
    .unwrap()
}

#[test]
fn finds_disc_on_square_field() {
    let engine = SearchEngine::new(SearchConfig::default()).unwrap();
    let m = disc(256, 256, 128.0, 150.0, 40.0);

    let result = engine.search_blocking(&m).unwrap();
    assert!(
        (result.diameter - 40.0).abs() <= 40.0 * DIAMETER_TOLERANCE,
        "diameter {}",
        result.diameter
    );
    assert!((result.center_x - 128.0).abs() <= CENTER_TOLERANCE_PX);
    assert!((result.center_y - 150.0).abs() <= CENTER_TOLERANCE_PX);
    assert!((result.diameter - result.relative_diameter * 256.0).abs() < 1e-3);
    assert!(result.response > 0);
}

#[test]
fn finds_disc_on_wide_field() {
    let engine = SearchEngine::new(SearchConfig::default()).unwrap();
    let m = disc(200, 160, 70.0, 90.0, 36.0);

    let result = engine.search_blocking(&m).unwrap();
    assert!(
        (result.diameter - 36.0).abs() <= 36.0 * DIAMETER_TOLERANCE,
        "diameter {}",
        result.diameter
    );
    assert!((result.center_x - 70.0).abs() <= CENTER_TOLERANCE_PX);
    assert!((result.center_y - 90.0).abs() <= CENTER_TOLERANCE_PX);
}

#[test]
fn uniform_field_still_publishes_a_result() {
    let (observer, rx) = ChannelObserver::channel();
    let engine = SearchEngine::new(SearchConfig::default())
        .unwrap()
        .with_observer(Arc::new(observer));
    let m = Matrix2D::filled(256, 256, 128).unwrap();

    let result = engine.search_blocking(&m).unwrap();
    // A matched disc of this contrast responds in the hundreds of thousands.
    assert!(result.response.abs() < 66_000, "response {}", result.response);
    assert!(result.relative_diameter > 0.0);

    let events: Vec<SearchEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            SearchEvent::Progress(20),
            SearchEvent::Progress(40),
            SearchEvent::Progress(60),
            SearchEvent::Progress(80),
            SearchEvent::Progress(100),
            SearchEvent::Finished(result),
        ]
    );
}

#[test]
fn second_start_is_rejected_without_disturbing_the_first() {
    let (observer, rx) = ChannelObserver::channel();
    let engine = SearchEngine::new(SearchConfig::default())
        .unwrap()
        .with_observer(Arc::new(observer));
    let m = Arc::new(disc(256, 256, 128.0, 150.0, 40.0));

    let handle = engine.start_search(Arc::clone(&m)).unwrap();
    let err = engine.start_search(Arc::clone(&m)).err().unwrap();
    assert_eq!(err, DiscFindError::SearchActive);

    let result = handle.wait().unwrap();
    assert!((result.diameter - 40.0).abs() <= 40.0 * DIAMETER_TOLERANCE);
    assert_eq!(engine.state(), SearchState::Done(result));
    assert!(!engine.is_search_active());

    let finished: Vec<SearchEvent> = rx
        .try_iter()
        .filter(|event| matches!(event, SearchEvent::Finished(_)))
        .collect();
    assert_eq!(finished, vec![SearchEvent::Finished(result)]);

    // A finished engine accepts a new search.
    let again = engine.start_search(m).unwrap().wait().unwrap();
    assert_eq!(again, result);
}

#[test]
fn parallel_matches_sequential() {
    let m = disc(180, 140, 60.0, 75.0, 30.0);
    let parallel = SearchEngine::new(SearchConfig {
        threads: 3,
        ..SearchConfig::default()
    })
    .unwrap();
    let sequential = SearchEngine::new(SearchConfig {
        parallel: false,
        ..SearchConfig::default()
    })
    .unwrap();

    let a = parallel.search_blocking(&m).unwrap();
    let b = sequential.search_blocking(&m).unwrap();
    assert_eq!(a, b);
}

#[test]
fn too_small_input_is_rejected_up_front() {
    let engine = SearchEngine::new(SearchConfig::default()).unwrap();
    let m = Arc::new(Matrix2D::filled(15, 300, 10).unwrap());
    let err = engine.start_search(m).err().unwrap();
    assert_eq!(
        err,
        DiscFindError::MatrixTooSmall {
            width: 15,
            height: 300,
            min_side: 16,
        }
    );
    assert_eq!(engine.state(), SearchState::Idle);
}

/// Lingers in the first `on_finished` and can park intermediate progress calls.
#[derive(Default)]
struct SlowObserver {
    finished: AtomicUsize,
    hold_progress: AtomicBool,
}

impl SearchObserver for SlowObserver {
    fn on_progress(&self, percent: u8) {
        while percent < 100 && self.hold_progress.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn on_finished(&self, _result: &SearchResult) {
        if self.finished.fetch_add(1, Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(300));
        }
    }
}

#[test]
fn finished_driver_does_not_reset_the_next_search() {
    let observer = Arc::new(SlowObserver::default());
    let engine = SearchEngine::new(SearchConfig {
        iterations: 2,
        intervals: 1,
        ..SearchConfig::default()
    })
    .unwrap()
    .with_observer(observer.clone());
    let m = Arc::new(disc(64, 64, 30.0, 34.0, 16.0));

    let first = engine.start_search(Arc::clone(&m)).unwrap();
    while !matches!(engine.state(), SearchState::Done(_)) {
        thread::sleep(Duration::from_millis(1));
    }

    // The first driver is still inside `on_finished`; the second search parks
    // after its first batch so it stays outstanding.
    observer.hold_progress.store(true, Ordering::SeqCst);
    let second = engine.start_search(Arc::clone(&m));
    first.wait().unwrap();
    let second = second.unwrap();

    assert!(engine.is_search_active());
    assert_eq!(
        engine.start_search(Arc::clone(&m)).err(),
        Some(DiscFindError::SearchActive)
    );

    observer.hold_progress.store(false, Ordering::SeqCst);
    second.wait().unwrap();
    assert!(!engine.is_search_active());
}
