#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;

const FRAME: f64 = 16.66;

/// Recorder collecting every published view state.
fn recorder() -> (Rc<RefCell<Vec<ViewState>>>, UpdateFn) {
    let log: Rc<RefCell<Vec<ViewState>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, Box::new(move |state| sink.borrow_mut().push(state)))
}

fn manager() -> (AnimationManager, Rc<RefCell<Vec<ViewState>>>) {
    let (log, on_update) = recorder();
    (AnimationManager::new(ViewState::default(), on_update), log)
}

/// Tick until the loop settles, returning the number of frames it ran.
fn run_to_rest(manager: &mut AnimationManager) -> usize {
    let mut frames = 0;
    while manager.is_animating() {
        frames += 1;
        assert!(frames <= 1000, "animation failed to settle");
        manager.tick(FRAME * frames as f64);
    }
    frames
}

/// Scheduler logging schedule/cancel calls.
#[derive(Default)]
struct SchedulerLog {
    scheduled: u64,
    canceled: Vec<FrameHandle>,
}

struct TestScheduler {
    log: Rc<RefCell<SchedulerLog>>,
}

impl Scheduler for TestScheduler {
    fn schedule(&mut self) -> FrameHandle {
        let mut log = self.log.borrow_mut();
        log.scheduled += 1;
        FrameHandle(log.scheduled)
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.log.borrow_mut().canceled.push(handle);
    }
}

fn scheduler() -> (Rc<RefCell<SchedulerLog>>, Box<TestScheduler>) {
    let log = Rc::new(RefCell::new(SchedulerLog::default()));
    let test = TestScheduler { log: Rc::clone(&log) };
    (log, Box::new(test))
}

// --- Construction / arming ---

#[test]
fn new_manager_is_at_rest() {
    let (manager, _) = manager();
    assert!(!manager.is_animating());
    assert_eq!(manager.velocity(), Velocity::default());
    assert_eq!(manager.view_state(), ViewState::default());
}

#[test]
fn set_initial_velocity_arms_the_loop() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(10.0, 0.0);
    assert!(manager.is_animating());
    assert_eq!(manager.velocity().x, 10.0);
}

#[test]
fn tick_while_disarmed_is_ignored() {
    let (mut manager, log) = manager();
    assert!(!manager.tick(FRAME));
    assert!(log.borrow().is_empty());
}

// --- Inertial pan ---

#[test]
fn velocity_strictly_decreases_each_frame() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(10.0, 0.0);
    manager.tick(0.0);
    let mut last = manager.velocity().x.abs();
    let mut t = 0.0;
    while manager.is_animating() {
        t += FRAME;
        manager.tick(t);
        let current = manager.velocity().x.abs();
        assert!(current < last || current == 0.0, "velocity did not decrease");
        last = current;
    }
}

#[test]
fn fling_settles_within_expected_frames() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(10.0, 0.0);
    // 10 * 0.92^n < 0.05 at n ≈ 64; allow slack for the zero-delta first
    // frame.
    let frames = run_to_rest(&mut manager);
    assert!(frames >= 60 && frames <= 70, "settled after {frames} frames");
    assert!(!manager.is_animating());
    assert_eq!(manager.velocity(), Velocity::default());
}

#[test]
fn pan_moves_position_by_velocity() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(10.0, -4.0);
    manager.tick(0.0);
    let before = manager.view_state();
    manager.tick(FRAME);
    let after = manager.view_state();
    // One reference frame: moves by the (pre-decay) velocity.
    assert!((after.x - before.x - 10.0).abs() < 1e-9);
    assert!((after.y - before.y + 4.0).abs() < 1e-9);
}

#[test]
fn velocity_scales_with_frame_duration() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(10.0, 0.0);
    manager.tick(0.0);
    let before = manager.view_state();
    // A frame twice as long moves twice as far.
    manager.tick(2.0 * FRAME);
    let after = manager.view_state();
    assert!((after.x - before.x - 20.0).abs() < 1e-9);
}

#[test]
fn publishes_on_every_tick_including_terminal() {
    let (mut manager, log) = manager();
    manager.set_initial_velocity(0.06, 0.0);
    let frames = run_to_rest(&mut manager);
    assert_eq!(log.borrow().len(), frames);
}

// --- Zoom easing ---

#[test]
fn zoom_eases_toward_target_and_snaps() {
    let (mut manager, _) = manager();
    manager.set_zoom(2.0, 0.0, 0.0);
    assert!(manager.is_animating());
    run_to_rest(&mut manager);
    assert_eq!(manager.view_state().zoom, 2.0);
}

#[test]
fn zoom_gap_shrinks_twelve_percent_per_tick() {
    let (mut manager, _) = manager();
    manager.set_zoom(2.0, 0.0, 0.0);
    manager.tick(0.0);
    let gap_after_one = 2.0 - manager.view_state().zoom;
    assert!((gap_after_one - 0.88).abs() < 1e-9);
    manager.tick(FRAME);
    let gap_after_two = 2.0 - manager.view_state().zoom;
    assert!((gap_after_two - 0.88 * 0.88).abs() < 1e-9);
}

#[test]
fn zoom_origin_stays_visually_fixed() {
    let (mut manager, _) = manager();
    // Start panned so the origin is not trivially at the world origin.
    manager.update_position(300.0, 200.0);
    manager.set_zoom(2.5, 640.0, 360.0);

    let world_under_origin = |state: ViewState| {
        ((640.0 - state.x) / state.zoom, (360.0 - state.y) / state.zoom)
    };
    let before = world_under_origin(manager.view_state());
    let mut t = 0.0;
    while manager.is_animating() {
        t += FRAME;
        manager.tick(t);
        let now = world_under_origin(manager.view_state());
        assert!((now.0 - before.0).abs() < 1e-6);
        assert!((now.1 - before.1).abs() < 1e-6);
    }
}

#[test]
fn set_zoom_clamps_target_to_range() {
    let (mut manager, _) = manager();
    manager.set_zoom(99.0, 0.0, 0.0);
    assert_eq!(manager.target_zoom(), 3.0);
    manager.set_zoom(0.0001, 0.0, 0.0);
    assert_eq!(manager.target_zoom(), 0.1);
    run_to_rest(&mut manager);
    assert!((0.1..=3.0).contains(&manager.view_state().zoom));
}

// --- update_position ---

#[test]
fn update_position_moves_directly_and_publishes() {
    let (mut manager, log) = manager();
    let state = manager.update_position(25.0, -10.0);
    assert_eq!(state.x, 25.0);
    assert_eq!(state.y, -10.0);
    assert_eq!(log.borrow().len(), 1);
    assert!(!manager.is_animating());
}

// --- Locking ---

#[test]
fn set_locked_hard_stops_motion() {
    let (mut manager, _) = manager();
    manager.set_initial_velocity(20.0, 20.0);
    manager.tick(0.0);
    manager.set_locked(true);
    assert!(!manager.is_animating());
    assert_eq!(manager.velocity(), Velocity::default());
    assert_eq!(manager.target_zoom(), manager.view_state().zoom);
}

#[test]
fn locked_freezes_horizontal_motion_only() {
    let (mut manager, _) = manager();
    manager.set_locked(true);
    manager.set_initial_velocity(10.0, 10.0);
    manager.tick(0.0);
    let before = manager.view_state();
    manager.tick(FRAME);
    let after = manager.view_state();
    assert_eq!(after.x, before.x);
    assert!(after.y > before.y);
    // Horizontal velocity is zeroed outright while locked.
    assert_eq!(manager.velocity().x, 0.0);
}

#[test]
fn unlocking_restores_horizontal_motion() {
    let (mut manager, _) = manager();
    manager.set_locked(true);
    manager.set_locked(false);
    manager.set_initial_velocity(10.0, 0.0);
    manager.tick(0.0);
    let before = manager.view_state();
    manager.tick(FRAME);
    assert!(manager.view_state().x > before.x);
}

// --- reset / set_view_state ---

#[test]
fn reset_returns_to_identity() {
    let (mut manager, log) = manager();
    manager.update_position(500.0, 500.0);
    manager.set_zoom(2.0, 0.0, 0.0);
    manager.reset();
    assert_eq!(manager.view_state(), ViewState::default());
    assert!(!manager.is_animating());
    assert_eq!(manager.target_zoom(), 1.0);
    assert!(!log.borrow().is_empty());
}

#[test]
fn set_view_state_injects_proportional_velocity() {
    let (mut manager, _) = manager();
    let target = ViewState { x: 1000.0, y: -400.0, zoom: 1.8 };
    manager.set_view_state(target);
    assert!(manager.is_animating());
    assert_eq!(manager.velocity().x, 1000.0 * 0.15);
    assert_eq!(manager.velocity().y, -400.0 * 0.15);
    assert_eq!(manager.target_zoom(), 1.8);
}

#[test]
fn set_view_state_eases_zoom_to_target() {
    let (mut manager, _) = manager();
    manager.set_view_state(ViewState { x: 100.0, y: 100.0, zoom: 2.2 });
    run_to_rest(&mut manager);
    assert_eq!(manager.view_state().zoom, 2.2);
}

// --- Scheduler contract ---

#[test]
fn arming_requests_exactly_one_frame() {
    let (log, test_scheduler) = scheduler();
    let (_, on_update) = recorder();
    let mut manager = AnimationManager::new(ViewState::default(), on_update);
    manager.set_scheduler(test_scheduler);
    manager.set_initial_velocity(10.0, 0.0);
    assert_eq!(log.borrow().scheduled, 1);
    // Re-arming while armed schedules nothing new.
    manager.set_initial_velocity(5.0, 0.0);
    assert_eq!(log.borrow().scheduled, 1);
}

#[test]
fn each_tick_reschedules_until_settled() {
    let (log, test_scheduler) = scheduler();
    let (_, on_update) = recorder();
    let mut manager = AnimationManager::new(ViewState::default(), on_update);
    manager.set_scheduler(test_scheduler);
    manager.set_initial_velocity(10.0, 0.0);
    let mut t = 0.0;
    let mut ticks = 0u64;
    while manager.is_animating() {
        manager.tick(t);
        t += FRAME;
        ticks += 1;
    }
    // One request per armed frame: the initial one plus one per
    // non-terminal tick.
    assert_eq!(log.borrow().scheduled, ticks);
    assert!(log.borrow().canceled.is_empty());
}

#[test]
fn stop_cancels_the_pending_frame() {
    let (log, test_scheduler) = scheduler();
    let (_, on_update) = recorder();
    let mut manager = AnimationManager::new(ViewState::default(), on_update);
    manager.set_scheduler(test_scheduler);
    manager.set_initial_velocity(10.0, 0.0);
    manager.stop();
    assert_eq!(log.borrow().canceled, vec![FrameHandle(1)]);
    assert!(!manager.is_animating());
}

#[test]
fn set_locked_cancels_in_flight_frame() {
    let (log, test_scheduler) = scheduler();
    let (_, on_update) = recorder();
    let mut manager = AnimationManager::new(ViewState::default(), on_update);
    manager.set_scheduler(test_scheduler);
    manager.set_zoom(2.0, 0.0, 0.0);
    manager.set_locked(true);
    assert_eq!(log.borrow().canceled.len(), 1);
    assert!(!manager.is_animating());
}
