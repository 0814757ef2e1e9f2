//! Inertial pan/zoom animation loop.
//!
//! [`AnimationManager`] owns the authoritative [`ViewState`] while motion is
//! in flight and advances it once per frame: velocity-driven pan with
//! exponential decay, and zoom eased toward a target around a fixed screen
//! origin so the point under the cursor stays put. The loop self-disarms
//! once every component of the motion falls below its rest threshold, and
//! re-arms on the next velocity- or zoom-injecting call.
//!
//! Frame timing is host-provided: the manager asks a [`Scheduler`] for
//! frames and the host calls [`AnimationManager::tick`] with the current
//! timestamp when each one fires. Velocities are expressed in pixels per
//! reference frame (~16.66 ms), so motion speed is frame-rate independent.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::consts::{
    BASE_FRAME_MS, FLY_TO_RATE, MAX_ZOOM, MIN_ZOOM, REST_VELOCITY, VELOCITY_DECAY,
    ZOOM_EASE_RATE, ZOOM_SNAP_EPSILON,
};
use crate::viewport::ViewState;

/// Pan velocity in pixels per reference frame.
///
/// The `zoom` component is carried for symmetry but unused directly — zoom
/// motion runs on a target/origin pair instead of a rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

/// Identifies one scheduled frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-provided frame source.
///
/// `schedule` must arrange for [`AnimationManager::tick`] to be called once,
/// on the host's next frame (a timer, a game-engine tick, or a UI
/// framework's frame hook). A handle is spent once its frame fires; `cancel`
/// is only called for frames that have not fired yet.
pub trait Scheduler {
    fn schedule(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// Callback receiving a fresh [`ViewState`] snapshot after every change.
pub type UpdateFn = Box<dyn FnMut(ViewState)>;

/// Inertial animation loop owning the in-flight view state.
pub struct AnimationManager {
    view_state: ViewState,
    velocity: Velocity,
    target_zoom: f64,
    zoom_origin: (f64, f64),
    is_locked: bool,
    running: bool,
    frame_handle: Option<FrameHandle>,
    last_frame_time: Option<f64>,
    scheduler: Option<Box<dyn Scheduler>>,
    on_update: UpdateFn,
}

impl AnimationManager {
    /// Build a manager publishing state snapshots through `on_update`.
    #[must_use]
    pub fn new(initial: ViewState, on_update: UpdateFn) -> Self {
        Self {
            view_state: initial,
            velocity: Velocity::default(),
            target_zoom: initial.zoom,
            zoom_origin: (0.0, 0.0),
            is_locked: false,
            running: false,
            frame_handle: None,
            last_frame_time: None,
            scheduler: None,
            on_update,
        }
    }

    /// Install the host's frame source. Without one the loop still arms and
    /// settles; the host then drives it by polling [`Self::is_animating`].
    pub fn set_scheduler(&mut self, scheduler: Box<dyn Scheduler>) {
        self.scheduler = Some(scheduler);
    }

    /// The current view state.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    /// The current pan velocity.
    #[must_use]
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// The zoom value the loop is easing toward.
    #[must_use]
    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }

    /// Whether horizontal motion is frozen.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Whether the loop is armed and expecting ticks.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.running
    }

    /// Arm the loop. No-op while already armed.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_frame_time = None;
        trace!("animation loop armed");
        self.request_frame();
    }

    /// Disarm the loop and cancel any pending frame.
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(handle) = self.frame_handle.take() {
            if let Some(scheduler) = self.scheduler.as_mut() {
                scheduler.cancel(handle);
            }
        }
    }

    /// Advance one frame at timestamp `now_ms`.
    ///
    /// Publishes the updated state (including on the terminal frame) and
    /// returns whether another frame is needed. Ticks while disarmed are
    /// ignored.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.frame_handle = None;

        let delta = now_ms - self.last_frame_time.unwrap_or(now_ms);
        self.last_frame_time = Some(now_ms);
        let frames = delta / BASE_FRAME_MS;

        if !self.is_locked {
            self.view_state.x += self.velocity.x * frames;
        }
        self.view_state.y += self.velocity.y * frames;

        let zoom_gap = self.target_zoom - self.view_state.zoom;
        if zoom_gap.abs() > ZOOM_SNAP_EPSILON {
            let old_zoom = self.view_state.zoom;
            let new_zoom = old_zoom + zoom_gap * ZOOM_EASE_RATE;
            let scale = new_zoom / old_zoom;
            let (origin_x, origin_y) = self.zoom_origin;
            self.view_state.x = origin_x - (origin_x - self.view_state.x) * scale;
            self.view_state.y = origin_y - (origin_y - self.view_state.y) * scale;
            self.view_state.zoom = new_zoom;
        }

        let decay = VELOCITY_DECAY.powf(frames);
        self.velocity.x = if self.is_locked { 0.0 } else { self.velocity.x * decay };
        self.velocity.y *= decay;

        let settled = self.velocity.x.abs() < REST_VELOCITY
            && self.velocity.y.abs() < REST_VELOCITY
            && (self.target_zoom - self.view_state.zoom).abs() < ZOOM_SNAP_EPSILON;

        if settled {
            // Snap the residual zoom gap with the same origin rescale so
            // the pivot stays fixed through the terminal frame.
            let old_zoom = self.view_state.zoom;
            let scale = self.target_zoom / old_zoom;
            let (origin_x, origin_y) = self.zoom_origin;
            self.view_state.x = origin_x - (origin_x - self.view_state.x) * scale;
            self.view_state.y = origin_y - (origin_y - self.view_state.y) * scale;
            self.view_state.zoom = self.target_zoom;
            self.velocity = Velocity::default();
            self.running = false;
            trace!("animation loop settled");
        } else {
            self.request_frame();
        }

        (self.on_update)(self.view_state);
        self.running
    }

    /// Inject a fling velocity and arm the loop.
    pub fn set_initial_velocity(&mut self, x: f64, y: f64) {
        self.velocity.x = x;
        self.velocity.y = y;
        self.start();
    }

    /// Move the view directly, bypassing velocity — used while a drag is
    /// active. The decay loop still applies to whatever velocity remains
    /// once the drag is released.
    pub fn update_position(&mut self, delta_x: f64, delta_y: f64) -> ViewState {
        self.view_state.x += delta_x;
        self.view_state.y += delta_y;
        (self.on_update)(self.view_state);
        self.view_state
    }

    /// Ease the zoom toward `target` around the screen point
    /// `(origin_x, origin_y)`, which stays visually stationary.
    pub fn set_zoom(&mut self, target: f64, origin_x: f64, origin_y: f64) {
        self.target_zoom = target.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_origin = (origin_x, origin_y);
        self.start();
    }

    /// Lock or unlock horizontal motion. Locking hard-stops any in-flight
    /// motion and freezes the current zoom as the target.
    pub fn set_locked(&mut self, locked: bool) {
        self.is_locked = locked;
        if locked {
            self.velocity = Velocity::default();
            self.target_zoom = self.view_state.zoom;
            self.stop();
        }
    }

    /// Hard reset to the origin at zoom 1.
    pub fn reset(&mut self) -> ViewState {
        self.view_state = ViewState::default();
        self.velocity = Velocity::default();
        self.target_zoom = self.view_state.zoom;
        self.zoom_origin = (0.0, 0.0);
        self.stop();
        (self.on_update)(self.view_state);
        self.view_state
    }

    /// Ease toward an arbitrary target view: injects velocity proportional
    /// to the remaining offset and retargets the zoom. Used for programmatic
    /// fly-to transitions; convergence is approximate by design.
    pub fn set_view_state(&mut self, target: ViewState) {
        self.velocity.x = (target.x - self.view_state.x) * FLY_TO_RATE;
        self.velocity.y = (target.y - self.view_state.y) * FLY_TO_RATE;
        self.target_zoom = target.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.start();
    }

    fn request_frame(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            self.frame_handle = Some(scheduler.schedule());
        }
    }
}
