//! Frame-driven animation of the wiggle effect.
//!
//! The driver never runs its own loop. Each tick asks the host for the next
//! frame through a [`FrameScheduler`] and gets a [`FrameHandle`] back. The host
//! calls [`WiggleDriver::on_frame`] with that handle when the frame fires. At
//! most one handle is pending at any time and it is cancelled on every restart,
//! stop, and drop, so a superseded loop can never publish again.

use glam::DVec2;

use crate::params::WiggleParams;
use crate::path_data::PathDataError;
use crate::path_geometry::MeasuredPath;
use crate::sampler::{sample, SamplePoint};
use crate::smoother::{smooth, CurveDescription};

/// Token for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side per-frame callback mechanism.
pub trait FrameScheduler {
    /// Request a callback for the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously requested frame. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler for headless hosts and tests: frames fire only when the host
/// takes the pending handle and passes it back to the driver.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame waiting to fire, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Remove the pending frame so the host can fire it.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Total frames requested.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Frames cancelled while still pending.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(previous) = self.pending.replace(handle) {
            log::warn!("frame {:?} replaced before it fired", previous);
        }
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Lifecycle of one path/parameter combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Where each restart gets its seed from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SeedMode {
    /// Fresh random seed in `[0, 100)` on every restart.
    Random,
    /// Same seed on every restart.
    Fixed(f64),
}

/// Draw a random seed in `[0, 100)`.
pub fn draw_seed() -> f64 {
    let mut buf = [0u8; 8];
    match getrandom::fill(&mut buf) {
        Ok(()) => {
            let bits = u64::from_le_bytes(buf) >> 11;
            bits as f64 / (1u64 << 53) as f64 * 100.0
        }
        Err(e) => {
            log::warn!("random seed unavailable ({}), using 0", e);
            0.0
        }
    }
}

/// Displace every sample for one frame.
///
/// Point `i` moves by `sin((frame + i) * speed) * offset_x` horizontally and
/// `cos((frame + i) * speed) * offset_y` vertically. Pure: the same inputs
/// always give bit-identical output.
pub fn displace(samples: &[SamplePoint], frame: u64, speed: f64) -> Vec<DVec2> {
    samples
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let phase = (frame as f64 + i as f64) * speed;
            DVec2::new(p.x + phase.sin() * p.offset_x, p.y + phase.cos() * p.offset_y)
        })
        .collect()
}

/// Animation state machine for one wiggling path.
pub struct WiggleDriver<S: FrameScheduler> {
    scheduler: S,
    state: DriverState,
    seed_mode: SeedMode,
    pending: Option<FrameHandle>,
    path_data: Option<String>,
    params: WiggleParams,
    seed: f64,
    samples: Vec<SamplePoint>,
    frame: u64,
    curve: CurveDescription,
}

impl<S: FrameScheduler> WiggleDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: DriverState::Idle,
            seed_mode: SeedMode::Random,
            pending: None,
            path_data: None,
            params: WiggleParams::default(),
            seed: 0.0,
            samples: Vec::new(),
            frame: 0,
            curve: String::new(),
        }
    }

    /// Use the same seed on every restart instead of a random one.
    pub fn with_fixed_seed(mut self, seed: f64) -> Self {
        self.seed_mode = SeedMode::Fixed(seed);
        self
    }

    /// (Re)start the animation for `path_data` with `params`.
    ///
    /// Cancels any pending frame, resamples with a new seed, resets the frame
    /// counter and publishes frame 0 before returning. On a parse error the
    /// driver is left stopped with nothing published.
    pub fn start(&mut self, path_data: &str, params: WiggleParams) -> Result<(), PathDataError> {
        self.cancel_pending();
        self.state = DriverState::Idle;
        self.path_data = Some(path_data.to_string());
        self.params = params.sanitized();
        self.samples.clear();
        self.curve.clear();
        self.frame = 0;

        let path = match MeasuredPath::parse(path_data) {
            Ok(path) => path,
            Err(e) => {
                log::error!("cannot animate path: {}", e);
                self.state = DriverState::Stopped;
                return Err(e);
            }
        };

        self.seed = match self.seed_mode {
            SeedMode::Random => draw_seed(),
            SeedMode::Fixed(seed) => seed,
        };
        self.samples = sample(&path, self.params.point_count, self.seed, self.params.amplitude);
        log::debug!(
            "wiggle started: {} samples, seed {:.4}, {:?}",
            self.samples.len(),
            self.seed,
            self.params
        );

        self.state = DriverState::Running;
        self.tick();
        Ok(())
    }

    /// Restart only if the path or any parameter changed, or if the driver is
    /// not running. Returns true if a restart happened.
    pub fn update(&mut self, path_data: &str, params: WiggleParams) -> Result<bool, PathDataError> {
        let unchanged = self.state == DriverState::Running
            && self.path_data.as_deref() == Some(path_data)
            && self.params == params.sanitized();
        if unchanged {
            return Ok(false);
        }
        self.start(path_data, params)?;
        Ok(true)
    }

    /// Restart with new parameters on the current path.
    pub fn set_params(&mut self, params: WiggleParams) -> Result<bool, PathDataError> {
        let path_data = self.path_data.clone().unwrap_or_default();
        self.update(&path_data, params)
    }

    /// Host frame callback. Runs one tick if `handle` is the pending frame of
    /// a running driver and returns the freshly published curve; any other
    /// handle is stale and ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<&str> {
        if self.state != DriverState::Running || self.pending != Some(handle) {
            log::debug!("ignoring stale frame {:?}", handle);
            return None;
        }
        self.pending = None;
        self.tick();
        Some(self.curve.as_str())
    }

    /// Cancel the pending frame and stop publishing.
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.state == DriverState::Running {
            log::debug!("wiggle stopped at frame {}", self.frame);
        }
        self.state = DriverState::Stopped;
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn tick(&mut self) {
        let displaced = displace(&self.samples, self.frame, self.params.speed);
        self.curve = smooth(&displaced);
        self.frame += 1;
        self.pending = Some(self.scheduler.request_frame());
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Index of the next frame to be computed.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Most recently published curve.
    pub fn curve(&self) -> &str {
        &self.curve
    }

    pub fn samples(&self) -> &[SamplePoint] {
        &self.samples
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn params(&self) -> WiggleParams {
        self.params
    }

    pub fn path_data(&self) -> Option<&str> {
        self.path_data.as_deref()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: FrameScheduler> Drop for WiggleDriver<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
