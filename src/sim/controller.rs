use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, error, info};

use super::clock::FrameClock;
use super::field::{self, gap_field};
use super::integrator::Solver;
use super::monitors::Monitors;
use super::params::{ParticleState, PhysicalParameters, Setup};
use super::surface::{BBox, ShapeId, Surface, Tint};

/// Five time-scale presses per decade.
const TIMESCALE_STEPS_PER_DECADE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub timescale: f64,
    pub solver: Solver,
    /// Particle glyph radius (px).
    pub particle_radius: f64,
    /// Trail segments kept on the surface.
    pub trail_limit: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            timescale: 6.7e-5,
            solver: Solver::default(),
            particle_radius: 3.0,
            trail_limit: 4000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Glyphs {
    particle: ShapeId,
    left_dee: ShapeId,
    right_dee: ShapeId,
}

/// Owns the particle, its parameters and the run state, and draws every
/// frame into a [`Surface`].
pub struct AnimationController<S: Surface> {
    surface: S,
    /// Setup the current run was started from.
    setup: Setup,
    /// Last setup read from the form; static values wait here until Stop.
    pending: Setup,
    physics: PhysicalParameters,
    state: ParticleState,
    run_state: RunState,
    time: f64,
    timescale: f64,
    default_timescale: f64,
    solver: Solver,
    clock: FrameClock,
    monitors: Monitors,
    particle_radius: f64,
    trail_limit: usize,
    trail: VecDeque<ShapeId>,
    glyphs: Glyphs,
    status: String,
}

impl<S: Surface> AnimationController<S> {
    pub fn new(surface: S, setup: Setup, options: ControllerOptions) -> Self {
        let mut controller = Self {
            surface,
            setup,
            pending: setup,
            physics: setup.physics(),
            state: setup.initial_state(),
            run_state: RunState::Idle,
            time: 0.0,
            timescale: options.timescale,
            default_timescale: options.timescale,
            solver: options.solver,
            clock: FrameClock::new(setup.fps),
            monitors: Monitors::measure(&setup.initial_state(), &setup.physics(), 0.0),
            particle_radius: options.particle_radius,
            trail_limit: options.trail_limit,
            trail: VecDeque::new(),
            glyphs: Glyphs::default(),
            status: String::new(),
        };
        controller.stop();
        controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    #[cfg(test)]
    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn physics(&self) -> PhysicalParameters {
        self.physics
    }

    #[cfg(test)]
    pub fn setup(&self) -> Setup {
        self.setup
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn timescale(&self) -> f64 {
        self.timescale
    }

    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn delayed_frames(&self) -> u64 {
        self.clock.delayed()
    }

    #[cfg(test)]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Integration step per frame (s): frame interval dilated by the time scale.
    pub fn step_size(&self) -> f64 {
        self.setup.frame_interval() * self.timescale
    }

    pub fn play_pause(&mut self) {
        match self.run_state {
            RunState::Idle | RunState::Paused => {
                self.run_state = RunState::Running;
                self.status = "Playing...".to_string();
                info!("playing from t = {:.3e} s", self.time);
            }
            RunState::Running => {
                self.run_state = RunState::Paused;
                self.status = "Paused".to_string();
                info!("paused at t = {:.3e} s", self.time);
            }
            RunState::Ended => debug!("play ignored, animation has ended"),
        }
    }

    /// Back to Idle at the pending setup's initial conditions, first frame redrawn.
    pub fn stop(&mut self) {
        if self.run_state != RunState::Idle {
            info!(
                "stopped at t = {:.3e} s ({} delayed frames)",
                self.time,
                self.clock.delayed()
            );
        }
        self.run_state = RunState::Idle;
        self.setup = self.pending;
        self.physics = self.setup.physics();
        self.state = self.setup.initial_state();
        self.time = 0.0;
        self.clock.set_fps(self.setup.fps);
        self.clock.reset_delayed();
        self.draw_first_frame();
        self.refresh();
        self.status = "Ready".to_string();
    }

    /// Take a freshly read setup. Idle applies everything at once; otherwise
    /// only the live fields reach the running simulation.
    pub fn apply(&mut self, setup: Setup) {
        self.pending = setup;
        if self.run_state == RunState::Idle {
            self.stop();
            return;
        }
        self.physics.field = setup.field;
        self.physics.amplitude = setup.amplitude;
        self.physics.gap = setup.gap;
        self.physics.dee_radius = setup.dee_radius;
        let (left, right) = self.dee_boxes();
        self.surface.set_coords(self.glyphs.left_dee, left);
        self.surface.set_coords(self.glyphs.right_dee, right);
        self.refresh();
        debug!("live parameters updated: {:?}", self.physics);
    }

    pub fn scale_time(&mut self, faster: bool) {
        let step = 10f64.powf(1.0 / TIMESCALE_STEPS_PER_DECADE);
        if faster {
            self.timescale *= step;
        } else {
            self.timescale /= step;
        }
    }

    pub fn restore_timescale(&mut self) {
        self.timescale = self.default_timescale;
    }

    /// One animation frame. Monitors and colours refresh in every state;
    /// the particle only moves while running.
    pub fn tick(&mut self) {
        self.refresh();
        if self.run_state != RunState::Running {
            return;
        }

        let dt = self.step_size();
        let physics = self.physics;
        let advanced = self.solver.advance(
            |t, z| field::derivative(t, z, &physics),
            self.time,
            self.state.to_array(),
            self.time + dt,
        );
        let next = match advanced {
            Ok(z) => ParticleState::from_array(z),
            Err(err) => {
                error!("{} integration failed: {}", self.solver.name(), err);
                self.end(format!("Animation ended, {err}."));
                return;
            }
        };

        let from = self.project(&self.state);
        let to = self.project(&next);
        if !self.on_surface(to) {
            self.end("Animation ended, next position would be out of canvas.".to_string());
            return;
        }

        self.state = next;
        self.time += dt;
        let tint = Tint::of_sign(self.physics.charge);
        self.surface
            .set_coords(self.glyphs.particle, BBox::around(to.0, to.1, self.particle_radius));
        let segment = self.surface.create_line(from, to, tint);
        self.trail.push_back(segment);
        while self.trail.len() > self.trail_limit {
            if let Some(oldest) = self.trail.pop_front() {
                self.surface.delete(oldest);
            }
        }
        self.refresh();
    }

    /// Delay before the next tick given the measured work of this one, or
    /// `None` when nothing should be scheduled.
    pub fn schedule(&mut self, work: Duration) -> Option<Duration> {
        if self.run_state == RunState::Running {
            Some(self.clock.next_delay(work))
        } else {
            None
        }
    }

    fn end(&mut self, message: String) {
        info!("{} ({} delayed frames)", message, self.clock.delayed());
        self.run_state = RunState::Ended;
        self.status = message;
    }

    fn refresh(&mut self) {
        self.monitors = Monitors::measure(&self.state, &self.physics, self.time);
        let particle = Tint::of_sign(self.physics.charge);
        let left = Tint::of_sign(gap_field(&self.physics, self.time));
        self.surface.set_tint(self.glyphs.particle, particle);
        self.surface.set_tint(self.glyphs.left_dee, left);
        self.surface.set_tint(self.glyphs.right_dee, left.opposite());
    }

    fn draw_first_frame(&mut self) {
        self.surface.clear();
        self.trail.clear();
        let (left, right) = self.dee_boxes();
        let left_dee = self.surface.create_arc(left, 90.0, 180.0, Tint::Neutral);
        let right_dee = self.surface.create_arc(right, 270.0, 180.0, Tint::Neutral);
        let (x, y) = self.project(&self.state);
        let particle = self.surface.create_oval(
            BBox::around(x, y, self.particle_radius),
            Tint::of_sign(self.physics.charge),
        );
        self.glyphs = Glyphs { particle, left_dee, right_dee };
    }

    fn center(&self) -> (f64, f64) {
        (self.surface.width() / 2.0, self.surface.height() / 2.0)
    }

    fn project(&self, s: &ParticleState) -> (f64, f64) {
        let (cx, cy) = self.center();
        (cx + s.x * self.setup.scale, cy + s.y * self.setup.scale)
    }

    fn on_surface(&self, (x, y): (f64, f64)) -> bool {
        (0.0..=self.surface.width()).contains(&x) && (0.0..=self.surface.height()).contains(&y)
    }

    fn dee_boxes(&self) -> (BBox, BBox) {
        let (cx, cy) = self.center();
        let scale = self.setup.scale;
        let offset = self.physics.gap / 2.0 * scale;
        let radius = self.physics.dee_radius * scale;
        (
            BBox::around(cx - offset, cy, radius),
            BBox::around(cx + offset, cy, radius),
        )
    }
}
