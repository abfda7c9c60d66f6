//! Central controller owning all mutable motion state.
//!
//! One `Controller` instance is handed to a single firmware task; every
//! line and every control tick flows through it, which is what preserves
//! the protocol's strict ordering: waypoints execute in received order,
//! batches in arrival order, and the acknowledgement for a batch is only
//! produced once its buffer has been cleared.
//!
//! The control loop is cooperative: [`Controller::handle_line`] is called
//! between ticks, so commands can preempt execution only between discrete
//! sub-steps, never mid-step.

use ammos_protocol::{parse_line, Ack, Command, ParseError};

use crate::buffer::BatchBuffer;
use crate::config::TableConfig;
use crate::homing::{HomingController, HomingState, HomingTick};
use crate::motion::{
    CouplingCompensator, MotionEngine, Position, SegmentInterpolator, StepDelta,
};
use crate::pattern::RoseGenerator;

/// Waypoint source selection (multi-mode hardware)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Externally supplied waypoint batches
    #[default]
    App,
    /// Self-generated rose-curve path from the panel pots
    Autonomous,
}

/// Panel readings sampled once per control cycle.
///
/// App-only hardware passes `None` to [`Controller::tick`] instead.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelInputs {
    /// Momentary mode switch is currently pressed
    pub mode_switch: bool,
    /// Frequency pot, normalized [0, 1]
    pub frequency: f32,
    /// Minimum-radius pot, normalized [0, 1]
    pub min_rho: f32,
}

/// Result of one control tick
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    /// Steps to issue to the axis drivers this tick
    pub steps: Option<StepDelta>,
    /// Status token to send to the host this tick
    pub ack: Option<Ack>,
}

impl TickOutput {
    fn steps(delta: StepDelta) -> Self {
        Self {
            steps: Some(delta),
            ack: None,
        }
    }

    fn ack(ack: Ack) -> Self {
        Self {
            steps: None,
            ack: Some(ack),
        }
    }

    fn idle() -> Self {
        Self::default()
    }
}

/// The motion controller: parser dispatch, batch execution, homing, and
/// autonomous generation behind one single-authority state record.
pub struct Controller {
    config: TableConfig,
    engine: MotionEngine,
    compensator: CouplingCompensator,
    homing: HomingController,
    buffer: BatchBuffer,
    segment: Option<SegmentInterpolator>,
    pattern: RoseGenerator,
    mode: Mode,
    speed_percent: u8,
    /// Next move is a direct jump (no position history since the last
    /// homing or theta reset)
    first_move: bool,
    pending_home: bool,
    pending_theta_reset: bool,
    pending_mode_toggle: bool,
    last_switch: bool,
}

impl Controller {
    /// Create a controller at the boot origin with full speed, App mode
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            engine: MotionEngine::new(),
            compensator: CouplingCompensator::new(),
            homing: HomingController::new(),
            buffer: BatchBuffer::new(),
            segment: None,
            pattern: RoseGenerator::new(),
            mode: Mode::App,
            speed_percent: 100,
            first_move: true,
            pending_home: false,
            pending_theta_reset: false,
            pending_mode_toggle: false,
            last_switch: false,
        }
    }

    /// Logical position of the magnet
    pub fn position(&self) -> Position {
        self.engine.position()
    }

    /// Current radial axis step count (after coupling compensation)
    pub fn rho_steps(&self) -> i32 {
        self.engine.rho_steps()
    }

    /// Current waypoint source
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Calibration state
    pub fn homing_state(&self) -> HomingState {
        self.homing.state()
    }

    /// Configured speed percentage
    pub fn speed_percent(&self) -> u8 {
        self.speed_percent
    }

    /// True while a batch, move, or homing sweep occupies the controller
    pub fn is_busy(&self) -> bool {
        self.buffer.is_active()
            || self.segment.is_some()
            || self.engine.is_moving()
            || self.homing.is_homing()
            || self.pending_home
    }

    /// True while the axis drivers must be energized
    pub fn motors_active(&self) -> bool {
        self.engine.is_moving() || self.homing.is_homing()
    }

    /// Process one transport line, returning its immediate acknowledgement.
    ///
    /// Batch lines return `None`: their `R` token is produced by
    /// [`Self::tick`] once the whole batch has executed, which is the
    /// backpressure signal the host paces on.
    pub fn handle_line(&mut self, line: &str) -> Option<Ack> {
        match parse_line(line) {
            Ok(Command::Home) => {
                // Homing preempts the batch, but only between sub-steps
                self.buffer.clear();
                self.segment = None;
                if self.engine.is_moving() {
                    self.pending_home = true;
                } else {
                    self.start_homing();
                }
                Some(Ack::Homing)
            }
            Ok(Command::ResetTheta) => {
                if self.engine.is_moving() {
                    self.pending_theta_reset = true;
                } else {
                    self.apply_theta_reset();
                }
                Some(Ack::ThetaReset)
            }
            Ok(Command::GetVersion) => Some(Ack::Version),
            Ok(Command::SetSpeed(percent)) => {
                self.speed_percent = percent;
                Some(Ack::SpeedSet)
            }
            Ok(Command::Batch(waypoints)) => {
                if self.mode == Mode::Autonomous || self.is_busy() {
                    return Some(Ack::ignored(line));
                }
                match self.buffer.load(&waypoints) {
                    Ok(()) => None,
                    Err(_) => Some(Ack::ignored(line)),
                }
            }
            Err(ParseError::InvalidSpeed) => Some(Ack::InvalidSpeed),
            Err(ParseError::InvalidCommand) => Some(Ack::InvalidCommand),
            Err(ParseError::Ignored) => Some(Ack::ignored(line)),
        }
    }

    /// Advance the controller by one control tick.
    ///
    /// Emits the step deltas for the axis drivers and any completion
    /// token (`HOMED`, `HOMING_FAILED`, `R`).
    pub fn tick(&mut self, inputs: Option<PanelInputs>) -> TickOutput {
        // Edge-detect the switch every cycle so a momentary press during
        // a batch is latched, not lost; the toggle itself waits for the
        // next sub-step boundary like a pending HOME does
        if let Some(inputs) = &inputs {
            let pressed = inputs.mode_switch && !self.last_switch;
            self.last_switch = inputs.mode_switch;
            if pressed {
                self.pending_mode_toggle = true;
            }
        }

        match self.homing.tick(&self.config) {
            HomingTick::Sweeping(delta) => return TickOutput::steps(delta),
            HomingTick::Complete => {
                self.engine.zero();
                self.compensator.reset();
                self.first_move = true;
                return TickOutput::ack(Ack::Homed);
            }
            HomingTick::Failed => return TickOutput::ack(Ack::HomingFailed),
            HomingTick::Idle => {}
        }

        if self.engine.is_moving() {
            let steps = self.engine.tick();
            let ack = if self.engine.is_moving() {
                None
            } else {
                self.on_move_complete()
            };
            return TickOutput { steps, ack };
        }

        if self.pending_mode_toggle {
            self.pending_mode_toggle = false;
            self.toggle_mode();
            return TickOutput::idle();
        }

        if let Some(inputs) = inputs {
            if self.mode == Mode::Autonomous && self.segment.is_none() {
                let theta = self.engine.position().theta;
                let wp = self
                    .pattern
                    .next_waypoint(theta, inputs.frequency, inputs.min_rho);
                self.start_waypoint(wp.into());
                return TickOutput::idle();
            }
        }

        match self.advance_pipeline() {
            Some(ack) => TickOutput::ack(ack),
            None => TickOutput::idle(),
        }
    }

    /// Continue after a completed move: pending commands first, then the
    /// next sub-step, waypoint, or the batch's completion token.
    fn on_move_complete(&mut self) -> Option<Ack> {
        if self.pending_home {
            self.start_homing();
            return None;
        }
        if self.pending_theta_reset {
            self.apply_theta_reset();
        }
        if self.pending_mode_toggle {
            self.pending_mode_toggle = false;
            self.toggle_mode();
            return None;
        }
        self.advance_pipeline()
    }

    /// Start the next queued move, or report batch completion
    fn advance_pipeline(&mut self) -> Option<Ack> {
        if self.segment.is_some() {
            if let Some(target) = self.segment.as_mut().and_then(|s| s.next()) {
                self.issue_move(target);
                return None;
            }
            self.segment = None;
        }

        if self.buffer.is_active() {
            if let Some(wp) = self.buffer.take_next() {
                self.start_waypoint(wp.into());
                return None;
            }
            self.buffer.clear();
            return Some(Ack::Ready);
        }
        None
    }

    /// Begin executing one waypoint: a direct jump for the first move
    /// after homing/theta reset (App mode only - autonomous suppresses the
    /// skip), otherwise an interpolated segment from the current position.
    fn start_waypoint(&mut self, target: Position) {
        if self.mode == Mode::App && self.first_move {
            self.first_move = false;
            self.issue_move(target);
            return;
        }
        self.first_move = false;
        let mut segment = SegmentInterpolator::new(
            self.engine.position(),
            target,
            self.config.interpolation_step,
        );
        if let Some(sub) = segment.next() {
            self.segment = Some(segment);
            self.issue_move(sub);
        }
    }

    /// Command one synchronized move to `target`, accounting its angular
    /// delta in the coupling compensator exactly once.
    fn issue_move(&mut self, target: Position) {
        let delta_theta = target.theta - self.engine.position().theta;
        let offset = self.compensator.advance(delta_theta, &self.config);
        // The engine is idle at every call site; Busy is unreachable
        let _ = self
            .engine
            .begin_move(target, offset, self.steps_per_tick(), &self.config);
    }

    /// Effective rate: `SET_SPEED` percentage of the maximum, halved in
    /// autonomous mode
    fn steps_per_tick(&self) -> f32 {
        let rate = self.config.move_steps_per_tick(self.speed_percent);
        match self.mode {
            Mode::App => rate,
            Mode::Autonomous => rate / 2.0,
        }
    }

    fn start_homing(&mut self) {
        self.pending_home = false;
        self.engine.cancel();
        self.buffer.clear();
        self.segment = None;
        self.homing.start();
    }

    fn apply_theta_reset(&mut self) {
        self.pending_theta_reset = false;
        self.engine.reset_theta();
        self.compensator.reset();
        self.segment = None;
        self.first_move = true;
    }

    fn toggle_mode(&mut self) {
        match self.mode {
            Mode::App => {
                self.mode = Mode::Autonomous;
                self.buffer.clear();
                self.segment = None;
                self.pattern.reset();
            }
            Mode::Autonomous => {
                self.mode = Mode::App;
                self.segment = None;
                self.apply_theta_reset();
                // Recenter the radial axis; this consumes the first-move
                // jump the theta reset armed
                self.start_waypoint(Position::zero());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ammos_protocol::MAX_LINE_LEN;

    const MAX_TICKS: u32 = 200_000;

    fn run_until_ack(ctrl: &mut Controller, inputs: Option<PanelInputs>) -> Ack {
        for _ in 0..MAX_TICKS {
            if let Some(ack) = ctrl.tick(inputs).ack {
                return ack;
            }
        }
        panic!("no ack within {MAX_TICKS} ticks");
    }

    fn homed(config: TableConfig) -> Controller {
        let mut ctrl = Controller::new(config);
        assert_eq!(ctrl.handle_line("HOME"), Some(Ack::Homing));
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Homed);
        ctrl
    }

    #[test]
    fn test_boot_position_is_origin() {
        let ctrl = Controller::new(TableConfig::default());
        assert_eq!(ctrl.position(), Position::zero());
        assert_eq!(ctrl.homing_state(), HomingState::NotHomed);
        assert_eq!(ctrl.mode(), Mode::App);
        assert_eq!(ctrl.speed_percent(), 100);
    }

    #[test]
    fn test_batch_jump_then_interpolate_scenario() {
        let mut ctrl = homed(TableConfig::default());

        assert_eq!(ctrl.handle_line("0,0.5;1.5708,0.7;"), None);
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);

        // Final position is exactly the batch's last waypoint
        assert_eq!(ctrl.position(), Position::new(1.5708, 0.7));
        assert!(!ctrl.is_busy());
    }

    #[test]
    fn test_batch_end_position_independent_of_step_size() {
        for step in [0.02, 0.1, 0.5] {
            let config = TableConfig {
                interpolation_step: step,
                ..Default::default()
            };
            let mut ctrl = homed(config);
            ctrl.handle_line("0.4,0.2;2.0,0.9;5.5,0.1;");
            assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);
            assert_eq!(ctrl.position(), Position::new(5.5, 0.1));
        }
    }

    #[test]
    fn test_homing_idempotence() {
        let mut ctrl = Controller::new(TableConfig::default());
        for _ in 0..2 {
            assert_eq!(ctrl.handle_line("HOME"), Some(Ack::Homing));
            assert_eq!(run_until_ack(&mut ctrl, None), Ack::Homed);
            assert_eq!(ctrl.position(), Position::zero());
            assert_eq!(ctrl.homing_state(), HomingState::Homed);
        }
    }

    #[test]
    fn test_homing_failure_reported() {
        let config = TableConfig {
            homing_step_rate: 0, // stalled sweep
            ..Default::default()
        };
        let mut ctrl = Controller::new(config);
        ctrl.handle_line("HOME");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::HomingFailed);
        assert_eq!(ctrl.homing_state(), HomingState::NotHomed);
    }

    #[test]
    fn test_unterminated_line_is_ignored_without_motion() {
        let mut ctrl = homed(TableConfig::default());
        let before = ctrl.position();

        let ack = ctrl.handle_line("0,0.5;1.5708,0.7").unwrap();
        assert_eq!(ack, Ack::ignored("0,0.5;1.5708,0.7"));
        assert_eq!(ctrl.position(), before);
        assert!(!ctrl.is_busy());
    }

    #[test]
    fn test_malformed_field_is_ignored_without_motion() {
        let mut ctrl = homed(TableConfig::default());
        let ack = ctrl.handle_line("0,zzz;1.0,0.5;").unwrap();
        assert!(matches!(ack, Ack::Ignored(_)));
        assert_eq!(ctrl.position(), Position::zero());
    }

    #[test]
    fn test_set_speed_boundaries_keep_previous_rate() {
        let mut ctrl = Controller::new(TableConfig::default());
        assert_eq!(ctrl.handle_line("SET_SPEED 50"), Some(Ack::SpeedSet));
        assert_eq!(ctrl.speed_percent(), 50);

        for bad in ["SET_SPEED 0", "SET_SPEED 101", "SET_SPEED fast"] {
            assert_eq!(ctrl.handle_line(bad), Some(Ack::InvalidSpeed));
            assert_eq!(ctrl.speed_percent(), 50);
        }
        assert_eq!(ctrl.handle_line("SET_SPEED"), Some(Ack::InvalidCommand));
        assert_eq!(ctrl.speed_percent(), 50);
    }

    #[test]
    fn test_half_speed_doubles_batch_duration() {
        let count_ticks = |percent: &str| {
            let mut ctrl = homed(TableConfig::default());
            ctrl.handle_line(percent);
            ctrl.handle_line("0,0.1;3.0,0.8;");
            let mut ticks = 0u32;
            loop {
                ticks += 1;
                if ctrl.tick(None).ack == Some(Ack::Ready) {
                    return ticks;
                }
                assert!(ticks < MAX_TICKS);
            }
        };
        let full = count_ticks("SET_SPEED 100");
        let half = count_ticks("SET_SPEED 50");
        // Every sub-step takes twice the ticks, modulo per-move rounding
        assert!(half > full + full / 2);
    }

    #[test]
    fn test_coupling_cancels_over_closed_theta_loop() {
        let config = TableConfig::default();
        let mut ctrl = homed(config);

        // Re-anchoring jump, then one full revolution out and back
        ctrl.handle_line("0,0.5;");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);
        ctrl.handle_line("6.2831853,0.5;");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);

        // Mid-loop the compensator has pulled the carriage inward
        assert_eq!(
            ctrl.rho_steps(),
            config.rho_to_steps(0.5) - config.coupling_steps_per_rev() as i32
        );

        ctrl.handle_line("0,0.5;");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);

        // Net angular displacement zero: physical radial position equals
        // the uncompensated target again
        assert_eq!(ctrl.rho_steps(), config.rho_to_steps(0.5));
    }

    #[test]
    fn test_batch_rejected_while_executing() {
        let mut ctrl = homed(TableConfig::default());
        assert_eq!(ctrl.handle_line("1.0,0.5;2.0,0.6;"), None);
        ctrl.tick(None);
        assert!(ctrl.is_busy());

        let ack = ctrl.handle_line("3.0,0.1;").unwrap();
        assert!(matches!(ack, Ack::Ignored(_)));

        // The original batch still finishes at its own last waypoint
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);
        assert_eq!(ctrl.position(), Position::new(2.0, 0.6));
    }

    #[test]
    fn test_home_preempts_batch_between_substeps() {
        let mut ctrl = homed(TableConfig::default());
        ctrl.handle_line("0,0.2;9.0,0.9;");
        for _ in 0..50 {
            ctrl.tick(None);
        }
        assert_eq!(ctrl.handle_line("HOME"), Some(Ack::Homing));
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Homed);
        assert_eq!(ctrl.position(), Position::zero());
        assert!(!ctrl.is_busy());
    }

    #[test]
    fn test_reset_theta_rearms_direct_jump() {
        let mut ctrl = homed(TableConfig::default());
        ctrl.handle_line("0,0.5;4.0,0.5;");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);

        assert_eq!(ctrl.handle_line("RESET_THETA"), Some(Ack::ThetaReset));
        assert_eq!(ctrl.position().theta, 0.0);
        assert_eq!(ctrl.position().rho, 0.5);

        // Next waypoint is a jump: a single move, no interpolation, and
        // the compensator re-anchors (no offset on this move)
        ctrl.handle_line("1.0,0.8;");
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);
        assert_eq!(ctrl.position(), Position::new(1.0, 0.8));
        assert_eq!(ctrl.rho_steps(), TableConfig::default().rho_to_steps(0.8));
    }

    #[test]
    fn test_get_version() {
        let mut ctrl = Controller::new(TableConfig::default());
        assert_eq!(ctrl.handle_line("GET_VERSION"), Some(Ack::Version));
    }

    #[test]
    fn test_ignored_echo_matches_original_line() {
        let mut ctrl = Controller::new(TableConfig::default());
        let ack = ctrl.handle_line("garbage line").unwrap();
        let rendered = ack.render();
        assert_eq!(rendered.as_str(), "IGNORED: garbage line");
        assert!(rendered.len() <= MAX_LINE_LEN + 16);
    }

    #[test]
    fn test_mode_switch_into_autonomous_generates_motion() {
        let mut ctrl = homed(TableConfig::default());
        let press = PanelInputs {
            mode_switch: true,
            frequency: 0.5,
            min_rho: 0.2,
        };
        let held = PanelInputs {
            mode_switch: false,
            ..press
        };

        ctrl.tick(Some(press));
        assert_eq!(ctrl.mode(), Mode::Autonomous);

        let mut stepped = false;
        for _ in 0..5_000 {
            if let Some(delta) = ctrl.tick(Some(held)).steps {
                if !delta.is_zero() {
                    stepped = true;
                }
            }
        }
        assert!(stepped);
        assert!(ctrl.position().theta > 0.0);
    }

    #[test]
    fn test_switch_press_mid_batch_is_latched() {
        let mut ctrl = homed(TableConfig::default());
        ctrl.handle_line("0,0.2;9.0,0.9;");
        let press = PanelInputs {
            mode_switch: true,
            frequency: 0.5,
            min_rho: 0.2,
        };
        let release = PanelInputs {
            mode_switch: false,
            ..press
        };

        // Momentary press-and-release entirely inside the batch's first
        // move; the toggle must latch and fire at the next sub-step
        // boundary, abandoning the batch without an R token
        for _ in 0..40 {
            ctrl.tick(Some(press));
            assert_eq!(ctrl.mode(), Mode::App);
        }
        let mut toggled = false;
        for _ in 0..MAX_TICKS {
            let out = ctrl.tick(Some(release));
            assert_ne!(out.ack, Some(Ack::Ready));
            if ctrl.mode() == Mode::Autonomous {
                toggled = true;
                break;
            }
        }
        assert!(toggled);
        assert_ne!(ctrl.position(), Position::new(9.0, 0.9));
    }

    #[test]
    fn test_motors_active_only_during_motion() {
        let mut ctrl = Controller::new(TableConfig::default());
        assert!(!ctrl.motors_active());

        ctrl.handle_line("HOME");
        assert!(ctrl.motors_active());
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Homed);
        assert!(!ctrl.motors_active());

        ctrl.handle_line("1.0,0.5;");
        ctrl.tick(None);
        assert!(ctrl.motors_active());
        assert_eq!(run_until_ack(&mut ctrl, None), Ack::Ready);
        assert!(!ctrl.motors_active());
    }

    #[test]
    fn test_autonomous_rejects_batches() {
        let mut ctrl = homed(TableConfig::default());
        ctrl.tick(Some(PanelInputs {
            mode_switch: true,
            ..Default::default()
        }));
        assert_eq!(ctrl.mode(), Mode::Autonomous);

        let ack = ctrl.handle_line("1.0,0.5;").unwrap();
        assert!(matches!(ack, Ack::Ignored(_)));
    }

    #[test]
    fn test_returning_to_app_resets_theta_and_recenters() {
        let mut ctrl = homed(TableConfig::default());
        let press = PanelInputs {
            mode_switch: true,
            frequency: 0.5,
            min_rho: 0.5,
        };
        let released = PanelInputs {
            mode_switch: false,
            ..press
        };

        ctrl.tick(Some(press));
        for _ in 0..10_000 {
            ctrl.tick(Some(released));
        }
        assert!(ctrl.position().theta > 0.0);

        // Second press returns to App once the current sub-step finishes
        for _ in 0..10_000 {
            ctrl.tick(Some(press));
            if ctrl.mode() == Mode::App {
                break;
            }
        }
        assert_eq!(ctrl.mode(), Mode::App);

        // Recenter move runs to completion
        for _ in 0..10_000 {
            if !ctrl.is_busy() {
                break;
            }
            ctrl.tick(None);
        }
        assert_eq!(ctrl.position(), Position::zero());
    }
}
