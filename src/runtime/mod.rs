// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Fixed-Rate Control Loop
//!
//! [`ControlLoop`] owns the estimator, the balance controller and every hardware collaborator, and
//! runs one iteration per [`step`](ControlLoop::step):
//!
//! 1. reset the period clock
//! 2. poll the teleop link (a full command frame is answered with telemetry)
//! 3. read the IMU and update the attitude estimate
//! 4. sample the wheel encoders
//! 5. run the control law
//! 6. apply the mode's motor voltages
//! 7. busy-wait until the period has elapsed
//!
//! The period is a floor. An iteration that overruns is followed immediately by the next one.
//!
//! The loop [`LoopMode`] is picked once at startup; bench modes share the whole pipeline with
//! normal balancing and only differ in what reaches the motors and what is logged.

use log::{info, warn};

use crate::config::{self, ImuCalibration};
use crate::control::{BalanceConfig, BalanceController, ControlInput, ControlOutput};
use crate::error::Error;
use crate::estimation::{calibration, AttitudeEstimator, CalibrationCode, Calibrator};
use crate::io::{
    Clock, Imu, ImuSample, Motor, StatusIndicator, Transport, Wheel, WheelEncoder,
};
use crate::protocol::{TeleopCommand, Telemetry};

/// What the loop does with the computed commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopMode {
    /// Drive the motors with the control law output.
    Balance,
    /// Hold the motors at 0 V and periodically log wheel angles, pitch and the commands.
    SerialDebug,
    /// Drive both motors at the supply voltage and periodically log wheel velocities.
    MotorSpeedTest,
    /// Time one iteration, log the achievable loop rate and halt.
    MaxFrequencyProbe,
    /// Collect stationary raw IMU samples, log the calibration table and halt.
    CalibrateImu,
}

/// Result of one iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Halt,
}

/// Loop timing and bench-mode parameters.
#[derive(Copy, Clone, Debug)]
pub struct LoopConfig {
    /// Minimum iteration period [s].
    pub period: f32,
    /// Bench modes log every this many ticks. Zero disables bench logging.
    pub log_divider: u32,
    /// Samples collected in [`LoopMode::CalibrateImu`], raised to
    /// [`calibration::MIN_SAMPLES`] if lower.
    pub calibration_samples: u32,
    /// Voltage applied in [`LoopMode::MotorSpeedTest`] [V].
    pub test_voltage: f32,
}

impl LoopConfig {
    pub const DEFAULT: Self = Self {
        period: config::T_CTRL,
        log_divider: config::DEBUG_PRINT_DIVIDER,
        calibration_samples: config::CALIBRATION_SAMPLES,
        test_voltage: config::motor::VB,
    };
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hardware collaborators handed to the loop.
pub struct Peripherals<I, EL, ER, ML, MR, T, C, S> {
    pub imu: I,
    pub encoder_left: EL,
    pub encoder_right: ER,
    pub motor_left: ML,
    pub motor_right: MR,
    pub transport: T,
    pub clock: C,
    pub indicator: S,
}

/// Bring the IMU up. On failure the fault indicator is lit and the robot must not proceed.
pub fn bring_up<I: Imu, S: StatusIndicator>(imu: &mut I, indicator: &mut S) -> Result<(), Error> {
    match imu.init() {
        Ok(()) => {
            indicator.set_fault(false);
            info!("IMU online");
            Ok(())
        }
        Err(e) => {
            indicator.set_fault(true);
            warn!("IMU init failed: {:?}", e);
            Err(Error::ImuInit)
        }
    }
}

pub struct ControlLoop<I, EL, ER, ML, MR, T, C, S> {
    mode: LoopMode,
    cfg: LoopConfig,

    imu: I,
    wheel_left: Wheel<EL>,
    wheel_right: Wheel<ER>,
    motor_left: ML,
    motor_right: MR,
    transport: T,
    clock: C,
    indicator: S,

    estimator: AttitudeEstimator,
    controller: BalanceController,
    calibrator: Calibrator,

    /// Latest operator command. Persists until the next frame.
    command: TeleopCommand,
    /// Last good IMU sample, reused when a read fails.
    sample: ImuSample,
    output: ControlOutput,
    ticks: u32,
}

impl<I, EL, ER, ML, MR, T, C, S> ControlLoop<I, EL, ER, ML, MR, T, C, S>
where
    I: Imu,
    EL: WheelEncoder,
    ER: WheelEncoder,
    ML: Motor,
    MR: Motor,
    T: Transport,
    C: Clock,
    S: StatusIndicator,
{
    /// `wheel_direction` is the encoder mounting sign shared by both wheels.
    pub fn new(
        mode: LoopMode,
        cfg: LoopConfig,
        balance: BalanceConfig,
        imu_cal: ImuCalibration,
        wheel_direction: f32,
        hw: Peripherals<I, EL, ER, ML, MR, T, C, S>,
    ) -> Self {
        let f_ctrl = 1.0 / cfg.period;
        Self {
            mode,
            cfg,
            imu: hw.imu,
            wheel_left: Wheel::new(hw.encoder_left, wheel_direction, f_ctrl),
            wheel_right: Wheel::new(hw.encoder_right, wheel_direction, f_ctrl),
            motor_left: hw.motor_left,
            motor_right: hw.motor_right,
            transport: hw.transport,
            clock: hw.clock,
            indicator: hw.indicator,
            estimator: AttitudeEstimator::new(imu_cal, cfg.period),
            controller: BalanceController::new(balance),
            calibrator: Calibrator::new(),
            command: TeleopCommand::STOP,
            sample: ImuSample::default(),
            output: ControlOutput::ZERO,
            ticks: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    /// Iterations completed.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    pub fn command(&self) -> TeleopCommand {
        self.command
    }

    /// Control law output of the last tick, before the mode override.
    #[inline]
    pub fn output(&self) -> ControlOutput {
        self.output
    }

    pub fn estimator(&self) -> &AttitudeEstimator {
        &self.estimator
    }

    pub fn controller(&self) -> &BalanceController {
        &self.controller
    }

    pub fn wheels(&self) -> (&Wheel<EL>, &Wheel<ER>) {
        (&self.wheel_left, &self.wheel_right)
    }

    pub fn motors(&self) -> (&ML, &MR) {
        (&self.motor_left, &self.motor_right)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn indicator(&self) -> &S {
        &self.indicator
    }

    /// Run until a mode asks to halt. Motors are left at 0 V.
    pub fn run(&mut self) {
        while self.step() == Tick::Continue {}
    }

    /// Run one iteration.
    pub fn step(&mut self) -> Tick {
        self.clock.reset();

        if self.mode == LoopMode::CalibrateImu {
            return self.calibration_step();
        }

        self.poll_transport();
        self.read_imu();
        let attitude = *self.estimator.update(&self.sample);

        let pitch = attitude.pitch.mean;
        self.wheel_left.update(pitch);
        self.wheel_right.update(pitch);

        self.output = self.controller.update(&ControlInput {
            pitch,
            pitch_rate: attitude.pitch_rate.mean,
            yaw_rate: attitude.yaw_rate,
            wheel_vel_left: self.wheel_left.velocity(),
            wheel_vel_right: self.wheel_right.velocity(),
            lin_vel_cmd: self.command.lin_vel,
            yaw_vel_cmd: self.command.yaw_vel,
        });

        let tick = self.actuate();
        if tick == Tick::Halt {
            return tick;
        }

        self.ticks = self.ticks.wrapping_add(1);
        self.wait_period();
        Tick::Continue
    }

    fn poll_transport(&mut self) {
        if let Some(cmd) = self.transport.poll() {
            self.command = cmd;
            self.transport.send(&Telemetry {
                lin_vel: self.controller.lin_vel(),
                yaw_vel: self.estimator.yaw_rate(),
                v_cmd_left: self.output.v_cmd_left,
                v_cmd_right: self.output.v_cmd_right,
            });
        }
    }

    fn read_imu(&mut self) {
        match self.imu.read() {
            Ok(s) => self.sample = s,
            Err(e) => warn!("IMU read failed, reusing last sample: {:?}", e),
        }
    }

    fn actuate(&mut self) -> Tick {
        let log_now = self.ticks.checked_rem(self.cfg.log_divider) == Some(0);

        match self.mode {
            LoopMode::Balance => {
                self.motor_left.set_voltage(self.output.v_cmd_left);
                self.motor_right.set_voltage(self.output.v_cmd_right);
                self.indicator.set_fault(self.controller.is_tipped());
            }
            LoopMode::SerialDebug => {
                self.stop_motors();
                if log_now {
                    info!(
                        "angle L {:.2} R {:.2} rad | pitch {:.2} rad | cmd L {:.2} R {:.2} V",
                        self.wheel_left.angle(),
                        self.wheel_right.angle(),
                        self.estimator.pitch(),
                        self.output.v_cmd_left,
                        self.output.v_cmd_right,
                    );
                }
            }
            LoopMode::MotorSpeedTest => {
                self.motor_left.set_voltage(self.cfg.test_voltage);
                self.motor_right.set_voltage(self.cfg.test_voltage);
                if log_now {
                    info!(
                        "velocity L {:.2} R {:.2} rad/s",
                        self.wheel_left.velocity(),
                        self.wheel_right.velocity(),
                    );
                }
            }
            LoopMode::MaxFrequencyProbe => {
                let elapsed = self.clock.elapsed();
                self.stop_motors();
                if elapsed > 0.0 {
                    info!("max control frequency {:.0} Hz", 1.0 / elapsed);
                } else {
                    info!("iteration below clock resolution");
                }
                return Tick::Halt;
            }
            // Handled before the pipeline runs.
            LoopMode::CalibrateImu => {}
        }
        Tick::Continue
    }

    fn calibration_step(&mut self) -> Tick {
        self.stop_motors();

        match self.imu.read_raw() {
            Ok(raw) => self.calibrator.push(&raw),
            Err(e) => warn!("IMU read failed during calibration: {:?}", e),
        }

        let target = self.cfg.calibration_samples.max(calibration::MIN_SAMPLES);
        if self.calibrator.count() >= target {
            if let Some(table) = self.calibrator.finish() {
                info!(
                    "IMU calibration from {} samples:\n{}",
                    self.calibrator.count(),
                    CalibrationCode(&table)
                );
                return Tick::Halt;
            }
        }

        self.ticks = self.ticks.wrapping_add(1);
        self.wait_period();
        Tick::Continue
    }

    fn stop_motors(&mut self) {
        self.motor_left.set_voltage(0.0);
        self.motor_right.set_voltage(0.0);
    }

    fn wait_period(&self) {
        while self.clock.elapsed() < self.cfg.period {}
    }
}
