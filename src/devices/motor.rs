//! Motor - Commanded speed integrated into shaft angle
//!
//! Output ports A-D. The commanded speed is a percentage of the rated
//! speed; the model integrates it into the shaft angle each tick. A
//! spinning motor therefore changes every tick, an idle one never does.

use std::time::Duration;

use crate::error::DeviceError;
use crate::types::{DeviceKind, PortId};

use super::{DeviceNode, snapshot_changed};

/// Rated no-load speed of the large motor.
pub const LARGE_MOTOR_RPM: f64 = 170.0;

/// Rated no-load speed of the medium motor.
pub const MEDIUM_MOTOR_RPM: f64 = 250.0;

/// Simulated motor on an output port.
pub struct MotorNode {
    port: PortId,
    kind: DeviceKind,
    speed: i32,
    angle: f64,
    rendered: (i32, i64),
}

impl MotorNode {
    /// A large motor (170 rpm rated).
    pub fn large(port: PortId) -> Self {
        Self::with_kind(port, DeviceKind::LargeMotor)
    }

    /// A medium motor (250 rpm rated).
    pub fn medium(port: PortId) -> Self {
        Self::with_kind(port, DeviceKind::MediumMotor)
    }

    fn with_kind(port: PortId, kind: DeviceKind) -> Self {
        Self {
            port,
            kind,
            speed: 0,
            angle: 0.0,
            rendered: (0, 0),
        }
    }

    /// Command a speed in percent. Clamped to -100..=100.
    pub fn set_speed(&mut self, percent: i32) {
        self.speed = percent.clamp(-100, 100);
    }

    /// Stop the motor (speed 0, shaft holds position).
    pub fn stop(&mut self) {
        self.speed = 0;
    }

    #[inline]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Accumulated shaft angle in whole degrees.
    #[inline]
    pub fn angle(&self) -> i64 {
        self.angle.round() as i64
    }

    /// Zero the angle counter, like the firmware clear-counts command.
    pub fn clear_counts(&mut self) {
        self.angle = 0.0;
    }

    /// Rated speed of this motor size.
    pub fn rated_rpm(&self) -> f64 {
        match self.kind {
            DeviceKind::MediumMotor => MEDIUM_MOTOR_RPM,
            _ => LARGE_MOTOR_RPM,
        }
    }
}

impl DeviceNode for MotorNode {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, elapsed: Duration) -> Result<(), DeviceError> {
        // degrees/s at full speed = rpm / 60 * 360
        let full_dps = self.rated_rpm() * 6.0;
        self.angle += self.speed as f64 / 100.0 * full_dps * elapsed.as_secs_f64();
        Ok(())
    }

    fn did_change(&mut self) -> bool {
        let current = (self.speed, self.angle());
        snapshot_changed(&mut self.rendered, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(node: &mut MotorNode, ms: u64) {
        node.update_state(Duration::from_millis(ms)).unwrap();
    }

    #[test]
    fn test_large_motor_full_speed_rate() {
        // 170 rpm = 1020 deg/s at full speed.
        let mut motor = MotorNode::large(PortId::ONE);
        motor.set_speed(100);
        step(&mut motor, 1000);
        assert_eq!(motor.angle(), 1020);
    }

    #[test]
    fn test_medium_motor_is_faster() {
        let mut large = MotorNode::large(PortId::ONE);
        let mut medium = MotorNode::medium(PortId::TWO);
        large.set_speed(100);
        medium.set_speed(100);
        step(&mut large, 1000);
        step(&mut medium, 1000);
        assert!(medium.angle() > large.angle());
        assert_eq!(medium.angle(), 1500);
    }

    #[test]
    fn test_half_speed_halves_the_rate() {
        let mut motor = MotorNode::large(PortId::ONE);
        motor.set_speed(50);
        step(&mut motor, 1000);
        assert_eq!(motor.angle(), 510);
    }

    #[test]
    fn test_reverse_speed_winds_back() {
        let mut motor = MotorNode::large(PortId::ONE);
        motor.set_speed(-100);
        step(&mut motor, 500);
        assert_eq!(motor.angle(), -510);
    }

    #[test]
    fn test_speed_clamps() {
        let mut motor = MotorNode::medium(PortId::THREE);
        motor.set_speed(250);
        assert_eq!(motor.speed(), 100);
        motor.set_speed(-250);
        assert_eq!(motor.speed(), -100);
    }

    #[test]
    fn test_stop_freezes_angle() {
        let mut motor = MotorNode::large(PortId::ONE);
        motor.set_speed(100);
        step(&mut motor, 1000);
        motor.stop();
        let frozen = motor.angle();
        step(&mut motor, 1000);
        assert_eq!(motor.angle(), frozen);
    }

    #[test]
    fn test_spinning_motor_changes_every_tick() {
        let mut motor = MotorNode::large(PortId::ONE);
        motor.set_speed(100);

        step(&mut motor, 32);
        assert!(motor.did_change());
        step(&mut motor, 32);
        assert!(motor.did_change());

        motor.stop();
        assert!(motor.did_change()); // Speed change itself renders once
        step(&mut motor, 32);
        assert!(!motor.did_change());
    }

    #[test]
    fn test_clear_counts() {
        let mut motor = MotorNode::medium(PortId::FOUR);
        motor.set_speed(100);
        step(&mut motor, 1000);
        motor.clear_counts();
        assert_eq!(motor.angle(), 0);
    }
}
