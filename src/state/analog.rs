//! Analog Module - Sensor sampling and change detection
//!
//! Capability set shared by the analog input models (touch, color,
//! ultrasonic, gyro): read raw input, quantize to a logical reading,
//! notify on change. Gesture decoding sits behind the notification
//! (a touch sensor forwards its reading into a button decoder).
//!
//! The sampler holds the previous logical reading and calls
//! `reading_changed` only on transitions, so downstream decoders see
//! stable quantized values, never raw noise.
//!
//! # Pattern
//!
//! - Device model implements [`AnalogSensor`]
//! - Its tick path calls [`AnalogSampler::poll`] once per step
//! - `reading_changed(prev, curr)` drives decoders or cached state

use crate::types::DeviceKind;

// =============================================================================
// CAPABILITY TRAIT
// =============================================================================

/// Capability set of an analog input model.
///
/// `query` returns the quantized logical reading, not the raw value: a
/// touch sensor reads 1 above its threshold and 0 below, a color sensor
/// in reflected mode reads a 0-100 percentage, and so on.
pub trait AnalogSensor {
    /// Read and quantize the current physical input.
    fn query(&mut self) -> i32;

    /// Hook invoked by the sampler when the quantized reading changes.
    fn reading_changed(&mut self, previous: i32, current: i32);

    /// Device tag used for display and control lookup.
    fn device_kind(&self) -> DeviceKind;
}

// =============================================================================
// SAMPLER
// =============================================================================

/// Polls an [`AnalogSensor`] and latches reading transitions.
///
/// The polling cadence is owned by the simulation clock; the sampler
/// only fixes the contract that `reading_changed` fires exactly on
/// quantized transitions.
#[derive(Debug)]
pub struct AnalogSampler {
    previous: i32,
}

impl AnalogSampler {
    /// Sampler with an initial logical reading of 0.
    pub fn new() -> Self {
        Self { previous: 0 }
    }

    /// The logical reading seen by the last poll.
    #[inline]
    pub fn previous(&self) -> i32 {
        self.previous
    }

    /// Query the sensor once. Returns true if the reading changed.
    pub fn poll<S: AnalogSensor + ?Sized>(&mut self, sensor: &mut S) -> bool {
        let current = sensor.query();
        if current == self.previous {
            return false;
        }
        let previous = std::mem::replace(&mut self.previous, current);
        sensor.reading_changed(previous, current);
        true
    }
}

impl Default for AnalogSampler {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted sensor: replays a fixed raw sequence through a threshold.
    struct Scripted {
        raw: Vec<i32>,
        cursor: usize,
        threshold: i32,
        transitions: Vec<(i32, i32)>,
    }

    impl Scripted {
        fn new(raw: &[i32], threshold: i32) -> Self {
            Self {
                raw: raw.to_vec(),
                cursor: 0,
                threshold,
                transitions: Vec::new(),
            }
        }
    }

    impl AnalogSensor for Scripted {
        fn query(&mut self) -> i32 {
            let raw = self.raw[self.cursor.min(self.raw.len() - 1)];
            self.cursor += 1;
            (raw > self.threshold) as i32
        }

        fn reading_changed(&mut self, previous: i32, current: i32) {
            self.transitions.push((previous, current));
        }

        fn device_kind(&self) -> DeviceKind {
            DeviceKind::Touch
        }
    }

    #[test]
    fn test_change_only_notification() {
        let mut sensor = Scripted::new(&[0, 3000, 3000, 0], 2500);
        let mut sampler = AnalogSampler::new();

        let changed: Vec<bool> = (0..4).map(|_| sampler.poll(&mut sensor)).collect();

        assert_eq!(changed, vec![false, true, false, true]);
        assert_eq!(sensor.transitions, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_quantized_sequence() {
        // Raw [0, 3000, 3000, 0] quantizes to logical [0, 1, 1, 0].
        let mut sensor = Scripted::new(&[0, 3000, 3000, 0], 2500);
        let mut sampler = AnalogSampler::new();

        let mut logical = Vec::new();
        for _ in 0..4 {
            sampler.poll(&mut sensor);
            logical.push(sampler.previous());
        }

        assert_eq!(logical, vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        // A reading exactly at the threshold stays logical 0.
        let mut sensor = Scripted::new(&[2500, 2501], 2500);
        let mut sampler = AnalogSampler::new();

        assert!(!sampler.poll(&mut sensor));
        assert!(sampler.poll(&mut sensor));
        assert_eq!(sampler.previous(), 1);
    }

    #[test]
    fn test_initial_high_reading_counts_as_change() {
        let mut sensor = Scripted::new(&[4000], 2500);
        let mut sampler = AnalogSampler::new();

        assert!(sampler.poll(&mut sensor));
        assert_eq!(sensor.transitions, vec![(0, 1)]);
    }
}
