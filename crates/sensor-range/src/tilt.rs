//! # Tilt Check
//!
//! A range finder tilted too far from the vertical reports slant range instead
//! of height. The check compares the cosine of the angle between the sensor
//! axis and the earth vertical against a threshold, avoiding an arccosine.

use nalgebra::Matrix3;

#[derive(Debug, Clone)]
pub struct TiltCheck {
    tilt_rad: f32,
    /// Sine of the mounting tilt about the body Y axis.
    sin_tilt: f32,
    /// Cosine of the mounting tilt about the body Y axis.
    cos_tilt: f32,
    cos_max_tilt: f32,
    /// 2,2 element of the rotation matrix from sensor frame to earth frame.
    cos_tilt_to_earth: f32,
}

impl TiltCheck {
    pub fn new(tilt_rad: f32, cos_max_tilt: f32) -> Self {
        Self {
            tilt_rad,
            sin_tilt: tilt_rad.sin(),
            cos_tilt: tilt_rad.cos(),
            cos_max_tilt,
            cos_tilt_to_earth: 0.0,
        }
    }

    /// Update the mounting tilt and threshold. Trigonometry is only
    /// recomputed when the tilt actually changed.
    pub fn set_tilt(&mut self, tilt_rad: f32, cos_max_tilt: f32) {
        if (self.tilt_rad - tilt_rad).abs() > f32::EPSILON {
            self.tilt_rad = tilt_rad;
            self.sin_tilt = tilt_rad.sin();
            self.cos_tilt = tilt_rad.cos();
        }
        self.cos_max_tilt = cos_max_tilt;
    }

    /// Compute the effective vertical alignment from the body-to-earth rotation.
    pub fn update(&mut self, r_to_earth: &Matrix3<f32>) {
        self.cos_tilt_to_earth =
            r_to_earth[(2, 0)] * self.sin_tilt + r_to_earth[(2, 2)] * self.cos_tilt;
    }

    pub fn is_tilt_ok(&self) -> bool {
        self.cos_tilt_to_earth > self.cos_max_tilt
    }

    pub fn cos_tilt_to_earth(&self) -> f32 {
        self.cos_tilt_to_earth
    }

    pub fn cos_max_tilt(&self) -> f32 {
        self.cos_max_tilt
    }

    pub fn tilt_rad(&self) -> f32 {
        self.tilt_rad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Vector3};

    fn pitch(angle: f32) -> Matrix3<f32> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner()
    }

    #[test]
    fn level_sensor_is_aligned() {
        let mut tilt = TiltCheck::new(0.0, 0.7071);
        tilt.update(&Matrix3::identity());
        assert_relative_eq!(tilt.cos_tilt_to_earth(), 1.0);
        assert!(tilt.is_tilt_ok());
    }

    #[test]
    fn not_ok_before_first_update() {
        let tilt = TiltCheck::new(0.0, 0.7071);
        assert!(!tilt.is_tilt_ok());
    }

    #[test]
    fn vehicle_pitch_reduces_alignment() {
        let mut tilt = TiltCheck::new(0.0, 0.7071);
        tilt.update(&pitch(0.5));
        assert_relative_eq!(tilt.cos_tilt_to_earth(), 0.5f32.cos(), epsilon = 1e-6);
        assert!(tilt.is_tilt_ok());

        tilt.update(&pitch(std::f32::consts::FRAC_PI_3));
        assert!(!tilt.is_tilt_ok());
    }

    #[test]
    fn mounting_tilt_compensates_vehicle_pitch() {
        // Sensor mounted pitched forward by 0.3 rad, vehicle pitched back by the same amount.
        let mut tilt = TiltCheck::new(0.3, 0.9);
        tilt.update(&pitch(-0.3));
        assert_relative_eq!(tilt.cos_tilt_to_earth(), 1.0, epsilon = 1e-6);
        assert!(tilt.is_tilt_ok());
    }

    #[test]
    fn threshold_is_strict() {
        let mut tilt = TiltCheck::new(0.0, 1.0);
        tilt.update(&Matrix3::identity());
        assert!(!tilt.is_tilt_ok());
    }

    #[test]
    fn set_tilt_ignores_negligible_change() {
        let mut tilt = TiltCheck::new(0.2, 0.7071);
        tilt.set_tilt(0.2 + f32::EPSILON / 2.0, 0.5);
        assert_eq!(tilt.tilt_rad(), 0.2);
        assert_eq!(tilt.cos_max_tilt(), 0.5);

        tilt.set_tilt(0.4, 0.5);
        assert_eq!(tilt.tilt_rad(), 0.4);
        tilt.update(&Matrix3::identity());
        assert_relative_eq!(tilt.cos_tilt_to_earth(), 0.4f32.cos());
    }
}
