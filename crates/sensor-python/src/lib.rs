//! # Sensor Python
//!
//! Python bindings for the range finder health checks.
//! Exposes `RangeFinder`, driven once per fusion cycle with `run_checks()`,
//! and returns its status as a Python-friendly dict.

use nalgebra::Matrix3;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use sensor_core::{RangeSample, SampleSlot, Sensor};
use sensor_range::{RangeFinderConfig, RangeFinderStatus, SensorRangeFinder};

#[pyclass]
struct RangeFinder {
    inner: SensorRangeFinder,
}

fn to_py_status(py: Python<'_>, status: &RangeFinderStatus) -> PyResult<Py<PyAny>> {
    let out = pyo3::types::PyDict::new(py);
    out.set_item("healthy", status.healthy)?;
    out.set_item("data_ready", status.data_ready)?;
    out.set_item("in_bounds", status.in_bounds)?;
    out.set_item("tilt_ok", status.tilt_ok)?;
    out.set_item("continuous", status.continuous)?;
    out.set_item("stuck", status.stuck)?;
    out.set_item("quality_ok", status.quality_ok)?;
    out.set_item("interval_us", status.interval_us)?;
    out.set_item("cos_tilt_to_earth", status.cos_tilt_to_earth)?;
    out.set_item("delayed_distance_m", status.delayed_distance_m)?;
    out.set_item("delayed_timestamp_us", status.delayed_timestamp_us)?;
    Ok(out.unbind().into_any())
}

#[pymethods]
impl RangeFinder {
    /// Create a checker from an optional JSON configuration document.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RangeFinderConfig::from_json(json)
                .map_err(|e| PyValueError::new_err(format!("config error: {e:#}")))?,
            None => RangeFinderConfig::default(),
        };
        let inner = SensorRangeFinder::new(config)
            .map_err(|e| PyValueError::new_err(format!("config error: {e}")))?;
        Ok(RangeFinder { inner })
    }

    fn set_newest_sample(&mut self, timestamp_us: u64, distance_m: f32, quality: i8) {
        self.inner.set_newest_sample(RangeSample::new(timestamp_us, distance_m, quality));
    }

    fn set_delayed_sample(&mut self, slot: u32, timestamp_us: u64, distance_m: f32, quality: i8) {
        self.inner.set_delayed_sample(
            SampleSlot(slot),
            RangeSample::new(timestamp_us, distance_m, quality),
        );
    }

    fn delayed_distance(&self) -> f32 {
        self.inner.delayed_distance()
    }

    fn set_delayed_distance(&mut self, slot: u32, distance_m: f32) -> PyResult<()> {
        self.inner
            .set_delayed_distance(SampleSlot(slot), distance_m)
            .map_err(|e| PyRuntimeError::new_err(format!("correction error: {e}")))
    }

    fn set_data_readiness(&mut self, is_ready: bool) {
        self.inner.set_data_readiness(is_ready);
    }

    fn set_tilt(&mut self, tilt_rad: f32, cos_max_tilt: f32) -> PyResult<()> {
        self.inner
            .set_tilt(tilt_rad, cos_max_tilt)
            .map_err(|e| PyValueError::new_err(format!("config error: {e}")))
    }

    fn set_limits(&mut self, min_distance_m: f32, max_distance_m: f32) -> PyResult<()> {
        self.inner
            .set_limits(min_distance_m, max_distance_m)
            .map_err(|e| PyValueError::new_err(format!("config error: {e}")))
    }

    /// Run one fusion cycle. `rotation` is the row-major 3x3 body-to-earth matrix.
    fn run_checks(&mut self, time_us: u64, rotation: [[f32; 3]; 3]) {
        let r = Matrix3::from_fn(|i, j| rotation[i][j]);
        self.inner.run_checks(time_us, &r);
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }

    fn is_new_healthy_data(&self) -> bool {
        self.inner.is_new_healthy_data()
    }

    fn is_delayed_healthy_data(&self) -> bool {
        self.inner.is_delayed_healthy_data()
    }

    fn can_be_used_as_failover(&self) -> bool {
        self.inner.can_be_used_as_failover()
    }

    fn can_reset_on_sensor(&self) -> bool {
        self.inner.can_reset_on_sensor()
    }

    fn is_stuck(&self) -> bool {
        self.inner.is_stuck()
    }

    fn is_tilt_ok(&self) -> bool {
        self.inner.is_tilt_ok()
    }

    fn cos_tilt_to_earth(&self) -> f32 {
        self.inner.cos_tilt_to_earth()
    }

    /// Dict with every flag of the last cycle.
    fn status(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        to_py_status(py, &self.inner.status())
    }

    /// Same as `status()`, serialized as JSON for telemetry sinks.
    fn status_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.status())
            .map_err(|e| PyRuntimeError::new_err(format!("serialize error: {e}")))
    }

    fn config_json(&self) -> PyResult<String> {
        self.inner
            .config()
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(format!("serialize error: {e}")))
    }
}

#[pymodule]
fn sensorium(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<RangeFinder>()?;
    Ok(())
}
