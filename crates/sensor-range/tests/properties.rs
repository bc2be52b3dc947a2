use nalgebra::{Matrix3, Rotation3, Vector3};
use proptest::prelude::*;
use sensor_core::{RangeSample, SampleSlot, Sensor};
use sensor_range::{RangeFinderConfig, SensorRangeFinder};

const PERIOD_US: u64 = 100_000;

fn range_finder() -> SensorRangeFinder {
    SensorRangeFinder::new(RangeFinderConfig {
        min_distance_m: 0.5,
        max_distance_m: 30.0,
        cycle_dt_s: 0.1,
        ..Default::default()
    })
    .unwrap()
}

fn fuse(rf: &mut SensorRangeFinder, t_us: u64, distance_m: f32, r: &Matrix3<f32>) -> bool {
    let sample = RangeSample::new(t_us, distance_m, 100);
    rf.set_newest_sample(sample);
    rf.set_delayed_sample(SampleSlot(0), sample);
    rf.run_checks(t_us, r);
    let healthy = rf.is_delayed_healthy_data();
    rf.set_data_readiness(false);
    healthy
}

proptest! {
    #[test]
    fn varying_in_range_samples_are_valid(values in prop::collection::vec(0.6f32..14.0, 1..40)) {
        let mut rf = range_finder();
        for (i, v) in values.iter().enumerate() {
            // Alternate between the lower and upper half so consecutive readings always differ.
            let d = if i % 2 == 0 { *v } else { v + 15.0 };
            let t = (i as u64 + 1) * PERIOD_US;
            prop_assert!(fuse(&mut rf, t, d, &Matrix3::identity()), "rejected {} m", d);
        }
    }

    #[test]
    fn out_of_range_is_invalid_and_leaves_window(
        d in prop_oneof![0.0f32..0.49, 30.01f32..500.0],
        prefix in 1usize..4,
    ) {
        let mut rf = range_finder();
        for i in 0..prefix {
            fuse(&mut rf, (i as u64 + 1) * PERIOD_US, 3.0, &Matrix3::identity());
        }
        let window = rf.stuck_window();
        let t = (prefix as u64 + 1) * PERIOD_US;
        prop_assert!(!fuse(&mut rf, t, d, &Matrix3::identity()));
        prop_assert!(!rf.is_healthy());
        prop_assert_eq!(rf.stuck_window(), window);
    }

    #[test]
    fn excessive_tilt_is_invalid(angle in 0.80f32..3.1, d in 0.6f32..29.0) {
        let mut rf = range_finder();
        let r = Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner();
        prop_assert!(!fuse(&mut rf, PERIOD_US, d, &r));
        prop_assert!(!rf.is_tilt_ok());
        prop_assert!(!rf.can_be_used_as_failover());
    }

    #[test]
    fn delayed_distance_reads_back_exactly(d in prop::num::f32::NORMAL, slot in any::<u32>()) {
        let mut rf = range_finder();
        rf.set_delayed_sample(SampleSlot(slot), RangeSample::new(1, d, 100));
        prop_assert_eq!(rf.delayed_distance(), d);
        prop_assert!(rf.is_data_ready());
    }

    #[test]
    fn predicates_are_ordered(values in prop::collection::vec(0.0f32..40.0, 1..60)) {
        let mut rf = range_finder();
        for (i, d) in values.iter().enumerate() {
            fuse(&mut rf, (i as u64 + 1) * PERIOD_US, *d, &Matrix3::identity());
            if rf.can_reset_on_sensor() || rf.can_be_used_as_failover() {
                prop_assert!(rf.is_healthy());
            }
            if rf.is_stuck() {
                prop_assert!(!rf.is_healthy());
            }
            if let Some((min, max)) = rf.stuck_window() {
                prop_assert!(min <= max);
            }
        }
    }
}
