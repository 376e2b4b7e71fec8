//! Property tests for the control layout walk and the spawn timer.

use codefall_engine::prelude::*;
use proptest::prelude::*;

fn control_config() -> impl Strategy<Value = ControlConfig> {
    (0u32..80, 0i64..120, 0.0f64..1.0, 0.0f64..3.0).prop_map(
        |(count, jitter, gap_probability, rotation)| ControlConfig {
            count,
            jitter,
            gap_probability,
            rotation,
            ..Default::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn layout_respects_walk_invariants(config in control_config(), seed in any::<u64>()) {
        let width = 600.0;
        let placements = layout_controls(&config, width, &mut SceneRng::seeded(seed));

        prop_assert!(placements.len() <= config.count as usize);
        for p in &placements {
            prop_assert_eq!(p.rotation.abs(), config.rotation);
            prop_assert!(p.x >= config.margin);
            prop_assert!(p.x <= width - config.margin + config.x_spacing + config.jitter as f64);
            prop_assert!(p.y >= config.start_y);
        }
        // Rows only ever move down.
        for pair in placements.windows(2) {
            prop_assert!(pair[1].y >= pair[0].y);
        }
    }

    #[test]
    fn layout_is_reproducible(config in control_config(), seed in any::<u64>()) {
        let a = layout_controls(&config, 600.0, &mut SceneRng::seeded(seed));
        let b = layout_controls(&config, 600.0, &mut SceneRng::seeded(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn no_gaps_means_every_attempt_places(seed in any::<u64>(), count in 0u32..60) {
        let config = ControlConfig { count, gap_probability: 0.0, ..Default::default() };
        let placements = layout_controls(&config, 600.0, &mut SceneRng::seeded(seed));
        prop_assert_eq!(placements.len(), count as usize);
    }

    #[test]
    fn spawn_timer_fires_every_thirty_steps(steps in 1usize..2000) {
        let mut timer = SpawnTimer::new(0.5, 1.0 / 60.0);
        let fired: usize = (0..steps).map(|_| timer.advance()).sum();
        // One spawn per 30 steps, exactly.
        let expected = steps / 30;
        prop_assert_eq!(fired, expected);
        prop_assert_eq!(timer.fired(), expected as u64);
        let mut batched = SpawnTimer::new(0.5, 1.0 / 60.0);
        prop_assert_eq!(batched.advance_by(steps as u64), expected);
    }

    #[test]
    fn random_int_stays_in_range(seed in any::<u64>(), min in -100i64..100, span in 0i64..100) {
        let mut rng = SceneRng::seeded(seed);
        for _ in 0..32 {
            let v = rng.random_int(min, min + span);
            prop_assert!(v >= min && v <= min + span);
        }
    }
}
