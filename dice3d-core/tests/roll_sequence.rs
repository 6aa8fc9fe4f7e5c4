use std::time::Duration;

use dice3d_core::{
    presets, AnimationConfig, DiceEvent, DiceSimulation, DiceState, RollStyle, SimulationSettings,
};

const FRAME: Duration = Duration::from_millis(16);

fn run_until_idle(sim: &mut DiceSimulation) -> (Vec<DiceEvent>, Duration) {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;
    loop {
        elapsed += FRAME;
        let batch = sim.tick(FRAME);
        let done = batch.contains(&DiceEvent::StateChanged(DiceState::Idle));
        events.extend(batch);
        if done {
            return (events, elapsed);
        }
        assert!(elapsed < Duration::from_secs(30), "roll never settled");
    }
}

#[test]
fn roll_to_four_notifies_in_order() {
    let mut sim =
        DiceSimulation::new(presets::nested().unwrap(), SimulationSettings::default(), 9).unwrap();
    sim.roll(4, 3.0, 4.0, 1500).unwrap();
    assert_eq!(sim.display_value(), 0);
    assert!(!sim.interaction_enabled());

    let (events, elapsed) = run_until_idle(&mut sim);
    assert!(elapsed >= Duration::from_millis(1500));
    assert_eq!(events.first(), Some(&DiceEvent::ValueChanged(0)));
    assert_eq!(events.last(), Some(&DiceEvent::StateChanged(DiceState::Idle)));

    let values: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            DiceEvent::ValueChanged(v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec![0, 4]);
    assert_eq!(sim.display_value(), 4);
    assert!(sim.interaction_enabled());
}

#[test]
fn bounce_roll_reveals_early_and_settles_scale() {
    let mut sim =
        DiceSimulation::new(presets::nested().unwrap(), SimulationSettings::default(), 3).unwrap();
    let config = AnimationConfig::roll_to(2, 2.0, 2.0, 800)
        .unwrap()
        .with_style(RollStyle::Bounce {
            reveal_fraction: 0.5,
        })
        .unwrap();
    sim.roll_to(config).unwrap();

    let mut revealed_at = None;
    let mut elapsed = Duration::ZERO;
    while sim.state() != DiceState::Idle {
        elapsed += FRAME;
        if sim.tick(FRAME).contains(&DiceEvent::ValueChanged(2)) {
            revealed_at = Some(elapsed);
        }
    }
    let revealed_at = revealed_at.expect("value was never revealed");
    assert!(revealed_at >= Duration::from_millis(400));
    assert!(revealed_at < Duration::from_millis(800));
    assert!(elapsed >= Duration::from_millis(800));

    // The rendered frame stays well formed through the bounce
    let faces = sim.frame(&sim.viewport(320.0, 240.0));
    assert_eq!(faces.len(), 18);
    assert!(faces.iter().all(|f| f.polygon.iter().all(|p| p.x.is_finite())));
}

#[test]
fn second_roll_supersedes_first() {
    let mut sim =
        DiceSimulation::new(presets::classic(), SimulationSettings::default(), 1).unwrap();
    sim.roll(3, 3.0, 4.0, 1000).unwrap();
    for _ in 0..30 {
        sim.tick(FRAME);
    }
    sim.roll(5, 1.0, 1.0, 600).unwrap();

    let (events, _) = run_until_idle(&mut sim);
    assert!(!events.contains(&DiceEvent::ValueChanged(3)));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DiceEvent::StateChanged(DiceState::Idle)))
            .count(),
        1
    );
    assert_eq!(sim.display_value(), 5);
}
