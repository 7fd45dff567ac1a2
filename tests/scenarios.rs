//! End-to-end behavior on simple single-branch patterns.

use tagebp::*;

const PC: u32 = 0x0000_1234;

/// A predictor with no tagged components, so every prediction comes from
/// the bimodal table.
fn bimodal_only() -> TAGEPredictor {
    TAGEConfig::new(TAGEBaseConfig::default()).build_seeded(0).unwrap()
}

fn base_counter(tage: &TAGEPredictor, pc: u32) -> u8 {
    let base = tage.base();
    base.get_entry(base.get_index(pc)).value()
}

/// Run 'outcomes' through the predictor and return which predictions hit.
fn run(tage: &mut TAGEPredictor, outcomes: &[Outcome]) -> Vec<bool> {
    outcomes.iter().map(|outcome| {
        let prediction = tage.predict(PC);
        tage.update(PC, *outcome);
        prediction == *outcome
    }).collect()
}

fn hit_rate(hits: &[bool]) -> f64 {
    hits.iter().filter(|h| **h).count() as f64 / hits.len() as f64
}

#[test]
fn alternating_branch_defeats_bimodal_counter() {
    let mut tage = bimodal_only();
    let mut seen = Vec::new();
    let mut hits = Vec::new();
    for i in 0..10_000 {
        let outcome = Outcome::from(i % 2 == 0);
        let prediction = tage.predict(PC);
        tage.update(PC, outcome);
        hits.push(prediction == outcome);
        seen.push(base_counter(&tage, PC));
    }

    // The counter flips between the two 'taken' states and never settles
    // on a state that follows the pattern.
    assert!(seen.iter().all(|v| *v == 2 || *v == 3));
    assert!(seen.contains(&2) && seen.contains(&3));

    let trailing = hit_rate(&hits[9_000..]);
    assert!((0.45..=0.55).contains(&trailing), "hit rate {}", trailing);
}

#[test]
fn constant_then_alternating_branch() {
    let mut tage = bimodal_only();
    let constant = vec![Outcome::T; 1_000];
    let hits = run(&mut tage, &constant);
    assert_eq!(hit_rate(&hits), 1.0);
    assert_eq!(base_counter(&tage, PC), 3);

    let alternating: Vec<Outcome> = (0..4_000)
        .map(|i| Outcome::from(i % 2 == 1))
        .collect();
    let hits = run(&mut tage, &alternating);
    let trailing = hit_rate(&hits[3_000..]);
    assert!((0.45..=0.55).contains(&trailing), "hit rate {}", trailing);
}

#[test]
fn tagged_components_learn_alternation() {
    for policy in [AltPolicy::Simple, AltPolicy::UseAltOnNewAlloc] {
        let mut tage = TAGEConfig::default()
            .with_alt_policy(policy)
            .build_seeded(42)
            .unwrap();
        let outcomes: Vec<Outcome> = (0..10_000)
            .map(|i| Outcome::from(i % 2 == 0))
            .collect();
        let hits = run(&mut tage, &outcomes);
        let trailing = hit_rate(&hits[9_000..]);
        assert!(trailing > 0.9, "{:?}: hit rate {}", policy, trailing);
        assert!(tage.stats().tagged_provided() > 0);
    }
}

#[test]
fn unconditional_branches_shift_history() {
    let mut tage = TAGEConfig::default().build_seeded(0).unwrap();
    assert!(tage.ghr().data().not_any());
    tage.add_non_conditional_branch();
    tage.add_non_conditional_branch();
    assert_eq!(tage.ghr().data().count_ones(), 2);
    assert_eq!(tage.ghr().len(), 150);
    assert_eq!(tage.stats().clk, 0);
}
