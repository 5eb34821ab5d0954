use super::*;
use crate::label::{Label, LabelGroup};

const CARS: [([f64; 9], &str); 10] = [
    ([7.0, 1.5, 2.5, 2016.0, 69390.0, 0.0, 0.0, 1.0, 0.0], "PPPP"),
    ([5.26796, 1.9, 2.5, 2017.0, 77904.0, 0.0, 0.0, 1.0, 0.0], "PPPP"),
    ([5.26288, 1.48082, 1.94818, 2017.0, 98764.0, 0.0, 0.0, 1.0, 0.0], "PPPP"),
    ([5.26288, 1.48082, 1.94818, 2017.0, 123881.0, 0.0, 0.0, 1.0, 0.0], "PPNP"),
    ([5.25526, 1.4605, 1.89992, 2017.0, 73818.0, 0.0, 0.0, 1.0, 0.0], "NPPP"),
    ([5.26288, 1.48082, 1.94818, 2016.0, 91868.0, 0.0, 0.0, 1.0, 0.0], "PPPP"),
    ([6.30936, 1.88214, 2.00914, 2017.0, 50723.0, 0.0, 0.0, 1.0, 0.0], "PPPP"),
    ([5.10032, 1.48082, 1.905, 2017.0, 43545.0, 0.0, 0.0, 1.0, 0.0], "NPPP"),
    ([5.207, 1.48082, 1.87452, 2015.0, 67108.0, 0.0, 0.0, 1.0, 0.0], "NNPP"),
    ([5.2451, 1.49098, 1.89992, 2017.0, 82247.0, 0.0, 0.0, 0.0, 1.0], "NPPN"),
];

fn labels(code: &str) -> LabelGroup {
    let labels = code
        .chars()
        .map(|c| if c == 'P' { Label::Positive } else { Label::Negative })
        .collect();
    LabelGroup::new(labels).unwrap()
}

fn car(id: usize, values: &[f64], code: &str) -> LabeledPoint {
    LabeledPoint::new(DataPoint::new(id, values), labels(code))
}

fn car_learner() -> MultiTsmLearner {
    let mut m = MultiTsmLearner::new(
        vec![vec![0, 1, 2], vec![3], vec![4], vec![5, 6, 7, 8]],
        vec![
            GroupFlags::default(),
            GroupFlags::default(),
            GroupFlags::default(),
            GroupFlags::categorical(),
        ],
    )
    .unwrap();
    let points: Vec<LabeledPoint> = CARS
        .iter()
        .enumerate()
        .map(|(i, (xs, code))| car(i, xs, code))
        .collect();
    m.update(&points).unwrap();
    m
}

fn predict(m: &MultiTsmLearner, values: &[f64]) -> ExtendedLabel {
    m.predict(&DataPoint::new(0, values)).unwrap()
}

const GAS: [f64; 9] = [6.0, 1.7, 2.25, 2016.0, 69390.0, 0.0, 0.0, 1.0, 0.0];

fn with(base: [f64; 9], edits: &[(usize, f64)]) -> [f64; 9] {
    let mut out = base;
    for &(i, v) in edits {
        out[i] = v;
    }
    out
}

#[test]
fn car_fixture_trains_cleanly() {
    let m = car_learner();
    for i in 0..4 {
        assert_eq!(m.error_counts(i), Some((0, 0)));
        assert_eq!(
            m.group_state(i),
            Some(GroupState::Active(Orientation::PositiveConvex))
        );
    }
    assert!(m.is_running());
    assert!(!m.trigger_relabeling());

    let hull = m.standard_learner(0).unwrap().hull().unwrap();
    assert!(hull.polytope().is_some());
    assert_eq!(hull.cones().len(), 4);

    let year = m.standard_learner(1).unwrap().line().unwrap();
    assert_eq!(year.segment(), Some((2016.0, 2017.0)));
    assert_eq!(year.rays(), Some((2015.0, f64::INFINITY)));
    let year_backup = m.backup_learner(1).unwrap().line().unwrap();
    assert_eq!(year_backup.segment(), Some((2015.0, 2015.0)));
    assert_eq!(year_backup.rays(), Some((f64::NEG_INFINITY, 2016.0)));

    let price = m.standard_learner(2).unwrap().line().unwrap();
    assert_eq!(price.segment(), Some((43545.0, 98764.0)));
    assert_eq!(price.rays(), Some((f64::NEG_INFINITY, 123881.0)));

    assert!(m.backup_learner(3).is_none());
}

#[test]
fn car_fixture_predictions() {
    let m = car_learner();
    assert_eq!(predict(&m, &GAS), ExtendedLabel::Positive);
    assert_eq!(predict(&m, &with(GAS, &[(0, 9.0), (2, 2.5)])), ExtendedLabel::Unknown);
    let hybrid = with(GAS, &[(7, 0.0), (8, 1.0)]);
    assert_eq!(predict(&m, &hybrid), ExtendedLabel::Negative);
    let diesel = with(GAS, &[(5, 1.0), (7, 0.0)]);
    assert_eq!(predict(&m, &diesel), ExtendedLabel::Unknown);
}

#[test]
fn one_violation_flips_orientation() {
    let mut m = car_learner();
    m.update(&[car(20, &with(GAS, &[(3, 2014.5)]), "PPPP")]).unwrap();
    assert_eq!(m.error_counts(1), Some((1, 0)));
    assert_eq!(
        m.group_state(1),
        Some(GroupState::Active(Orientation::NegativeConvex))
    );
    assert_eq!(m.orientation_changed(1), Some(true));
    assert!(m.trigger_relabeling());
    assert!(m.standard_learner(1).is_none());

    let backup = m.backup_learner(1).unwrap().line().unwrap();
    assert_eq!(backup.segment(), Some((2015.0, 2015.0)));
    assert_eq!(backup.rays(), Some((2014.5, 2016.0)));

    assert_eq!(predict(&m, &GAS), ExtendedLabel::Positive);
    assert_eq!(predict(&m, &with(GAS, &[(3, 2014.7)])), ExtendedLabel::Unknown);
    assert_eq!(predict(&m, &with(GAS, &[(3, 2015.0)])), ExtendedLabel::Negative);
}

#[test]
fn both_orientations_failing_freezes_group() {
    let mut m = car_learner();
    m.update(&[car(20, &with(GAS, &[(3, 2014.5)]), "PPPP")]).unwrap();
    m.update(&[car(21, &with(GAS, &[(3, 2015.0)]), "PPPP")]).unwrap();
    assert_eq!(m.error_counts(1), Some((1, 1)));
    assert_eq!(m.group_state(1), Some(GroupState::Frozen));
    assert!(m.is_running());
    assert_eq!(predict(&m, &GAS), ExtendedLabel::Positive);

    // Frozen groups are skipped by later updates.
    m.update(&[car(22, &with(GAS, &[(3, 1990.0)]), "PPPP")]).unwrap();
    assert_eq!(m.error_counts(1), Some((1, 1)));
}

#[test]
fn categorical_conflict_freezes_immediately() {
    let mut m = car_learner();
    m.update(&[car(20, &with(GAS, &[(7, 0.0), (8, 1.0)]), "PPPP")])
        .unwrap();
    assert_eq!(m.error_counts(3), Some((1, 0)));
    assert_eq!(m.group_state(3), Some(GroupState::Frozen));
    assert_eq!(predict(&m, &GAS), ExtendedLabel::Positive);
    assert_eq!(
        predict(&m, &with(GAS, &[(7, 0.0), (8, 1.0)])),
        ExtendedLabel::Positive
    );
}

#[test]
fn all_frozen_predicts_unknown() {
    let mut m = MultiTsmLearner::new(vec![vec![0, 1]], vec![GroupFlags::categorical()]).unwrap();
    m.update(&[LabeledPoint::global(0, &[1.0, 0.0], Label::Positive)])
        .unwrap();
    m.update(&[LabeledPoint::global(1, &[1.0, 0.0], Label::Negative)])
        .unwrap();
    assert!(!m.is_running());
    assert_eq!(
        m.predict(&DataPoint::new(2, &[1.0, 0.0])).unwrap(),
        ExtendedLabel::Unknown
    );
}

#[test]
fn higher_threshold_tolerates_violations() {
    let mut m = MultiTsmLearner::new(vec![vec![0]], vec![GroupFlags::default()])
        .unwrap()
        .with_threshold(2)
        .unwrap();
    m.update(&[
        LabeledPoint::global(0, &[0.0], Label::Positive),
        LabeledPoint::global(1, &[1.0], Label::Positive),
    ])
    .unwrap();
    m.update(&[LabeledPoint::global(2, &[5.0], Label::Negative)])
        .unwrap();
    m.update(&[LabeledPoint::global(3, &[6.0], Label::Positive)])
        .unwrap();
    assert_eq!(m.error_counts(0), Some((1, 0)));
    assert!(m.standard_learner(0).is_some());
    assert!(MultiTsmLearner::new(vec![vec![0]], vec![GroupFlags::default()])
        .unwrap()
        .with_threshold(0)
        .is_err());
}

#[test]
fn settling_between_live_learners_keeps_labels_valid() {
    let mut m = MultiTsmLearner::new(vec![vec![0]], vec![GroupFlags::numeric(false)]).unwrap();
    assert_eq!(
        m.group_state(0),
        Some(GroupState::Active(Orientation::NegativeConvex))
    );
    m.update(&[
        LabeledPoint::global(0, &[1.0], Label::Positive),
        LabeledPoint::global(1, &[5.0], Label::Negative),
    ])
    .unwrap();
    assert_eq!(m.error_counts(0), Some((0, 0)));
    assert_eq!(
        m.group_state(0),
        Some(GroupState::Active(Orientation::PositiveConvex))
    );
    assert_eq!(m.orientation_changed(0), Some(false));
    assert!(!m.trigger_relabeling());

    // 6.0 falls in the standard learner's negative ray, so it dies.
    m.update(&[LabeledPoint::global(2, &[6.0], Label::Positive)])
        .unwrap();
    assert_eq!(m.error_counts(0), Some((1, 0)));
    assert_eq!(
        m.group_state(0),
        Some(GroupState::Active(Orientation::NegativeConvex))
    );
    assert_eq!(m.orientation_changed(0), Some(true));
    assert!(m.trigger_relabeling());
}

#[test]
fn malformed_inputs_leave_state_untouched() {
    let mut m = car_learner();
    let short = LabeledPoint::new(DataPoint::new(0, &[1.0, 2.0]), labels("PPPP"));
    assert!(matches!(
        m.update(&[short]),
        Err(TsmError::DimensionMismatch { expected: 9, found: 2 })
    ));
    let global_negative = LabeledPoint::global(1, &GAS, Label::Negative);
    assert!(matches!(
        m.update(&[global_negative]),
        Err(TsmError::MalformedLabel { .. })
    ));
    let wrong_len = car(2, &GAS, "PPP");
    assert!(m.update(&[wrong_len]).is_err());
    for i in 0..4 {
        assert_eq!(m.error_counts(i), Some((0, 0)));
    }
    assert!(m.predict(&DataPoint::new(3, &[1.0])).is_err());
}

#[test]
fn construction_is_validated() {
    assert!(MultiTsmLearner::new(Vec::new(), Vec::new()).is_err());
    assert!(MultiTsmLearner::new(vec![vec![0]], Vec::new()).is_err());
    assert!(MultiTsmLearner::new(vec![Vec::new()], vec![GroupFlags::default()]).is_err());
}

#[test]
fn flags_deserialize_with_defaults() {
    let f: GroupFlags = serde_json::from_str(r#"{"categorical": true}"#).unwrap();
    assert!(f.positive_convex);
    assert!(f.categorical);
    let f: GroupFlags = serde_json::from_str("{}").unwrap();
    assert_eq!(f, GroupFlags::default());
}
