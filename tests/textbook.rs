use std::collections::HashMap;

use viterbi_dp::{decode, Decoder, Hmm};

type Maps = (
    HashMap<&'static str, f64>,
    HashMap<&'static str, HashMap<&'static str, f64>>,
    HashMap<&'static str, HashMap<&'static str, f64>>,
);

const STATES: [&str; 2] = ["Healthy", "Fever"];
const OBS: [&str; 3] = ["normal", "cold", "dizzy"];

fn fever_maps() -> Maps {
    let start = HashMap::from([("Healthy", 0.6), ("Fever", 0.4)]);
    let trans = HashMap::from([
        ("Healthy", HashMap::from([("Healthy", 0.7), ("Fever", 0.3)])),
        ("Fever", HashMap::from([("Healthy", 0.4), ("Fever", 0.6)])),
    ]);
    let emit = HashMap::from([
        (
            "Healthy",
            HashMap::from([("normal", 0.5), ("cold", 0.4), ("dizzy", 0.1)]),
        ),
        (
            "Fever",
            HashMap::from([("normal", 0.1), ("cold", 0.3), ("dizzy", 0.6)]),
        ),
    ]);
    (start, trans, emit)
}

#[test]
fn textbook_fever_example() {
    let (start, trans, emit) = fever_maps();
    let best = decode(&OBS, &STATES, &start, &trans, &emit, false).unwrap();
    assert_eq!(best.states, vec!["Healthy", "Healthy", "Fever"]);
    assert!((best.probability - 0.01512).abs() < 1e-12);
    assert!((best.log_probability - 0.01512f64.ln()).abs() < 1e-9);
}

#[test]
fn textbook_with_table_returns_same_result() {
    let (start, trans, emit) = fever_maps();
    let plain = decode(&OBS, &STATES, &start, &trans, &emit, false).unwrap();
    let tabled = decode(&OBS, &STATES, &start, &trans, &emit, true).unwrap();
    assert_eq!(plain, tabled);
}

#[test]
fn textbook_table_lines() {
    let (start, trans, emit) = fever_maps();
    let hmm = Hmm::from_maps(&STATES, &start, &trans, &emit).unwrap();
    let decoder = Decoder::new(&hmm);
    let trellis = decoder.forward(&OBS).unwrap();
    let lines: Vec<String> = decoder.table(&trellis).collect();
    assert_eq!(
        lines,
        vec![
            "       0        1        2",
            "Healthy: 0.300000 0.084000 0.005880",
            "Fever: 0.040000 0.027000 0.015120",
        ]
    );
    // The trellis is still usable afterwards.
    let tb = decoder.traceback(&trellis).unwrap();
    assert_eq!(tb.path, vec![0, 0, 1]);
}

#[test]
fn textbook_single_observation() {
    let (start, trans, emit) = fever_maps();
    let best = decode(&["dizzy"], &STATES, &start, &trans, &emit, false).unwrap();
    // Healthy: 0.6 * 0.1 = 0.06, Fever: 0.4 * 0.6 = 0.24
    assert_eq!(best.states, vec!["Fever"]);
    assert!((best.probability - 0.24).abs() < 1e-12);
}

#[test]
fn textbook_display() {
    let (start, trans, emit) = fever_maps();
    let best = decode(&OBS, &STATES, &start, &trans, &emit, false).unwrap();
    let text = best.to_string();
    assert!(text.starts_with("Healthy Healthy Fever (probability 0.0151"));
}

#[test]
fn state_order_is_the_tie_break() {
    // Fully symmetric model: every path has the same probability.
    let start = HashMap::from([("A", 0.5), ("B", 0.5)]);
    let trans = HashMap::from([
        ("A", HashMap::from([("A", 0.5), ("B", 0.5)])),
        ("B", HashMap::from([("A", 0.5), ("B", 0.5)])),
    ]);
    let emit = HashMap::from([
        ("A", HashMap::from([("x", 1.0)])),
        ("B", HashMap::from([("x", 1.0)])),
    ]);
    let ab = decode(&["x", "x", "x"], &["A", "B"], &start, &trans, &emit, false).unwrap();
    assert_eq!(ab.states, vec!["A", "A", "A"]);
    let ba = decode(&["x", "x", "x"], &["B", "A"], &start, &trans, &emit, false).unwrap();
    assert_eq!(ba.states, vec!["B", "B", "B"]);
    assert_eq!(ab.probability, ba.probability);
}

#[test]
fn long_sequence_underflow_still_returns_a_path() {
    // 1500 steps of factors <= 0.6 drive every linear score below f64::MIN_POSITIVE.
    let start = HashMap::from([("A", 0.5), ("B", 0.5)]);
    let trans = HashMap::from([
        ("A", HashMap::from([("A", 0.6), ("B", 0.4)])),
        ("B", HashMap::from([("A", 0.4), ("B", 0.6)])),
    ]);
    let emit = HashMap::from([
        ("A", HashMap::from([('x', 0.6)])),
        ("B", HashMap::from([('x', 0.4)])),
    ]);
    let obs = vec!['x'; 1500];
    let best = decode(&obs, &["A", "B"], &start, &trans, &emit, false).unwrap();
    assert_eq!(best.states.len(), 1500);
    assert_eq!(best.probability, 0.0);
    assert_eq!(best.states[0], "A");

    let hmm = Hmm::from_maps(&["A", "B"], &start, &trans, &emit).unwrap();
    let err = Decoder::new(&hmm).decode(&obs).unwrap_err();
    assert!(err.to_string().contains("log-space"));
}
