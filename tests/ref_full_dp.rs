use rand::{rngs::StdRng, Rng, SeedableRng};
use viterbi_dp::{Decoder, Hmm, ZeroPathPolicy};

/// Probability of every one of the N^T state paths; returns the maximum.
fn brute_force_best(hmm: &Hmm<usize, usize>, obs: &[usize]) -> f64 {
    let n = hmm.n_states();
    let t = obs.len();
    let total = n.pow(t as u32);
    let mut best = 0.0f64;
    let mut path = vec![0usize; t];
    for code in 0..total {
        let mut c = code;
        for slot in path.iter_mut() {
            *slot = c % n;
            c /= n;
        }
        let mut p = hmm.start(path[0]) * hmm.emission(path[0], obs[0]).unwrap();
        for i in 1..t {
            p *= hmm.transition(path[i - 1], path[i]) * hmm.emission(path[i], obs[i]).unwrap();
        }
        best = best.max(p);
    }
    best
}

fn random_hmm(rng: &mut StdRng, n: usize, v: usize) -> Hmm<usize, usize> {
    let mut row = |len: usize| -> Vec<f64> {
        let raw: Vec<f64> = (0..len).map(|_| rng.gen_range(0.01..1.0)).collect();
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|x| x / sum).collect()
    };
    let start = row(n);
    let trans = (0..n).flat_map(|_| row(n)).collect();
    let emit = (0..n).flat_map(|_| row(v)).collect();
    Hmm::from_dense((0..n).collect(), (0..v).collect(), start, trans, emit).unwrap()
}

#[test]
fn matches_exhaustive_search_on_small_models() {
    let mut rng = StdRng::seed_from_u64(7);
    for case in 0..200 {
        let n = rng.gen_range(1..=3);
        let v = rng.gen_range(1..=4);
        let t = rng.gen_range(1..=6);
        let hmm = random_hmm(&mut rng, n, v);
        let obs: Vec<usize> = (0..t).map(|_| rng.gen_range(0..v)).collect();

        let expected = brute_force_best(&hmm, &obs);
        let lin = Decoder::new(&hmm).decode(&obs).unwrap();
        let log = Decoder::builder(&hmm).log_space().build().decode(&obs).unwrap();

        assert_eq!(lin.states.len(), t, "case {case}");
        assert!(
            (lin.probability - expected).abs() <= 1e-12 * expected,
            "case {case}: linear {} vs exhaustive {expected}",
            lin.probability
        );
        assert!(
            (log.probability - expected).abs() <= 1e-9 * expected,
            "case {case}: log {} vs exhaustive {expected}",
            log.probability
        );
    }
}

#[test]
fn sparse_models_match_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(99);
    for case in 0..200 {
        let n = rng.gen_range(1..=3);
        let v = 2;
        let t = rng.gen_range(1..=5);
        let mut draw = |len: usize| -> Vec<f64> {
            (0..len)
                .map(|_| if rng.gen_bool(0.4) { 0.0 } else { rng.gen_range(0.1..1.0) })
                .collect()
        };
        let start = draw(n);
        let trans = draw(n * n);
        let emit = draw(n * v);
        let hmm = Hmm::from_dense((0..n).collect(), (0..v).collect(), start, trans, emit).unwrap();
        let obs: Vec<usize> = (0..t).map(|_| rng.gen_range(0..v)).collect();

        let expected = brute_force_best(&hmm, &obs);
        let decoder = Decoder::builder(&hmm)
            .with_zero_path(ZeroPathPolicy::FirstState)
            .build();
        let got = decoder.decode(&obs).unwrap();
        assert_eq!(got.states.len(), t, "case {case}");
        assert!(
            (got.probability - expected).abs() <= 1e-12 * expected.max(f64::MIN_POSITIVE),
            "case {case}: {} vs exhaustive {expected}",
            got.probability
        );
        if expected == 0.0 {
            assert!(Decoder::new(&hmm).decode(&obs).is_err(), "case {case}");
        }
    }
}
