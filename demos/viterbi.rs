//! Example: decode the classic healthy/fever HMM and print the trellis.
//!
//! Run with:
//! `cargo run --example viterbi`

use std::collections::HashMap;

use viterbi_dp::{decode, Decoder, Hmm};

fn main() -> Result<(), viterbi_dp::DecodeError> {
    let states = ["Healthy", "Fever"];
    let observations = ["normal", "cold", "dizzy"];

    let start_p = HashMap::from([("Healthy", 0.6), ("Fever", 0.4)]);
    let trans_p = HashMap::from([
        ("Healthy", HashMap::from([("Healthy", 0.7), ("Fever", 0.3)])),
        ("Fever", HashMap::from([("Healthy", 0.4), ("Fever", 0.6)])),
    ]);
    let emit_p = HashMap::from([
        (
            "Healthy",
            HashMap::from([("normal", 0.5), ("cold", 0.4), ("dizzy", 0.1)]),
        ),
        (
            "Fever",
            HashMap::from([("normal", 0.1), ("cold", 0.3), ("dizzy", 0.6)]),
        ),
    ]);

    // One call, table printed to stdout.
    let best = decode(&observations, &states, &start_p, &trans_p, &emit_p, true)?;
    println!("Most likely states: {best}");

    // Same model, reusable decoder in log space.
    let hmm = Hmm::from_maps(&states, &start_p, &trans_p, &emit_p)?;
    let decoder = Decoder::builder(&hmm).log_space().build();
    let week = ["normal", "normal", "cold", "dizzy", "dizzy", "cold", "normal"];
    let trellis = decoder.forward(&week)?;
    for line in decoder.table(&trellis) {
        println!("{line}");
    }
    let traceback = decoder.traceback(&trellis)?;
    println!("Best path log-probability: {:.6}", traceback.score);
    println!("State sequence:");
    for (t, &s) in traceback.path.iter().enumerate() {
        println!("  t = {:2}, state = {}", t, hmm.states()[s]);
    }
    Ok(())
}
