//! E91 entanglement-based key exchange.
//!
//! A source emits singlet pairs. Alice measures at one of
//! {0, π/4, π/2}, Bob at one of {π/4, π/2, 3π/4}, each chosen at random.
//! Pairs measured at the same angle form the sifted key (outcomes are
//! anti-correlated, so Bob inverts his bit). Pairs with Alice in {0, π/2}
//! and Bob in {π/4, 3π/4} estimate the CHSH value. The rest are discarded.

use crate::channel::{KeyDistributionOptions, KeyDistributionOutcome};
use crate::core::PI;
use rand::Rng;
use zeroize::Zeroizing;

const ALICE_ANGLES: [f64; 3] = [0.0, PI / 4.0, PI / 2.0];
const BOB_ANGLES: [f64; 3] = [PI / 4.0, PI / 2.0, 3.0 * PI / 4.0];

/// CHSH samples per setting required for each security level step.
pub(crate) const SAMPLES_PER_LEVEL: u64 = 50;
/// Upper bound on key bits reserved before the run starts.
const MAX_RESERVED_BITS: usize = 1 << 16;

/// Channel conditions the exchange runs under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChannelModel {
    /// Probability that Bob's outcome is flipped in transit
    pub noise: f64,
    /// Probability that an intercept-resend eavesdropper measures a pair
    pub eavesdrop_ratio: f64,
}

/// Running ±1 correlation sums for the four CHSH settings.
#[derive(Debug, Default)]
struct ChshTally {
    products: [[i64; 3]; 3],
    counts: [[u64; 3]; 3],
}

impl ChshTally {
    fn record(&mut self, a: usize, b: usize, same: bool) {
        self.products[a][b] += if same { 1 } else { -1 };
        self.counts[a][b] += 1;
    }

    fn correlation(&self, a: usize, b: usize) -> f64 {
        match self.counts[a][b] {
            0 => 0.0,
            n => self.products[a][b] as f64 / n as f64,
        }
    }

    fn min_count(&self) -> u64 {
        [(0, 0), (0, 2), (2, 0), (2, 2)]
            .iter()
            .map(|&(a, b)| self.counts[a][b])
            .min()
            .unwrap_or(0)
    }

    /// `|E(a1,b1) − E(a1,b3) + E(a3,b1) + E(a3,b3)|`
    fn chsh_value(&self) -> f64 {
        (self.correlation(0, 0) - self.correlation(0, 2) + self.correlation(2, 0) + self.correlation(2, 2)).abs()
    }
}

/// Singlet correlation for measurement angles `alpha` and `beta`, optionally
/// broken by an eavesdropper who measured along `eve`.
fn correlation(alpha: f64, beta: f64, eve: Option<f64>) -> f64 {
    match eve {
        Some(e) => -(alpha - e).cos() * (beta - e).cos(),
        None => -(alpha - beta).cos(),
    }
}

/// Pairs a run may emit before giving up, saturating for absurd key lengths.
fn pair_budget(key_length: usize, min_chsh_samples: u64) -> u64 {
    (key_length as u64)
        .saturating_add(min_chsh_samples.saturating_mul(4))
        .saturating_mul(64)
}

fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| if bit { byte | (0x80 >> i) } else { byte })
        })
        .collect()
}

/// Runs one exchange and reports its readings.
///
/// The run keeps emitting pairs until the sifted key holds `key_length` bits
/// and every CHSH setting has `SAMPLES_PER_LEVEL · security_level` samples,
/// or until a pair budget proportional to those targets is spent.
pub(crate) fn run<R: Rng>(options: &KeyDistributionOptions, model: ChannelModel, rng: &mut R) -> KeyDistributionOutcome {
    let key_length = options.key_length;
    let min_chsh_samples = SAMPLES_PER_LEVEL * u64::from(options.security_level.max(1));
    let budget = pair_budget(key_length, min_chsh_samples);

    let mut tally = ChshTally::default();
    let mut alice_key = Vec::with_capacity(key_length.min(MAX_RESERVED_BITS));
    let mut sifted_errors = 0usize;
    let mut pairs = 0u64;

    while pairs < budget {
        if alice_key.len() >= key_length && tally.min_count() >= min_chsh_samples {
            break;
        }
        pairs += 1;

        let a = rng.random_range(0..3);
        let b = rng.random_range(0..3);
        let eve = (model.eavesdrop_ratio > 0.0 && rng.random_bool(model.eavesdrop_ratio))
            .then(|| if rng.random_bool(0.5) { PI / 4.0 } else { PI / 2.0 });

        let e = correlation(ALICE_ANGLES[a], BOB_ANGLES[b], eve);
        let p_same = ((1.0 + e) / 2.0).clamp(0.0, 1.0);
        let alice_bit = rng.random_bool(0.5);
        let mut bob_bit = if rng.random_bool(p_same) { alice_bit } else { !alice_bit };
        if model.noise > 0.0 && rng.random_bool(model.noise) {
            bob_bit = !bob_bit;
        }

        match (a, b) {
            // Same measurement angle: key material.
            (1, 0) | (2, 1) => {
                alice_key.push(alice_bit);
                if alice_bit == bob_bit {
                    sifted_errors += 1;
                }
            }
            (0 | 2, 0 | 2) => tally.record(a, b, alice_bit == bob_bit),
            _ => {}
        }
    }

    let sifted = alice_key.len();
    let security_parameter = tally.chsh_value();
    let error_rate = if sifted > 0 { sifted_errors as f64 / sifted as f64 } else { 0.0 };

    let failure_reason = if sifted < key_length {
        Some(format!("insufficient sifted key material: {} of {} bits", sifted, key_length))
    } else if security_parameter < options.security_threshold {
        Some(format!(
            "CHSH value {:.4} below threshold {:.4}, possible eavesdropping",
            security_parameter, options.security_threshold
        ))
    } else if error_rate > options.max_acceptable_error_rate {
        Some(format!(
            "error rate {:.4} exceeds maximum {:.4}",
            error_rate, options.max_acceptable_error_rate
        ))
    } else if sifted_errors > 0 && !options.error_correction {
        Some(format!("{} mismatched key bits and error correction is disabled", sifted_errors))
    } else {
        None
    };

    let success = failure_reason.is_none();
    let key = if success {
        Zeroizing::new(pack_bits(&alice_key[..key_length]))
    } else {
        Zeroizing::new(Vec::new())
    };
    alice_key.iter_mut().for_each(|bit| *bit = false);

    KeyDistributionOutcome {
        success,
        key,
        authentication_tag: Vec::new(),
        security_parameter,
        error_rate,
        entangled_pairs_created: pairs,
        failure_reason,
    }
}
