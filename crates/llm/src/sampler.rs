//! Turning a next-token frequency distribution into a single token.
//!
//! Both strategies weight every candidate by `count^(1 / temperature)` and then
//! draw once from a cumulative-weight roulette. Weights are taken relative to
//! the largest count, which leaves the proportions unchanged but keeps very low
//! temperatures from overflowing to infinity.
//!
//! Temperature must be positive and finite; anything else is rejected with an
//! error instead of producing NaN weights. An empty distribution yields `None`.

use crate::ngram::FrequencyDistribution;
use crate::vocabulary::TokenId;
use anyhow::{ensure, Result};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for fastrand::Rng {
    fn next_unit(&mut self) -> f64 {
        self.f64()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    token: TokenId,
    weight: f64,
}

pub(crate) fn check_temperature(temperature: f64) -> Result<()> {
    ensure!(
        temperature.is_finite() && temperature > 0.0,
        "temperature must be a positive finite number, got {}",
        temperature
    );
    Ok(())
}

fn temperature_weights(dist: &FrequencyDistribution, temperature: f64) -> Vec<Candidate> {
    let max_count = dist.iter().map(|(_, count)| count).max().unwrap_or(1).max(1) as f64;
    let exponent = 1.0 / temperature;
    dist.iter()
        .map(|(token, count)| Candidate {
            token,
            weight: (count as f64 / max_count).powf(exponent),
        })
        .collect()
}

/// Draws `u * total` and subtracts weights in order until the remainder is
/// non-positive. Rounding leftovers fall back to the first candidate.
fn roulette<R: RandomSource + ?Sized>(candidates: &[Candidate], rng: &mut R) -> Option<TokenId> {
    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    let mut threshold = rng.next_unit() * total;
    for candidate in candidates {
        threshold -= candidate.weight;
        if threshold <= 0.0 {
            return Some(candidate.token);
        }
    }
    candidates.first().map(|c| c.token)
}

/// Temperature sampling over the whole distribution.
///
/// Low temperatures concentrate mass on the highest counts, `1.0` reproduces
/// the raw count proportions and higher values flatten towards uniform.
pub fn sample_with_temperature<R: RandomSource + ?Sized>(
    dist: &FrequencyDistribution,
    temperature: f64,
    rng: &mut R,
) -> Result<Option<TokenId>> {
    check_temperature(temperature)?;
    if dist.is_empty() {
        return Ok(None);
    }
    let candidates = temperature_weights(dist, temperature);
    Ok(roulette(&candidates, rng))
}

/// Nucleus (top-p) sampling.
///
/// Candidates are ranked by temperature-adjusted weight (ties keep insertion
/// order) and the smallest prefix whose normalised mass reaches `top_p` is
/// kept. The draw is then made within that prefix only.
pub fn sample_with_nucleus<R: RandomSource + ?Sized>(
    dist: &FrequencyDistribution,
    top_p: f64,
    temperature: f64,
    rng: &mut R,
) -> Result<Option<TokenId>> {
    check_temperature(temperature)?;
    if dist.is_empty() {
        return Ok(None);
    }
    let mut candidates = temperature_weights(dist, temperature);
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    let mut cumulative = 0.0;
    let mut nucleus_len = 0;
    for candidate in &candidates {
        cumulative += candidate.weight / total;
        nucleus_len += 1;
        if cumulative >= top_p {
            break;
        }
    }
    Ok(roulette(&candidates[..nucleus_len], rng))
}

/// Entry point used by generation: nucleus sampling when `top_p` lies strictly
/// inside (0, 1), plain temperature sampling otherwise.
pub fn sample<R: RandomSource + ?Sized>(
    dist: &FrequencyDistribution,
    temperature: f64,
    top_p: Option<f64>,
    rng: &mut R,
) -> Result<Option<TokenId>> {
    match top_p {
        Some(p) if p > 0.0 && p < 1.0 => sample_with_nucleus(dist, p, temperature, rng),
        _ => sample_with_temperature(dist, temperature, rng),
    }
}
