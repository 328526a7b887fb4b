//! # Synthetic Data Generator
//!
//! Builds the [`Dataset`] from a seed. The same seed always produces the same
//! records: the RNG is a seeded ChaCha stream and the combinations are
//! visited in a fixed nested order.
//!
//! ## Value Model
//!
//! ```text
//! revenue     = market base × channel × age × occasion share × pack
//!               × (1 + monthly growth)^t × (1 ± 8% noise)
//! units       = revenue / pack price
//! repeat_rate = segment base + market offset + drift × t ± 3% noise
//! ```
//!
//! `t` is the month index inside the span. Every market has its own monthly
//! growth and e-commerce compounds a little faster than retail, so trend and
//! growth questions have a clear directional answer.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::dataset::Dataset;
use super::record::{SalesRecord, AGE_SEGMENTS, CHANNELS, MARKETS, OCCASIONS, PACK_TYPES};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// First month of the span.
pub const SPAN_START: (i32, u32) = (2023, 1);

/// Length of the span in months.
pub const SPAN_MONTHS: usize = 24;

const REVENUE_NOISE: f64 = 0.08;
const REPEAT_NOISE: f64 = 0.03;
const REPEAT_DRIFT: f64 = 0.0015;
const ECOMMERCE_EXTRA_GROWTH: f64 = 0.006;

/// Per-market generation profile, aligned with [`MARKETS`].
struct MarketProfile {
    base_revenue: f64,
    monthly_growth: f64,
    repeat_offset: f64,
}

const MARKET_PROFILES: [MarketProfile; 5] = [
    // US
    MarketProfile {
        base_revenue: 100_000.0,
        monthly_growth: 0.004,
        repeat_offset: 0.02,
    },
    // UK
    MarketProfile {
        base_revenue: 50_000.0,
        monthly_growth: 0.009,
        repeat_offset: 0.00,
    },
    // DE
    MarketProfile {
        base_revenue: 50_000.0,
        monthly_growth: 0.002,
        repeat_offset: 0.03,
    },
    // IN
    MarketProfile {
        base_revenue: 50_000.0,
        monthly_growth: 0.018,
        repeat_offset: -0.04,
    },
    // BR
    MarketProfile {
        base_revenue: 50_000.0,
        monthly_growth: 0.013,
        repeat_offset: -0.01,
    },
];

/// Revenue multiplier and base repeat rate, aligned with [`AGE_SEGMENTS`].
const SEGMENT_PROFILES: [(f64, f64); 2] = [(1.1, 0.38), (0.9, 0.46)];

/// Aligned with [`CHANNELS`].
const CHANNEL_MULTIPLIERS: [f64; 2] = [1.0, 1.2];

/// Share of consumption, aligned with [`OCCASIONS`].
const OCCASION_SHARES: [f64; 4] = [0.45, 0.27, 0.18, 0.10];

/// Revenue multiplier and unit price, aligned with [`PACK_TYPES`].
const PACK_PROFILES: [(f64, f64); 3] = [(1.0, 1.25), (1.1, 3.5), (0.9, 2.0)];

/// Generates the synthetic dataset.
///
/// Deterministic for a given seed; `None` uses [`DEFAULT_SEED`]. Never fails.
pub fn generate_dataset(seed: Option<u64>) -> Dataset {
    let seed = seed.unwrap_or(DEFAULT_SEED);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let months = span_months();

    let capacity =
        months.len() * MARKETS.len() * AGE_SEGMENTS.len() * CHANNELS.len() * OCCASIONS.len();
    let mut records = Vec::with_capacity(capacity);

    for (t, &month) in months.iter().enumerate() {
        for (mi, (&market, profile)) in MARKETS.iter().zip(&MARKET_PROFILES).enumerate() {
            for (ai, (&age_segment, &(age_mult, repeat_base))) in
                AGE_SEGMENTS.iter().zip(&SEGMENT_PROFILES).enumerate()
            {
                for (&channel, &channel_mult) in CHANNELS.iter().zip(&CHANNEL_MULTIPLIERS) {
                    for (oi, (&occasion, &share)) in
                        OCCASIONS.iter().zip(&OCCASION_SHARES).enumerate()
                    {
                        let pack = pack_index(mi, ai, oi);
                        let (pack_mult, price) = PACK_PROFILES[pack];

                        let growth = if channel == "ecommerce" {
                            profile.monthly_growth + ECOMMERCE_EXTRA_GROWTH
                        } else {
                            profile.monthly_growth
                        };
                        let trend = (1.0 + growth).powi(t as i32);
                        let noise = 1.0 + rng.gen_range(-REVENUE_NOISE..REVENUE_NOISE);
                        let revenue = profile.base_revenue
                            * channel_mult
                            * age_mult
                            * share
                            * pack_mult
                            * trend
                            * noise;

                        let repeat_rate = (repeat_base
                            + profile.repeat_offset
                            + REPEAT_DRIFT * t as f64
                            + rng.gen_range(-REPEAT_NOISE..REPEAT_NOISE))
                        .clamp(0.0, 1.0);

                        records.push(SalesRecord {
                            month,
                            market,
                            age_segment,
                            channel,
                            occasion,
                            pack_type: PACK_TYPES[pack],
                            revenue,
                            units: revenue / price,
                            repeat_rate,
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(seed, records = records.len(), "synthetic dataset generated");
    Dataset::new(records, months, seed)
}

/// Pack type assignment. Independent of the channel, so both channels carry
/// the same mix of packs.
fn pack_index(market: usize, age_segment: usize, occasion: usize) -> usize {
    (market + age_segment + occasion) % PACK_TYPES.len()
}

/// First day of every month of the span, ascending.
fn span_months() -> Vec<NaiveDate> {
    let (year, month) = SPAN_START;
    (0..SPAN_MONTHS as i32)
        .filter_map(|i| {
            let offset = month as i32 - 1 + i;
            NaiveDate::from_ymd_opt(year + offset / 12, (offset % 12 + 1) as u32, 1)
        })
        .collect()
}
