use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};
use priority_queue::PriorityQueue;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use snafu::OptionExt;

use crate::error::{InvalidRatingWeightsSnafu, Result};
use crate::item::SrsState;
use crate::scheduler::apply_review;

/// Forward-simulation settings. Quality weights index ratings 0-5.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Scheduling state of the cards already in rotation.
    pub deck: Vec<SrsState>,
    /// Cards introduced over the horizon, paced by `learn_limit`.
    pub new_cards: usize,
    /// Days to simulate.
    pub horizon: usize,
    /// Reviews answered per day; the rest spill into the next day.
    pub review_limit: usize,
    /// New cards introduced per day. Zero disables introduction.
    pub learn_limit: usize,
    /// Answer distribution for cards seen before.
    pub review_quality_weights: [f64; 6],
    /// Answer distribution for first-time cards.
    pub learn_quality_weights: [f64; 6],
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            deck: Vec::new(),
            new_cards: 0,
            horizon: 90,
            review_limit: 200,
            learn_limit: 10,
            review_quality_weights: [0.04, 0.06, 0.10, 0.30, 0.30, 0.20],
            learn_quality_weights: [0.10, 0.15, 0.15, 0.30, 0.20, 0.10],
            seed: 42,
        }
    }
}

/// Per-day load produced by [`simulate`]. Vector index is the day offset
/// from the simulation start.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub review_cnt_per_day: Vec<usize>,
    pub learn_cnt_per_day: Vec<usize>,
    /// Due reviews a day could not absorb under `review_limit`.
    pub backlog_per_day: Vec<usize>,
    /// Mean scheduled interval across reviewed cards at the horizon.
    pub average_interval: f32,
    /// Mean easiness factor across reviewed cards at the horizon.
    pub average_easiness: f32,
}

struct SimCard {
    state: SrsState,
    /// Day offset the card comes up on.
    due: i64,
}

// Earliest day first; reviews ahead of first-time cards on the same day.
fn card_priority(card: &SimCard) -> Reverse<(i64, bool)> {
    Reverse((card.due, !card.state.reviewed))
}

/// Simulates the SM-2 schedule forward from `start` and reports the daily
/// study load. Deterministic for a given config: ratings are drawn from the
/// configured weights with a seeded generator, so two runs with the same
/// seed agree exactly.
pub fn simulate(config: &SimulatorConfig, start: DateTime<Utc>) -> Result<SimulationResult> {
    let review_dist = WeightedIndex::new(config.review_quality_weights)
        .ok()
        .context(InvalidRatingWeightsSnafu)?;
    let learn_dist = WeightedIndex::new(config.learn_quality_weights)
        .ok()
        .context(InvalidRatingWeightsSnafu)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut cards: Vec<SimCard> = config
        .deck
        .iter()
        .map(|state| SimCard {
            state: state.clone(),
            due: (state.next_review_at - start).num_days().max(0),
        })
        .collect();

    if config.learn_limit > 0 {
        cards.extend((0..config.new_cards).map(|i| SimCard {
            state: SrsState::new(start),
            due: (i / config.learn_limit) as i64,
        }));
    }

    let mut review_cnt_per_day = vec![0usize; config.horizon];
    let mut learn_cnt_per_day = vec![0usize; config.horizon];
    let mut backlog_per_day = vec![0usize; config.horizon];

    let mut card_priorities = PriorityQueue::new();
    for (i, card) in cards.iter().enumerate() {
        card_priorities.push(i, card_priority(card));
    }

    // Main simulation loop
    while let Some((&card_index, _)) = card_priorities.peek() {
        let card = &mut cards[card_index];
        let day = card.due;

        if day >= config.horizon as i64 {
            card_priorities.pop();
            continue;
        }
        let day_index = day as usize;
        let is_learn = !card.state.reviewed;

        let over_limit = if is_learn {
            learn_cnt_per_day[day_index] + 1 > config.learn_limit
        } else {
            review_cnt_per_day[day_index] + 1 > config.review_limit
        };
        if over_limit {
            if !is_learn {
                backlog_per_day[day_index] += 1;
            }
            card.due = day + 1;
            let priority = card_priority(card);
            card_priorities.change_priority(&card_index, priority);
            continue;
        }

        let dist = if is_learn { &learn_dist } else { &review_dist };
        let quality = dist.sample(&mut rng) as u8;
        let reviewed_at = start + Duration::days(day);
        let next = apply_review(&card.state, quality, reviewed_at)?;

        if is_learn {
            learn_cnt_per_day[day_index] += 1;
        } else {
            review_cnt_per_day[day_index] += 1;
        }

        card.due = day + i64::from(next.interval);
        card.state = next;
        let priority = card_priority(card);
        card_priorities.change_priority(&card_index, priority);
    }

    let reviewed = cards.iter().filter(|c| c.state.reviewed).count();
    let (interval_sum, easiness_sum) = cards
        .iter()
        .filter(|c| c.state.reviewed)
        .fold((0.0f32, 0.0f32), |(i, e), c| {
            (i + c.state.interval as f32, e + c.state.easiness_factor)
        });
    let (average_interval, average_easiness) = if reviewed == 0 {
        (0.0, 0.0)
    } else {
        (interval_sum / reviewed as f32, easiness_sum / reviewed as f32)
    };

    Ok(SimulationResult {
        review_cnt_per_day,
        learn_cnt_per_day,
        backlog_per_day,
        average_interval,
        average_easiness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SrsError;
    use crate::scheduler::{INITIAL_EASINESS, MIN_EASINESS};
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn due_now_deck(size: usize) -> Vec<SrsState> {
        let mut state = SrsState::new(start());
        state.reviewed = true;
        state.repetitions = 1;
        state.interval = 1;
        vec![state; size]
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let config = SimulatorConfig {
            deck: due_now_deck(60),
            new_cards: 40,
            horizon: 60,
            ..Default::default()
        };
        let a = simulate(&config, start()).unwrap();
        let b = simulate(&config, start()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_all_zero_weights() {
        let config = SimulatorConfig {
            review_quality_weights: [0.0; 6],
            ..Default::default()
        };
        let err = simulate(&config, start()).unwrap_err();
        assert!(matches!(err, SrsError::InvalidRatingWeights));
    }

    #[test]
    fn learn_limit_paces_introduction() {
        let config = SimulatorConfig {
            new_cards: 10,
            learn_limit: 2,
            horizon: 30,
            ..Default::default()
        };
        let result = simulate(&config, start()).unwrap();
        assert_eq!(result.learn_cnt_per_day.iter().sum::<usize>(), 10);
        assert!(result.learn_cnt_per_day.iter().all(|&n| n <= 2));
        assert_eq!(&result.learn_cnt_per_day[..5], &[2, 2, 2, 2, 2]);
    }

    #[test]
    fn review_limit_caps_each_day_and_builds_backlog() {
        let config = SimulatorConfig {
            deck: due_now_deck(50),
            review_limit: 10,
            horizon: 14,
            ..Default::default()
        };
        let result = simulate(&config, start()).unwrap();
        assert!(result.review_cnt_per_day.iter().all(|&n| n <= 10));
        assert_eq!(result.review_cnt_per_day[0], 10);
        assert_eq!(result.backlog_per_day[0], 40);
    }

    #[test]
    fn zero_horizon_produces_empty_report() {
        let config = SimulatorConfig {
            deck: due_now_deck(5),
            horizon: 0,
            ..Default::default()
        };
        let result = simulate(&config, start()).unwrap();
        assert!(result.review_cnt_per_day.is_empty());
        assert!(result.learn_cnt_per_day.is_empty());
        assert!(result.backlog_per_day.is_empty());
        // The untouched deck still feeds the horizon statistics.
        assert_eq!(result.average_interval, 1.0);
        assert_eq!(result.average_easiness, INITIAL_EASINESS);
    }

    #[test]
    fn easiness_floor_survives_a_long_run() {
        // Heavily failure-weighted answers must not push EF under the floor.
        let config = SimulatorConfig {
            deck: due_now_deck(30),
            horizon: 120,
            review_quality_weights: [0.6, 0.2, 0.1, 0.1, 0.0, 0.0],
            ..Default::default()
        };
        let result = simulate(&config, start()).unwrap();
        assert!(result.average_easiness >= MIN_EASINESS);
    }
}
