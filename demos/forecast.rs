use chrono::{Duration, Utc};
use vocab_srs::{SimulatorConfig, SrsState, simulate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();

    // A deck part-way through learning: intervals spread over three weeks,
    // a third of it already overdue.
    let deck: Vec<SrsState> = (0..120u32)
        .map(|i| {
            let mut state = SrsState::new(now);
            state.reviewed = true;
            state.repetitions = i % 5 + 1;
            state.interval = 1 + i % 21;
            state.next_review_at = now + Duration::days(i64::from(i % 21) - 7);
            state
        })
        .collect();

    let config = SimulatorConfig {
        deck,
        new_cards: 60,
        horizon: 30,
        review_limit: 40,
        learn_limit: 5,
        ..Default::default()
    };
    let result = simulate(&config, now)?;

    println!("day  reviews  new  backlog");
    for day in 0..config.horizon {
        println!(
            "{:>3}  {:>7}  {:>3}  {:>7}",
            day,
            result.review_cnt_per_day[day],
            result.learn_cnt_per_day[day],
            result.backlog_per_day[day],
        );
    }
    println!(
        "\naverage interval at horizon: {:.1} day(s)",
        result.average_interval
    );
    println!("average easiness at horizon: {:.2}", result.average_easiness);

    Ok(())
}
