use chrono::{DateTime, Duration, Utc};
use vocab_srs::{
    BoxError, RecallGrade, ReviewSession, ReviewStore, SessionPhase, SrsState, VocabularyItem,
};

const WORDS_CSV: &str = "\
word,reading,meaning
犬,いぬ,dog
猫,ねこ,cat
水,みず,water
山,やま,mountain
本,ほん,book
";

struct MemoryStore {
    items: Vec<VocabularyItem>,
}

impl ReviewStore for MemoryStore {
    fn load_due_candidates(
        &mut self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<VocabularyItem>, BoxError> {
        Ok(self.items.clone())
    }

    fn save_srs_state(&mut self, item_id: i64, state: &SrsState) -> Result<(), BoxError> {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.srs = Some(state.clone());
        }
        Ok(())
    }
}

fn load_words() -> Result<Vec<VocabularyItem>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_reader(WORDS_CSV.as_bytes());
    let mut items = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        items.push(VocabularyItem {
            id: i as i64 + 1,
            word: record[0].to_string(),
            reading: Some(record[1].to_string()),
            meaning: record[2].to_string(),
            srs: None,
        });
    }
    Ok(items)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;

    let now = Utc::now();
    let store = MemoryStore {
        items: load_words()?,
    };

    // New words carry no scheduling state, so every one of them is due.
    let mut session = ReviewSession::open(store, now)?;
    session.start(now)?;

    let grades = [
        RecallGrade::Easy,
        RecallGrade::Medium,
        RecallGrade::Hard,
        RecallGrade::Easy,
        RecallGrade::Medium,
    ];

    let mut moment = now;
    let mut answered = 0;
    while session.phase() == SessionPhase::InProgress {
        let card = session.current_card().unwrap().clone();
        session.reveal_answer();

        let grade = grades[answered % grades.len()];
        moment += Duration::seconds(8);
        let outcome = session.submit_quality(grade.quality(), moment)?;

        println!(
            "{} ({}) \"{}\" rated {}: {} -> next review in {} day(s)",
            card.word,
            card.reading.as_deref().unwrap_or("-"),
            card.meaning,
            grade,
            outcome.feedback.status,
            outcome.state.interval,
        );
        answered += 1;
    }

    let summary = session.summary();
    println!(
        "\nSession done: {}/{} reviewed, {} remembered, {} forgotten, {}s spent",
        summary.reviewed,
        summary.total,
        summary.remembered,
        summary.not_remembered,
        summary.duration_secs,
    );

    Ok(())
}
