//! Print a recommendation for a stressed, active listener in focus mode

use sonora::{BiometricSnapshot, Recommender};

fn main() {
    let snapshot = BiometricSnapshot::new(70.0, 80.0, 40.0, 90.0);
    let mut recommender = Recommender::new();
    let report = recommender.recommend_detailed("focus", &snapshot);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
