//! Writers for the small demo datasets the scenarios feed their agents.
//!
//! Both writers overwrite any previous file, matching the demos' behavior of
//! regenerating their inputs on every run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One record from the bundled research-topics dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTopic {
    pub topic: String,
    pub description: String,
}

/// The bundled research topics.
pub fn research_topics() -> Vec<ResearchTopic> {
    let records = [
        (
            "Quantum Computing",
            "Research the current state of quantum computing, including recent advancements, \
             key players in the field, and potential applications. Include information about \
             quantum bits (qubits), quantum gates, and quantum algorithms. Also discuss the \
             challenges facing quantum computing and when we might expect practical quantum \
             computers.",
        ),
        (
            "Climate Change Mitigation",
            "Research effective strategies for climate change mitigation. Include information \
             about renewable energy sources, carbon capture technologies, policy approaches, \
             and individual actions. Discuss the potential impact of these strategies and \
             their feasibility.",
        ),
        (
            "Artificial Intelligence Ethics",
            "Research the ethical considerations surrounding artificial intelligence \
             development and deployment. Include discussions about bias in AI, privacy \
             concerns, job displacement, and the long-term implications of increasingly \
             capable AI systems. Also discuss proposed frameworks for ethical AI.",
        ),
    ];

    records
        .into_iter()
        .map(|(topic, description)| ResearchTopic {
            topic: topic.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Writes `research_topics.json` into `dir` and returns the records.
pub fn write_research_topics(dir: &Path) -> Result<Vec<ResearchTopic>, String> {
    let topics = research_topics();
    let json = serde_json::to_string_pretty(&topics)
        .map_err(|err| format!("Failed to serialize research topics: {err}"))?;

    ensure_dir(dir)?;
    let path = dir.join("research_topics.json");
    fs::write(&path, json)
        .map_err(|err| format!("Failed to write research topics '{}': {err}", path.display()))?;

    Ok(topics)
}

const TEMPERATURE_CSV: &str = "\
date,location,temperature
2023-01-01,New York,32.5
2023-01-02,New York,31.2
2023-01-03,New York,33.7
2023-01-04,New York,36.1
2023-01-05,New York,35.8
2023-01-06,New York,28.9
2023-01-07,New York,27.5
2023-01-01,San Francisco,58.3
2023-01-02,San Francisco,57.9
2023-01-03,San Francisco,59.2
2023-01-04,San Francisco,62.1
2023-01-05,San Francisco,60.5
2023-01-06,San Francisco,61.8
2023-01-07,San Francisco,63.2
2023-01-01,Chicago,22.1
2023-01-02,Chicago,20.8
2023-01-03,Chicago,19.5
2023-01-04,Chicago,21.3
2023-01-05,Chicago,24.7
2023-01-06,Chicago,26.2
2023-01-07,Chicago,23.9
";

/// Writes `temperature_data.csv` into `dir` and returns the file path.
pub fn write_temperature_data(dir: &Path) -> Result<PathBuf, String> {
    ensure_dir(dir)?;
    let path = dir.join("temperature_data.csv");
    fs::write(&path, TEMPERATURE_CSV).map_err(|err| {
        format!(
            "Failed to write temperature dataset '{}': {err}",
            path.display()
        )
    })?;
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("Failed to create directory '{}': {err}", dir.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{ResearchTopic, write_research_topics, write_temperature_data};

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("parley-test-{label}-{nanos}"))
    }

    #[test]
    fn research_topics_round_trip_through_the_file() {
        let dir = unique_temp_dir("topics");
        let written = write_research_topics(&dir).expect("topics should be writable");
        assert_eq!(written.len(), 3);
        assert_eq!(written[0].topic, "Quantum Computing");

        let raw = fs::read_to_string(dir.join("research_topics.json"))
            .expect("topics file should exist");
        let parsed: Vec<ResearchTopic> =
            serde_json::from_str(&raw).expect("topics file should be valid JSON");
        assert_eq!(parsed, written);
    }

    #[test]
    fn temperature_dataset_has_the_expected_shape() {
        let dir = unique_temp_dir("csv");
        let path = write_temperature_data(&dir).expect("dataset should be writable");
        assert!(path.ends_with("temperature_data.csv"));

        let raw = fs::read_to_string(&path).expect("dataset file should exist");
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("date,location,temperature"));
        assert_eq!(lines.count(), 21);
        assert!(raw.contains("San Francisco"));
        assert!(raw.contains("Chicago"));
    }

    #[test]
    fn writers_overwrite_previous_files() {
        let dir = unique_temp_dir("overwrite");
        fs::create_dir_all(&dir).expect("temp dir should be creatable");
        fs::write(dir.join("temperature_data.csv"), "stale").expect("seed write");

        let path = write_temperature_data(&dir).expect("rewrite should succeed");
        let raw = fs::read_to_string(path).expect("dataset file should exist");
        assert!(!raw.contains("stale"));
        assert!(raw.starts_with("date,location,temperature"));
    }
}
