use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use crate::commands::{provider_name, resolve_provider};
use crate::config::{self, ProfileConfig};
use crate::fixtures;
use crate::llm::chat::{AskOptions, ChatClient};
use crate::scenario::{self, Scenario};

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Scenario name; see `parley scenarios`.
    pub scenario: String,
    /// Opening message override.
    #[arg(long)]
    pub message: Option<String>,
    /// Research topic index (research scenario only).
    #[arg(long, default_value_t = 0)]
    pub topic: usize,
    /// Maximum conversation rounds; defaults per scenario.
    #[arg(long)]
    pub rounds: Option<u32>,
    /// Directory for generated demo data files.
    #[arg(long, default_value = "workspace")]
    pub workspace: PathBuf,
    /// Provider name; falls back to the LLM_PROVIDER environment variable.
    #[arg(long)]
    pub provider: Option<String>,
    /// Model override for the resolved provider.
    #[arg(long)]
    pub model: Option<String>,
    /// Sampling temperature override.
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Print the resolved conversation setup as JSON without calling the
    /// provider. Demo data files are still written.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: RunArgs) -> Result<(), String> {
    let scenario = scenario::find(&args.scenario).ok_or_else(|| {
        format!(
            "Unknown scenario '{}'. Run `parley scenarios` to list the built-ins.",
            args.scenario
        )
    })?;

    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let opening = match &args.message {
        Some(message) => message.clone(),
        None => default_opening(scenario, &args)?,
    };

    let name = provider_name(args.provider.as_deref(), profile.provider.as_deref());
    let mut config = resolve_provider(&name, args.dry_run)?;
    if let Some(model) = args.model.clone().or_else(|| profile.model.clone()) {
        config.model = model;
    }
    if let Some(temperature) = args.temperature.or(profile.temperature) {
        config.temperature = temperature;
    }

    let rounds = args
        .rounds
        .or(profile.rounds)
        .unwrap_or(scenario.max_rounds);

    if args.dry_run {
        let body = json!({
            "dry_run": true,
            "scenario": scenario.name,
            "agents": scenario.agents.iter().map(|agent| agent.name).collect::<Vec<_>>(),
            "provider": config.provider,
            "model": config.model,
            "base_url": config.base_url,
            "temperature": config.temperature,
            "pricing": config.pricing,
            "rounds": rounds,
            "opening": opening,
        });
        println!("{body}");
        return Ok(());
    }

    let options = AskOptions {
        max_tokens: profile.max_tokens,
        timeout_secs: profile.timeout,
        retries: profile.retries.unwrap_or(0),
        retry_delay_ms: profile.retry_delay.unwrap_or(500),
    };

    let client = ChatClient::new(&config);
    scenario::run(&client, scenario, &opening, rounds, options)
        .await
        .map_err(|err| err.to_string())?;
    Ok(())
}

/// Builds the scenario's default opening message, writing whatever demo data
/// it depends on.
fn default_opening(scenario: &Scenario, args: &RunArgs) -> Result<String, String> {
    match scenario.name {
        "research" => {
            let topics = fixtures::write_research_topics(&args.workspace)?;
            let topic = topics.get(args.topic).ok_or_else(|| {
                format!(
                    "Topic index {} is out of range (0..{}).",
                    args.topic,
                    topics.len()
                )
            })?;
            Ok(format!(
                "Please research the following topic and provide a comprehensive summary:\n\n\
                 TOPIC: {}\n\n\
                 DETAILS: {}\n\n\
                 Structure your response as: 1. Overview, 2. Key Points, 3. Current Status, \
                 4. Future Outlook, 5. Conclusion. Make it informative but concise, focusing \
                 on factual information.",
                topic.topic, topic.description
            ))
        }
        "codegen" => {
            let data_path = fixtures::write_temperature_data(&args.workspace)?;
            Ok(format!(
                "Please help me with the following tasks. For each task, provide a complete, \
                 runnable Python code block:\n\n\
                 TASK 1: Load the temperature data from this file: {}\n\
                 TASK 2: Calculate the average temperature for each location.\n\
                 TASK 3: Create a visualization of temperature trends for each location over \
                 time.\n\
                 TASK 4: Save the visualization as a PNG file.\n\n\
                 After completing all tasks, please respond with 'TERMINATE'.",
                data_path.display()
            ))
        }
        "travel" => Ok("I'd like to plan a one-week trip in the spring. Please work together \
             to suggest a destination, an itinerary, a realistic budget, and the food \
             experiences I shouldn't miss."
            .to_string()),
        _ => Ok("Let's discuss how to design and build a model that predicts customer churn. \
             Outline the approach, the data requirements, and sketch the code."
            .to_string()),
    }
}
