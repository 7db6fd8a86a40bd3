use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use serde_json::{Value, json};

use crate::commands::{provider_name, resolve_provider};
use crate::config::{self, ProfileConfig};
use crate::llm::chat::{AskOptions, ChatClient, ChatMessage, Usage};
use crate::llm::provider::Pricing;

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Question to ask; read from stdin when omitted.
    pub prompt: Option<String>,
    /// Provider name: openai, local-inference, or alternate-hosted.
    /// Falls back to the LLM_PROVIDER environment variable.
    #[arg(long)]
    pub provider: Option<String>,
    /// Model override for the resolved provider.
    #[arg(long)]
    pub model: Option<String>,
    /// System message prepended to the conversation.
    #[arg(long)]
    pub system: Option<String>,
    /// Sampling temperature override.
    #[arg(long)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Retries for transient provider failures.
    #[arg(long)]
    pub retries: Option<u32>,
    /// Base retry delay in milliseconds.
    #[arg(long)]
    pub retry_delay: Option<u64>,
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Print the resolved request as JSON without calling the provider.
    #[arg(long)]
    pub dry_run: bool,
    /// Emit the response as JSON.
    #[arg(long)]
    pub json: bool,
    /// Write the response JSON to a file.
    #[arg(long)]
    pub save: Option<PathBuf>,
    /// Print token usage and estimated cost to stderr.
    #[arg(long)]
    pub show_usage: bool,
}

pub async fn run(args: AskArgs) -> Result<(), String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let prompt = read_prompt(args.prompt.as_deref())?;
    let name = provider_name(args.provider.as_deref(), profile.provider.as_deref());

    let mut config = resolve_provider(&name, args.dry_run)?;
    if let Some(model) = args.model.clone().or_else(|| profile.model.clone()) {
        config.model = model;
    }
    if let Some(temperature) = args.temperature.or(profile.temperature) {
        config.temperature = temperature;
    }

    let options = AskOptions {
        max_tokens: args.max_tokens.or(profile.max_tokens),
        timeout_secs: args.timeout.or(profile.timeout),
        retries: args.retries.or(profile.retries).unwrap_or(0),
        retry_delay_ms: args.retry_delay.or(profile.retry_delay).unwrap_or(500),
    };
    let show_usage = args.show_usage || profile.show_usage.unwrap_or(false);

    let mut messages = Vec::new();
    if let Some(system) = args.system.clone().or_else(|| profile.system.clone()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(&prompt));

    if args.dry_run {
        let body = json!({
            "dry_run": true,
            "provider": config.provider,
            "model": config.model,
            "base_url": config.base_url,
            "temperature": config.temperature,
            "pricing": config.pricing,
            "max_tokens": options.max_tokens,
            "messages": messages,
            "output": if args.json { "json" } else { "text" },
        });
        println!("{body}");
        if let Some(path) = &args.save {
            save_output(path, &body)?;
        }
        if show_usage {
            eprintln!("usage: unavailable latency_ms=0 (dry-run)");
        }
        return Ok(());
    }

    let client = ChatClient::new(&config);
    let started = Instant::now();
    let response = client
        .ask_messages(&messages, options)
        .await
        .map_err(|err| err.to_string())?;
    let latency_ms = started.elapsed().as_millis();

    let body = json!({
        "provider": config.provider,
        "model": config.model,
        "content": response.content,
        "usage": response.usage.as_ref().map(usage_json),
    });

    if args.json {
        println!("{body}");
    } else {
        println!("{}", response.content);
    }
    if let Some(path) = &args.save {
        save_output(path, &body)?;
    }
    if show_usage {
        eprintln!(
            "{}",
            usage_line(response.usage.as_ref(), config.pricing.as_ref(), latency_ms)
        );
    }

    Ok(())
}

fn usage_json(usage: &Usage) -> Value {
    json!({
        "prompt_tokens": usage.prompt_tokens,
        "completion_tokens": usage.completion_tokens,
        "total_tokens": usage.total_tokens,
    })
}

fn usage_line(usage: Option<&Usage>, pricing: Option<&Pricing>, latency_ms: u128) -> String {
    let Some(usage) = usage else {
        return format!("usage: unavailable latency_ms={latency_ms}");
    };

    let count = |value: Option<u32>| {
        value
            .map(|value| value.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let mut line = format!(
        "usage: prompt={} completion={} total={}",
        count(usage.prompt_tokens),
        count(usage.completion_tokens),
        count(usage.total_tokens),
    );
    if let Some(pricing) = pricing {
        line.push_str(&format!(" cost=${:.4}", usage.estimated_cost(pricing)));
    }
    line.push_str(&format!(" latency_ms={latency_ms}"));
    line
}

fn read_prompt(arg: Option<&str>) -> Result<String, String> {
    if let Some(prompt) = arg {
        let trimmed = prompt.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("No prompt provided. Pass it as an argument or via stdin.".to_string());
    }
    Ok(trimmed.to_string())
}

fn save_output(path: &Path, body: &Value) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    let raw = serde_json::to_string(body)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    fs::write(path, raw)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}
