use owo_colors::OwoColorize;

use crate::scenario;

pub fn run() -> Result<(), String> {
    for scenario in scenario::builtin() {
        let agents: Vec<_> = scenario.agents.iter().map(|agent| agent.name).collect();
        println!("{}  {}", scenario.name.bold(), scenario.title);
        println!("    {}", scenario.description);
        println!(
            "    {}",
            format!("agents: {} | max rounds: {}", agents.join(", "), scenario.max_rounds).dimmed()
        );
    }
    Ok(())
}
