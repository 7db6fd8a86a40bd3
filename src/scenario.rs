//! Built-in agent-persona scenarios and the round-robin conversation driver.

use owo_colors::{AnsiColors, OwoColorize};

use crate::llm::chat::{AskOptions, ChatClient, ChatError, ChatMessage};

/// One persona participating in a scenario.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: &'static str,
    pub system_message: &'static str,
}

/// A built-in demo conversation.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Short name used on the command line.
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub agents: &'static [AgentSpec],
    /// Default round cap; one round gives every agent one turn.
    pub max_rounds: u32,
}

const RESEARCH_AGENTS: &[AgentSpec] = &[AgentSpec {
    name: "Assistant",
    system_message: "You are a research assistant. Your goal is to provide accurate, factual \
        information about the given topic. Provide well-structured, comprehensive responses, \
        but be honest about the limitations of your knowledge. If you're uncertain about \
        something, acknowledge it.",
}];

const TRAVEL_AGENTS: &[AgentSpec] = &[
    AgentSpec {
        name: "TravelCoordinator",
        system_message: "You are an experienced travel coordinator who specializes in organizing \
            trips. You create cohesive travel plans, making sure all parts of a trip work well \
            together, considering logistics, timing, and the overall flow of the trip.",
    },
    AgentSpec {
        name: "DestinationExpert",
        system_message: "You are a destination expert with extensive knowledge about travel \
            destinations worldwide. You provide detailed information about locations, including \
            attractions, local customs, best times to visit, and hidden gems tourists might miss.",
    },
    AgentSpec {
        name: "BudgetAdvisor",
        system_message: "You are a budget travel advisor who helps travelers maximize value. You \
            advise on saving money, finding deals, and creating realistic travel budgets, and \
            suggest cost-effective options for accommodations, transportation, dining, and \
            activities.",
    },
    AgentSpec {
        name: "LocalCuisineExpert",
        system_message: "You are an expert on local cuisines around the world. You recommend \
            authentic food experiences, from street food to fine dining, and know the signature \
            dishes of different regions.",
    },
];

const PANEL_AGENTS: &[AgentSpec] = &[
    AgentSpec {
        name: "Assistant",
        system_message: "You are a helpful AI assistant.",
    },
    AgentSpec {
        name: "DataScientist",
        system_message: "You are a data scientist. You analyze data and create models.",
    },
    AgentSpec {
        name: "Programmer",
        system_message: "You are a Python programmer. You can translate concepts into efficient \
            code.",
    },
];

const CODEGEN_AGENTS: &[AgentSpec] = &[AgentSpec {
    name: "Assistant",
    system_message: "You are a helpful AI assistant with expertise in Python programming. Always \
        provide complete, runnable code blocks that can execute independently. Make sure all \
        variables are defined before they are used. Use a step-by-step approach that keeps all \
        the needed variables in scope. After completing all tasks, respond with 'TERMINATE'.",
}];

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "research",
        title: "Research assistant",
        description: "A research assistant summarizes one topic from the bundled research-topics \
            dataset.",
        agents: RESEARCH_AGENTS,
        max_rounds: 5,
    },
    Scenario {
        name: "travel",
        title: "Travel planning round-table",
        description: "Four travel experts collaborate on a trip plan: coordination, destination, \
            budget, and food.",
        agents: TRAVEL_AGENTS,
        max_rounds: 15,
    },
    Scenario {
        name: "panel",
        title: "Engineering panel",
        description: "An assistant, a data scientist, and a programmer discuss how to build a \
            solution together.",
        agents: PANEL_AGENTS,
        max_rounds: 10,
    },
    Scenario {
        name: "codegen",
        title: "Code generation",
        description: "A Python-savvy assistant works through analysis tasks against the bundled \
            temperature dataset.",
        agents: CODEGEN_AGENTS,
        max_rounds: 5,
    },
];

/// The closed scenario catalog.
pub fn builtin() -> &'static [Scenario] {
    SCENARIOS
}

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: String,
    pub content: String,
}

const USER_SPEAKER: &str = "User";

const SPEAKER_COLORS: [AnsiColors; 5] = [
    AnsiColors::White,
    AnsiColors::Cyan,
    AnsiColors::Magenta,
    AnsiColors::Yellow,
    AnsiColors::Green,
];

/// Runs the scenario's round-robin conversation and returns the transcript.
///
/// Each agent sees its own system message, its own prior turns as assistant
/// messages, and everyone else's turns as `Name: content` user messages. A
/// reply ending in `TERMINATE` stops the conversation early.
pub async fn run(
    client: &ChatClient,
    scenario: &Scenario,
    opening: &str,
    rounds: u32,
    options: AskOptions,
) -> Result<Vec<Turn>, ChatError> {
    let mut transcript = vec![Turn {
        speaker: USER_SPEAKER.to_string(),
        content: opening.to_string(),
    }];
    print_turn(0, USER_SPEAKER, opening);

    'conversation: for _ in 0..rounds {
        for (index, agent) in scenario.agents.iter().enumerate() {
            let messages = agent_view(agent, &transcript);
            let response = client.ask_messages(&messages, options).await?;
            print_turn(index + 1, agent.name, &response.content);

            let finished = is_termination(&response.content);
            transcript.push(Turn {
                speaker: agent.name.to_string(),
                content: response.content,
            });
            if finished {
                break 'conversation;
            }
        }
    }

    Ok(transcript)
}

/// Projects the shared transcript into one agent's message view.
fn agent_view(agent: &AgentSpec, transcript: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(ChatMessage::system(agent.system_message));
    for turn in transcript {
        if turn.speaker == agent.name {
            messages.push(ChatMessage::assistant(turn.content.clone()));
        } else {
            messages.push(ChatMessage::user(format!(
                "{}: {}",
                turn.speaker, turn.content
            )));
        }
    }
    messages
}

fn is_termination(content: &str) -> bool {
    content.trim_end().ends_with("TERMINATE")
}

fn print_turn(index: usize, speaker: &str, content: &str) {
    let color = SPEAKER_COLORS[index % SPEAKER_COLORS.len()];
    println!("{}", format!("[{speaker}]").color(color).bold());
    println!("{content}\n");
}
