//! Static display metadata for the five agents shown in the workflow panel.

use std::fmt;
use std::str::FromStr;

/// Identifies one of the five agents the tutor backend is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    /// The orchestrator that routes queries to the specialists.
    Root,
    /// Calculations, equations, and mathematical problems.
    Maths,
    /// Physical constants, laws, and phenomena.
    Physics,
    /// Elements, compounds, and chemical reactions.
    Chemistry,
    /// AI news and developments.
    NewsAnalyst,
}

/// Display metadata for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDescriptor {
    /// The agent this describes.
    pub id: AgentId,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Icon reference, in the icon font's class syntax.
    pub icon: &'static str,
    /// Accent color as `#rrggbb`.
    pub color: &'static str,
}

/// The badge a bot message may carry.
pub type AgentBadge = AgentDescriptor;

const ROOT: AgentDescriptor = AgentDescriptor {
    id: AgentId::Root,
    display_name: "Root Orchestrator",
    icon: "fas fa-crown",
    color: "#e67e22",
};

const MATHS: AgentDescriptor = AgentDescriptor {
    id: AgentId::Maths,
    display_name: "Mathematics Agent",
    icon: "fas fa-calculator",
    color: "#3498db",
};

const PHYSICS: AgentDescriptor = AgentDescriptor {
    id: AgentId::Physics,
    display_name: "Physics Agent",
    icon: "fas fa-atom",
    color: "#e74c3c",
};

const CHEMISTRY: AgentDescriptor = AgentDescriptor {
    id: AgentId::Chemistry,
    display_name: "Chemistry Agent",
    icon: "fas fa-flask",
    color: "#27ae60",
};

const NEWS_ANALYST: AgentDescriptor = AgentDescriptor {
    id: AgentId::NewsAnalyst,
    display_name: "News Analyst",
    icon: "fas fa-newspaper",
    color: "#9b59b6",
};

impl AgentId {
    /// Every agent, root first.
    pub const ALL: [AgentId; 5] = [
        AgentId::Root,
        AgentId::Maths,
        AgentId::Physics,
        AgentId::Chemistry,
        AgentId::NewsAnalyst,
    ];

    /// The wire identifier of this agent.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Root => "root",
            AgentId::Maths => "maths_agent",
            AgentId::Physics => "physics_agent",
            AgentId::Chemistry => "chemistry_agent",
            AgentId::NewsAnalyst => "news_analyst",
        }
    }

    /// The display metadata for this agent.
    pub fn descriptor(self) -> &'static AgentDescriptor {
        match self {
            AgentId::Root => &ROOT,
            AgentId::Maths => &MATHS,
            AgentId::Physics => &PHYSICS,
            AgentId::Chemistry => &CHEMISTRY,
            AgentId::NewsAnalyst => &NEWS_ANALYST,
        }
    }

    /// Resolves an identifier, falling back to [`AgentId::Root`] for anything unknown.
    pub fn resolve(id: &str) -> AgentId {
        id.parse().unwrap_or(AgentId::Root)
    }

    /// Returns true for the four specialists.
    pub fn is_specialist(self) -> bool {
        self != AgentId::Root
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown agent: {s}"))
    }
}

impl AgentDescriptor {
    /// Parses the accent color into its RGB components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.color.trim_start_matches('#');
        let channel = |at: usize| {
            hex.get(at..at + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(0)
        };
        (channel(0), channel(2), channel(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_fixed_descriptors() {
        let names: Vec<_> = AgentId::ALL
            .iter()
            .map(|id| id.descriptor().display_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Root Orchestrator",
                "Mathematics Agent",
                "Physics Agent",
                "Chemistry Agent",
                "News Analyst",
            ]
        );
        for id in AgentId::ALL {
            assert_eq!(id.descriptor().id, id);
        }
    }

    #[test]
    fn resolve_round_trips_known_ids() {
        assert_eq!(AgentId::resolve("maths_agent"), AgentId::Maths);
        assert_eq!(AgentId::resolve("news_analyst"), AgentId::NewsAnalyst);
        assert_eq!("physics_agent".parse::<AgentId>(), Ok(AgentId::Physics));
    }

    #[test]
    fn unknown_ids_fall_back_to_root() {
        assert_eq!(AgentId::resolve("maths"), AgentId::Root);
        assert_eq!(AgentId::resolve(""), AgentId::Root);
        assert!("biology_agent".parse::<AgentId>().is_err());
    }

    #[test]
    fn colors_parse() {
        assert_eq!(AgentId::Maths.descriptor().rgb(), (0x34, 0x98, 0xdb));
        assert_eq!(AgentId::Root.descriptor().rgb(), (0xe6, 0x7e, 0x22));
        assert!(!AgentId::Root.is_specialist());
        assert!(AgentId::Chemistry.is_specialist());
    }
}
