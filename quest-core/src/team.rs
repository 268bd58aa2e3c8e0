use serde::{Deserialize, Serialize};

use crate::error::QuestError;

const MIN_LEN: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub agent1: String,
    pub agent2: String,
}

impl Team {
    pub fn register(name: &str, agent1: &str, agent2: &str) -> Result<Team, QuestError> {
        let name = checked("team name", name)?;
        let agent1 = checked("agent 1", agent1)?;
        let agent2 = checked("agent 2", agent2)?;
        Ok(Team {
            name,
            agent1,
            agent2,
        })
    }
}

fn checked(field: &'static str, value: &str) -> Result<String, QuestError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(QuestError::InvalidTeam {
            field,
            reason: "is required",
        });
    }
    if v.chars().count() < MIN_LEN {
        return Err(QuestError::InvalidTeam {
            field,
            reason: "needs at least 2 characters",
        });
    }
    Ok(v.to_string())
}
