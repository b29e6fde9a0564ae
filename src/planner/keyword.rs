use crate::model::goal::{Goal, Intent};
use crate::planner::{IntentExtractionError, IntentSource};
use crate::shared::ids::{allocate_id, GoalId, IntentId};

/// One recognizable objective: the exact tokens that trigger it and the
/// goal it contributes to the intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveEntry {
    goal_id: GoalId,
    keywords: Vec<String>,
    objective: String,
}

impl ObjectiveEntry {
    pub fn new(slug: &str, keywords: &[&str], objective: &str) -> Result<Self, String> {
        let goal_id = GoalId::parse(&format!("goal-{slug}"))?;
        if keywords.is_empty() {
            return Err(format!("objective `{slug}` must declare at least one keyword"));
        }
        Ok(Self {
            goal_id,
            keywords: keywords
                .iter()
                .map(|keyword| keyword.to_ascii_lowercase())
                .collect(),
            objective: objective.to_string(),
        })
    }

    fn matches(&self, tokens: &[String]) -> bool {
        self.keywords
            .iter()
            .any(|keyword| tokens.iter().any(|token| token == keyword))
    }
}

/// Extracts an intent by scoring the request against a catalog of known
/// objectives. Exact-token matches only; matched objectives become
/// sub-goals chained in catalog order. A request matching nothing still
/// yields a valid single-goal intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordIntentSource {
    catalog: Vec<ObjectiveEntry>,
}

impl KeywordIntentSource {
    pub fn new(catalog: Vec<ObjectiveEntry>) -> Self {
        Self { catalog }
    }
}

impl Default for KeywordIntentSource {
    fn default() -> Self {
        Self::new(builtin_objective_catalog())
    }
}

impl IntentSource for KeywordIntentSource {
    fn extract_intent(&self, raw_text: &str, now: i64) -> Result<Intent, IntentExtractionError> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(IntentExtractionError::EmptyInput);
        }
        let id = allocate_id("intent", now)
            .and_then(IntentId::try_from)
            .map_err(IntentExtractionError::IdAllocation)?;

        let tokens = tokenize(trimmed);
        let mut sub_goals: Vec<Goal> = Vec::new();
        for entry in &self.catalog {
            if !entry.matches(&tokens) {
                continue;
            }
            let dependencies = sub_goals
                .last()
                .map(|previous| vec![previous.id.clone()])
                .unwrap_or_default();
            sub_goals.push(Goal {
                id: entry.goal_id.clone(),
                objective: entry.objective.clone(),
                dependencies,
            });
        }

        let main_goal = Goal {
            id: GoalId::parse("goal-main").map_err(IntentExtractionError::Backend)?,
            objective: trimmed.to_string(),
            dependencies: Vec::new(),
        };
        Ok(Intent {
            id,
            raw_text: trimmed.to_string(),
            main_goal,
            sub_goals,
        })
    }
}

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

fn builtin_objective_catalog() -> Vec<ObjectiveEntry> {
    vec![
        ObjectiveEntry::new("flight", &["flight", "flights", "fly"], "Book flight")
            .expect("builtin objective entry is valid"),
        ObjectiveEntry::new("hotel", &["hotel", "hotels", "stay"], "Book hotel")
            .expect("builtin objective entry is valid"),
        ObjectiveEntry::new("visa", &["visa"], "Apply for visa")
            .expect("builtin objective entry is valid"),
        ObjectiveEntry::new("swap", &["swap", "token", "tokens"], "Swap tokens")
            .expect("builtin objective entry is valid"),
        ObjectiveEntry::new("checkout", &["checkout", "pay", "purchase"], "Complete checkout")
            .expect("builtin objective entry is valid"),
        ObjectiveEntry::new("meeting", &["meeting", "schedule", "calendar"], "Schedule meeting")
            .expect("builtin objective entry is valid"),
    ]
}
