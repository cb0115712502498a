/*
[INPUT]:  Debate topic, stance, argument cards, optional existing debate id
[OUTPUT]: AI debate turn plus the created or updated debate record
[POS]:    Service layer - debate duel over POST /debate and the Store
[UPDATE]: When debate rules or the debate endpoint change
*/

use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::store::{Debate, Store};
use chrono::Utc;
use edutask_adapter::{DebateAction, DebateRequest, DebateResponse, EdutaskClient, Stance};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub const MAX_CARDS: usize = 3;

#[derive(Debug, Clone)]
pub struct DebateTurn {
    /// Continue this debate instead of starting a new one
    pub debate_id: Option<String>,
    pub topic: String,
    pub stance: Stance,
    pub cards: Vec<String>,
    pub user_input: Option<String>,
    pub action: Option<DebateAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebateOutcome {
    pub debate: Debate,
    pub response: DebateResponse,
}

/// Trim cards and require between one and three distinct, non-empty ones
pub fn validate_cards(cards: &[String]) -> ServiceResult<Vec<String>> {
    let cards: Vec<String> = cards.iter().map(|c| c.trim().to_string()).collect();
    if cards.is_empty() || cards.len() > MAX_CARDS {
        return Err(ServiceError::validation(format!(
            "select between 1 and {MAX_CARDS} argument cards"
        )));
    }
    if cards.iter().any(String::is_empty) {
        return Err(ServiceError::validation("argument cards cannot be empty"));
    }

    let mut seen = HashSet::new();
    if !cards.iter().all(|c| seen.insert(c.as_str())) {
        return Err(ServiceError::validation("argument cards must be unique"));
    }
    Ok(cards)
}

pub struct DebateService {
    client: EdutaskClient,
    store: Arc<dyn Store>,
}

impl DebateService {
    pub fn new(client: EdutaskClient, store: Arc<dyn Store>) -> Self {
        Self { client, store }
    }

    pub async fn duel(&self, student_id: &str, turn: DebateTurn) -> ServiceResult<DebateOutcome> {
        let topic = turn.topic.trim();
        if topic.is_empty() {
            return Err(ServiceError::validation("debate topic cannot be empty"));
        }
        let cards = validate_cards(&turn.cards)?;

        let existing = match &turn.debate_id {
            Some(id) => Some(
                self.store
                    .get_debate(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("debate", id.as_str()))?,
            ),
            None => None,
        };

        let response = self
            .client
            .debate_turn(&DebateRequest {
                topic: topic.to_string(),
                stance: turn.stance,
                cards: cards.clone(),
                user_input: turn.user_input,
                action: turn.action,
            })
            .await?;
        let ai_response = response.ai_response.clone().unwrap_or_default();

        let debate = match existing {
            Some(mut debate) => {
                debate.ai_response = ai_response;
                debate.cards = cards;
                debate.updated_at = Utc::now();
                self.store.update_debate(debate.clone()).await?;
                info!(debate_id = %debate.id, "debate updated");
                debate
            }
            None => {
                let now = Utc::now();
                let debate = Debate {
                    id: uuid::Uuid::new_v4().to_string(),
                    student_id: student_id.to_string(),
                    topic: topic.to_string(),
                    stance: turn.stance,
                    cards,
                    ai_response,
                    created_at: now,
                    updated_at: now,
                };
                self.store.insert_debate(debate.clone()).await?;
                info!(debate_id = %debate.id, student_id, "debate created");
                debate
            }
        };

        Ok(DebateOutcome { debate, response })
    }
}
