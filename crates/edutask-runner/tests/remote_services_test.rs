/*
[INPUT]:  Mock /debate and /micro-goals endpoints, in-memory store
[OUTPUT]: Verified debate and engagement service behavior
[POS]:    Integration tests - services calling synchronous AI endpoints
[UPDATE]: When debate or engagement flows change
*/

mod common;

use common::{client_for, memory_store};
use edutask_adapter::{EngagementSample, Stance};
use edutask_runner::{DebateService, DebateTurn, EngagementService, ServiceError};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn turn(cards: &[&str]) -> DebateTurn {
    DebateTurn {
        debate_id: None,
        topic: "School uniforms".to_string(),
        stance: Stance::For,
        cards: cards.iter().map(|c| c.to_string()).collect(),
        user_input: None,
        action: None,
    }
}

fn sample(topic: &str, score: f64) -> EngagementSample {
    EngagementSample {
        topic: topic.to_string(),
        time_spent: 10.0,
        engagement_score: score,
        interactions: vec!["viewed".to_string()],
    }
}

#[tokio::test]
async fn test_debate_created_then_updated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/debate"))
        .and(body_partial_json(json!({ "cards": ["Equality", "Focus"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ai_response": "Uniforms limit expression."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/debate"))
        .and(body_partial_json(json!({ "cards": ["Cost"], "user_input": "They save money" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ai_response": "Not every family benefits."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = memory_store();
    let service = DebateService::new(client_for(&server), store.clone());

    let opening = assert_ok!(service.duel("student-1", turn(&["Equality", " Focus "])).await);
    assert_eq!(opening.debate.ai_response, "Uniforms limit expression.");
    assert_eq!(opening.debate.stance, Stance::For);

    let mut rebuttal = turn(&["Cost"]);
    rebuttal.debate_id = Some(opening.debate.id.clone());
    rebuttal.user_input = Some("They save money".to_string());
    let reply = assert_ok!(service.duel("student-1", rebuttal).await);

    assert_eq!(reply.debate.id, opening.debate.id);
    assert_eq!(reply.debate.cards, ["Cost"]);
    assert_eq!(reply.debate.created_at, opening.debate.created_at);

    let stored = store.get_debate(&opening.debate.id).await.unwrap().unwrap();
    assert_eq!(stored.ai_response, "Not every family benefits.");
}

#[tokio::test]
async fn test_invalid_debate_never_reaches_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/debate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let service = DebateService::new(client_for(&server), memory_store());

    let err = service.duel("s", turn(&["a", "b", "c", "d"])).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut blank_topic = turn(&["a"]);
    blank_topic.topic = "  ".to_string();
    let err = service.duel("s", blank_topic).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut unknown = turn(&["a"]);
    unknown.debate_id = Some("missing".to_string());
    assert!(service.duel("s", unknown).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_debate_service_error_is_remote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/debate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "model offline" })))
        .mount(&server)
        .await;

    let store = memory_store();
    let service = DebateService::new(client_for(&server), store.clone());
    let err = service.duel("s", turn(&["a"])).await.unwrap_err();

    assert!(matches!(err, ServiceError::Remote(_)));
    assert!(err.to_string().contains("model offline"));
}

#[tokio::test]
async fn test_micro_goals_use_saved_engagement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/micro-goals"))
        .and(body_json(json!({
            "learning_objective": "Master fractions",
            "interests": ["baking"],
            "engagement_data": [{
                "topic": "Fractions",
                "time_spent": 10.0,
                "engagement_score": 70.0,
                "interactions": ["viewed"]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "micro_goals": [{ "goal": "Halve a recipe", "minutes": 10 }],
            "suggestions": ["Use measuring cups"],
            "progress": 0.25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = EngagementService::new(client_for(&server), memory_store());
    assert_ok!(service.save("student-1", sample("Fractions", 70.0)).await);
    assert_ok!(service.save("student-2", sample("Poetry", 90.0)).await);

    let history = service.fetch("student-1").await.unwrap();
    assert_eq!(history, vec![sample("Fractions", 70.0)]);

    let goals = assert_ok!(
        service
            .micro_goals("student-1", " Master fractions ", vec!["baking".to_string()])
            .await
    );
    assert_eq!(goals.micro_goals.len(), 1);
    assert_eq!(goals.progress, 0.25);
}

#[tokio::test]
async fn test_micro_goals_without_history_omit_engagement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/micro-goals"))
        .and(body_json(json!({ "learning_objective": "Read more" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "micro_goals": [],
            "suggestions": [],
            "progress": 0.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = EngagementService::new(client_for(&server), memory_store());
    assert_ok!(service.micro_goals("student-9", "Read more", Vec::new()).await);
}

#[tokio::test]
async fn test_engagement_validation() {
    let server = MockServer::start().await;
    let service = EngagementService::new(client_for(&server), memory_store());

    assert!(service.save("s", sample("", 50.0)).await.is_err());
    assert!(service.save("s", sample("Maths", 120.0)).await.is_err());
    assert!(service.micro_goals("s", "   ", Vec::new()).await.is_err());
    assert!(service.fetch("s").await.unwrap().is_empty());
}
