/*
[INPUT]:  Subject name (e.g., "Physics")
[OUTPUT]: Generated quiz printed to stdout
[POS]:    Examples - submit a quiz generation task and poll it
[UPDATE]: When the task submission or polling API changes
*/

use edutask_adapter::*;
use std::time::Duration;

/// Example: generate a quiz against a locally running compute service
#[tokio::main]
async fn main() {
    println!("=== Edutask Quiz Generation Example ===\n");

    let client = match EdutaskClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created for {}\n", client.base_url());

    match client.list_subjects().await {
        Ok(subjects) => println!("✓ Subjects: {:?}", subjects),
        Err(e) => println!("✗ Error: {}", e),
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let policy = PollPolicy::default().with_deadline(Duration::from_secs(300));
    println!("\nGenerating a Physics quiz (Ctrl-C to stop waiting)...");
    match client
        .run_task(&QuizRequest::new("Physics", None), &policy, &cancel)
        .await
    {
        Ok(quiz) => {
            println!("✓ Quiz {} with {} questions", quiz.quiz_id, quiz.questions.len());
            for question in &quiz.questions {
                println!("  - [{:?}] {}", question.question_type, question.text);
            }
        }
        Err(e) => println!("✗ {}", e.user_message()),
    }

    println!("\n✓ Quiz example complete");
}
