/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Compute service task results and store contents printed as JSON
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edutask_adapter::{
    EdutaskClient, ExamPrepRequest, PollPolicy, QuizEvaluationRequest, QuizRequest, RemoteTask,
    RoutineRequest, Stance,
};
use edutask_runner::{
    CurriculumService, DebateService, DebateTurn, EngagementService, JsonFileStore, MemoryStore,
    QuizService, RunnerConfig, Store, TaskFlow, TaskView,
};

#[derive(Parser, Debug)]
#[command(name = "edutask", version, about = "Education compute service client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Overrides service.base_url from the config file
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    /// JSON store location; overrides store_path from the config file
    #[arg(long = "store", value_name = "PATH", conflicts_with = "memory")]
    store_path: Option<PathBuf>,
    /// Keep store changes in memory for this run only
    #[arg(long)]
    memory: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List subjects known to the compute service
    Subjects,
    /// Show the current student ability estimate
    Ability,
    /// Show evaluated quiz history
    History,
    #[command(subcommand)]
    Quiz(QuizCommand),
    /// Generate a daily routine
    Routine {
        #[arg(long)]
        age: u32,
        #[arg(long = "sleep-time", value_name = "HH:MM")]
        sleep_time: String,
        #[arg(long = "wake-time", value_name = "HH:MM")]
        wake_time: String,
        #[arg(long = "study-hours")]
        study_hours: f64,
        #[arg(long = "exercise-minutes")]
        exercise_minutes: f64,
        /// Comma separated subject list
        #[arg(long)]
        subjects: String,
    },
    /// Build an exam study guide from course materials and a syllabus
    Prep {
        /// JSON file with `course_materials` and `syllabus`
        #[arg(long = "request", value_name = "PATH")]
        request_path: PathBuf,
    },
    /// Play one debate turn
    Debate {
        #[arg(long)]
        topic: String,
        #[arg(long, value_enum)]
        stance: StanceArg,
        #[arg(long = "card", required = true)]
        cards: Vec<String>,
        /// Continue an existing debate
        #[arg(long = "debate-id")]
        debate_id: Option<String>,
        #[arg(long = "input")]
        user_input: Option<String>,
    },
    /// Request micro goals for a learning objective
    Goals {
        #[arg(long)]
        objective: String,
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    #[command(subcommand)]
    Subject(SubjectCommand),
    #[command(subcommand)]
    Topic(TopicCommand),
    /// Probe a background task
    Status {
        #[arg(long = "task-id")]
        task_id: String,
    },
    /// Drop a finished task on the service
    Cleanup {
        #[arg(long = "task-id")]
        task_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum QuizCommand {
    /// Generate a quiz with the compute service
    Generate {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        topic: Option<String>,
        /// Keep the generated quiz in the store
        #[arg(long)]
        save: bool,
        #[arg(long = "duration", default_value_t = 30)]
        duration_minutes: u32,
    },
    /// Evaluate answers with the compute service
    Evaluate {
        #[arg(long = "quiz-id")]
        quiz_id: String,
        #[arg(long = "answer", value_name = "QUESTION=ANSWER")]
        answers: Vec<String>,
    },
    /// Score answers against a stored quiz
    Submit {
        #[arg(long = "quiz-id")]
        quiz_id: String,
        #[arg(long = "answer", value_name = "QUESTION=ANSWER")]
        answers: Vec<String>,
    },
    /// List stored quizzes, newest first
    List,
    /// Delete a stored quiz
    Delete {
        #[arg(long = "quiz-id")]
        quiz_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
    List,
    Add { name: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum TopicCommand {
    List,
    Add {
        #[arg(long = "subject-id")]
        subject_id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "sequence", default_value_t = 1)]
        sequence_number: u32,
    },
    Remove { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StanceArg {
    For,
    Against,
}

impl From<StanceArg> for Stance {
    fn from(value: StanceArg) -> Self {
        match value {
            StanceArg::For => Stance::For,
            StanceArg::Against => Stance::Against,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let mut config = RunnerConfig::load(args.config_path.as_deref()).context("load config")?;
    if let Some(base_url) = &args.base_url {
        config.service.base_url = base_url.clone();
    }
    if let Some(store_path) = &args.store_path {
        config.store_path = Some(store_path.clone());
    }
    config.validate().context("validate config")?;
    info!(base_url = %config.service.base_url, student_id = %config.student_id, "configuration loaded");

    let client =
        EdutaskClient::with_config(config.client_config()).context("create compute service client")?;
    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let session = Session {
        client,
        policy: config.poll_policy(),
        shutdown,
        student_id: config.student_id.clone(),
    };

    match args.command {
        Command::Subjects => print_json(&session.client.list_subjects().await?),
        Command::Ability => print_json(&session.client.student_ability().await?),
        Command::History => print_json(&session.client.student_history().await?),
        Command::Status { task_id } => print_json(&session.client.task_status(&task_id).await?),
        Command::Cleanup { task_id } => print_json(&session.client.cleanup_task(&task_id).await?),
        Command::Routine {
            age,
            sleep_time,
            wake_time,
            study_hours,
            exercise_minutes,
            subjects,
        } => {
            let request = RoutineRequest {
                age,
                sleep_time,
                wake_time,
                study_hours,
                exercise_time: exercise_minutes,
                subjects,
            };
            finish(session.run_flow(&request).await)
        }
        Command::Prep { request_path } => {
            let raw = tokio::fs::read_to_string(&request_path)
                .await
                .with_context(|| format!("read {}", request_path.display()))?;
            let request: ExamPrepRequest =
                serde_json::from_str(&raw).context("parse exam prep request")?;
            finish(session.run_flow(&request).await)
        }
        Command::Quiz(command) => {
            let store = open_store(&config, args.memory).await?;
            run_quiz(&session, store, command).await
        }
        Command::Debate {
            topic,
            stance,
            cards,
            debate_id,
            user_input,
        } => {
            let store = open_store(&config, args.memory).await?;
            let service = DebateService::new(session.client.clone(), store);
            let turn = DebateTurn {
                debate_id,
                topic,
                stance: stance.into(),
                cards,
                user_input,
                action: None,
            };
            print_json(&service.duel(&session.student_id, turn).await?)
        }
        Command::Goals {
            objective,
            interests,
        } => {
            let store = open_store(&config, args.memory).await?;
            let service = EngagementService::new(session.client.clone(), store);
            print_json(
                &service
                    .micro_goals(&session.student_id, &objective, interests)
                    .await?,
            )
        }
        Command::Subject(command) => {
            let service = CurriculumService::new(open_store(&config, args.memory).await?);
            match command {
                SubjectCommand::List => print_json(&service.list_subjects().await?),
                SubjectCommand::Add { name } => print_json(&service.create_subject(&name).await?),
                SubjectCommand::Remove { id } => print_json(&service.delete_subject(&id).await?),
            }
        }
        Command::Topic(command) => {
            let service = CurriculumService::new(open_store(&config, args.memory).await?);
            match command {
                TopicCommand::List => print_json(&service.list_topics().await?),
                TopicCommand::Add {
                    subject_id,
                    name,
                    sequence_number,
                } => print_json(
                    &service
                        .add_topic(&name, &subject_id, sequence_number)
                        .await?,
                ),
                TopicCommand::Remove { id } => print_json(&service.delete_topic(&id).await?),
            }
        }
    }
}

/// Shared state for subcommands that talk to the compute service
struct Session {
    client: EdutaskClient,
    policy: PollPolicy,
    shutdown: CancellationToken,
    student_id: String,
}

impl Session {
    /// Drive one submit + poll flow, logging each view change
    async fn run_flow<T>(&self, request: &T) -> TaskView<T::Output>
    where
        T: RemoteTask + 'static,
        T::Output: Clone + Sync + 'static,
    {
        let flow: TaskFlow<T> =
            TaskFlow::with_shutdown(self.client.clone(), self.policy.clone(), self.shutdown.clone());
        let mut updates = flow.subscribe();
        let watcher = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let phase = updates.borrow_and_update().phase();
                info!(task = T::NAME, ?phase, "task view changed");
            }
        });

        let view = flow.run(request).await;
        drop(flow);
        let _ = watcher.await;
        view
    }
}

async fn run_quiz(session: &Session, store: Arc<dyn Store>, command: QuizCommand) -> Result<()> {
    let service = QuizService::new(store);
    match command {
        QuizCommand::Generate {
            subject,
            topic,
            save,
            duration_minutes,
        } => {
            let view = session
                .run_flow(&QuizRequest::new(&subject, topic.as_deref()))
                .await;
            let generated = match (save, &view) {
                (true, TaskView::Completed(quiz)) => Some(quiz.clone()),
                _ => None,
            };
            finish(view)?;

            if let Some(quiz) = generated {
                let stored = service
                    .import_generated(&quiz, &session.student_id, duration_minutes)
                    .await
                    .context("save generated quiz")?;
                info!(quiz_id = %stored.id, "generated quiz saved");
            }
            Ok(())
        }
        QuizCommand::Evaluate { quiz_id, answers } => {
            let request = QuizEvaluationRequest {
                quiz_id,
                responses: parse_answers(&answers)?,
            };
            let view = session.run_flow(&request).await;
            let completed = matches!(view, TaskView::Completed(_));
            finish(view)?;

            // Evaluation moves the ability estimate and history on the service
            if completed {
                let ability = session.client.student_ability().await.context("refresh ability")?;
                print_json(&ability)?;
                let history = session.client.student_history().await.context("refresh history")?;
                print_json(&history)?;
            }
            Ok(())
        }
        QuizCommand::Submit { quiz_id, answers } => print_json(
            &service
                .submit_quiz(&quiz_id, &session.student_id, parse_answers(&answers)?)
                .await?,
        ),
        QuizCommand::List => print_json(&service.list_quizzes().await?),
        QuizCommand::Delete { quiz_id } => print_json(&service.delete_quiz(&quiz_id).await?),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

async fn open_store(config: &RunnerConfig, memory: bool) -> Result<Arc<dyn Store>> {
    if memory {
        warn!("using in-memory store; changes are discarded on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = match &config.store_path {
        Some(path) => JsonFileStore::open(path.clone()).await,
        None => JsonFileStore::open_default().await,
    }
    .context("open store")?;
    info!(path = %store.path().display(), "store opened");
    Ok(Arc::new(store))
}

fn parse_answers(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|pair| {
            let (question, answer) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("answer '{pair}' must look like QUESTION=ANSWER"))?;
            Ok((question.trim().to_string(), answer.trim().to_string()))
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("render output")?;
    println!("{rendered}");
    Ok(())
}

/// Print the final view; an error view fails the process
fn finish<T: Serialize>(view: TaskView<T>) -> Result<()> {
    print_json(&view)?;
    match view {
        TaskView::Error(message) => Err(anyhow!(message)),
        _ => Ok(()),
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
