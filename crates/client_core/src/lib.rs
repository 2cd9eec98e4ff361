use std::sync::Arc;

use shared::domain::PersonalityMode;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};

pub mod api;
pub mod error;
pub mod session;
pub mod validation;

pub use api::{HttpQuizApi, MissingQuizApi, QuizApi};
pub use error::QuizApiError;
pub use session::{reduce, Intent, RemoteCall, Session, Stage, Transition};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(Session),
    SaveCompleted,
    SaveFailed(String),
}

/// Single writer of the quiz [`Session`]. Intents are applied one at a time;
/// remote calls requested by the reducer are awaited here and their outcome
/// is fed back through the reducer, except the save call which runs detached.
pub struct SessionController {
    api: Arc<dyn QuizApi>,
    session: Session,
    events: broadcast::Sender<SessionEvent>,
    pending_save: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(api: Arc<dyn QuizApi>, total_questions: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            session: Session::new(total_questions),
            events,
            pending_save: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn select_mode(&mut self, mode: PersonalityMode) -> &Session {
        self.dispatch(Intent::SelectMode(mode)).await
    }

    pub async fn update_theme(&mut self, text: impl Into<String>) -> &Session {
        self.dispatch(Intent::UpdateTheme(text.into())).await
    }

    pub async fn submit_theme(&mut self) -> &Session {
        self.dispatch(Intent::SubmitTheme).await
    }

    pub async fn select_choice(&mut self, option_text: impl Into<String>) -> &Session {
        self.dispatch(Intent::SelectChoice(option_text.into())).await
    }

    pub async fn restart(&mut self) -> &Session {
        self.dispatch(Intent::Restart).await
    }

    /// Applies `intent` and every follow-up resolution it triggers.
    pub async fn dispatch(&mut self, intent: Intent) -> &Session {
        let mut pending = Some(intent);
        while let Some(intent) = pending.take() {
            let Transition { session, call } = reduce(&self.session, intent);
            self.apply(session);
            pending = match call {
                Some(call) => self.execute(call).await,
                None => None,
            };
        }
        &self.session
    }

    /// Waits for the most recent background save, if any. Nothing in the
    /// state machine depends on this.
    pub async fn flush_pending_save(&mut self) {
        if let Some(handle) = self.pending_save.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "save task did not complete");
            }
        }
    }

    fn apply(&mut self, session: Session) {
        if session == self.session {
            return;
        }
        if session.stage != self.session.stage {
            info!(from = ?self.session.stage, to = ?session.stage, "quiz stage changed");
        }
        self.session = session;
        let _ = self
            .events
            .send(SessionEvent::StateChanged(self.session.clone()));
    }

    async fn execute(&mut self, call: RemoteCall) -> Option<Intent> {
        match call {
            RemoteCall::Generate { theme } => {
                info!(
                    theme = %theme,
                    question_index = self.session.question_index,
                    "requesting scenario"
                );
                let outcome = self.api.generate_scenario(&theme).await;
                Some(Intent::ScenarioResolved(outcome))
            }
            RemoteCall::Analyze {
                theme,
                choices,
                avoided,
                mode,
            } => {
                info!(theme = %theme, %mode, rounds = choices.len(), "requesting personality analysis");
                let outcome = self
                    .api
                    .analyze_personality(&theme, &choices, &avoided, mode)
                    .await;
                Some(Intent::AnalysisResolved(outcome))
            }
            RemoteCall::Save {
                theme,
                analysis,
                mode,
            } => {
                self.spawn_save(theme, analysis, mode);
                None
            }
        }
    }

    fn spawn_save(&mut self, theme: String, analysis: String, mode: PersonalityMode) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            match api.save_response(&theme, &analysis, mode).await {
                Ok(()) => {
                    info!(theme = %theme, %mode, "saved quiz response");
                    let _ = events.send(SessionEvent::SaveCompleted);
                }
                Err(err) => {
                    error!(error = %err, theme = %theme, "failed to save quiz response");
                    let _ = events.send(SessionEvent::SaveFailed(err.to_string()));
                }
            }
        });
        self.pending_save = Some(handle);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
