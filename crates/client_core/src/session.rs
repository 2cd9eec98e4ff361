//! Quiz session value and the reducer that drives its state machine.
//!
//! `reduce` is the only place a [`Session`] changes. It never performs I/O:
//! when a transition needs remote data it returns a [`RemoteCall`] and the
//! caller feeds the outcome back in as another [`Intent`].

use shared::{
    domain::{PersonalityMode, Scenario},
    error::{ErrorKind, SessionError},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::QuizApiError,
    validation::{self, MAX_THEME_CHARS},
};

pub const DEFAULT_TOTAL_QUESTIONS: usize = 3;

pub const MISSING_DATA_MESSAGE: &str =
    "Missing required data for personality analysis. Please restart the quiz.";
pub const EMPTY_ANALYSIS_MESSAGE: &str =
    "The analyst had nothing to say this time. Try another round!";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Could not analyze your personality right now. Please restart and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    ModeSelect,
    ThemeEntry,
    ScenarioLoading,
    ScenarioActive,
    Analyzing,
    AnalysisComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: Option<PersonalityMode>,
    pub theme: String,
    pub stage: Stage,
    pub question_index: usize,
    pub total_questions: usize,
    pub current_scenario: Option<Scenario>,
    pub choice_history: Vec<String>,
    pub avoided_history: Vec<String>,
    pub analysis_text: Option<String>,
    pub scenario_loading: bool,
    pub analysis_loading: bool,
    pub theme_error: Option<String>,
    /// Last generate failure, kept until the next submission.
    pub scenario_error: Option<SessionError>,
}

impl Session {
    /// `total_questions` is clamped to at least one round.
    pub fn new(total_questions: usize) -> Self {
        Self {
            mode: None,
            theme: String::new(),
            stage: Stage::ModeSelect,
            question_index: 0,
            total_questions: total_questions.max(1),
            current_scenario: None,
            choice_history: Vec::new(),
            avoided_history: Vec::new(),
            analysis_text: None,
            scenario_loading: false,
            analysis_loading: false,
            theme_error: None,
            scenario_error: None,
        }
    }

    pub fn can_submit_theme(&self) -> bool {
        self.stage == Stage::ThemeEntry
            && !self.scenario_loading
            && validation::validate_for_submit(&self.theme).is_ok()
    }

    pub fn choices_enabled(&self) -> bool {
        self.stage == Stage::ScenarioActive && self.current_scenario.is_some()
    }

    pub fn round_label(&self) -> String {
        format!(
            "Scenario {} of {}",
            (self.question_index + 1).min(self.total_questions),
            self.total_questions
        )
    }

    fn restarted(&self) -> Self {
        Self::new(self.total_questions)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_QUESTIONS)
    }
}

/// User intents plus the resolutions of remote calls.
#[derive(Debug)]
pub enum Intent {
    SelectMode(PersonalityMode),
    UpdateTheme(String),
    SubmitTheme,
    SelectChoice(String),
    Restart,
    ScenarioResolved(Result<Scenario, QuizApiError>),
    AnalysisResolved(Result<Option<String>, QuizApiError>),
}

impl Intent {
    fn name(&self) -> &'static str {
        match self {
            Intent::SelectMode(_) => "select_mode",
            Intent::UpdateTheme(_) => "update_theme",
            Intent::SubmitTheme => "submit_theme",
            Intent::SelectChoice(_) => "select_choice",
            Intent::Restart => "restart",
            Intent::ScenarioResolved(_) => "scenario_resolved",
            Intent::AnalysisResolved(_) => "analysis_resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Generate {
        theme: String,
    },
    Analyze {
        theme: String,
        choices: Vec<String>,
        avoided: Vec<String>,
        mode: PersonalityMode,
    },
    Save {
        theme: String,
        analysis: String,
        mode: PersonalityMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub call: Option<RemoteCall>,
}

impl Transition {
    fn stay(session: Session) -> Self {
        Self {
            session,
            call: None,
        }
    }

    fn with_call(session: Session, call: RemoteCall) -> Self {
        Self {
            session,
            call: Some(call),
        }
    }
}

pub fn reduce(current: &Session, intent: Intent) -> Transition {
    let intent_name = intent.name();
    let stage = current.stage;
    let mut next = current.clone();

    match (stage, intent) {
        (_, Intent::Restart) => Transition::stay(current.restarted()),
        (Stage::ModeSelect, Intent::SelectMode(mode)) => {
            next.mode = Some(mode);
            next.stage = Stage::ThemeEntry;
            Transition::stay(next)
        }
        (Stage::ThemeEntry, Intent::UpdateTheme(text)) => {
            if !validation::within_length_bound(&text) {
                debug!(
                    len = validation::theme_len(&text),
                    max = MAX_THEME_CHARS,
                    "theme edit exceeds length bound; not applied"
                );
                return Transition::stay(next);
            }
            next.theme_error = validation::edit_error(&text).map(|err| err.to_string());
            next.theme = text;
            Transition::stay(next)
        }
        (Stage::ThemeEntry, Intent::SubmitTheme) if !current.scenario_loading => {
            if let Err(err) = validation::validate_for_submit(&next.theme) {
                next.theme_error = Some(err.to_string());
                return Transition::stay(next);
            }
            next.theme_error = None;
            begin_generate(next)
        }
        (Stage::ScenarioLoading, Intent::ScenarioResolved(outcome)) => {
            next.scenario_loading = false;
            match outcome {
                Ok(scenario) => {
                    next.current_scenario = Some(scenario);
                    next.stage = Stage::ScenarioActive;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        question_index = next.question_index,
                        "scenario generation failed"
                    );
                    next.current_scenario = None;
                    next.stage = Stage::ThemeEntry;
                    next.scenario_error = Some(err.into());
                }
            }
            Transition::stay(next)
        }
        (Stage::ScenarioActive, Intent::SelectChoice(picked)) => {
            let Some(scenario) = next.current_scenario.take() else {
                return Transition::stay(current.clone());
            };
            let Some(avoided) = scenario.avoided_option(&picked).map(str::to_string) else {
                debug!(picked = %picked, "choice does not match the current scenario; ignored");
                return Transition::stay(current.clone());
            };
            next.choice_history.push(picked);
            next.avoided_history.push(avoided);
            next.question_index += 1;
            if next.question_index < next.total_questions {
                begin_generate(next)
            } else {
                begin_analysis(next)
            }
        }
        (Stage::Analyzing, Intent::AnalysisResolved(outcome)) => {
            next.analysis_loading = false;
            next.stage = Stage::AnalysisComplete;
            match outcome {
                Ok(Some(analysis)) => {
                    next.analysis_text = Some(analysis.clone());
                    match next.mode {
                        Some(mode) => {
                            let call = RemoteCall::Save {
                                theme: next.theme.clone(),
                                analysis,
                                mode,
                            };
                            Transition::with_call(next, call)
                        }
                        None => Transition::stay(next),
                    }
                }
                Ok(None) => {
                    info!("analysis service returned no analysis; using fallback message");
                    next.analysis_text = Some(EMPTY_ANALYSIS_MESSAGE.to_string());
                    Transition::stay(next)
                }
                Err(err) => {
                    warn!(error = %err, "personality analysis failed");
                    next.analysis_text = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                    Transition::stay(next)
                }
            }
        }
        (stage, _) => {
            debug!(intent = intent_name, ?stage, "intent not valid in current stage; ignored");
            Transition::stay(next)
        }
    }
}

fn begin_generate(mut next: Session) -> Transition {
    next.stage = Stage::ScenarioLoading;
    next.scenario_loading = true;
    next.scenario_error = None;
    let call = RemoteCall::Generate {
        theme: next.theme.clone(),
    };
    Transition::with_call(next, call)
}

fn begin_analysis(mut next: Session) -> Transition {
    next.stage = Stage::Analyzing;
    let ready = !next.theme.trim().is_empty() && !next.choice_history.is_empty();
    let Some(mode) = next.mode.filter(|_| ready) else {
        let err = SessionError::new(ErrorKind::Precondition, MISSING_DATA_MESSAGE);
        error!(
            error = %err,
            has_mode = next.mode.is_some(),
            choices = next.choice_history.len(),
            "analysis preconditions violated; skipping remote call"
        );
        next.analysis_text = Some(err.message);
        next.stage = Stage::AnalysisComplete;
        return Transition::stay(next);
    };
    next.analysis_loading = true;
    let call = RemoteCall::Analyze {
        theme: next.theme.clone(),
        choices: next.choice_history.clone(),
        avoided: next.avoided_history.clone(),
        mode,
    };
    Transition::with_call(next, call)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
