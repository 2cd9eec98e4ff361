//! Terminal rendering of the quiz session and intent capture.

use anyhow::{bail, Result};
use client_core::{
    session::Session, validation::MAX_THEME_CHARS, Intent, SessionController, SessionEvent, Stage,
};
use inquire::{error::InquireError, Confirm, Select, Text};
use shared::domain::PersonalityMode;
use tokio::sync::broadcast;

struct ModeOption(PersonalityMode);

impl std::fmt::Display for ModeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.label())
    }
}

pub async fn run(controller: &mut SessionController) -> Result<()> {
    let mut events = controller.subscribe_events();
    println!("AI Personality Quiz");

    loop {
        let session = controller.session().clone();
        match session.stage {
            Stage::ModeSelect => {
                let options = PersonalityMode::ALL.into_iter().map(ModeOption).collect();
                let picked = Select::new("Choose how the AI should analyze your personality:", options)
                    .prompt();
                let Some(ModeOption(mode)) = answer_or_quit(picked)? else {
                    return Ok(());
                };
                dispatch(controller, &mut events, Intent::SelectMode(mode)).await;
            }
            Stage::ThemeEntry => {
                if let Some(err) = &session.scenario_error {
                    println!("! {}", err.message);
                }
                let entered = Text::new("Enter a theme for your quiz (e.g. space, medieval, cooking):")
                    .with_initial_value(&session.theme)
                    .prompt();
                let Some(text) = answer_or_quit(entered)? else {
                    return Ok(());
                };
                let updated = dispatch(controller, &mut events, Intent::UpdateTheme(text.clone())).await;
                if updated.theme != text {
                    println!("! Themes are limited to {MAX_THEME_CHARS} characters.");
                    continue;
                }
                if let Some(message) = &updated.theme_error {
                    println!("! {message}");
                    continue;
                }
                let submitted = dispatch(controller, &mut events, Intent::SubmitTheme).await;
                if let Some(message) = &submitted.theme_error {
                    println!("! {message}");
                }
            }
            Stage::ScenarioActive => {
                let Some(scenario) = session.current_scenario.clone() else {
                    bail!("active round has no scenario");
                };
                println!();
                println!("{}", session.round_label());
                println!("{}", scenario.prompt_text);
                let options = scenario.options().map(str::to_string).to_vec();
                let Some(pick) = answer_or_quit(Select::new("What do you do?", options).prompt())?
                else {
                    return Ok(());
                };
                dispatch(controller, &mut events, Intent::SelectChoice(pick)).await;
            }
            Stage::AnalysisComplete => {
                println!();
                println!("Your Personality Analysis:");
                println!("{}", session.analysis_text.as_deref().unwrap_or_default());
                println!();
                let again = Confirm::new("Play again?").with_default(false).prompt();
                match answer_or_quit(again)? {
                    Some(true) => {
                        dispatch(controller, &mut events, Intent::Restart).await;
                    }
                    _ => return Ok(()),
                }
            }
            stage @ (Stage::ScenarioLoading | Stage::Analyzing) => {
                bail!("quiz is waiting on the service outside of a dispatch ({stage:?})");
            }
        }
    }
}

/// Runs one intent to completion, printing loading notices as the session
/// passes through its loading stages.
async fn dispatch(
    controller: &mut SessionController,
    events: &mut broadcast::Receiver<SessionEvent>,
    intent: Intent,
) -> Session {
    let mut announced = false;
    let settled = {
        let work = controller.dispatch(intent);
        tokio::pin!(work);
        loop {
            tokio::select! {
                session = &mut work => break session.clone(),
                Ok(SessionEvent::StateChanged(state)) = events.recv(), if !announced => {
                    announced = announce_loading(&state);
                }
            }
        }
    };
    while events.try_recv().is_ok() {}
    settled
}

fn announce_loading(session: &Session) -> bool {
    if session.scenario_loading {
        println!("Generating {}...", session.round_label().to_lowercase());
        true
    } else if session.analysis_loading {
        println!("Analyzing your personality...");
        true
    } else {
        false
    }
}

fn answer_or_quit<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
