use super::*;

fn meteor() -> Scenario {
    Scenario::well_formed("A meteor approaches", "Evacuate", "Investigate").expect("scenario")
}

fn power_failure() -> Scenario {
    Scenario::well_formed("Power fails", "Fix it", "Call for help").expect("scenario")
}

fn step(session: &Session, intent: Intent) -> Transition {
    reduce(session, intent)
}

fn apply(session: Session, intent: Intent) -> Session {
    reduce(&session, intent).session
}

fn theme_entry(total_questions: usize) -> Session {
    apply(
        Session::new(total_questions),
        Intent::SelectMode(PersonalityMode::Nice),
    )
}

fn active_with(session: Session, scenario: Scenario) -> Session {
    let loading = match session.stage {
        Stage::ThemeEntry => apply(session, Intent::SubmitTheme),
        _ => session,
    };
    assert_eq!(loading.stage, Stage::ScenarioLoading);
    apply(loading, Intent::ScenarioResolved(Ok(scenario)))
}

fn themed(total_questions: usize, theme: &str) -> Session {
    apply(
        theme_entry(total_questions),
        Intent::UpdateTheme(theme.to_string()),
    )
}

#[test]
fn fresh_session_starts_in_mode_select() {
    let session = Session::new(3);
    assert_eq!(session.stage, Stage::ModeSelect);
    assert_eq!(session.mode, None);
    assert_eq!(session.question_index, 0);
    assert!(session.choice_history.is_empty());
    assert!(!session.scenario_loading);
    assert!(!session.analysis_loading);
}

#[test]
fn zero_questions_is_clamped_to_one_round() {
    assert_eq!(Session::new(0).total_questions, 1);
}

#[test]
fn select_mode_advances_to_theme_entry_without_remote_call() {
    let transition = step(&Session::new(3), Intent::SelectMode(PersonalityMode::Mean));
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.mode, Some(PersonalityMode::Mean));
    assert_eq!(transition.session.stage, Stage::ThemeEntry);
}

#[test]
fn mode_cannot_change_once_chosen() {
    let session = theme_entry(3);
    let after = apply(session.clone(), Intent::SelectMode(PersonalityMode::Mean));
    assert_eq!(after, session);
}

#[test]
fn theme_edits_are_ignored_outside_theme_entry() {
    let session = Session::new(3);
    let after = apply(session.clone(), Intent::UpdateTheme("space".to_string()));
    assert_eq!(after, session);
}

#[test]
fn theme_edit_beyond_bound_is_not_applied() {
    let session = themed(3, "space");
    let after = apply(
        session.clone(),
        Intent::UpdateTheme("x".repeat(MAX_THEME_CHARS + 1)),
    );
    assert_eq!(after.theme, "space");

    let at_bound = "y".repeat(MAX_THEME_CHARS);
    let after = apply(session, Intent::UpdateTheme(at_bound.clone()));
    assert_eq!(after.theme, at_bound);
}

#[test]
fn theme_never_exceeds_bound_for_any_input_length() {
    let mut session = theme_entry(3);
    for len in [0, 1, 50, 99, 100, 101, 150, 1_000] {
        session = apply(session, Intent::UpdateTheme("z".repeat(len)));
        assert!(session.theme.chars().count() <= MAX_THEME_CHARS, "len {len}");
    }
}

#[test]
fn theme_error_tracks_allowed_characters() {
    let session = themed(3, "space?");
    assert!(session.theme_error.is_some());
    assert_eq!(session.theme, "space?");

    let session = apply(session, Intent::UpdateTheme("space".to_string()));
    assert_eq!(session.theme_error, None);

    let session = apply(session, Intent::UpdateTheme("space#".to_string()));
    assert!(session.theme_error.is_some());

    let session = apply(session, Intent::UpdateTheme(String::new()));
    assert_eq!(session.theme_error, None);
}

#[test]
fn submitting_empty_theme_sets_error_without_remote_call() {
    let transition = step(&theme_entry(3), Intent::SubmitTheme);
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.stage, Stage::ThemeEntry);
    assert!(transition.session.theme_error.is_some());
    assert!(!transition.session.scenario_loading);
}

#[test]
fn submitting_blank_theme_sets_error_without_remote_call() {
    let transition = step(&themed(3, "   "), Intent::SubmitTheme);
    assert_eq!(transition.call, None);
    assert!(transition.session.theme_error.is_some());
}

#[test]
fn submitting_invalid_theme_sets_error_without_remote_call() {
    let transition = step(&themed(3, "space & time"), Intent::SubmitTheme);
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.stage, Stage::ThemeEntry);
    assert!(transition.session.theme_error.is_some());
}

#[test]
fn submitting_valid_theme_requests_a_scenario() {
    let session = themed(3, "space");
    assert!(session.can_submit_theme());

    let transition = step(&session, Intent::SubmitTheme);
    assert_eq!(
        transition.call,
        Some(RemoteCall::Generate {
            theme: "space".to_string()
        })
    );
    assert_eq!(transition.session.stage, Stage::ScenarioLoading);
    assert!(transition.session.scenario_loading);
    assert!(!transition.session.can_submit_theme());
}

#[test]
fn second_submit_while_loading_is_ignored() {
    let loading = apply(themed(3, "space"), Intent::SubmitTheme);
    let transition = step(&loading, Intent::SubmitTheme);
    assert_eq!(transition.call, None);
    assert_eq!(transition.session, loading);
}

#[test]
fn scenario_success_activates_the_round() {
    let session = active_with(themed(3, "space"), meteor());
    assert_eq!(session.stage, Stage::ScenarioActive);
    assert_eq!(session.current_scenario, Some(meteor()));
    assert!(!session.scenario_loading);
    assert!(session.choices_enabled());
    assert_eq!(session.round_label(), "Scenario 1 of 3");
}

#[test]
fn scenario_failure_returns_to_theme_entry_and_allows_resubmit() {
    let loading = apply(themed(3, "space"), Intent::SubmitTheme);
    let failed = apply(
        loading,
        Intent::ScenarioResolved(Err(QuizApiError::Transport("HTTP 500".to_string()))),
    );
    assert_eq!(failed.stage, Stage::ThemeEntry);
    assert!(!failed.scenario_loading);
    assert_eq!(failed.current_scenario, None);
    let surfaced = failed.scenario_error.clone().expect("surfaced error");
    assert_eq!(surfaced.kind, ErrorKind::Transport);
    assert!(surfaced.is_retryable());

    let retry = step(&failed, Intent::SubmitTheme);
    assert!(matches!(retry.call, Some(RemoteCall::Generate { .. })));
    assert_eq!(retry.session.scenario_error, None);
}

#[test]
fn service_error_message_is_surfaced() {
    let loading = apply(themed(3, "space"), Intent::SubmitTheme);
    let failed = apply(
        loading,
        Intent::ScenarioResolved(Err(QuizApiError::Service("model overloaded".to_string()))),
    );
    let surfaced = failed.scenario_error.expect("surfaced error");
    assert_eq!(surfaced.kind, ErrorKind::Service);
    assert_eq!(surfaced.message, "model overloaded");
}

#[test]
fn late_scenario_resolution_is_ignored_after_restart() {
    let restarted = apply(
        apply(themed(3, "space"), Intent::SubmitTheme),
        Intent::Restart,
    );
    let after = apply(restarted.clone(), Intent::ScenarioResolved(Ok(meteor())));
    assert_eq!(after, restarted);
}

#[test]
fn choice_records_pick_and_computed_avoided_option() {
    let active = active_with(themed(3, "space"), meteor());
    let transition = step(&active, Intent::SelectChoice("Investigate".to_string()));

    let session = transition.session;
    assert_eq!(session.choice_history, vec!["Investigate".to_string()]);
    assert_eq!(session.avoided_history, vec!["Evacuate".to_string()]);
    assert_eq!(session.question_index, 1);
    assert_eq!(session.current_scenario, None);
    assert_eq!(session.stage, Stage::ScenarioLoading);
    assert!(session.scenario_loading);
    assert_eq!(
        transition.call,
        Some(RemoteCall::Generate {
            theme: "space".to_string()
        })
    );
}

#[test]
fn choice_not_in_scenario_is_ignored() {
    let active = active_with(themed(3, "space"), meteor());
    let transition = step(&active, Intent::SelectChoice("Panic".to_string()));
    assert_eq!(transition.call, None);
    assert_eq!(transition.session, active);
}

#[test]
fn choice_outside_active_round_is_ignored() {
    let loading = apply(themed(3, "space"), Intent::SubmitTheme);
    let transition = step(&loading, Intent::SelectChoice("Evacuate".to_string()));
    assert_eq!(transition.call, None);
    assert!(transition.session.choice_history.is_empty());
}

#[test]
fn histories_stay_aligned_with_question_index() {
    let total = 4;
    let rounds = [
        ("a1", "b1", "b1"),
        ("a2", "b2", "a2"),
        ("a3", "b3", "a3"),
        ("a4", "b4", "b4"),
    ];
    let mut session = themed(total, "forest");
    for (i, (a, b, pick)) in rounds.iter().enumerate() {
        let scenario = Scenario::well_formed(format!("round {i}"), *a, *b).expect("scenario");
        session = active_with(session, scenario.clone());
        session = apply(session, Intent::SelectChoice(pick.to_string()));

        assert_eq!(session.choice_history.len(), session.avoided_history.len());
        assert_eq!(session.choice_history.len(), session.question_index);
        assert_eq!(session.choice_history[i], *pick);
        assert_eq!(
            Some(session.avoided_history[i].as_str()),
            scenario.avoided_option(pick)
        );
    }
    assert_eq!(session.stage, Stage::Analyzing);
}

#[test]
fn last_choice_requests_analysis_with_full_histories() {
    let first = active_with(themed(2, "space"), meteor());
    let second = apply(first, Intent::SelectChoice("Investigate".to_string()));
    let second = active_with(second, power_failure());
    let transition = step(&second, Intent::SelectChoice("Fix it".to_string()));

    assert_eq!(transition.session.stage, Stage::Analyzing);
    assert!(transition.session.analysis_loading);
    assert_eq!(
        transition.call,
        Some(RemoteCall::Analyze {
            theme: "space".to_string(),
            choices: vec!["Investigate".to_string(), "Fix it".to_string()],
            avoided: vec!["Evacuate".to_string(), "Call for help".to_string()],
            mode: PersonalityMode::Nice,
        })
    );
}

#[test]
fn analysis_without_mode_fails_fast_locally() {
    let mut broken = active_with(themed(1, "space"), meteor());
    broken.mode = None;

    let transition = step(&broken, Intent::SelectChoice("Evacuate".to_string()));
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.stage, Stage::AnalysisComplete);
    assert!(!transition.session.analysis_loading);
    assert_eq!(
        transition.session.analysis_text.as_deref(),
        Some(MISSING_DATA_MESSAGE)
    );
}

#[test]
fn analysis_without_theme_fails_fast_locally() {
    let mut broken = active_with(themed(1, "space"), meteor());
    broken.theme.clear();

    let transition = step(&broken, Intent::SelectChoice("Evacuate".to_string()));
    assert_eq!(transition.call, None);
    assert_eq!(
        transition.session.analysis_text.as_deref(),
        Some(MISSING_DATA_MESSAGE)
    );
}

fn analyzing() -> Session {
    let active = active_with(themed(1, "space"), meteor());
    apply(active, Intent::SelectChoice("Investigate".to_string()))
}

#[test]
fn analysis_success_completes_and_requests_save() {
    let transition = step(
        &analyzing(),
        Intent::AnalysisResolved(Ok(Some("You are decisive.".to_string()))),
    );
    assert_eq!(transition.session.stage, Stage::AnalysisComplete);
    assert!(!transition.session.analysis_loading);
    assert_eq!(
        transition.session.analysis_text.as_deref(),
        Some("You are decisive.")
    );
    assert_eq!(
        transition.call,
        Some(RemoteCall::Save {
            theme: "space".to_string(),
            analysis: "You are decisive.".to_string(),
            mode: PersonalityMode::Nice,
        })
    );
}

#[test]
fn empty_analysis_uses_fallback_without_save() {
    let transition = step(&analyzing(), Intent::AnalysisResolved(Ok(None)));
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.stage, Stage::AnalysisComplete);
    assert_eq!(
        transition.session.analysis_text.as_deref(),
        Some(EMPTY_ANALYSIS_MESSAGE)
    );
}

#[test]
fn failed_analysis_uses_distinct_fallback_without_save() {
    let transition = step(
        &analyzing(),
        Intent::AnalysisResolved(Err(QuizApiError::Transport("connection refused".to_string()))),
    );
    assert_eq!(transition.call, None);
    assert_eq!(transition.session.stage, Stage::AnalysisComplete);
    assert!(!transition.session.analysis_loading);
    assert_eq!(
        transition.session.analysis_text.as_deref(),
        Some(ANALYSIS_FAILED_MESSAGE)
    );
    assert_ne!(ANALYSIS_FAILED_MESSAGE, EMPTY_ANALYSIS_MESSAGE);
}

#[test]
fn restart_from_every_stage_matches_a_fresh_session() {
    let fresh = Session::new(2);
    let mode_select = fresh.clone();
    let theme = themed(2, "space?");
    let loading = apply(themed(2, "space"), Intent::SubmitTheme);
    let active = active_with(themed(2, "space"), meteor());
    let mid_quiz = apply(active.clone(), Intent::SelectChoice("Evacuate".to_string()));
    let one_round = active_with(themed(1, "space"), meteor());
    let analyzing = apply(one_round, Intent::SelectChoice("Evacuate".to_string()));
    let complete = apply(
        analyzing.clone(),
        Intent::AnalysisResolved(Ok(Some("You are decisive.".to_string()))),
    );

    for session in [mode_select, theme, loading, active, mid_quiz] {
        let transition = step(&session, Intent::Restart);
        assert_eq!(transition.call, None);
        assert_eq!(transition.session, fresh);
    }
    for session in [analyzing, complete] {
        assert_eq!(apply(session, Intent::Restart), Session::new(1));
    }
}
