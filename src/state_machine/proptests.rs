//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_option_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9()^][A-Za-z0-9()^ ]{0,11}"
}

/// Item whose answer is one of its options, possibly with different case/spacing
fn arb_well_formed_item() -> impl Strategy<Value = QuizItem> {
    (
        "[A-Za-z ?]{5,40}",
        proptest::collection::vec(arb_option_text(), OPTIONS_PER_QUESTION),
        0..OPTIONS_PER_QUESTION,
        any::<bool>(),
    )
        .prop_map(|(question, options, answer_idx, shout)| {
            let answer = if shout {
                format!("  {}  ", options[answer_idx].to_uppercase())
            } else {
                options[answer_idx].clone()
            };
            QuizItem {
                question,
                options,
                answer,
            }
        })
}

/// Item whose answer matches none of its options
fn arb_malformed_item() -> impl Strategy<Value = QuizItem> {
    "[A-Za-z ?]{5,40}".prop_map(|question| QuizItem {
        question,
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: "none of these".into(),
    })
}

fn arb_item() -> impl Strategy<Value = QuizItem> {
    prop_oneof![
        4 => arb_well_formed_item(),
        1 => arb_malformed_item(),
    ]
}

fn arb_quiz() -> impl Strategy<Value = Quiz> {
    proptest::collection::vec(arb_item(), 0..6).prop_map(Quiz::new)
}

fn arb_topic() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Za-z ]{1,30}",
        1 => "[ \t\n]{0,5}",
    ]
}

/// Submissions refer to option slots so they are often valid
fn arb_submit() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => (0..OPTIONS_PER_QUESTION).prop_map(|slot| Event::Submit { selected: Some(format!("#{slot}")) }),
        1 => Just(Event::Submit { selected: None }),
        1 => "[a-z]{1,8}".prop_map(|s| Event::Submit { selected: Some(s) }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        2 => arb_topic().prop_map(|topic| Event::Start { topic }),
        5 => arb_submit(),
        1 => Just(Event::Refresh),
        2 => "[A-Za-z ]{0,40}".prop_map(|text| Event::ExplanationReady { text }),
        1 => "[a-z ]{1,20}".prop_map(|message| Event::ExplanationFailed { message }),
        2 => arb_quiz().prop_map(|quiz| Event::QuizReady { quiz }),
        1 => proptest::option::of("[a-z ]{0,20}").prop_map(|raw| Event::QuizFailed {
            message: "bad json".into(),
            raw,
        }),
        1 => "[a-z ]{1,20}".prop_map(|text| Event::FeedbackReady { text }),
        1 => "[a-z ]{1,20}".prop_map(|message| Event::FeedbackFailed { message }),
    ]
}

/// Replace `#slot` placeholders with the matching option of the current question
fn resolve(state: &SessionState, event: Event) -> Event {
    match event {
        Event::Submit {
            selected: Some(ref s),
        } if s.starts_with('#') => {
            let slot: usize = s.trim_start_matches('#').parse().unwrap_or(0);
            let selected = state
                .current_question()
                .and_then(|q| q.options.get(slot).cloned())
                .or_else(|| Some(s.clone()));
            Event::Submit { selected }
        }
        other => other,
    }
}

fn drive_to_explaining(topic: &str, quiz: Quiz) -> SessionState {
    let s = transition(&SessionState::default(), Event::start(topic))
        .unwrap()
        .new_state;
    let s = transition(
        &s,
        Event::ExplanationReady {
            text: "explanation".into(),
        },
    )
    .unwrap()
    .new_state;
    transition(&s, Event::QuizReady { quiz }).unwrap().new_state
}

fn count_feedback_requests(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::GenerateFeedback { .. }))
        .count()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_invariants_hold_for_any_event_sequence(
        events in proptest::collection::vec(arb_event(), 1..40)
    ) {
        let mut state = SessionState::default();
        let mut feedback_requests_this_session = 0usize;

        for raw in events {
            let event = resolve(&state, raw);
            let is_start = matches!(event, Event::Start { .. });
            let before = state.clone();

            match transition(&state, event) {
                Ok(result) => {
                    if is_start {
                        feedback_requests_this_session = 0;
                        prop_assert_eq!(result.new_state.current_index, 0);
                        prop_assert!(result.new_state.answers.is_empty());
                    } else {
                        prop_assert!(result.new_state.current_index >= before.current_index);
                        prop_assert!(result.new_state.answers.len() >= before.answers.len());
                    }
                    feedback_requests_this_session += count_feedback_requests(&result.effects);
                    state = result.new_state;
                }
                Err(_) => {
                    // Rejected events never change anything
                    prop_assert_eq!(&state, &before);
                }
            }

            prop_assert!(feedback_requests_this_session <= 1);
            if !state.phase.is_loading() {
                prop_assert_eq!(state.answers.len(), state.current_index);
            }
            if let Some(index) = state.phase.question_index() {
                prop_assert_eq!(index, state.current_index);
                prop_assert!(index < state.quiz.len());
            }
            if state.phase == SessionPhase::Completed {
                prop_assert_eq!(state.answers.len(), state.quiz.len());
                prop_assert!(state.feedback != FeedbackState::NotRequested);
            }
        }
    }

    #[test]
    fn prop_n_valid_submits_complete_the_quiz(
        quiz in arb_quiz(),
        slots in proptest::collection::vec(0..OPTIONS_PER_QUESTION, 6)
    ) {
        let n = quiz.len();
        let mut state = drive_to_explaining("Sorting", quiz);
        let mut feedback_requests = usize::from(state.phase == SessionPhase::Completed);

        for slot in slots.into_iter().take(n) {
            let pick = state.current_question().unwrap().options[slot].clone();
            let result = transition(&state, Event::submit(pick)).unwrap();
            feedback_requests += count_feedback_requests(&result.effects);
            state = result.new_state;
        }

        prop_assert_eq!(state.phase, SessionPhase::Completed);
        prop_assert_eq!(state.answers.len(), n);
        prop_assert_eq!(state.current_index, n);
        prop_assert_eq!(feedback_requests, 1);
    }

    #[test]
    fn prop_no_selection_never_moves_the_index(
        quiz in proptest::collection::vec(arb_well_formed_item(), 1..5).prop_map(Quiz::new),
        answered in 0usize..4
    ) {
        let mut state = drive_to_explaining("Graphs", quiz);
        for _ in 0..answered {
            if state.current_question().is_none() {
                break;
            }
            let pick = state.current_question().unwrap().options[0].clone();
            state = transition(&state, Event::submit(pick)).unwrap().new_state;
        }

        let before = state.current_index;
        let result = transition(&state, Event::Submit { selected: None });
        prop_assert!(result.is_err());
        prop_assert_eq!(state.current_index, before);
    }

    #[test]
    fn prop_answer_matching_ignores_case_and_padding(item in arb_well_formed_item()) {
        let correct_option = item.find_option(&item.answer).unwrap().to_string();
        let padded = format!("  {}\t", correct_option.to_lowercase());
        prop_assert!(item.is_correct(&padded));
    }

    #[test]
    fn prop_malformed_items_never_score(item in arb_malformed_item()) {
        let state = drive_to_explaining("Trees", Quiz::new(vec![item.clone()]));
        for option in &item.options {
            let result = transition(&state, Event::submit(option.clone())).unwrap();
            prop_assert_eq!(result.new_state.score(), 0);
        }
    }

    #[test]
    fn prop_blank_topics_stay_idle(topic in "[ \t\r\n]{0,10}") {
        let result = transition(&SessionState::default(), Event::Start { topic });
        prop_assert!(matches!(result, Err(ref e) if e.is_validation()));
    }

    #[test]
    fn prop_refresh_is_idempotent_after_completion(quiz in arb_quiz()) {
        let mut state = drive_to_explaining("Stacks", quiz);
        while state.current_question().is_some() {
            let pick = state.current_question().unwrap().options[0].clone();
            state = transition(&state, Event::submit(pick)).unwrap().new_state;
        }
        for _ in 0..3 {
            let result = transition(&state, Event::Refresh).unwrap();
            prop_assert!(result.effects.is_empty());
            prop_assert_eq!(&result.new_state, &state);
        }
    }
}
