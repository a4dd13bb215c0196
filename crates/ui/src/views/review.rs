use dioxus::prelude::*;
use dioxus_router::use_navigator;
use keyboard_types::Key;

use recall_core::model::ReviewRating;
use services::ReviewPhase;

use crate::context::AppContext;
use crate::routes::{RequireSession, Route};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ReviewIntent, ReviewOutcome, ReviewVm, intent_for_key, start_review};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastAction {
    StartSession,
    Rate(ReviewRating),
}

/// Card content captured before the view-model is handed to an async
/// submit, so the card stays on screen while the rating is on the wire.
#[derive(Clone, Debug, PartialEq)]
struct CardSnapshot {
    front: String,
    back: Option<String>,
    example: Option<String>,
    progress: String,
}

impl CardSnapshot {
    fn of(vm: &ReviewVm) -> Option<Self> {
        Some(Self {
            front: vm.front_text()?.to_string(),
            back: vm.back_text().map(str::to_string),
            example: vm.example_text().map(str::to_string),
            progress: vm.progress_label(),
        })
    }
}

/// What the card area should show this render.
#[derive(Debug, PartialEq)]
struct CardDisplay<'a> {
    front: &'a str,
    back: Option<&'a str>,
    example: Option<&'a str>,
    flipped: bool,
    submitting: bool,
}

/// Resolve the card area from the view-model or, while a submission holds
/// the view-model, from the snapshot taken before it was handed off.
fn card_display<'a>(
    vm: Option<&'a ReviewVm>,
    in_flight: Option<&'a CardSnapshot>,
) -> Option<CardDisplay<'a>> {
    if let Some(vm) = vm {
        let front = vm.front_text()?;
        let submitting = matches!(vm.phase(), ReviewPhase::Submitting);
        let flipped = matches!(vm.phase(), ReviewPhase::Ready { flipped: true });
        return Some(CardDisplay {
            front,
            back: vm.back_text(),
            example: vm.example_text(),
            flipped: flipped || submitting,
            submitting,
        });
    }

    // A rating can only be submitted from the flipped side.
    let snapshot = in_flight?;
    Some(CardDisplay {
        front: &snapshot.front,
        back: snapshot.back.as_deref(),
        example: snapshot.example.as_deref(),
        flipped: true,
        submitting: true,
    })
}

#[component]
pub fn ReviewView() -> Element {
    rsx! {
        RequireSession {
            ReviewBody {}
        }
    }
}

#[component]
fn ReviewBody() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let workflow = ctx.review_workflow();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<ReviewVm>);
    let in_flight = use_signal(|| None::<CardSnapshot>);
    let last_action = use_signal(|| None::<LastAction>);
    let mut completed = use_signal(|| false);

    let workflow_for_resource = workflow.clone();
    let resource = use_resource(move || {
        let workflow = workflow_for_resource.clone();
        let mut error = error;
        let mut vm = vm;
        let mut last_action = last_action;

        async move {
            last_action.set(Some(LastAction::StartSession));
            completed.set(false);
            let started = start_review(&workflow).await?;
            completed.set(started.is_empty_session());
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });

    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let workflow = workflow.clone();
        use_callback(move |intent: ReviewIntent| {
            let mut error = error;
            let mut vm = vm;
            let mut in_flight = in_flight;
            let mut last_action = last_action;
            let mut completed = completed;

            match intent {
                ReviewIntent::Flip => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.flip();
                    }
                }
                ReviewIntent::ToggleHelp => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.toggle_help();
                    }
                }
                ReviewIntent::Rate(rating) => {
                    let workflow = workflow.clone();
                    spawn(async move {
                        last_action.set(Some(LastAction::Rate(rating)));
                        let taken = {
                            let mut guard = vm.write();
                            guard.take()
                        };
                        let Some(mut vm_value) = taken else {
                            error.set(Some(ViewError::Unknown));
                            return;
                        };
                        in_flight.set(CardSnapshot::of(&vm_value));

                        let result = vm_value.submit(&workflow, rating).await;

                        // Always put the session back so the card stays on
                        // screen even after errors.
                        {
                            let mut guard = vm.write();
                            *guard = Some(vm_value);
                        }
                        in_flight.set(None);

                        match result {
                            Ok(ReviewOutcome::Completed) => {
                                error.set(None);
                                completed.set(true);
                            }
                            Ok(ReviewOutcome::Continue | ReviewOutcome::Ignored) => {
                                error.set(None);
                            }
                            Err(err) => {
                                error.set(Some(err));
                            }
                        }
                    });
                }
            }
        })
    };

    let retry_action = use_callback(move |()| match last_action() {
        Some(LastAction::StartSession) | None => {
            let mut resource = resource;
            resource.restart();
        }
        Some(LastAction::Rate(rating)) => {
            dispatch_intent.call(ReviewIntent::Rate(rating));
        }
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        if evt.data.key() == Key::Escape {
            evt.prevent_default();
            navigator.push(Route::Home {});
            return;
        }
        let phase = vm.read().as_ref().map(ReviewVm::phase);
        if let Some(intent) = intent_for_key(&evt.data.key(), evt.data.code(), phase) {
            evt.prevent_default();
            dispatch_intent.call(intent);
        }
    });

    let vm_guard = vm.read();
    let snapshot_guard = in_flight.read();
    let display = card_display(vm_guard.as_ref(), snapshot_guard.as_ref());
    let help_open = vm_guard.as_ref().is_some_and(ReviewVm::help_open);
    let progress_label = vm_guard
        .as_ref()
        .map(ReviewVm::progress_label)
        .or_else(|| {
            snapshot_guard
                .as_ref()
                .map(|snapshot| snapshot.progress.clone())
        })
        .unwrap_or_else(|| "0 / 0 Cards".to_string());
    let empty_session = vm_guard.as_ref().is_some_and(ReviewVm::is_empty_session);
    let accuracy_label = vm_guard
        .as_ref()
        .map_or_else(|| "0%".to_string(), |vm| format!("{}%", vm.accuracy_pct()));
    let summary_label = vm_guard.as_ref().map_or_else(String::new, |vm| {
        format!("{} of {} correct", vm.correct(), vm.reviewed())
    });
    let next_review_label = vm_guard
        .as_ref()
        .and_then(ReviewVm::last_next_review)
        .map(|at| format!("Next review: {}", at.format("%Y-%m-%d %H:%M")));

    rsx! {
        div { class: "page review-page", id: "review-root", tabindex: "0", onkeydown: on_key,
            header { class: "review-header",
                h2 { "Review" }
                span { class: "review-progress", "{progress_label}" }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| dispatch_intent.call(ReviewIntent::ToggleHelp),
                    "Shortcuts (?)"
                }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { class: "muted", "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "muted", "Loading due cards..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error-banner", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| retry_action.call(()),
                        "Retry"
                    }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(err) = *error.read() {
                        p { class: "error-banner", "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| retry_action.call(()),
                            "Retry"
                        }
                    }
                    if completed() {
                        div { class: "review-complete",
                            if empty_session {
                                h3 { "All caught up" }
                                p { class: "muted", "No cards due right now. Come back later." }
                            } else {
                                h3 { "Session complete" }
                                p { "Accuracy: {accuracy_label} ({summary_label})" }
                                if let Some(label) = next_review_label.as_deref() {
                                    p { class: "muted", "{label}" }
                                }
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| {
                                    let _ = navigator.push(Route::Home {});
                                },
                                "Back to Dashboard"
                            }
                        }
                    } else if let Some(card) = display {
                        div { class: "review-card",
                            div { class: "review-card__front", "{card.front}" }
                            if card.flipped {
                                div { class: "review-card__back",
                                    if let Some(back) = card.back {
                                        p { "{back}" }
                                    }
                                    if let Some(example) = card.example {
                                        p { class: "review-card__example", "{example}" }
                                    }
                                }
                                p { class: "review-remember", "How well did you remember?" }
                                div { class: "review-ratings",
                                    RatingButton { label: "Again", rating: ReviewRating::Again, disabled: card.submitting, on_intent: dispatch_intent }
                                    RatingButton { label: "Hard", rating: ReviewRating::Hard, disabled: card.submitting, on_intent: dispatch_intent }
                                    RatingButton { label: "Good", rating: ReviewRating::Good, disabled: card.submitting, on_intent: dispatch_intent }
                                }
                            } else {
                                button {
                                    class: "review-flip-btn",
                                    r#type: "button",
                                    onclick: move |_| dispatch_intent.call(ReviewIntent::Flip),
                                    "Show Answer"
                                }
                            }
                            if card.submitting {
                                p { class: "muted", "Saving..." }
                            }
                        }
                    } else {
                        p { class: "muted", "No card to show." }
                    }
                },
            }
            if help_open {
                ShortcutLegend {}
            }
        }
    }
}

#[component]
fn RatingButton(
    label: &'static str,
    rating: ReviewRating,
    disabled: bool,
    on_intent: EventHandler<ReviewIntent>,
) -> Element {
    let class = match rating {
        ReviewRating::Again => "review-rating review-rating--again",
        ReviewRating::Hard => "review-rating review-rating--hard",
        ReviewRating::Good => "review-rating review-rating--good",
    };
    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            disabled,
            onclick: move |_| on_intent.call(ReviewIntent::Rate(rating)),
            "{label}"
        }
    }
}

#[component]
fn ShortcutLegend() -> Element {
    rsx! {
        div { class: "shortcut-legend", role: "dialog", aria_label: "Keyboard shortcuts",
            h3 { "Keyboard shortcuts" }
            ul {
                li { kbd { "Space" } " Flip card" }
                li { kbd { "1" } " Again" }
                li { kbd { "2" } " Hard" }
                li { kbd { "3" } " Good" }
                li { kbd { "?" } " Toggle this help" }
                li { kbd { "Esc" } " Back to dashboard" }
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::model::{Card, CardId};
    use recall_core::time::fixed_now;
    use services::ReviewSession;

    fn vm_with_card() -> ReviewVm {
        let card = Card::new(
            CardId::new(1),
            "el gato",
            "the cat",
            Some("El gato duerme.".into()),
        )
        .unwrap();
        ReviewVm::new(ReviewSession::new(vec![card], fixed_now()))
    }

    #[test]
    fn unflipped_card_shows_front_only() {
        let vm = vm_with_card();
        let display = card_display(Some(&vm), None).unwrap();
        assert_eq!(display.front, "el gato");
        assert!(!display.flipped);
        assert!(!display.submitting);
    }

    #[test]
    fn flipped_card_shows_back_without_saving_indicator() {
        let mut vm = vm_with_card();
        vm.flip();
        let display = card_display(Some(&vm), None).unwrap();
        assert!(display.flipped);
        assert_eq!(display.back, Some("the cat"));
        assert_eq!(display.example, Some("El gato duerme."));
        assert!(!display.submitting);
    }

    #[test]
    fn snapshot_keeps_the_card_visible_while_submitting() {
        let mut vm = vm_with_card();
        vm.flip();
        let snapshot = CardSnapshot::of(&vm).unwrap();
        assert_eq!(snapshot.progress, "0 / 1 Cards");

        // The view-model is handed to the async submit; only the snapshot
        // remains.
        let display = card_display(None, Some(&snapshot)).unwrap();
        assert_eq!(display.front, "el gato");
        assert_eq!(display.back, Some("the cat"));
        assert!(display.flipped);
        assert!(display.submitting);
    }

    #[test]
    fn nothing_to_show_without_vm_or_snapshot() {
        assert!(card_display(None, None).is_none());
    }
}
