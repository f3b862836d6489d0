//! Main module for the clean-air classroom impact calculator using Yew.
//! Wires the presentation panel, input handling, and timer side-effects.

use clean_air_classrooms::panel::{Animation, DisplaySink, Panel, Slot};
use gloo_timers::callback::{Interval, Timeout};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod config;
mod utils;

use components::{render_assumptions, render_highlights, render_sources, stat_card};
use config::{ANIMATION_DURATION_MS, COUNTDOWN_TICK_MS, FRAME_INTERVAL_MS, MODEL};
use utils::{change_value, input_value, key_value, slot_text};

// ──────────────────────────────────────────────────────────────────────────────
// Shared display state

/// Slot texts shared between the panel and the component. Mutations are
/// followed by a version bump to trigger a re-render.
type SharedTexts = Rc<RefCell<HashMap<Slot, String>>>;

#[derive(Clone)]
struct TextStore {
    texts: SharedTexts,
}

impl DisplaySink for TextStore {
    fn set_text(&mut self, slot: Slot, text: String) {
        self.texts.borrow_mut().insert(slot, text);
    }
}

type SharedPanel = Rc<RefCell<Panel<TextStore>>>;

/// Helper to bump the display version and trigger a UI re-render
fn bump_version(version: &UseStateHandle<u64>) {
    version.set(version.wrapping_add(1));
}

// ──────────────────────────────────────────────────────────────────────────────
// Animation driver

/// Drive one eased numeric transition over the fixed duration with a
/// self-rescheduling timeout chain. Sequences are never cancelled: a
/// superseded one keeps writing until its own deadline, and the
/// later-started sequence wins each frame because both write the same
/// slot.
fn run_animation(panel: SharedPanel, anim: Animation, version: UseStateHandle<u64>) {
    let start = js_sys::Date::now();
    animation_frame(panel, anim, start, version);
}

fn animation_frame(panel: SharedPanel, anim: Animation, start: f64, version: UseStateHandle<u64>) {
    let t = ((js_sys::Date::now() - start) / ANIMATION_DURATION_MS).min(1.0);
    panel.borrow_mut().advance(&anim, t);
    bump_version(&version);
    if t < 1.0 {
        Timeout::new(FRAME_INTERVAL_MS, move || {
            animation_frame(panel, anim, start, version)
        })
        .forget();
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    // Missing or unparsable configuration disables the whole feature.
    let Some(model) = MODEL.as_ref() else {
        return html! {};
    };

    let texts: SharedTexts = use_mut_ref(HashMap::new);
    let panel: SharedPanel = {
        let model = model.clone();
        let texts = texts.clone();
        use_mut_ref(move || Panel::new(model, TextStore { texts }))
    };
    let display_version = use_state(|| 0u64);
    let students = use_state(|| model.controls.default_students);
    let students_text = use_state(|| model.controls.default_students.to_string());
    // Interval handle kept alive for the page's lifetime
    let tick_timer = use_state(|| None::<Interval>);

    // Normalize a raw student-count input, mirror it into both controls,
    // re-render all slots, and start the numeric transitions.
    let push_students = {
        let panel = panel.clone();
        let display_version = display_version.clone();
        let students = students.clone();
        let students_text = students_text.clone();
        Callback::from(move |raw: String| {
            let animations = panel.borrow_mut().push_value(&raw);
            let normalized = panel.borrow().students();
            students.set(normalized);
            students_text.set(normalized.to_string());
            bump_version(&display_version);
            for anim in animations {
                run_animation(panel.clone(), anim, display_version.clone());
            }
        })
    };

    // Startup: render headers, push the default value, start the 1-second
    // countdown tick.
    {
        let panel = panel.clone();
        let push_students = push_students.clone();
        let display_version = display_version.clone();
        let tick_timer = tick_timer.clone();
        let default_students = model.controls.default_students;
        use_effect_with((), move |_| {
            panel.borrow_mut().render_static();
            push_students.emit(default_students.to_string());

            let panel = panel.clone();
            let handle = Interval::new(COUNTDOWN_TICK_MS, move || {
                panel.borrow_mut().tick();
                bump_version(&display_version);
            });
            tick_timer.set(Some(handle));
        });
    }

    let range_oninput = {
        let push_students = push_students.clone();
        Callback::from(move |e: InputEvent| {
            push_students.emit(input_value(&e));
        })
    };

    let number_oninput = {
        let students_text = students_text.clone();
        Callback::from(move |e: InputEvent| {
            students_text.set(input_value(&e));
        })
    };

    let number_onchange = {
        let push_students = push_students.clone();
        Callback::from(move |e: Event| {
            push_students.emit(change_value(&e));
        })
    };

    let number_onkeydown = {
        let push_students = push_students.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                push_students.emit(key_value(&e));
            }
        })
    };

    // Ensure re-render whenever the panel writes new slot texts
    let _ = *display_version;
    let texts_now = texts.borrow().clone();
    let controls = &model.controls;

    html! {
        <div class="page">
            <header class="hero">
                <h1 class="headline">{ slot_text(&texts_now, Slot::Headline) }</h1>
                <p class="subhead">{ slot_text(&texts_now, Slot::Subhead) }</p>
            </header>

            <section class="enrollment-controls">
                <label for="students_input">{ "Students enrolled:" }</label>
                <div class="slider-with-value">
                    <input type="range"
                        min={controls.min_students.to_string()}
                        max={controls.max_students.to_string()}
                        step={controls.step.to_string()}
                        value={students.to_string()}
                        oninput={range_oninput}
                    />
                    <input type="number"
                        id="students_input"
                        min={controls.min_students.to_string()}
                        max={controls.max_students.to_string()}
                        step={controls.step.to_string()}
                        value={(*students_text).clone()}
                        oninput={number_oninput}
                        onchange={number_onchange}
                        onkeydown={number_onkeydown}
                    />
                </div>
            </section>

            <section class="stats-grid">
                { stat_card(
                    "Student absence days/year",
                    &texts_now,
                    Slot::StudentAbsencesBaseline,
                    Slot::StudentAbsencesFiltered,
                    Slot::StudentAbsencesDelta,
                ) }
                { stat_card(
                    "Teacher illness days/year",
                    &texts_now,
                    Slot::TeacherIllnessBaseline,
                    Slot::TeacherIllnessFiltered,
                    Slot::TeacherIllnessDelta,
                ) }
                { stat_card(
                    "Instruction hours lost vs. recovered",
                    &texts_now,
                    Slot::InstructionHoursBaseline,
                    Slot::InstructionHoursFiltered,
                    Slot::InstructionHoursDelta,
                ) }
                { stat_card(
                    "Discipline pressure index",
                    &texts_now,
                    Slot::BehaviorIndexBaseline,
                    Slot::BehaviorIndexFiltered,
                    Slot::BehaviorIndexDelta,
                ) }
            </section>

            <section class="test-score">
                <h2>{ "Same-day test score effect" }</h2>
                <p class="score-value">{ slot_text(&texts_now, Slot::TestScoreGain) }</p>
                <p class="score-narrative">{ slot_text(&texts_now, Slot::TestScoreNarrative) }</p>
            </section>

            { render_highlights(&texts_now) }

            <section class="countdown-panel">
                <h2>{ "Next preventable absence in" }</h2>
                <div class="countdown">{ slot_text(&texts_now, Slot::Countdown) }</div>
                <p class="countdown-note">{ slot_text(&texts_now, Slot::CountdownNote) }</p>
            </section>

            { render_assumptions(model) }
            { render_sources(model) }
        </div>
    }
}

/// Entry point: installs the panic hook and starts the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
