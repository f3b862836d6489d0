//! Small helpers shared by the UI layer.

use clean_air_classrooms::panel::Slot;
use std::collections::HashMap;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Current value of the input element behind an `input` event.
pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

/// Current value of the input element behind a `change` event.
pub fn change_value(e: &Event) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

/// Current value of the input element behind a keyboard event.
pub fn key_value(e: &KeyboardEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

/// Text currently written to a display slot, empty before first render.
pub fn slot_text(texts: &HashMap<Slot, String>, slot: Slot) -> String {
    texts.get(&slot).cloned().unwrap_or_default()
}
