//! Pure Yew view helpers for the impact calculator UI.
//!
//! Stateless renderers that build HTML from the model configuration and
//! the current slot texts. Yew's virtual DOM rebuilds these fully on each
//! render, so re-invoking them is idempotent.

use clean_air_classrooms::panel::Slot;
use clean_air_classrooms::ModelConfig;
use std::collections::HashMap;
use yew::prelude::*;

use crate::utils::slot_text;

/// One before/after stat card with its delta line.
pub fn stat_card(
    title: &str,
    texts: &HashMap<Slot, String>,
    baseline: Slot,
    filtered: Slot,
    delta: Slot,
) -> Html {
    html! {
        <div class="stat-card">
            <h3>{ title }</h3>
            <div class="stat-compare">
                <div class="stat-side">
                    <span class="stat-label">{ "No purifiers" }</span>
                    <span class="stat-value">{ slot_text(texts, baseline) }</span>
                </div>
                <div class="stat-side">
                    <span class="stat-label">{ "With purifiers" }</span>
                    <span class="stat-value">{ slot_text(texts, filtered) }</span>
                </div>
            </div>
            <p class="stat-delta">{ slot_text(texts, delta) }</p>
        </div>
    }
}

/// The four narrative highlight lines below the stat cards.
pub fn render_highlights(texts: &HashMap<Slot, String>) -> Html {
    let lines = [
        Slot::AsthmaStudents,
        Slot::ChronicAbsenceStudents,
        Slot::SubCoverage,
        Slot::LearningDaysSaved,
    ];
    html! {
        <section class="highlights">
            { lines.iter().map(|&slot| {
                html! { <p class="highlight-line">{ slot_text(texts, slot) }</p> }
            }).collect::<Html>() }
        </section>
    }
}

/// Assumption rows plus model notes, rebuilt in full from the config.
pub fn render_assumptions(model: &ModelConfig) -> Html {
    html! {
        <section class="assumptions">
            <h2>{ "Assumptions" }</h2>
            <div class="assumptions-table">
                { model.assumption_rows.iter().map(|row| {
                    html! {
                        <div class="assumption-row">
                            <strong>{ &row.label }</strong>
                            <span>{ &row.value }</span>
                            <span>{ format!("Source {} · {} confidence", row.source, row.confidence) }</span>
                        </div>
                    }
                }).collect::<Html>() }
                { model.model_notes.iter().map(|note| {
                    html! {
                        <div class="assumption-row">
                            <strong>{ "Model note" }</strong>
                            <span>{ note }</span>
                            <span></span>
                        </div>
                    }
                }).collect::<Html>() }
            </div>
        </section>
    }
}

/// Ordered source listing with links and relevance notes.
pub fn render_sources(model: &ModelConfig) -> Html {
    html! {
        <section class="sources">
            <h2>{ "Sources" }</h2>
            <ol class="sources-list">
                { model.sources.iter().map(|source| {
                    html! {
                        <li>
                            <strong>{ &source.id }</strong>
                            { " · " }
                            <a href={source.url.clone()} target="_blank" rel="noreferrer">
                                { &source.title }
                            </a>
                            { format!(" ({}, {}). {}", source.publisher, source.year, source.why_it_matters) }
                        </li>
                    }
                }).collect::<Html>() }
            </ol>
        </section>
    }
}
