//! Presentation controller for the impact calculator.
//!
//! Everything here is DOM-free: the panel talks to the page through the
//! [`DisplaySink`] trait and hands animation plans back to the caller,
//! which drives the frames. This keeps the controller and the easing
//! logic testable without a rendering surface.

use crate::{
    compute, cycle_seconds, ease_out_cubic, format_clock, format_hours, format_int, format_pct,
    normalize_students, Countdown, ModelConfig,
};
use log::debug;
use std::collections::HashMap;

/// Named display slots written by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Headline,
    Subhead,
    StudentAbsencesBaseline,
    StudentAbsencesFiltered,
    StudentAbsencesDelta,
    TeacherIllnessBaseline,
    TeacherIllnessFiltered,
    TeacherIllnessDelta,
    InstructionHoursBaseline,
    InstructionHoursFiltered,
    InstructionHoursDelta,
    BehaviorIndexBaseline,
    BehaviorIndexFiltered,
    BehaviorIndexDelta,
    TestScoreGain,
    TestScoreNarrative,
    AsthmaStudents,
    ChronicAbsenceStudents,
    SubCoverage,
    LearningDaysSaved,
    Countdown,
    CountdownNote,
}

/// How an animated slot renders its numeric value, both mid-flight and
/// at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Thousands-separated integer.
    Count,
    /// Thousands-separated integer with an "hours" suffix.
    Hours,
    /// One-decimal index value.
    Index,
}

impl NumberStyle {
    pub fn format(&self, value: f64) -> String {
        match self {
            NumberStyle::Count => format_int(value),
            NumberStyle::Hours => format_hours(value),
            NumberStyle::Index => format!("{:.1} index", value),
        }
    }
}

/// Rendering seam between the panel and the page.
pub trait DisplaySink {
    fn set_text(&mut self, slot: Slot, text: String);
}

/// Plan for one eased numeric transition. The caller schedules the
/// frames and reports progress back through [`Panel::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub slot: Slot,
    pub style: NumberStyle,
    pub from: f64,
    pub to: f64,
}

/// Owns the display state: the sink, the per-slot last-displayed values
/// used for animation continuity, the countdown, and the current
/// normalized student count.
pub struct Panel<S: DisplaySink> {
    config: ModelConfig,
    sink: S,
    prev: HashMap<Slot, f64>,
    countdown: Countdown,
    students: u32,
}

impl<S: DisplaySink> Panel<S> {
    pub fn new(config: ModelConfig, sink: S) -> Self {
        let students = config.controls.default_students;
        Self {
            config,
            sink,
            prev: HashMap::new(),
            countdown: Countdown::new(),
            students,
        }
    }

    pub fn students(&self) -> u32 {
        self.students
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Write the header strings and the static test-score narrative.
    /// Idempotent, called once at startup.
    pub fn render_static(&mut self) {
        let profile = &self.config.profile;
        self.sink.set_text(
            Slot::Headline,
            format!(
                "How quickly cleaner classroom air changes outcomes at {}",
                profile.school_name
            ),
        );
        self.sink.set_text(
            Slot::Subhead,
            format!(
                "Prepared for {}, {}. This version compares current conditions vs. \
                 district-wide classroom purification using research-backed, editable assumptions.",
                profile.admin_name, profile.role
            ),
        );
        self.sink.set_text(
            Slot::TestScoreNarrative,
            "Randomized purifier testing found measurable same-day score gains. This should be \
             treated as directional evidence for K-12 classrooms."
                .to_string(),
        );
    }

    /// Normalize a raw student-count input, recompute the metrics, write
    /// every static slot, reset the countdown cycle, and return the
    /// animation plans for the numeric displays.
    ///
    /// Each plan starts from the value last written to its slot, so a
    /// push that lands mid-animation chains from whatever is currently
    /// on screen.
    pub fn push_value(&mut self, raw: &str) -> Vec<Animation> {
        let students = normalize_students(raw, &self.config.controls);
        self.students = students;

        let a = &self.config.assumptions;
        let m = compute(students, a);
        debug!(
            "Recomputed metrics for {} students: {:.1} avoidable absence-days/year",
            students, m.student_absences_avoided
        );

        self.sink.set_text(
            Slot::StudentAbsencesDelta,
            format!(
                "{} fewer days/year ({})",
                format_int(m.student_absences_avoided),
                format_pct(a.purifier_student_absence_reduction_pct, 1)
            ),
        );
        self.sink.set_text(
            Slot::TeacherIllnessDelta,
            format!(
                "{} fewer days/year (modeled {})",
                format_int(m.teacher_illness_avoided),
                format_pct(m.teacher_illness_reduction_pct, 1)
            ),
        );
        self.sink.set_text(
            Slot::InstructionHoursDelta,
            format!(
                "{} student-days returned to classrooms",
                format_int(m.student_absences_avoided)
            ),
        );
        self.sink.set_text(
            Slot::BehaviorIndexDelta,
            format!(
                "{} lower modeled discipline pressure",
                format_pct(m.behavior_reduction_pct, 1)
            ),
        );
        self.sink.set_text(
            Slot::TestScoreGain,
            format!(
                "+{:.2} SD (about +{:.1} percentile points)",
                a.same_day_test_score_gain_z, m.percentile_gain
            ),
        );
        self.sink.set_text(
            Slot::AsthmaStudents,
            format!(
                "{} students may have asthma-related vulnerability to particulate exposure \
                 (national-rate estimate).",
                format_int(m.asthma_students)
            ),
        );
        self.sink.set_text(
            Slot::ChronicAbsenceStudents,
            format!(
                "{} students may face health-related chronic absenteeism risk without better \
                 baseline indoor air quality.",
                format_int(m.chronic_absence_students)
            ),
        );
        self.sink.set_text(
            Slot::SubCoverage,
            format!(
                "{} fewer teacher illness-absence days can reduce substitute coverage disruption.",
                format_int(m.teacher_illness_avoided)
            ),
        );
        self.sink.set_text(
            Slot::LearningDaysSaved,
            format!(
                "{} student learning days/year protected in the filtration scenario.",
                format_int(m.student_absences_avoided)
            ),
        );

        let cycle = cycle_seconds(a.school_day_hours, m.avoidable_absences_per_day);
        self.countdown.reset(cycle);
        self.sink.set_text(
            Slot::CountdownNote,
            format!(
                "At this enrollment, the model expects roughly {:.1} preventable absence-days \
                 every school day.",
                m.avoidable_absences_per_day
            ),
        );

        let mut animations = Vec::with_capacity(8);
        let mut animate = |slot: Slot, style: NumberStyle, to: f64| {
            let from = *self.prev.entry(slot).or_insert(to);
            animations.push(Animation {
                slot,
                style,
                from,
                to,
            });
        };
        animate(
            Slot::StudentAbsencesBaseline,
            NumberStyle::Count,
            m.student_absences_baseline,
        );
        animate(
            Slot::StudentAbsencesFiltered,
            NumberStyle::Count,
            m.student_absences_filtered,
        );
        animate(
            Slot::TeacherIllnessBaseline,
            NumberStyle::Count,
            m.teacher_illness_baseline,
        );
        animate(
            Slot::TeacherIllnessFiltered,
            NumberStyle::Count,
            m.teacher_illness_filtered,
        );
        animate(
            Slot::InstructionHoursBaseline,
            NumberStyle::Hours,
            m.instruction_hours_lost,
        );
        animate(
            Slot::InstructionHoursFiltered,
            NumberStyle::Hours,
            m.instruction_hours_recovered,
        );
        animate(
            Slot::BehaviorIndexBaseline,
            NumberStyle::Index,
            m.behavior_pressure_baseline,
        );
        animate(
            Slot::BehaviorIndexFiltered,
            NumberStyle::Index,
            m.behavior_pressure_filtered,
        );
        animations
    }

    /// Apply one animation frame at progress `t` in `[0, 1]`. Writes the
    /// eased value and records it as the slot's last-displayed value, so
    /// a later push chains from the interpolated state. At `t >= 1` the
    /// exact target is written.
    pub fn advance(&mut self, anim: &Animation, t: f64) {
        let t = t.clamp(0.0, 1.0);
        let value = if t >= 1.0 {
            anim.to
        } else {
            anim.from + (anim.to - anim.from) * ease_out_cubic(t)
        };
        self.sink.set_text(anim.slot, anim.style.format(value));
        self.prev.insert(anim.slot, value);
    }

    /// Countdown second: wrap at zero and redisplay.
    pub fn tick(&mut self) {
        let shown = self.countdown.tick();
        self.sink.set_text(Slot::Countdown, format_clock(shown));
    }

    pub fn countdown_cycle(&self) -> f64 {
        self.countdown.cycle()
    }
}
