use log::warn;
use serde::Deserialize;
use std::fmt;

/// Fixed bounds applied to derived quantities.
pub mod limits {
    /// Cap on the modeled teacher illness-absence reduction.
    pub const TEACHER_ILLNESS_REDUCTION_CAP: f64 = 0.6;
    /// Cap on the modeled behavior-referral reduction.
    pub const BEHAVIOR_REDUCTION_CAP: f64 = 0.7;
    /// Fixed baseline for the behavior-pressure index.
    pub const BEHAVIOR_PRESSURE_BASELINE: f64 = 100.0;
    /// Shortest allowed countdown cycle, in seconds.
    pub const MIN_CYCLE_SECONDS: f64 = 5.0;
    /// Longest allowed countdown cycle (12 hours), in seconds.
    pub const MAX_CYCLE_SECONDS: f64 = 43_200.0;
    /// Floor for the avoidable-absences rate when deriving the cycle,
    /// keeps the division away from zero.
    pub const MIN_AVOIDABLE_PER_DAY: f64 = 0.01;
}

// Custom error type for configuration loading
#[derive(Debug)]
pub enum ModelError {
    ConfigParse(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ConfigParse(detail) => {
                write!(f, "Failed to parse model configuration: {}", detail)
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Named rates and ratios driving the model. Read-only for the lifetime
/// of the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub student_teacher_ratio: f64,
    pub school_days_per_year: f64,
    pub student_attendance_rate: f64,
    pub purifier_student_absence_reduction_pct: f64,
    pub baseline_teacher_sick_days_per_year: f64,
    pub assumed_baseline_pm25_ug_m3: f64,
    pub purifier_pm25_reduction_pct: f64,
    #[serde(rename = "teacherIllnessAbsenceIncreasePer10UgPm25")]
    pub teacher_illness_absence_increase_per_10ug_pm25: f64,
    #[serde(rename = "behaviorReferralIncreasePer10UgPm25")]
    pub behavior_referral_increase_per_10ug_pm25: f64,
    pub school_day_hours: f64,
    pub same_day_test_score_gain_z: f64,
    pub child_asthma_prevalence_rate: f64,
    pub health_related_chronic_absence_rate: f64,
}

/// Valid input domain for the student-count control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub min_students: u32,
    pub max_students: u32,
    pub step: u32,
    pub default_students: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub school_name: String,
    pub admin_name: String,
    pub role: String,
}

/// One displayed assumption with its provenance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionRow {
    pub label: String,
    pub value: String,
    pub source: String,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: String,
    pub url: String,
    pub title: String,
    pub publisher: String,
    pub year: u32,
    pub why_it_matters: String,
}

/// Top-level configuration object. Supplied externally (embedded JSON);
/// the application is a no-op without it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub assumptions: Assumptions,
    pub controls: Controls,
    pub profile: Profile,
    pub assumption_rows: Vec<AssumptionRow>,
    pub model_notes: Vec<String>,
    pub sources: Vec<SourceRef>,
}

impl ModelConfig {
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        serde_json::from_str(raw).map_err(|e| ModelError::ConfigParse(e.to_string()))
    }
}

/// Derived statistics for one student-count input. Recreated on every
/// change, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsBundle {
    pub teachers: f64,
    pub student_absences_baseline: f64,
    pub student_absences_filtered: f64,
    pub student_absences_avoided: f64,
    pub teacher_illness_baseline: f64,
    pub teacher_illness_filtered: f64,
    pub teacher_illness_avoided: f64,
    pub teacher_illness_reduction_pct: f64,
    pub behavior_pressure_baseline: f64,
    pub behavior_pressure_filtered: f64,
    pub behavior_reduction_pct: f64,
    pub instruction_hours_lost: f64,
    pub instruction_hours_recovered: f64,
    pub percentile_gain: f64,
    pub asthma_students: f64,
    pub chronic_absence_students: f64,
    pub avoidable_absences_per_day: f64,
}

/// Error function via the Abramowitz–Stegun rational approximation
/// (max error ~1.5e-7). Sign of the input is preserved.
pub fn erf(x: f64) -> f64 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * abs_x);
    let y = 1.0
        - ((((1.061405429 * t - 1.453152027) * t + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-abs_x * abs_x).exp();
    sign * y
}

/// Standard normal cumulative distribution.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Interpolation curve for animated numerals: `1 - (1-t)^3`.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Maps a student count and the static assumptions to the full bundle of
/// derived statistics. Pure and total: same inputs always give the same
/// outputs, no failure path for any finite student count.
pub fn compute(students: u32, a: &Assumptions) -> MetricsBundle {
    let students = students as f64;

    let teachers = students / a.student_teacher_ratio;

    let student_absences_baseline =
        students * a.school_days_per_year * (1.0 - a.student_attendance_rate);
    let student_absences_filtered =
        student_absences_baseline * (1.0 - a.purifier_student_absence_reduction_pct);
    let student_absences_avoided = student_absences_baseline - student_absences_filtered;

    let teacher_illness_baseline = teachers * a.baseline_teacher_sick_days_per_year;

    let pm_drop_ug = a.assumed_baseline_pm25_ug_m3 * a.purifier_pm25_reduction_pct;
    let teacher_illness_reduction_pct = (a.teacher_illness_absence_increase_per_10ug_pm25
        * (pm_drop_ug / 10.0))
        .clamp(0.0, limits::TEACHER_ILLNESS_REDUCTION_CAP);
    let teacher_illness_filtered = teacher_illness_baseline * (1.0 - teacher_illness_reduction_pct);
    let teacher_illness_avoided = teacher_illness_baseline - teacher_illness_filtered;

    let behavior_pressure_baseline = limits::BEHAVIOR_PRESSURE_BASELINE;
    let behavior_reduction_pct = (a.behavior_referral_increase_per_10ug_pm25
        * (pm_drop_ug / 10.0))
        .clamp(0.0, limits::BEHAVIOR_REDUCTION_CAP);
    let behavior_pressure_filtered = behavior_pressure_baseline * (1.0 - behavior_reduction_pct);

    let instruction_hours_lost = student_absences_baseline * a.school_day_hours;
    let instruction_hours_recovered = student_absences_avoided * a.school_day_hours;

    let percentile_gain = (normal_cdf(a.same_day_test_score_gain_z) - 0.5) * 100.0;

    let asthma_students = students * a.child_asthma_prevalence_rate;
    let chronic_absence_students = students * a.health_related_chronic_absence_rate;

    let avoidable_absences_per_day = student_absences_avoided / a.school_days_per_year;

    MetricsBundle {
        teachers,
        student_absences_baseline,
        student_absences_filtered,
        student_absences_avoided,
        teacher_illness_baseline,
        teacher_illness_filtered,
        teacher_illness_avoided,
        teacher_illness_reduction_pct,
        behavior_pressure_baseline,
        behavior_pressure_filtered,
        behavior_reduction_pct,
        instruction_hours_lost,
        instruction_hours_recovered,
        percentile_gain,
        asthma_students,
        chronic_absence_students,
        avoidable_absences_per_day,
    }
}

/// Parse a raw student-count input, falling back to the configured
/// default when it is not a finite number, then round and clamp into
/// `[min_students, max_students]`. Idempotent on its own output.
pub fn normalize_students(raw: &str, controls: &Controls) -> u32 {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or_else(|| {
            warn!(
                "Student count input '{}' is not a number, using default {}",
                raw, controls.default_students
            );
            controls.default_students as f64
        });

    parsed
        .round()
        .clamp(controls.min_students as f64, controls.max_students as f64) as u32
}

/// Seconds between countdown resets at the given avoidable-absence rate,
/// clamped away from degenerate (zero-length or unbounded) timers.
pub fn cycle_seconds(school_day_hours: f64, avoidable_absences_per_day: f64) -> f64 {
    (school_day_hours * 3600.0 / avoidable_absences_per_day.max(limits::MIN_AVOIDABLE_PER_DAY))
        .clamp(limits::MIN_CYCLE_SECONDS, limits::MAX_CYCLE_SECONDS)
}

/// Free-running countdown state: remaining seconds and the full cycle
/// length it wraps back to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Countdown {
    remaining: f64,
    cycle: f64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh cycle of the given length.
    pub fn reset(&mut self, cycle: f64) {
        self.cycle = cycle;
        self.remaining = cycle;
    }

    /// Advance one second and return the value to display. Wraps back to
    /// the full cycle length when the counter runs out; never stops.
    pub fn tick(&mut self) -> f64 {
        if self.remaining <= 0.0 {
            self.remaining = self.cycle;
        }
        let shown = self.remaining;
        self.remaining -= 1.0;
        shown
    }

    pub fn cycle(&self) -> f64 {
        self.cycle
    }
}

/// Format a value as a rounded integer with thousands separators.
pub fn format_int(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && i % 3 == lead % 3 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a ratio as a percentage with the given number of fraction digits.
pub fn format_pct(value: f64, digits: usize) -> String {
    format!("{:.prec$}%", value * 100.0, prec = digits)
}

pub fn format_hours(value: f64) -> String {
    format!("{} hours", format_int(value))
}

/// Format seconds as `HH:MM:SS`, omitting the hours field when zero.
pub fn format_clock(total_seconds: f64) -> String {
    let safe = total_seconds.max(0.0).floor() as u64;
    let h = safe / 3600;
    let m = (safe % 3600) / 60;
    let s = safe % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

pub mod panel;

#[cfg(test)]
mod tests {
    use super::*;

    fn assumptions() -> Assumptions {
        Assumptions {
            student_teacher_ratio: 20.0,
            school_days_per_year: 180.0,
            student_attendance_rate: 0.95,
            purifier_student_absence_reduction_pct: 0.3,
            baseline_teacher_sick_days_per_year: 9.0,
            assumed_baseline_pm25_ug_m3: 12.0,
            purifier_pm25_reduction_pct: 0.5,
            teacher_illness_absence_increase_per_10ug_pm25: 0.25,
            behavior_referral_increase_per_10ug_pm25: 0.17,
            school_day_hours: 6.5,
            same_day_test_score_gain_z: 0.20,
            child_asthma_prevalence_rate: 0.08,
            health_related_chronic_absence_rate: 0.12,
        }
    }

    fn controls() -> Controls {
        Controls {
            min_students: 50,
            max_students: 5000,
            step: 10,
            default_students: 500,
        }
    }

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() < eps,
            "expected {} within {} of {}",
            actual,
            eps,
            expected
        );
    }

    #[test]
    fn worked_example_from_fixed_assumptions() {
        let m = compute(500, &assumptions());
        assert_close(m.teachers, 25.0, 1e-9);
        assert_close(m.student_absences_baseline, 4500.0, 1e-9);
        assert_close(m.student_absences_filtered, 3150.0, 1e-9);
        assert_close(m.student_absences_avoided, 1350.0, 1e-9);
        assert_close(m.avoidable_absences_per_day, 7.5, 1e-9);
    }

    #[test]
    fn zero_students_yields_zero_counts() {
        let m = compute(0, &assumptions());
        assert_eq!(m.teachers, 0.0);
        assert_eq!(m.student_absences_baseline, 0.0);
        assert_eq!(m.student_absences_avoided, 0.0);
        assert_eq!(m.teacher_illness_baseline, 0.0);
        assert_eq!(m.instruction_hours_lost, 0.0);
        assert_eq!(m.asthma_students, 0.0);
        // Rates are independent of enrollment and stay finite.
        assert!(m.teacher_illness_reduction_pct.is_finite());
        assert!(m.behavior_reduction_pct.is_finite());
    }

    #[test]
    fn filtered_never_exceeds_baseline() {
        let a = assumptions();
        for students in [50u32, 137, 500, 1234, 5000] {
            let m = compute(students, &a);
            assert!(m.student_absences_filtered <= m.student_absences_baseline);
            assert!(m.teacher_illness_filtered <= m.teacher_illness_baseline);
            assert!(m.behavior_pressure_filtered <= 100.0);
        }
    }

    #[test]
    fn reduction_percentages_stay_clamped_for_extreme_sensitivities() {
        let mut a = assumptions();
        a.teacher_illness_absence_increase_per_10ug_pm25 = 50.0;
        a.behavior_referral_increase_per_10ug_pm25 = -3.0;
        let m = compute(800, &a);
        assert_eq!(
            m.teacher_illness_reduction_pct,
            limits::TEACHER_ILLNESS_REDUCTION_CAP
        );
        assert_eq!(m.behavior_reduction_pct, 0.0);

        a.teacher_illness_absence_increase_per_10ug_pm25 = -9.0;
        a.behavior_referral_increase_per_10ug_pm25 = 100.0;
        let m = compute(800, &a);
        assert_eq!(m.teacher_illness_reduction_pct, 0.0);
        assert_eq!(m.behavior_reduction_pct, limits::BEHAVIOR_REDUCTION_CAP);
    }

    #[test]
    fn normal_cdf_basics() {
        assert_close(normal_cdf(0.0), 0.5, 1e-7);
        assert_close(normal_cdf(1.96), 0.975, 1e-3);
        // Monotone non-decreasing over a coarse sweep.
        let mut prev = normal_cdf(-5.0);
        let mut z = -5.0;
        while z <= 5.0 {
            let cur = normal_cdf(z);
            assert!(cur >= prev, "normal_cdf not monotone at z = {}", z);
            prev = cur;
            z += 0.125;
        }
    }

    #[test]
    fn percentile_gain_is_sign_symmetric() {
        let a = assumptions();
        for z in [0.1, 0.2, 0.5, 1.3] {
            let mut pos = a.clone();
            pos.same_day_test_score_gain_z = z;
            let mut neg = a.clone();
            neg.same_day_test_score_gain_z = -z;
            let gain_pos = compute(500, &pos).percentile_gain;
            let gain_neg = compute(500, &neg).percentile_gain;
            assert_close(gain_pos, -gain_neg, 1e-6);
        }
    }

    #[test]
    fn percentile_gain_for_reference_effect_size() {
        let m = compute(500, &assumptions());
        assert_close(m.percentile_gain, 7.93, 0.05);
    }

    #[test]
    fn normalize_clamps_and_defaults() {
        let c = controls();
        assert_eq!(normalize_students("-950", &c), 50);
        assert_eq!(normalize_students("6000", &c), 5000);
        assert_eq!(normalize_students("banana", &c), 500);
        assert_eq!(normalize_students("", &c), 500);
        assert_eq!(normalize_students("  1234.6 ", &c), 1235);
    }

    #[test]
    fn normalize_is_idempotent() {
        let c = controls();
        for raw in ["-42", "72.4", "5000000", "abc"] {
            let once = normalize_students(raw, &c);
            let twice = normalize_students(&once.to_string(), &c);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn cycle_length_stays_in_bounds() {
        assert_eq!(cycle_seconds(6.5, 0.0), limits::MAX_CYCLE_SECONDS);
        assert_eq!(cycle_seconds(6.5, 1.0e9), limits::MIN_CYCLE_SECONDS);
        let mid = cycle_seconds(6.5, 7.5);
        assert!(mid >= limits::MIN_CYCLE_SECONDS && mid <= limits::MAX_CYCLE_SECONDS);
        assert_close(mid, 6.5 * 3600.0 / 7.5, 1e-9);
    }

    #[test]
    fn countdown_wraps_to_cycle_length() {
        let mut cd = Countdown::new();
        cd.reset(3.0);
        assert_eq!(cd.tick(), 3.0);
        assert_eq!(cd.tick(), 2.0);
        assert_eq!(cd.tick(), 1.0);
        // Counter hit zero, wraps back to the full cycle.
        assert_eq!(cd.tick(), 3.0);
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(format_int(1350.4), "1,350");
        assert_eq!(format_int(999.0), "999");
        assert_eq!(format_int(1_234_567.0), "1,234,567");
        assert_eq!(format_int(-4500.0), "-4,500");
        assert_eq!(format_pct(0.3, 1), "30.0%");
        assert_eq!(format_pct(0.1234, 2), "12.34%");
        assert_eq!(format_hours(29250.0), "29,250 hours");
        assert_eq!(format_clock(59.0), "00:59");
        assert_eq!(format_clock(3661.0), "01:01:01");
        assert_eq!(format_clock(-5.0), "00:00");
    }

    #[test]
    fn ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn config_parses_from_embedded_json() {
        let cfg = ModelConfig::from_json(include_str!("model.json")).unwrap();
        assert!(cfg.controls.min_students < cfg.controls.max_students);
        assert!((cfg.controls.min_students..=cfg.controls.max_students)
            .contains(&cfg.controls.default_students));
        assert!(!cfg.assumption_rows.is_empty());
        assert!(!cfg.sources.is_empty());
        assert!(cfg.assumptions.student_teacher_ratio > 0.0);
        assert!(cfg.assumptions.school_days_per_year > 0.0);
    }

    #[test]
    fn config_parse_error_is_reported() {
        let err = ModelConfig::from_json("{ not json }").unwrap_err();
        assert!(err.to_string().contains("model configuration"));
    }
}
