//! Bookable time-slot computation from hospital operating hours.
//!
//! The pipeline is a pure function of its arguments: generation walks the
//! operating window in fixed steps, a fallback list substitutes for missing
//! or unusable hours, and elapsed slots are dropped when the target date is
//! the current date. The current instant is injected by the caller, so the
//! whole module is deterministic and safe to run on every redraw.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::OperatingHours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Length of a bookable interval in minutes. Always positive.
pub struct SlotDuration(u32);

impl SlotDuration {
    /// Interval length used by the platform unless configured otherwise.
    pub const DEFAULT: Self = Self(60);

    /// Construct a duration; `None` when `minutes` is zero.
    #[must_use]
    pub fn new(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    /// Interval length in minutes.
    #[must_use]
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Default for SlotDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
/// Start of a bookable interval of [`SlotDuration`] length.
///
/// A slot has no identity beyond its value; two slots with the same start
/// time are interchangeable.
pub struct TimeSlot(pub NaiveTime);

impl TimeSlot {
    /// Wall-clock start time of the slot.
    #[must_use]
    pub fn start(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format("%H:%M"))
    }
}

#[derive(Debug, Clone)]
/// Slot length plus the fallback sequence used when operating hours are
/// missing, invalid, or too short to fit a single interval.
pub struct SlotPolicy {
    step: SlotDuration,
    fallback: Vec<TimeSlot>,
}

impl SlotPolicy {
    /// Build a policy from a step and a fallback list.
    ///
    /// Returns `None` when `fallback` is empty: the policy guarantees that
    /// slot computation always has a non-empty default to hand out.
    #[must_use]
    pub fn new(step: SlotDuration, fallback: Vec<TimeSlot>) -> Option<Self> {
        (!fallback.is_empty()).then(|| Self { step, fallback })
    }

    /// Interval length between consecutive slots.
    #[must_use]
    pub fn step(&self) -> SlotDuration {
        self.step
    }

    /// Slots handed out when real operating hours are unusable.
    #[must_use]
    pub fn fallback(&self) -> &[TimeSlot] {
        &self.fallback
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            step: SlotDuration::DEFAULT,
            fallback: default_fallback(),
        }
    }
}

// The 11:00 → 19:00 gap is not a generation artifact; it matches the
// platform's historic default list.
fn default_fallback() -> Vec<TimeSlot> {
    [(9, 0), (10, 0), (11, 0), (19, 0)]
        .into_iter()
        .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .map(TimeSlot)
        .collect()
}

/// Ordered, gap-free candidate slot starts between opening and closing time.
///
/// A slot is emitted only when the whole interval fits before `closes`, so a
/// window shorter than `step` yields an empty list, as does an invalid window
/// (`opens >= closes`). The fallback policy is applied by
/// [`available_slots`], not here.
#[must_use]
pub fn generate_slots(hours: OperatingHours, step: SlotDuration) -> Vec<TimeSlot> {
    if !hours.is_valid() {
        return Vec::new();
    }

    let step_duration = Duration::minutes(i64::from(step.minutes()));
    let mut slots = Vec::new();
    let mut current = hours.opens;

    loop {
        let (end, wrapped_seconds) = current.overflowing_add_signed(step_duration);
        // A wrap past midnight cannot end inside the window.
        if wrapped_seconds != 0 || end > hours.closes {
            break;
        }
        slots.push(TimeSlot(current));
        current = end;
    }

    slots
}

/// Drop slots whose start has already elapsed.
///
/// Filtering only applies when `target` is the date of `now`; slots on any
/// other date pass through untouched. A slot starting exactly at the current
/// time counts as elapsed. An empty result is valid and means "no more
/// availability today".
#[must_use]
pub fn filter_elapsed(
    slots: Vec<TimeSlot>,
    target: NaiveDate,
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    if target != now.date() {
        return slots;
    }

    let time_of_day = now.time();
    slots
        .into_iter()
        .filter(|slot| slot.start() > time_of_day)
        .collect()
}

/// Full-day slot sequence for an operating window.
///
/// Missing operating hours, an invalid window, and a window too short to fit
/// a single interval all substitute the policy fallback, so the result is
/// never empty. Date-independent: the same window yields the same sequence
/// every day.
#[must_use]
pub fn day_slots(hours: Option<OperatingHours>, policy: &SlotPolicy) -> Vec<TimeSlot> {
    let generated = match hours {
        Some(window) => generate_slots(window, policy.step()),
        None => Vec::new(),
    };

    if generated.is_empty() {
        policy.fallback().to_vec()
    } else {
        generated
    }
}

/// Bookable slots for a hospital on `target`, as presented to the user.
///
/// Runs [`day_slots`] and then drops elapsed entries when `target` is the
/// current date. Never fails: unusable upstream data degrades to the
/// fallback list instead of surfacing an error, since actual booking
/// correctness is the backend's responsibility.
#[must_use]
pub fn available_slots(
    hours: Option<OperatingHours>,
    target: NaiveDate,
    now: NaiveDateTime,
    policy: &SlotPolicy,
) -> Vec<TimeSlot> {
    filter_elapsed(day_slots(hours, policy), target, now)
}

/// Normalize an upstream wall-time value to a [`NaiveTime`].
///
/// The directory backend is inconsistent about formats: plain `"HH:MM"`,
/// `"HH:MM:SS"`, and full ISO-8601 timestamps (with or without an offset)
/// all occur. Timestamps keep their written wall-clock time. Anything else
/// is treated as missing.
#[must_use]
pub fn parse_wall_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S") {
        return Some(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return Some(time);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.time());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|stamp| stamp.time())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{
        SlotDuration, SlotPolicy, TimeSlot, available_slots, day_slots, filter_elapsed,
        generate_slots, parse_wall_time,
    };
    use crate::model::OperatingHours;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(year, month, day).and_time(time(hour, minute))
    }

    fn step(minutes: u32) -> SlotDuration {
        SlotDuration::new(minutes).expect("positive step")
    }

    fn render(slots: &[TimeSlot]) -> Vec<String> {
        slots.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn generates_full_business_day() {
        let hours = OperatingHours::new(time(8, 0), time(18, 0));
        let slots = generate_slots(hours, step(60));

        assert_eq!(
            render(&slots),
            vec![
                "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
                "17:00"
            ]
        );
    }

    #[rstest]
    #[case(8, 0, 18, 0, 60)]
    #[case(7, 30, 16, 45, 45)]
    #[case(0, 0, 23, 59, 15)]
    #[case(9, 10, 11, 50, 20)]
    fn slots_stay_in_window_with_exact_spacing(
        #[case] open_hour: u32,
        #[case] open_minute: u32,
        #[case] close_hour: u32,
        #[case] close_minute: u32,
        #[case] step_minutes: u32,
    ) {
        let hours = OperatingHours::new(time(open_hour, open_minute), time(close_hour, close_minute));
        let slots = generate_slots(hours, step(step_minutes));

        assert!(!slots.is_empty(), "window fits at least one interval");
        for slot in &slots {
            assert!(slot.start() >= hours.opens, "slot starts at or after opening");
            assert!(slot.start() < hours.closes, "slot starts before closing");
        }
        for (earlier, later) in slots.iter().zip(slots.iter().skip(1)) {
            let gap = later.start() - earlier.start();
            assert_eq!(gap.num_minutes(), i64::from(step_minutes));
        }
    }

    #[test]
    fn window_shorter_than_step_generates_nothing() {
        let hours = OperatingHours::new(time(8, 0), time(8, 30));
        assert_eq!(generate_slots(hours, step(60)), Vec::new());
    }

    #[test]
    fn inverted_window_generates_nothing() {
        let hours = OperatingHours::new(time(18, 0), time(8, 0));
        assert_eq!(generate_slots(hours, step(60)), Vec::new());
    }

    #[test]
    fn late_window_never_wraps_past_midnight() {
        let hours = OperatingHours::new(time(23, 0), time(23, 59));
        assert_eq!(generate_slots(hours, step(60)), Vec::new());
    }

    #[test]
    fn short_window_falls_back_to_default_list() {
        let hours = OperatingHours::new(time(8, 0), time(8, 30));
        let slots = available_slots(
            Some(hours),
            date(2024, 6, 10),
            instant(2024, 6, 1, 12, 0),
            &SlotPolicy::default(),
        );

        assert_eq!(render(&slots), vec!["09:00", "10:00", "11:00", "19:00"]);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::inverted(Some(OperatingHours::new(
        NaiveTime::from_hms_opt(18, 0, 0).expect("valid test time"),
        NaiveTime::from_hms_opt(8, 0, 0).expect("valid test time"),
    )))]
    #[case::degenerate(Some(OperatingHours::new(
        NaiveTime::from_hms_opt(8, 0, 0).expect("valid test time"),
        NaiveTime::from_hms_opt(8, 0, 0).expect("valid test time"),
    )))]
    fn unusable_hours_fall_back_to_default_list(#[case] hours: Option<OperatingHours>) {
        let slots = available_slots(
            hours,
            date(2024, 6, 10),
            instant(2024, 6, 1, 12, 0),
            &SlotPolicy::default(),
        );

        assert_eq!(render(&slots), vec!["09:00", "10:00", "11:00", "19:00"]);
    }

    #[test]
    fn today_drops_elapsed_slots() {
        let slots = vec![
            TimeSlot(time(9, 0)),
            TimeSlot(time(14, 0)),
            TimeSlot(time(15, 0)),
            TimeSlot(time(19, 0)),
        ];
        let now = instant(2024, 6, 1, 14, 30);

        let remaining = filter_elapsed(slots, date(2024, 6, 1), now);
        assert_eq!(render(&remaining), vec!["15:00", "19:00"]);
    }

    #[test]
    fn slot_starting_right_now_counts_as_elapsed() {
        let slots = vec![TimeSlot(time(14, 30)), TimeSlot(time(15, 0))];
        let now = instant(2024, 6, 1, 14, 30);

        let remaining = filter_elapsed(slots, date(2024, 6, 1), now);
        assert_eq!(render(&remaining), vec!["15:00"]);
    }

    #[test]
    fn other_dates_pass_through_unfiltered() {
        let slots = vec![TimeSlot(time(9, 0)), TimeSlot(time(14, 0))];
        let now = instant(2024, 6, 1, 23, 59);

        let tomorrow = filter_elapsed(slots.clone(), date(2024, 6, 2), now);
        assert_eq!(tomorrow, slots);

        let yesterday = filter_elapsed(slots.clone(), date(2024, 5, 31), now);
        assert_eq!(yesterday, slots);
    }

    #[test]
    fn all_slots_elapsed_is_a_valid_empty_result() {
        let hours = OperatingHours::new(time(8, 0), time(18, 0));
        let slots = available_slots(
            Some(hours),
            date(2024, 6, 1),
            instant(2024, 6, 1, 20, 0),
            &SlotPolicy::default(),
        );

        assert_eq!(slots, Vec::new());
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let hours = Some(OperatingHours::new(time(8, 0), time(18, 0)));
        let target = date(2024, 6, 1);
        let now = instant(2024, 6, 1, 10, 15);
        let policy = SlotPolicy::default();

        let first = available_slots(hours, target, now, &policy);
        let second = available_slots(hours, target, now, &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn policy_rejects_empty_fallback() {
        assert!(
            SlotPolicy::new(SlotDuration::DEFAULT, Vec::new()).is_none(),
            "an empty fallback must be rejected"
        );
    }

    #[test]
    fn custom_fallback_is_served_verbatim() {
        let fallback = vec![TimeSlot(time(7, 15)), TimeSlot(time(20, 45))];
        let policy =
            SlotPolicy::new(SlotDuration::DEFAULT, fallback.clone()).expect("non-empty fallback");

        let slots = available_slots(
            None,
            date(2024, 6, 10),
            instant(2024, 6, 1, 12, 0),
            &policy,
        );
        assert_eq!(slots, fallback);
    }

    #[test]
    fn day_slots_never_come_back_empty() {
        let policy = SlotPolicy::default();
        let unusable = OperatingHours::new(time(8, 0), time(8, 0));

        assert!(!day_slots(None, &policy).is_empty(), "missing hours fall back");
        assert!(
            !day_slots(Some(unusable), &policy).is_empty(),
            "degenerate hours fall back"
        );
    }

    #[test]
    fn zero_step_is_unrepresentable() {
        assert!(SlotDuration::new(0).is_none(), "zero minutes is not a duration");
        assert_eq!(SlotDuration::default().minutes(), 60);
    }

    #[rstest]
    #[case("08:00", Some((8, 0)))]
    #[case("07:45:00", Some((7, 45)))]
    #[case(" 14:05 ", Some((14, 5)))]
    #[case("2023-01-01T08:00:00Z", Some((8, 0)))]
    #[case("2023-01-01T07:30:00-03:00", Some((7, 30)))]
    #[case("2023-05-10T16:45:00", Some((16, 45)))]
    #[case("", None)]
    #[case("soon", None)]
    #[case("25:00", None)]
    #[case("08h00", None)]
    fn wall_time_normalization(#[case] raw: &str, #[case] expected: Option<(u32, u32)>) {
        let expected_time = expected.map(|(hour, minute)| time(hour, minute));
        assert_eq!(parse_wall_time(raw), expected_time);
    }
}
