//! Discretization of availability windows into bookable slot start times.
//!
//! The grid is a pure function of one day's windows and the slot duration:
//! per window, start times step from the window start in slot-duration
//! increments while strictly before the window end, so a trailing partial
//! period is dropped. Windows contribute in declaration order; should the
//! same day ever carry more than one window, their slots are concatenated
//! without de-duplication.

use shared_utils::clock::ClockTime;

use crate::models::{AvailabilityWindow, DayOfWeek, WeeklyAvailability};

pub struct SlotGrid<'a> {
    windows: Vec<&'a AvailabilityWindow>,
    slot_duration: u16,
}

impl<'a> SlotGrid<'a> {
    pub fn for_day(availability: &'a WeeklyAvailability, day: DayOfWeek) -> Self {
        Self {
            windows: availability
                .windows
                .iter()
                .filter(|window| window.day_of_week == day)
                .collect(),
            slot_duration: availability.slot_duration_minutes,
        }
    }

    /// No window matched the requested day.
    pub fn has_no_windows(&self) -> bool {
        self.windows.is_empty()
    }

    /// Lazy, finite, restartable sequence of slot start times.
    pub fn starts(&self) -> impl Iterator<Item = ClockTime> + '_ {
        let step = self.slot_duration;
        self.windows
            .iter()
            .copied()
            .flat_map(move |window| window_starts(window, step))
    }

    /// Whether `time` is one of the start times `starts()` would emit. The
    /// same rule gates booking, so a caller can only book what the listing
    /// advertises.
    pub fn contains(&self, time: ClockTime) -> bool {
        if self.slot_duration == 0 {
            return false;
        }
        self.windows.iter().any(|window| {
            time >= window.start_time
                && time < window.end_time
                && (time.minutes_from_midnight() - window.start_time.minutes_from_midnight())
                    % self.slot_duration
                    == 0
        })
    }
}

fn window_starts(window: &AvailabilityWindow, step: u16) -> impl Iterator<Item = ClockTime> + '_ {
    // A zero step would never terminate; emit nothing instead.
    let seed = (step > 0).then_some(window.start_time);
    std::iter::successors(seed, move |time| time.checked_add(step))
        .take_while(move |time| *time < window.end_time)
}
