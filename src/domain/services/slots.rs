use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashMap};

use crate::domain::models::availability::{AvailabilityAddition, BlockedSlot, WeeklyAvailability};
use crate::domain::models::session::TrainingSession;

pub const DEFAULT_SLOT_MIN: i32 = 60;

/// Width used when a blocked period has to be rendered outside any
/// template/addition window.
const STANDALONE_BLOCK_MIN: i64 = 60;

const BUCKET_SECS: i64 = 15 * 60;

/// Interval intersection, inclusive start / exclusive end.
pub fn overlaps(a_start: NaiveDateTime, a_end: NaiveDateTime, b_start: NaiveDateTime, b_end: NaiveDateTime) -> bool {
    a_start < b_end && b_start < a_end
}

pub fn minutes_to_time(minutes: i32) -> NaiveTime {
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

pub fn minute_of_day(t: NaiveDateTime) -> i32 {
    (t.time() - NaiveTime::MIN).num_minutes() as i32
}

/// Day-of-week as used throughout the schedule model: 0 = Sunday.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

pub(crate) trait TimeSpan {
    fn span_start(&self) -> NaiveDateTime;
    fn span_end(&self) -> NaiveDateTime;
}

impl TimeSpan for TrainingSession {
    fn span_start(&self) -> NaiveDateTime {
        self.start_time
    }
    fn span_end(&self) -> NaiveDateTime {
        self.end_time
    }
}

impl TimeSpan for BlockedSlot {
    fn span_start(&self) -> NaiveDateTime {
        self.start_time
    }
    fn span_end(&self) -> NaiveDateTime {
        self.end_time
    }
}

/// Records discretized into 15-minute buckets so that matching a slot
/// window against many sessions/blocks stays O(1) per slot instead of a
/// linear scan. Twelve weeks of daily slots touch thousands of windows.
pub(crate) struct TimelineIndex<'a, T: TimeSpan> {
    buckets: HashMap<i64, Vec<usize>>,
    records: &'a [T],
}

fn bucket_of(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp().div_euclid(BUCKET_SECS)
}

impl<'a, T: TimeSpan> TimelineIndex<'a, T> {
    pub fn build(records: &'a [T]) -> Self {
        let mut buckets: HashMap<i64, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            let (start, end) = (record.span_start(), record.span_end());
            if end <= start {
                continue;
            }
            let last = bucket_of(end - Duration::seconds(1));
            let mut bucket = bucket_of(start);
            while bucket <= last {
                buckets.entry(bucket).or_default().push(idx);
                bucket += 1;
            }
        }
        Self { buckets, records }
    }

    /// First (by insertion order) record truly overlapping `[start, end)`.
    pub fn lookup(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<&'a T> {
        if end <= start {
            return None;
        }
        let mut best: Option<usize> = None;
        let last = bucket_of(end - Duration::seconds(1));
        let mut bucket = bucket_of(start);
        while bucket <= last {
            if let Some(indices) = self.buckets.get(&bucket) {
                for &idx in indices {
                    let record = &self.records[idx];
                    if overlaps(record.span_start(), record.span_end(), start, end)
                        && best.is_none_or(|b| idx < b)
                    {
                        best = Some(idx);
                    }
                }
            }
            bucket += 1;
        }
        best.map(|idx| &self.records[idx])
    }
}

/// What occupies a computed slot. Each variant carries exactly the record
/// that produced the status.
#[derive(Debug, Clone)]
pub enum SlotKind {
    Free,
    Booked(TrainingSession),
    Blocked(BlockedSlot),
    Exceptional(AvailabilityAddition),
}

impl SlotKind {
    pub fn is_free(&self) -> bool {
        matches!(self, SlotKind::Free)
    }
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: SlotKind,
    /// Whether the slot came out of the recurring weekly template (as
    /// opposed to an addition or a standalone block).
    pub from_template: bool,
}

/// Everything the calculus needs to know about one coach on one date.
/// Sessions are expected pre-filtered to non-cancelled ones.
pub struct DayContext<'a> {
    pub date: NaiveDate,
    pub weekly: &'a [WeeklyAvailability],
    pub additions: &'a [AvailabilityAddition],
    pub blocks: &'a [BlockedSlot],
    pub sessions: &'a [TrainingSession],
    pub default_duration_min: i32,
}

/// Projects one calendar day into an ordered list of slots.
///
/// Template windows are walked in `duration` steps; each step is matched
/// against sessions first, then blocks (a session inside a block is a data
/// inconsistency, and the booked session is what the member must see).
/// Additions walk the same way but replace template slots that share a
/// start. Blocks not covered by any produced slot are still emitted so the
/// coach sees them on an otherwise empty day.
pub fn calculate_day_slots(ctx: &DayContext) -> Vec<Slot> {
    let weekday = weekday_index(ctx.date);
    let session_index = TimelineIndex::build(ctx.sessions);
    let block_index = TimelineIndex::build(ctx.blocks);

    let mut by_start: BTreeMap<NaiveDateTime, Slot> = BTreeMap::new();

    for row in ctx.weekly.iter().filter(|r| r.day_of_week == weekday) {
        let step = row.duration_min.unwrap_or(ctx.default_duration_min);
        if step <= 0 {
            continue;
        }
        let mut cursor = row.start_min;
        while cursor + step <= row.end_min {
            let start = ctx.date.and_time(minutes_to_time(cursor));
            let end = start + Duration::minutes(step as i64);
            let kind = occupied_kind(&session_index, &block_index, start, end)
                .unwrap_or(SlotKind::Free);
            by_start.insert(start, Slot { start, end, kind, from_template: true });
            cursor += step;
        }
    }

    for addition in ctx.additions.iter().filter(|a| a.start_time.date() == ctx.date) {
        let step = Duration::minutes(ctx.default_duration_min.max(1) as i64);
        let mut cursor = addition.start_time;
        while cursor + step <= addition.end_time {
            let end = cursor + step;
            let kind = occupied_kind(&session_index, &block_index, cursor, end)
                .unwrap_or_else(|| SlotKind::Exceptional(addition.clone()));
            // Exception wins: replaces any template slot at the same start.
            by_start.insert(cursor, Slot { start: cursor, end, kind, from_template: false });
            cursor = end;
        }
    }

    let day_start = ctx.date.and_time(NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);
    for block in ctx.blocks {
        if !overlaps(block.start_time, block.end_time, day_start, day_end) {
            continue;
        }
        let covered = by_start
            .values()
            .any(|slot| overlaps(slot.start, slot.end, block.start_time, block.end_time));
        if covered {
            continue;
        }
        let start = block.start_time.max(day_start);
        by_start.entry(start).or_insert(Slot {
            start,
            end: start + Duration::minutes(STANDALONE_BLOCK_MIN),
            kind: SlotKind::Blocked(block.clone()),
            from_template: false,
        });
    }

    by_start.into_values().collect()
}

fn occupied_kind(
    sessions: &TimelineIndex<'_, TrainingSession>,
    blocks: &TimelineIndex<'_, BlockedSlot>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Option<SlotKind> {
    if let Some(session) = sessions.lookup(start, end) {
        return Some(SlotKind::Booked(session.clone()));
    }
    blocks.lookup(start, end).map(|block| SlotKind::Blocked(block.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::session::{NewSessionParams, SessionType, TrainingSession};

    fn monday() -> NaiveDate {
        // 2025-06-02 is a Monday; weekday index 1 with 0 = Sunday.
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(date: NaiveDate, hhmm: &str) -> NaiveDateTime {
        date.and_time(minutes_to_time(crate::domain::models::availability::parse_hhmm(hhmm).unwrap()))
    }

    fn weekly_row(day: i32, start: &str, end: &str) -> WeeklyAvailability {
        use crate::domain::models::availability::{parse_hhmm, NewWeeklyWindow};
        WeeklyAvailability::new(
            "coach-1".into(),
            day,
            NewWeeklyWindow {
                start_min: parse_hhmm(start).unwrap(),
                end_min: parse_hhmm(end).unwrap(),
                is_individual: true,
                is_group: false,
                room_id: None,
                duration_min: None,
            },
        )
    }

    fn session(date: NaiveDate, start: &str, end: &str) -> TrainingSession {
        TrainingSession::new(NewSessionParams {
            coach_id: "coach-1".into(),
            room_id: "room-1".into(),
            recurring_booking_id: None,
            title: None,
            description: None,
            session_type: SessionType::OneToOne,
            capacity: 1,
            start_time: at(date, start),
            end_time: at(date, end),
            is_recurring: false,
        })
    }

    fn block(date: NaiveDate, start: &str, end: &str) -> BlockedSlot {
        BlockedSlot::new("coach-1".into(), at(date, start), at(date, end), None)
    }

    fn addition(date: NaiveDate, start: &str, end: &str) -> AvailabilityAddition {
        AvailabilityAddition::new("coach-1".into(), at(date, start), at(date, end))
    }

    fn ctx<'a>(
        weekly: &'a [WeeklyAvailability],
        additions: &'a [AvailabilityAddition],
        blocks: &'a [BlockedSlot],
        sessions: &'a [TrainingSession],
    ) -> DayContext<'a> {
        DayContext {
            date: monday(),
            weekly,
            additions,
            blocks,
            sessions,
            default_duration_min: DEFAULT_SLOT_MIN,
        }
    }

    #[test]
    fn test_template_walk_produces_free_slots() {
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &[], &[]));

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, at(monday(), "09:00"));
        assert_eq!(slots[2].start, at(monday(), "11:00"));
        assert!(slots.iter().all(|s| s.kind.is_free() && s.from_template));
    }

    #[test]
    fn test_wrong_weekday_produces_nothing() {
        let weekly = [weekly_row(2, "09:00", "12:00")];
        assert!(calculate_day_slots(&ctx(&weekly, &[], &[], &[])).is_empty());
    }

    #[test]
    fn test_session_marks_slot_booked() {
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let sessions = [session(monday(), "10:00", "11:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &[], &sessions));

        assert!(slots[0].kind.is_free());
        assert!(matches!(&slots[1].kind, SlotKind::Booked(s) if s.id == sessions[0].id));
        assert!(slots[2].kind.is_free());
    }

    #[test]
    fn test_block_overlap_is_exclusive_end() {
        // Block 10:30-11:30 touches the 10:00 and 11:00 slots but not 09:00.
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let blocks = [block(monday(), "10:30", "11:30")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &blocks, &[]));

        assert!(slots[0].kind.is_free());
        assert!(matches!(slots[1].kind, SlotKind::Blocked(_)));
        assert!(matches!(slots[2].kind, SlotKind::Blocked(_)));
    }

    #[test]
    fn test_block_ending_at_slot_start_does_not_touch_it() {
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let blocks = [block(monday(), "09:00", "10:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &blocks, &[]));

        assert!(matches!(slots[0].kind, SlotKind::Blocked(_)));
        assert!(slots[1].kind.is_free());
        assert!(slots[2].kind.is_free());
    }

    #[test]
    fn test_session_wins_over_block() {
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let sessions = [session(monday(), "10:00", "11:00")];
        let blocks = [block(monday(), "10:00", "11:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &blocks, &sessions));

        assert!(matches!(slots[1].kind, SlotKind::Booked(_)));
    }

    #[test]
    fn test_addition_replaces_template_slot() {
        let weekly = [weekly_row(1, "09:00", "12:00")];
        let additions = [addition(monday(), "10:00", "11:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &additions, &[], &[]));

        assert_eq!(slots.len(), 3);
        assert!(matches!(&slots[1].kind, SlotKind::Exceptional(a) if a.id == additions[0].id));
        assert!(!slots[1].from_template);
        assert!(slots[0].from_template);
    }

    #[test]
    fn test_addition_outside_template_is_exceptional() {
        let additions = [addition(monday(), "18:00", "20:00")];
        let slots = calculate_day_slots(&ctx(&[], &additions, &[], &[]));

        assert_eq!(slots.len(), 2);
        assert!(matches!(slots[0].kind, SlotKind::Exceptional(_)));
        assert_eq!(slots[0].start, at(monday(), "18:00"));
        assert_eq!(slots[1].start, at(monday(), "19:00"));
    }

    #[test]
    fn test_addition_on_other_date_is_ignored() {
        let other_day = monday() + Duration::days(1);
        let additions = [addition(other_day, "18:00", "20:00")];
        assert!(calculate_day_slots(&ctx(&[], &additions, &[], &[])).is_empty());
    }

    #[test]
    fn test_booked_addition_slot() {
        let additions = [addition(monday(), "18:00", "19:00")];
        let sessions = [session(monday(), "18:00", "19:00")];
        let slots = calculate_day_slots(&ctx(&[], &additions, &[], &sessions));

        assert_eq!(slots.len(), 1);
        assert!(matches!(slots[0].kind, SlotKind::Booked(_)));
    }

    #[test]
    fn test_standalone_block_is_emitted() {
        let weekly = [weekly_row(1, "09:00", "10:00")];
        let blocks = [block(monday(), "15:00", "16:30")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &blocks, &[]));

        assert_eq!(slots.len(), 2);
        assert!(slots[0].kind.is_free());
        assert!(matches!(slots[1].kind, SlotKind::Blocked(_)));
        assert_eq!(slots[1].start, at(monday(), "15:00"));
        assert_eq!(slots[1].end, at(monday(), "16:00"));
    }

    #[test]
    fn test_output_sorted_ascending() {
        let weekly = [weekly_row(1, "14:00", "16:00"), weekly_row(1, "09:00", "11:00")];
        let slots = calculate_day_slots(&ctx(&weekly, &[], &[], &[]));

        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn test_timeline_index_lookup() {
        let sessions = [
            session(monday(), "09:00", "10:00"),
            session(monday(), "13:10", "13:50"),
        ];
        let index = TimelineIndex::build(&sessions);

        assert!(index.lookup(at(monday(), "09:30"), at(monday(), "10:30")).is_some());
        assert!(index.lookup(at(monday(), "10:00"), at(monday(), "11:00")).is_none());
        // Off-grid record is still found from a bucket it merely touches.
        let hit = index.lookup(at(monday(), "13:00"), at(monday(), "14:00")).unwrap();
        assert_eq!(hit.id, sessions[1].id);
        assert!(index.lookup(at(monday(), "14:00"), at(monday(), "15:00")).is_none());
    }
}
