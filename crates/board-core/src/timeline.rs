//! Activity Timeline
//!
//! Merges locally recorded task events and notes into one feed, newest
//! first, grouped by local calendar day.
//!
//! Timestamps are taken from the client clock when a mutation's success is
//! observed, so feeds from different machines do not interleave reliably.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::grouping::ColumnTone;
use crate::overlay::{EventKind, Note, TimelineEvent};

/// What produced a feed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Note,
    Event(EventKind),
}

/// One rendered line of the activity feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub id: String,
    pub kind: EntryKind,
    pub header: &'static str,
    pub content: String,
    pub labels: Vec<String>,
    pub tone: ColumnTone,
    pub timestamp: DateTime<Utc>,
}

/// Entries of one local calendar day, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub entries: Vec<FeedEntry>,
}

/// Lookups used to render events
#[derive(Debug, Clone, Copy)]
pub struct FeedContext<'a> {
    /// Last known title per task
    pub titles: &'a HashMap<String, String>,
    /// Labels per task
    pub labels: &'a HashMap<String, Vec<String>>,
    /// Column id to display name, from the boards currently cached
    pub column_names: &'a HashMap<String, String>,
}

/// Built-in labels for well-known column ids
fn builtin_column_label(column_id: &str) -> Option<&'static str> {
    match column_id {
        "done" => Some("Done"),
        "in-progress" => Some("In Progress"),
        "planned" | "todo" => Some("Planned"),
        _ => None,
    }
}

fn tone_for(column_id: Option<&str>) -> ColumnTone {
    match column_id {
        Some("done") => ColumnTone::Done,
        Some("in-progress") => ColumnTone::InProgress,
        _ => ColumnTone::Todo,
    }
}

/// Human-readable column label; falls back to the raw id
pub fn column_label(column_id: &str, ctx: &FeedContext<'_>) -> String {
    ctx.column_names
        .get(column_id)
        .cloned()
        .or_else(|| builtin_column_label(column_id).map(str::to_string))
        .unwrap_or_else(|| column_id.to_string())
}

fn event_entry(event: &TimelineEvent, ctx: &FeedContext<'_>) -> FeedEntry {
    let title = event
        .title
        .clone()
        .or_else(|| ctx.titles.get(&event.task_id).cloned());
    let fallback = format!("Task #{}", event.task_id);

    let (header, content) = match event.kind {
        EventKind::TaskCreated => ("Task created", title.unwrap_or(fallback)),
        EventKind::TaskUpdated => ("Task updated", title.unwrap_or(fallback)),
        EventKind::TaskMoved => {
            let name = title.unwrap_or(fallback);
            let content = match &event.to_column_id {
                Some(to) => format!("{} moved to \"{}\"", name, column_label(to, ctx)),
                None => format!("{} moved", name),
            };
            ("Task moved", content)
        }
        EventKind::TaskDeleted => (
            "Task deleted",
            title.unwrap_or_else(|| format!("Task #{} deleted", event.task_id)),
        ),
    };

    FeedEntry {
        id: event.id.clone(),
        kind: EntryKind::Event(event.kind),
        header,
        content,
        labels: ctx.labels.get(&event.task_id).cloned().unwrap_or_default(),
        tone: tone_for(event.to_column_id.as_deref()),
        timestamp: event.timestamp,
    }
}

fn note_entry(note: &Note) -> FeedEntry {
    FeedEntry {
        id: note.id.clone(),
        kind: EntryKind::Note,
        header: "Note added",
        content: note.content.clone(),
        labels: Vec::new(),
        tone: ColumnTone::Todo,
        timestamp: note.timestamp,
    }
}

/// Build the day-grouped feed in time zone `tz`
pub fn build_feed<Tz: TimeZone>(
    events: &[TimelineEvent],
    notes: &[Note],
    ctx: &FeedContext<'_>,
    tz: &Tz,
) -> Vec<DayGroup> {
    let mut entries: Vec<FeedEntry> = events
        .iter()
        .map(|e| event_entry(e, ctx))
        .chain(notes.iter().map(note_entry))
        .collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut groups: Vec<DayGroup> = Vec::new();
    for entry in entries {
        let day = entry.timestamp.with_timezone(tz).date_naive();
        match groups.last_mut() {
            Some(group) if group.day == day => group.entries.push(entry),
            _ => groups.push(DayGroup {
                day,
                entries: vec![entry],
            }),
        }
    }
    groups
}

// ========================
// Formatting
// ========================

/// Heading for a day group, e.g. `Wednesday, 01 May 2024`
pub fn format_day_heading(day: NaiveDate) -> String {
    day.format("%A, %d %b %Y").to_string()
}

/// Short relative description of `ts` as seen at `now`
pub fn format_relative<Tz: TimeZone>(ts: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = ts.with_timezone(tz);
    let day = local.date_naive();
    let today = now.with_timezone(tz).date_naive();
    let time = local.format("%H:%M");
    let days_ago = (today - day).num_days();

    match days_ago {
        0 => format!("today at {}", time),
        1 => format!("yesterday at {}", time),
        -1 => format!("tomorrow at {}", time),
        2..=6 => format!("last {} at {}", day.weekday_name(), time),
        _ => day.format("%d/%m/%Y").to_string(),
    }
}

trait WeekdayName {
    fn weekday_name(&self) -> String;
}

impl WeekdayName for NaiveDate {
    fn weekday_name(&self) -> String {
        self.format("%A").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn local(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        wib()
            .with_ymd_and_hms(2024, 5, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(id: &str, kind: EventKind, task: &str, ts: DateTime<Utc>) -> TimelineEvent {
        TimelineEvent {
            id: id.into(),
            kind,
            task_id: task.into(),
            title: None,
            from_column_id: None,
            to_column_id: None,
            to_position: None,
            board_id: None,
            timestamp: ts,
        }
    }

    fn note(id: &str, content: &str, ts: DateTime<Utc>) -> Note {
        Note {
            id: id.into(),
            content: content.into(),
            timestamp: ts,
        }
    }

    struct Lookups {
        titles: HashMap<String, String>,
        labels: HashMap<String, Vec<String>>,
        columns: HashMap<String, String>,
    }

    impl Lookups {
        fn empty() -> Self {
            Self {
                titles: HashMap::new(),
                labels: HashMap::new(),
                columns: HashMap::new(),
            }
        }

        fn ctx(&self) -> FeedContext<'_> {
            FeedContext {
                titles: &self.titles,
                labels: &self.labels,
                column_names: &self.columns,
            }
        }
    }

    #[test]
    fn test_note_after_event_same_day_comes_first() {
        let lookups = Lookups::empty();
        let events = vec![event("e1", EventKind::TaskMoved, "t1", local(1, 9, 0))];
        let notes = vec![note("n1", "standup notes", local(1, 10, 0))];

        let feed = build_feed(&events, &notes, &lookups.ctx(), &wib());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].entries[0].kind, EntryKind::Note);
        assert_eq!(feed[0].entries[1].kind, EntryKind::Event(EventKind::TaskMoved));
    }

    #[test]
    fn test_groups_by_local_day_descending() {
        let lookups = Lookups::empty();
        // 23:30 local on the 1st is still the 1st even though it is 16:30 UTC
        let events = vec![
            event("e1", EventKind::TaskCreated, "t1", local(1, 23, 30)),
            event("e2", EventKind::TaskUpdated, "t1", local(2, 0, 30)),
            event("e3", EventKind::TaskDeleted, "t2", local(1, 8, 0)),
        ];
        let feed = build_feed(&events, &[], &lookups.ctx(), &wib());
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].day, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(feed[1].day, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let ids: Vec<&str> = feed[1].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
    }

    #[test]
    fn test_move_uses_board_column_name_then_builtin_then_raw() {
        let mut lookups = Lookups::empty();
        lookups.columns.insert("col-42".into(), "Review".into());
        lookups.titles.insert("t1".into(), "Write docs".into());

        let mut to_named = event("e1", EventKind::TaskMoved, "t1", local(1, 9, 0));
        to_named.to_column_id = Some("col-42".into());
        let mut to_builtin = event("e2", EventKind::TaskMoved, "t1", local(1, 9, 1));
        to_builtin.to_column_id = Some("done".into());
        let mut to_raw = event("e3", EventKind::TaskMoved, "t2", local(1, 9, 2));
        to_raw.to_column_id = Some("mystery".into());

        let feed = build_feed(&[to_named, to_builtin, to_raw], &[], &lookups.ctx(), &wib());
        let contents: Vec<&str> = feed[0].entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "Task #t2 moved to \"mystery\"",
                "Write docs moved to \"Done\"",
                "Write docs moved to \"Review\"",
            ]
        );
        assert_eq!(feed[0].entries[1].tone, ColumnTone::Done);
    }

    #[test]
    fn test_event_title_prefers_denormalized_value() {
        let mut lookups = Lookups::empty();
        lookups.titles.insert("t1".into(), "Old title".into());
        lookups.labels.insert("t1".into(), vec!["backend".into()]);
        let mut e = event("e1", EventKind::TaskUpdated, "t1", local(1, 9, 0));
        e.title = Some("New title".into());

        let feed = build_feed(&[e], &[], &lookups.ctx(), &wib());
        let entry = &feed[0].entries[0];
        assert_eq!(entry.header, "Task updated");
        assert_eq!(entry.content, "New title");
        assert_eq!(entry.labels, vec!["backend".to_string()]);
    }

    #[test]
    fn test_deleted_without_title() {
        let lookups = Lookups::empty();
        let feed = build_feed(
            &[event("e1", EventKind::TaskDeleted, "t7", local(1, 9, 0))],
            &[],
            &lookups.ctx(),
            &wib(),
        );
        assert_eq!(feed[0].entries[0].content, "Task #t7 deleted");
    }

    #[test]
    fn test_empty_feed() {
        let lookups = Lookups::empty();
        assert!(build_feed(&[], &[], &lookups.ctx(), &wib()).is_empty());
    }

    #[test]
    fn test_relative_formatting() {
        let now = local(8, 12, 0);
        assert_eq!(format_relative(local(8, 9, 5), now, &wib()), "today at 09:05");
        assert_eq!(format_relative(local(7, 18, 0), now, &wib()), "yesterday at 18:00");
        // 2024-05-04 is a Saturday
        assert_eq!(format_relative(local(4, 8, 0), now, &wib()), "last Saturday at 08:00");
        assert_eq!(format_relative(local(1, 8, 0), now, &wib()), "01/05/2024");
    }

    #[test]
    fn test_day_heading() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(format_day_heading(day), "Wednesday, 01 May 2024");
    }
}
