//! Due-date grouping for the listing views.

use super::Todo;
use chrono::NaiveDate;
use serde::Serialize;

/// The four buckets the listing renders. Field names double as the JSON
/// keys the API clients read.
#[derive(Debug, Default, Serialize)]
pub struct TodoGroups {
    pub overduetodos: Vec<Todo>,
    pub duetodaytodos: Vec<Todo>,
    pub duelatertodos: Vec<Todo>,
    pub completedtodos: Vec<Todo>,
}

/// Partition todos by due date relative to `today`. Completed todos land in
/// their own bucket regardless of date. The partition is stable, so the
/// repo's `due_date, rowid` ordering carries through each bucket and the
/// most recently added same-day todo stays last.
#[must_use]
pub fn by_due_date(todos: Vec<Todo>, today: NaiveDate) -> TodoGroups {
    let mut groups = TodoGroups::default();

    for todo in todos {
        if todo.completed {
            groups.completedtodos.push(todo);
        } else if todo.due_date < today {
            groups.overduetodos.push(todo);
        } else if todo.due_date == today {
            groups.duetodaytodos.push(todo);
        } else {
            groups.duelatertodos.push(todo);
        }
    }

    groups
}
