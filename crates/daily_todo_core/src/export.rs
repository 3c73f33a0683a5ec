use crate::model::Task;

pub const CSV_COLUMNS: [&str; 7] = [
    "Task",
    "Description",
    "Start",
    "End",
    "Status",
    "Priority",
    "AssignedBy",
];

/// Flattens tasks into CSV, one row per task in input order.
pub fn to_csv<'a, I>(tasks: I) -> String
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out = String::new();
    push_row(&mut out, CSV_COLUMNS);

    for task in tasks {
        push_row(
            &mut out,
            [
                task.title.as_str(),
                task.description.as_str(),
                task.start.as_str(),
                task.end.as_str(),
                task.status.label(),
                task.priority.label(),
                task.assigned_by.as_deref().unwrap_or(""),
            ],
        );
    }

    out
}

fn push_row<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
