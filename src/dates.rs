use chrono::NaiveDate;

/// Normalize a diary date cell to `YYYY-MM-DD`.
///
/// Dates are read day-first (`07/01/2025` is 7 January) unless the first
/// field has four digits, in which case the cell is year-first. `/`, `-` and
/// `.` separators are accepted, and a trailing time component is ignored.
pub fn normalize_date(raw: &str) -> Option<String> {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;

    let sep = ['/', '-', '.'].into_iter().find(|&c| date_part.contains(c))?;
    let fields: Vec<&str> = date_part.split(sep).collect();
    let numeric = |f: &&str| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit());
    if fields.len() != 3 || !fields.iter().all(numeric) {
        return None;
    }

    let format = match (fields[0].len(), fields[2].len()) {
        (4, _) => format!("%Y{sep}%m{sep}%d"),
        (_, 4) => format!("%d{sep}%m{sep}%Y"),
        (_, 2) => format!("%d{sep}%m{sep}%y"),
        _ => return None,
    };

    NaiveDate::parse_from_str(date_part, &format)
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}
