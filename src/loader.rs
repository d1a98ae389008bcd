//! Read diary rows from a CSV or Excel file

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Columns every input file must carry (case-sensitive)
pub const REQUIRED_COLUMNS: [&str; 6] =
    ["date", "description", "hours", "learnings", "blockers", "skills"];

/// One diary entry as read from the source file. Cells are kept as text and
/// validated when the row is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiaryRow {
    pub date: Option<String>,
    pub description: Option<String>,
    pub hours: Option<String>,
    pub learnings: Option<String>,
    pub blockers: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Header plus data rows, before column validation
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Load and validate a diary file, preserving source row order.
pub fn load_rows(path: &Path) -> Result<Vec<DiaryRow>> {
    if !path.exists() {
        anyhow::bail!("The file '{}' does not exist", path.display());
    }

    let format = InputFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported file format for '{}'. Use .csv, .xls, or .xlsx",
            path.display()
        )
    })?;

    let table = match format {
        InputFormat::Csv => read_csv(path),
        InputFormat::Spreadsheet => read_spreadsheet(path),
    }
    .with_context(|| format!("Error reading file: {}", path.display()))?;

    let rows = into_rows(table)?;
    log::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("Failed to open CSV file")?;

    let header: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // +2: 1-based, after the header line
        let record = record.with_context(|| format!("Failed to read CSV line {}", idx + 2))?;
        rows.push(record.iter().map(non_blank).collect());
    }

    Ok(Table { header, rows })
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("Failed to open spreadsheet")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Spreadsheet has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|c| cell_text(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Table { header, rows })
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => non_blank(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(number_text(*f)),
        Data::Bool(b) => Some(b.to_string()),
        // Time-of-day or duration cells (e.g. hours typed as `8:00`) carry no
        // date part; render them as decimal hours
        Data::DateTime(dt) if dt.is_duration() || dt.as_f64() < 1.0 => {
            let hours = (dt.as_f64() * 24.0 * 100.0).round() / 100.0;
            Some(number_text(hours))
        }
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

fn number_text(f: f64) -> String {
    if f.fract() == 0.0 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

fn into_rows(table: Table) -> Result<Vec<DiaryRow>> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !table.header.iter().any(|h| h == col))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!("Missing columns in file: {}", missing.join(", "));
    }

    let index_of = |name: &str| table.header.iter().position(|h| h == name);
    let [date, description, hours, learnings, blockers, skills] =
        REQUIRED_COLUMNS.map(|name| index_of(name).unwrap_or_default());

    let rows = table
        .rows
        .into_iter()
        .filter(|cells| cells.iter().any(Option::is_some))
        .map(|mut cells| {
            let mut take = |i: usize| cells.get_mut(i).and_then(Option::take);
            DiaryRow {
                date: take(date),
                description: take(description),
                hours: take(hours),
                learnings: take(learnings),
                blockers: take(blockers),
                skills: take(skills),
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
    use std::fs;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_csv_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "diary.csv",
            "date,description,hours,learnings,blockers,skills\n\
             07/01/2025,desc,8,x,,\"Python, Java\"\n\
             08/01/2025,second,7.5,,none,\n",
        );

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            DiaryRow {
                date: Some("07/01/2025".into()),
                description: Some("desc".into()),
                hours: Some("8".into()),
                learnings: Some("x".into()),
                blockers: None,
                skills: Some("Python, Java".into()),
            }
        );
        assert_eq!(rows[1].description.as_deref(), Some("second"));
        assert_eq!(rows[1].hours.as_deref(), Some("7.5"));
        assert_eq!(rows[1].learnings, None);
    }

    #[test]
    fn column_order_and_extra_columns_do_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "diary.CSV",
            "skills,notes,hours,date,blockers,learnings,description\n\
             Git,ignored,4,2025-02-01,,,did things\n",
        );

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date.as_deref(), Some("2025-02-01"));
        assert_eq!(rows[0].skills.as_deref(), Some("Git"));
        assert_eq!(rows[0].description.as_deref(), Some("did things"));
    }

    #[test]
    fn reports_every_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "diary.csv", "date,Description,hours\n01/01/2025,x,1\n");

        let err = load_rows(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing columns in file: description, learnings, blockers, skills"
        );
    }

    #[test]
    fn skips_blank_rows_and_tolerates_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "diary.csv",
            "date,description,hours,learnings,blockers,skills\n\
             ,,,,,\n\
             01/01/2025,short\n",
        );

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description.as_deref(), Some("short"));
        assert_eq!(rows[0].hours, None);
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rows(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "diary.txt", "date\n");
        let err = load_rows(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn spreadsheet_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Float(8.0)).as_deref(), Some("8"));
        assert_eq!(cell_text(&Data::Float(7.5)).as_deref(), Some("7.5"));
        assert_eq!(cell_text(&Data::Int(3)).as_deref(), Some("3"));
        assert_eq!(cell_text(&Data::String("  ".into())), None);
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(
            cell_text(&Data::DateTimeIso("2025-01-07T00:00:00".into())).as_deref(),
            Some("2025-01-07T00:00:00")
        );
    }

    fn write_workbook(
        dir: &tempfile::TempDir,
        header: &[&str],
        fill: impl FnOnce(&mut Worksheet),
    ) -> std::path::PathBuf {
        let path = dir.path().join("diary.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        fill(sheet);
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn loads_first_sheet_of_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, &REQUIRED_COLUMNS, |sheet| {
            let date_format = Format::new().set_num_format("dd/mm/yyyy");
            let date = ExcelDateTime::from_ymd(2025, 1, 7).unwrap();
            sheet.write_datetime_with_format(1, 0, &date, &date_format).unwrap();
            sheet.write_string(1, 1, "desc").unwrap();
            sheet.write_number(1, 2, 8.0).unwrap();
            sheet.write_string(1, 3, "x").unwrap();
            sheet.write_string(1, 5, "Python, Java").unwrap();

            // hours typed as a time of day
            let time_format = Format::new().set_num_format("hh:mm");
            sheet.write_string(2, 0, "08/01/2025").unwrap();
            sheet.write_number_with_format(2, 2, 7.5 / 24.0, &time_format).unwrap();
        });

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            DiaryRow {
                date: Some("2025-01-07".into()),
                description: Some("desc".into()),
                hours: Some("8".into()),
                learnings: Some("x".into()),
                blockers: None,
                skills: Some("Python, Java".into()),
            }
        );
        assert_eq!(rows[1].date.as_deref(), Some("08/01/2025"));
        assert_eq!(rows[1].hours.as_deref(), Some("7.5"));
    }

    #[test]
    fn xlsx_missing_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            &dir,
            &["date", "description", "hours", "learnings", "blockers"],
            |sheet| {
                sheet.write_string(1, 0, "07/01/2025").unwrap();
            },
        );

        let err = load_rows(&path).unwrap_err();
        assert_eq!(err.to_string(), "Missing columns in file: skills");
    }
}
