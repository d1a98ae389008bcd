use crate::auth::Session;
use crate::dates::normalize_date;
use crate::loader::DiaryRow;
use crate::skills::SkillCatalog;
use serde::Serialize;
use std::fmt;
use std::thread;
use std::time::Duration;

/// Body of one store request
#[derive(Debug, Serialize, PartialEq)]
pub struct DiaryPayload {
    pub project_id: String,
    pub date: String,
    pub description: String,
    pub hours: f64,
    pub links: String,
    pub blockers: String,
    pub learnings: String,
    pub mood_slider: u8,
    pub skill_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Success,
    /// Non-2xx response (`code` set) or transport error (`code` empty)
    HttpFailure { code: Option<u16>, body: String },
    /// Row never left the machine
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    /// 1-based position in the source file
    pub index: usize,
    pub status: RowStatus,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<SubmissionResult>,
}

/// Fixed pause between consecutive store requests. Only rows that actually go
/// out over the network count; skipped rows neither wait nor reset the pause.
pub struct Throttle {
    delay: Duration,
    primed: bool,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Throttle {
            delay,
            primed: false,
        }
    }

    /// Block until the next request may go out. The first call returns at once.
    pub fn wait(&mut self) {
        if self.primed && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.primed = true;
    }
}

/// Turn a loaded row into a store payload.
///
/// Returns the payload together with the skill names that had no catalog id,
/// or the reason the row has to be skipped.
pub fn build_payload(
    row: &DiaryRow,
    project_id: &str,
    catalog: &SkillCatalog,
    mood: u8,
) -> Result<(DiaryPayload, Vec<String>), String> {
    let date = row
        .date
        .as_deref()
        .and_then(normalize_date)
        .ok_or_else(|| "invalid date".to_string())?;

    let hours = row
        .hours
        .as_deref()
        .and_then(|h| h.trim().parse::<f64>().ok())
        .filter(|h| h.is_finite() && *h >= 0.0)
        .ok_or_else(|| "invalid hours".to_string())?;

    let skills = catalog.resolve(row.skills.as_deref());

    let payload = DiaryPayload {
        project_id: project_id.to_string(),
        date,
        description: row.description.clone().unwrap_or_default(),
        hours,
        links: String::new(),
        blockers: row.blockers.clone().unwrap_or_default(),
        learnings: row.learnings.clone().unwrap_or_default(),
        mood_slider: mood,
        skill_ids: skills.ids,
    };

    Ok((payload, skills.unknown))
}

pub struct Submitter<'a> {
    session: &'a Session,
    store_url: &'a str,
    catalog: &'a SkillCatalog,
    mood: u8,
    throttle: Throttle,
}

impl<'a> Submitter<'a> {
    pub fn new(
        session: &'a Session,
        store_url: &'a str,
        catalog: &'a SkillCatalog,
        mood: u8,
        delay: Duration,
    ) -> Self {
        Submitter {
            session,
            store_url,
            catalog,
            mood,
            throttle: Throttle::new(delay),
        }
    }

    /// Submit every row in order, one request at a time. Failures are recorded
    /// per row and never stop the batch.
    pub fn submit_all(&mut self, rows: &[DiaryRow]) -> RunSummary {
        let total = rows.len();
        let mut summary = RunSummary::default();

        for (i, row) in rows.iter().enumerate() {
            let index = i + 1;
            let status = self.submit_row(index, total, row);
            summary.results.push(SubmissionResult { index, status });
        }

        summary
    }

    fn submit_row(&mut self, index: usize, total: usize, row: &DiaryRow) -> RowStatus {
        let shown_date = row.date.as_deref().unwrap_or("<no date>");

        let (payload, unknown) =
            match build_payload(row, self.session.project_id(), self.catalog, self.mood) {
                Ok(built) => built,
                Err(reason) => {
                    println!(
                        "[{}/{}] Skipping entry for {}: {}",
                        index, total, shown_date, reason
                    );
                    return RowStatus::Skipped { reason };
                }
            };

        if !unknown.is_empty() {
            log::warn!(
                "Row {}: dropping unrecognized skills: {}",
                index,
                unknown.join(", ")
            );
        }

        self.throttle.wait();
        println!("[{}/{}] Posting entry for {}...", index, total, payload.date);

        let status = match self.session.post_json(self.store_url, &payload) {
            Ok(response) => {
                let code = response.status().as_u16();
                if code == 200 || code == 201 {
                    RowStatus::Success
                } else {
                    RowStatus::HttpFailure {
                        code: Some(code),
                        body: response.text().unwrap_or_default(),
                    }
                }
            }
            Err(e) => {
                log::debug!("Store request for row {} failed: {:?}", index, e);
                RowStatus::HttpFailure {
                    code: None,
                    body: e.to_string(),
                }
            }
        };

        match &status {
            RowStatus::Success => println!("  Status: Success"),
            RowStatus::HttpFailure { code: Some(code), body } => {
                println!("  Status: Failed ({}) - {}", code, body)
            }
            RowStatus::HttpFailure { code: None, body } => {
                println!("  Status: Failed - {}", body)
            }
            RowStatus::Skipped { .. } => {}
        }

        status
    }
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Success))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::HttpFailure { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&RowStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done: {}/{} entries submitted successfully ({} failed, {} skipped).",
            self.succeeded(),
            self.total(),
            self.failed(),
            self.skipped()
        )
    }
}
