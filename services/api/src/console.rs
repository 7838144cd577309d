use crate::infra::InMemorySessionRepository;
use agent_lab::config::AppConfig;
use agent_lab::error::AppError;
use agent_lab::workflows::application::{
    ApplicantField, ApplicantRecord, ApplicantRecordExtractor, ApplicationAssistantService,
    JsonFileSnapshotStore, SessionId, SessionRepository, SnapshotStore,
};
use agent_lab::workflows::reflex::{Room, VacuumWorld};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ChatArgs {
    /// Plain-text resume to pre-fill the record before chatting
    #[arg(long)]
    pub(crate) resume: Option<PathBuf>,
    /// Pick up the record an earlier chat saved to the snapshot path
    #[arg(long = "continue")]
    pub(crate) continue_saved: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// Chat-style text to run through the conversational rules
    #[arg(long, required_unless_present = "resume")]
    pub(crate) text: Option<String>,
    /// Plain-text resume to run through the resume rules first
    #[arg(long)]
    pub(crate) resume: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct VacuumArgs {
    /// Number of agent steps to simulate
    #[arg(long, default_value_t = VacuumWorld::DEFAULT_STEPS)]
    pub(crate) steps: usize,
    /// Rooms that start dirty, comma separated (defaults to Room2)
    #[arg(long, value_delimiter = ',')]
    pub(crate) dirty: Vec<Room>,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    record: ApplicantRecord,
    matched: Vec<ApplicantField>,
    complete: bool,
    missing: Vec<ApplicantField>,
    status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatEnd {
    Completed,
    Exited,
    InputClosed,
}

pub(crate) fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(JsonFileSnapshotStore::single_file(
        config.intake.snapshot_path,
    ));
    let service = ApplicationAssistantService::new(
        Arc::new(InMemorySessionRepository::default()),
        store.clone(),
    );
    let session_id = service.start_session()?.session_id;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.continue_saved && load_saved_record(&service, &store, &session_id, &mut out)? {
        finish(&service, &session_id, &mut out)?;
        return Ok(());
    }

    if let Some(path) = args.resume {
        let text = fs::read_to_string(&path)?;
        let outcome = service.import_resume(&session_id, &text)?;
        writeln!(out, "Read resume {}: {}", path.display(), outcome.acknowledgement)?;
        if outcome.complete {
            finish(&service, &session_id, &mut out)?;
            return Ok(());
        }
    }

    let stdin = io::stdin();
    chat_loop(&service, &session_id, stdin.lock(), &mut out)?;
    Ok(())
}

pub(crate) fn chat_loop<R, S, I, O>(
    service: &ApplicationAssistantService<R, S>,
    session_id: &SessionId,
    input: I,
    out: &mut O,
) -> Result<ChatEnd, AppError>
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
    I: BufRead,
    O: Write,
{
    writeln!(
        out,
        "Hi! I'm your job application assistant. Please tell me your name, email, and skills."
    )?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            writeln!(out, "Bye! Good luck.")?;
            return Ok(ChatEnd::Exited);
        }
        if trimmed.is_empty() {
            continue;
        }

        let outcome = service.submit_message(session_id, trimmed)?;
        writeln!(out, "Bot: {}", outcome.acknowledgement)?;
        writeln!(out, "Status: {}", outcome.status)?;

        if outcome.complete {
            finish(service, session_id, out)?;
            return Ok(ChatEnd::Completed);
        }
    }

    Ok(ChatEnd::InputClosed)
}

/// Loads the previously saved record into the session. Returns whether it is
/// already complete.
fn load_saved_record<R, O>(
    service: &ApplicationAssistantService<R, JsonFileSnapshotStore>,
    store: &JsonFileSnapshotStore,
    session_id: &SessionId,
    out: &mut O,
) -> Result<bool, AppError>
where
    R: SessionRepository + 'static,
    O: Write,
{
    match store.load(session_id)? {
        Some(saved) => {
            let session = service.restore(session_id, saved)?;
            writeln!(
                out,
                "Picked up your saved details. {}",
                session.record.status_line()
            )?;
            Ok(session.record.is_complete())
        }
        None => {
            writeln!(out, "No saved application info found, starting fresh.")?;
            Ok(false)
        }
    }
}

fn finish<R, S, O>(
    service: &ApplicationAssistantService<R, S>,
    session_id: &SessionId,
    out: &mut O,
) -> Result<(), AppError>
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
    O: Write,
{
    let session = service.get(session_id)?;
    let location = match session.last_snapshot {
        Some(location) => location,
        None => service.snapshot(session_id)?.location,
    };
    writeln!(out, "Application info complete! Saved to {location}")?;
    write!(out, "{}", session.record.summary())?;
    Ok(())
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let resume_text = args.resume.map(fs::read_to_string).transpose()?;
    let response = extract_once(resume_text.as_deref(), args.text.as_deref());
    let json = serde_json::to_string_pretty(&response)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    println!("{json}");
    Ok(())
}

fn extract_once(resume: Option<&str>, text: Option<&str>) -> ExtractResponse {
    let mut record = ApplicantRecord::new();
    let mut matched = Vec::new();

    if let Some(resume) = resume {
        let report = ApplicantRecordExtractor::resume().extract(resume, record);
        matched.extend(report.matched);
        record = report.record;
    }
    if let Some(text) = text {
        let report = ApplicantRecordExtractor::conversational().extract(text, record);
        matched.extend(report.matched);
        record = report.record;
    }

    matched.sort();
    matched.dedup();
    ExtractResponse {
        complete: record.is_complete(),
        missing: record.missing_fields(),
        status: record.status_line(),
        record,
        matched,
    }
}

pub(crate) fn run_vacuum(args: VacuumArgs) -> Result<(), AppError> {
    let world = if args.dirty.is_empty() {
        VacuumWorld::default()
    } else {
        VacuumWorld::with_dirty(&args.dirty)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    simulate(world, args.steps, &mut out)?;
    Ok(())
}

fn simulate<O: Write>(mut world: VacuumWorld, steps: usize, out: &mut O) -> io::Result<()> {
    for _ in 0..steps {
        let agent = world.agent();
        let grid = world.render();
        let step = world.step();
        writeln!(
            out,
            "Step {} --> Agent in {}: perceived {:?}, action {:?}",
            step.step, agent, step.perceived, step.action
        )?;
        write!(out, "{grid}")?;
    }

    writeln!(out, "Simulation complete.")?;
    writeln!(out, "Final Environment State:")?;
    for room in Room::ALL {
        writeln!(out, "- {}: {:?}", room, world.state(room))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_lab::workflows::application::{SnapshotError, SnapshotReceipt};
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSnapshots {
        saved: Mutex<Vec<ApplicantRecord>>,
    }

    impl SnapshotStore for RecordingSnapshots {
        fn save(
            &self,
            _session_id: &SessionId,
            record: &ApplicantRecord,
        ) -> Result<SnapshotReceipt, SnapshotError> {
            self.saved.lock().unwrap().push(record.clone());
            Ok(SnapshotReceipt {
                location: "memory://snapshot".to_string(),
            })
        }
    }

    fn chat(script: &str) -> (ChatEnd, String, Arc<RecordingSnapshots>) {
        let snapshots = Arc::new(RecordingSnapshots::default());
        let service = ApplicationAssistantService::new(
            Arc::new(InMemorySessionRepository::default()),
            snapshots.clone(),
        );
        let session_id = service.start_session().unwrap().session_id;
        let mut out = Vec::new();
        let end = chat_loop(&service, &session_id, Cursor::new(script), &mut out).unwrap();
        (end, String::from_utf8(out).unwrap(), snapshots)
    }

    #[test]
    fn chat_stops_once_record_is_complete() {
        let (end, transcript, snapshots) = chat(
            "my name is Jane Doe\njane@example.com\nmy skills are Rust\nthis line is never read\n",
        );

        assert_eq!(end, ChatEnd::Completed);
        assert!(transcript.contains("Status: Still missing: email, skills"));
        assert!(transcript.contains("Application info complete! Saved to memory://snapshot"));
        assert!(transcript.ends_with("Name: Jane Doe\nEmail: jane@example.com\nSkills: Rust\n"));
        assert_eq!(snapshots.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn chat_honours_exit_and_skips_blank_lines() {
        let (end, transcript, snapshots) = chat("\n   \nQUIT\nmy name is Jane Doe\n");
        assert_eq!(end, ChatEnd::Exited);
        assert!(transcript.ends_with("Bye! Good luck.\n"));
        assert!(!transcript.contains("Bot:"));
        assert!(snapshots.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn chat_reports_closed_input() {
        let (end, transcript, _) = chat("hello\n");
        assert_eq!(end, ChatEnd::InputClosed);
        assert!(transcript.contains("Bot: I couldn't extract any info."));
    }

    fn file_backed_chat(
        dir: &std::path::Path,
    ) -> (
        ApplicationAssistantService<InMemorySessionRepository, JsonFileSnapshotStore>,
        Arc<JsonFileSnapshotStore>,
        SessionId,
    ) {
        let store = Arc::new(JsonFileSnapshotStore::single_file(
            dir.join("application_info.json"),
        ));
        let service = ApplicationAssistantService::new(
            Arc::new(InMemorySessionRepository::default()),
            store.clone(),
        );
        let session_id = service.start_session().unwrap().session_id;
        (service, store, session_id)
    }

    #[test]
    fn continue_picks_up_a_partial_record() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store, first) = file_backed_chat(dir.path());
        service.submit_message(&first, "my name is Jane Doe").unwrap();
        service.snapshot(&first).unwrap();

        let (service, _, second) = file_backed_chat(dir.path());
        let mut out = Vec::new();
        let complete = load_saved_record(&service, &store, &second, &mut out).unwrap();

        assert!(!complete);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Picked up your saved details. Still missing: email, skills\n"
        );
        assert_eq!(
            service.get(&second).unwrap().record.name.as_deref(),
            Some("Jane Doe")
        );
    }

    #[test]
    fn continue_without_saved_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store, session_id) = file_backed_chat(dir.path());
        let mut out = Vec::new();

        assert!(!load_saved_record(&service, &store, &session_id, &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("No saved application info"));
        assert_eq!(service.get(&session_id).unwrap().record.missing_fields().len(), 3);
    }

    #[test]
    fn extract_once_applies_resume_then_chat_rules() {
        let response = extract_once(
            Some("Jane Doe\njane@example.com\n\nSkills: Rust\n"),
            Some("actually my skills are Rust and Go"),
        );
        assert!(response.complete);
        assert_eq!(response.record.skills.as_deref(), Some("Rust and Go"));
        assert_eq!(response.matched, ApplicantField::ALL.to_vec());
    }

    #[test]
    fn vacuum_simulation_prints_final_state() {
        let mut out = Vec::new();
        simulate(VacuumWorld::default(), 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Step 1 --> Agent in Room1: perceived Clean, action Move\n"));
        assert!(text.contains("Step 2 --> Agent in Room2: perceived Dirty, action Clean\n"));
        assert!(text.contains("- Room2: Clean\n"));
    }
}
