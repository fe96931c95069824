use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;

use crate::error::GradebookError;
use crate::grade;
use crate::manager::{format_record, RecordManager};
use crate::session::SessionGate;
use crate::store::{RecordStore, StudentRecord};

pub const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddStudent,
    ListStudents,
    ListPassing,
    ListFailing,
    ListHonors,
    LookupScore,
    UpdateScore,
    RemoveStudent,
    Exit,
}

const MENU: &[(&str, &str, MenuAction)] = &[
    ("1", "Add student", MenuAction::AddStudent),
    ("2", "List students", MenuAction::ListStudents),
    ("3", "List passing", MenuAction::ListPassing),
    ("4", "List failing", MenuAction::ListFailing),
    ("5", "List honors candidates", MenuAction::ListHonors),
    ("6", "Look up score", MenuAction::LookupScore),
    ("7", "Update score", MenuAction::UpdateScore),
    ("8", "Remove student", MenuAction::RemoveStudent),
    ("0", "Exit", MenuAction::Exit),
];

fn current_time_label() -> String {
    chrono::Local::now().format(CLOCK_FORMAT).to_string()
}

/// Opens the workspace, runs the login gate, then the main menu until the
/// user exits or input ends.
pub fn run<R: BufRead, W: Write>(workspace: &Path, input: R, output: W) -> anyhow::Result<()> {
    let store = RecordStore::open(workspace)?;
    let mut shell = Shell::new(input, output);

    let mut gate = SessionGate::new();
    if !shell.login(&mut gate)? {
        tracing::debug!("input closed before login");
        return Ok(());
    }

    let manager = RecordManager::new(store);
    shell.main_menu(&manager)?;
    manager.close().context("close database")?;
    Ok(())
}

/// Terminal rendition of the login form, the main menu and the record forms.
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// `None` once input is exhausted. Bytes that are not UTF-8 become
    /// U+FFFD instead of failing the read.
    fn read_field(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn notify(&mut self, kind: Notice, title: &str, body: &str) -> io::Result<()> {
        let tag = match kind {
            Notice::Info => "info",
            Notice::Error => "error",
        };
        writeln!(self.output, "[{tag}] {title}")?;
        for line in body.lines() {
            writeln!(self.output, "  {line}")?;
        }
        self.output.flush()
    }

    fn notify_error(&mut self, e: &GradebookError) -> io::Result<()> {
        if !e.is_user_error() {
            tracing::error!(error = %e, "operation failed");
        }
        let message = match e {
            GradebookError::InvalidIdentifier => "The identifier must be exactly 10 digits.".to_string(),
            GradebookError::DuplicateKey => "A student with this identifier already exists.".to_string(),
            GradebookError::NotFound => "No student with this identifier.".to_string(),
            GradebookError::InvalidScore(m) => {
                let mut m = m.clone();
                if let Some(first) = m.get_mut(..1) {
                    first.make_ascii_uppercase();
                }
                format!("{m}.")
            }
            other => other.to_string(),
        };
        self.notify(Notice::Error, "Error", &message)
    }

    /// Returns false if input ends before a valid identifier is entered.
    pub fn login(&mut self, gate: &mut SessionGate) -> io::Result<bool> {
        writeln!(self.output, "== Welcome, teacher ==")?;
        loop {
            let Some(identifier) = self.read_field("Identifier")? else {
                return Ok(false);
            };
            match gate.submit(&identifier) {
                Ok(()) => return Ok(true),
                Err(e) => self.notify_error(&e)?,
            }
        }
    }

    fn render_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "== Main menu ==")?;
        writeln!(self.output, "{}", current_time_label())?;
        for (key, label, _) in MENU {
            writeln!(self.output, " {key}) {label}")?;
        }
        Ok(())
    }

    pub fn main_menu(&mut self, manager: &RecordManager) -> io::Result<()> {
        loop {
            self.render_menu()?;
            let prompt = format!("[{}] Choice", current_time_label());
            let Some(choice) = self.read_field(&prompt)? else {
                return Ok(());
            };
            let choice = choice.trim();
            let Some(&(_, _, action)) = MENU.iter().find(|(key, _, _)| *key == choice) else {
                self.notify(Notice::Error, "Error", &format!("Unknown option: {choice}"))?;
                continue;
            };

            match action {
                MenuAction::AddStudent => self.add_student_form(manager)?,
                MenuAction::ListStudents => self.show_listing(
                    "Students",
                    "No students registered.",
                    manager.list_students(),
                )?,
                MenuAction::ListPassing => {
                    self.show_listing("Passing", "No passing students.", manager.list_passing())?
                }
                MenuAction::ListFailing => {
                    self.show_listing("Failing", "No failing students.", manager.list_failing())?
                }
                MenuAction::ListHonors => self.show_listing(
                    "Honors candidates",
                    "No candidates.",
                    manager.list_honors_candidates(),
                )?,
                MenuAction::LookupScore => self.lookup_form(manager)?,
                MenuAction::UpdateScore => self.update_form(manager)?,
                MenuAction::RemoveStudent => self.remove_form(manager)?,
                MenuAction::Exit => return Ok(()),
            }
        }
    }

    fn show_listing(
        &mut self,
        title: &str,
        empty: &str,
        rows: crate::error::Result<Vec<StudentRecord>>,
    ) -> io::Result<()> {
        match rows {
            Ok(rows) if rows.is_empty() => self.notify(Notice::Info, title, empty),
            Ok(rows) => {
                let body = rows.iter().map(format_record).collect::<Vec<_>>().join("\n");
                self.notify(Notice::Info, title, &body)
            }
            Err(e) => self.notify_error(&e),
        }
    }

    /// Modal add form. A bad score keeps the form open and re-asks only the
    /// score; any other outcome closes it.
    fn add_student_form(&mut self, manager: &RecordManager) -> io::Result<()> {
        writeln!(self.output, "-- Add student --")?;
        let Some(identifier) = self.read_field("Identifier")? else {
            return Ok(());
        };
        let Some(last_names) = self.read_field("Last names")? else {
            return Ok(());
        };
        let Some(first_name) = self.read_field("First name")? else {
            return Ok(());
        };
        let Some(mut score_text) = self.read_field("Score")? else {
            return Ok(());
        };

        loop {
            let Some(action) = self.read_field("[S]ave / [C]ancel")? else {
                return Ok(());
            };
            match action.trim().to_ascii_lowercase().as_str() {
                "s" | "save" => {}
                "c" | "cancel" => return Ok(()),
                _ => continue,
            }

            let score = match grade::parse_score(&score_text) {
                Ok(s) => s,
                Err(e) => {
                    self.notify_error(&e)?;
                    let Some(text) = self.read_field("Score")? else {
                        return Ok(());
                    };
                    score_text = text;
                    continue;
                }
            };

            return match manager.add_student(&identifier, &last_names, &first_name, score) {
                Ok(_) => self.notify(Notice::Info, "Success", "Student added."),
                Err(e) => self.notify_error(&e),
            };
        }
    }

    fn lookup_form(&mut self, manager: &RecordManager) -> io::Result<()> {
        let Some(identifier) = self.read_field("Identifier")? else {
            return Ok(());
        };
        match manager.get_score(&identifier) {
            Ok((score, category)) => self.notify(
                Notice::Info,
                "Score",
                &format!(
                    "Score: {}, Category: {} ({})",
                    grade::format_score(score),
                    category,
                    category.label()
                ),
            ),
            Err(e) => self.notify_error(&e),
        }
    }

    fn update_form(&mut self, manager: &RecordManager) -> io::Result<()> {
        let Some(identifier) = self.read_field("Identifier")? else {
            return Ok(());
        };
        let Some(score_text) = self.read_field("New score")? else {
            return Ok(());
        };
        let result = grade::parse_score(&score_text)
            .and_then(|score| manager.update_score(&identifier, score));
        match result {
            Ok((score, category)) => self.notify(
                Notice::Info,
                "Success",
                &format!("Score updated: {} ({}).", grade::format_score(score), category),
            ),
            Err(e) => self.notify_error(&e),
        }
    }

    fn remove_form(&mut self, manager: &RecordManager) -> io::Result<()> {
        let Some(identifier) = self.read_field("Identifier")? else {
            return Ok(());
        };
        match manager.remove_student(&identifier) {
            Ok(true) => self.notify(Notice::Info, "Success", "Student removed."),
            Ok(false) => self.notify(Notice::Info, "Success", "Nothing to remove."),
            Err(e) => self.notify_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::io::Cursor;

    fn manager() -> RecordManager {
        let store = RecordStore::new(Connection::open_in_memory().expect("open"));
        store.ensure_schema().expect("schema");
        RecordManager::new(store)
    }

    fn drive_menu(manager: &RecordManager, script: &str) -> String {
        let mut out = Vec::new();
        let mut shell = Shell::new(Cursor::new(script.to_string()), &mut out);
        shell.main_menu(manager).expect("menu");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn login_reprompts_until_identifier_is_valid() {
        let mut out = Vec::new();
        let mut shell = Shell::new(Cursor::new("12\n0123456789\n"), &mut out);
        let mut gate = SessionGate::new();
        assert!(shell.login(&mut gate).expect("login"));
        assert_eq!(gate.teacher_id(), Some("0123456789"));
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("The identifier must be exactly 10 digits."));
    }

    #[test]
    fn login_gives_up_at_end_of_input() {
        let mut out = Vec::new();
        let mut shell = Shell::new(Cursor::new("abc\n"), &mut out);
        let mut gate = SessionGate::new();
        assert!(!shell.login(&mut gate).expect("login"));
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn add_form_saves_and_list_shows_record() {
        let m = manager();
        let out = drive_menu(&m, "1\n1234567890\nGarcia\nAna\n6.5\ns\n2\n3\n4\n0\n");
        assert!(out.contains("[info] Success\n  Student added."));
        assert!(out.contains("[info] Students\n  1234567890 Garcia, Ana 6.5 AP"));
        assert!(out.contains("[info] Passing\n  1234567890 Garcia, Ana 6.5 AP"));
        assert!(out.contains("[info] Failing\n  No failing students."));
        assert!(out.contains("== Main menu =="));
    }

    #[test]
    fn bad_score_reasks_only_the_score() {
        let m = manager();
        let out = drive_menu(&m, "1\n1234567890\nGarcia\nAna\nabc\ns\n11\ns\n9.5\ns\n0\n");
        assert!(out.contains("Score must be a number."));
        assert!(out.contains("Score must be between 0 and 10."));
        assert_eq!(
            m.get_score("1234567890").expect("saved"),
            (9.5, grade::Category::Outstanding)
        );
    }

    #[test]
    fn cancel_discards_the_form() {
        let m = manager();
        let out = drive_menu(&m, "1\n1234567890\nGarcia\nAna\n6\nc\n2\n0\n");
        assert!(out.contains("No students registered."));
        assert!(m.list_students().expect("list").is_empty());
    }

    #[test]
    fn manager_errors_are_shown_and_menu_continues() {
        let m = manager();
        let out = drive_menu(
            &m,
            "1\n123\nA\nB\n5\ns\n1\n9999999999\nA\nB\n5\ns\n1\n9999999999\nC\nD\n7\ns\n2\n0\n",
        );
        assert!(out.contains("The identifier must be exactly 10 digits."));
        assert!(out.contains("A student with this identifier already exists."));
        assert!(out.contains("9999999999 A, B 5.0 AP"));
        assert!(!out.contains("9999999999 C, D"));
    }

    #[test]
    fn lookup_update_and_remove_round_trip() {
        let m = manager();
        m.add_student("1234567890", "Garcia", "Ana", 4.0)
            .expect("add");
        let out = drive_menu(
            &m,
            "6\n1234567890\n7\n1234567890\n9\n5\n7\n0000000000\n5\n8\n1234567890\n6\n1234567890\n8\n1234567890\n0\n",
        );
        assert!(out.contains("Score: 4.0, Category: SS (fail)"));
        assert!(out.contains("Score updated: 9.0 (SB)."));
        assert!(out.contains("[info] Honors candidates\n  1234567890 Garcia, Ana 9.0 SB"));
        assert!(out.contains("No student with this identifier."));
        assert!(out.contains("Student removed."));
        assert!(out.contains("Nothing to remove."));
    }

    #[test]
    fn non_utf8_input_is_kept_lossily_and_the_menu_continues() {
        let m = manager();
        let script: &[u8] = b"1\n1234567890\nGarc\xeda\nAna\n6.5\ns\n2\n0\n";
        let mut out = Vec::new();
        let mut shell = Shell::new(Cursor::new(script), &mut out);
        shell.main_menu(&m).expect("menu");
        let out = String::from_utf8(out).expect("utf8");

        assert!(out.contains("Student added."));
        let all = m.list_students().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].last_names, "Garc\u{FFFD}a");
        assert_eq!(all[0].category, grade::Category::Pass);
    }

    #[test]
    fn choice_prompt_carries_the_current_time() {
        let m = manager();
        let out = drive_menu(&m, "0\n");
        let prompt = out
            .lines()
            .find(|l| l.ends_with("] Choice: "))
            .expect("choice prompt");
        let stamp = prompt
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix("] Choice: "))
            .expect("bracketed time");
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, CLOCK_FORMAT).is_ok());
    }

    #[test]
    fn unknown_option_is_reported() {
        let m = manager();
        let out = drive_menu(&m, "42\n0\n");
        assert!(out.contains("Unknown option: 42"));
    }

    #[test]
    fn run_logs_in_adds_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = "0123456789\n1\n1234567890\nGarcia\nAna\n8\ns\n0\n";
        let mut out = Vec::new();
        run(dir.path(), Cursor::new(script), &mut out).expect("run");

        let m = RecordManager::new(RecordStore::open(dir.path()).expect("reopen"));
        assert_eq!(
            m.get_score("1234567890").expect("persisted"),
            (8.0, grade::Category::Notable)
        );
    }
}
