use crate::error::{GradebookError, Result};
use crate::grade::{self, Category};
use crate::identifier::is_valid_identifier;
use crate::store::{RecordStore, StudentRecord};

/// Business operations over the record store.
pub struct RecordManager {
    store: RecordStore,
}

impl RecordManager {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn list_students(&self) -> Result<Vec<StudentRecord>> {
        self.store.list_all()
    }

    pub fn add_student(
        &self,
        identifier: &str,
        last_names: &str,
        first_name: &str,
        score: f64,
    ) -> Result<StudentRecord> {
        if !is_valid_identifier(identifier) {
            tracing::debug!(identifier, "rejected student with malformed identifier");
            return Err(GradebookError::InvalidIdentifier);
        }
        if self.store.exists(identifier)? {
            tracing::debug!(identifier, "rejected duplicate student");
            return Err(GradebookError::DuplicateKey);
        }

        let record = StudentRecord {
            identifier: identifier.to_string(),
            last_names: last_names.to_string(),
            first_name: first_name.to_string(),
            score,
            category: grade::classify(score),
        };
        self.store.insert(&record)?;
        tracing::info!(identifier, category = %record.category, "student added");
        Ok(record)
    }

    /// Succeeds whether or not the student existed; the flag says which.
    pub fn remove_student(&self, identifier: &str) -> Result<bool> {
        let removed = self.store.delete(identifier)?;
        tracing::info!(identifier, removed, "student removal");
        Ok(removed)
    }

    pub fn get_score(&self, identifier: &str) -> Result<(f64, Category)> {
        self.store
            .get(identifier)?
            .map(|r| (r.score, r.category))
            .ok_or(GradebookError::NotFound)
    }

    pub fn update_score(&self, identifier: &str, new_score: f64) -> Result<(f64, Category)> {
        let category = grade::classify(new_score);
        if !self.store.update_score(identifier, new_score, category)? {
            return Err(GradebookError::NotFound);
        }
        tracing::info!(identifier, category = %category, "score updated");
        Ok((new_score, category))
    }

    pub fn list_failing(&self) -> Result<Vec<StudentRecord>> {
        self.store.list_by_category(&[Category::Fail])
    }

    pub fn list_passing(&self) -> Result<Vec<StudentRecord>> {
        self.store.list_by_category(&Category::PASSING)
    }

    pub fn list_honors_candidates(&self) -> Result<Vec<StudentRecord>> {
        self.store.list_by_category(&[Category::Outstanding])
    }

    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

pub fn format_record(r: &StudentRecord) -> String {
    format!(
        "{} {}, {} {} {}",
        r.identifier,
        r.last_names,
        r.first_name,
        grade::format_score(r.score),
        r.category
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn manager() -> RecordManager {
        let store = RecordStore::new(Connection::open_in_memory().expect("open"));
        store.ensure_schema().expect("schema");
        RecordManager::new(store)
    }

    fn ids(v: Vec<StudentRecord>) -> Vec<String> {
        v.into_iter().map(|r| r.identifier).collect()
    }

    #[test]
    fn add_then_get_score_returns_what_was_written() {
        let m = manager();
        let r = m
            .add_student("1234567890", "Garcia", "Ana", 6.5)
            .expect("add");
        assert_eq!(r.category, Category::Pass);
        assert_eq!(m.get_score("1234567890").expect("get"), (6.5, Category::Pass));
    }

    #[test]
    fn passing_student_is_listed_as_passing_not_failing() {
        let m = manager();
        m.add_student("1234567890", "Garcia", "Ana", 6.5)
            .expect("add");
        assert_eq!(ids(m.list_passing().expect("passing")), vec!["1234567890"]);
        assert!(m.list_failing().expect("failing").is_empty());
        assert!(m.list_honors_candidates().expect("honors").is_empty());
    }

    #[test]
    fn outstanding_student_is_an_honors_candidate() {
        let m = manager();
        let r = m
            .add_student("1234567890", "Garcia", "Ana", 9.5)
            .expect("add");
        assert_eq!(r.category, Category::Outstanding);
        assert_eq!(
            ids(m.list_honors_candidates().expect("honors")),
            vec!["1234567890"]
        );
        assert_eq!(ids(m.list_passing().expect("passing")), vec!["1234567890"]);
    }

    #[test]
    fn short_identifier_is_rejected_and_nothing_persists() {
        let m = manager();
        let err = m.add_student("123", "A", "B", 5.0).expect_err("invalid");
        assert!(matches!(err, GradebookError::InvalidIdentifier));
        assert!(m.list_students().expect("list").is_empty());
    }

    #[test]
    fn second_add_with_same_identifier_is_a_duplicate() {
        let m = manager();
        m.add_student("9999999999", "Ruiz", "Luis", 4.0)
            .expect("first");
        let err = m
            .add_student("9999999999", "Other", "Name", 8.0)
            .expect_err("second");
        assert!(matches!(err, GradebookError::DuplicateKey));
        let all = m.list_students().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].last_names, "Ruiz");
        assert_eq!(all[0].category, Category::Fail);
    }

    #[test]
    fn update_score_recomputes_category() {
        let m = manager();
        m.add_student("1234567890", "Garcia", "Ana", 4.0)
            .expect("add");
        assert_eq!(
            m.update_score("1234567890", 7.0).expect("update"),
            (7.0, Category::Notable)
        );
        assert_eq!(
            m.get_score("1234567890").expect("get"),
            (7.0, Category::Notable)
        );
        assert!(m.list_failing().expect("failing").is_empty());
    }

    #[test]
    fn update_score_on_missing_student_is_not_found() {
        let m = manager();
        let err = m.update_score("1234567890", 7.0).expect_err("missing");
        assert!(matches!(err, GradebookError::NotFound));
    }

    #[test]
    fn remove_then_get_is_not_found() {
        let m = manager();
        m.add_student("1234567890", "Garcia", "Ana", 6.5)
            .expect("add");
        assert!(m.remove_student("1234567890").expect("remove"));
        assert!(matches!(
            m.get_score("1234567890"),
            Err(GradebookError::NotFound)
        ));
        // Removing again still succeeds.
        assert!(!m.remove_student("1234567890").expect("remove again"));
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        let m = manager();
        assert!(m.list_students().expect("list").is_empty());
    }

    #[test]
    fn format_record_matches_display_layout() {
        let r = StudentRecord {
            identifier: "1234567890".into(),
            last_names: "Garcia Lopez".into(),
            first_name: "Ana".into(),
            score: 7.0,
            category: Category::Notable,
        };
        assert_eq!(format_record(&r), "1234567890 Garcia Lopez, Ana 7.0 NT");
    }
}
