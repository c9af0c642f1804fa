use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::models::{CompanyRecord, StudentRecord};

/// Student and company tables, loaded once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Roster {
    students: Vec<StudentRecord>,
    companies: Vec<CompanyRecord>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    pub fn new(students: Vec<StudentRecord>, companies: Vec<CompanyRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(students.len());
        for (index, student) in students.iter().enumerate() {
            if by_id.insert(student.student_id.clone(), index).is_some() {
                return Err(DashboardError::DuplicateStudent(student.student_id.clone()));
            }
        }

        Ok(Self {
            students,
            companies,
            by_id,
        })
    }

    pub fn load(students_path: &Path, companies_path: &Path) -> Result<Self> {
        let students = load_students(students_path)?;
        let companies = load_companies(companies_path)?;
        Self::new(students, companies)
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    pub fn find(&self, student_id: &str) -> Result<&StudentRecord> {
        self.by_id
            .get(student_id)
            .map(|&index| &self.students[index])
            .ok_or_else(|| DashboardError::StudentNotFound(student_id.to_string()))
    }
}

pub fn load_students(path: &Path) -> Result<Vec<StudentRecord>> {
    let students = read_table::<StudentRecord>(path)?;
    info!(path = %path.display(), count = students.len(), "Loaded student table");
    Ok(students)
}

pub fn load_companies(path: &Path) -> Result<Vec<CompanyRecord>> {
    let companies = read_table::<CompanyRecord>(path)?;
    info!(path = %path.display(), count = companies.len(), "Loaded company table");
    Ok(companies)
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let load_error = |source: csv::Error| DashboardError::DataLoad {
        path: path.to_path_buf(),
        line: source.position().map(|position| position.line()),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(load_error)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.map_err(load_error)?);
    }

    Ok(rows)
}

/// Resolves a student's photo inside `photos_dir` by file name only.
///
/// The stored path may come from another machine, so only its last component
/// is kept. Returns `None` when the file does not exist.
pub fn resolve_photo(photos_dir: &Path, photo_path: &str) -> Option<PathBuf> {
    let file_name = photo_path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty())?;

    let candidate = photos_dir.join(file_name);
    if candidate.is_file() {
        Some(candidate)
    } else {
        warn!(path = %candidate.display(), "Photo not found");
        None
    }
}
