use crate::models::{CompanyRecord, StudentRecord};

pub const MIN_ELIGIBLE_CGPA: f64 = 6.5;

/// Eligible for placement drives: CGPA of at least 6.5 and no backlogs.
pub fn is_eligible(student: &StudentRecord) -> bool {
    student.cgpa >= MIN_ELIGIBLE_CGPA && student.backlogs == 0
}

/// Companies whose CGPA floor the student clears and whose required domain
/// equals the student's interest exactly. Keeps table order.
pub fn matching_companies<'a>(
    student: &StudentRecord,
    companies: &'a [CompanyRecord],
) -> Vec<&'a CompanyRecord> {
    companies
        .iter()
        .filter(|company| {
            company.min_cgpa <= student.cgpa && company.required_domain == student.domain_interest
        })
        .collect()
}
