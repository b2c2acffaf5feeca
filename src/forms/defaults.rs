// src/forms/defaults.rs
//! The recruitment form seeded into an empty database

use super::models::FieldType;

pub struct DefaultField {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub subsection: &'static str,
    pub options: Option<&'static str>,
    pub required: bool,
    pub is_core: bool,
}

const PERSONAL: &str = "Personal Details";
const SPOUSE: &str = "Spouse's Details";
const CONTACT: &str = "Contact & Position";
const ACADEMIC: &str = "Academic Qualifications";
const ADDITIONAL: &str = "Additional Information";

const YES_NO: Option<&str> = Some("Yes, No");

const fn field(
    name: &'static str,
    label: &'static str,
    field_type: FieldType,
    subsection: &'static str,
) -> DefaultField {
    DefaultField {
        name,
        label,
        field_type,
        subsection,
        options: None,
        required: false,
        is_core: false,
    }
}

const fn choice(
    name: &'static str,
    label: &'static str,
    field_type: FieldType,
    subsection: &'static str,
    options: Option<&'static str>,
) -> DefaultField {
    DefaultField {
        options,
        ..field(name, label, field_type, subsection)
    }
}

const fn required(f: DefaultField) -> DefaultField {
    DefaultField { required: true, ..f }
}

const fn core(f: DefaultField) -> DefaultField {
    DefaultField {
        required: true,
        is_core: true,
        ..f
    }
}

use super::models::FieldType::{Date, Email, Number, Radio, Select, Tel, Text, Textarea};

static DEFAULT_FIELDS: [DefaultField; 50] = [
    // Personal Details
    core(field("name", "Full Name", Text, PERSONAL)),
    core(field("email", "Email Address", Email, PERSONAL)),
    required(field("dob", "Date of Birth", Date, PERSONAL)),
    field("place_of_birth", "Place of Birth", Text, PERSONAL),
    choice("gender", "Gender", Select, PERSONAL, Some("Male, Female, Other")),
    field("nationality", "Nationality", Text, PERSONAL),
    field("father_name", "Father's Name", Text, PERSONAL),
    choice(
        "blood_group",
        "Blood Group",
        Select,
        PERSONAL,
        Some("A+, A-, B+, B-, AB+, AB-, O+, O-"),
    ),
    field("pan_card", "PAN Card Number", Text, PERSONAL),
    choice(
        "marital_status",
        "Marital Status",
        Select,
        PERSONAL,
        Some("Single, Married, Divorced, Widowed"),
    ),
    // Spouse's Details
    field("spouse_name", "Spouse's Name", Text, SPOUSE),
    field("spouse_employment", "Spouse's Employment Status", Text, SPOUSE),
    field("spouse_work_details", "Spouse Work Details", Textarea, SPOUSE),
    field("children_count", "Number of Children", Number, SPOUSE),
    // Contact & Position
    required(field("mobile_number", "Mobile Number", Tel, CONTACT)),
    choice(
        "business_entity",
        "Business Entity",
        Select,
        CONTACT,
        Some("SIL, ZIL, ZMSL, ZIIL"),
    ),
    choice(
        "post_applying_for",
        "Post Applying For",
        Select,
        CONTACT,
        Some("Intern, Civil Engineer, Graduate Engineer Trainee, Software Developer Trainee, Data Analyst Trainee, Business Development Executive, Human Resources Trainee, Marketing Trainee"),
    ),
    choice(
        "location_of_position",
        "Location of Position",
        Select,
        CONTACT,
        Some("Gurugram, Pune, Bangalore"),
    ),
    required(field("present_address", "Present Address", Textarea, CONTACT)),
    field("permanent_address", "Permanent Address", Textarea, CONTACT),
    field("hobbies", "Hobbies / Leisure Activities", Text, CONTACT),
    // Academic Qualifications
    field("qualification_10th_school", "10th School/College", Text, ACADEMIC),
    field("qualification_10th_board", "10th Board", Text, ACADEMIC),
    field("qualification_10th_subjects", "10th Main Subjects", Text, ACADEMIC),
    field("qualification_10th_year", "10th Year of Passing", Text, ACADEMIC),
    field("qualification_10th_marks", "10th % Marks / CGPA", Text, ACADEMIC),
    field("qualification_10th_division", "10th Division/Class", Text, ACADEMIC),
    field("qualification_12th_school", "12th School/College", Text, ACADEMIC),
    field("qualification_12th_board", "12th Board/University", Text, ACADEMIC),
    field(
        "qualification_12th_specialization",
        "12th Course Specialization",
        Text,
        ACADEMIC,
    ),
    field("qualification_12th_year", "12th Year of Passing", Text, ACADEMIC),
    field("qualification_12th_marks", "12th % Marks / CGPA", Text, ACADEMIC),
    field("qualification_12th_division", "12th Division/Class", Text, ACADEMIC),
    field(
        "qualification_grad_school",
        "Graduation Institute/College",
        Text,
        ACADEMIC,
    ),
    field("qualification_grad_course", "Graduation Course", Text, ACADEMIC),
    field(
        "qualification_grad_specialization",
        "Graduation Course Specialization",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_grad_year",
        "Graduation Year of Passing",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_grad_marks",
        "Graduation % Marks / CGPA",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_grad_division",
        "Graduation Division/Class",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_pg_school",
        "Post-Graduation Institute/College",
        Text,
        ACADEMIC,
    ),
    field("qualification_pg_course", "Post-Graduation Course", Text, ACADEMIC),
    field(
        "qualification_pg_specialization",
        "Post-Graduation Course Specialization",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_pg_year",
        "Post-Graduation Year of Passing",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_pg_marks",
        "Post-Graduation % Marks / CGPA",
        Text,
        ACADEMIC,
    ),
    field(
        "qualification_pg_division",
        "Post-Graduation Division/Class",
        Text,
        ACADEMIC,
    ),
    // Additional Information
    choice(
        "previously_applied",
        "Have you applied with us earlier?",
        Radio,
        ADDITIONAL,
        YES_NO,
    ),
    choice(
        "related_employee",
        "Are you related to any employee?",
        Radio,
        ADDITIONAL,
        YES_NO,
    ),
    field(
        "related_employee_details",
        "If yes, provide details",
        Textarea,
        ADDITIONAL,
    ),
    choice(
        "legal_cases",
        "Are there any criminal/civil cases against you?",
        Radio,
        ADDITIONAL,
        YES_NO,
    ),
    field(
        "legal_cases_details",
        "If yes, provide details",
        Textarea,
        ADDITIONAL,
    ),
];

pub fn default_fields() -> &'static [DefaultField] {
    &DEFAULT_FIELDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::schema::validate_column_name;
    use std::collections::HashSet;

    #[test]
    fn test_default_names_are_unique_and_valid() {
        let mut seen = HashSet::new();
        for f in default_fields() {
            assert!(seen.insert(f.name), "duplicate default field {}", f.name);
            assert!(validate_column_name(f.name).is_ok(), "bad name {}", f.name);
        }
    }

    #[test]
    fn test_only_name_and_email_are_core() {
        let core: Vec<&str> = default_fields()
            .iter()
            .filter(|f| f.is_core)
            .map(|f| f.name)
            .collect();
        assert_eq!(core, vec!["name", "email"]);
    }

    #[test]
    fn test_choice_fields_have_options() {
        for f in default_fields() {
            if f.field_type.needs_options() {
                assert!(f.options.is_some(), "{} has no options", f.name);
            }
        }
    }
}
