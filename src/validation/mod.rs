use std::fmt;

pub const CUSTOMER_NAME_MAX_LEN: usize = 100;
pub const TABLE_NUMBER_MAX_LEN: usize = 10;
pub const ITEM_NOTES_MAX_LEN: usize = 255;
pub const BOOTH_NAME_MAX_LEN: usize = 100;
pub const CONTACT_MAX_LEN: usize = 20;
pub const MENU_NAME_MAX_LEN: usize = 100;
pub const CATEGORY_MAX_LEN: usize = 20;
pub const ITEM_QUANTITY_MAX: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_positive(field: &'static str, value: i64) -> ValidationResult {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

/// Sanitizes and checks the customer name; returns the cleaned value.
pub fn clean_customer_name(value: &str) -> Result<String, ValidationError> {
    let name = sanitize_string(value);
    validate_required("customer_name", &name)?;
    validate_max_len("customer_name", &name, CUSTOMER_NAME_MAX_LEN)?;
    Ok(name)
}

pub fn clean_table_number(value: &str) -> Result<String, ValidationError> {
    let table = sanitize_string(value);
    validate_max_len("table_number", &table, TABLE_NUMBER_MAX_LEN)?;
    Ok(table)
}

pub fn clean_item_notes(value: &str) -> Result<String, ValidationError> {
    let notes = sanitize_string(value);
    validate_max_len("notes", &notes, ITEM_NOTES_MAX_LEN)?;
    Ok(notes)
}

pub fn clean_booth_name(value: &str) -> Result<String, ValidationError> {
    let name = sanitize_string(value);
    validate_required("name", &name)?;
    validate_max_len("name", &name, BOOTH_NAME_MAX_LEN)?;
    Ok(name)
}

pub fn clean_contact(value: &str) -> Result<String, ValidationError> {
    let contact = sanitize_string(value);
    validate_required("contact", &contact)?;
    validate_max_len("contact", &contact, CONTACT_MAX_LEN)?;

    if !contact.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new("contact", "must contain a phone number"));
    }

    if !contact
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | ' '))
    {
        return Err(ValidationError::new(
            "contact",
            "must contain only digits, spaces, '+' or '-'",
        ));
    }

    Ok(contact)
}

pub fn clean_menu_name(value: &str) -> Result<String, ValidationError> {
    let name = sanitize_string(value);
    validate_required("name", &name)?;
    validate_max_len("name", &name, MENU_NAME_MAX_LEN)?;
    Ok(name)
}

pub fn clean_category(value: &str) -> Result<String, ValidationError> {
    let category = sanitize_string(value).to_lowercase();
    validate_required("category", &category)?;
    validate_max_len("category", &category, CATEGORY_MAX_LEN)?;
    Ok(category)
}
