// src/forms/models.rs

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;

// ============================================================================
// Field Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
    Textarea,
    Url,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Number,
        FieldType::Date,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Textarea,
        FieldType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Textarea => "textarea",
            FieldType::Url => "url",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Select and radio fields are only meaningful with a list of options
    pub fn needs_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

// ============================================================================
// Field Configuration
// ============================================================================

/// Column list for reading `form_config` rows into `FormField`
pub const FIELD_COLUMNS: &str = "id, name, label, type, subsection, options, required, is_core, \
     COALESCE(field_order, 0) AS field_order, COALESCE(validations, '{}') AS validations";

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct FormField {
    pub id: i64,
    pub name: String,
    pub label: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub subsection: Option<String>,
    pub options: Option<String>,
    pub required: bool,
    pub is_core: bool,
    pub field_order: i64,
    pub validations: String,
}

impl FormField {
    /// Comma-separated options, trimmed, blanks dropped
    pub fn option_list(&self) -> Vec<String> {
        split_options(self.options.as_deref().unwrap_or(""))
    }

    /// Parsed validation rules; unreadable rules count as none
    pub fn rules(&self) -> ValidationRules {
        ValidationRules::parse(&self.validations).unwrap_or_default()
    }
}

pub fn split_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-field rules stored as JSON text in `form_config.validations`.
/// The dashboard editor writes the camelCase keys.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ValidationRules {
    #[serde(default, alias = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Replaces the generated message when any rule fails
    #[serde(default, alias = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationRules {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }
}

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct FormSection {
    pub name: String,
    #[sqlx(rename = "section_order")]
    #[serde(rename = "order")]
    pub order: i64,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Fields grouped by section, serialized as a JSON object in section order
#[derive(Debug, Default)]
pub struct OrderedSections(pub Vec<(String, Vec<FormField>)>);

impl OrderedSections {
    pub fn field_count(&self) -> usize {
        self.0.iter().map(|(_, fields)| fields.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OrderedSections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, fields) in &self.0 {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

/// Public form envelope. Built as a struct so `sections` keeps its order.
#[derive(Serialize, Debug)]
pub struct FormConfigResponse {
    pub success: bool,
    pub sections: OrderedSections,
    pub metadata: FormConfigMetadata,
}

#[derive(Serialize, Debug)]
pub struct FormConfigMetadata {
    pub total_fields: usize,
    pub total_sections: usize,
    pub timestamp: String,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Deserialize, Debug, Default)]
pub struct CreateFieldRequest {
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub subsection: Option<String>,
    pub options: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub required: Option<bool>,
    /// A JSON object, or the same object already encoded as a string
    pub validations: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateFieldRequest {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub subsection: Option<String>,
    pub options: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub required: Option<bool>,
    pub validations: Option<Value>,
}

impl UpdateFieldRequest {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.field_type.is_none()
            && self.subsection.is_none()
            && self.options.is_none()
            && self.required.is_none()
            && self.validations.is_none()
    }
}

/// `{"field_orders": [[id, order], ...]}`
#[derive(Deserialize, Debug, Default)]
pub struct ReorderFieldsRequest {
    #[serde(default)]
    pub field_orders: Vec<(i64, i64)>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub updates: Vec<BulkFieldUpdate>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BulkFieldUpdate {
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub required: Option<bool>,
    pub field_order: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateSectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateSectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReorderSectionsRequest {
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Validation rules as stored text. Strings are kept as given so they can be
/// checked; objects are re-encoded.
pub fn validations_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

/// Accepts `true`/`false`, `0`/`1` and their string forms
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().map(|v| v != 0.0).unwrap_or(false))),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" | "" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
        },
        Some(_) => Err(D::Error::custom("expected a boolean")),
    }
}
