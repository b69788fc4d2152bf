// src/inventory/validation.rs
// Request-body validation for projects and products.
//
// Bodies may come from JSON clients (typed values) or HTML forms (every value a
// string), so numeric rules accept both. Empty strings count as absent.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use super::repository::{ProjectRepository, StoreError};
use super::types::{NewProduct, NewProject, ProductPatch, ProjectPatch};

pub type Payload = Map<String, Value>;

const MAX_STRING_LEN: usize = 255;

/// Largest price a `decimal(10,2)` column holds.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// Stock is a 32-bit integer column.
pub const MAX_STOCK: i64 = i32::MAX as i64;

/// Field-level validation messages, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    fn total(&self) -> usize {
        self.fields.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// Headline message: the first error, plus how many others there are.
    pub fn summary(&self) -> String {
        let first = self
            .fields
            .first()
            .and_then(|(_, messages)| messages.first())
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());

        match self.total().saturating_sub(1) {
            0 => first,
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Validation either rejects the input or cannot run because the store failed.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationErrors> for InputError {
    fn from(errors: ValidationErrors) -> Self {
        InputError::Invalid(errors)
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

fn invalid_selection_message(field: &str) -> String {
    format!("The selected {} is invalid.", label(field))
}

/// Collects errors while reading typed values out of a payload.
struct FieldReader<'a> {
    payload: &'a Payload,
    errors: ValidationErrors,
}

/// What a field held after normalisation.
enum Field<'a> {
    Absent,
    Null,
    Value(&'a Value),
}

impl<'a> FieldReader<'a> {
    fn new(payload: &'a Payload) -> Self {
        Self {
            payload,
            errors: ValidationErrors::default(),
        }
    }

    fn field(&self, name: &str) -> Field<'a> {
        match self.payload.get(name) {
            None => Field::Absent,
            Some(Value::Null) => Field::Null,
            Some(Value::String(s)) if s.trim().is_empty() => Field::Null,
            Some(value) => Field::Value(value),
        }
    }

    fn string_value(&mut self, name: &str, value: &Value) -> Option<String> {
        let Value::String(s) = value else {
            self.errors
                .add(name, format!("The {} field must be a string.", label(name)));
            return None;
        };
        let s = s.trim();
        if s.chars().count() > MAX_STRING_LEN {
            self.errors.add(
                name,
                format!(
                    "The {} field must not be greater than {MAX_STRING_LEN} characters.",
                    label(name)
                ),
            );
            return None;
        }
        Some(s.to_string())
    }

    fn number_value(
        &mut self,
        name: &str,
        value: &Value,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite());

        let Some(number) = parsed else {
            self.errors
                .add(name, format!("The {} field must be a number.", label(name)));
            return None;
        };
        if let Some(min) = min {
            if number < min {
                self.errors
                    .add(name, format!("The {} field must be at least {min}.", label(name)));
                return None;
            }
        }
        if let Some(max) = max {
            if number > max {
                self.errors.add(
                    name,
                    format!("The {} field must not be greater than {max}.", label(name)),
                );
                return None;
            }
        }
        Some(number)
    }

    fn integer_value(
        &mut self,
        name: &str,
        value: &Value,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Option<i64> {
        let parsed = match value {
            // Whole floats only when they fit; `as` would saturate.
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| {
                        f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f)
                    })
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        let Some(integer) = parsed else {
            self.errors
                .add(name, format!("The {} field must be an integer.", label(name)));
            return None;
        };
        if let Some(min) = min {
            if integer < min {
                self.errors
                    .add(name, format!("The {} field must be at least {min}.", label(name)));
                return None;
            }
        }
        if let Some(max) = max {
            if integer > max {
                self.errors.add(
                    name,
                    format!("The {} field must not be greater than {max}.", label(name)),
                );
                return None;
            }
        }
        Some(integer)
    }

    // `required` rules: missing and null are both errors.

    fn required_string(&mut self, name: &str) -> Option<String> {
        match self.field(name) {
            Field::Value(value) => self.string_value(name, value),
            _ => {
                self.errors.add(name, required_message(name));
                None
            }
        }
    }

    fn required_number(&mut self, name: &str, min: Option<f64>, max: Option<f64>) -> Option<f64> {
        match self.field(name) {
            Field::Value(value) => self.number_value(name, value, min, max),
            _ => {
                self.errors.add(name, required_message(name));
                None
            }
        }
    }

    fn required_integer(&mut self, name: &str, min: Option<i64>, max: Option<i64>) -> Option<i64> {
        match self.field(name) {
            Field::Value(value) => self.integer_value(name, value, min, max),
            _ => {
                self.errors.add(name, required_message(name));
                None
            }
        }
    }

    // `nullable` rules: missing and null both read as None.

    fn nullable_string(&mut self, name: &str) -> Option<String> {
        match self.field(name) {
            Field::Value(value) => self.string_value(name, value),
            _ => None,
        }
    }

    fn nullable_number(&mut self, name: &str) -> Option<f64> {
        match self.field(name) {
            Field::Value(value) => self.number_value(name, value, None, None),
            _ => None,
        }
    }

    // `sometimes` rules for partial updates: only validated when present.

    fn sometimes<T>(
        &mut self,
        name: &str,
        read: impl FnOnce(&mut Self, &Value) -> Option<T>,
    ) -> Option<T> {
        match self.field(name) {
            Field::Absent => None,
            Field::Null => {
                self.errors.add(name, required_message(name));
                None
            }
            Field::Value(value) => read(self, value),
        }
    }

    /// Present field of a nullable column: `Some(None)` clears it.
    fn sometimes_nullable<T>(
        &mut self,
        name: &str,
        read: impl FnOnce(&mut Self, &Value) -> Option<T>,
    ) -> Option<Option<T>> {
        match self.field(name) {
            Field::Absent => None,
            Field::Null => Some(None),
            Field::Value(value) => read(self, value).map(Some),
        }
    }
}

pub fn new_project(payload: &Payload) -> Result<NewProject, ValidationErrors> {
    let mut reader = FieldReader::new(payload);

    let name = reader.required_string("name");
    let description = reader.nullable_string("description");
    let address = reader.nullable_string("address");
    let latitude = reader.nullable_number("latitude");
    let longitude = reader.nullable_number("longitude");

    reader.errors.into_result(NewProject {
        name: name.unwrap_or_default(),
        description,
        address,
        latitude,
        longitude,
    })
}

pub fn project_patch(payload: &Payload) -> Result<ProjectPatch, ValidationErrors> {
    let mut reader = FieldReader::new(payload);

    let patch = ProjectPatch {
        name: reader.sometimes("name", |r, v| r.string_value("name", v)),
        description: reader.sometimes_nullable("description", |r, v| r.string_value("description", v)),
        address: reader.sometimes_nullable("address", |r, v| r.string_value("address", v)),
        latitude: reader
            .sometimes_nullable("latitude", |r, v| r.number_value("latitude", v, None, None)),
        longitude: reader
            .sometimes_nullable("longitude", |r, v| r.number_value("longitude", v, None, None)),
    };

    reader.errors.into_result(patch)
}

/// Validate a new product, including that `project_id` names an existing project.
pub async fn new_product(
    payload: &Payload,
    projects: &dyn ProjectRepository,
) -> Result<NewProduct, InputError> {
    let mut reader = FieldReader::new(payload);

    let project_id = reader.required_integer("project_id", None, None);
    let name = reader.required_string("name");
    let sku = reader.required_string("sku");
    let price = reader.required_number("price", Some(0.0), Some(MAX_PRICE));
    let stock = reader.required_integer("stock", Some(0), Some(MAX_STOCK));

    if let Some(id) = project_id {
        if !projects.project_exists(id).await? {
            reader.errors.add("project_id", invalid_selection_message("project_id"));
        }
    }

    match (project_id, name, sku, price, stock) {
        (Some(project_id), Some(name), Some(sku), Some(price), Some(stock))
            if reader.errors.is_empty() =>
        {
            Ok(NewProduct {
                project_id,
                name,
                sku,
                price,
                stock,
            })
        }
        _ => Err(InputError::Invalid(reader.errors)),
    }
}

pub async fn product_patch(
    payload: &Payload,
    projects: &dyn ProjectRepository,
) -> Result<ProductPatch, InputError> {
    let mut reader = FieldReader::new(payload);

    let patch = ProductPatch {
        project_id: reader
            .sometimes("project_id", |r, v| r.integer_value("project_id", v, None, None)),
        name: reader.sometimes("name", |r, v| r.string_value("name", v)),
        sku: reader.sometimes("sku", |r, v| r.string_value("sku", v)),
        price: reader.sometimes("price", |r, v| {
            r.number_value("price", v, Some(0.0), Some(MAX_PRICE))
        }),
        stock: reader.sometimes("stock", |r, v| {
            r.integer_value("stock", v, Some(0), Some(MAX_STOCK))
        }),
    };

    if let Some(id) = patch.project_id {
        if !projects.project_exists(id).await? {
            reader.errors.add("project_id", invalid_selection_message("project_id"));
        }
    }

    Ok(reader.errors.into_result(patch)?)
}
