//! Response schemas for structured generation.
//!
//! Each schema is sent to the backend as `responseSchema` to constrain the
//! output format, and is used again client-side to validate what came back.
//! Schemas are built on first use and never change afterwards.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
}

/// A node of the backend's OpenAPI-style schema dialect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<&'static str, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn leaf(schema_type: SchemaType, description: Option<&'static str>) -> Self {
        Self {
            schema_type,
            description,
            properties: BTreeMap::new(),
            required: Vec::new(),
            property_ordering: Vec::new(),
            items: None,
        }
    }

    pub fn string(description: &'static str) -> Self {
        Self::leaf(SchemaType::String, Some(description))
    }

    pub fn integer(description: &'static str) -> Self {
        Self::leaf(SchemaType::Integer, Some(description))
    }

    pub fn object() -> Self {
        Self::leaf(SchemaType::Object, None)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array, None)
        }
    }

    /// Add a required property.
    pub fn field(mut self, name: &'static str, schema: Schema) -> Self {
        self.required.push(name);
        self.optional_field(name, schema)
    }

    /// Add a property the backend may omit.
    pub fn optional_field(mut self, name: &'static str, schema: Schema) -> Self {
        self.property_ordering.push(name);
        self.properties.insert(name, schema);
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| *required == name)
    }

    /// Check `value` against this schema, reporting the first violation as a
    /// parse error carrying its JSON path.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validate_at(value, "$")
            .map_err(|violation| Error::Parse(format!("Schema violation: {}", violation)))
    }

    fn validate_at(&self, value: &Value, path: &str) -> std::result::Result<(), String> {
        match self.schema_type {
            SchemaType::String => {
                if !value.is_string() {
                    return Err(format!("{} must be a string", path));
                }
            }
            SchemaType::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(format!("{} must be an integer", path));
                }
            }
            SchemaType::Array => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("{} must be an array", path))?;
                if let Some(item_schema) = &self.items {
                    for (index, item) in items.iter().enumerate() {
                        item_schema.validate_at(item, &format!("{}[{}]", path, index))?;
                    }
                }
            }
            SchemaType::Object => {
                let object = value
                    .as_object()
                    .ok_or_else(|| format!("{} must be an object", path))?;
                for name in &self.required {
                    match object.get(*name) {
                        None | Some(Value::Null) => {
                            return Err(format!("{}.{} is required", path, name));
                        }
                        Some(_) => {}
                    }
                }
                for (name, property) in &self.properties {
                    match object.get(*name) {
                        None | Some(Value::Null) => {}
                        Some(field) => property.validate_at(field, &format!("{}.{}", path, name))?,
                    }
                }
            }
        }
        Ok(())
    }
}

/// The response shapes the generation client asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    WordLookup,
    Meme,
    Comic,
}

impl ResponseKind {
    pub fn schema(self) -> &'static Schema {
        match self {
            ResponseKind::WordLookup => word_schema(),
            ResponseKind::Meme => meme_schema(),
            ResponseKind::Comic => comic_schema(),
        }
    }
}

fn word_fields(schema: Schema) -> Schema {
    schema
        .field("word", Schema::string("The IELTS vocabulary word"))
        .field("pronunciation", Schema::string("IPA pronunciation"))
        .field("meaning", Schema::string("Chinese definition"))
        .field(
            "sentence",
            Schema::string("A very simple first-person English sentence (e.g. 'I see...')"),
        )
        .field(
            "translation",
            Schema::string("Chinese translation of the sentence"),
        )
}

pub fn word_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| word_fields(Schema::object()))
}

pub fn meme_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        word_fields(Schema::object())
            .field(
                "caption",
                Schema::string("Short, punchy meme text (English)"),
            )
            .field(
                "context",
                Schema::string("Explanation of the humor/meme in Chinese"),
            )
            .field(
                "visualPrompt",
                Schema::string("A prompt to generate the visual background for the meme"),
            )
    })
}

pub fn comic_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::array(
            Schema::object()
                .field("panelNumber", Schema::integer("1-based position of the panel"))
                .field(
                    "description",
                    Schema::string("Visual description of the scene"),
                )
                .field(
                    "dialogue",
                    Schema::string("Character dialogue containing the IELTS word"),
                )
                .field(
                    "visualPrompt",
                    Schema::string("Prompt for generating the panel image"),
                )
                .field("wordData", word_schema().clone()),
        )
    })
}
