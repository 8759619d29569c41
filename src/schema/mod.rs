//! Schemas - statically declared record shapes for task outputs
//!
//! Every structured task names a [`Schema`] at build time. The extractor
//! validates generated JSON against it and produces a canonical value
//! (declared fields only, defaults filled in).
//!
//! Typed access goes through [`Record`]: each published struct carries its
//! schema so `PipelineContext::record::<Outline>(..)` can deserialize.

mod records;
mod validate;

pub use records::{
    Character, CharacterList, Outline, Scene, Screenplay, ScreenplayScene, StoryAnalysis,
    CHARACTER, CHARACTER_LIST, OUTLINE, SCENE, SCREENPLAY, SCREENPLAY_SCENE, STORY_ANALYSIS,
};
pub(crate) use validate::json_type;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{PlotlineError, Result};

/// Declared type of a single field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Record(&'static Schema),
    List(&'static FieldType),
}

impl FieldType {
    /// Human-readable type name used in validation errors
    pub fn describe(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Record(schema) => format!("record {}", schema.name),
            FieldType::List(inner) => format!("list of {}", inner.describe()),
        }
    }

    fn to_json_schema(self) -> Value {
        match self {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Record(schema) => schema.to_json_schema(),
            FieldType::List(inner) => json!({ "type": "array", "items": inner.to_json_schema() }),
        }
    }
}

/// Default taken by an optional field that is absent
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Null,
    Str(&'static str),
    Int(i64),
    Bool(bool),
    EmptyList,
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::Str(s) => Value::String(s.to_string()),
            FieldDefault::Int(n) => Value::from(n),
            FieldDefault::Bool(b) => Value::Bool(b),
            FieldDefault::EmptyList => Value::Array(Vec::new()),
        }
    }
}

/// One named field of a record
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    /// `None` marks the field required
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType, default: FieldDefault) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
        }
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A named record type with ordered fields
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Validate `value` and return its canonical form
    ///
    /// Fields are checked in declared order, so the first missing required
    /// field is the one reported.
    pub fn conform(&self, value: &Value) -> Result<Value> {
        validate::conform_record(self, value, "")
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Describe the schema as a JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            properties.insert(field.name.to_string(), field.ty.to_json_schema());
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name)
            .collect();

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A typed struct backed by a published schema
pub trait Record: Serialize + DeserializeOwned {
    const SCHEMA: &'static Schema;

    /// Deserialize from a value already conformed to [`Self::SCHEMA`]
    fn from_value(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Every schema a pipeline file may name, keyed by its snake_case name
pub const PUBLISHED: &[(&str, &Schema)] = &[
    ("outline", &OUTLINE),
    ("scene", &SCENE),
    ("character", &CHARACTER),
    ("character_list", &CHARACTER_LIST),
    ("story_analysis", &STORY_ANALYSIS),
    ("screenplay", &SCREENPLAY),
    ("screenplay_scene", &SCREENPLAY_SCENE),
];

/// Look up a published schema by name
pub fn lookup(name: &str) -> Result<&'static Schema> {
    PUBLISHED
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, schema)| *schema)
        .ok_or_else(|| PlotlineError::UnknownSchema {
            name: name.to_string(),
        })
}
