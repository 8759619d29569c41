//! Published schemas and their typed records
//!
//! The `const` schema and the serde struct must list the same fields.
//! `records_match_schemas` in the tests below guards that.

use serde::{Deserialize, Serialize};

use super::{FieldDefault, FieldSpec, FieldType, Record, Schema};

pub const SCENE: Schema = Schema {
    name: "Scene",
    fields: &[
        FieldSpec::required("act", FieldType::Integer),
        FieldSpec::required("number", FieldType::Integer),
        FieldSpec::required("description", FieldType::String),
        FieldSpec::required("conflict", FieldType::String),
        FieldSpec::required("value_change", FieldType::String),
    ],
};

pub const OUTLINE: Schema = Schema {
    name: "Outline",
    fields: &[
        FieldSpec::required("title", FieldType::String),
        FieldSpec::required("theme", FieldType::String),
        FieldSpec::required("protagonist_desire", FieldType::String),
        FieldSpec::required("protagonist_need", FieldType::String),
        FieldSpec::required("scenes", FieldType::List(&FieldType::Record(&SCENE))),
    ],
};

pub const CHARACTER: Schema = Schema {
    name: "Character",
    fields: &[
        FieldSpec::required("name", FieldType::String),
        FieldSpec::required("role", FieldType::String),
        FieldSpec::required("backstory", FieldType::String),
        FieldSpec::required("desire", FieldType::String),
        FieldSpec::required("need", FieldType::String),
        FieldSpec::required("arc", FieldType::String),
    ],
};

pub const CHARACTER_LIST: Schema = Schema {
    name: "CharacterList",
    fields: &[FieldSpec::required(
        "characters",
        FieldType::List(&FieldType::Record(&CHARACTER)),
    )],
};

pub const STORY_ANALYSIS: Schema = Schema {
    name: "StoryAnalysis",
    fields: &[
        FieldSpec::required("issues_found", FieldType::Boolean),
        FieldSpec::optional(
            "notes",
            FieldType::List(&FieldType::String),
            FieldDefault::EmptyList,
        ),
    ],
};

pub const SCREENPLAY_SCENE: Schema = Schema {
    name: "ScreenplayScene",
    fields: &[
        FieldSpec::required("number", FieldType::Integer),
        FieldSpec::required("content", FieldType::String),
    ],
};

pub const SCREENPLAY: Schema = Schema {
    name: "Screenplay",
    fields: &[FieldSpec::required(
        "scenes",
        FieldType::List(&FieldType::Record(&SCREENPLAY_SCENE)),
    )],
};

/// One beat of the outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub act: i64,
    pub number: i64,
    pub description: String,
    pub conflict: String,
    pub value_change: String,
}

/// Three-act outline produced by the first stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub theme: String,
    pub protagonist_desire: String,
    pub protagonist_need: String,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub role: String,
    pub backstory: String,
    pub desire: String,
    pub need: String,
    pub arc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterList {
    pub characters: Vec<Character>,
}

/// Critique notes from the thematic analysis stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    pub issues_found: bool,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenplayScene {
    pub number: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenplay {
    pub scenes: Vec<ScreenplayScene>,
}

impl Record for Scene {
    const SCHEMA: &'static Schema = &SCENE;
}

impl Record for Outline {
    const SCHEMA: &'static Schema = &OUTLINE;
}

impl Record for Character {
    const SCHEMA: &'static Schema = &CHARACTER;
}

impl Record for CharacterList {
    const SCHEMA: &'static Schema = &CHARACTER_LIST;
}

impl Record for StoryAnalysis {
    const SCHEMA: &'static Schema = &STORY_ANALYSIS;
}

impl Record for ScreenplayScene {
    const SCHEMA: &'static Schema = &SCREENPLAY_SCENE;
}

impl Record for Screenplay {
    const SCHEMA: &'static Schema = &SCREENPLAY;
}
