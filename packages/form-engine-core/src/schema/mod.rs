//! Component configuration model, per-type shape checks, schema documents
//! and the schema validator.

mod config;
mod document;
mod error;
mod path;
mod rule;
mod shape;
mod validator;

pub use config::{
    CheckboxConfig, ChoiceOption, ComponentConfig, CustomConfig, DateConfig, FieldBase,
    FieldConfig, FieldValidation, FileConfig, FormConfig, HtmlConfig, NodeMeta, NumberConfig,
    Orientation, PageConfig, RadioGroupConfig, SelectConfig, TextConfig, TextareaConfig,
};
pub(crate) use config::parse_typed;
pub(crate) use document::is_page;
pub use document::FormDocument;
pub use error::SchemaError;
pub use path::{NodePath, PathSegment};
pub use rule::{Action, Clause, Rule, When};
pub use shape::{ConfigShape, FieldKind, FieldRequirement};
pub use validator::{SchemaValidator, TreeReport, ValidatedNode};
