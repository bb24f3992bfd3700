//! Template configuration and form validation
//!
//! A template repository describes its personalization form in a
//! `template.config.json` document. This module normalizes that
//! document into a canonical [`TemplateConfig`], derives default
//! values and a validation schema from it, and validates user-entered
//! form data against the field specs.

pub mod config;
pub mod validate;

pub use config::{
    DataMapping, FieldKind, FieldSpec, FormConfig, Step, TemplateConfig, ValidationRules,
};
pub use validate::{validate_field, validate_form, ValidationReport};
