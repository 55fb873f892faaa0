use super::{bundle_document, NODE_BUNDLE_SCHEMA, WAY_BUNDLE_SCHEMA};
use crate::error::MeltError;
use crate::melt::types::{Bundle, BundleKind};
use jsonschema::JSONSchema;

/// Accept or reject a shaped bundle before it is written
pub trait BundleValidator {
    fn validate(&self, bundle: &Bundle) -> Result<(), MeltError>;
}

/// Accepts every bundle; used when validation is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl BundleValidator for NoValidation {
    fn validate(&self, _bundle: &Bundle) -> Result<(), MeltError> {
        Ok(())
    }
}

/// Validates bundles against the built-in JSON Schemas
pub struct JsonSchemaValidator {
    node: JSONSchema,
    way: JSONSchema,
}

impl JsonSchemaValidator {
    pub fn new() -> Result<Self, MeltError> {
        Ok(JsonSchemaValidator {
            node: compile(BundleKind::Node)?,
            way: compile(BundleKind::Way)?,
        })
    }
}

fn compile(kind: BundleKind) -> Result<JSONSchema, MeltError> {
    let schema = match kind {
        BundleKind::Node => &*NODE_BUNDLE_SCHEMA,
        BundleKind::Way => &*WAY_BUNDLE_SCHEMA,
    };

    JSONSchema::options()
        .compile(schema)
        .map_err(|err| MeltError::SchemaCompile {
            kind,
            message: err.to_string(),
        })
}

impl BundleValidator for JsonSchemaValidator {
    fn validate(&self, bundle: &Bundle) -> Result<(), MeltError> {
        let kind = bundle.kind();
        let schema = match kind {
            BundleKind::Node => &self.node,
            BundleKind::Way => &self.way,
        };

        let document = bundle_document(bundle)?;
        if let Err(errors) = schema.validate(&document) {
            let errors = errors
                .map(|error| format!("{} at {}", error, error.instance_path))
                .collect();
            return Err(MeltError::Validation { kind, errors });
        }
        Ok(())
    }
}
