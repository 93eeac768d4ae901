use std::collections::HashSet;
use std::sync::Arc;

use super::attribute::{Attribute, AttributeKind};
use crate::error::ConstructionError;
use crate::query::Query;

/// Immutable descriptor of a declared measurement
///
/// Built once through [`MeasurementSchema::builder`] and shared behind an
/// `Arc` by every query and serialization that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSchema {
    measurement_name: String,
    attributes: Vec<Attribute>,
}

impl MeasurementSchema {
    pub fn builder(measurement_name: impl Into<String>) -> MeasurementSchemaBuilder {
        MeasurementSchemaBuilder {
            measurement_name: measurement_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn measurement_name(&self) -> &str {
        &self.measurement_name
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Namespaced attribute keys in declaration order
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(Attribute::key).collect()
    }

    pub fn timestamp_attributes(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.is_timestamp()).collect()
    }

    pub fn timestamp_attribute(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_timestamp())
    }

    pub fn tag_attributes(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.is_tag()).collect()
    }

    /// Default `SELECT * FROM <measurement>` query
    pub fn query(&self) -> Query {
        Query::new().from_schema(self)
    }
}

pub struct MeasurementSchemaBuilder {
    measurement_name: String,
    attributes: Vec<Attribute>,
}

impl MeasurementSchemaBuilder {
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Validate the declaration and freeze it
    pub fn build(self) -> Result<Arc<MeasurementSchema>, ConstructionError> {
        if self.measurement_name.trim().is_empty() {
            return Err(ConstructionError::EmptyMeasurementName);
        }

        {
            let mut seen = HashSet::new();
            let mut timestamp: Option<&str> = None;
            for attribute in &self.attributes {
                if attribute.name.is_empty() {
                    return Err(ConstructionError::EmptyAttributeName);
                }
                if !seen.insert(attribute.name.as_str()) {
                    return Err(ConstructionError::DuplicateAttribute(attribute.name.clone()));
                }
                if attribute.kind == AttributeKind::Timestamp {
                    if let Some(first) = timestamp {
                        return Err(ConstructionError::MultipleTimestamps(
                            first.to_string(),
                            attribute.name.clone(),
                        ));
                    }
                    timestamp = Some(attribute.name.as_str());
                }
            }
        }

        tracing::debug!(
            measurement = %self.measurement_name,
            attributes = self.attributes.len(),
            "Declared measurement schema"
        );

        Ok(Arc::new(MeasurementSchema {
            measurement_name: self.measurement_name,
            attributes: self.attributes,
        }))
    }
}
