use std::collections::HashMap;
use std::sync::Arc;

use super::{Builtin, ConversionError, TypeConverter, UnmarshalContext, ValueSource};
use crate::model::ExpandedName;
use crate::namespaces::PrefixResolver;
use crate::schema::SchemaSet;
use crate::value::XmlValue;

/// Maps type names to converters.
///
/// Lookup walks a type's base chain, so a converter registered for a base
/// type serves every type derived from it unless a more specific one is
/// registered. Types with no registered ancestor use the untyped converter.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<ExpandedName, Arc<dyn TypeConverter>>,
    fallback: Arc<dyn TypeConverter>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConverterRegistry {
    /// Registry holding only the untyped fallback.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            fallback: Arc::new(Builtin::Untyped),
        }
    }

    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        for b in Builtin::ALL {
            reg.register(b.type_name(), Arc::new(*b));
        }
        reg
    }

    /// Registers `converter` for `type_name`, returning the one it replaces.
    pub fn register(
        &mut self,
        type_name: ExpandedName,
        converter: Arc<dyn TypeConverter>,
    ) -> Option<Arc<dyn TypeConverter>> {
        self.converters.insert(type_name, converter)
    }

    pub fn get(&self, type_name: &ExpandedName) -> Option<&Arc<dyn TypeConverter>> {
        self.converters.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Converter for `type_name`: the nearest registered ancestor.
    pub fn resolve(&self, schema: &SchemaSet, type_name: &ExpandedName) -> &Arc<dyn TypeConverter> {
        schema
            .base_chain(type_name)
            .find_map(|n| self.converters.get(n))
            .unwrap_or(&self.fallback)
    }

    /// Normalizes and converts `raw` for `type_name`.
    pub fn convert(
        &self,
        schema: &SchemaSet,
        type_name: &ExpandedName,
        raw: &str,
        source: ValueSource,
        namespaces: &dyn PrefixResolver,
    ) -> Result<XmlValue, ConversionError> {
        let converter = self.resolve(schema, type_name);
        let ctx = UnmarshalContext::new(raw, source, type_name, namespaces)
            .with_declared_facet(schema.whitespace_facet(type_name));
        match source {
            ValueSource::Attribute => converter.unmarshal_attribute(&ctx),
            ValueSource::Content => converter.unmarshal_content(&ctx),
        }
    }
}
