pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Local names of the `xsi:*` attributes the validator acts on.
pub mod xsi {
    pub const TYPE: &str = "type";
    pub const NIL: &str = "nil";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const NO_NAMESPACE_SCHEMA_LOCATION: &str = "noNamespaceSchemaLocation";
}
