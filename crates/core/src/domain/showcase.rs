use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Projection from a step's form definition to the payment parameters it submits.
///
/// Field validation and type coercion belong to the implementor; navigation only ever asks
/// for the finished map.
pub trait PaymentSchema {
    fn payment_parameters(&self) -> BTreeMap<String, String>;
}

/// Server-defined form document for one wizard step.
///
/// `form` and `error` are carried verbatim for whoever renders the step. The parameter
/// projection only uses `hidden_fields` and the answers recorded in `values`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showcase {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hidden_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub form: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
}

impl Showcase {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn with_hidden_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.hidden_fields.insert(name.into(), value.into());
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_value(name, value);
        self
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// True when the server annotated the form with validation errors.
    pub fn has_errors(&self) -> bool {
        !self.error.is_empty()
    }
}

impl PaymentSchema for Showcase {
    fn payment_parameters(&self) -> BTreeMap<String, String> {
        let mut parameters = self.hidden_fields.clone();
        parameters.extend(self.values.iter().map(|(name, value)| (name.clone(), value.clone())));
        parameters
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{PaymentSchema, Showcase};

    #[test]
    fn answers_override_hidden_fields_in_payment_parameters() {
        let showcase = Showcase::new("Mobile top-up")
            .with_hidden_field("scid", "5551")
            .with_hidden_field("sum", "0")
            .with_value("sum", "150.00")
            .with_value("phone-number", "79001234567");

        let parameters = showcase.payment_parameters();

        assert_eq!(parameters.len(), 3);
        assert_eq!(parameters["scid"], "5551");
        assert_eq!(parameters["sum"], "150.00");
        assert_eq!(parameters["phone-number"], "79001234567");
    }

    #[test]
    fn decodes_server_document_and_keeps_form_opaque() {
        let showcase: Showcase = serde_json::from_value(json!({
            "title": "Internet provider",
            "hidden_fields": { "scid": "923" },
            "form": [{ "type": "text", "name": "account", "required": true }],
            "error": [{ "name": "account", "alert": "unknown account" }]
        }))
        .expect("showcase document should decode");

        assert_eq!(showcase.title, "Internet provider");
        assert_eq!(showcase.form[0]["name"], "account");
        assert!(showcase.has_errors());
        assert!(showcase.values.is_empty());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let showcase: Showcase =
            serde_json::from_value(json!({ "title": "Bare" })).expect("bare showcase decodes");

        assert!(showcase.hidden_fields.is_empty());
        assert!(!showcase.has_errors());
        assert!(showcase.payment_parameters().is_empty());
    }
}
