use serde::{Deserialize, Serialize};

/// A flag or trait value as the API returns it: a bare JSON scalar.
///
/// `null` is modelled as `Option<FlagsmithValue>` at the use site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagsmithValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl FlagsmithValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagsmithValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagsmithValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for FlagsmithValue {
    fn from(value: &str) -> Self {
        FlagsmithValue::String(value.to_string())
    }
}

impl From<String> for FlagsmithValue {
    fn from(value: String) -> Self {
        FlagsmithValue::String(value)
    }
}

impl From<bool> for FlagsmithValue {
    fn from(value: bool) -> Self {
        FlagsmithValue::Bool(value)
    }
}

impl From<i64> for FlagsmithValue {
    fn from(value: i64) -> Self {
        FlagsmithValue::Integer(value)
    }
}

impl From<f64> for FlagsmithValue {
    fn from(value: f64) -> Self {
        FlagsmithValue::Float(value)
    }
}

/// A reference that the API sends either as a numeric id or as a string
/// (a uuid, an api key or a free-form text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrKey {
    Id(i64),
    Key(String),
}

impl IdOrKey {
    pub fn as_id(&self) -> Option<i64> {
        match self {
            IdOrKey::Id(id) => Some(*id),
            IdOrKey::Key(key) => key.parse().ok(),
        }
    }
}

impl From<i64> for IdOrKey {
    fn from(value: i64) -> Self {
        IdOrKey::Id(value)
    }
}

impl From<&str> for IdOrKey {
    fn from(value: &str) -> Self {
        IdOrKey::Key(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Unicode,
    Bool,
    Float,
}

/// The typed form of a feature state value: one column per scalar type and a
/// discriminator naming the one in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStateValue {
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl FeatureStateValue {
    /// Collapses the typed columns into the scalar selected by `type`.
    pub fn value(&self) -> Option<FlagsmithValue> {
        match self.value_type {
            ValueType::Bool => self.boolean_value.map(FlagsmithValue::Bool),
            ValueType::Int => self.integer_value.map(FlagsmithValue::Integer),
            ValueType::Float => self.float_value.map(FlagsmithValue::Float),
            ValueType::Unicode => self.string_value.clone().map(FlagsmithValue::String),
        }
    }
}
