//! Search configuration.
//!
//! [`SearchConfig`] is a typed builder for the options the suggest endpoint
//! understands. It serializes into the plain JSON object that
//! [`SearchConfiguration`] resolves once per controller: `search_path` is
//! consumed, everything else is flattened into a cached query-string
//! fragment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use predictive_search_utils::query_params::{self, ArrayFormat};

/// Path prefix used when the configuration does not name one.
pub const DEFAULT_SEARCH_PATH: &str = "/search";

const SEARCH_PATH_KEY: &str = "search_path";

/// Errors raised while building a controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration object was supplied at all.
    #[error("No config object was specified")]
    Missing,

    /// The configuration was a JSON value other than an object.
    #[error("config must be an object, found {found}")]
    NotAnObject { found: &'static str },

    /// `search_path` was present but not a string.
    #[error("search_path must be a string, found {found}")]
    InvalidSearchPath { found: &'static str },

    /// The typed builder could not be converted to JSON.
    #[error("failed to serialize search configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Kinds of storefront resources the endpoint can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Product,
    Page,
    Article,
    Collection,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Product => "product",
            ResourceType::Page => "page",
            ResourceType::Article => "article",
            ResourceType::Collection => "collection",
        }
    }
}

/// Resource fields the endpoint can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchField {
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "product_type")]
    ProductType,
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "variants.barcode")]
    VariantsBarcode,
    #[serde(rename = "variants.sku")]
    VariantsSku,
    #[serde(rename = "variants.title")]
    VariantsTitle,
    #[serde(rename = "vendor")]
    Vendor,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchField::Author => "author",
            SearchField::Body => "body",
            SearchField::ProductType => "product_type",
            SearchField::Tag => "tag",
            SearchField::Title => "title",
            SearchField::VariantsBarcode => "variants.barcode",
            SearchField::VariantsSku => "variants.sku",
            SearchField::VariantsTitle => "variants.title",
            SearchField::Vendor => "vendor",
        }
    }
}

/// How unavailable products are placed in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableProducts {
    Show,
    Hide,
    Last,
}

impl UnavailableProducts {
    pub fn as_str(self) -> &'static str {
        match self {
            UnavailableProducts::Show => "show",
            UnavailableProducts::Hide => "hide",
            UnavailableProducts::Last => "last",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_products: Option<UnavailableProducts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SearchField>,
}

impl ResourceOptions {
    pub fn is_empty(&self) -> bool {
        self.unavailable_products.is_none() && self.fields.is_empty()
    }
}

/// The `resources` section of a search configuration.
///
/// Keys without a typed field are kept in `extra` and forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "ResourceOptions::is_empty")]
    pub options: ResourceOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.limit.is_none()
            && self.options.is_empty()
            && self.extra.is_empty()
    }
}

/// Typed builder for the configuration object accepted by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_path: Option<String>,
    #[serde(skip_serializing_if = "Resources::is_empty")]
    pub resources: Resources,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Add a resource type; duplicates are ignored.
    pub fn resource_type(mut self, kind: ResourceType) -> Self {
        if !self.resources.types.contains(&kind) {
            self.resources.types.push(kind);
        }
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.resources.limit = Some(limit);
        self
    }

    pub fn unavailable_products(mut self, policy: UnavailableProducts) -> Self {
        self.resources.options.unavailable_products = Some(policy);
        self
    }

    /// Add a field to match against; duplicates are ignored.
    pub fn field(mut self, field: SearchField) -> Self {
        if !self.resources.options.fields.contains(&field) {
            self.resources.options.fields.push(field);
        }
        self
    }

    /// Add an opaque `resources[key]` parameter.
    pub fn resource_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resources.extra.insert(key.into(), value.into());
        self
    }

    /// Add an opaque top-level parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Immutable, resolved configuration kept by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfiguration {
    search_path: String,
    config_params: String,
}

impl SearchConfiguration {
    /// Resolve a JSON configuration object using bracketed arrays.
    pub fn from_value(config: Value) -> Result<Self, ConfigError> {
        Self::from_value_with(config, ArrayFormat::Brackets)
    }

    /// Resolve a JSON configuration object.
    ///
    /// `null` is rejected as [`ConfigError::Missing`]. A string `search_path`
    /// that is non-empty after trimming trailing slashes replaces
    /// [`DEFAULT_SEARCH_PATH`]. It is removed before the remaining keys are
    /// flattened.
    pub fn from_value_with(config: Value, format: ArrayFormat) -> Result<Self, ConfigError> {
        let mut map = match config {
            Value::Null => return Err(ConfigError::Missing),
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::NotAnObject {
                    found: json_type_name(&other),
                });
            }
        };

        let search_path = match map.shift_remove(SEARCH_PATH_KEY) {
            None | Some(Value::Null) => DEFAULT_SEARCH_PATH.to_string(),
            Some(Value::String(path)) => match path.trim_end_matches('/') {
                "" => DEFAULT_SEARCH_PATH.to_string(),
                trimmed => trimmed.to_string(),
            },
            Some(other) => {
                return Err(ConfigError::InvalidSearchPath {
                    found: json_type_name(&other),
                });
            }
        };

        let config_params = query_params::encode_with(&Value::Object(map), format);

        Ok(Self {
            search_path,
            config_params,
        })
    }

    pub fn from_config(config: &SearchConfig, format: ArrayFormat) -> Result<Self, ConfigError> {
        Self::from_value_with(config.to_value()?, format)
    }

    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// Flattened query-string fragment, including its trailing `&`.
    pub fn config_params(&self) -> &str {
        &self.config_params
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
