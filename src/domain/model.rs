use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Placeholder served for any attribute the model reply did not yield.
pub const NOT_PROVIDED: &str = "Not provided";

/// Tri-state shipping flag as served to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Flag {
    #[serde(rename = "True")]
    True,
    #[serde(rename = "False")]
    False,
    #[default]
    #[serde(rename = "Not provided")]
    NotProvided,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::True => "True",
            Flag::False => "False",
            Flag::NotProvided => NOT_PROVIDED,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Flag::True)
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Flag::True
        } else {
            Flag::False
        }
    }
}

/// Inbound flags are read leniently: JSON bools, any casing of
/// `true`/`false`, and `null`. Anything else is `Not provided`.
impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFlag {
            Bool(bool),
            Text(String),
        }

        let flag = match Option::<RawFlag>::deserialize(deserializer)? {
            Some(RawFlag::Bool(value)) => Flag::from(value),
            Some(RawFlag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Flag::True,
                "false" => Flag::False,
                _ => Flag::NotProvided,
            },
            None => Flag::NotProvided,
        };
        Ok(flag)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row read from the uploaded sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub name: String,
    /// `None` when the sheet has no `product_description` column.
    pub description: Option<String>,
}

impl ProductRow {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// The three attributes synthesized for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedAttributes {
    pub dimensions: String,
    pub perishable: Flag,
    pub explosive: Flag,
}

impl Default for EnrichedAttributes {
    fn default() -> Self {
        Self {
            dimensions: NOT_PROVIDED.to_string(),
            perishable: Flag::NotProvided,
            explosive: Flag::NotProvided,
        }
    }
}

fn not_provided() -> String {
    NOT_PROVIDED.to_string()
}

/// Enriched product as returned by `/process` and accepted by `/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Product Name", alias = "name")]
    pub name: String,

    #[serde(
        rename = "Product Description",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    #[serde(rename = "Dimensions", alias = "dimensions", default = "not_provided")]
    pub dimensions: String,

    #[serde(rename = "Perishable", alias = "perishable", default)]
    pub perishable: Flag,

    #[serde(rename = "Explosive", alias = "explosive", default)]
    pub explosive: Flag,
}

impl ProductRecord {
    pub fn from_row(row: ProductRow, attributes: EnrichedAttributes) -> Self {
        Self {
            name: row.name,
            description: row.description,
            dimensions: attributes.dimensions,
            perishable: attributes.perishable,
            explosive: attributes.explosive,
        }
    }
}

/// Payload of a successful `/generate` call.
#[derive(Debug, Clone, Serialize)]
pub struct CargoImages {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schematic_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_display_keys() {
        let record = ProductRecord::from_row(
            ProductRow::new("Frozen Peas", Some("Bag of peas".to_string())),
            EnrichedAttributes {
                dimensions: "10 x 4 x 2".to_string(),
                perishable: Flag::True,
                explosive: Flag::False,
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Product Name"], "Frozen Peas");
        assert_eq!(json["Product Description"], "Bag of peas");
        assert_eq!(json["Dimensions"], "10 x 4 x 2");
        assert_eq!(json["Perishable"], "True");
        assert_eq!(json["Explosive"], "False");
    }

    #[test]
    fn test_record_without_description_omits_key() {
        let record = ProductRecord::from_row(
            ProductRow::new("Fireworks", None),
            EnrichedAttributes::default(),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("Product Description").is_none());
        assert_eq!(json["Dimensions"], NOT_PROVIDED);
        assert_eq!(json["Perishable"], NOT_PROVIDED);
        assert_eq!(json["Explosive"], NOT_PROVIDED);
    }

    #[test]
    fn test_record_accepts_snake_case_aliases() {
        let record: ProductRecord = serde_json::from_value(serde_json::json!({
            "name": "Milk",
            "dimensions": "4 x 4 x 8",
            "perishable": "True"
        }))
        .unwrap();

        assert_eq!(record.name, "Milk");
        assert_eq!(record.description, None);
        assert_eq!(record.perishable, Flag::True);
        assert_eq!(record.explosive, Flag::NotProvided);
    }

    #[test]
    fn test_flags_are_read_leniently() {
        let record: ProductRecord = serde_json::from_value(serde_json::json!({
            "Product Name": "Fireworks",
            "Perishable": "TRUE",
            "Explosive": true
        }))
        .unwrap();
        assert_eq!(record.perishable, Flag::True);
        assert_eq!(record.explosive, Flag::True);

        let record: ProductRecord = serde_json::from_value(serde_json::json!({
            "Product Name": "Gravel",
            "Perishable": false,
            "Explosive": " False "
        }))
        .unwrap();
        assert_eq!(record.perishable, Flag::False);
        assert_eq!(record.explosive, Flag::False);

        let record: ProductRecord = serde_json::from_value(serde_json::json!({
            "Product Name": "Crate",
            "Perishable": null,
            "Explosive": "unknown"
        }))
        .unwrap();
        assert_eq!(record.perishable, Flag::NotProvided);
        assert_eq!(record.explosive, Flag::NotProvided);
    }
}
