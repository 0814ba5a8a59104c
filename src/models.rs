use serde::{de, Deserialize, Deserializer, Serialize};

/// A catalogue entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of create/update requests
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub price: f64,
}

// Form inputs post prices as strings ("12.50"); accept both shapes.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(n) => Ok(n),
        Price::Text(s) => s.trim().parse::<f64>().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_serializes_as_underscore_id() {
        let product = Product {
            id: "p1".to_string(),
            name: "Lamp".to_string(),
            price: 19.5,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["_id"], "p1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_price_accepts_number_and_string() {
        let a: ProductInput = serde_json::from_str(r#"{"name":"A","price":3.25}"#).unwrap();
        let b: ProductInput = serde_json::from_str(r#"{"name":"B","price":"3.25"}"#).unwrap();
        assert_eq!(a.price, 3.25);
        assert_eq!(b.price, 3.25);

        assert!(serde_json::from_str::<ProductInput>(r#"{"name":"C","price":"cheap"}"#).is_err());
    }
}
