use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// One ingredient row of a recipe draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
    pub unit: String,
}

/// The target shape the engine incrementally populates while a generator
/// streams a recipe document.
///
/// Every field carries a default so any subset of the document deserializes
/// into a fully populated value; the consumer never observes a missing field.
/// Wire names are the generator's camelCase (`prepTime`, `dietaryRestrictions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub servings: String,
    pub category: String,
    pub cuisine: String,
    pub dietary_restrictions: Vec<String>,
}

impl RecipeDraft {
    /// A finalized draft always offers at least one ingredient row and one
    /// instruction step for the form to render, even if empty. Only applied
    /// when a session finalizes; mid-stream drafts may have empty lists.
    pub fn ensure_placeholders(&mut self) {
        if self.ingredients.is_empty() {
            self.ingredients.push(Ingredient::default());
        }
        if self.instructions.is_empty() {
            self.instructions.push(String::new());
        }
    }
}

/// Generators are inconsistent about quoting quantities and serving counts;
/// accept either a JSON string or a number and normalize to a string.
/// `null` collapses to the empty default.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl de::Visitor<'_> for StringOrNumber {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
