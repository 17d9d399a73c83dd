use super::*;

#[test]
fn wire_names_are_the_generators_camel_case() {
    let text = r#"{"prepTime":"5 m","cookTime":"10 m","dietaryRestrictions":["vegan"]}"#;
    let draft: RecipeDraft = serde_json::from_str(text).unwrap();
    assert_eq!(draft.prep_time, "5 m");
    assert_eq!(draft.cook_time, "10 m");
    assert_eq!(draft.dietary_restrictions, vec!["vegan"]);

    let out = serde_json::to_string(&draft).unwrap();
    assert!(out.contains("\"prepTime\""));
    assert!(out.contains("\"dietaryRestrictions\""));
}

#[test]
fn missing_fields_deserialize_to_defaults() {
    let draft: RecipeDraft = serde_json::from_str(r#"{"title":"Tea"}"#).unwrap();
    assert_eq!(draft.title, "Tea");
    assert_eq!(draft.description, "");
    assert!(draft.ingredients.is_empty());
    assert!(draft.instructions.is_empty());
    assert_eq!(draft.servings, "");
}

#[test]
fn quantities_and_servings_accept_numbers() {
    let text = r#"{
        "servings": 4,
        "ingredients": [
            {"name":"Water","quantity":2,"unit":"cups"},
            {"name":"Oil","quantity":1.5,"unit":"tbsp"},
            {"name":"Salt","quantity":"a pinch","unit":""}
        ]
    }"#;
    let draft: RecipeDraft = serde_json::from_str(text).unwrap();
    assert_eq!(draft.servings, "4");
    assert_eq!(draft.ingredients[0].quantity, "2");
    assert_eq!(draft.ingredients[1].quantity, "1.5");
    assert_eq!(draft.ingredients[2].quantity, "a pinch");
}

#[test]
fn null_scalars_collapse_to_empty() {
    let draft: RecipeDraft = serde_json::from_str(r#"{"servings":null}"#).unwrap();
    assert_eq!(draft.servings, "");
}

#[test]
fn ensure_placeholders_only_fills_empty_lists() {
    let mut empty = RecipeDraft::default();
    empty.ensure_placeholders();
    assert_eq!(empty.ingredients, vec![Ingredient::default()]);
    assert_eq!(empty.instructions, vec![String::new()]);

    let mut full = parse_doc(FULL_DOC);
    let before = full.clone();
    full.ensure_placeholders();
    assert_eq!(full, before);
}
