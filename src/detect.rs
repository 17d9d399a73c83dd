use crate::draft::{Ingredient, RecipeDraft};
use std::fmt;

/// Sub-field of one ingredient row, in the order the generator emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientPart {
    Name,
    Quantity,
    Unit,
}

impl fmt::Display for IngredientPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Quantity => "quantity",
            Self::Unit => "unit",
        })
    }
}

/// One addressable location in the recipe form.
///
/// `Display` renders the id the presentation layer scrolls to and focuses:
/// `title`, `ingredient[2].quantity`, `instruction[0]`, `prepTime`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPointer {
    Title,
    Description,
    Ingredient { index: usize, part: IngredientPart },
    Instruction { index: usize },
    PrepTime,
    CookTime,
    Servings,
}

impl fmt::Display for FieldPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Description => f.write_str("description"),
            Self::Ingredient { index, part } => write!(f, "ingredient[{}].{}", index, part),
            Self::Instruction { index } => write!(f, "instruction[{}]", index),
            Self::PrepTime => f.write_str("prepTime"),
            Self::CookTime => f.write_str("cookTime"),
            Self::Servings => f.write_str("servings"),
        }
    }
}

/// The single most relevant field that changed between two candidate drafts.
///
/// Fields are compared in the order they typically appear in generated
/// documents: title, description, ingredients, instructions, prepTime,
/// cookTime, servings. The first difference wins. `previous = None` compares
/// against the default draft, so the very first successful parse points at
/// its first populated field. `None` means the chunk produced no user-visible
/// change and focus should not move.
pub fn detect_active_field(
    previous: Option<&RecipeDraft>,
    current: &RecipeDraft,
) -> Option<FieldPointer> {
    let fallback = RecipeDraft::default();
    let prev = previous.unwrap_or(&fallback);

    if prev.title != current.title {
        return Some(FieldPointer::Title);
    }
    if prev.description != current.description {
        return Some(FieldPointer::Description);
    }
    if let Some(pointer) = ingredients_change(&prev.ingredients, &current.ingredients) {
        return Some(pointer);
    }
    if let Some(pointer) = instructions_change(&prev.instructions, &current.instructions) {
        return Some(pointer);
    }
    if prev.prep_time != current.prep_time {
        return Some(FieldPointer::PrepTime);
    }
    if prev.cook_time != current.cook_time {
        return Some(FieldPointer::CookTime);
    }
    if prev.servings != current.servings {
        return Some(FieldPointer::Servings);
    }
    None
}

/// A grown array attributes the change to the newly appeared last element.
/// Same length: only the last element is compared, sub-field by sub-field —
/// earlier elements are assumed stable once a later one exists, matching
/// left-to-right generation. A shrunk array is generator misbehavior and is
/// skipped so precedence moves on.
fn ingredients_change(prev: &[Ingredient], curr: &[Ingredient]) -> Option<FieldPointer> {
    if curr.len() > prev.len() {
        return Some(FieldPointer::Ingredient {
            index: curr.len() - 1,
            part: IngredientPart::Name,
        });
    }
    if curr.len() == prev.len() && !curr.is_empty() {
        let index = curr.len() - 1;
        let (p, c) = (&prev[index], &curr[index]);
        let part = if p.name != c.name {
            IngredientPart::Name
        } else if p.quantity != c.quantity {
            IngredientPart::Quantity
        } else if p.unit != c.unit {
            IngredientPart::Unit
        } else {
            return None;
        };
        return Some(FieldPointer::Ingredient { index, part });
    }
    None
}

fn instructions_change(prev: &[String], curr: &[String]) -> Option<FieldPointer> {
    if curr.len() > prev.len() {
        return Some(FieldPointer::Instruction {
            index: curr.len() - 1,
        });
    }
    if curr.len() == prev.len() && !curr.is_empty() {
        let index = curr.len() - 1;
        if prev[index] != curr[index] {
            return Some(FieldPointer::Instruction { index });
        }
    }
    None
}
