mod item;

pub use item::{ItemKind, ItemRef, RecipeOwner};
