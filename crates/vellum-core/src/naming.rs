//! Resource type-name derivation.
//!
//! JSON:API type names are plural, lower-camelled member names. By default
//! the engine derives them from the Rust type name of the backing entity:
//! `Post` becomes `posts`, `UserAccount` becomes `userAccounts`. Entities
//! with irregular names override [`Entity::resource_type`] instead.
//!
//! [`Entity::resource_type`]: crate::Entity::resource_type

/// Pluralizes an English word using the regular suffix rules.
///
/// `-s`, `-x`, `-z`, `-ch` and `-sh` take `es`; a consonant followed by `y`
/// becomes `ies`; everything else takes a plain `s`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_ascii_lowercase();
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1);
        let is_vowel = matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u'));
        if !is_vowel {
            let stem: String = word.chars().take(word.chars().count() - 1).collect();
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Converts a type name to its lower-camelled member form.
#[must_use]
pub fn member_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives the default JSON:API type name for a Rust type.
///
/// Takes the unqualified type name, pluralizes it, and lower-camels the
/// result.
#[must_use]
pub fn derive_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    // Strip any generic arguments, then take the last path segment.
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    member_name(&pluralize(short))
}
