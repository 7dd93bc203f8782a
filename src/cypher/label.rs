//! Translation between public and store label forms
//!
//! The store cannot carry `:` inside a label, so `biolink:Gene` is stored as
//! `biolink.Gene`. Categories and predicates are translated on the way in and
//! back again when answers are mapped.

const PUBLIC_PREFIX: &str = "biolink:";
const STORE_PREFIX: &str = "biolink.";

/// Public label -> store label
pub fn to_store_label(label: &str) -> String {
    match label.strip_prefix(PUBLIC_PREFIX) {
        Some(rest) => format!("{}{}", STORE_PREFIX, rest),
        None => label.to_string(),
    }
}

/// Store label -> public label
pub fn to_public_label(label: &str) -> String {
    match label.strip_prefix(STORE_PREFIX) {
        Some(rest) => format!("{}{}", PUBLIC_PREFIX, rest),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_prefixed_labels() {
        assert_eq!(to_store_label("biolink:Gene"), "biolink.Gene");
        assert_eq!(to_public_label("biolink.treats"), "biolink:treats");
    }

    #[test]
    fn leaves_unprefixed_labels_alone() {
        assert_eq!(to_store_label("Disease"), "Disease");
        assert_eq!(to_public_label("Disease"), "Disease");
    }

    #[test]
    fn only_the_leading_prefix_is_translated() {
        assert_eq!(to_store_label("x:biolink:Gene"), "x:biolink:Gene");
    }
}
