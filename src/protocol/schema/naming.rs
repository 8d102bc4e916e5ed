//! Name transformation helpers used to derive field and message ids.
//==================================================================================NAME_HELPERS
/// Convert a human readable name into a `camelCase` id.
/// Words are split on anything that is not alphanumeric; acronyms are
/// lowered ("ISO Address Claim" becomes `isoAddressClaim`).
pub(crate) fn to_camel_case(name: &str) -> String {
    let mut buffer = String::new();

    for word in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if buffer.is_empty() {
                buffer.extend(first.to_lowercase());
            } else {
                buffer.extend(first.to_uppercase());
            }
            buffer.extend(chars.flat_map(char::to_lowercase));
        }
    }
    buffer
}

/// Uppercase the first character, leaving the rest untouched.
pub(crate) fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Names with acronyms and punctuation collapse into camelCase.
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("ISO Address Claim"), "isoAddressClaim");
        assert_eq!(to_camel_case("Wind Data"), "windData");
        assert_eq!(to_camel_case("COG & SOG, Rapid Update"), "cogSogRapidUpdate");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    /// Only the first character changes case.
    fn test_upper_first() {
        assert_eq!(upper_first("userId"), "UserId");
        assert_eq!(upper_first(""), "");
    }
}
