use ammonia;

/// Escapes user-supplied text for interpolation into markup.
///
/// Every character with meaning in HTML (and whitespace) becomes an entity, so
/// the result is safe in element content and in quoted attribute values alike.
/// Post content is plain text; nothing is allowed through as markup.
pub fn escape(input: &str) -> String {
    ammonia::clean_text(input)
}
