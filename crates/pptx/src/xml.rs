//! Small helpers shared by the OOXML readers and writers.

use quick_xml::events::BytesStart;
use std::borrow::Cow;

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the attribute whose local name is `key`, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if local_name(a.key.as_ref()) == key {
            Some(
                a.unescape_value()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned()),
            )
        } else {
            None
        }
    })
}

/// Value of the attribute whose full (prefixed) name is `key`.
pub(crate) fn attr_exact(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// The namespaced relationship id (`r:id`, `r:embed`, ...) with local name `key`.
pub(crate) fn rel_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let name = a.key.as_ref();
        (name.contains(&b':') && local_name(name) == key)
            .then(|| String::from_utf8_lossy(&a.value).into_owned())
    })
}

/// Numeric attribute, ignoring unparsable values.
pub(crate) fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// Escape text for element content and attribute values.
///
/// Control characters that XML 1.0 does not allow are dropped.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden_char) {
        let cleaned: String = text.chars().filter(|c| !is_forbidden_char(*c)).collect();
        return Cow::Owned(quick_xml::escape::escape(&cleaned).into_owned());
    }
    quick_xml::escape::escape(text)
}

fn is_forbidden_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Extract a trailing number from a string like "rId2" or "slide3.xml".
pub(crate) fn trailing_number(s: &str) -> Option<usize> {
    // Remove common extensions first
    let s = s.trim_end_matches(".rels").trim_end_matches(".xml");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("rId1"), Some(1));
        assert_eq!(trailing_number("rId12"), Some(12));
        assert_eq!(trailing_number("slide1.xml"), Some(1));
        assert_eq!(trailing_number("slideLayout11.xml.rels"), Some(11));
        assert_eq!(trailing_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Q&A <draft>"), "Q&amp;A &lt;draft&gt;");
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a\u{0}b\u{1b}c\td\ne"), "abc\td\ne");
        assert_eq!(escape("bell\u{7} & <tag>"), "bell &amp; &lt;tag&gt;");
    }

    #[test]
    fn test_attr_lookup() {
        let e = BytesStart::from_content(r#"p:ph type="title" idx="3" r:id="rId2""#, 4);
        assert_eq!(attr(&e, b"type").as_deref(), Some("title"));
        assert_eq!(attr_i64(&e, b"idx"), Some(3));
        assert_eq!(attr_exact(&e, b"r:id").as_deref(), Some("rId2"));
        assert_eq!(attr(&e, b"missing"), None);

        let e = BytesStart::from_content(r#"p:sldId id="256" r:id="rId7""#, 7);
        assert_eq!(rel_attr(&e, b"id").as_deref(), Some("rId7"));
        assert_eq!(attr_exact(&e, b"id").as_deref(), Some("256"));
    }
}
