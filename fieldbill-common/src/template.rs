//! Token interpolation for payload and header templates.
//!
//! Templates embed tokens of the form `{{type:value:option}}`, where the
//! option segment is optional. Interpolation replaces each token with the
//! value produced by a resolver; a token the resolver cannot resolve is left
//! verbatim rather than removed.

/// One parsed template token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub value: String,
    pub option: Option<String>,
}

/// Locate the first well-formed token in `text`.
///
/// Returns the byte range of the full `{{...}}` occurrence and the parsed
/// token. Braced segments without at least a `type:value` pair are not
/// tokens and are skipped.
fn find_token(text: &str) -> Option<(usize, usize, Token)> {
    let mut search = 0;
    while let Some(offset) = text[search..].find("{{") {
        let open = search + offset;
        let close = open + 2 + text[open + 2..].find("}}")?;
        let inner = &text[open + 2..close];

        let mut segments = inner.splitn(3, ':');
        if let (Some(kind), Some(value)) = (segments.next(), segments.next())
            && !kind.is_empty()
        {
            let token = Token {
                kind: kind.to_string(),
                value: value.to_string(),
                option: segments.next().map(str::to_string),
            };
            return Some((open, close + 2, token));
        }

        search = close + 2;
    }
    None
}

/// Parse the first token in `text`, if any.
#[must_use]
pub fn parse(text: &str) -> Option<Token> {
    find_token(text).map(|(_, _, token)| token)
}

/// Replace every token in `text` with the resolver's output.
///
/// The resolver receives `(type, value, option)` for each match. When it
/// returns `None` the original token text is kept in place, so unresolvable
/// tokens survive interpolation unchanged. Text without tokens is returned
/// as-is.
pub fn interpolate<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(&str, &str, Option<&str>) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some((start, end, token)) = find_token(rest) {
        out.push_str(&rest[..start]);
        match resolve(&token.kind, &token.value, token.option.as_deref()) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_returns_first_token() {
        let token = parse("a {{field:total:currency}} b {{field:tax}}").expect("token");
        assert_eq!(token.kind, "field");
        assert_eq!(token.value, "total");
        assert_eq!(token.option.as_deref(), Some("currency"));
    }

    #[test]
    fn parse_without_option_segment() {
        let token = parse("{{name:Bob}}").expect("token");
        assert_eq!(token.kind, "name");
        assert_eq!(token.value, "Bob");
        assert_eq!(token.option, None);
    }

    #[test]
    fn parse_ignores_malformed_braces() {
        assert_eq!(parse("no tokens here"), None);
        assert_eq!(parse("{{notoken}}"), None);
        assert_eq!(parse("{{:empty}}"), None);
        // Malformed first, valid second
        let token = parse("{{bad}} then {{field:ok}}").expect("token");
        assert_eq!(token.value, "ok");
    }

    #[test]
    fn interpolate_is_noop_without_tokens() {
        let input = "plain text with } and { but no tokens";
        let output = interpolate(input, |_, _, _| Some("REPLACED".to_string()));
        assert_eq!(output, input);
    }

    #[test]
    fn interpolate_replaces_every_match() {
        let output = interpolate("Hi {{name:Bob}}!", |kind, value, option| {
            assert_eq!(kind, "name");
            assert_eq!(option, None);
            Some(value.to_string())
        });
        assert_eq!(output, "Hi Bob!");
    }

    #[test]
    fn unresolved_tokens_are_left_verbatim() {
        let input = "Hi {{name:Bob}}!";
        let output = interpolate(input, |_, _, _| None);
        assert_eq!(output, input);
    }

    #[test]
    fn mixed_resolution() {
        let output = interpolate("{{a:1}} {{b:2}} {{a:3}}", |kind, value, _| {
            (kind == "a").then(|| format!("[{value}]"))
        });
        assert_eq!(output, "[1] {{b:2}} [3]");
    }
}
