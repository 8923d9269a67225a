//! # Classifying single lines of source code.
//!
//! Everything here is line-local and syntactic. There is no brace or
//! string awareness, so a string literal containing `// TODO(x): ...` is
//! still a TODO marker.
use super::langs::CommentProfile;

use nom::{bytes::complete as bytes, character::complete as character, combinator, IResult, Parser};

/// The pieces of a TODO marker line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoMarker<'a> {
    /// The text between the parentheses in `TODO(name):`, if any.
    pub assignee: Option<&'a str>,
    /// Everything after the colon.
    pub description: &'a str,
}

/// The outcome of classifying one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    Todo(TodoMarker<'a>),
    /// Any other comment line, with the text after the introducer.
    Comment(&'a str),
    StructOpener,
    Blank,
    Other,
}

impl LineKind<'_> {
    /// Blank lines and comment lines, the ones skipped when looking for the
    /// statement after a call.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            LineKind::Blank | LineKind::Comment(_) | LineKind::Todo(_)
        )
    }
}

/// Eat a comment introducer and the whitespace around it.
///
/// ```rust
/// use todo_report_lib::parser::{langs::CommentProfile, line::*};
///
/// assert_eq!(
///     comment_start(CommentProfile::Hash, "  #  Here is a comment."),
///     Ok(("Here is a comment.", ()))
/// );
/// assert!(comment_start(CommentProfile::DoubleSlash, "# nope").is_err());
/// ```
pub fn comment_start(profile: CommentProfile, i: &str) -> IResult<&str, ()> {
    let (i, _) = character::space0(i)?;
    let (i, _) = bytes::tag(profile.introducer())(i)?;
    let (i, _) = character::space0(i)?;
    Ok((i, ()))
}

/// Eat an assigned name, up to the first `):`.
///
/// ```rust
/// use todo_report_lib::parser::line::*;
///
/// assert_eq!(assignee("(kara): fix it"), Ok((": fix it", "kara")));
/// assert_eq!(assignee("(a) b): c"), Ok((": c", "a) b")));
/// assert!(assignee("(dangling").is_err());
/// ```
pub fn assignee(i: &str) -> IResult<&str, &str> {
    let (i, _) = character::char('(')(i)?;
    let (i, name) = bytes::take_until("):")(i)?;
    let (i, _) = character::char(')')(i)?;
    Ok((i, name))
}

/// Eat a whole TODO marker line.
///
/// ```rust
/// use todo_report_lib::parser::{langs::CommentProfile, line::*};
///
/// let (_, marker) = todo_marker(CommentProfile::DoubleSlash, "// TODO(sam): Pool these.").unwrap();
/// assert_eq!(marker.assignee, Some("sam"));
/// assert_eq!(marker.description, "Pool these.");
///
/// let (_, marker) = todo_marker(CommentProfile::Hash, "#TODO: bump the version").unwrap();
/// assert_eq!(marker.assignee, None);
/// assert_eq!(marker.description, "bump the version");
///
/// assert!(todo_marker(CommentProfile::DoubleSlash, "// TODO without a colon").is_err());
/// ```
pub fn todo_marker(profile: CommentProfile, i: &str) -> IResult<&str, TodoMarker<'_>> {
    let (i, _) = comment_start(profile, i)?;
    let (i, _) = bytes::tag("TODO")(i)?;
    let (i, name) = combinator::opt(assignee).parse(i)?;
    let (i, _) = character::char(':')(i)?;
    let (i, _) = character::space0(i)?;
    let description = i.trim_end();
    Ok((
        "",
        TodoMarker {
            assignee: name.filter(|name| !name.is_empty()),
            description,
        },
    ))
}

/// Eat any comment line, returning its trimmed text.
pub fn comment_text(profile: CommentProfile, i: &str) -> IResult<&str, &str> {
    let (i, _) = comment_start(profile, i)?;
    Ok(("", i.trim()))
}

/// Eat a `struct Name` opener, returning the name.
///
/// ```rust
/// use todo_report_lib::parser::line::*;
///
/// assert_eq!(struct_opener("  struct Vec3 {"), Ok((" {", "Vec3")));
/// assert!(struct_opener("structure").is_err());
/// assert!(struct_opener("typedef struct Foo").is_err());
/// ```
pub fn struct_opener(i: &str) -> IResult<&str, &str> {
    let (i, _) = character::space0(i)?;
    let (i, _) = bytes::tag("struct")(i)?;
    let (i, _) = character::space1(i)?;
    bytes::take_while1(|c: char| c.is_alphanumeric() || c == '_')(i)
}

/// Whether a continuation comment's text is an editorial `NOTE:` that ends
/// the TODO's description.
pub fn is_note_cutoff(text: &str) -> bool {
    let tag: IResult<&str, &str> = bytes::tag("NOTE:")(text.trim());
    tag.is_ok()
}

/// Classify one line. Total: anything unrecognized is [`LineKind::Other`].
///
/// ```rust
/// use todo_report_lib::parser::{langs::CommentProfile, line::*};
///
/// let profile = CommentProfile::DoubleSlash;
/// assert_eq!(classify(profile, "   \t"), LineKind::Blank);
/// assert_eq!(classify(profile, "  // more words "), LineKind::Comment("more words"));
/// assert_eq!(classify(profile, "struct Foo {"), LineKind::StructOpener);
/// assert_eq!(classify(profile, "x += 1;"), LineKind::Other);
/// ```
pub fn classify(profile: CommentProfile, line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Ok((_, marker)) = todo_marker(profile, trimmed) {
        return LineKind::Todo(marker);
    }
    if let Ok((_, text)) = comment_text(profile, trimmed) {
        return LineKind::Comment(text);
    }
    if struct_opener(trimmed).is_ok() {
        return LineKind::StructOpener;
    }
    LineKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLASH: CommentProfile = CommentProfile::DoubleSlash;
    const HASH: CommentProfile = CommentProfile::Hash;

    #[test]
    fn todo_markers() {
        assert_eq!(
            classify(SLASH, "    // TODO(kara): Handle resize events.   "),
            LineKind::Todo(TodoMarker {
                assignee: Some("kara"),
                description: "Handle resize events.",
            })
        );
        assert_eq!(
            classify(SLASH, "//TODO():"),
            LineKind::Todo(TodoMarker {
                assignee: None,
                description: "",
            })
        );
        assert_eq!(
            classify(HASH, "# TODO: cache the wheel"),
            LineKind::Todo(TodoMarker {
                assignee: None,
                description: "cache the wheel",
            })
        );
    }

    #[test]
    fn profiles_dont_mix() {
        assert_eq!(classify(HASH, "// TODO: nope"), LineKind::Other);
        assert_eq!(classify(SLASH, "# TODO: nope"), LineKind::Other);
        assert_eq!(classify(SLASH, "#include <stdio.h>"), LineKind::Other);
    }

    #[test]
    fn near_misses_are_plain_comments() {
        assert_eq!(
            classify(SLASH, "// TODO fix this"),
            LineKind::Comment("TODO fix this")
        );
        assert_eq!(
            classify(SLASH, "// todo(me): lowercase"),
            LineKind::Comment("todo(me): lowercase")
        );
        assert_eq!(
            classify(SLASH, "// TODO (me): spaced"),
            LineKind::Comment("TODO (me): spaced")
        );
        assert_eq!(classify(SLASH, "//"), LineKind::Comment(""));
        assert_eq!(classify(SLASH, "/// doc"), LineKind::Comment("/ doc"));
    }

    #[test]
    fn todo_inside_code_is_not_a_marker() {
        assert_eq!(
            classify(SLASH, "x = 1; // TODO(me): trailing"),
            LineKind::Other
        );
    }

    #[test]
    fn struct_openers() {
        assert_eq!(classify(SLASH, "\tstruct _Node"), LineKind::StructOpener);
        assert_eq!(classify(SLASH, "struct"), LineKind::Other);
        assert_eq!(classify(SLASH, "struct {"), LineKind::Other);
    }

    #[test]
    fn note_cutoff() {
        assert!(is_note_cutoff("NOTE: this is editorial"));
        assert!(is_note_cutoff("  NOTE:"));
        assert!(!is_note_cutoff("NOTE this is not"));
        assert!(!is_note_cutoff("note: lowercase"));
        assert!(!is_note_cutoff("A NOTE: in the middle"));
    }

    #[test]
    fn ignorable_lines() {
        assert!(classify(SLASH, "").is_ignorable());
        assert!(classify(SLASH, "  // just words").is_ignorable());
        assert!(classify(SLASH, "// TODO(x): y").is_ignorable());
        assert!(!classify(SLASH, "ASSERT(ok);").is_ignorable());
        assert!(!classify(SLASH, "struct Foo").is_ignorable());
    }
}
