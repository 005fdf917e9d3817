//! Markdown to plain text conversion.
//!
//! The conversion is a fixed, ordered list of rewrite passes applied to the
//! whole document. Later passes rely on earlier ones having neutralized their
//! syntax (code is removed before emphasis, links before images, and so on),
//! so the order of [`PIPELINE`] is part of the contract.
//!
//! All patterns are compiled once into `LazyLock` statics. The `regex` crate
//! matches in linear time without backtracking, so every pass stays total on
//! adversarial input such as thousands of unbalanced emphasis markers.

use log::trace;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::domain::pass::Pass;

/// Sample document shown to new users; converts to a representative result.
pub const SAMPLE_MARKDOWN: &str = include_str!("../../assets/sample.md");

fn compile(pattern: &str) -> Regex {
    // Patterns are literals in this file, covered by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

static LINE_ENDING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\r\n?"));

// Only at the very start of the document.
static FRONT_MATTER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)\A---.*?---\n?"));

static HTML_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));

// === Code ===

static BACKTICK_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)```.*?```"));
static TILDE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)~~~.*?~~~"));
static INDENTED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^    .+$"));
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));

// === Block structure ===
//
// Line-anchored patterns only accept spaces and tabs as separators so a
// match never runs into the following line.

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^#{1,6}[ \t]+(.+)$"));
static HORIZONTAL_RULE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[-*_]{3,}[ \t]*$"));

// === Emphasis, in the order they must be applied ===

static EMPHASIS_RES: LazyLock<[Regex; 7]> = LazyLock::new(|| {
    [
        compile(r"\*\*\*(.+?)\*\*\*"), // bold italic
        compile(r"___(.+?)___"),       // bold italic
        compile(r"\*\*(.+?)\*\*"),     // bold
        compile(r"__(.+?)__"),         // bold
        compile(r"\*(.+?)\*"),         // italic
        compile(r"_(.+?)_"),           // italic
        compile(r"~~(.+?)~~"),         // strikethrough
    ]
});

// === Links and images ===

// The optional `!` is captured so image syntax can be skipped here and
// handled by the image pass.
static INLINE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(!?)\[([^\]]+)\]\([^)]+\)"));
static REFERENCE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(!?)\[([^\]]+)\]\[[^\]]*\]"));
static REFERENCE_DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*\[[^\]]+\]:[ \t]*.+$"));
static INLINE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"!\[([^\]]*)\]\([^)]+\)"));
static REFERENCE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"!\[([^\]]*)\]\[[^\]]*\]"));

// === Lists, quotes, tables ===

static BULLET_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[ \t]*[-*+][ \t]+(.+)$"));
static NUMBERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[ \t]*[0-9]+\.[ \t]+(.+)$"));
static BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^>[ \t]+(.+)$"));
static EMPTY_BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^>[ \t]*$"));
static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\|(.+)\|"));
// Removes the row together with its line break.
static TABLE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*[-|:][-|: \t]*$\n?"));

// === Whitespace ===

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"[ \t]+"));
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{3,}"));

/// The conversion passes, in the order they run.
pub static PIPELINE: &[Pass] = &[
    Pass::new("line_endings", normalize_line_endings),
    Pass::new("front_matter", strip_front_matter),
    Pass::new("html_comments", strip_html_comments),
    Pass::new("code_blocks", strip_code_blocks),
    Pass::new("inline_code", strip_inline_code),
    Pass::new("headers", strip_headers),
    Pass::new("horizontal_rules", strip_horizontal_rules),
    Pass::new("emphasis", strip_emphasis),
    Pass::new("links", strip_links),
    Pass::new("images", strip_images),
    Pass::new("list_markers", strip_list_markers),
    Pass::new("blockquotes", strip_blockquotes),
    Pass::new("tables", flatten_tables),
    Pass::new("soft_line_breaks", join_soft_line_breaks),
    Pass::new("whitespace", normalize_whitespace),
];

/// Converts Markdown into readable plain text.
///
/// Markdown syntax is stripped or flattened while the human-readable content
/// is kept: headers lose their hashes, emphasis loses its markers, links keep
/// only their text, tables become space-separated rows, and code blocks are
/// dropped entirely.
///
/// This is a best-effort flattening rather than a parser. Nested or adjacent
/// emphasis markers can come out inconsistently, and malformed tables are
/// flattened line by line as found.
///
/// # Arguments
///
/// * `markdown` - The Markdown source. Any string is accepted.
///
/// # Returns
///
/// The plain text. Lines carry no leading or trailing whitespace, runs of
/// spaces and tabs are single spaces, and paragraphs are separated by at most
/// one blank line.
pub fn convert_markdown_to_text(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    PIPELINE.iter().fold(markdown.to_string(), |text, pass| {
        let next = pass.run(&text);
        if next != text {
            trace!("pass '{}' rewrote document ({} -> {} bytes)", pass.name, text.len(), next.len());
        }
        next
    })
}

fn replace_all(re: &Regex, text: &str, replacement: &str) -> String {
    re.replace_all(text, replacement).into_owned()
}

fn normalize_line_endings(text: &str) -> String {
    replace_all(&LINE_ENDING_RE, text, "\n")
}

fn strip_front_matter(text: &str) -> String {
    replace_all(&FRONT_MATTER_RE, text, "")
}

fn strip_html_comments(text: &str) -> String {
    replace_all(&HTML_COMMENT_RE, text, "")
}

fn strip_code_blocks(text: &str) -> String {
    let text = replace_all(&BACKTICK_FENCE_RE, text, "");
    let text = replace_all(&TILDE_FENCE_RE, &text, "");
    replace_all(&INDENTED_CODE_RE, &text, "")
}

fn strip_inline_code(text: &str) -> String {
    replace_all(&INLINE_CODE_RE, text, "${1}")
}

fn strip_headers(text: &str) -> String {
    replace_all(&HEADER_RE, text, "${1}")
}

fn strip_horizontal_rules(text: &str) -> String {
    replace_all(&HORIZONTAL_RULE_RE, text, "")
}

fn strip_emphasis(text: &str) -> String {
    EMPHASIS_RES
        .iter()
        .fold(text.to_string(), |text, re| replace_all(re, &text, "${1}"))
}

// Keeps the link text, or the whole match when it is actually an image.
fn link_text(caps: &Captures<'_>) -> String {
    if caps[1].is_empty() {
        caps[2].to_string()
    } else {
        caps[0].to_string()
    }
}

fn strip_links(text: &str) -> String {
    let text = INLINE_LINK_RE.replace_all(text, link_text);
    let text = REFERENCE_LINK_RE.replace_all(&text, link_text);
    replace_all(&REFERENCE_DEFINITION_RE, &text, "")
}

fn strip_images(text: &str) -> String {
    let text = replace_all(&INLINE_IMAGE_RE, text, "${1}");
    replace_all(&REFERENCE_IMAGE_RE, &text, "${1}")
}

fn strip_list_markers(text: &str) -> String {
    let text = replace_all(&BULLET_ITEM_RE, text, "${1}");
    replace_all(&NUMBERED_ITEM_RE, &text, "${1}")
}

fn strip_blockquotes(text: &str) -> String {
    let text = replace_all(&BLOCKQUOTE_RE, text, "${1}");
    replace_all(&EMPTY_BLOCKQUOTE_RE, &text, "")
}

fn flatten_tables(text: &str) -> String {
    let text = TABLE_ROW_RE.replace_all(text, |caps: &Captures<'_>| {
        caps[1].split('|').map(str::trim).collect::<Vec<_>>().join(" ")
    });
    replace_all(&TABLE_SEPARATOR_RE, &text, "")
}

/// Joins a line with the next one when the sentence obviously continues:
/// the line is non-empty, does not end with a period, and the next line
/// starts with a lowercase letter.
fn join_soft_line_breaks(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut previous: Option<&str> = None;

    for line in text.split('\n') {
        if let Some(prev) = previous {
            let continues = prev.chars().last().is_some_and(|c| c != '.')
                && line.chars().next().is_some_and(char::is_lowercase);
            joined.push(if continues { ' ' } else { '\n' });
        }
        joined.push_str(line);
        previous = Some(line);
    }

    joined
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = SPACE_RUN_RE.replace_all(text, " ");
    // Trim lines before squeezing blank lines, otherwise whitespace-only
    // lines would turn into extra empty lines afterwards.
    let trimmed = collapsed.split('\n').map(str::trim).collect::<Vec<_>>().join("\n");
    BLANK_LINES_RE
        .replace_all(&trimmed, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(markdown: &str) -> String {
        convert_markdown_to_text(markdown)
    }

    fn assert_normalized(text: &str) {
        assert!(!text.contains("\n\n\n"), "3+ newlines in {text:?}");
        assert!(!text.contains("  "), "double space in {text:?}");
        assert!(!text.contains('\t'), "tab in {text:?}");
        for line in text.split('\n') {
            assert_eq!(line, line.trim(), "untrimmed line in {text:?}");
        }
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "line_endings",
                "front_matter",
                "html_comments",
                "code_blocks",
                "inline_code",
                "headers",
                "horizontal_rules",
                "emphasis",
                "links",
                "images",
                "list_markers",
                "blockquotes",
                "tables",
                "soft_line_breaks",
                "whitespace",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("   \n\t\n  "), "");
    }

    #[test]
    fn test_headers() {
        assert_eq!(convert("# Title"), "Title");
        assert_eq!(convert("###### Deep"), "Deep");
        assert_eq!(convert("## Intro\n\nBody text."), "Intro\n\nBody text.");
        // Seven hashes is not a header.
        assert_eq!(convert("####### nope"), "####### nope");
        // No space after the hashes.
        assert_eq!(convert("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(convert("**bold** and *italic*"), "bold and italic");
        assert_eq!(convert("__bold__ and _italic_"), "bold and italic");
        assert_eq!(convert("***both*** and ___both___"), "both and both");
        assert_eq!(convert("~~gone~~ kept"), "gone kept");
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        assert_eq!(convert("a * b\n\nc * d"), "a * b\n\nc * d");
    }

    #[test]
    fn test_links() {
        assert_eq!(convert("[link](http://x.com)"), "link");
        assert_eq!(convert("Visit [Google](https://google.com)!"), "Visit Google!");
        assert_eq!(convert("See [the docs][docs] for more."), "See the docs for more.");
        assert_eq!(
            convert("Read [this][1].\n\n[1]: https://example.com"),
            "Read this."
        );
    }

    #[test]
    fn test_images_keep_alt_text() {
        assert_eq!(convert("![A cat](cat.png)"), "A cat");
        assert_eq!(convert("![Logo][logo]"), "Logo");
        assert_eq!(convert("Before ![](empty.png) after"), "Before after");
    }

    #[test]
    fn test_link_inside_emphasis() {
        assert_eq!(convert("**[bold link](http://x.com)**"), "bold link");
    }

    #[test]
    fn test_code_blocks_removed() {
        assert_eq!(convert("```\ncode\n```\ntext"), "text");
        assert_eq!(convert("```rust\nfn main() {}\n```\n\nAfter."), "After.");
        assert_eq!(convert("~~~\n*not emphasis*\n~~~\nDone."), "Done.");
        assert_eq!(convert("Intro.\n\n    let x = 1;\n\nOutro."), "Intro.\n\nOutro.");
    }

    #[test]
    fn test_inline_code_keeps_content() {
        assert_eq!(convert("Run `cargo build` now."), "Run cargo build now.");
    }

    #[test]
    fn test_unclosed_fence_is_left_alone() {
        assert_eq!(convert("```\nnever closed"), "``` never closed");
    }

    #[test]
    fn test_front_matter_only_at_start() {
        assert_eq!(convert("---\ntitle: Hi\n---\nBody."), "Body.");
        assert_eq!(convert("Body.\n\n---\n\nMore."), "Body.\n\nMore.");
    }

    #[test]
    fn test_html_comments() {
        assert_eq!(convert("Keep <!-- drop --> this."), "Keep this.");
        assert_eq!(convert("A.\n<!--\nmulti\nline\n-->\nB."), "A.\n\nB.");
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(convert("Above.\n\n***\n\nBelow."), "Above.\n\nBelow.");
        assert_eq!(convert("Above.\n\n___\n\nBelow."), "Above.\n\nBelow.");
    }

    #[test]
    fn test_lists() {
        assert_eq!(convert("- One\n- Two\n- Three"), "One\nTwo\nThree");
        assert_eq!(convert("+ One\n  + Nested"), "One\nNested");
        assert_eq!(convert("1. First\n2. Second\n10. Tenth"), "First\nSecond\nTenth");
    }

    #[test]
    fn test_blockquotes() {
        assert_eq!(convert("> Quoted line.\n>\n> Another."), "Quoted line.\n\nAnother.");
    }

    #[test]
    fn test_tables() {
        assert_eq!(convert("| a | b |\n|---|---|\n| 1 | 2 |"), "a b\n1 2");
        assert_eq!(
            convert("| Left | Right |\n|:-----|------:|\n| X | Y |"),
            "Left Right\nX Y"
        );
    }

    #[test]
    fn test_soft_line_breaks() {
        assert_eq!(convert("This line wraps\ninto the next one."), "This line wraps into the next one.");
        assert_eq!(
            convert("one\ntwo\nthree"),
            "one two three"
        );
        // A sentence ending in a period keeps its line break.
        assert_eq!(convert("First sentence.\nsecond line."), "First sentence.\nsecond line.");
        // Uppercase starts a new line.
        assert_eq!(convert("No period\nCapitalized"), "No period\nCapitalized");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(convert("# Title\r\n\r\nSome **bold** text.\r\n"), "Title\n\nSome bold text.");
    }

    #[test]
    fn test_whitespace_normalization() {
        let text = convert("a   b\t\tc\n\n\n\n\nd  \n   e");
        assert_eq!(text, "a b c\n\nd\ne");
        assert_normalized(&text);
        // Whitespace-only lines must not leave three newlines behind.
        assert_eq!(convert("A.\n \n \n \nB."), "A.\n\nB.");
    }

    #[test]
    fn test_unicode_content() {
        assert_eq!(convert("# Café ☕\n\n**naïve** résumé"), "Café ☕\n\nnaïve résumé");
        assert_eq!(convert("| Feature | Status |\n|---|---|\n| Conversion | ✅ |"), "Feature Status\nConversion ✅");
    }

    #[test]
    fn test_idempotent_on_plain_output() {
        let once = convert("# Notes\n\nSome **bold** words\nwrapping here.\n\n- item one\n- item two");
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_adversarial_input_terminates() {
        let inputs = [
            "*".repeat(20_000),
            "_".repeat(20_000),
            "[".repeat(20_000),
            "|".repeat(20_000),
            "`".repeat(20_001),
            "<!--".repeat(5_000),
            "**a".repeat(5_000),
            "\n".repeat(20_000),
        ];
        for input in &inputs {
            assert_normalized(&convert(input));
        }
    }

    #[test]
    fn test_list_after_paragraph_keeps_blank_line() {
        assert_eq!(convert("Shopping.\n\n- Milk\n- Eggs"), "Shopping.\n\nMilk\nEggs");
    }

    #[test]
    fn test_sample_document() {
        let text = convert(SAMPLE_MARKDOWN);
        assert_normalized(&text);
        assert_eq!(
            text,
            "Welcome to Markdown Converter\n\
             \n\
             This is a powerful tool for converting Markdown to plain text.\n\
             \n\
             Features Include:\n\
             Real-time conversion\n\
             File upload support\n\
             One-click copying\n\
             Mac-optimized shortcuts\n\
             \n\
             Code Example:\n\
             \n\
             This tool is perfect for Mac users working with Google Docs!\n\
             \n\
             Learn more about Markdown\n\
             \n\
             Feature Status\n\
             Conversion ✅\n\
             File Support ✅\n\
             Mobile Ready ✅"
        );
    }
}
