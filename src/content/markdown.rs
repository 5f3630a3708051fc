//! Markdown rendering with heading ids and language-tagged code blocks

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::helpers::html_escape;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

/// Optional server-side highlighter
struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

/// Markdown renderer
#[derive(Default)]
pub struct MarkdownRenderer {
    highlighter: Option<Highlighter>,
}

impl MarkdownRenderer {
    /// Create a renderer that leaves highlighting to the browser
    pub fn new() -> Self {
        Self { highlighter: None }
    }

    /// Create a renderer that highlights code blocks with the named syntect theme
    pub fn with_highlighting(theme: &str) -> Result<Self> {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(theme)
            .ok_or_else(|| anyhow!("Unknown highlight theme: {}", theme))?;

        Ok(Self {
            highlighter: Some(Highlighter {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
            }),
        })
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is already split off by FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let mut parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();

        while let Some(event) = parser.next() {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let mut inner = Vec::new();
                    let mut text = String::new();
                    for event in parser.by_ref() {
                        match event {
                            Event::End(TagEnd::Heading(_)) => break,
                            Event::Text(ref s) | Event::Code(ref s) => text.push_str(s),
                            _ => {}
                        }
                        inner.push(event);
                    }

                    let id = id.or_else(|| {
                        let derived = heading_id(&text);
                        (!derived.is_empty()).then(|| CowStr::from(derived))
                    });

                    events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    }));
                    events.extend(inner);
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|s| s.to_string()),
                        CodeBlockKind::Indented => None,
                    };

                    let mut code = String::new();
                    for event in parser.by_ref() {
                        match event {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(s) => code.push_str(&s),
                            _ => {}
                        }
                    }

                    let block = self.code_block(&code, lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                }
                event => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Wrap a code block, tagging it with its language
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let body = match &self.highlighter {
            Some(highlighter) => highlighter
                .highlight(code, lang)
                .unwrap_or_else(|| html_escape(code)),
            None => html_escape(code),
        };

        match lang {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                html_escape(lang),
                body
            ),
            None => format!("<pre><code>{}</code></pre>\n", body),
        }
    }
}

impl Highlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Option<String> {
        let lang = lang.unwrap_or("text");
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::new();
        for line in LinesWithEndings::from(code) {
            let regions = lines.highlight_line(line, &self.syntax_set).ok()?;
            out.push_str(&styled_line_to_highlighted_html(&regions, IncludeBackground::No).ok()?);
        }
        Some(out)
    }
}

/// Anchor id for a heading: lowercased, non-word runs become `-`
pub fn heading_id(text: &str) -> String {
    NON_WORD.replace_all(&text.to_lowercase(), "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Intro\n\nThis is a test.");
        assert!(html.contains("<p>Intro</p>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_heading_ids() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Getting Started\n\n### Step `one`\n");
        assert!(html.contains(r#"<h2 id="getting-started">Getting Started</h2>"#));
        assert!(html.contains(r#"<h3 id="step-one">Step <code>one</code></h3>"#));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Setup {#install}\n");
        assert!(html.contains(r#"<h2 id="install">Setup</h2>"#));
    }

    #[test]
    fn test_heading_id_derivation() {
        assert_eq!(heading_id("Hello World"), "hello-world");
        assert_eq!(heading_id("What's new?"), "what-s-new-");
        assert_eq!(heading_id("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_render_code_block_with_language() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() { let a = 1 < 2; }\n```");
        assert!(html.contains(
            r#"<pre><code class="language-rust">fn main() { let a = 1 &lt; 2; }"#
        ));
        assert!(html.contains("</code></pre>"));
    }

    #[test]
    fn test_render_code_block_without_language() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("    plain code\n");
        assert!(html.contains("<pre><code>plain code\n</code></pre>"));
        assert!(!html.contains("language-"));
    }

    #[test]
    fn test_highlighting_keeps_wrapper() {
        let renderer = MarkdownRenderer::with_highlighting("base16-ocean.dark").unwrap();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<pre><code class="language-rust">"#));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_unknown_highlight_theme() {
        assert!(MarkdownRenderer::with_highlighting("no-such-theme").is_err());
    }
}
