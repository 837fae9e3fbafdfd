use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape as escape;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;
const STYLESHEET_THEME: &str = "InspiredGitHub";

pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// GitHub-flavoured markdown with syntax-highlighted code fences.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighlightingRenderer;

impl MarkdownRenderer for HighlightingRenderer {
    fn render(&self, markdown: &str) -> String {
        render_markdown(markdown)
    }
}

#[derive(Debug)]
struct CodeBlockState {
    language: Option<String>,
    content: String,
}

/// Render markdown to HTML. Soft line breaks become `<br />`.
pub fn render_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut events = Vec::new();
    let mut code_block: Option<CodeBlockState> = None;

    for event in Parser::new_ext(markdown, options) {
        if let Some(state) = code_block.as_mut() {
            match event {
                Event::Text(content) => state.content.push_str(&content),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(state) = code_block.take() {
                        events.push(Event::Html(highlight_code_block(&state).into()));
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code_block = Some(CodeBlockState {
                    language: fence_language(&kind),
                    content: String::new(),
                });
            }
            Event::SoftBreak => events.push(Event::HardBreak),
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// CSS for the class names emitted inside highlighted code blocks.
pub fn highlight_stylesheet() -> String {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes
        .themes
        .get(STYLESHEET_THEME)
        .or_else(|| themes.themes.values().next())
    else {
        return String::new();
    };
    css_for_theme_with_class_style(theme, CLASS_STYLE).unwrap_or_default()
}

fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    let CodeBlockKind::Fenced(info) = kind else {
        return None;
    };
    let token = info.split_whitespace().next()?;
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '#' | '_' | '.'))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn highlight_code_block(state: &CodeBlockState) -> String {
    let syntax_set = syntax_set();
    let syntax = resolve_syntax(syntax_set, state);

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(&state.content) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            engine_logging::engine_debug!("highlighting failed for {}: {}", syntax.name, err);
            return wrap_code(state.language.as_deref(), &escape_html(&state.content));
        }
    }
    let label = state
        .language
        .clone()
        .or_else(|| detected_label(syntax_set, syntax));
    wrap_code(label.as_deref(), &generator.finalize())
}

/// Tagged fences use the tag; unknown or missing tags fall back to first-line
/// detection (shebangs, XML prologs, modelines) and finally plain text.
fn resolve_syntax<'a>(syntax_set: &'a SyntaxSet, state: &CodeBlockState) -> &'a SyntaxReference {
    state
        .language
        .as_deref()
        .and_then(|lang| {
            syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| syntax_set.find_syntax_by_extension(lang))
        })
        .or_else(|| syntax_set.find_syntax_by_first_line(&state.content))
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text())
}

fn detected_label(syntax_set: &SyntaxSet, syntax: &SyntaxReference) -> Option<String> {
    if syntax.name == syntax_set.find_syntax_plain_text().name {
        return None;
    }
    syntax
        .file_extensions
        .first()
        .cloned()
        .or_else(|| Some(syntax.name.to_lowercase().replace(' ', "-")))
}

fn wrap_code(language: Option<&str>, body: &str) -> String {
    match language {
        Some(lang) => format!("<pre><code class=\"highlight language-{lang}\">{body}</code></pre>\n"),
        None => format!("<pre><code class=\"highlight\">{body}</code></pre>\n"),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape::escape_html(&mut out, text);
    out
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}
