//! Entry document checks

use super::{is_match, Group, Scenario, StaticContext};
use crate::assert::ensure;
use crate::error::HarnessResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::file(Group::Html, "HTML has proper doctype", doctype),
        Scenario::file(Group::Html, "HTML has lang attribute with actual language", lang_attribute),
        Scenario::file(Group::Html, "HTML has viewport meta tag", viewport_meta),
        Scenario::file(Group::Html, "HTML has all three semantic elements", semantic_elements),
        Scenario::file(Group::Html, "HTML links CSS and JS files", links_assets),
    ]
}

fn read_index(ctx: &StaticContext) -> HarnessResult<String> {
    ctx.project.read(&ctx.layout.index_html)
}

fn doctype(ctx: &StaticContext) -> HarnessResult<()> {
    check_doctype(&read_index(ctx)?)
}

fn lang_attribute(ctx: &StaticContext) -> HarnessResult<()> {
    check_lang(&read_index(ctx)?)
}

fn viewport_meta(ctx: &StaticContext) -> HarnessResult<()> {
    check_viewport(&read_index(ctx)?)
}

fn semantic_elements(ctx: &StaticContext) -> HarnessResult<()> {
    check_semantic(&read_index(ctx)?)
}

fn links_assets(ctx: &StaticContext) -> HarnessResult<()> {
    check_links(&read_index(ctx)?)
}

fn check_doctype(html: &str) -> HarnessResult<()> {
    ensure(html.to_lowercase().contains("<!doctype html>"), "Missing DOCTYPE")
}

fn check_lang(html: &str) -> HarnessResult<()> {
    ensure(
        is_match(r#"(?i)lang\s*=\s*["'][a-z]{2}["']"#, html)?,
        "Missing or empty lang attribute",
    )
}

fn check_viewport(html: &str) -> HarnessResult<()> {
    ensure(
        is_match(r"viewport.*content\s*=\s*", html)?,
        "Missing or empty viewport meta tag",
    )
}

fn check_semantic(html: &str) -> HarnessResult<()> {
    let header = is_match(r"(?i)<header", html)?;
    let main = is_match(r"(?i)<main", html)?;
    let footer = is_match(r"(?i)<footer", html)?;
    ensure(
        header && main && footer,
        "Missing semantic elements (header, main, footer)",
    )
}

fn check_links(html: &str) -> HarnessResult<()> {
    let css = is_match(r"(?i)link[^>]*href[^>]*(css|styles)", html)?;
    let js = is_match(r"(?i)<script[^>]*src[^>]*(js|app)", html)?
        || is_match(r"(?i)<script[^>]*>[^<]*(document|window|function)", html)?;
    ensure(css && js, "HTML should link to CSS and include JavaScript")
}
