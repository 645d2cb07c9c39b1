//! Stylesheet feature checks

use super::{count_matches, is_match, Group, Scenario, StaticContext};
use crate::assert::ensure;
use crate::error::HarnessResult;

const MIN_RULES: usize = 5;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::file(Group::Css, "CSS uses custom properties with values", custom_properties),
        Scenario::file(Group::Css, "CSS has media queries with rules", media_queries),
        Scenario::file(Group::Css, "CSS uses flexbox or grid with actual layout", layout_model),
        Scenario::file(Group::Css, "CSS has meaningful styling (not just whitespace/empty)", rule_count),
    ]
}

fn read_stylesheet(ctx: &StaticContext) -> HarnessResult<String> {
    ctx.project.read(&ctx.layout.stylesheet)
}

fn custom_properties(ctx: &StaticContext) -> HarnessResult<()> {
    check_custom_properties(&read_stylesheet(ctx)?)
}

fn media_queries(ctx: &StaticContext) -> HarnessResult<()> {
    check_media_queries(&read_stylesheet(ctx)?)
}

fn layout_model(ctx: &StaticContext) -> HarnessResult<()> {
    check_layout_model(&read_stylesheet(ctx)?)
}

fn rule_count(ctx: &StaticContext) -> HarnessResult<()> {
    check_rule_count(&read_stylesheet(ctx)?)
}

fn check_custom_properties(css: &str) -> HarnessResult<()> {
    ensure(
        is_match(r"--[\w-]+\s*:\s*[^;]+;", css)?,
        "CSS custom properties found but not properly defined",
    )
}

fn check_media_queries(css: &str) -> HarnessResult<()> {
    ensure(
        is_match(r"(?s)@media[^{]*\{[^}]+\}", css)?,
        "Media queries found but appear empty",
    )
}

fn check_layout_model(css: &str) -> HarnessResult<()> {
    let flex = is_match(r"display\s*:\s*flex\s*;[^}]*(justify|align|flex)", css)?;
    let grid = is_match(
        r"display\s*:\s*grid\s*;[^}]*(grid-template|grid-column|grid-row)",
        css,
    )?;
    ensure(flex || grid, "Flexbox or grid found but not properly configured")
}

fn check_rule_count(css: &str) -> HarnessResult<()> {
    let rules = count_matches(r"[.#][\w-]+\s*\{[^}]*\}", css)?;
    ensure(
        rules >= MIN_RULES,
        format!("CSS should have at least {} style rules", MIN_RULES),
    )
}
