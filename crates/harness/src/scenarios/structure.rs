//! Project layout checks

use std::path::Path;

use serde_json::Value;

use super::{is_match, truthy, Group, Scenario, StaticContext};
use crate::assert::ensure;
use crate::config::ProjectLayout;
use crate::error::HarnessResult;

pub(super) fn scenarios(layout: &ProjectLayout) -> Vec<Scenario> {
    let entry = layout.server_entry.display();
    let index = layout.index_html.display();
    let css = layout.stylesheet.display();
    let js = layout.app_script.display();
    let pkg = layout.package_json.display();

    vec![
        Scenario::file(Group::Structure, format!("{} exists", entry), server_entry_exists),
        Scenario::file(
            Group::Structure,
            format!("{} has actual content (not empty)", entry),
            server_entry_has_content,
        ),
        Scenario::file(Group::Structure, format!("{} exists", index), index_exists),
        Scenario::file(Group::Structure, format!("{} exists", css), stylesheet_exists),
        Scenario::file(
            Group::Structure,
            format!("{} has actual styling (not empty)", css),
            stylesheet_has_rules,
        ),
        Scenario::file(Group::Structure, format!("{} exists", js), app_script_exists),
        Scenario::file(
            Group::Structure,
            format!("{} has actual content (not empty)", js),
            app_script_has_content,
        ),
        Scenario::file(Group::Structure, format!("{} has start script", pkg), package_has_start_script),
    ]
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn ensure_exists(ctx: &StaticContext, path: &Path) -> HarnessResult<()> {
    ensure(ctx.project.exists(path), format!("{} not found", path.display()))
}

fn server_entry_exists(ctx: &StaticContext) -> HarnessResult<()> {
    ensure_exists(ctx, &ctx.layout.server_entry)
}

fn server_entry_has_content(ctx: &StaticContext) -> HarnessResult<()> {
    let path = &ctx.layout.server_entry;
    let content = ctx.project.read(path)?;
    ensure(
        content.chars().count() > 100,
        format!("{} appears to be empty or minimal", path.display()),
    )?;
    ensure(
        is_match(r"require|import|function|class|\bfn\b|\buse\b", &content)?,
        format!("{} missing actual code", path.display()),
    )
}

fn index_exists(ctx: &StaticContext) -> HarnessResult<()> {
    ensure_exists(ctx, &ctx.layout.index_html)
}

fn stylesheet_exists(ctx: &StaticContext) -> HarnessResult<()> {
    ensure_exists(ctx, &ctx.layout.stylesheet)
}

fn stylesheet_has_rules(ctx: &StaticContext) -> HarnessResult<()> {
    let path = &ctx.layout.stylesheet;
    let content = ctx.project.read(path)?;
    ensure(
        content.chars().count() > 50,
        format!("{} appears to be empty or minimal", file_name(path)),
    )?;
    ensure(
        is_match(r"[.#][\w-]+\s*\{|@media", &content)?,
        format!("{} missing actual CSS rules", file_name(path)),
    )
}

fn app_script_exists(ctx: &StaticContext) -> HarnessResult<()> {
    ensure_exists(ctx, &ctx.layout.app_script)
}

fn app_script_has_content(ctx: &StaticContext) -> HarnessResult<()> {
    let path = &ctx.layout.app_script;
    let content = ctx.project.read(path)?;
    ensure(
        content.chars().count() > 100,
        format!("{} appears to be empty or minimal", file_name(path)),
    )?;
    ensure(
        is_match(r"function|const|let|class|async", &content)?,
        format!("{} missing actual JavaScript", file_name(path)),
    )
}

fn package_has_start_script(ctx: &StaticContext) -> HarnessResult<()> {
    let path = &ctx.layout.package_json;
    let pkg: Value = serde_json::from_str(&ctx.project.read(path)?)?;
    ensure(
        truthy(pkg.pointer("/scripts/start")),
        format!("{} missing start script", file_name(path)),
    )
}
