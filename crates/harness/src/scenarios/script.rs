//! Frontend script conventions

use super::{count_matches, is_match, Group, Scenario, StaticContext};
use crate::assert::ensure;
use crate::error::HarnessResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::file(Group::JavaScript, "JS uses const/let (not var)", no_var),
        Scenario::file(Group::JavaScript, "JS uses const or let declarations", block_declarations),
        Scenario::file(Group::JavaScript, "JS has async/await with actual functionality", async_fetch),
        Scenario::file(Group::JavaScript, "JS has event listeners attached to elements", event_listeners),
        Scenario::file(
            Group::JavaScript,
            "JS should have meaningful functions (not just empty stubs)",
            meaningful_functions,
        ),
    ]
}

fn read_script(ctx: &StaticContext) -> HarnessResult<String> {
    ctx.project.read(&ctx.layout.app_script)
}

fn no_var(ctx: &StaticContext) -> HarnessResult<()> {
    check_no_var(&read_script(ctx)?)
}

fn block_declarations(ctx: &StaticContext) -> HarnessResult<()> {
    check_declarations(&read_script(ctx)?)
}

fn async_fetch(ctx: &StaticContext) -> HarnessResult<()> {
    check_async(&read_script(ctx)?)
}

fn event_listeners(ctx: &StaticContext) -> HarnessResult<()> {
    check_listeners(&read_script(ctx)?)
}

fn meaningful_functions(ctx: &StaticContext) -> HarnessResult<()> {
    check_functions(&read_script(ctx)?)
}

fn check_no_var(js: &str) -> HarnessResult<()> {
    ensure(!is_match(r"\bvar\s+\w", js)?, "Using var instead of const/let")
}

fn check_declarations(js: &str) -> HarnessResult<()> {
    ensure(
        is_match(r"\b(const|let)\s+\w+\s*=", js)?,
        "Missing const or let variable declarations",
    )
}

fn check_async(js: &str) -> HarnessResult<()> {
    let has_async = is_match(r"async\s+(function|\()|async\s*\(.*?\)\s*=>", js)?;
    let has_await = is_match(r"await\s+(fetch|fetch\(|Promise)", js)?;
    let has_then = is_match(r"fetch\([^)]*\)\.then", js)?;
    ensure(
        (has_async && has_await) || has_then,
        "Should use async/await or fetch with .then pattern",
    )
}

fn check_listeners(js: &str) -> HarnessResult<()> {
    ensure(
        is_match(r#"\.addEventListener\s*\(\s*['"][a-z]+['"]"#, js)?,
        "Event listeners should be properly attached",
    )
}

fn check_functions(js: &str) -> HarnessResult<()> {
    let functions = count_matches(r"(function|const|let)\s+\w+\s*(\(|=)\s*[^{]*\{[^}]+\}", js)?;
    ensure(functions >= 2, "Should have at least 2 meaningful functions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("const items = [];", true ; "const only")]
    #[test_case("var items = [];", false ; "var declaration")]
    #[test_case("const variance = 1;", true ; "var as prefix")]
    fn var_detection(js: &str, ok: bool) {
        assert_eq!(check_no_var(js).is_ok(), ok);
    }

    #[test_case("let count = 0;", true ; "let")]
    #[test_case("function f() {}", false ; "no declarations")]
    fn declaration_detection(js: &str, ok: bool) {
        assert_eq!(check_declarations(js).is_ok(), ok);
    }

    #[test_case("async function load() { const res = await fetch('/api/items'); }", true ; "async function")]
    #[test_case("const load = async () => { await fetch('/api/items'); };", true ; "async arrow")]
    #[test_case("fetch('/api/items').then(r => r.json());", true ; "then chain")]
    #[test_case("async function load() { return 1; }", false ; "async without await")]
    fn async_detection(js: &str, ok: bool) {
        assert_eq!(check_async(js).is_ok(), ok);
    }

    #[test_case("form.addEventListener('submit', onSubmit);", true ; "single quotes")]
    #[test_case("button.addEventListener(\"click\", go);", true ; "double quotes")]
    #[test_case("button.onclick = go;", false ; "property handler")]
    fn listener_detection(js: &str, ok: bool) {
        assert_eq!(check_listeners(js).is_ok(), ok);
    }

    #[test]
    fn function_bodies_must_be_non_empty() {
        let stubs = "function a() {}\nfunction b() {}";
        assert!(check_functions(stubs).is_err());

        let real = "function a() { return 1; }\nconst b = (x) => { return x * 2; };";
        assert!(check_functions(real).is_ok());
    }
}
