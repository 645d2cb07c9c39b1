//! API contract checks against the running backend
//!
//! Each scenario asserts the liveness flag before its own request, so a
//! backend that never came up shows as one clear message per scenario rather
//! than a string of connection errors.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use super::{truthy, ApiContext, Scenario};
use crate::assert::{ensure, ensure_status};
use crate::error::HarnessResult;

pub(super) const SERVER_DOWN: &str = "Server failed to start";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::api("API health endpoint works", health),
        Scenario::api("GET /api/items returns array with data", list_items),
        Scenario::api("POST /api/items creates item with proper response", create_item),
        Scenario::api("POST /api/items validates input (rejects empty name)", reject_empty_name),
        Scenario::api("API returns 404 for unknown endpoints", unknown_endpoint),
        Scenario::api("Server serves static files", static_root),
    ]
}

fn health(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx.send(ctx.get("/api/health")).await?;
        ensure_status(&res, 200)?;
        ensure(res.success_flag() == Some(true), "Health check should return success")
    }
    .boxed()
}

fn list_items(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx.send(ctx.get("/api/items")).await?;
        ensure_status(&res, 200)?;
        ensure(res.success_flag() == Some(true), "Should return success")?;
        ensure(
            res.pointer("/data").map(Value::is_array).unwrap_or(false),
            "Data should be an array",
        )
    }
    .boxed()
}

fn create_item(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx
            .send(ctx.post("/api/items").json(json!({ "name": "Test Item" })))
            .await?;
        ensure_status(&res, 201)?;
        ensure(res.success_flag() == Some(true), "Should return success")?;
        ensure(truthy(res.pointer("/data/id")), "Created item should have id")?;
        ensure(
            res.pointer("/data/name") == Some(&json!("Test Item")),
            "Item name should match",
        )
    }
    .boxed()
}

fn reject_empty_name(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx.send(ctx.post("/api/items").json(json!({ "name": "" }))).await?;
        ensure(
            res.status == 400,
            format!("Expected 400 for invalid input, got {}", res.status),
        )?;
        ensure(res.success_flag() == Some(false), "Should indicate failure")
    }
    .boxed()
}

fn unknown_endpoint(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx.send(ctx.get("/api/nonexistent")).await?;
        ensure_status(&res, 404)
    }
    .boxed()
}

fn static_root(ctx: &ApiContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        ensure(ctx.live, SERVER_DOWN)?;
        let res = ctx.send(ctx.get("/")).await?;
        ensure_status(&res, 200)
    }
    .boxed()
}
