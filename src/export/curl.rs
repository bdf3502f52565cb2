//! Shell script and Markdown renderings built from curl commands.

use super::{group_by_method, path_segments, ExportContext, Segment};
use crate::route::Route;

const BASE_URL_VAR: &str = "${BASE_URL}";

/// Bash script with one curl command per route, grouped by method.
pub fn script(routes: &[Route], ctx: &ExportContext) -> String {
    let env = ctx.environment.display_name();
    let mut out = String::from("#!/bin/bash\n");
    out.push_str(&format!(
        "# Auto-generated CURL commands for {} API - {} Environment\n",
        ctx.project_name, env
    ));
    out.push_str(&format!("# Base URL for {}\n", env));
    out.push_str(&format!("BASE_URL=\"{}\"\n\n", ctx.base_url));

    for (method, group) in group_by_method(routes) {
        out.push_str(&format!("# {} Requests\n", method));
        out.push_str(&format!("# {}\n\n", "=".repeat(50)));
        for route in group {
            out.push_str(&format!("# {}\n", route.name()));
            out.push_str(&command(route));
            out.push_str("\n\n");
        }
    }
    out
}

/// Markdown document with the same commands in fenced bash blocks.
pub fn markdown(routes: &[Route], ctx: &ExportContext) -> String {
    let mut out = String::from("# API CURL Commands\n\n");
    out.push_str(&format!(
        "Auto-generated CURL commands for **{}** API\n\n",
        ctx.project_name
    ));
    out.push_str("## Base URL\n\n```bash\n");
    out.push_str(&format!("BASE_URL=\"{}\"\n", ctx.base_url));
    out.push_str("```\n\n");

    for (method, group) in group_by_method(routes) {
        out.push_str(&format!("## {} Requests\n\n", method));
        for route in group {
            out.push_str(&format!("### {}\n\n```bash\n", route.name()));
            out.push_str(&command(route));
            out.push_str("\n```\n\n");
        }
    }
    out
}

fn command(route: &Route) -> String {
    let mut cmd = format!(
        "curl -X {} \\\n  -H \"Content-Type: application/json\"",
        route.method
    );

    if route.method.has_body() {
        let fields: Vec<String> = route
            .body
            .iter()
            .map(|field| format!("\"{}\": \"VALUE\"", field))
            .collect();
        cmd.push_str(&format!(" \\\n  -d '{{{}}}'", fields.join(", ")));
    }

    cmd.push_str(&format!(" \\\n  \"{}\"", example_url(route)));
    cmd
}

fn example_url(route: &Route) -> String {
    let segments: Vec<String> = path_segments(&route.path)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(s) => s,
            Segment::Param(name) => example_value(&name).to_string(),
        })
        .collect();

    let mut url = format!("{}/{}", BASE_URL_VAR, segments.join("/"));
    if !route.query.is_empty() {
        let pairs: Vec<String> = route.query.iter().map(|q| format!("{}=VALUE", q)).collect();
        url.push('?');
        url.push_str(&pairs.join("&"));
    }
    url
}

fn example_value(param: &str) -> &'static str {
    let lower = param.to_lowercase();
    if lower.contains("name") && !lower.contains("id") {
        "example"
    } else {
        "1"
    }
}
