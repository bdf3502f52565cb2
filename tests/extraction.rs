//! End-to-end extraction over on-disk projects.

use std::fs;
use std::path::{Path, PathBuf};

use routemap::catalog::scanned_extensions;
use routemap::{discover_files, load_plugins, FrameworkSelector, HttpMethod, Route, RouteExtractor};
use tempfile::TempDir;

fn project() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn extract(root: &Path, framework: &str, plugin_dirs: &[PathBuf]) -> Vec<Route> {
    let loaded = load_plugins(plugin_dirs);
    let files = discover_files(root, &scanned_extensions(&loaded.registry)).unwrap();
    let mut extractor = RouteExtractor::new(framework.parse().unwrap(), loaded.registry).unwrap();
    extractor.extract_all(&files)
}

fn names(routes: &[Route]) -> Vec<String> {
    routes.iter().map(|r| r.name()).collect()
}

const EXPRESS_APP: &str = "\
const express = require('express');
const usersRouter = require('./routes/users');
const app = express();
app.use('/users', usersRouter);
app.get('/health', (req, res) => res.send('ok'));
";

const EXPRESS_USERS: &str = "\
const router = require('express').Router();

router.get('/', (req, res) => {
  const { page, limit = 20 } = req.query;
  res.json([]);
});

router.post('/', (req, res) => {
  const { name, email } = req.body;
  res.status(201).json({ name, email });
});

router.get('/:id', (req, res) => {
  res.json({ id: req.params.id });
});

module.exports = router;
";

#[test]
fn test_express_project_with_mounted_router() {
    let (_dir, root) = project();
    write(&root, "app.js", EXPRESS_APP);
    write(&root, "routes/users.js", EXPRESS_USERS);
    write(&root, "node_modules/lib/index.js", "app.get('/vendored', handler);");

    let routes = extract(&root, "auto", &[]);
    assert_eq!(
        names(&routes),
        vec!["GET /health", "GET /users", "POST /users", "GET /users/:id"]
    );

    let list = &routes[1];
    assert_eq!(list.query, vec!["page", "limit"]);
    assert!(list.body.is_empty());
    assert_eq!(list.file, root.join("routes/users.js"));
    assert_eq!(list.line, 3);

    assert_eq!(routes[2].body, vec!["name", "email"]);
    assert_eq!(routes[3].params, vec!["id"]);
    assert!(routes[3].query.is_empty());
}

#[test]
fn test_unreadable_file_does_not_affect_others() {
    let (_dir, root) = project();
    write(&root, "app.js", "app.get('/ok', (req, res) => res.end());\n");

    let loaded = load_plugins(&[]);
    let mut extractor = RouteExtractor::new(FrameworkSelector::Auto, loaded.registry).unwrap();
    let files = vec![root.join("missing.js"), root.join("app.js")];
    let routes = extractor.extract_all(&files);

    assert_eq!(names(&routes), vec!["GET /ok"]);
    assert!(extractor.extract_file(&root.join("missing.js")).is_empty());
}

const GIN_PLUGIN: &str = r#"
name: gin
extensions: [".go"]
patterns:
  - method: "GET|POST|PUT|DELETE|PATCH"
    route_regex: '\.(GET|POST|PUT|DELETE|PATCH)\s*\(\s*"([^"]+)"'
    param_regex: ':(\w+)'
ignore:
  - '^/debug/pprof'
"#;

const GIN_MAIN: &str = r#"package main

import "github.com/gin-gonic/gin"

func main() {
	r := gin.Default()
	r.GET("/ping", func(c *gin.Context) {
		q := c.Query("q")
		c.JSON(200, gin.H{"q": q})
	})
	r.POST("/users/:id", func(c *gin.Context) {
		name := c.PostForm("name")
		c.JSON(201, gin.H{"name": name})
	})
	r.GET("/debug/pprof/heap", pprofHandler)
	r.Run()
}
"#;

#[test]
fn test_plugin_project() {
    let (_dir, root) = project();
    write(&root, "rules/gin.yaml", GIN_PLUGIN);
    write(&root, "rules/broken.yaml", "patterns: [");
    write(&root, "main.go", GIN_MAIN);

    let plugin_dirs = vec![root.join("rules")];
    let loaded = load_plugins(&plugin_dirs);
    assert_eq!(loaded.registry.names(), vec!["gin"]);
    assert_eq!(loaded.skipped.len(), 1);

    for framework in ["auto", "gin", "GIN"] {
        let routes = extract(&root, framework, &plugin_dirs);
        assert_eq!(names(&routes), vec!["GET /ping", "POST /users/:id"], "framework {}", framework);
        assert_eq!(routes[0].query, vec!["q"]);
        assert_eq!(routes[1].params, vec!["id"]);
        assert_eq!(routes[1].body, vec!["name"]);
    }
}

#[test]
fn test_unknown_framework_is_rejected() {
    let loaded = load_plugins(&[]);
    let selector: FrameworkSelector = "rails".parse().unwrap();
    assert!(RouteExtractor::new(selector, loaded.registry).is_err());
}

const FLASK_APP: &str = "\
from flask import Flask, request

app = Flask(__name__)

@app.route('/search', methods=['GET', 'POST'])
def search():
    q = request.args.get('q')
    return q

@app.get('/items/<int:item_id>')
def get_item(item_id):
    return str(item_id)
";

#[test]
fn test_flask_project() {
    let (_dir, root) = project();
    write(&root, "app.py", FLASK_APP);

    let routes = extract(&root, "flask", &[]);
    assert_eq!(
        names(&routes),
        vec!["GET /search", "POST /search", "GET /items/<int:item_id>"]
    );
    assert_eq!(routes[0].query, vec!["q"]);
    assert_eq!(routes[1].query, vec!["q"]);
    assert_eq!(routes[2].params, vec!["item_id"]);
    assert!(routes.iter().all(|r| r.method != HttpMethod::Delete));
}

const SPRING_CONTROLLER: &str = r#"package com.example.orders;

@RestController
@RequestMapping("/api/orders")
public class OrderController {

    @GetMapping
    public List<Order> list(@RequestParam int page, @RequestParam(required = false) String status) {
        return service.list(page, status);
    }

    @PostMapping("/{id}/items")
    public Item add(@PathVariable Long id, @RequestPart MultipartFile receipt) {
        return service.add(id, receipt);
    }
}
"#;

#[test]
fn test_spring_project() {
    let (_dir, root) = project();
    write(&root, "src/main/java/com/example/orders/OrderController.java", SPRING_CONTROLLER);

    let routes = extract(&root, "auto", &[]);
    assert_eq!(names(&routes), vec!["GET /api/orders", "POST /api/orders/{id}/items"]);
    assert_eq!(routes[0].query, vec!["page", "status"]);
    assert_eq!(routes[1].params, vec!["id"]);
    assert_eq!(routes[1].body, vec!["receipt"]);
}

const LARAVEL_ROUTES: &str = "\
<?php

use Illuminate\\Support\\Facades\\Route;

Route::prefix('v1')->group(function () {
    Route::get('/posts', function (Request $request) {
        return Post::paginate($request->query('per_page'));
    });
    Route::post('/posts', function (Request $request) {
        return Post::create($request->only(['title', 'body']));
    });
});
";

#[test]
fn test_laravel_project() {
    let (_dir, root) = project();
    write(&root, "routes/api.php", LARAVEL_ROUTES);

    let routes = extract(&root, "laravel", &[]);
    assert_eq!(names(&routes), vec!["GET /v1/posts", "POST /v1/posts"]);
    assert_eq!(routes[0].query, vec!["per_page"]);
    assert_eq!(routes[1].body, vec!["title", "body"]);
}
