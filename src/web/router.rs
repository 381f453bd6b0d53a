//! # Hash Router Module / 哈希路由模块
//!
//! The fixed route table of the web front. Navigation is hash based
//! (`#/`, `#/log`), so routes are resolved from URL fragments.
//!
//! 网页前端的固定路由表。导航基于哈希（`#/`、`#/log`），
//! 因此路由从 URL 片段中解析。

/// Root views a route can mount. / 路由可挂载的根视图。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    UpdateLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

/// Route table, in match order.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "Home",
        view: View::Home,
    },
    Route {
        path: "/log",
        name: "UpdateLog",
        view: View::UpdateLog,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Router {
    routes: &'static [Route],
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: ROUTES }
    }

    pub fn routes(&self) -> &'static [Route] {
        self.routes
    }

    /// Resolves a fragment such as `""`, `"#"`, `"#/"` or `"#/log?x=1"`.
    ///
    /// 解析 `""`、`"#"`、`"#/"` 或 `"#/log?x=1"` 这样的片段。
    pub fn resolve(&self, fragment: &str) -> Option<&'static Route> {
        let path = fragment.strip_prefix('#').unwrap_or(fragment);
        let path = path.split('?').next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn by_name(&self, name: &str) -> Option<&'static Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// `#<path>` for a named route.
    pub fn href(&self, name: &str) -> Option<String> {
        self.by_name(name).map(|r| format!("#{}", r.path))
    }
}
