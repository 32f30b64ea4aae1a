//! Router builder for the HTTP server

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use bookinfo_kernel::{settings::ApiSettings, ModuleRegistry};

/// Header listing every API version the server answers to.
pub const SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";

/// Mount point of a module for one API version.
pub fn module_prefix(version: u32, module_name: &str) -> String {
    format!("/api/v{}/{}", version, module_name)
}

/// Builder for constructing the main HTTP router.
///
/// Layers wrap only the routes present when they are added, so mount routes
/// first and add middleware last.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/v{version}/{module_name}`
    pub fn mount_module(mut self, version: u32, module_name: &str, module_router: Router) -> Self {
        self.router = self
            .router
            .nest(&module_prefix(version, module_name), module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Report the served API versions on every response
    pub fn with_supported_versions(mut self, api: &ApiSettings) -> Self {
        match HeaderValue::from_str(&api.supported_versions_header()) {
            Ok(value) => {
                self.router = self.router.layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static(SUPPORTED_VERSIONS_HEADER),
                    value,
                ));
            }
            Err(e) => tracing::warn!(error = %e, "skipping supported versions header"),
        }
        self
    }

    /// Answer panics from any inner handler or layer with the opaque 500 body
    pub fn with_catch_panic(mut self) -> Self {
        self.router = self
            .router
            .layer(CatchPanicLayer::custom(crate::error::panic_response));
        self
    }

    /// Serve the OpenAPI documents and Swagger UI.
    ///
    /// Swagger UI lists one document per API version; `/docs/openapi.json`
    /// carries every version in a single document.
    pub fn with_openapi(
        mut self,
        merged: serde_json::Value,
        per_version: Vec<(u32, serde_json::Value)>,
    ) -> Self {
        let mut swagger = utoipa_swagger_ui::SwaggerUi::new("/swagger-ui");

        for (version, document) in per_version {
            match serde_json::from_value::<utoipa::openapi::OpenApi>(document.clone()) {
                Ok(typed) => {
                    swagger = swagger.url(format!("/api-docs/v{}/openapi.json", version), typed);
                }
                Err(e) => {
                    tracing::warn!(version, error = %e, "OpenAPI document is not valid; leaving it out of Swagger UI");
                }
            }

            self.router = self.router.route(
                &format!("/docs/v{}/openapi.json", version),
                get(move || async move { axum::Json(document.clone()) }),
            );
        }

        self.router = self.router.merge(swagger);
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(merged.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge every module's OpenAPI fragment into one document, once per served version.
pub fn openapi_document(registry: &ModuleRegistry, api: &ApiSettings) -> serde_json::Value {
    let latest = api.versions.iter().max().copied().unwrap_or(1);
    build_document(registry, api, &api.versions, latest)
}

/// The document for a single API version group.
pub fn openapi_document_for_version(
    registry: &ModuleRegistry,
    api: &ApiSettings,
    version: u32,
) -> serde_json::Value {
    build_document(registry, api, &[version], version)
}

/// One document per served version, in ascending order.
pub fn openapi_documents_by_version(
    registry: &ModuleRegistry,
    api: &ApiSettings,
) -> Vec<(u32, serde_json::Value)> {
    api.versions
        .iter()
        .map(|&version| (version, openapi_document_for_version(registry, api, version)))
        .collect()
}

fn build_document(
    registry: &ModuleRegistry,
    api: &ApiSettings,
    versions: &[u32],
    document_version: u32,
) -> serde_json::Value {
    let mut document = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": api.title,
            "version": document_version.to_string(),
            "description": format!("Supported API versions: {}", api.supported_versions_header())
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    document["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": { "type": "object" } },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    document["components"]["schemas"]["InternalErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "StatusCode": { "type": "integer" },
            "Message": { "type": "string" }
        },
        "required": ["StatusCode", "Message"]
    });

    document["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(|p| p.as_object()) {
            for &version in versions {
                let prefix = module_prefix(version, module.name());
                for (path, path_item) in paths {
                    let full_path = if path == "/" {
                        prefix.clone()
                    } else {
                        format!("{}{}", prefix, path)
                    };
                    document["paths"][full_path] = path_item.clone();
                }
            }
        }

        if let Some(schemas) = fragment
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                document["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    document
}

/// Time-ordered request ids
#[derive(Clone)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
