pub mod data;
pub mod facade;
pub mod logic;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookinfo_db::DbPool;
use bookinfo_kernel::{InitCtx, Migration, Module};
use serde_json::json;
use utoipa::PartialSchema;

use data::SqliteBookInformationStore;
use facade::{BookInformationFacade, BookInformationRequest, BookInformationResponse, ServiceFacade};
use logic::BookInformationManager;

/// Module name; also the URL segment under `/api/v{version}/`
pub const MODULE_NAME: &str = "book-information";

/// Book information inventory: CRUD over `book_information`
pub struct BookInformationModule {
    facade: Arc<dyn BookInformationFacade>,
}

impl BookInformationModule {
    pub fn new(facade: Arc<dyn BookInformationFacade>) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl Module for BookInformationModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "book information module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.facade.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        data::MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book information module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book information module stopped");
        Ok(())
    }
}

fn error_response(description: &str, schema: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn record_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInformationResponse" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_parameter = json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    }]);
    let request_body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInformationRequest" }
            }
        }
    });
    let internal = error_response("Internal server error", "InternalErrorResponse");
    let not_found = error_response("Book information not found", "ErrorResponse");
    let invalid = error_response("Invalid book information", "ErrorResponse");

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List book information",
                    "tags": ["BookInformation"],
                    "responses": {
                        "200": {
                            "description": "Every book information record",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/BookInformationResponse" }
                                    }
                                }
                            }
                        },
                        "500": internal
                    }
                },
                "post": {
                    "summary": "Create book information",
                    "tags": ["BookInformation"],
                    "requestBody": request_body,
                    "responses": {
                        "201": record_response("Created record"),
                        "400": invalid,
                        "409": error_response("Title already exists", "ErrorResponse"),
                        "500": internal
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get book information",
                    "tags": ["BookInformation"],
                    "parameters": id_parameter,
                    "responses": {
                        "200": record_response("Book information record"),
                        "404": not_found,
                        "500": internal
                    }
                },
                "put": {
                    "summary": "Update book information",
                    "tags": ["BookInformation"],
                    "parameters": id_parameter,
                    "requestBody": request_body,
                    "responses": {
                        "200": record_response("Updated record"),
                        "400": invalid,
                        "404": not_found,
                        "409": error_response("Title already exists", "ErrorResponse"),
                        "500": internal
                    }
                },
                "delete": {
                    "summary": "Delete book information",
                    "tags": ["BookInformation"],
                    "parameters": id_parameter,
                    "responses": {
                        "204": { "description": "Deleted" },
                        "404": not_found,
                        "500": internal
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Book information health check",
                    "tags": ["BookInformation"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookInformationRequest": schema_json::<BookInformationRequest>(),
                "BookInformationResponse": schema_json::<BookInformationResponse>()
            }
        }
    })
}

fn schema_json<T: PartialSchema>() -> serde_json::Value {
    serde_json::to_value(T::schema()).unwrap_or_default()
}

/// Wire the data, business and facade layers over `db` into a module
pub fn create_module(db: DbPool) -> Arc<dyn Module> {
    let store = SqliteBookInformationStore::new(db);
    let facade = ServiceFacade::new(BookInformationManager::new(store));
    Arc::new(BookInformationModule::new(Arc::new(facade)))
}
