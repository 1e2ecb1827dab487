pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

use models::BookStatus;
use store::BookStore;

/// Books module: owns the catalog and exposes it over HTTP
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(Arc::new(BookStore::new()))
    }

    pub fn with_store(store: Arc<BookStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<BookStore> {
        &self.store
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.books.seed_samples && self.store.is_empty().await {
            let ids = self.store.seed(models::sample_books()).await?;
            tracing::info!(module = self.name(), count = ids.len(), "seeded sample books");
        }

        let books = self.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::list_books).post(handlers::create_book))
            .route(
                "/{id}",
                get(handlers::get_book)
                    .put(handlers::update_book_status)
                    .delete(handlers::delete_book),
            )
            .with_state(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let statuses: Vec<&str> = BookStatus::ALL.iter().map(BookStatus::as_str).collect();
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List book ids",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Identifiers of every stored book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "type": "string" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Book created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/CreatedBook" }
                                    }
                                }
                            },
                            "400": error_response("Title or author missing")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book's status",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/UpdateStatus" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Status updated",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "400": error_response("Status missing"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookStatus": {
                        "type": "string",
                        "enum": statuses
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "status": { "$ref": "#/components/schemas/BookStatus" }
                        },
                        "required": ["title", "author", "status"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "status": { "$ref": "#/components/schemas/BookStatus" }
                        },
                        "required": ["title", "author"]
                    },
                    "CreatedBook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" }
                        },
                        "required": ["id"]
                    },
                    "UpdateStatus": {
                        "type": "object",
                        "properties": {
                            "status": { "$ref": "#/components/schemas/BookStatus" }
                        },
                        "required": ["status"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" }
                        },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.clear().await;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_kernel::Settings;

    #[tokio::test]
    async fn init_seeds_samples_when_enabled() {
        let module = BooksModule::new();
        let settings = Settings::default();
        module.init(&InitCtx { settings: &settings }).await.unwrap();
        assert_eq!(module.store().len().await, 3);

        // A second init does not duplicate the samples.
        module.init(&InitCtx { settings: &settings }).await.unwrap();
        assert_eq!(module.store().len().await, 3);
    }

    #[tokio::test]
    async fn init_skips_samples_when_disabled() {
        let module = BooksModule::new();
        let mut settings = Settings::default();
        settings.books.seed_samples = false;
        module.init(&InitCtx { settings: &settings }).await.unwrap();
        assert!(module.store().is_empty().await);
    }

    #[tokio::test]
    async fn stop_discards_the_catalog() {
        let module = BooksModule::new();
        let settings = Settings::default();
        module.init(&InitCtx { settings: &settings }).await.unwrap();
        module.stop().await.unwrap();
        assert!(module.store().is_empty().await);
    }

    #[test]
    fn mounts_under_books() {
        assert_eq!(BooksModule::new().mount_path(), "/books");
    }

    #[test]
    fn openapi_lists_status_values() {
        let spec = BooksModule::new().openapi().unwrap();
        assert_eq!(
            spec["components"]["schemas"]["BookStatus"]["enum"],
            json!(["unread", "reading", "read"])
        );
        assert!(spec["paths"]["/{id}"]["delete"].is_object());
    }
}
