pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::books::handlers;
use crate::export::handlers::handle_export_book;
use crate::layout::handlers::layout_routes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Books
        .route(
            "/api/v1/books",
            get(handlers::handle_list_books).post(handlers::handle_create_book),
        )
        .route(
            "/api/v1/books/:book_id",
            get(handlers::handle_get_book)
                .patch(handlers::handle_update_book)
                .delete(handlers::handle_delete_book),
        )
        .route("/api/v1/books/:book_id/stats", get(handlers::handle_book_stats))
        .route("/api/v1/books/:book_id/export", post(handle_export_book))
        // Chapters
        .route(
            "/api/v1/books/:book_id/chapters",
            get(handlers::handle_list_chapters).post(handlers::handle_create_chapter),
        )
        .route(
            "/api/v1/books/:book_id/chapters/:chapter_id",
            get(handlers::handle_get_chapter)
                .patch(handlers::handle_update_chapter)
                .delete(handlers::handle_delete_chapter),
        )
        .route(
            "/api/v1/books/:book_id/chapters/:chapter_id/pages",
            get(handlers::handle_chapter_pages),
        )
        .route(
            "/api/v1/books/:book_id/chapters/:chapter_id/stats",
            get(handlers::handle_chapter_stats),
        )
        // Stateless layout tools
        .merge(layout_routes())
        .with_state(state)
}
