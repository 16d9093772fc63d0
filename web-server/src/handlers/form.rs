//! Form page handler

use axum::response::Html;
use dysphagia_core::logic::features::form_controls;

use crate::views;

pub async fn index() -> Html<String> {
    Html(views::page(&form_controls(), false, None))
}
