use axum::response::Html;

const CHAT_PAGE: &str = include_str!("../assets/chat.html");
const UPLOAD_PAGE: &str = include_str!("../assets/upload.html");

pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

pub async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}
