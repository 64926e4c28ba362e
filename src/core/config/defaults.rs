pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_RAG_URL: &str = "http://localhost:3001";
pub const DEFAULT_RAG_CHAT_PATH: &str = "/api/rag_chat";
pub const DEFAULT_RAG_UPLOAD_PATH: &str = "/api/upload";

pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:8000";
pub const DEFAULT_COMPLETIONS_PATH: &str = "/v1/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

pub fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
